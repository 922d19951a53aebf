//! Pure diff of a profile snapshot against the reference catalogs.

use std::collections::HashMap;

use crate::bungie::model::ProfileSnapshot;

/// Bit flag set on a collectible state when the user has not unlocked it.
/// The state word carries other flags (invisible, obscured) that are
/// irrelevant to this check.
pub const NOT_ACQUIRED: u32 = 1;

/// Canonical item ids for every collectible in the profile that is tracked
/// by the master catalog and not yet acquired. Iteration order of the
/// underlying map is unspecified, so the output order is too.
pub fn missing_collectibles(
    profile: &ProfileSnapshot,
    master: &HashMap<String, String>,
) -> Vec<String> {
    let mut missing = Vec::new();

    for (collectible_id, entry) in profile.collectibles() {
        if entry.state & NOT_ACQUIRED != NOT_ACQUIRED {
            continue;
        }
        if let Some(item_id) = master.get(collectible_id) {
            missing.push(item_id.clone());
        }
    }

    missing
}

/// Display names for the missing items the vendor is currently selling.
/// Items missing from the collection but not in the current rotation
/// produce no entry.
pub fn missing_vendor_items(
    missing_item_ids: &[String],
    vendor: &HashMap<String, String>,
) -> Vec<String> {
    missing_item_ids
        .iter()
        .filter_map(|item_id| vendor.get(item_id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bungie::model::CollectibleEntry;

    fn profile(states: &[(&str, u32)]) -> ProfileSnapshot {
        let mut snapshot = ProfileSnapshot::default();
        for (id, state) in states {
            snapshot.insert_collectible(id.to_string(), CollectibleEntry { state: *state });
        }
        snapshot
    }

    fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_not_acquired_bit_regardless_of_other_flags() {
        let master = to_map(&[("111", "itemA"), ("222", "itemB"), ("333", "itemC")]);
        // 1 = not acquired, 5 = not acquired | obscured, 4 = obscured only,
        // 0 = acquired and visible.
        let profile = profile(&[("111", 1), ("222", 5), ("333", 4), ("444", 1)]);

        let mut missing = missing_collectibles(&profile, &master);
        missing.sort();
        assert_eq!(missing, vec!["itemA".to_string(), "itemB".to_string()]);
    }

    #[test]
    fn test_untracked_collectibles_are_ignored() {
        let master = to_map(&[("111", "itemA")]);
        // "999" is missing but unknown to the master catalog.
        let profile = profile(&[("999", 1)]);
        assert!(missing_collectibles(&profile, &master).is_empty());
    }

    #[test]
    fn test_empty_profile_yields_empty_set() {
        let master = to_map(&[("111", "itemA")]);
        let profile = profile(&[]);
        assert!(missing_collectibles(&profile, &master).is_empty());
    }

    #[test]
    fn test_vendor_intersection_is_subset_of_vendor() {
        let vendor = to_map(&[("itemA", "Cool Shader")]);
        let missing = vec!["itemA".to_string(), "itemB".to_string()];

        let names = missing_vendor_items(&missing, &vendor);
        assert_eq!(names, vec!["Cool Shader".to_string()]);
    }

    #[test]
    fn test_empty_vendor_catalog_yields_no_names() {
        let vendor = HashMap::new();
        let missing = vec!["itemA".to_string()];
        assert!(missing_vendor_items(&missing, &vendor).is_empty());
    }

    #[test]
    fn test_diff_is_idempotent() {
        let master = to_map(&[("111", "itemA"), ("222", "itemB")]);
        let vendor = to_map(&[("itemA", "Cool Shader"), ("itemB", "Warm Shader")]);
        let profile = profile(&[("111", 1), ("222", 3)]);

        let mut first = missing_collectibles(&profile, &master);
        let mut second = missing_collectibles(&profile, &master);
        first.sort();
        second.sort();
        assert_eq!(first, second);

        let mut names_a = missing_vendor_items(&first, &vendor);
        let mut names_b = missing_vendor_items(&second, &vendor);
        names_a.sort();
        names_b.sort();
        assert_eq!(names_a, names_b);
    }
}
