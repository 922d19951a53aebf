//! Typed shapes for the two Bungie API reads.
//!
//! Decoding happens at the client boundary; anything that does not fit these
//! shapes surfaces as `MalformedResponse` instead of leaking into the diff.

use std::collections::HashMap;

use serde::Deserialize;

/// Envelope every Bungie API payload arrives in.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "Response")]
    pub response: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipData {
    #[serde(rename = "destinyMemberships", default)]
    pub destiny_memberships: Vec<DestinyMembership>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinyMembership {
    #[serde(rename = "membershipType")]
    pub membership_type: i32,
    #[serde(rename = "membershipId")]
    pub membership_id: String,
}

/// One user's profile at one point in time. Only the collectibles component
/// is requested; the component is absent entirely when the profile hides it,
/// which reads as an empty collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(rename = "profileCollectibles", default)]
    profile_collectibles: ProfileCollectibles,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProfileCollectibles {
    #[serde(default)]
    data: Option<CollectibleComponent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CollectibleComponent {
    #[serde(default)]
    collectibles: HashMap<String, CollectibleEntry>,
}

/// Per-collectible acquisition state bitmask.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectibleEntry {
    #[serde(default)]
    pub state: u32,
}

impl ProfileSnapshot {
    /// Iterates over (collectible id, state) pairs present in the snapshot.
    pub fn collectibles(&self) -> impl Iterator<Item = (&String, &CollectibleEntry)> {
        self.profile_collectibles
            .data
            .iter()
            .flat_map(|component| component.collectibles.iter())
    }

    #[cfg(test)]
    pub fn insert_collectible(&mut self, collectible_id: String, entry: CollectibleEntry) {
        self.profile_collectibles
            .data
            .get_or_insert_with(CollectibleComponent::default)
            .collectibles
            .insert(collectible_id, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_decodes_collectible_states() {
        let body = r#"{
            "Response": {
                "profileCollectibles": {
                    "data": {
                        "collectibles": {
                            "111": { "state": 5 },
                            "222": { "state": 0 }
                        }
                    }
                }
            }
        }"#;

        let decoded: ApiResponse<ProfileSnapshot> = serde_json::from_str(body).unwrap();
        let states: HashMap<_, _> = decoded
            .response
            .collectibles()
            .map(|(id, entry)| (id.clone(), entry.state))
            .collect();
        assert_eq!(states.get("111"), Some(&5));
        assert_eq!(states.get("222"), Some(&0));
    }

    #[test]
    fn test_hidden_collectibles_component_reads_empty() {
        let body = r#"{ "Response": { "profileCollectibles": {} } }"#;
        let decoded: ApiResponse<ProfileSnapshot> = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.response.collectibles().count(), 0);
    }
}
