use std::collections::HashMap;

pub mod diff;
pub mod error;
pub mod rotation;
pub mod store;

/// The two reference maps shared read-only by every worker for the whole run.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    /// External collectible id -> canonical item id.
    pub master: HashMap<String, String>,
    /// Canonical item id -> display name, scoped to the current rotation.
    pub vendor: HashMap<String, String>,
}
