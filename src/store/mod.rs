pub mod error;
pub mod supabase;

use async_trait::async_trait;

use crate::model::RunTelemetry;
use crate::model::User;
use crate::store::error::StoreError;

/// Bulk source of all registered users, read once at run start.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn all_users(&self) -> Result<Vec<User>, StoreError>;
}

/// Persists the single telemetry record for a run.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Writes the partial record at run start.
    async fn insert_run(&self, telemetry: &RunTelemetry) -> Result<(), StoreError>;

    /// Completes the record at run end, keyed by the run id.
    async fn update_run(&self, telemetry: &RunTelemetry) -> Result<(), StoreError>;
}
