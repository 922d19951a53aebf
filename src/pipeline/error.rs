use std::time::Duration;

use crate::store::error::StoreError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The bulk roster read failed; the run aborts before any user is
    /// handed to a worker.
    #[error("Roster read failed: {0}")]
    RosterUnavailable(#[from] StoreError),

    #[error("Run deadline of {0:?} exceeded with work still in flight")]
    DeadlineExceeded(Duration),
}
