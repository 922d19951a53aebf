use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// A registered user, read once per run from the roster store.
///
/// Rows come back from the roster as loose JSON; absent columns default so
/// that a partially-filled row still deserializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub discord_id: u64,
    /// Linked Bungie.net membership. `None` or `0` means the account was
    /// never linked and the user is skipped without error.
    #[serde(default)]
    pub bungie_membership_id: Option<u64>,
    /// Opt-in flag for the Ada-1 vendor check.
    #[serde(default)]
    pub ada_1: bool,
    /// Device tokens for the push transport. Empty for DM-only users.
    #[serde(default)]
    pub fcm_tokens: Vec<String>,
    #[serde(default)]
    pub created_at: String,
}

impl User {
    /// Returns the linked membership key, treating a zero id as unlinked.
    pub fn membership_key(&self) -> Option<u64> {
        self.bungie_membership_id.filter(|id| *id != 0)
    }
}

/// One telemetry record per run: inserted partial at start, updated complete
/// at the end. Optional fields mirror the two write shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTelemetry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_users: Option<u64>,
    /// Seconds spent per processed user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_rate: Option<f64>,
    /// Total wall-clock seconds for the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
}

impl RunTelemetry {
    /// The partial record written when the run starts.
    pub fn started(id: String, start_time: DateTime<Utc>, worker_count: u32) -> Self {
        Self {
            id,
            start_time: Some(start_time),
            worker_count: Some(worker_count),
            ..Self::default()
        }
    }

    /// The completed record written when the run ends.
    pub fn completed(
        id: String,
        total_users: u64,
        processed_users: u64,
        execution_time: f64,
    ) -> Self {
        let processing_rate = if processed_users > 0 {
            execution_time / processed_users as f64
        } else {
            0.0
        };
        Self {
            id,
            total_users: Some(total_users),
            processed_users: Some(processed_users),
            processing_rate: Some(processing_rate),
            execution_time: Some(execution_time),
            ..Self::default()
        }
    }
}
