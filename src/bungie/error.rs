#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BungieError {
    /// The service reported a server-side outage (5xx). Retried within the
    /// backoff budget, then surfaced as a per-user failure.
    #[error("Bungie API unavailable (status {status})")]
    UpstreamUnavailable { status: u16 },

    /// The response body did not decode into the expected shape, or the
    /// request was rejected outright. Not retryable.
    #[error("Malformed Bungie API response: {msg}")]
    MalformedResponse { msg: String },

    /// Transport-level failure. Retried within the backoff budget.
    #[error("Bungie API request failed: {0}")]
    NetworkFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BungieError {
    /// Whether another attempt within the retry budget makes sense.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BungieError::UpstreamUnavailable { .. } | BungieError::NetworkFailure(_)
        )
    }
}

impl From<reqwest::Error> for BungieError {
    fn from(e: reqwest::Error) -> Self {
        BungieError::NetworkFailure(Box::new(e))
    }
}
