#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Store returned status {status} for `{resource}`")]
    UnexpectedStatus { resource: String, status: u16 },

    #[error("Failed to decode `{resource}` rows: {source}")]
    MalformedRow {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::RequestFailed(Box::new(e))
    }
}
