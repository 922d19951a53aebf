#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("Catalog download failed: {0}")]
    DownloadFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Catalog storage returned status {status} for `{key}`")]
    UnexpectedStatus { key: String, status: u16 },

    #[error("Failed to decode catalog `{key}`: {source}")]
    MalformedCatalog {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::DownloadFailed(Box::new(e))
    }
}
