#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Skipped record {product_id}: {reason}")]
    SkippableRecord { product_id: String, reason: String },

    #[error("No positive prices in group {0}")]
    EmptyPriceSet(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
