use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid root path: {0}")]
    InvalidRoot(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Enrichment error: {0}")]
    Enrichment(String),
}

pub type Result<T> = std::result::Result<T, MapperError>;
