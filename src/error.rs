use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV header is missing required columns: {0}")]
    SchemaContract(String),

    #[error("Row {row}: invalid {field}: {reason}")]
    RowParse {
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Invalid day of week: {0}")]
    InvalidDay(String),

    #[error("HTTP server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
