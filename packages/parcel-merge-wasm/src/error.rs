use thiserror::Error;

/// Everything that can abort a merge run. No variant carries partial output.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A field classified Sum or Max holds a value that cannot be added or compared.
    #[error("field '{field}' cannot be aggregated: {detail}")]
    InvalidFieldType { field: String, detail: String },

    /// The grouping key of a dissolve pass is not part of the collection schema.
    #[error("grouping key field '{field}' does not exist in the feature schema")]
    MissingKeyField { field: String },

    #[error("feature {index} has unsupported geometry: {detail}")]
    InvalidGeometry { index: usize, detail: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid merge configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("geometry conversion failed: {0}")]
    Geometry(#[from] geozero::error::GeozeroError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MergeError>;
