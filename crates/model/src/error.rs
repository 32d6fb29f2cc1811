use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Source location error for {entity}: {reason}")]
    SourceLocation { entity: String, reason: String },

    #[error("Invalid owner reference: {0}")]
    OwnerReference(String),

    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
