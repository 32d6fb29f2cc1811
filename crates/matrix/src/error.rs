use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatrixError>;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Model error: {0}")]
    Model(#[from] catalog_ci_model::ModelError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
