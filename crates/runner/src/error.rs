use thiserror::Error;

pub type Result<T> = std::result::Result<T, RunnerError>;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("{0} is required, make sure to set the secret")]
    MissingConfig(&'static str),

    #[error("Catalog error: {0}")]
    Catalog(#[source] anyhow::Error),

    #[error("Changed files error: {0}")]
    Changes(#[source] anyhow::Error),

    #[error("Model error: {0}")]
    Model(#[from] catalog_ci_model::ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metrics sink error: {0}")]
    Sink(String),
}
