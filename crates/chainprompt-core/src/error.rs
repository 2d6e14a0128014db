use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainPromptError {
    /// Any transport, auth, or API failure from a model provider. The core
    /// never distinguishes provider failure subtypes.
    #[error("provider error: {0}")]
    Provider(String),

    /// Required credential or configuration missing at construction.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChainPromptError>;
