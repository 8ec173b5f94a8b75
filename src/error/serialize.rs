use thiserror::Error;

pub type SerializeResult<T> = Result<T, SerializeError>;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("Circular dependency found")]
    CircularDependency,

    #[error("Convert-out hook failed: {0}")]
    Hook(String),

    #[error("Text encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
