use thiserror::Error;

pub type DeserializeResult<T> = Result<T, DeserializeError>;

#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("Malformed wire node: {0}")]
    MalformedNode(String),

    #[error("Reference to unknown id {0}")]
    UnknownRef(u64),

    #[error("Reference {0} was declared but never constructed")]
    UnresolvedRef(u64),

    #[error("Convert-in hook failed: {0}")]
    Hook(String),

    #[error("Text decoding failed: {0}")]
    Decode(#[from] serde_json::Error),
}
