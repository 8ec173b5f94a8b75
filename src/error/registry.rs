use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Type `{0}` is already registered for a different type")]
    DuplicateType(String),
}
