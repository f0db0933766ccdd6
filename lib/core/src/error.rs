use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding provider is not available")]
    ProviderUnavailable,

    #[error("Embedding provider failed to load: {0}")]
    ProviderLoad(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Field not found: {0}")]
    UnknownField(String),

    #[error("Data key not found: {0}")]
    UnknownKey(String),

    #[error("No fields have been scanned")]
    NoFields,

    #[error("No user data has been provided")]
    NoUserData,

    #[error("Profile not found at index {0}")]
    ProfileNotFound(usize),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
