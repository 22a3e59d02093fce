use thiserror::Error;

#[derive(Error, Debug)]
pub enum TxtError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Alias already in use: {0}")]
    AliasConflict(String),

    #[error("Invalid alias \"{0}\": short indexes and message IDs are reserved")]
    InvalidAlias(String),

    #[error("Same as the last temporary message, not inserted")]
    DuplicateOfLast,

    #[error("Message too long: {len} bytes (limit {limit})")]
    MessageTooLong { len: usize, limit: usize },

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Invalid time offset: {0}")]
    InvalidOffset(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Wrong password")]
    WrongPassword,

    #[error("Wrong key")]
    WrongKey,

    #[error("The key is expired")]
    KeyExpired,

    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] confique::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// redb reports each phase with its own error type; all of them are storage failures.
macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TxtError {
                fn from(e: $ty) -> Self {
                    TxtError::Storage(e.into())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

pub type Result<T> = std::result::Result<T, TxtError>;
