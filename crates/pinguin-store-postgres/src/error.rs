use thiserror::Error;

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("database connection error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx_core::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PostgresError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PostgresError>;

impl From<PostgresError> for pinguin_store::StoreError {
    fn from(err: PostgresError) -> Self {
        pinguin_store::StoreError::Database(err.to_string())
    }
}
