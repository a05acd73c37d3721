use thiserror::Error;

pub mod app;
pub mod dispatch;
pub mod health;
pub mod mock;
pub mod player;
pub mod search;
pub mod stats;
pub mod summary;
pub mod team;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_request<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::BadRequest(msg.into()))
    }

    pub fn not_found<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::NotFound(msg.into()))
    }

    pub fn internal<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Internal(msg.into()))
    }

    /// The per-entity log table does not exist (yet).
    pub fn missing_game_logs(owner: &str) -> ServiceError {
        ServiceError::NotFound(format!(
            "Game logs not found for '{}'. Ensure data is ingested.",
            owner
        ))
    }

    pub fn uninitialized() -> ServiceError {
        ServiceError::Unavailable("Database client is not initialized.".to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
