use thiserror::Error;
use validator::ValidationErrors;

use crate::storage::DishesFilterBuilderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database internal error: {0}")]
    DatabaseInternalError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    DatabaseMigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Entry not found")]
    EntryNotFound,
    #[error("Category '{0}' not found")]
    CategoryNotFound(String),
    #[error("Entry already exists")]
    EntryAlreadyExists,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Validation errors")]
    ValidationErrors(#[from] ValidationErrors),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("Background task failed: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),
    #[error("Error building struct {0}")]
    BuilderError(#[from] DishesFilterBuilderError),
}

pub type AppResult<T> = Result<T, AppError>;
