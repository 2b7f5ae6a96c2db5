//! Error types for larder.

use thiserror::Error;

/// Result type alias using larder's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for larder operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Recipe not found
    #[error("Recipe not found: {0}")]
    RecipeNotFound(uuid::Uuid),

    /// Invalid input (missing title, unparseable numbers, unknown category)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors that mean "the requested thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RecipeNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_recipe_not_found() {
        let id = Uuid::nil();
        let err = Error::RecipeNotFound(id);
        assert_eq!(err.to_string(), format!("Recipe not found: {}", id));
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("title is required".to_string());
        assert_eq!(err.to_string(), "Invalid input: title is required");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("PORT must be a number".to_string());
        assert_eq!(err.to_string(), "Configuration error: PORT must be a number");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::RecipeNotFound(Uuid::new_v4()).is_not_found());
        assert!(!Error::Internal("x".into()).is_not_found());
        assert!(!Error::InvalidInput("x".into()).is_not_found());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
