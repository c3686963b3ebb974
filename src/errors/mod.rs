pub mod file_client;

pub use file_client::FileClientError;

/// Common trait for the crate's error types
pub trait AppError: std::error::Error + Send + Sync + 'static {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a stable error code for callers that branch on failures
    fn error_code(&self) -> &'static str;

    /// Get optional suggested action for the user
    fn suggested_action(&self) -> Option<String> {
        None
    }
}
