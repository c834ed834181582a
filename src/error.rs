//! Crate-wide error type.
//!
//! Every failure carries the process exit code the `series` binary should
//! return, so library code decides the category once at the point of failure:
//!
//! - `2`: configuration or input problem (bad strategy, unreadable file, bad bounds)
//! - `3`: nothing left to report (all rows rejected, all series empty)
//! - `4`: output or internal failure

#[derive(Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Configuration or input error (exit code 2).
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// No usable data (exit code 3).
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Output/internal failure (exit code 4).
    pub fn output(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
