//! Result type alias for klint operations

use crate::error::KlintError;

/// Standard Result type for klint operations
pub type Result<T> = std::result::Result<T, KlintError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Log the error and continue with `None` if it is recoverable
    fn log_and_continue(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn log_and_continue(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("Continuing after error: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_continue() {
        let ok: Result<u8> = Ok(1);
        assert_eq!(ok.log_and_continue(), Ok(Some(1)));

        let recoverable: Result<u8> = Err(KlintError::parse_error("bad", 0));
        assert_eq!(recoverable.log_and_continue(), Ok(None));

        let fatal: Result<u8> = Err(KlintError::config_error("indent_size", "x"));
        assert!(fatal.log_and_continue().is_err());
    }
}
