//! Result type alias for documentation runs

use crate::error::DocweaveError;

/// Standard Result type for documentation runs
pub type Result<T> = std::result::Result<T, DocweaveError>;

/// Degrading a per-target failure to "no value" instead of ending the run
pub trait ResultExt<T> {
    /// `Some(value)`, or `None` after logging the error
    ///
    /// Recoverable errors (a symbol that could not be named, a generation
    /// request that failed) are logged at warn level, anything else at error
    /// level. Either way the caller decides what to substitute.
    fn or_log(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn or_log(self) -> Option<T> {
        let err = match self {
            Ok(value) => return Some(value),
            Err(err) => err,
        };
        if err.is_recoverable() {
            tracing::warn!(kind = ?err.kind(), "{err}");
        } else {
            tracing::error!(kind = ?err.kind(), "{err}");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::semantic::SymbolError;

    #[test]
    fn test_or_log_keeps_value() {
        let ok: Result<&str> = Ok("Acme.Foo");
        assert_eq!(ok.or_log(), Some("Acme.Foo"));
    }

    #[test]
    fn test_or_log_drops_symbol_error() {
        let err: Result<String> = Err(SymbolError::MissingName { offset: 12 }.into());
        assert_eq!(err.or_log(), None);
    }

    #[test]
    fn test_or_log_drops_generation_error() {
        let err: Result<String> = Err(DocweaveError::generation(
            "Acme.Foo",
            GenerationError::EmptyResponse,
        ));
        assert_eq!(err.or_log(), None);
    }
}
