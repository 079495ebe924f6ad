//! Error types and handling for documentation runs

use std::path::PathBuf;
use thiserror::Error;

use crate::generation::GenerationError;
use crate::semantic::SymbolError;

/// Main error type for documentation runs
#[derive(Debug, Error)]
pub enum DocweaveError {
    /// Required settings are absent or still hold placeholder values
    #[error("Configuration missing or placeholder values for: {}", fields.join(", "))]
    ConfigurationMissing { fields: Vec<String> },

    /// Configuration loading or parsing errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// The input could not be parsed into a usable tree
    #[error("Parse failure at line {line}, column {col}: {message}")]
    ParseFailure {
        message: String,
        line: usize,
        col: usize,
    },

    /// A declaration's qualified name could not be resolved
    #[error("Symbol resolution failed: {0}")]
    SymbolResolution(#[from] SymbolError),

    /// The generation service failed for one target
    #[error("Generation failed for '{context}': {source}")]
    Generation {
        context: String,
        #[source]
        source: GenerationError,
    },

    /// Generated documentation could not be applied to the tree
    #[error("Rewrite inconsistency: {} generated entries matched no declaration (offsets {missing:?})", missing.len())]
    RewriteInconsistency { missing: Vec<u32> },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Parse,
    Symbol,
    Generation,
    Rewrite,
    Io,
    Internal,
}

impl DocweaveError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocweaveError::ConfigurationMissing { .. } => ErrorKind::Configuration,
            DocweaveError::ConfigError { .. } => ErrorKind::Configuration,
            DocweaveError::ParseFailure { .. } => ErrorKind::Parse,
            DocweaveError::SymbolResolution(_) => ErrorKind::Symbol,
            DocweaveError::Generation { .. } => ErrorKind::Generation,
            DocweaveError::RewriteInconsistency { .. } => ErrorKind::Rewrite,
            DocweaveError::IoError { .. } => ErrorKind::Io,
            DocweaveError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if the run can go on after this error (the affected target is
    /// simply left undocumented)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Symbol | ErrorKind::Generation)
    }

    /// Create a configuration-missing error naming every offending field
    pub fn configuration_missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ConfigurationMissing {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a parse failure
    pub fn parse_failure(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::ParseFailure {
            message: message.into(),
            line,
            col,
        }
    }

    /// Create a generation error for one target
    pub fn generation(context: impl Into<String>, source: GenerationError) -> Self {
        Self::Generation {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<crate::cst::ParseError> for DocweaveError {
    fn from(error: crate::cst::ParseError) -> Self {
        Self::parse_failure(error.message, error.line, error.column)
    }
}
