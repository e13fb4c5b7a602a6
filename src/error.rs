//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.

use thiserror::Error;

/// Main error type for genotype context operations
#[derive(Error, Debug)]
pub enum ContextError {
    /// A structural mutator was called on a context that has been made immutable
    #[error("Cannot {operation}: genotypes context is immutable")]
    Immutable { operation: &'static str },

    /// Position outside `0..len`
    #[error("Index {index} out of bounds for genotypes context of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Negative default ploidy passed to a max-ploidy query
    #[error("Default ploidy must be non-negative, got {ploidy}")]
    InvalidPloidy { ploidy: i32 },

    /// `remove_all` was asked to remove entries that are not in the context
    #[error("{count} genotype(s) requested for removal are not present in the context")]
    MissingGenotypes { count: usize },

    /// A name in an externally supplied sample order has no entry
    #[error("Unknown sample: {name}")]
    UnknownSample { name: String },

    /// Invalid data errors (empty sample name, column count mismatch)
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// VCF header errors
    #[error("VCF error: {message}")]
    Vcf { message: String },

    /// Errors decoding the per-sample columns of a record
    #[error("Parse error in sample column {column}: {message}")]
    Parse { column: usize, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O errors while reading header text
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using ContextError
pub type Result<T> = std::result::Result<T, ContextError>;

impl ContextError {
    /// Create an immutability violation for the named operation
    pub fn immutable(operation: &'static str) -> Self {
        Self::Immutable { operation }
    }

    /// Create an out-of-bounds error
    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a VCF error with a message
    pub fn vcf(message: impl Into<String>) -> Self {
        Self::Vcf {
            message: message.into(),
        }
    }

    /// Create a parse error for a sample column (0-based, FORMAT excluded)
    pub fn parse(column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            column,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// Convert noodles VCF header errors to ContextError
impl From<noodles::vcf::header::ParseError> for ContextError {
    fn from(err: noodles::vcf::header::ParseError) -> Self {
        Self::Vcf {
            message: err.to_string(),
        }
    }
}
