//! # Configuration
//!
//! ## Role
//! Tunables shared by context construction and the VCF sample decoder.
//!
//! ## Fields
//! - `initial_capacity: usize` - Capacity hint for new contexts (default: 10)
//! - `default_ploidy: u32` - Ploidy assumed when a record carries none (default: 2)
//! - `strict_sample_count: bool` - Reject records whose sample column count
//!   differs from the header (default: true)
//!
//! ## Validation
//! - Ensure `initial_capacity <= MAX_INITIAL_CAPACITY`

use serde::{Deserialize, Serialize};

use crate::error::{ContextError, Result};

/// Default capacity hint, matching the typical small per-record sample count
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;

/// Upper bound on the capacity hint (guards against absurd preallocation)
pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;

/// Default ploidy for samples without a GT call
pub const DEFAULT_PLOIDY: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Capacity hint for new contexts
    pub initial_capacity: usize,

    /// Ploidy used for padded samples and as the max-ploidy fallback
    pub default_ploidy: u32,

    /// Reject records with a different number of sample columns than the header
    pub strict_sample_count: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            default_ploidy: DEFAULT_PLOIDY,
            strict_sample_count: true,
        }
    }
}

impl ContextConfig {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_default_ploidy(mut self, default_ploidy: u32) -> Self {
        self.default_ploidy = default_ploidy;
        self
    }

    pub fn with_strict_sample_count(mut self, strict: bool) -> Self {
        self.strict_sample_count = strict;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(ContextError::config(format!(
                "initial_capacity ({}) exceeds maximum ({})",
                self.initial_capacity, MAX_INITIAL_CAPACITY
            )));
        }
        Ok(())
    }

    /// Validate and return self
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}
