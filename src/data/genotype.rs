//! # Genotype Entity
//!
//! A single sample's call within one record. A context only ever reads the
//! sample name and the ploidy; everything else is carried through untouched.
//!
//! Allele encoding follows the rest of the crate:
//! 0 = REF, 1-254 = ALT alleles, 255 = missing.

use std::fmt;
use std::sync::Arc;

use crate::error::{ContextError, Result};

/// Allele value used for a missing (`.`) call
pub const MISSING_ALLELE: u8 = 255;

/// Maximum representable allele index (u8 limitation)
pub const MAX_ALLELE_INDEX: u8 = 254;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Genotype {
    /// Sample identifier (never empty)
    sample_name: Arc<str>,
    /// One entry per chromosome copy; `len()` is the ploidy
    alleles: Vec<u8>,
    /// Whether the alleles are phased (`|`) rather than unphased (`/`)
    phased: bool,
    /// Remaining FORMAT key/value pairs in record order
    fields: Vec<(Box<str>, Box<str>)>,
}

impl Genotype {
    /// Create a genotype call. Fails if `sample_name` is empty.
    pub fn new(sample_name: impl Into<Arc<str>>, alleles: Vec<u8>, phased: bool) -> Result<Self> {
        let sample_name = sample_name.into();
        if sample_name.is_empty() {
            return Err(ContextError::invalid_data("genotype sample name must not be empty"));
        }
        Ok(Self {
            sample_name,
            alleles,
            phased,
            fields: Vec::new(),
        })
    }

    /// A call with `ploidy` missing alleles
    pub fn no_call(sample_name: impl Into<Arc<str>>, ploidy: usize) -> Result<Self> {
        Self::new(sample_name, vec![MISSING_ALLELE; ploidy], false)
    }

    /// Attach an opaque FORMAT field
    pub fn with_field(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    #[inline]
    pub fn sample_name(&self) -> &str {
        &self.sample_name
    }

    /// Shared handle to the sample name, used as a cache key without copying
    #[inline]
    pub(crate) fn sample_name_arc(&self) -> &Arc<str> {
        &self.sample_name
    }

    /// Number of chromosome copies called for this sample
    #[inline]
    pub fn ploidy(&self) -> usize {
        self.alleles.len()
    }

    #[inline]
    pub fn alleles(&self) -> &[u8] {
        &self.alleles
    }

    #[inline]
    pub fn is_phased(&self) -> bool {
        self.phased
    }

    /// Look up an opaque FORMAT field by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    /// True if every allele is missing (including ploidy 0)
    pub fn is_no_call(&self) -> bool {
        self.alleles.iter().all(|&a| a == MISSING_ALLELE)
    }

    pub fn is_hom_ref(&self) -> bool {
        !self.alleles.is_empty() && self.alleles.iter().all(|&a| a == 0)
    }

    /// Called alleles differ from each other (missing alleles excluded)
    pub fn is_het(&self) -> bool {
        let mut called = self.alleles.iter().filter(|&&a| a != MISSING_ALLELE);
        match called.next() {
            Some(&first) => called.any(|&a| a != first),
            None => false,
        }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.sample_name)?;
        if self.alleles.is_empty() {
            return f.write_str(".");
        }
        let sep = if self.phased { '|' } else { '/' };
        for (i, &allele) in self.alleles.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", sep)?;
            }
            if allele == MISSING_ALLELE {
                f.write_str(".")?;
            } else {
                write!(f, "{}", allele)?;
            }
        }
        Ok(())
    }
}
