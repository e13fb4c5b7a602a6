//! # Data Module
//!
//! In-memory representations of a record's genotype calls.
//!
//! - `genotype`: the per-sample entry. A context reads only its sample name
//!   and ploidy.
//! - `context`: the ordered per-record collection with its lookup caches.

pub mod context;
pub mod genotype;

// Re-export commonly used types
pub use context::{FrozenGenotypes, GenotypesContext, LazyGenotypesContext};
pub use genotype::Genotype;
