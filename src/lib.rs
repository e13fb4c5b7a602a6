//! # Genocontext
//!
//! Per-record genotype collections: an ordered list of per-sample genotype
//! entries with cached lookup by sample name, a cached alphabetical sample
//! ordering, a mutability switch and deferred decoding of raw sample columns.
//!
//! ## Module Structure
//! ```text
//! genocontext
//! ├── config      # ContextConfig (capacity hint, default ploidy, decoder strictness)
//! ├── data        # In-memory representations
//! │   ├── genotype
//! │   └── context # GenotypesContext, caches, read-only views, lazy decoding
//! ├── error       # ContextError and Result alias
//! └── io          # VCF sample column decoding
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod io;

// Re-export commonly used types
pub use config::ContextConfig;
pub use data::context::{
    DecodedGenotypes, FrozenGenotypes, GenotypeAccess, GenotypeDecoder, GenotypesContext,
    LazyGenotypesContext, SampleLookup, SampleOrderIter,
};
pub use data::genotype::{Genotype, MISSING_ALLELE};
pub use error::{ContextError, Result};
pub use io::vcf::VcfSampleDecoder;
