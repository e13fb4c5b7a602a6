//! # I/O Module
//!
//! Decoding collaborators that feed lazily materialized contexts.

pub mod vcf;

pub use vcf::VcfSampleDecoder;
