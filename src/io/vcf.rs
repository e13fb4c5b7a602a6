//! # VCF Sample Decoding
//!
//! Decodes the per-sample columns of a VCF data line into genotype entries.
//! The header is parsed once with `noodles`; the resulting decoder is shared
//! by every record read against that header and precomputes the sample index
//! and sorted sample names that each decoded context starts with.
//!
//! Site columns (CHROM..INFO) are not interpreted here.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::sync::Arc;

use noodles::vcf::Header;
use tracing::{info_span, warn};

use crate::config::ContextConfig;
use crate::data::context::{DecodedGenotypes, GenotypeDecoder, GenotypesContext, LazyGenotypesContext};
use crate::data::genotype::{Genotype, MAX_ALLELE_INDEX, MISSING_ALLELE};
use crate::error::{ContextError, Result};

/// Number of fixed site columns before FORMAT
const N_SITE_FIELDS: usize = 8;

#[derive(Debug)]
pub struct VcfSampleDecoder {
    /// Sample names in header column order
    sample_names: Vec<Arc<str>>,
    /// Sample name to column, handed to every decoded record
    sample_index: Arc<HashMap<Arc<str>, usize>>,
    /// Sample names in ascending order, handed to every decoded record
    sorted_names: Arc<Vec<Arc<str>>>,
    config: ContextConfig,
}

impl VcfSampleDecoder {
    /// Decoder for the given sample columns. Names must be non-empty and unique.
    pub fn new(sample_names: Vec<String>, config: ContextConfig) -> Result<Self> {
        config.validate()?;

        let sample_names: Vec<Arc<str>> = sample_names.into_iter().map(Arc::from).collect();
        let mut seen = HashSet::with_capacity(sample_names.len());
        for name in &sample_names {
            if name.is_empty() {
                return Err(ContextError::invalid_data("empty sample name in header"));
            }
            if !seen.insert(name.as_ref()) {
                return Err(ContextError::invalid_data(format!(
                    "duplicate sample name in header: {}",
                    name
                )));
            }
        }

        let sample_index = sample_names
            .iter()
            .enumerate()
            .map(|(i, name)| (Arc::clone(name), i))
            .collect();
        let mut sorted_names = sample_names.clone();
        sorted_names.sort_unstable();

        Ok(Self {
            sample_names,
            sample_index: Arc::new(sample_index),
            sorted_names: Arc::new(sorted_names),
            config,
        })
    }

    /// Parse header text (meta lines through `#CHROM`)
    pub fn from_header_text(text: &str, config: ContextConfig) -> Result<Self> {
        let header: Header = text.parse()?;
        let sample_names: Vec<String> = header
            .sample_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(sample_names, config)
    }

    /// Read header lines from `reader` up to and including `#CHROM`.
    /// The reader is left positioned at the first data line.
    pub fn from_reader<R: BufRead>(reader: &mut R, config: ContextConfig) -> Result<Self> {
        info_span!("vcf_read_header").in_scope(|| {
            let mut header_text = String::new();
            let mut line = String::new();
            let mut found_chrom = false;

            loop {
                line.clear();
                if reader.read_line(&mut line)? == 0 {
                    break;
                }
                if !line.starts_with('#') {
                    return Err(ContextError::vcf("data line before #CHROM header line"));
                }
                header_text.push_str(&line);
                if line.starts_with("#CHROM") {
                    found_chrom = true;
                    break;
                }
            }

            if !found_chrom {
                return Err(ContextError::vcf("missing #CHROM header line"));
            }
            Self::from_header_text(&header_text, config)
        })
    }

    pub fn n_samples(&self) -> usize {
        self.sample_names.len()
    }

    /// Sample names in header order
    pub fn sample_names(&self) -> &[Arc<str>] {
        &self.sample_names
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Genotypes of a data line, left undecoded until first access.
    ///
    /// A site-only line (no FORMAT column) yields an empty, already
    /// materialized context, as does a FORMAT column with no samples after it
    /// when the header has none. Sample columns the header has no names for
    /// are rejected.
    pub fn lazy_record(self: &Arc<Self>, line: &str) -> Result<LazyGenotypesContext> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let mut fields = line.splitn(N_SITE_FIELDS + 1, '\t');
        let n_site_fields = fields.by_ref().take(N_SITE_FIELDS).count();
        if n_site_fields < N_SITE_FIELDS {
            return Err(ContextError::invalid_data(format!(
                "expected at least {} fields, got {}",
                N_SITE_FIELDS, n_site_fields
            )));
        }

        match fields.next() {
            Some(raw) if self.n_samples() > 0 => {
                let decoder: Arc<dyn GenotypeDecoder> = Arc::clone(self) as Arc<dyn GenotypeDecoder>;
                Ok(LazyGenotypesContext::new(raw, decoder, self.n_samples()))
            }
            Some(raw) if raw.contains('\t') => Err(ContextError::parse(
                0,
                "record has sample columns but the header has none",
            )),
            _ => Ok(LazyGenotypesContext::from_context(
                GenotypesContext::from_config(&self.config)?,
            )),
        }
    }

    fn parse_sample(
        &self,
        column: usize,
        keys: &[&str],
        gt_idx: Option<usize>,
        field: &str,
    ) -> Result<Genotype> {
        let default_ploidy = self.config.default_ploidy as usize;
        let mut alleles = Vec::new();
        let mut phased = false;
        let mut gt_seen = false;
        let mut opaque = Vec::new();

        for (i, value) in field.split(':').enumerate() {
            let key = keys.get(i).ok_or_else(|| {
                ContextError::parse(
                    column,
                    format!("more values than FORMAT keys ({})", keys.len()),
                )
            })?;
            if Some(i) == gt_idx {
                let (parsed, is_phased) = parse_genotype(value, default_ploidy)
                    .map_err(|message| ContextError::parse(column, message))?;
                alleles = parsed;
                phased = is_phased;
                gt_seen = true;
            } else {
                opaque.push((*key, value));
            }
        }

        // Trailing FORMAT values may be dropped; a dropped GT is a no-call
        if gt_idx.is_some() && !gt_seen {
            alleles = vec![MISSING_ALLELE; default_ploidy];
        }

        let name = Arc::clone(&self.sample_names[column]);
        let genotype = Genotype::new(name, alleles, phased)?;
        Ok(opaque
            .into_iter()
            .fold(genotype, |g, (key, value)| g.with_field(key, value)))
    }
}

impl GenotypeDecoder for VcfSampleDecoder {
    /// `raw` is the FORMAT column followed by the sample columns, tab-separated
    fn decode(&self, raw: &str) -> Result<DecodedGenotypes> {
        let raw = raw.trim_end_matches(&['\r', '\n'][..]);
        let n_samples = self.n_samples();
        let mut columns = raw.split('\t');

        let format = columns.next().unwrap_or_default();
        let keys: Vec<&str> = format.split(':').collect();
        let gt_idx = keys.iter().position(|&k| k == "GT");

        let mut genotypes = Vec::with_capacity(n_samples);
        for (column, field) in columns.enumerate() {
            if column >= n_samples {
                return Err(ContextError::parse(
                    column,
                    format!("record has more sample columns than the header's {}", n_samples),
                ));
            }
            genotypes.push(self.parse_sample(column, &keys, gt_idx, field)?);
        }

        if genotypes.len() < n_samples {
            if self.config.strict_sample_count {
                return Err(ContextError::invalid_data(format!(
                    "expected {} sample columns, found {}",
                    n_samples,
                    genotypes.len()
                )));
            }
            let default_ploidy = self.config.default_ploidy as usize;
            for column in genotypes.len()..n_samples {
                genotypes.push(Genotype::no_call(
                    Arc::clone(&self.sample_names[column]),
                    default_ploidy,
                )?);
            }
        }

        Ok(DecodedGenotypes {
            genotypes,
            sample_index: Arc::clone(&self.sample_index),
            sorted_names: Arc::clone(&self.sorted_names),
        })
    }
}

/// Parse a GT value of any ploidy (e.g. "0|1", "0/1/2", "1", ".")
///
/// - A bare "." is a no-call of `default_ploidy` missing alleles
/// - Phased only if no allele is separated by '/'; haploid calls count as phased
/// - Returns (alleles, is_phased)
fn parse_genotype(gt: &str, default_ploidy: usize) -> std::result::Result<(Vec<u8>, bool), String> {
    if gt.is_empty() || gt == "." {
        return Ok((vec![MISSING_ALLELE; default_ploidy], false));
    }

    let phased = !gt.contains('/');
    let alleles = gt
        .split(|c| c == '|' || c == '/')
        .map(parse_allele)
        .collect::<std::result::Result<Vec<u8>, String>>()?;
    Ok((alleles, phased))
}

/// Parse a single allele string to a u8
/// Returns 255 for missing (.)
/// Returns 255 with a log warning if allele index exceeds 254 (u8 limitation)
fn parse_allele(s: &str) -> std::result::Result<u8, String> {
    if s == "." {
        return Ok(MISSING_ALLELE);
    }
    let idx: u32 = s
        .parse()
        .map_err(|_| format!("invalid allele '{}'", s))?;
    if idx > MAX_ALLELE_INDEX as u32 {
        warn!(allele = idx, "allele index exceeds {}, treating as missing", MAX_ALLELE_INDEX);
        return Ok(MISSING_ALLELE);
    }
    Ok(idx as u8)
}
