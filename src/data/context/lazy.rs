//! # Lazy Genotypes
//!
//! A record's per-sample columns are usually never looked at, so decoding them
//! is deferred until something asks for an entry. [`LazyGenotypesContext`]
//! starts out holding the raw text and the decoder for it, and turns into an
//! ordinary [`GenotypesContext`] on first access.
//!
//! ## States
//! ```text
//! Unparsed { raw, decoder } --first access--> Materialized(GenotypesContext)
//! ```
//! The transition happens at most once. A failed decode leaves the state (and
//! the raw text) untouched, so a later access retries.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info_span};

use crate::data::context::GenotypesContext;
use crate::data::genotype::Genotype;
use crate::error::{ContextError, Result};

/// Output of a [`GenotypeDecoder`]: entries plus ready-made caches.
///
/// The caches are `Arc`s so a decoder can hand the same pair to every record
/// it decodes.
#[derive(Clone, Debug, Default)]
pub struct DecodedGenotypes {
    pub genotypes: Vec<Genotype>,
    /// Must map every sample name in `genotypes` to its position
    pub sample_index: Arc<HashMap<Arc<str>, usize>>,
    /// Must be the sample names of `genotypes` in ascending order
    pub sorted_names: Arc<Vec<Arc<str>>>,
}

/// Turns raw per-sample text into genotype entries.
///
/// Implementations are shared by every record decoded against the same
/// header, so they are held behind an `Arc`.
pub trait GenotypeDecoder: fmt::Debug {
    fn decode(&self, raw: &str) -> Result<DecodedGenotypes>;
}

#[derive(Clone, Debug)]
enum LazyState {
    Unparsed {
        raw: Box<str>,
        decoder: Arc<dyn GenotypeDecoder>,
        n_samples: usize,
    },
    Materialized(GenotypesContext),
}

#[derive(Clone, Debug)]
pub struct LazyGenotypesContext {
    state: LazyState,
    /// Applied to the context at materialization
    immutable: bool,
}

impl LazyGenotypesContext {
    /// Defer decoding of `raw`. `n_samples` is the number of entries the
    /// decoder is expected to produce; it answers `is_empty` without decoding.
    pub fn new(
        raw: impl Into<Box<str>>,
        decoder: Arc<dyn GenotypeDecoder>,
        n_samples: usize,
    ) -> Self {
        Self {
            state: LazyState::Unparsed {
                raw: raw.into(),
                decoder,
                n_samples,
            },
            immutable: false,
        }
    }

    /// Already materialized
    pub fn from_context(context: GenotypesContext) -> Self {
        Self {
            state: LazyState::Materialized(context),
            immutable: false,
        }
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self.state, LazyState::Materialized(_))
    }

    /// Raw text still waiting to be decoded
    pub fn unparsed_text(&self) -> Option<&str> {
        match &self.state {
            LazyState::Unparsed { raw, .. } => Some(&**raw),
            LazyState::Materialized(_) => None,
        }
    }

    /// Answered without decoding
    pub fn is_empty(&self) -> bool {
        match &self.state {
            LazyState::Unparsed { n_samples, .. } => *n_samples == 0,
            LazyState::Materialized(context) => context.is_empty(),
        }
    }

    /// Freeze the context, now or as soon as it materializes
    pub fn set_immutable(&mut self) {
        self.immutable = true;
        if let LazyState::Materialized(context) = &mut self.state {
            context.set_immutable();
        }
    }

    /// Decode if still unparsed and return the underlying context
    pub fn materialize(&mut self) -> Result<&mut GenotypesContext> {
        if let LazyState::Unparsed {
            raw,
            decoder,
            n_samples,
        } = &self.state
        {
            let context = decode_context(raw, decoder.as_ref(), *n_samples, self.immutable)?;
            self.state = LazyState::Materialized(context);
        }

        match &mut self.state {
            LazyState::Materialized(context) => Ok(context),
            LazyState::Unparsed { .. } => Err(ContextError::invalid_data(
                "lazy genotypes are still unparsed after decoding",
            )),
        }
    }

    /// Shared access to the materialized context
    pub fn context(&mut self) -> Result<&GenotypesContext> {
        self.materialize().map(|context| &*context)
    }

    pub fn into_context(self) -> Result<GenotypesContext> {
        match self.state {
            LazyState::Materialized(context) => Ok(context),
            LazyState::Unparsed {
                raw,
                decoder,
                n_samples,
            } => decode_context(&raw, decoder.as_ref(), n_samples, self.immutable),
        }
    }

    pub fn len(&mut self) -> Result<usize> {
        Ok(self.context()?.len())
    }

    pub fn get(&mut self, index: usize) -> Result<Option<&Genotype>> {
        Ok(self.context()?.get(index))
    }

    pub fn by_name(&mut self, sample: &str) -> Result<Option<&Genotype>> {
        Ok(self.context()?.by_name(sample))
    }

    pub fn contains_sample(&mut self, sample: &str) -> Result<bool> {
        Ok(self.context()?.contains_sample(sample))
    }

    pub fn iter(&mut self) -> Result<std::slice::Iter<'_, Genotype>> {
        Ok(self.context()?.iter())
    }

    pub fn max_ploidy(&mut self, default_ploidy: i32) -> Result<usize> {
        self.context()?.max_ploidy(default_ploidy)
    }

    pub fn subset_to_samples<I, S>(&mut self, samples: I) -> Result<GenotypesContext>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.context()?.subset_to_samples(samples))
    }

    pub fn add(&mut self, genotype: Genotype) -> Result<()> {
        self.materialize()?.add(genotype)
    }
}

fn decode_context(
    raw: &str,
    decoder: &dyn GenotypeDecoder,
    n_samples: usize,
    immutable: bool,
) -> Result<GenotypesContext> {
    let decoded =
        info_span!("materialize_genotypes", n_samples).in_scope(|| decoder.decode(raw))?;
    debug!(
        n_genotypes = decoded.genotypes.len(),
        "materialized lazy genotypes"
    );

    let mut context =
        GenotypesContext::with_caches(decoded.genotypes, decoded.sample_index, decoded.sorted_names);
    if immutable {
        context.set_immutable();
    }
    Ok(context)
}

impl From<GenotypesContext> for LazyGenotypesContext {
    fn from(context: GenotypesContext) -> Self {
        Self::from_context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Decodes `name:ploidy,name:ploidy`; text `FAIL` is rejected
    #[derive(Debug, Default)]
    struct CountingDecoder {
        calls: Cell<usize>,
    }

    impl GenotypeDecoder for CountingDecoder {
        fn decode(&self, raw: &str) -> Result<DecodedGenotypes> {
            self.calls.set(self.calls.get() + 1);
            if raw == "FAIL" {
                return Err(ContextError::parse(0, "rejected"));
            }

            let mut genotypes = Vec::new();
            let mut sample_index = HashMap::new();
            let mut sorted_names = Vec::new();
            for (i, column) in raw.split(',').enumerate() {
                let (name, ploidy) = column
                    .split_once(':')
                    .ok_or_else(|| ContextError::parse(i, "missing ploidy"))?;
                let ploidy: usize = ploidy
                    .parse()
                    .map_err(|_| ContextError::parse(i, "bad ploidy"))?;
                let genotype = Genotype::new(name, vec![0; ploidy], true)?;
                sample_index.insert(Arc::clone(genotype.sample_name_arc()), i);
                sorted_names.push(Arc::clone(genotype.sample_name_arc()));
                genotypes.push(genotype);
            }
            sorted_names.sort_unstable();
            Ok(DecodedGenotypes {
                genotypes,
                sample_index: Arc::new(sample_index),
                sorted_names: Arc::new(sorted_names),
            })
        }
    }

    fn lazy(raw: &str) -> (LazyGenotypesContext, Arc<CountingDecoder>) {
        let decoder = Arc::new(CountingDecoder::default());
        let n_samples = raw.split(',').count();
        let ctx = LazyGenotypesContext::new(raw, decoder.clone(), n_samples);
        (ctx, decoder)
    }

    #[test]
    fn test_starts_unparsed() {
        let (ctx, decoder) = lazy("C:2,A:2,B:1");
        assert!(!ctx.is_materialized());
        assert!(!ctx.is_empty());
        assert_eq!(ctx.unparsed_text(), Some("C:2,A:2,B:1"));
        assert_eq!(decoder.calls.get(), 0);
    }

    #[test]
    fn test_first_access_materializes_once() {
        let (mut ctx, decoder) = lazy("C:2,A:2,B:1");
        assert_eq!(ctx.len().unwrap(), 3);
        assert!(ctx.is_materialized());
        assert!(ctx.unparsed_text().is_none());

        assert!(ctx.contains_sample("A").unwrap());
        assert_eq!(ctx.max_ploidy(0).unwrap(), 2);
        ctx.materialize().unwrap();
        assert_eq!(decoder.calls.get(), 1);
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let (mut once, _) = lazy("C:2,A:2,B:1");
        let (mut twice, _) = lazy("C:2,A:2,B:1");
        once.materialize().unwrap();
        twice.materialize().unwrap();
        twice.materialize().unwrap();

        let once = once.into_context().unwrap();
        let twice = twice.into_context().unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.sample_names_ordered(), twice.sample_names_ordered());
    }

    #[test]
    fn test_decoded_caches_are_used() {
        let (mut ctx, _) = lazy("C:2,A:2,B:1");
        let context = ctx.context().unwrap();
        assert!(context.caches().is_index_built());
        assert!(context.caches().is_sorted_names_built());
        assert_eq!(context.position_of("B"), Some(2));
    }

    #[test]
    fn test_decode_failure_keeps_raw_text() {
        let (mut ctx, decoder) = lazy("FAIL");
        assert!(matches!(ctx.len(), Err(ContextError::Parse { .. })));
        assert!(!ctx.is_materialized());
        assert_eq!(ctx.unparsed_text(), Some("FAIL"));

        assert!(ctx.materialize().is_err());
        assert_eq!(decoder.calls.get(), 2);
    }

    #[test]
    fn test_immutable_before_materialization() {
        let (mut ctx, _) = lazy("A:2");
        ctx.set_immutable();
        assert!(matches!(
            ctx.add(Genotype::no_call("B", 2).unwrap()),
            Err(ContextError::Immutable { .. })
        ));
        assert_eq!(ctx.len().unwrap(), 1);
    }

    #[test]
    fn test_mutation_after_materialization() {
        let (mut ctx, _) = lazy("A:2");
        ctx.add(Genotype::no_call("B", 2).unwrap()).unwrap();
        assert_eq!(ctx.by_name("B").unwrap().map(Genotype::ploidy), Some(2));

        let subset = ctx.subset_to_samples(["B"]).unwrap();
        assert_eq!(subset.len(), 1);
    }

    #[test]
    fn test_into_context_decodes_once() {
        let (ctx, decoder) = lazy("B:1,A:3");
        let context = ctx.into_context().unwrap();
        assert_eq!(decoder.calls.get(), 1);
        assert_eq!(context.max_ploidy(0).unwrap(), 3);

        let (failing, _) = lazy("FAIL");
        assert!(matches!(failing.into_context(), Err(ContextError::Parse { .. })));
    }

    #[test]
    fn test_immutable_carried_through_into_context() {
        let (mut ctx, _) = lazy("A:2");
        ctx.set_immutable();
        assert!(!ctx.into_context().unwrap().is_mutable());
    }

    #[test]
    fn test_from_context_is_materialized() {
        let ctx: LazyGenotypesContext = GenotypesContext::new().into();
        assert!(ctx.is_materialized());
        assert!(ctx.is_empty());
    }
}
