//! # Capability Views
//!
//! Read access to a genotype collection is split into two contracts so that a
//! caller can be handed lookup capability without mutation capability:
//!
//! - [`GenotypeAccess`]: positional access and iteration.
//! - [`SampleLookup`]: name lookup, membership and sample ordering.
//!
//! Mutation is not a trait; it lives on [`GenotypesContext`] itself. A
//! [`FrozenGenotypes`] implements both read contracts and nothing else, so
//! mutating a frozen collection does not compile.

use std::fmt;
use std::sync::Arc;

use crate::data::context::{GenotypesContext, SampleOrderIter};
use crate::data::genotype::Genotype;
use crate::error::Result;

/// Ordered, positional access
pub trait GenotypeAccess {
    /// Entries in insertion order
    fn genotypes(&self) -> &[Genotype];

    fn len(&self) -> usize {
        self.genotypes().len()
    }

    fn is_empty(&self) -> bool {
        self.genotypes().is_empty()
    }

    fn get(&self, index: usize) -> Option<&Genotype> {
        self.genotypes().get(index)
    }

    fn iter(&self) -> std::slice::Iter<'_, Genotype> {
        self.genotypes().iter()
    }

    /// Snapshot copy of the entries in current order
    fn to_vec(&self) -> Vec<Genotype> {
        self.genotypes().to_vec()
    }
}

/// Name-indexed access
pub trait SampleLookup: GenotypeAccess {
    /// Entry for `sample`, or `None` if absent
    fn by_name(&self, sample: &str) -> Option<&Genotype>;

    /// Sample names in ascending lexical order
    fn sample_names_ordered(&self) -> &[Arc<str>];

    /// Entries in ascending sample-name order
    fn iter_in_sample_name_order(&self) -> SampleOrderIter<'_>;

    /// Maximum ploidy, or `default_ploidy` if every entry has ploidy 0
    fn max_ploidy(&self, default_ploidy: i32) -> Result<usize>;

    fn contains_sample(&self, sample: &str) -> bool {
        self.by_name(sample).is_some()
    }

    /// True if every name in `samples` has an entry
    fn contains_samples<I, S>(&self, samples: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        Self: Sized,
    {
        samples
            .into_iter()
            .all(|s| self.contains_sample(s.as_ref()))
    }
}

impl GenotypeAccess for GenotypesContext {
    fn genotypes(&self) -> &[Genotype] {
        self.as_slice()
    }
}

impl SampleLookup for GenotypesContext {
    fn by_name(&self, sample: &str) -> Option<&Genotype> {
        GenotypesContext::by_name(self, sample)
    }

    fn sample_names_ordered(&self) -> &[Arc<str>] {
        GenotypesContext::sample_names_ordered(self)
    }

    fn iter_in_sample_name_order(&self) -> SampleOrderIter<'_> {
        GenotypesContext::iter_in_sample_name_order(self)
    }

    fn max_ploidy(&self, default_ploidy: i32) -> Result<usize> {
        GenotypesContext::max_ploidy(self, default_ploidy)
    }
}

/// Read-only view over a context's storage.
///
/// Obtained from [`GenotypesContext::freeze`]. Lookup caches keep working
/// (they are built on demand behind shared references); the entry list
/// itself can no longer change.
#[derive(Clone, Debug, PartialEq)]
pub struct FrozenGenotypes {
    inner: GenotypesContext,
}

impl FrozenGenotypes {
    pub(crate) fn new(mut inner: GenotypesContext) -> Self {
        inner.set_immutable();
        Self { inner }
    }

    /// Mutable copy of the frozen entries
    pub fn thaw(&self) -> GenotypesContext {
        self.inner.to_mutable()
    }

    /// Restricted copy containing only `samples`, see [`GenotypesContext::subset_to_samples`]
    pub fn subset_to_samples<I, S>(&self, samples: I) -> GenotypesContext
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.subset_to_samples(samples)
    }

    /// All sample names, arbitrary order
    pub fn sample_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.sample_names()
    }
}

impl GenotypeAccess for FrozenGenotypes {
    fn genotypes(&self) -> &[Genotype] {
        self.inner.as_slice()
    }
}

impl SampleLookup for FrozenGenotypes {
    fn by_name(&self, sample: &str) -> Option<&Genotype> {
        self.inner.by_name(sample)
    }

    fn sample_names_ordered(&self) -> &[Arc<str>] {
        self.inner.sample_names_ordered()
    }

    fn iter_in_sample_name_order(&self) -> SampleOrderIter<'_> {
        self.inner.iter_in_sample_name_order()
    }

    fn max_ploidy(&self, default_ploidy: i32) -> Result<usize> {
        self.inner.max_ploidy(default_ploidy)
    }
}

impl std::ops::Index<usize> for FrozenGenotypes {
    type Output = Genotype;

    fn index(&self, index: usize) -> &Self::Output {
        &self.inner[index]
    }
}

impl fmt::Display for FrozenGenotypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> GenotypesContext {
        ["C", "A", "B"]
            .into_iter()
            .map(|name| Genotype::new(name, vec![0, 1], true).unwrap())
            .collect()
    }

    /// Works against any read-only collection
    fn first_sorted_name<V: SampleLookup>(view: &V) -> Option<String> {
        view.sample_names_ordered().first().map(|s| s.to_string())
    }

    #[test]
    fn test_frozen_read_access() {
        let frozen = context().freeze();
        assert_eq!(frozen.len(), 3);
        assert_eq!(frozen[0].sample_name(), "C");
        assert_eq!(frozen.by_name("B").map(Genotype::sample_name), Some("B"));
        assert!(frozen.contains_samples(["A", "C"]));
        assert!(!frozen.contains_samples(["A", "D"]));
        assert_eq!(first_sorted_name(&frozen), Some("A".to_string()));
        assert_eq!(frozen.max_ploidy(0).unwrap(), 2);
    }

    #[test]
    fn test_same_contract_for_both_views() {
        let ctx = context();
        assert_eq!(first_sorted_name(&ctx), Some("A".to_string()));
        let frozen = ctx.freeze();
        assert_eq!(first_sorted_name(&frozen), Some("A".to_string()));
    }

    #[test]
    fn test_thaw_is_independent() {
        let frozen = context().freeze();
        let mut thawed = frozen.thaw();
        assert!(thawed.is_mutable());
        thawed.remove_at(0).unwrap();
        assert_eq!(thawed.len(), 2);
        assert_eq!(frozen.len(), 3);
    }

    #[test]
    fn test_frozen_display() {
        let frozen = context().freeze();
        assert_eq!(frozen.to_string(), "[A 0|1,B 0|1,C 0|1]");
    }
}
