//! # Genotypes Context
//!
//! ## Role
//! The per-record collection of genotype entries. Insertion order is the
//! canonical order and positions are externally addressable; on top of that
//! the context offers O(1) lookup by sample name, a cached alphabetical
//! sample ordering and a cached maximum ploidy.
//!
//! ## Caches
//! All derived state lives in [`cache::SampleCaches`]. Caches are built on
//! first use behind `&self` and brought up to date by every mutator through a
//! single policy table (see the `cache` module docs). Sample names are
//! expected to be unique; with duplicates, name lookup resolves to the last
//! position holding that name, whether the index was built before or after
//! the mutation. Sample-order iteration still yields every entry once, with
//! duplicates of one name coming out last position first.
//!
//! ## Mutability
//! A context is mutable until [`GenotypesContext::set_immutable`] is called.
//! After that every mutator fails with [`ContextError::Immutable`] before
//! touching anything. [`GenotypesContext::freeze`] goes further and returns a
//! [`FrozenGenotypes`] view with no mutators at all.
//!
//! ## Submodules
//! - `cache`: index / sorted-name / max-ploidy caches and invalidation policy
//! - `view`: read-only capability traits and the frozen view
//! - `lazy`: deferred decoding of raw per-sample text

pub mod cache;
pub mod lazy;
pub mod view;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{ContextConfig, DEFAULT_INITIAL_CAPACITY};
use crate::data::genotype::Genotype;
use crate::error::{ContextError, Result};

use cache::{Mutation, SampleCaches, SampleIndex, SortedNames};
pub use lazy::{DecodedGenotypes, GenotypeDecoder, LazyGenotypesContext};
pub use view::{FrozenGenotypes, GenotypeAccess, SampleLookup};

#[derive(Debug)]
pub struct GenotypesContext {
    /// Entries in canonical order
    genotypes: Vec<Genotype>,
    /// Derived lookup state
    caches: SampleCaches,
    /// Set once by `set_immutable`, never cleared
    immutable: bool,
}

impl GenotypesContext {
    /// The shared empty context: immutable and allocation-free
    pub const fn no_genotypes() -> Self {
        Self {
            genotypes: Vec::new(),
            caches: SampleCaches::new(),
            immutable: true,
        }
    }

    /// Empty mutable context with the default capacity hint
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_genotypes(Vec::with_capacity(capacity))
    }

    /// Empty mutable context sized from `config`
    pub fn from_config(config: &ContextConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_capacity(config.initial_capacity))
    }

    /// Mutable context over `genotypes`; caches are built on demand
    pub fn from_genotypes(genotypes: Vec<Genotype>) -> Self {
        Self {
            genotypes,
            caches: SampleCaches::new(),
            immutable: false,
        }
    }

    /// Mutable context with precomputed caches.
    ///
    /// `sample_index` and `sorted_names` are trusted to describe `genotypes`
    /// exactly; nothing is checked. Passing an `Arc` shares the caches with
    /// other contexts until one of them mutates.
    pub fn with_caches(
        genotypes: Vec<Genotype>,
        sample_index: impl Into<Arc<HashMap<Arc<str>, usize>>>,
        sorted_names: impl Into<Arc<SortedNames>>,
    ) -> Self {
        Self {
            genotypes,
            caches: SampleCaches::from_parts(sample_index.into(), sorted_names.into()),
            immutable: false,
        }
    }

    /// Independent mutable copy: new container, same entries, cold caches
    pub fn to_mutable(&self) -> Self {
        Self::from_genotypes(self.genotypes.clone())
    }

    /// Make every later mutation fail. One-way.
    pub fn set_immutable(&mut self) {
        self.immutable = true;
    }

    pub fn is_mutable(&self) -> bool {
        !self.immutable
    }

    /// Consume into a read-only view
    pub fn freeze(self) -> FrozenGenotypes {
        FrozenGenotypes::new(self)
    }

    fn check_mutable(&self, operation: &'static str) -> Result<()> {
        if self.immutable {
            return Err(ContextError::immutable(operation));
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.genotypes.len() {
            return Err(ContextError::out_of_bounds(index, self.genotypes.len()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Append at the end
    pub fn add(&mut self, genotype: Genotype) -> Result<()> {
        self.check_mutable("add")?;
        let position = self.genotypes.len();
        self.genotypes.push(genotype);
        self.caches.apply(Mutation::Append {
            first_position: position,
            appended: &self.genotypes[position..],
        });
        Ok(())
    }

    /// Append every entry of `genotypes`, in order
    pub fn add_all<I>(&mut self, genotypes: I) -> Result<()>
    where
        I: IntoIterator<Item = Genotype>,
    {
        self.check_mutable("add_all")?;
        let first_position = self.genotypes.len();
        self.genotypes.extend(genotypes);
        self.caches.apply(Mutation::Append {
            first_position,
            appended: &self.genotypes[first_position..],
        });
        Ok(())
    }

    /// Replace the entry at `index`, returning the previous one
    pub fn set(&mut self, index: usize, genotype: Genotype) -> Result<Genotype> {
        self.check_mutable("set")?;
        self.check_index(index)?;
        let previous = std::mem::replace(&mut self.genotypes[index], genotype);
        self.caches.apply(Mutation::Replace {
            position: index,
            previous: &previous,
            entries: &self.genotypes,
        });
        Ok(previous)
    }

    /// Remove and return the entry at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<Genotype> {
        self.check_mutable("remove_at")?;
        self.check_index(index)?;
        let removed = self.genotypes.remove(index);
        self.caches.apply(Mutation::Remove);
        Ok(removed)
    }

    /// Remove the first entry equal to `genotype`. Returns whether one was found.
    pub fn remove(&mut self, genotype: &Genotype) -> Result<bool> {
        self.check_mutable("remove")?;
        let found = match self.genotypes.iter().position(|g| g == genotype) {
            Some(position) => {
                self.genotypes.remove(position);
                true
            }
            None => false,
        };
        self.caches.apply(Mutation::Remove);
        Ok(found)
    }

    /// Remove one matching entry per element of `genotypes`.
    ///
    /// All-or-nothing: if any requested entry has no match, the context is
    /// left untouched and [`ContextError::MissingGenotypes`] is returned.
    pub fn remove_all(&mut self, genotypes: &[Genotype]) -> Result<()> {
        self.check_mutable("remove_all")?;

        let mut doomed = vec![false; self.genotypes.len()];
        let mut missing = 0usize;
        for requested in genotypes {
            let hit = self
                .genotypes
                .iter()
                .enumerate()
                .position(|(i, g)| !doomed[i] && g == requested);
            match hit {
                Some(i) => doomed[i] = true,
                None => missing += 1,
            }
        }
        if missing > 0 {
            return Err(ContextError::MissingGenotypes { count: missing });
        }

        let mut position = 0;
        self.genotypes.retain(|_| {
            let keep = !doomed[position];
            position += 1;
            keep
        });
        self.caches.apply(Mutation::Remove);
        Ok(())
    }

    /// Keep only entries equal to one in `keep`. Returns whether anything was removed.
    pub fn retain_all(&mut self, keep: &[Genotype]) -> Result<bool> {
        self.check_mutable("retain_all")?;
        let before = self.genotypes.len();
        self.genotypes.retain(|g| keep.contains(g));
        self.caches.apply(Mutation::Remove);
        Ok(self.genotypes.len() != before)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.check_mutable("clear")?;
        self.genotypes.clear();
        self.caches.apply(Mutation::Clear);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.genotypes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Genotype> {
        self.genotypes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Genotype> {
        self.genotypes.iter()
    }

    pub fn as_slice(&self) -> &[Genotype] {
        &self.genotypes
    }

    /// Snapshot copy of the entries in current order
    pub fn to_vec(&self) -> Vec<Genotype> {
        self.genotypes.clone()
    }

    pub fn into_genotypes(self) -> Vec<Genotype> {
        self.genotypes
    }

    fn sample_index(&self) -> &SampleIndex {
        self.caches.index(&self.genotypes)
    }

    /// Entry for `sample`, or `None` if absent
    pub fn by_name(&self, sample: &str) -> Option<&Genotype> {
        self.sample_index()
            .get(sample)
            .map(|&i| &self.genotypes[i])
    }

    /// Position of `sample` in the entry list
    pub fn position_of(&self, sample: &str) -> Option<usize> {
        self.sample_index().get(sample).copied()
    }

    pub fn contains_sample(&self, sample: &str) -> bool {
        self.sample_index().contains_key(sample)
    }

    /// True if every name in `samples` has an entry
    pub fn contains_samples<I, S>(&self, samples: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = self.sample_index();
        samples.into_iter().all(|s| index.contains_key(s.as_ref()))
    }

    /// All sample names, arbitrary order
    pub fn sample_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sample_index().keys().map(|name| name.as_ref())
    }

    /// Sample names in ascending lexical order
    pub fn sample_names_ordered(&self) -> &[Arc<str>] {
        self.caches.sorted_names(&self.genotypes)
    }

    /// Entries in ascending sample-name order. Cloning the iterator restarts it.
    pub fn iter_in_sample_name_order(&self) -> SampleOrderIter<'_> {
        SampleOrderIter {
            genotypes: &self.genotypes,
            index: self.sample_index(),
            names: self.sample_names_ordered().iter(),
            previous: None,
        }
    }

    /// Entries in the order given by `samples`.
    ///
    /// Each name is resolved through the sample index; a name with no entry
    /// yields [`ContextError::UnknownSample`] at that position.
    pub fn iter_in_order<'a, I, S>(
        &'a self,
        samples: I,
    ) -> impl Iterator<Item = Result<&'a Genotype>> + 'a
    where
        I: IntoIterator<Item = S> + 'a,
        I::IntoIter: 'a,
        S: AsRef<str> + 'a,
    {
        let index = self.sample_index();
        samples.into_iter().map(move |s| {
            let name = s.as_ref();
            index
                .get(name)
                .map(|&i| &self.genotypes[i])
                .ok_or_else(|| ContextError::UnknownSample {
                    name: name.to_string(),
                })
        })
    }

    // ------------------------------------------------------------------
    // Derived views and aggregates
    // ------------------------------------------------------------------

    /// Maximum ploidy across entries.
    ///
    /// Returns `default_ploidy` when the context is empty or every entry has
    /// ploidy 0. Fails if `default_ploidy` is negative.
    pub fn max_ploidy(&self, default_ploidy: i32) -> Result<usize> {
        let default_ploidy = usize::try_from(default_ploidy)
            .map_err(|_| ContextError::InvalidPloidy {
                ploidy: default_ploidy,
            })?;
        let max = self.caches.max_ploidy(&self.genotypes);
        Ok(if max == 0 { default_ploidy } else { max })
    }

    /// [`Self::max_ploidy`] with the configured default ploidy
    pub fn max_ploidy_with(&self, config: &ContextConfig) -> usize {
        match self.caches.max_ploidy(&self.genotypes) {
            0 => config.default_ploidy as usize,
            max => max,
        }
    }

    /// New mutable context holding the entries for `samples`, in the order
    /// `samples` yields them. Names without an entry are skipped. An empty
    /// `samples` returns [`Self::no_genotypes`].
    pub fn subset_to_samples<I, S>(&self, samples: I) -> GenotypesContext
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut samples = samples.into_iter().peekable();
        if samples.peek().is_none() {
            return Self::no_genotypes();
        }

        let index = self.sample_index();
        let subset: Vec<Genotype> = samples
            .filter_map(|s| index.get(s.as_ref()).map(|&i| self.genotypes[i].clone()))
            .collect();
        Self::from_genotypes(subset)
    }

    #[cfg(test)]
    pub(crate) fn caches(&self) -> &SampleCaches {
        &self.caches
    }
}

impl Default for GenotypesContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Same entries and mutability, cold caches
impl Clone for GenotypesContext {
    fn clone(&self) -> Self {
        Self {
            genotypes: self.genotypes.clone(),
            caches: SampleCaches::new(),
            immutable: self.immutable,
        }
    }
}

/// Entry-wise equality; caches and mutability are not compared
impl PartialEq for GenotypesContext {
    fn eq(&self, other: &Self) -> bool {
        self.genotypes == other.genotypes
    }
}

impl std::ops::Index<usize> for GenotypesContext {
    type Output = Genotype;

    fn index(&self, index: usize) -> &Self::Output {
        &self.genotypes[index]
    }
}

impl FromIterator<Genotype> for GenotypesContext {
    fn from_iter<T: IntoIterator<Item = Genotype>>(iter: T) -> Self {
        Self::from_genotypes(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a GenotypesContext {
    type Item = &'a Genotype;
    type IntoIter = std::slice::Iter<'a, Genotype>;

    fn into_iter(self) -> Self::IntoIter {
        self.genotypes.iter()
    }
}

/// Diagnostic rendering: entries in sample-name order, `[a,b,c]`
impl fmt::Display for GenotypesContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, genotype) in self.iter_in_sample_name_order().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", genotype)?;
        }
        f.write_str("]")
    }
}

/// Iterator over a context's entries in ascending sample-name order
#[derive(Clone, Debug)]
pub struct SampleOrderIter<'a> {
    genotypes: &'a [Genotype],
    index: &'a SampleIndex,
    names: std::slice::Iter<'a, Arc<str>>,
    /// Name and position of the last entry yielded
    previous: Option<(&'a str, usize)>,
}

impl<'a> Iterator for SampleOrderIter<'a> {
    type Item = &'a Genotype;

    fn next(&mut self) -> Option<Self::Item> {
        let name: &'a str = self.names.next()?;
        let position = match self.previous {
            // Repeated name: step back to the next earlier entry holding it
            Some((previous, end)) if previous == name => self.genotypes[..end]
                .iter()
                .rposition(|g| g.sample_name() == name)?,
            _ => *self.index.get(name)?,
        };
        self.previous = Some((name, position));
        Some(&self.genotypes[position])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gt(name: &str, ploidy: usize) -> Genotype {
        Genotype::new(name, vec![0; ploidy], false).unwrap()
    }

    fn cab() -> GenotypesContext {
        GenotypesContext::from_genotypes(vec![gt("C", 2), gt("A", 2), gt("B", 1)])
    }

    fn names<'a>(iter: impl Iterator<Item = &'a Genotype>) -> Vec<&'a str> {
        iter.map(Genotype::sample_name).collect()
    }

    #[test]
    fn test_reference_scenario() {
        let mut ctx = cab();
        let sorted: Vec<&str> = ctx.sample_names_ordered().iter().map(|s| s.as_ref()).collect();
        assert_eq!(sorted, vec!["A", "B", "C"]);
        assert_eq!(names(ctx.iter_in_sample_name_order()), vec!["A", "B", "C"]);
        assert_eq!(ctx.max_ploidy(0).unwrap(), 2);

        let removed = ctx.remove_at(1).unwrap();
        assert_eq!(removed.sample_name(), "A");
        assert!(!ctx.contains_sample("A"));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_no_genotypes() {
        let mut empty = GenotypesContext::no_genotypes();
        assert!(empty.is_empty());
        assert!(!empty.is_mutable());
        assert_eq!(empty.genotypes.capacity(), 0);
        assert!(matches!(
            empty.add(gt("A", 2)),
            Err(ContextError::Immutable { operation: "add" })
        ));
    }

    #[test]
    fn test_add_extends_warm_index() {
        let mut ctx = cab();
        assert!(ctx.contains_sample("C"));
        assert!(ctx.caches().is_index_built());

        ctx.add(gt("D", 2)).unwrap();
        assert!(ctx.caches().is_index_built());
        assert!(!ctx.caches().is_sorted_names_built());
        assert_eq!(ctx[ctx.len() - 1].sample_name(), "D");
        assert_eq!(ctx.position_of("D"), Some(3));
    }

    #[test]
    fn test_add_keeps_cold_index_cold() {
        let mut ctx = cab();
        ctx.add(gt("D", 2)).unwrap();
        assert!(!ctx.caches().is_index_built());
        assert_eq!(ctx.by_name("D").map(Genotype::ploidy), Some(2));
    }

    #[test]
    fn test_add_all() {
        let mut ctx = cab();
        ctx.sample_names_ordered();
        ctx.add_all(vec![gt("E", 2), gt("D", 4)]).unwrap();
        assert_eq!(ctx.len(), 5);
        let sorted: Vec<&str> = ctx.sample_names_ordered().iter().map(|s| s.as_ref()).collect();
        assert_eq!(sorted, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(ctx.max_ploidy(0).unwrap(), 4);
    }

    #[test]
    fn test_set_rebinds_name() {
        let mut ctx = cab();
        assert!(ctx.contains_sample("A"));

        let previous = ctx.set(1, gt("Z", 3)).unwrap();
        assert_eq!(previous.sample_name(), "A");
        assert!(!ctx.contains_sample("A"));
        assert_eq!(ctx.position_of("Z"), Some(1));
        assert_eq!(ctx.sample_names_ordered().last().map(|s| s.as_ref()), Some("Z"));
    }

    #[test]
    fn test_set_with_duplicates_matches_cold_copy() {
        let build = || {
            GenotypesContext::from_genotypes(vec![gt("A", 1), gt("A", 2), gt("B", 2), gt("C", 1)])
        };

        let mut warm = build();
        assert!(warm.contains_sample("A"));
        let mut cold = build();

        for ctx in [&mut warm, &mut cold] {
            ctx.set(1, gt("Z", 2)).unwrap();
            ctx.set(0, gt("C", 3)).unwrap();
        }
        assert!(warm.caches().is_index_built());
        assert!(!cold.caches().is_index_built());

        for name in ["A", "B", "C", "Z"] {
            assert_eq!(warm.position_of(name), cold.position_of(name), "{}", name);
        }
        assert!(!warm.contains_sample("A"));
        assert_eq!(warm.position_of("C"), Some(3));
    }

    #[test]
    fn test_set_vacated_name_falls_back_to_earlier_duplicate() {
        let mut ctx = GenotypesContext::from_genotypes(vec![gt("A", 1), gt("A", 2), gt("B", 2)]);
        assert_eq!(ctx.position_of("A"), Some(1));

        ctx.set(1, gt("Z", 2)).unwrap();
        assert!(ctx.contains_sample("A"));
        assert_eq!(ctx.by_name("A").map(Genotype::ploidy), Some(1));
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut ctx = cab();
        assert!(matches!(
            ctx.set(3, gt("Z", 2)),
            Err(ContextError::IndexOutOfBounds { index: 3, len: 3 })
        ));
        assert_eq!(ctx.len(), 3);
        assert!(matches!(
            ctx.remove_at(7),
            Err(ContextError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_remove_invalidates_index() {
        let mut ctx = cab();
        assert_eq!(ctx.position_of("B"), Some(2));
        assert!(ctx.remove(&gt("C", 2)).unwrap());
        assert!(!ctx.caches().is_index_built());
        assert_eq!(ctx.position_of("B"), Some(1));
        assert!(!ctx.remove(&gt("C", 2)).unwrap());
    }

    #[test]
    fn test_remove_all_is_atomic() {
        let mut ctx = cab();
        let result = ctx.remove_all(&[gt("A", 2), gt("Q", 2)]);
        assert!(matches!(result, Err(ContextError::MissingGenotypes { count: 1 })));
        assert_eq!(ctx.len(), 3);
        assert!(ctx.contains_sample("A"));

        ctx.remove_all(&[gt("A", 2), gt("C", 2)]).unwrap();
        assert_eq!(names(ctx.iter()), vec!["B"]);
    }

    #[test]
    fn test_remove_all_counts_duplicates() {
        let mut ctx = cab();
        let result = ctx.remove_all(&[gt("A", 2), gt("A", 2)]);
        assert!(matches!(result, Err(ContextError::MissingGenotypes { count: 1 })));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_retain_all_and_clear() {
        let mut ctx = cab();
        assert!(ctx.retain_all(&[gt("B", 1)]).unwrap());
        assert_eq!(names(ctx.iter()), vec!["B"]);
        assert!(!ctx.retain_all(&[gt("B", 1)]).unwrap());

        ctx.clear().unwrap();
        assert!(ctx.is_empty());
        assert!(ctx.sample_names_ordered().is_empty());
    }

    #[test]
    fn test_immutable_rejects_every_mutator() {
        let mut ctx = cab();
        ctx.set_immutable();

        assert!(ctx.add(gt("D", 2)).is_err());
        assert!(ctx.add_all(vec![gt("D", 2)]).is_err());
        assert!(ctx.set(0, gt("D", 2)).is_err());
        assert!(ctx.remove_at(0).is_err());
        assert!(ctx.remove(&gt("C", 2)).is_err());
        assert!(ctx.remove_all(&[gt("C", 2)]).is_err());
        assert!(ctx.retain_all(&[]).is_err());
        assert!(ctx.clear().is_err());
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_max_ploidy() {
        assert_eq!(GenotypesContext::new().max_ploidy(2).unwrap(), 2);

        let zeros = GenotypesContext::from_genotypes(vec![gt("A", 0), gt("B", 0)]);
        assert_eq!(zeros.max_ploidy(4).unwrap(), 4);

        let mixed = GenotypesContext::from_genotypes(vec![gt("A", 0), gt("B", 2), gt("C", 3)]);
        assert_eq!(mixed.max_ploidy(0).unwrap(), 3);
        assert_eq!(mixed.max_ploidy(7).unwrap(), 3);

        assert!(matches!(
            mixed.max_ploidy(-1),
            Err(ContextError::InvalidPloidy { ploidy: -1 })
        ));
    }

    #[test]
    fn test_max_ploidy_tracks_mutation() {
        let mut ctx = cab();
        assert_eq!(ctx.max_ploidy(0).unwrap(), 2);
        ctx.add(gt("T", 6)).unwrap();
        assert_eq!(ctx.max_ploidy(0).unwrap(), 6);
        ctx.remove_at(3).unwrap();
        assert_eq!(ctx.max_ploidy(0).unwrap(), 2);
    }

    #[test]
    fn test_max_ploidy_with_config() {
        let config = ContextConfig::default().with_default_ploidy(1);
        assert_eq!(GenotypesContext::new().max_ploidy_with(&config), 1);
        assert_eq!(cab().max_ploidy_with(&config), 2);
    }

    #[test]
    fn test_subset_to_samples() {
        let ctx = cab();
        let subset = ctx.subset_to_samples(["B", "X", "C"]);
        assert!(subset.is_mutable());
        assert_eq!(names(subset.iter()), vec!["B", "C"]);

        let empty = ctx.subset_to_samples(Vec::<String>::new());
        assert!(empty.is_empty());
        assert!(!empty.is_mutable());
    }

    #[test]
    fn test_iter_in_order() {
        let ctx = cab();
        let ordered: Vec<&str> = ctx
            .iter_in_order(["B", "C"])
            .map(|g| g.unwrap().sample_name())
            .collect();
        assert_eq!(ordered, vec!["B", "C"]);

        let mut with_unknown = ctx.iter_in_order(["A", "nope"]);
        assert!(with_unknown.next().unwrap().is_ok());
        assert!(matches!(
            with_unknown.next().unwrap(),
            Err(ContextError::UnknownSample { .. })
        ));
    }

    #[test]
    fn test_sample_order_iter_restarts() {
        let ctx = cab();
        let iter = ctx.iter_in_sample_name_order();
        let again = iter.clone();
        assert_eq!(names(iter), names(again));
    }

    #[test]
    fn test_sample_order_iter_yields_each_duplicate() {
        let ctx = GenotypesContext::from_genotypes(vec![gt("B", 3), gt("A", 1), gt("A", 2)]);
        let ploidies: Vec<usize> = ctx.iter_in_sample_name_order().map(Genotype::ploidy).collect();
        assert_eq!(ploidies, vec![2, 1, 3]);
        assert_eq!(ctx.to_string(), "[A 0/0,A 0,B 0/0/0]");
    }

    #[test]
    fn test_sample_names_and_contains_samples() {
        let ctx = cab();
        let mut all: Vec<&str> = ctx.sample_names().collect();
        all.sort_unstable();
        assert_eq!(all, vec!["A", "B", "C"]);
        assert!(ctx.contains_samples(["A", "B"]));
        assert!(ctx.contains_samples(Vec::<&str>::new()));
        assert!(!ctx.contains_samples(["A", "Q"]));
        assert!(ctx.by_name("Q").is_none());
    }

    #[test]
    fn test_copy_is_independent() {
        let ctx = cab();
        let mut copy = ctx.to_mutable();
        assert_eq!(copy.to_vec(), ctx.to_vec());
        copy.remove_at(0).unwrap();
        copy.add(gt("Q", 2)).unwrap();
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx[0].sample_name(), "C");
    }

    #[test]
    fn test_with_caches_trusted() {
        let genotypes = vec![gt("B", 2), gt("A", 2)];
        let index: HashMap<Arc<str>, usize> =
            [(Arc::from("B"), 0), (Arc::from("A"), 1)].into_iter().collect();
        let sorted: Vec<Arc<str>> = vec![Arc::from("A"), Arc::from("B")];
        let ctx = GenotypesContext::with_caches(genotypes, index, sorted);
        assert!(ctx.caches().is_index_built());
        assert!(ctx.caches().is_sorted_names_built());
        assert_eq!(ctx.by_name("A").map(Genotype::sample_name), Some("A"));
    }

    #[test]
    fn test_display() {
        assert_eq!(cab().to_string(), "[A 0/0,B 0,C 0/0]");
        assert_eq!(GenotypesContext::no_genotypes().to_string(), "[]");
    }
}
