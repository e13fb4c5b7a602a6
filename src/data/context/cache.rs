//! # Sample Caches
//!
//! Derived lookup structures kept alongside a context's entry list. All three
//! caches are cold until first use and are built from the current entries in
//! a single pass.
//!
//! ## Invalidation Policy
//! Every structural mutation goes through [`SampleCaches::apply`], which reads
//! the effect from [`Mutation::cache_effect`]. The table is the only place
//! the rules live:
//!
//! | mutation  | operations                                   | index cache | sorted names | max ploidy |
//! |-----------|----------------------------------------------|-------------|--------------|------------|
//! | `Append`  | `add`, `add_all`                             | extend      | drop         | drop       |
//! | `Replace` | `set`                                        | rebind      | drop         | drop       |
//! | `Remove`  | `remove_at`, `remove`, `remove_all`, `retain_all` | drop   | drop         | drop       |
//! | `Clear`   | `clear`                                      | drop        | drop         | drop       |
//!
//! `extend` and `rebind` only touch an index that is already built; a cold
//! index stays cold. Removal shifts every later position, so it always drops.
//!
//! Both incremental effects keep the full-build rule for duplicate names: a
//! name maps to the last position holding it. `rebind` therefore hands a
//! vacated name back to an earlier duplicate if one survives, and leaves the
//! new name alone if a later position already holds it.
//!
//! Built index and sorted names sit behind `Arc`, so precomputed caches can
//! be shared between contexts; an incremental update copies on write.

use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::data::genotype::Genotype;

/// Sample name to position in the entry list
pub type SampleIndex = HashMap<Arc<str>, usize>;

/// Sample names in ascending order, duplicates kept
pub type SortedNames = Vec<Arc<str>>;

/// What a mutation does to the sample index cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexEffect {
    /// Insert the appended names at their new positions
    Extend,
    /// Re-resolve the replaced name and map the new one to the same position
    Rebind,
    /// Discard the index
    Drop,
}

/// Effect of one mutation on every cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheEffect {
    pub index: IndexEffect,
    pub drop_sorted_names: bool,
    pub drop_max_ploidy: bool,
}

/// A structural change to the entry list, described after it happened
#[derive(Debug)]
pub enum Mutation<'a> {
    /// `appended` now occupies positions `first_position..`
    Append {
        first_position: usize,
        appended: &'a [Genotype],
    },
    /// `previous` at `position` was replaced; `entries` is the list afterwards
    Replace {
        position: usize,
        previous: &'a Genotype,
        entries: &'a [Genotype],
    },
    Remove,
    Clear,
}

impl Mutation<'_> {
    pub const fn cache_effect(&self) -> CacheEffect {
        match self {
            Mutation::Append { .. } => CacheEffect {
                index: IndexEffect::Extend,
                drop_sorted_names: true,
                drop_max_ploidy: true,
            },
            Mutation::Replace { .. } => CacheEffect {
                index: IndexEffect::Rebind,
                drop_sorted_names: true,
                drop_max_ploidy: true,
            },
            Mutation::Remove | Mutation::Clear => CacheEffect {
                index: IndexEffect::Drop,
                drop_sorted_names: true,
                drop_max_ploidy: true,
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct SampleCaches {
    index: OnceCell<Arc<SampleIndex>>,
    sorted_names: OnceCell<Arc<SortedNames>>,
    max_ploidy: Cell<Option<usize>>,
}

impl SampleCaches {
    /// All caches cold. Allocation-free.
    pub const fn new() -> Self {
        Self {
            index: OnceCell::new(),
            sorted_names: OnceCell::new(),
            max_ploidy: Cell::new(None),
        }
    }

    /// Caches supplied by the caller. They are trusted to match the entries.
    pub fn from_parts(index: Arc<SampleIndex>, sorted_names: Arc<SortedNames>) -> Self {
        Self {
            index: OnceCell::from(index),
            sorted_names: OnceCell::from(sorted_names),
            max_ploidy: Cell::new(None),
        }
    }

    pub fn is_index_built(&self) -> bool {
        self.index.get().is_some()
    }

    pub fn is_sorted_names_built(&self) -> bool {
        self.sorted_names.get().is_some()
    }

    pub fn is_max_ploidy_built(&self) -> bool {
        self.max_ploidy.get().is_some()
    }

    /// Sample index, built on first use. With duplicate names the last
    /// position wins, the same rule `Append` follows.
    pub fn index(&self, entries: &[Genotype]) -> &SampleIndex {
        self.index.get_or_init(|| {
            trace!(n_entries = entries.len(), "building sample index cache");
            Arc::new(
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, g)| (Arc::clone(g.sample_name_arc()), i))
                    .collect(),
            )
        })
    }

    /// Sample names in ascending lexical order, duplicates kept
    pub fn sorted_names(&self, entries: &[Genotype]) -> &[Arc<str>] {
        self.sorted_names.get_or_init(|| {
            trace!(n_entries = entries.len(), "building sorted sample name cache");
            let mut names: Vec<Arc<str>> = entries
                .iter()
                .map(|g| Arc::clone(g.sample_name_arc()))
                .collect();
            names.sort_unstable();
            Arc::new(names)
        })
    }

    /// Largest ploidy across `entries`, 0 when empty
    pub fn max_ploidy(&self, entries: &[Genotype]) -> usize {
        if let Some(max) = self.max_ploidy.get() {
            return max;
        }
        let max = entries.iter().map(Genotype::ploidy).max().unwrap_or(0);
        self.max_ploidy.set(Some(max));
        max
    }

    /// Bring the caches in line with a mutation that has already been applied
    pub fn apply(&mut self, mutation: Mutation<'_>) {
        let effect = mutation.cache_effect();

        match effect.index {
            IndexEffect::Extend => {
                if let (Some(index), Mutation::Append { first_position, appended }) =
                    (self.index.get_mut(), &mutation)
                {
                    let index = Arc::make_mut(index);
                    for (offset, g) in appended.iter().enumerate() {
                        index.insert(Arc::clone(g.sample_name_arc()), first_position + offset);
                    }
                }
            }
            IndexEffect::Rebind => {
                if let (
                    Some(index),
                    Mutation::Replace {
                        position,
                        previous,
                        entries,
                    },
                ) = (self.index.get_mut(), &mutation)
                {
                    rebind(Arc::make_mut(index), *position, previous, entries);
                }
            }
            IndexEffect::Drop => {
                if self.index.take().is_some() {
                    trace!("dropped sample index cache");
                }
            }
        }

        if effect.drop_sorted_names {
            self.sorted_names.take();
        }
        if effect.drop_max_ploidy {
            self.max_ploidy.set(None);
        }
    }
}

/// Update `index` after `entries[position]` replaced `previous`
fn rebind(index: &mut SampleIndex, position: usize, previous: &Genotype, entries: &[Genotype]) {
    let current = &entries[position];
    if previous.sample_name() == current.sample_name() {
        return;
    }

    if index.get(previous.sample_name()) == Some(&position) {
        let earlier = entries[..position]
            .iter()
            .rposition(|g| g.sample_name() == previous.sample_name());
        match earlier {
            Some(earlier) => {
                index.insert(Arc::clone(previous.sample_name_arc()), earlier);
            }
            None => {
                index.remove(previous.sample_name());
            }
        }
    }

    // A later duplicate of the new name keeps its mapping
    if index
        .get(current.sample_name())
        .map_or(true, |&mapped| mapped < position)
    {
        index.insert(Arc::clone(current.sample_name_arc()), position);
    }
}
