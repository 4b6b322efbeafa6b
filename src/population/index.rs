//! Time-Window Index
//!
//! Maps identifiers, or `(identifier, year)` pairs in yearly mode, to output
//! row positions. Built once from the sample; read-only during extraction.

use chrono::Datelike;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::config::Granularity;
use crate::error::{Error, Result};
use crate::models::Individual;
use crate::temporal::FollowUp;

/// What an output row stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowKey {
    /// Position of the individual in the sample
    pub individual: usize,
    /// Calendar year in yearly mode
    pub year: Option<i32>,
}

/// Rows of one sampled individual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub individual: usize,
    pub first_row: usize,
    pub follow_up: FollowUp,
}

/// Lookup from identifiers to output rows
#[derive(Debug, Clone)]
pub struct RowIndex {
    granularity: Granularity,
    rows: Vec<RowKey>,
    by_id: FxHashMap<String, SmallVec<[Slot; 1]>>,
    ids: FxHashSet<String>,
}

impl RowIndex {
    /// Build the index
    ///
    /// Fails if any individual's follow-up starts after it ends.
    pub fn build(individuals: &[Individual], granularity: Granularity) -> Result<Self> {
        if let Some(bad) = individuals.iter().find(|i| !i.has_valid_follow_up()) {
            return Err(Error::PopulationIntegrity(format!(
                "individual {} has start_of_followup {} after end_of_followup {}",
                bad.id, bad.start_of_followup, bad.end_of_followup
            )));
        }

        let mut rows = Vec::with_capacity(individuals.len());
        let mut by_id: FxHashMap<String, SmallVec<[Slot; 1]>> = FxHashMap::default();
        for (position, individual) in individuals.iter().enumerate() {
            let follow_up = individual.follow_up();
            let slot = Slot {
                individual: position,
                first_row: rows.len(),
                follow_up,
            };
            match granularity {
                Granularity::Aggregate => rows.push(RowKey {
                    individual: position,
                    year: None,
                }),
                Granularity::Yearly => rows.extend(follow_up.years().map(|year| RowKey {
                    individual: position,
                    year: Some(year),
                })),
            }
            by_id.entry(individual.id.clone()).or_default().push(slot);
        }

        let ids = by_id.keys().cloned().collect();
        log::info!(
            "Built {granularity:?} row index: {} rows for {} individuals",
            rows.len(),
            individuals.len()
        );
        Ok(Self {
            granularity,
            rows,
            by_id,
            ids,
        })
    }

    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Number of output rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keys of all output rows in order
    #[must_use]
    pub fn rows(&self) -> &[RowKey] {
        &self.rows
    }

    /// Sampled identifiers, used as the registry read filter
    #[must_use]
    pub const fn ids(&self) -> &FxHashSet<String> {
        &self.ids
    }

    /// Slots of an identifier; empty when it is not sampled
    #[must_use]
    pub fn slots(&self, id: &str) -> &[Slot] {
        self.by_id.get(id).map_or(&[], |slots| slots.as_slice())
    }

    /// Output row of a slot for `year`
    ///
    /// In aggregate mode the single row of the slot, whatever the year; in
    /// yearly mode the row of that year if the follow-up touches it.
    #[must_use]
    pub fn row(&self, slot: &Slot, year: i32) -> Option<usize> {
        match self.granularity {
            Granularity::Aggregate => Some(slot.first_row),
            Granularity::Yearly => {
                let first = slot.follow_up.start.year();
                slot.follow_up
                    .years()
                    .contains(&year)
                    .then(|| slot.first_row + (year - first) as usize)
            }
        }
    }
}
