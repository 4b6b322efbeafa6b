//! Record to output-row reconciliation
//!
//! For a record of a sampled individual, [`Reconciler::hits`] clips the
//! record span against every follow-up window of that individual and yields
//! one [`Hit`] per affected output row: a single hit per window in aggregate
//! mode, one hit per touched calendar year in yearly mode.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use smallvec::SmallVec;

use crate::config::Granularity;
use crate::population::RowIndex;
use crate::temporal::{ClippedInterval, FollowUp, RecordSpan};

/// One output row affected by a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub row: usize,
    /// Year of the row in yearly mode
    pub year: Option<i32>,
    pub clipped: ClippedInterval,
    pub follow_up: FollowUp,
}

/// Hits of one record
pub type Hits = SmallVec<[Hit; 2]>;

impl Hit {
    /// Calendar years this hit accounts for
    #[must_use]
    pub fn years(&self) -> RangeInclusive<i32> {
        match self.year {
            Some(year) => year..=year,
            None => self.clipped.years(),
        }
    }

    /// Date the record starts counting in this row
    #[must_use]
    pub fn onset_date(&self) -> NaiveDate {
        match self.year {
            Some(year) => self.clipped.onset_in_year(year),
            None => self.clipped.onset_anchor,
        }
    }

    /// Onset age for this row
    #[must_use]
    pub fn onset_age(&self) -> f64 {
        self.follow_up.age_at(self.onset_date())
    }

    /// Age at an arbitrary date
    #[must_use]
    pub fn age_at(&self, date: NaiveDate) -> f64 {
        self.follow_up.age_at(date)
    }

    /// Inclusive days of the clipped interval within this row
    #[must_use]
    pub fn days(&self) -> i64 {
        match self.year {
            Some(year) => self.clipped.days_in_year(year),
            None => self.clipped.days(),
        }
    }

    /// Month weight of `year` for monetary pro-ration
    #[must_use]
    pub fn months(&self, year: i32) -> u32 {
        self.clipped.months_in_year(year)
    }
}

/// Resolves record spans to output rows
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    index: &'a RowIndex,
    today: NaiveDate,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub const fn new(index: &'a RowIndex, today: NaiveDate) -> Self {
        Self { index, today }
    }

    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.index.granularity()
    }

    #[must_use]
    pub const fn index(&self) -> &'a RowIndex {
        self.index
    }

    /// Output rows affected by a record of `id` spanning `span`
    ///
    /// Empty when the individual is not sampled, the span cannot be resolved
    /// or it lies outside every follow-up window.
    #[must_use]
    pub fn hits(&self, id: &str, span: RecordSpan) -> Hits {
        let granularity = self.granularity();
        let mut hits = Hits::new();
        for slot in self.index.slots(id) {
            let Some(clipped) = slot.follow_up.clip(span, granularity, self.today) else {
                continue;
            };
            match granularity {
                Granularity::Aggregate => hits.push(Hit {
                    row: slot.first_row,
                    year: None,
                    clipped,
                    follow_up: slot.follow_up,
                }),
                Granularity::Yearly => {
                    for year in clipped.years() {
                        if let Some(row) = self.index.row(slot, year) {
                            hits.push(Hit {
                                row,
                                year: Some(year),
                                clipped,
                                follow_up: slot.follow_up,
                            });
                        }
                    }
                }
            }
        }
        hits
    }
}
