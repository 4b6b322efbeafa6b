//! Ever-flags and onset ages.

use crate::temporal::update_earliest;

/// Per-row onset ages, NaN while unset
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetAges {
    ages: Vec<f64>,
}

impl OnsetAges {
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            ages: vec![f64::NAN; rows],
        }
    }

    /// Continue from ages recorded by an earlier extractor
    #[must_use]
    pub const fn from_existing(ages: Vec<f64>) -> Self {
        Self { ages }
    }

    /// Keep the earliest age for the row
    pub fn update(&mut self, row: usize, age: f64) {
        update_earliest(&mut self.ages[row], age);
    }

    /// Overwrite the age for the row
    pub fn set(&mut self, row: usize, age: f64) {
        self.ages[row] = age;
    }

    #[must_use]
    pub fn get(&self, row: usize) -> f64 {
        self.ages[row]
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.ages
    }
}

/// Monotonic 0/1 indicator with the onset age of its first occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct EverFlag {
    values: Vec<i64>,
    onsets: OnsetAges,
}

impl EverFlag {
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            values: vec![0; rows],
            onsets: OnsetAges::new(rows),
        }
    }

    /// Record a qualifying occurrence at the given onset age
    pub fn mark(&mut self, row: usize, age: f64) {
        self.values[row] = 1;
        self.onsets.update(row, age);
    }

    #[must_use]
    pub fn is_set(&self, row: usize) -> bool {
        self.values[row] == 1
    }

    /// Flag column and onset column
    #[must_use]
    pub fn into_parts(self) -> (Vec<i64>, Vec<f64>) {
        (self.values, self.onsets.into_inner())
    }
}
