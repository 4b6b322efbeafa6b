//! Summing accumulators.

/// Running monetary sum, `value += amount * multiplier * weight`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedSum {
    values: Vec<f64>,
}

impl IndexedSum {
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            values: vec![0.0; rows],
        }
    }

    /// Continue a sum seeded by earlier extractors
    #[must_use]
    pub const fn from_existing(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn add(&mut self, row: usize, amount: f64, multiplier: f64, weight: f64) {
        self.values[row] += amount * multiplier * weight;
    }

    #[must_use]
    pub fn get(&self, row: usize) -> f64 {
        self.values[row]
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

/// Integer counter per row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    counts: Vec<i64>,
}

impl Tally {
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            counts: vec![0; rows],
        }
    }

    pub fn add(&mut self, row: usize, count: i64) {
        self.counts[row] += count;
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<i64> {
        self.counts
    }
}
