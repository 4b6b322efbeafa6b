//! Categorical overwrite rules.

/// Latest non-missing observation wins
///
/// Callers offer values in chronological order. A missing value never
/// overwrites. Backfilling callers snapshot [`LatestWins::missing_rows`]
/// and offer only to rows that were missing.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestWins<T> {
    values: Vec<Option<T>>,
}

impl<T: PartialEq> LatestWins<T> {
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            values: std::iter::repeat_with(|| None).take(rows).collect(),
        }
    }

    /// Offer an observation; returns whether the stored value changed
    pub fn offer(&mut self, row: usize, value: Option<T>) -> bool {
        match value {
            Some(value) if self.values[row].as_ref() != Some(&value) => {
                self.values[row] = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Rows that currently hold no value
    #[must_use]
    pub fn missing_rows(&self) -> Vec<bool> {
        self.values.iter().map(Option::is_none).collect()
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.values[row].as_ref()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Option<T>> {
        self.values
    }
}

/// Strictly-higher level wins, regardless of chronology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighestWins {
    levels: Vec<Option<i64>>,
}

impl HighestWins {
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            levels: vec![None; rows],
        }
    }

    /// Offer a level; returns whether it replaced the stored one
    ///
    /// Associated values (field of study, onset) should only be written
    /// when this returns `true`.
    pub fn offer(&mut self, row: usize, level: i64) -> bool {
        match self.levels[row] {
            Some(current) if level <= current => false,
            _ => {
                self.levels[row] = Some(level);
                true
            }
        }
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Option<i64>> {
        self.levels
    }
}
