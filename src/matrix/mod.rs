//! Feature Matrix Assembler
//!
//! The matrix owns one column per output variable, all of the same length
//! as the row index. Extractors build their columns locally and commit them
//! here; only requested variables are kept. Cumulative sums (`total_income`,
//! `total_benefits`) are read back with [`FeatureMatrix::take_float`] so the
//! next extractor continues from them.

pub mod writer;

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::accumulate::CategoryDomain;
use crate::config::Granularity;
use crate::models::{FeatureRequest, Individual};
use crate::population::RowIndex;

pub use writer::write_matrix;

/// Suffix of onset-age companion columns
pub const ONSET_SUFFIX: &str = "_OnsetAge";

/// Onset companion name of a feature
#[must_use]
pub fn onset_name(feature: &str) -> String {
    format!("{feature}{ONSET_SUFFIX}")
}

/// Typed column values
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Flags and counts
    Int(Vec<i64>),
    /// Integer codes that may be missing
    OptInt(Vec<Option<i64>>),
    /// Continuous values, NaN when missing
    Float(Vec<f64>),
    Text(Vec<Option<String>>),
    Date(Vec<NaiveDate>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::OptInt(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Date(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output rows and their feature columns
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    rows: usize,
    columns: Vec<(String, Column)>,
    positions: FxHashMap<String, usize>,
    request: FeatureRequest,
    output_age: bool,
}

impl FeatureMatrix {
    /// Empty matrix with the given number of rows
    #[must_use]
    pub fn new(rows: usize, request: FeatureRequest, output_age: bool) -> Self {
        Self {
            rows,
            columns: Vec::new(),
            positions: FxHashMap::default(),
            request,
            output_age,
        }
    }

    /// Matrix seeded with identity columns for every indexed row
    #[must_use]
    pub fn with_identity(
        index: &RowIndex,
        individuals: &[Individual],
        request: FeatureRequest,
        output_age: bool,
    ) -> Self {
        let mut matrix = Self::new(index.len(), request, output_age);
        let keys = index.rows();

        matrix.put(
            "FINREGISTRYID",
            Column::Text(keys.iter().map(|k| Some(individuals[k.individual].id.clone())).collect()),
        );
        if index.granularity() == Granularity::Yearly {
            matrix.put("year", Column::OptInt(keys.iter().map(|k| k.year.map(i64::from)).collect()));
        }
        matrix.put(
            "date_of_birth",
            Column::Date(keys.iter().map(|k| individuals[k.individual].date_of_birth).collect()),
        );
        matrix.put(
            "start_of_followup",
            Column::Date(keys.iter().map(|k| individuals[k.individual].start_of_followup).collect()),
        );
        matrix.put(
            "end_of_followup",
            Column::Date(keys.iter().map(|k| individuals[k.individual].end_of_followup).collect()),
        );
        matrix
    }

    /// Number of rows
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[must_use]
    pub const fn request(&self) -> &FeatureRequest {
        &self.request
    }

    #[must_use]
    pub const fn output_age(&self) -> bool {
        self.output_age
    }

    /// Whether a feature was requested
    #[must_use]
    pub fn wants(&self, name: &str) -> bool {
        self.request.contains(name)
    }

    /// Whether the onset companion of a feature is emitted
    #[must_use]
    pub fn wants_onset(&self, name: &str) -> bool {
        self.output_age && self.wants(name)
    }

    /// Whether any column of a one-hot group was requested
    #[must_use]
    pub fn wants_domain(&self, domain: &CategoryDomain) -> bool {
        self.request.contains_any(&domain.request_names())
    }

    /// Insert or replace a column unconditionally
    pub fn put(&mut self, name: &str, column: Column) {
        debug_assert_eq!(column.len(), self.rows, "column {name} has wrong length");
        match self.positions.get(name) {
            Some(&position) => self.columns[position].1 = column,
            None => {
                self.positions.insert(name.to_string(), self.columns.len());
                self.columns.push((name.to_string(), column));
            }
        }
    }

    /// Store a feature column if it was requested
    pub fn commit(&mut self, name: &str, column: Column) {
        if self.wants(name) {
            self.put(name, column);
        }
    }

    /// Store an onset column if the feature and onset output were requested
    pub fn commit_onset(&mut self, name: &str, ages: Vec<f64>) {
        if self.wants_onset(name) {
            self.put(&onset_name(name), Column::Float(ages));
        }
    }

    /// One-hot encode a categorical column over its full domain, if requested
    pub fn commit_domain(&mut self, domain: &CategoryDomain, values: &[Option<usize>]) {
        if !self.wants_domain(domain) {
            return;
        }
        for (name, column) in domain.one_hot(values) {
            self.put(name, Column::Int(column));
        }
    }

    /// Store the single onset column of a one-hot group, named after the group
    pub fn commit_domain_onset(&mut self, domain: &CategoryDomain, ages: Vec<f64>) {
        if self.output_age && self.wants_domain(domain) {
            self.put(&onset_name(domain.group), Column::Float(ages));
        }
    }

    /// Current values of a cumulative float feature, zeros if not yet present
    #[must_use]
    pub fn take_float(&self, name: &str) -> Vec<f64> {
        match self.column(name) {
            Some(Column::Float(values)) => values.clone(),
            _ => vec![0.0; self.rows],
        }
    }

    /// Current onset ages of a feature, NaN if not yet present
    #[must_use]
    pub fn take_onset(&self, name: &str) -> Vec<f64> {
        match self.column(&onset_name(name)) {
            Some(Column::Float(values)) => values.clone(),
            _ => vec![f64::NAN; self.rows],
        }
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.positions.get(name).map(|&position| &self.columns[position].1)
    }

    /// Columns in output order
    #[must_use]
    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    /// Column names in output order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulate::SES;

    fn matrix(names: &[&str], output_age: bool) -> FeatureMatrix {
        FeatureMatrix::new(2, FeatureRequest::from_names(names.iter().copied()), output_age)
    }

    #[test]
    fn test_only_requested_columns_are_committed() {
        let mut m = matrix(&["married"], true);
        m.commit("married", Column::Int(vec![1, 0]));
        m.commit("divorced", Column::Int(vec![0, 0]));
        m.commit_onset("married", vec![30.0, f64::NAN]);
        m.commit_onset("divorced", vec![f64::NAN, f64::NAN]);
        assert_eq!(m.names(), vec!["married", "married_OnsetAge"]);
    }

    #[test]
    fn test_onset_requires_output_age() {
        let mut m = matrix(&["married"], false);
        m.commit("married", Column::Int(vec![1, 0]));
        m.commit_onset("married", vec![30.0, f64::NAN]);
        assert_eq!(m.names(), vec!["married"]);
    }

    #[test]
    fn test_cumulative_take_and_replace_keeps_position() {
        let mut m = matrix(&["total_income", "married"], false);
        assert_eq!(m.take_float("total_income"), vec![0.0, 0.0]);
        m.commit("total_income", Column::Float(vec![1.0, 2.0]));
        m.commit("married", Column::Int(vec![0, 1]));
        let mut sums = m.take_float("total_income");
        sums[0] += 10.0;
        m.commit("total_income", Column::Float(sums));
        assert_eq!(m.names(), vec!["total_income", "married"]);
        assert_eq!(m.column("total_income"), Some(&Column::Float(vec![11.0, 2.0])));
    }

    #[test]
    fn test_domain_requested_by_member() {
        let mut m = matrix(&["ses_students"], false);
        m.commit_domain(&SES, &[Some(4), None]);
        assert_eq!(m.names().len(), 9);
        assert_eq!(m.column("ses_students"), Some(&Column::Int(vec![1, 0])));
        assert_eq!(m.column("ses_missing"), Some(&Column::Int(vec![0, 1])));
    }
}
