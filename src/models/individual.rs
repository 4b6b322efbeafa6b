//! Individual entity model
//!
//! An [`Individual`] is one sampled person. Individuals are created once at
//! startup from the sample file (plus the optional minimal phenotype file)
//! and never mutated afterwards.

use chrono::NaiveDate;

use crate::temporal::FollowUp;

/// One sampled person with their follow-up window
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// Pseudonymised registry identifier
    pub id: String,
    /// Birth date
    pub date_of_birth: NaiveDate,
    /// First day of follow-up
    pub start_of_followup: NaiveDate,
    /// Last day of follow-up
    pub end_of_followup: NaiveDate,
    /// Numeric sex code from the minimal phenotype file
    pub sex: Option<i64>,
    /// Mother tongue code (`fi`, `sv`, `ru`, ...)
    pub mother_tongue: Option<String>,
}

impl Individual {
    /// Create an individual without phenotype information
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        date_of_birth: NaiveDate,
        start_of_followup: NaiveDate,
        end_of_followup: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            date_of_birth,
            start_of_followup,
            end_of_followup,
            sex: None,
            mother_tongue: None,
        }
    }

    /// Follow-up window used for clipping registry records
    #[must_use]
    pub const fn follow_up(&self) -> FollowUp {
        FollowUp {
            start: self.start_of_followup,
            end: self.end_of_followup,
            date_of_birth: self.date_of_birth,
        }
    }

    /// Whether the follow-up window is well formed
    #[must_use]
    pub fn has_valid_follow_up(&self) -> bool {
        self.start_of_followup <= self.end_of_followup
    }
}
