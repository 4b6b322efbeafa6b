//! Declared category domains for one-hot encoding.
//!
//! Every category of a domain becomes an output column even when no row
//! holds it, so output schemas do not depend on the population.

/// A closed set of categories encoded as one-hot columns
#[derive(Debug, PartialEq, Eq)]
pub struct CategoryDomain {
    /// Name used to request the whole group
    pub group: &'static str,
    /// Column names, in output order
    pub categories: &'static [&'static str],
    /// Column set for rows with no category, if the domain has one
    pub missing: Option<&'static str>,
}

/// Socioeconomic status
pub static SES: CategoryDomain = CategoryDomain {
    group: "ses",
    categories: &[
        "ses_self_employed",
        "ses_upperlevel",
        "ses_lowerlevel",
        "ses_manual_workers",
        "ses_students",
        "ses_pensioners",
        "ses_others",
        "ses_unknown",
    ],
    missing: Some("ses_missing"),
};

/// ISCED-F broad field of the highest degree
pub static EDUCATION_FIELD: CategoryDomain = CategoryDomain {
    group: "education_field",
    categories: &[
        "edufield_generic",
        "edufield_education",
        "edufield_arts_humanities",
        "edufield_social_sciences",
        "edufield_business_law",
        "edufield_natural_sciences",
        "edufield_ict",
        "edufield_engineering",
        "edufield_agriculture",
        "edufield_health_welfare",
        "edufield_services",
        "edufield_unknown",
    ],
    missing: Some("edufield_missing"),
};

/// Mother tongue
pub static MOTHER_TONGUE: CategoryDomain = CategoryDomain {
    group: "mothertongue",
    categories: &[
        "mothertongue_fi",
        "mothertongue_swe",
        "mothertongue_rus",
        "mothertongue_other",
    ],
    missing: None,
};

impl CategoryDomain {
    /// All output column names, missing column last
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.categories.iter().copied().chain(self.missing)
    }

    /// Names that request this group: the group itself or any column
    #[must_use]
    pub fn request_names(&self) -> Vec<&'static str> {
        std::iter::once(self.group).chain(self.columns()).collect()
    }

    /// Position of a category column
    #[must_use]
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.categories.iter().position(|name| *name == column)
    }

    /// One-hot encode category indices over the full domain
    ///
    /// Out-of-range indices are treated as missing.
    #[must_use]
    pub fn one_hot(&self, values: &[Option<usize>]) -> Vec<(&'static str, Vec<i64>)> {
        let mut columns: Vec<(&'static str, Vec<i64>)> = self
            .columns()
            .map(|name| (name, vec![0; values.len()]))
            .collect();
        for (row, value) in values.iter().enumerate() {
            match value {
                Some(index) if *index < self.categories.len() => columns[*index].1[row] = 1,
                _ => {
                    if self.missing.is_some() {
                        columns[self.categories.len()].1[row] = 1;
                    }
                }
            }
        }
        columns
    }
}
