//! Requested output variables.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::error::util::safe_read_to_string;

/// Header words tolerated on the first line of a feature file
const HEADER_WORDS: [&str; 4] = ["feature", "features", "name", "variable"];

/// Set of output variable names requested for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureRequest {
    names: FxHashSet<String>,
}

impl FeatureRequest {
    /// Build a request from variable names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .map(|name: String| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Read the feature file: one name per line, first comma-separated field
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = safe_read_to_string(path, "feature list")?;
        Ok(Self::parse(&text))
    }

    fn parse(text: &str) -> Self {
        let names = text.lines().enumerate().filter_map(|(number, line)| {
            let name = line.split(',').next().unwrap_or_default().trim();
            let is_header = number == 0 && HEADER_WORDS.contains(&name.to_lowercase().as_str());
            (!name.is_empty() && !name.starts_with('#') && !is_header).then_some(name)
        });
        Self::from_names(names)
    }

    /// Whether a variable was requested
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether any of the given variables was requested
    #[must_use]
    pub fn contains_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.contains(name))
    }

    /// Requested names in sorted order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
