use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Named rule variants in force for a match. Comparison is order-insensitive
/// set equality; two matches were played "under the same rules" only when
/// the sets match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeSet<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rules: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rules.is_empty() {
            return write!(f, "(open)");
        }
        let mut first = true;
        for rule in &self.rules {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{rule}")?;
            first = false;
        }
        Ok(())
    }
}
