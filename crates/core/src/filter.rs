//! Key filters gating connector and resolver visibility.
//!
//! Responsibilities:
//! - Define the [`Filter`] capability used by filtered wrappers.
//! - Provide [`PatternFilter`], a regex include/exclude implementation.
//!
//! Invariants:
//! - Patterns must match the whole key, not a substring.
//! - Any exclude match makes a key invalid, regardless of includes.
//! - An empty include list accepts every key that is not excluded.

use regex::Regex;

use crate::error::SettingsError;

/// Predicate over keys built from include and exclude patterns.
pub trait Filter: Send + Sync + std::fmt::Debug {
    /// Adds a pattern a key must match (unless no includes are configured).
    fn add_include(&mut self, pattern: &str) -> Result<(), SettingsError>;

    /// Adds a pattern that rejects every key it matches.
    fn add_exclude(&mut self, pattern: &str) -> Result<(), SettingsError>;

    /// Returns true if `key` passes the filter.
    fn is_valid(&self, key: &str) -> bool;
}

/// Regex based [`Filter`].
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl PatternFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from pattern lists, failing on the first invalid pattern.
    pub fn from_patterns<I, E, S, T>(includes: I, excludes: E) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut filter = Self::new();
        for pattern in includes {
            filter.add_include(pattern.as_ref())?;
        }
        for pattern in excludes {
            filter.add_exclude(pattern.as_ref())?;
        }
        Ok(filter)
    }

    fn compile(pattern: &str) -> Result<Regex, SettingsError> {
        Regex::new(&format!("^(?:{pattern})$")).map_err(|source| SettingsError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
    }
}

impl Filter for PatternFilter {
    fn add_include(&mut self, pattern: &str) -> Result<(), SettingsError> {
        self.includes.push(Self::compile(pattern)?);
        Ok(())
    }

    fn add_exclude(&mut self, pattern: &str) -> Result<(), SettingsError> {
        self.excludes.push(Self::compile(pattern)?);
        Ok(())
    }

    fn is_valid(&self, key: &str) -> bool {
        if self.excludes.iter().any(|re| re.is_match(key)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|re| re.is_match(key))
    }
}
