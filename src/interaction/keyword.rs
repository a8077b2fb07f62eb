//! Canned replies selected by trigger substrings.

use std::{collections::HashSet, sync::Arc};

use crate::base::{
    config::Config,
    error::RelayError,
    keywords::{DEFAULT_FALLBACK, DEFAULT_KEYWORDS},
    types::Res,
};

/// Ordered trigger → response table, plus the fallback response.
///
/// Order is significant: the first trigger found in a message wins, even when
/// a later trigger is longer or more specific.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(String, String)>,
    fallback: String,
}

impl KeywordTable {
    /// Build a table from `(trigger, response)` pairs in match order.
    ///
    /// Triggers must be non-empty and unique.
    pub fn new<I, T, R>(entries: I, fallback: impl Into<String>) -> Res<Self>
    where
        I: IntoIterator<Item = (T, R)>,
        T: Into<String>,
        R: Into<String>,
    {
        let entries: Vec<(String, String)> = entries.into_iter().map(|(t, r)| (t.into(), r.into())).collect();

        let mut seen = HashSet::new();
        for (trigger, _) in &entries {
            if trigger.is_empty() {
                return Err(RelayError::EmptyTrigger.into());
            }

            if !seen.insert(trigger.as_str()) {
                return Err(RelayError::DuplicateTrigger(trigger.clone()).into());
            }
        }

        Ok(Self {
            entries,
            fallback: fallback.into(),
        })
    }

    /// Build the table described by the configuration.
    pub fn from_config(config: &Config) -> Res<Self> {
        Self::new(
            config.keywords.iter().map(|e| (e.trigger.clone(), e.response.clone())),
            config.keyword_fallback.clone(),
        )
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, r)| (t.as_str(), r.as_str()))
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_KEYWORDS.iter().map(|(t, r)| (t.to_string(), r.to_string())).collect(),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}

/// Stateless keyword matcher.
///
/// Trivially cloneable; every clone shares the same immutable table.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    table: Arc<KeywordTable>,
}

impl KeywordMatcher {
    pub fn new(table: KeywordTable) -> Self {
        Self { table: Arc::new(table) }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Return the response of the first trigger (in table order) contained in
    /// `content`, or the fallback when none is.
    ///
    /// Plain substring containment: case-sensitive, no word boundaries.
    pub fn match_content(&self, content: &str) -> &str {
        self.table
            .entries
            .iter()
            .find(|(trigger, _)| content.contains(trigger.as_str()))
            .map(|(_, response)| response.as_str())
            .unwrap_or(self.table.fallback.as_str())
    }
}
