//! # Content Filter
//!
//! Rejects comment text that contains a banned word. Matching is a
//! case-insensitive substring search, so inflected forms are caught too.

use crate::error::{AppError, Result};

/// Shown under the comment field when a banned word is found.
pub const CURSE_WARNING: &str = "do not curse!";

/// Words rejected when no list is configured.
pub const DEFAULT_BAD_WORDS: &[&str] = &["редиска", "негодяй"];

#[derive(Debug, Clone)]
pub struct ContentFilter {
    /// Stored lowercased
    bad_words: Vec<String>,
}

impl ContentFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bad_words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { bad_words }
    }

    /// First banned word found in `text`, if any.
    pub fn find_banned(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.bad_words
            .iter()
            .find(|word| haystack.contains(word.as_str()))
            .map(String::as_str)
    }

    /// Validates comment text: it must be non-empty and clean.
    pub fn check(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(AppError::invalid("text", "this field is required"));
        }
        if let Some(word) = self.find_banned(text) {
            tracing::debug!(word, "comment rejected by content filter");
            return Err(AppError::invalid("text", CURSE_WARNING));
        }
        Ok(())
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BAD_WORDS)
    }
}
