//! Raw postings as produced by source adapters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A posting before filtering and normalization.
///
/// Only `title` and `url` are guaranteed; everything else depends on what
/// the source exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPosting {
    pub title: String,

    /// Link to the posting (absolute once it leaves the adapter)
    pub url: String,

    pub company: Option<String>,

    pub location: Option<String>,

    pub description: Option<String>,

    pub posted_date: Option<String>,

    /// Source-specific fields (board id, query that found it, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RawPosting {
    /// Create a raw posting with the two required fields.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the company name.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set the location text.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the posting date.
    pub fn with_posted_date(mut self, posted_date: impl Into<String>) -> Self {
        self.posted_date = Some(posted_date.into());
        self
    }

    /// Add a metadata key-value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Location text, empty when unknown.
    pub fn location_text(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_posting_builder() {
        let posting = RawPosting::new("SWE Intern", "https://jobs.example.com/1")
            .with_company("Example")
            .with_location("Remote")
            .with_metadata("board", "example");

        assert_eq!(posting.title, "SWE Intern");
        assert_eq!(posting.company.as_deref(), Some("Example"));
        assert_eq!(posting.location_text(), "Remote");
        assert_eq!(posting.metadata.get("board"), Some(&"example".to_string()));
        assert!(posting.description.is_none());
    }

    #[test]
    fn test_missing_location_is_empty_text() {
        let posting = RawPosting::new("Intern", "https://a.co");
        assert_eq!(posting.location_text(), "");
    }
}
