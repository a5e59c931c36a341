//! Job record - the canonical, normalized posting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

use crate::error::AlertError;

/// Descriptions longer than this (in characters) are truncated on normalization.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Separator placed between identity fields by [`IdentityScheme::Delimited`].
const FIELD_SEPARATOR: &[u8] = b"\x1f";

/// How a job's identity is derived from (title, company, url).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityScheme {
    /// SHA-256 over the fields joined by the ASCII unit separator.
    #[default]
    Delimited,

    /// MD5 over the plain concatenation of the fields.
    ///
    /// Matches archives written by earlier versions of the alert system.
    /// Search-page links must then be kept verbatim (see
    /// `SearchPageSource::with_verbatim_links`), since those versions hashed
    /// the href with its tracking query.
    Legacy,
}

impl IdentityScheme {
    /// Compute the identity for a (title, company, url) triple.
    pub fn identity(&self, title: &str, company: &str, url: &str) -> String {
        match self {
            Self::Delimited => {
                let mut hasher = Sha256::new();
                hasher.update(title.as_bytes());
                hasher.update(FIELD_SEPARATOR);
                hasher.update(company.as_bytes());
                hasher.update(FIELD_SEPARATOR);
                hasher.update(url.as_bytes());
                hex::encode(hasher.finalize())
            }
            Self::Legacy => {
                let joined = format!("{title}{company}{url}");
                format!("{:x}", md5::compute(joined.as_bytes()))
            }
        }
    }
}

impl FromStr for IdentityScheme {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delimited" | "" => Ok(Self::Delimited),
            "legacy" => Ok(Self::Legacy),
            other => Err(AlertError::Config {
                reason: format!("unknown identity scheme: {other}"),
            }),
        }
    }
}

/// A normalized job posting as persisted in the dedup store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Stable dedup key derived from (title, company, url)
    pub identity: String,

    pub title: String,

    pub company: String,

    /// Location text; empty when the source did not provide one
    #[serde(default)]
    pub location: String,

    /// Absolute posting URL
    pub url: String,

    /// Description, truncated to [`DESCRIPTION_MAX_CHARS`]
    #[serde(default)]
    pub description: String,

    /// Posting date as reported by the source; empty when unknown
    #[serde(default)]
    pub posted_date: String,

    /// Origin tag, e.g. `lever-netflix`
    pub source: String,

    /// When the record was first persisted
    pub created_at: DateTime<Utc>,

    /// Whether the record has been delivered to the user
    #[serde(default)]
    pub notified: bool,
}

impl JobRecord {
    /// Create a record with the default identity scheme.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self::with_scheme(IdentityScheme::default(), title, company, url, source)
    }

    /// Create a record, deriving its identity with the given scheme.
    pub fn with_scheme(
        scheme: IdentityScheme,
        title: impl Into<String>,
        company: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let company = company.into();
        let url = url.into();
        let identity = scheme.identity(&title, &company, &url);

        Self {
            identity,
            title,
            company,
            location: String::new(),
            url,
            description: String::new(),
            posted_date: String::new(),
            source: source.into(),
            created_at: Utc::now(),
            notified: false,
        }
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the description, truncating it to [`DESCRIPTION_MAX_CHARS`].
    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        self.description = truncate_chars(description.as_ref(), DESCRIPTION_MAX_CHARS);
        self
    }

    /// Set the posting date.
    pub fn with_posted_date(mut self, posted_date: impl Into<String>) -> Self {
        self.posted_date = posted_date.into();
        self
    }

    /// Location for display, `N/A` when unknown.
    pub fn display_location(&self) -> &str {
        if self.location.is_empty() {
            "N/A"
        } else {
            &self.location
        }
    }
}

/// Truncate to at most `max` characters, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Aggregate counts reported by a dedup store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total: usize,
    pub notified: usize,
    pub pending: usize,
    /// Number of distinct source tags
    pub sources: usize,
}
