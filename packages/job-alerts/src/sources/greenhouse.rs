//! Greenhouse job board API (object-returning: `{"jobs": [...]}`).

use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceResult;
use crate::sources::board::{description_text, BoardApi, BoardSource, ResponseShape};
use crate::types::{
    config::{FilterMode, HttpSettings, LocationMatch},
    posting::RawPosting,
};

#[derive(Debug, Deserialize)]
struct GreenhouseJob {
    #[serde(default)]
    title: String,
    #[serde(default)]
    location: Option<GreenhouseLocation>,
    #[serde(default)]
    absolute_url: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Usually `{"name": "..."}`, occasionally a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GreenhouseLocation {
    Named { name: Option<String> },
    Text(String),
}

impl GreenhouseLocation {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Named { name } => name,
            Self::Text(text) => Some(text),
        }
    }
}

/// Greenhouse boards API.
#[derive(Debug, Clone, Default)]
pub struct GreenhouseApi;

impl BoardApi for GreenhouseApi {
    fn name(&self) -> &str {
        "greenhouse"
    }

    fn endpoint(&self, slug: &str) -> String {
        format!("https://boards-api.greenhouse.io/v1/boards/{slug}/jobs?content=true")
    }

    fn shape(&self) -> ResponseShape {
        ResponseShape::Object("jobs")
    }

    fn parse_item(&self, item: Value) -> serde_json::Result<Option<RawPosting>> {
        let job: GreenhouseJob = serde_json::from_value(item)?;
        if job.title.trim().is_empty() || job.absolute_url.trim().is_empty() {
            return Ok(None);
        }

        let mut posting = RawPosting::new(job.title, job.absolute_url);
        if let Some(location) = job
            .location
            .and_then(GreenhouseLocation::into_text)
            .filter(|l| !l.trim().is_empty())
        {
            posting = posting.with_location(location);
        }
        // `content=true` returns entity-escaped HTML
        if let Some(content) = job.content.map(|c| description_text(&c)) {
            posting = posting.with_description(content);
        }
        if let Some(updated_at) = job.updated_at {
            posting = posting.with_posted_date(updated_at);
        }
        Ok(Some(posting))
    }

    fn filter_mode(&self) -> FilterMode {
        FilterMode::ClientSide(LocationMatch::Substring)
    }
}

/// Source polling Greenhouse boards.
pub type GreenhouseSource = BoardSource<GreenhouseApi>;

impl GreenhouseSource {
    /// Create a Greenhouse source for the given boards.
    pub fn greenhouse(
        boards: impl IntoIterator<Item = impl Into<String>>,
        settings: HttpSettings,
    ) -> SourceResult<Self> {
        BoardSource::new(GreenhouseApi, boards, settings)
    }
}
