//! Ashby public posting API (object-returning: `{"jobs": [...]}`).

use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceResult;
use crate::sources::board::{BoardApi, BoardSource, ResponseShape};
use crate::types::{
    config::{FilterMode, HttpSettings, LocationMatch},
    posting::RawPosting,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AshbyJob {
    #[serde(default)]
    title: String,
    #[serde(default)]
    job_url: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description_plain: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default = "listed_by_default")]
    is_listed: bool,
}

fn listed_by_default() -> bool {
    true
}

/// Ashby posting API.
#[derive(Debug, Clone, Default)]
pub struct AshbyApi;

impl BoardApi for AshbyApi {
    fn name(&self) -> &str {
        "ashby"
    }

    fn endpoint(&self, slug: &str) -> String {
        format!("https://api.ashbyhq.com/posting-api/job-board/{slug}")
    }

    fn shape(&self) -> ResponseShape {
        ResponseShape::Object("jobs")
    }

    fn parse_item(&self, item: Value) -> serde_json::Result<Option<RawPosting>> {
        let job: AshbyJob = serde_json::from_value(item)?;
        if !job.is_listed || job.title.trim().is_empty() || job.job_url.trim().is_empty() {
            return Ok(None);
        }

        let mut posting = RawPosting::new(job.title, job.job_url);
        if let Some(location) = job.location.filter(|l| !l.trim().is_empty()) {
            posting = posting.with_location(location);
        }
        if let Some(description) = job.description_plain {
            posting = posting.with_description(description);
        }
        if let Some(published_at) = job.published_at {
            posting = posting.with_posted_date(published_at);
        }
        Ok(Some(posting))
    }

    fn filter_mode(&self) -> FilterMode {
        FilterMode::ClientSide(LocationMatch::Substring)
    }
}

/// Source polling Ashby boards.
pub type AshbySource = BoardSource<AshbyApi>;

impl AshbySource {
    /// Create an Ashby source for the given boards (slugs or domains).
    pub fn ashby(
        boards: impl IntoIterator<Item = impl Into<String>>,
        settings: HttpSettings,
    ) -> SourceResult<Self> {
        BoardSource::new(AshbyApi, boards, settings)
    }
}
