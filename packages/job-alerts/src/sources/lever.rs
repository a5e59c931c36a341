//! Lever postings API (array-returning: `[...]`).

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceResult;
use crate::sources::board::{description_text, BoardApi, BoardSource, ResponseShape};
use crate::types::{
    config::{FilterMode, HttpSettings, LocationMatch},
    posting::RawPosting,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverPosting {
    #[serde(default)]
    text: String,
    #[serde(default)]
    hosted_url: String,
    #[serde(default)]
    categories: LeverCategories,
    #[serde(default)]
    description_plain: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    created_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct LeverCategories {
    #[serde(default)]
    location: Option<String>,
}

/// Lever postings API.
#[derive(Debug, Clone, Default)]
pub struct LeverApi;

impl BoardApi for LeverApi {
    fn name(&self) -> &str {
        "lever"
    }

    fn endpoint(&self, slug: &str) -> String {
        format!("https://api.lever.co/v0/postings/{slug}?mode=json")
    }

    fn shape(&self) -> ResponseShape {
        ResponseShape::Array
    }

    fn parse_item(&self, item: Value) -> serde_json::Result<Option<RawPosting>> {
        let job: LeverPosting = serde_json::from_value(item)?;
        if job.text.trim().is_empty() || job.hosted_url.trim().is_empty() {
            return Ok(None);
        }

        let mut posting = RawPosting::new(job.text, job.hosted_url);
        if let Some(location) = job.categories.location.filter(|l| !l.trim().is_empty()) {
            posting = posting.with_location(location);
        }
        if let Some(description) = job
            .description_plain
            .filter(|d| !d.trim().is_empty())
            .or_else(|| job.description.map(|d| description_text(&d)))
        {
            posting = posting.with_description(description);
        }
        if let Some(created) = job
            .created_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        {
            posting = posting.with_posted_date(created.format("%Y-%m-%d").to_string());
        }
        Ok(Some(posting))
    }

    /// Lever locations are free text ("SF / NYC", "Remote - US"), so a
    /// recognized city also counts as a match.
    fn filter_mode(&self) -> FilterMode {
        FilterMode::ClientSide(LocationMatch::KnownCities)
    }
}

/// Source polling Lever boards.
pub type LeverSource = BoardSource<LeverApi>;

impl LeverSource {
    /// Create a Lever source for the given boards.
    pub fn lever(
        boards: impl IntoIterator<Item = impl Into<String>>,
        settings: HttpSettings,
    ) -> SourceResult<Self> {
        BoardSource::new(LeverApi, boards, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::source::SOURCE_TAG_KEY;
    use serde_json::json;

    #[test]
    fn test_parse_lever_board() {
        let source = LeverSource::lever(["netflix"], HttpSettings::default()).unwrap();
        let body = json!([
            {
                "text": "Machine Learning Intern",
                "hostedUrl": "https://jobs.lever.co/netflix/abc",
                "categories": {"location": "Los Gatos, California", "team": "Research"},
                "descriptionPlain": "Work on recommendations",
                "description": "<p>Work on recommendations</p>",
                "createdAt": 1725148800000i64
            },
            {
                "text": "Design Intern",
                "hostedUrl": "https://jobs.lever.co/netflix/def",
                "description": "<p>Design things</p>"
            },
            "not an object"
        ]);

        let postings = source.parse_board("netflix", body, 50).unwrap();

        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].company.as_deref(), Some("Netflix"));
        assert_eq!(postings[0].location.as_deref(), Some("Los Gatos, California"));
        assert_eq!(postings[0].description.as_deref(), Some("Work on recommendations"));
        assert_eq!(postings[0].posted_date.as_deref(), Some("2024-09-01"));
        assert_eq!(
            postings[0].metadata.get(SOURCE_TAG_KEY).map(String::as_str),
            Some("lever-netflix")
        );

        assert!(postings[1].location.is_none());
        assert_eq!(postings[1].description.as_deref(), Some("Design things"));
    }

    #[test]
    fn test_lever_uses_known_cities() {
        assert_eq!(
            LeverApi.filter_mode(),
            FilterMode::ClientSide(LocationMatch::KnownCities)
        );
    }
}
