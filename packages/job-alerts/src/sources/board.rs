//! Board-enumerable sources: one ATS API request per organization.
//!
//! The organization (not the query) is the partition key, so keyword and
//! location filtering happen client-side in the pipeline. Vendor specifics
//! live behind [`BoardApi`]; [`BoardSource`] handles iteration, caps, rate
//! limiting, per-item error isolation and within-run dedup.

use async_trait::async_trait;
use scraper::Html;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceResult};
use crate::sources::http::HttpFetcher;
use crate::traits::source::{SourceAdapter, SOURCE_TAG_KEY};
use crate::types::{
    config::{FilterMode, HttpSettings, RunContext},
    posting::RawPosting,
};

/// Where the posting list sits in an API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// The body is the array of postings.
    Array,

    /// The body is an object holding the array under this field.
    Object(&'static str),
}

impl ResponseShape {
    /// Pull the posting array out of a response body.
    pub fn items(self, body: Value) -> Option<Vec<Value>> {
        match (self, body) {
            (Self::Array, Value::Array(items)) => Some(items),
            (Self::Object(field), Value::Object(mut map)) => match map.remove(field) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Vendor-specific half of an ATS source.
pub trait BoardApi: Send + Sync {
    /// Vendor name, used as the source tag prefix (e.g. `lever`).
    fn name(&self) -> &str;

    /// API endpoint listing a board's postings.
    fn endpoint(&self, slug: &str) -> String;

    /// Shape of the endpoint's response.
    fn shape(&self) -> ResponseShape;

    /// Decode one posting. `Ok(None)` skips items without a usable title or link.
    fn parse_item(&self, item: Value) -> serde_json::Result<Option<RawPosting>>;

    /// How the pipeline should match this vendor's locations.
    fn filter_mode(&self) -> FilterMode;
}

/// Organization slug from a board identifier (`stripe.greenhouse.io` -> `stripe`).
pub fn board_slug(board: &str) -> &str {
    board.split('.').next().unwrap_or(board)
}

/// Display company name from a board identifier (`scale-ai` -> `Scale Ai`).
pub fn company_name(board: &str) -> String {
    board_slug(board)
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain text from an ATS description that may be HTML, entity-escaped or not
/// (`&lt;p&gt;Build&lt;/p&gt;` and `<p>Build</p>` both give `Build`).
pub fn description_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    Html::parse_fragment(&decoded)
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// An ATS source polling a fixed list of organization boards.
pub struct BoardSource<A: BoardApi> {
    api: A,
    boards: Vec<String>,
    http: HttpFetcher,
}

impl<A: BoardApi> BoardSource<A> {
    /// Create a source for the given boards.
    pub fn new(
        api: A,
        boards: impl IntoIterator<Item = impl Into<String>>,
        settings: HttpSettings,
    ) -> SourceResult<Self> {
        Ok(Self {
            api,
            boards: boards.into_iter().map(Into::into).collect(),
            http: HttpFetcher::new(settings)?,
        })
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http = self.http.with_client(client);
        self
    }

    /// Boards polled by this source.
    pub fn boards(&self) -> &[String] {
        &self.boards
    }

    /// Turn one board's response into tagged postings.
    ///
    /// Malformed items are logged and skipped; the rest of the board is kept.
    pub fn parse_board(
        &self,
        board: &str,
        body: Value,
        max_results: usize,
    ) -> SourceResult<Vec<RawPosting>> {
        let items = self
            .api
            .shape()
            .items(body)
            .ok_or_else(|| SourceError::Parse {
                url: self.api.endpoint(board_slug(board)),
                reason: format!("unexpected response shape, wanted {:?}", self.api.shape()),
            })?;

        let company = company_name(board);
        let tag = format!("{}-{}", self.api.name(), board);
        let mut postings = Vec::new();

        for item in items.into_iter().take(max_results) {
            match self.api.parse_item(item) {
                Ok(Some(posting)) => postings.push(
                    posting
                        .with_company(company.clone())
                        .with_metadata(SOURCE_TAG_KEY, tag.clone())
                        .with_metadata("board", board),
                ),
                Ok(None) => {}
                Err(e) => {
                    debug!(board = %board, error = %e, "Skipping malformed posting");
                }
            }
        }

        Ok(postings)
    }
}

#[async_trait]
impl<A: BoardApi> SourceAdapter for BoardSource<A> {
    async fn fetch(&self, ctx: &RunContext) -> SourceResult<Vec<RawPosting>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut postings = Vec::new();

        info!(
            source = %self.api.name(),
            boards = self.boards.len(),
            "Checking ATS boards"
        );

        for (i, board) in self.boards.iter().enumerate() {
            let endpoint = self.api.endpoint(board_slug(board));

            let parsed = match self.http.get_json(&endpoint, &ctx.user_agent).await {
                Ok(body) => self.parse_board(board, body, ctx.max_results),
                Err(e) => Err(e),
            };

            match parsed {
                Ok(board_postings) => {
                    let mut found = 0;
                    for posting in board_postings {
                        if seen.insert(posting.url.clone()) {
                            postings.push(posting);
                            found += 1;
                        }
                    }
                    debug!(
                        source = %self.api.name(),
                        board = %board,
                        progress = %format!("{}/{}", i + 1, self.boards.len()),
                        found,
                        "Board checked"
                    );
                }
                Err(e) => {
                    warn!(source = %self.api.name(), board = %board, error = %e, "Board fetch failed");
                }
            }
        }

        info!(
            source = %self.api.name(),
            postings = postings.len(),
            "ATS source fetch completed"
        );

        Ok(postings)
    }

    fn name(&self) -> &str {
        self.api.name()
    }

    fn filter_mode(&self) -> FilterMode {
        self.api.filter_mode()
    }
}
