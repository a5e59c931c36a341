//! Search-page source: one HTML search request per (keyword, location).
//!
//! Each board is described by a [`SearchPageProfile`] (endpoint, query
//! parameter names, CSS selectors). Results are parsed with the `scraper`
//! crate, so the profile is the only board-specific part.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::sources::http::HttpFetcher;
use crate::traits::source::SourceAdapter;
use crate::types::{
    config::{FilterMode, HttpSettings, RunContext},
    posting::RawPosting,
};

/// Board-specific description of a search results page.
#[derive(Debug, Clone)]
pub struct SearchPageProfile {
    /// Source tag, e.g. `linkedin`
    pub name: String,

    /// Scheme and host; relative links are resolved against it
    pub base_url: String,

    /// Path of the search endpoint
    pub search_path: String,

    pub keyword_param: String,

    pub location_param: String,

    /// Fixed parameters sent with every query (sorting, recency, ...)
    pub extra_params: Vec<(String, String)>,

    /// One element per posting
    pub card_selector: String,

    pub title_selector: String,

    pub company_selector: String,

    pub location_selector: String,

    /// Anchor carrying the posting link
    pub link_selector: String,

    /// Drop the query string from links (tracking parameters differ per search)
    pub strip_link_query: bool,
}

impl SearchPageProfile {
    /// LinkedIn's public guest job search, newest postings from the last day.
    pub fn linkedin() -> Self {
        Self {
            name: "linkedin".to_string(),
            base_url: "https://www.linkedin.com".to_string(),
            search_path: "/jobs-guest/jobs/api/seeMoreJobPostings/search".to_string(),
            keyword_param: "keywords".to_string(),
            location_param: "location".to_string(),
            extra_params: vec![
                ("sortBy".to_string(), "DD".to_string()),
                ("start".to_string(), "0".to_string()),
                ("f_TPR".to_string(), "r86400".to_string()),
            ],
            card_selector: "li div.base-card".to_string(),
            title_selector: "h3.base-search-card__title".to_string(),
            company_selector: "h4.base-search-card__subtitle".to_string(),
            location_selector: "span.job-search-card__location".to_string(),
            link_selector: "a.base-card__full-link".to_string(),
            strip_link_query: true,
        }
    }

    /// Indeed search results sorted by date.
    pub fn indeed() -> Self {
        Self {
            name: "indeed".to_string(),
            base_url: "https://www.indeed.com".to_string(),
            search_path: "/jobs".to_string(),
            keyword_param: "q".to_string(),
            location_param: "l".to_string(),
            extra_params: vec![("sort".to_string(), "date".to_string())],
            card_selector: "div.job_seen_beacon".to_string(),
            title_selector: "h2.jobTitle".to_string(),
            company_selector: "span[data-testid='company-name']".to_string(),
            location_selector: "div[data-testid='text-location']".to_string(),
            link_selector: "h2.jobTitle a".to_string(),
            strip_link_query: false,
        }
    }
}

/// Selectors parsed once at construction.
struct CompiledSelectors {
    card: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    link: Selector,
}

impl CompiledSelectors {
    fn compile(profile: &SearchPageProfile) -> SourceResult<Self> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| SourceError::Parse {
                url: profile.base_url.clone(),
                reason: format!("bad selector {css:?}: {e}"),
            })
        };

        Ok(Self {
            card: parse(&profile.card_selector)?,
            title: parse(&profile.title_selector)?,
            company: parse(&profile.company_selector)?,
            location: parse(&profile.location_selector)?,
            link: parse(&profile.link_selector)?,
        })
    }
}

/// Query-combinatorial source backed by an HTML search page.
pub struct SearchPageSource {
    profile: SearchPageProfile,
    base_url: Url,
    selectors: CompiledSelectors,
    http: HttpFetcher,
    verbatim_links: bool,
}

impl SearchPageSource {
    /// Create a source for the given profile.
    pub fn new(profile: SearchPageProfile, settings: HttpSettings) -> SourceResult<Self> {
        let base_url = Url::parse(&profile.base_url).map_err(|_| SourceError::InvalidUrl {
            url: profile.base_url.clone(),
        })?;
        let selectors = CompiledSelectors::compile(&profile)?;

        Ok(Self {
            profile,
            base_url,
            selectors,
            http: HttpFetcher::new(settings)?,
            verbatim_links: false,
        })
    }

    /// Keep links exactly as the page serves them; root-relative links are
    /// only prefixed with the base URL.
    ///
    /// Needed by [`IdentityScheme::Legacy`](crate::IdentityScheme::Legacy):
    /// archived identities were hashed over the untouched href, tracking
    /// parameters included.
    pub fn with_verbatim_links(mut self, verbatim: bool) -> Self {
        self.verbatim_links = verbatim;
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http = self.http.with_client(client);
        self
    }

    /// LinkedIn guest search.
    pub fn linkedin(settings: HttpSettings) -> SourceResult<Self> {
        Self::new(SearchPageProfile::linkedin(), settings)
    }

    /// Indeed search.
    pub fn indeed(settings: HttpSettings) -> SourceResult<Self> {
        Self::new(SearchPageProfile::indeed(), settings)
    }

    fn search_url(&self) -> String {
        format!(
            "{}{}",
            self.profile.base_url.trim_end_matches('/'),
            self.profile.search_path
        )
    }

    /// Parse one results page into postings.
    ///
    /// Cards without a title or link are skipped. At most `max_results`
    /// cards are examined. A missing location falls back to the location
    /// that was searched for.
    pub fn parse_results(
        &self,
        html: &str,
        searched_location: &str,
        max_results: usize,
    ) -> Vec<RawPosting> {
        let document = Html::parse_document(html);
        let mut postings = Vec::new();

        for card in document.select(&self.selectors.card).take(max_results) {
            let Some(title) = first_text(&card, &self.selectors.title) else {
                continue;
            };
            let Some(url) = self.card_link(&card) else {
                debug!(title = %title, "Skipping card without link");
                continue;
            };

            let company =
                first_text(&card, &self.selectors.company).unwrap_or_else(|| "N/A".to_string());
            let location = first_text(&card, &self.selectors.location)
                .unwrap_or_else(|| searched_location.to_string());

            let mut posting = RawPosting::new(title, url).with_company(company);
            if !location.is_empty() {
                posting = posting.with_location(location);
            }
            postings.push(posting);
        }

        postings
    }

    /// Absolute link for a card, resolved against the board's base URL.
    fn card_link(&self, card: &ElementRef<'_>) -> Option<String> {
        let href = card
            .select(&self.selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())?;

        if self.verbatim_links {
            if Url::parse(href).is_ok() {
                return Some(href.to_string());
            }
            if href.starts_with('/') {
                return Some(format!(
                    "{}{}",
                    self.profile.base_url.trim_end_matches('/'),
                    href
                ));
            }
        }

        let mut resolved = self.base_url.join(href).ok()?;
        resolved.set_fragment(None);
        if self.profile.strip_link_query {
            resolved.set_query(None);
        }
        Some(resolved.to_string())
    }
}

/// Trimmed, whitespace-collapsed text of the first match.
fn first_text(scope: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

#[async_trait]
impl SourceAdapter for SearchPageSource {
    async fn fetch(&self, ctx: &RunContext) -> SourceResult<Vec<RawPosting>> {
        let pairs = ctx.query_pairs();
        let search_url = self.search_url();
        let mut seen: HashSet<String> = HashSet::new();
        let mut postings = Vec::new();

        info!(
            source = %self.profile.name,
            combinations = pairs.len(),
            "Searching keyword+location combinations"
        );

        for (i, (keyword, location)) in pairs.iter().enumerate() {
            let mut query: Vec<(&str, &str)> = vec![
                (self.profile.keyword_param.as_str(), keyword.as_str()),
                (self.profile.location_param.as_str(), location.as_str()),
            ];
            query.extend(
                self.profile
                    .extra_params
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );

            let html = match self.http.get_text(&search_url, &query, &ctx.user_agent).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(
                        source = %self.profile.name,
                        keyword = %keyword,
                        location = %location,
                        error = %e,
                        "Search request failed"
                    );
                    continue;
                }
            };

            let mut found = 0;
            for posting in self.parse_results(&html, location, ctx.max_results) {
                if seen.insert(posting.url.clone()) {
                    postings.push(posting.with_metadata("query", keyword.clone()));
                    found += 1;
                }
            }

            debug!(
                source = %self.profile.name,
                combination = i + 1,
                keyword = %keyword,
                location = %location,
                found,
                "Search combination complete"
            );
        }

        info!(
            source = %self.profile.name,
            postings = postings.len(),
            "Search source fetch completed"
        );

        Ok(postings)
    }

    fn name(&self) -> &str {
        &self.profile.name
    }

    fn filter_mode(&self) -> FilterMode {
        FilterMode::QueryMatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fixture_server::{direct_client, FixtureServer, Route};
    use std::time::Duration;

    const LINKEDIN_HTML: &str = r#"
        <li>
          <div class="base-card">
            <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/swe-intern-1?refId=abc&trackingId=xyz"></a>
            <h3 class="base-search-card__title">
              Software Engineering Intern
            </h3>
            <h4 class="base-search-card__subtitle"><a>Acme Corp</a></h4>
            <span class="job-search-card__location">Seattle, WA</span>
          </div>
        </li>
        <li>
          <div class="base-card">
            <a class="base-card__full-link" href="/jobs/view/data-intern-2"></a>
            <h3 class="base-search-card__title">Data Intern</h3>
          </div>
        </li>
        <li>
          <div class="base-card">
            <h3 class="base-search-card__title">No Link Intern</h3>
          </div>
        </li>
        <li><div class="other">Not a card</div></li>
    "#;

    fn source() -> SearchPageSource {
        SearchPageSource::linkedin(HttpSettings::default()).unwrap()
    }

    #[test]
    fn test_parse_linkedin_cards() {
        let postings = source().parse_results(LINKEDIN_HTML, "United States", 50);

        assert_eq!(postings.len(), 2);

        assert_eq!(postings[0].title, "Software Engineering Intern");
        assert_eq!(postings[0].company.as_deref(), Some("Acme Corp"));
        assert_eq!(postings[0].location.as_deref(), Some("Seattle, WA"));
        assert_eq!(
            postings[0].url,
            "https://www.linkedin.com/jobs/view/swe-intern-1"
        );

        // Relative link resolved, missing fields defaulted
        assert_eq!(postings[1].url, "https://www.linkedin.com/jobs/view/data-intern-2");
        assert_eq!(postings[1].company.as_deref(), Some("N/A"));
        assert_eq!(postings[1].location.as_deref(), Some("United States"));
    }

    #[test]
    fn test_verbatim_links_keep_tracking_query() {
        let source = source().with_verbatim_links(true);
        let postings = source.parse_results(LINKEDIN_HTML, "United States", 50);

        assert_eq!(
            postings[0].url,
            "https://www.linkedin.com/jobs/view/swe-intern-1?refId=abc&trackingId=xyz"
        );
        assert_eq!(postings[1].url, "https://www.linkedin.com/jobs/view/data-intern-2");

        let indeed = SearchPageSource::indeed(HttpSettings::default())
            .unwrap()
            .with_verbatim_links(true);
        let html = r#"
            <div class="job_seen_beacon">
              <h2 class="jobTitle"><a href="/rc/clk?jk=123&amp;from=serp#top">Backend Intern</a></h2>
            </div>
        "#;
        assert_eq!(
            indeed.parse_results(html, "", 50)[0].url,
            "https://www.indeed.com/rc/clk?jk=123&from=serp#top"
        );
    }

    #[test]
    fn test_max_results_caps_cards() {
        let postings = source().parse_results(LINKEDIN_HTML, "Remote", 1);
        assert_eq!(postings.len(), 1);
    }

    #[test]
    fn test_parse_indeed_cards() {
        let source = SearchPageSource::indeed(HttpSettings::default()).unwrap();
        let html = r#"
            <div class="job_seen_beacon">
              <h2 class="jobTitle"><a href="/rc/clk?jk=123&amp;from=serp">Backend Intern</a></h2>
              <span data-testid="company-name">Globex</span>
              <div data-testid="text-location">Remote</div>
            </div>
        "#;

        let postings = source.parse_results(html, "", 50);

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Backend Intern");
        assert_eq!(postings[0].company.as_deref(), Some("Globex"));
        assert_eq!(postings[0].location.as_deref(), Some("Remote"));
        assert_eq!(postings[0].url, "https://www.indeed.com/rc/clk?jk=123&from=serp");
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let mut profile = SearchPageProfile::linkedin();
        profile.card_selector = "div[".to_string();

        assert!(SearchPageSource::new(profile, HttpSettings::default()).is_err());
    }

    fn cards(ids: &[&str]) -> String {
        ids.iter()
            .map(|id| {
                format!(
                    r#"<li><div class="base-card">
                         <a class="base-card__full-link" href="/jobs/view/{id}?trk=search"></a>
                         <h3 class="base-search-card__title">Intern {id}</h3>
                       </div></li>"#
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_survives_failed_combination() {
        let server = FixtureServer::start(vec![
            Route::ok("keywords=alpha", cards(&["a1", "a2", "a3"])),
            Route::status("keywords=dead", 500),
            Route::ok("keywords=beta", cards(&["a2", "b1", "b2"])),
        ])
        .await;

        let mut profile = SearchPageProfile::linkedin();
        profile.base_url = server.base_url.clone();
        let settings = HttpSettings {
            timeout: Duration::from_secs(5),
            request_delay: Duration::ZERO,
        };
        let source = SearchPageSource::new(profile, settings)
            .unwrap()
            .with_client(direct_client());

        let ctx = RunContext::new()
            .with_query("alpha", "Seattle")
            .with_query("dead", "Boston")
            .with_query("beta", "Remote")
            .with_max_results(2);

        let postings = source.fetch(&ctx).await.unwrap();

        // Every combination was tried
        assert_eq!(server.requests().len(), 3);

        // Two per combination, the shared a2 only once
        let titles: Vec<&str> = postings.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Intern a1", "Intern a2", "Intern b1"]);

        assert_eq!(postings[1].url, format!("{}/jobs/view/a2", server.base_url));
        assert_eq!(postings[1].metadata.get("query").map(String::as_str), Some("alpha"));
        assert_eq!(postings[2].metadata.get("query").map(String::as_str), Some("beta"));
        assert_eq!(postings[2].location.as_deref(), Some("Remote"));
    }

    #[tokio::test]
    async fn test_fetch_with_every_combination_down_is_empty() {
        let server = FixtureServer::start(vec![]).await;

        let mut profile = SearchPageProfile::indeed();
        profile.base_url = server.base_url.clone();
        let source = SearchPageSource::new(
            profile,
            HttpSettings {
                timeout: Duration::from_secs(5),
                request_delay: Duration::ZERO,
            },
        )
        .unwrap()
        .with_client(direct_client());

        let ctx = RunContext::new().with_keywords(["intern"]);
        assert!(source.fetch(&ctx).await.unwrap().is_empty());
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn test_search_url() {
        assert_eq!(
            source().search_url(),
            "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search"
        );
        assert_eq!(source().filter_mode(), FilterMode::QueryMatched);
    }
}
