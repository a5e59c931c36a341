//! Configuration types for a run and for the inclusion filter.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::job::IdentityScheme;

/// Default cap on raw items taken from each query combination or board.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Browser-like user agent; several boards reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Parameters for one invocation of the ingestion pipeline.
///
/// Built once per run and passed by reference to every source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Keywords to search for / filter titles on
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Locations to search in / filter on
    #[serde(default)]
    pub locations: Vec<String>,

    /// Explicit (keyword, location) pairs for query-combinatorial sources.
    ///
    /// When empty, sources use the product of `keywords` x `locations`.
    #[serde(default)]
    pub queries: Vec<(String, String)>,

    /// Cap on raw items per query combination or per board
    pub max_results: usize,

    /// User agent sent with outbound requests
    pub user_agent: String,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            locations: Vec::new(),
            queries: Vec::new(),
            max_results: DEFAULT_MAX_RESULTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RunContext {
    /// Create a context with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keyword set.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the location set.
    pub fn with_locations(
        mut self,
        locations: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Add an explicit (keyword, location) query pair.
    pub fn with_query(mut self, keyword: impl Into<String>, location: impl Into<String>) -> Self {
        self.queries.push((keyword.into(), location.into()));
        self
    }

    /// Set the per-combination result cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the outbound user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The (keyword, location) pairs a query-combinatorial source should issue.
    ///
    /// Explicit pairs win; otherwise every keyword is paired with every
    /// location (a keyword alone is queried with an empty location).
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        if !self.queries.is_empty() {
            return self.queries.clone();
        }

        if self.locations.is_empty() {
            return self
                .keywords
                .iter()
                .map(|k| (k.clone(), String::new()))
                .collect();
        }

        self.keywords
            .iter()
            .flat_map(|k| self.locations.iter().map(move |l| (k.clone(), l.clone())))
            .collect()
    }
}

/// How a posting's location is compared against the configured locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationMatch {
    /// Location must contain one of the configured locations.
    Substring,

    /// Like `Substring`, but a recognized city or region alias also passes.
    ///
    /// For sources whose location is free text without a structured region.
    KnownCities,
}

/// Which parts of the filter a source's postings go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    /// The remote search already matched keywords and location; only the
    /// title gate applies.
    QueryMatched,

    /// Full keyword and location filtering happens client-side.
    ClientSide(LocationMatch),
}

/// Inclusion policy shared by every source in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterPolicy {
    /// Term every title must contain (case-insensitive); `None` disables.
    pub title_gate: Option<String>,

    /// Cities and region aliases accepted under [`LocationMatch::KnownCities`]
    pub known_cities: Vec<String>,

    /// Identity scheme used when normalizing
    pub identity_scheme: IdentityScheme,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            title_gate: Some("intern".to_string()),
            known_cities: [
                "New York",
                "San Francisco",
                "Seattle",
                "Boston",
                "Austin",
                "Chicago",
                "Los Angeles",
                "United States",
                "USA",
                "US",
                "Remote",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            identity_scheme: IdentityScheme::default(),
        }
    }
}

impl FilterPolicy {
    /// Create the default internship policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or clear) the title gate.
    pub fn with_title_gate(mut self, gate: Option<String>) -> Self {
        self.title_gate = gate.filter(|g| !g.trim().is_empty());
        self
    }

    /// Replace the known-cities list.
    pub fn with_known_cities(
        mut self,
        cities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.known_cities = cities.into_iter().map(Into::into).collect();
        self
    }

    /// Set the identity scheme.
    pub fn with_identity_scheme(mut self, scheme: IdentityScheme) -> Self {
        self.identity_scheme = scheme;
        self
    }
}

/// HTTP behaviour shared by network sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// Per-request timeout
    pub timeout: Duration,

    /// Minimum gap between requests to the same source
    pub request_delay: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            request_delay: Duration::from_millis(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_product() {
        let ctx = RunContext::new()
            .with_keywords(["swe intern", "ml intern"])
            .with_locations(["Remote", "Seattle"]);

        let pairs = ctx.query_pairs();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0], ("swe intern".to_string(), "Remote".to_string()));
        assert_eq!(pairs[3], ("ml intern".to_string(), "Seattle".to_string()));
    }

    #[test]
    fn test_explicit_queries_win() {
        let ctx = RunContext::new()
            .with_keywords(["a", "b"])
            .with_locations(["x", "y"])
            .with_query("swe intern", "United States");

        assert_eq!(
            ctx.query_pairs(),
            vec![("swe intern".to_string(), "United States".to_string())]
        );
    }

    #[test]
    fn test_keywords_without_locations() {
        let ctx = RunContext::new().with_keywords(["intern"]);
        assert_eq!(ctx.query_pairs(), vec![("intern".to_string(), String::new())]);
    }

    #[test]
    fn test_empty_title_gate_disables() {
        let policy = FilterPolicy::new().with_title_gate(Some("  ".to_string()));
        assert!(policy.title_gate.is_none());

        let policy = FilterPolicy::new().with_title_gate(Some("co-op".to_string()));
        assert_eq!(policy.title_gate.as_deref(), Some("co-op"));
    }
}
