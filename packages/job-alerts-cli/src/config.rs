use anyhow::{Context, Result};
use dotenvy::dotenv;
use job_alerts::{FilterPolicy, HttpSettings, IdentityScheme, RunContext};
use std::env;
use std::time::Duration;

const DEFAULT_KEYWORDS: &[&str] = &[
    "software engineering intern",
    "software engineer intern",
    "swe intern",
    "data science intern",
    "machine learning intern",
    "ml intern",
    "ai intern",
    "backend intern",
    "frontend intern",
    "full stack intern",
    "python intern",
    "computer science intern",
    "software development intern",
    "engineering intern",
    "tech intern",
];

const DEFAULT_LOCATIONS: &[&str] = &[
    "Remote",
    "United States",
    "New York",
    "San Francisco",
    "Seattle",
    "Austin",
    "Boston",
    "Los Angeles",
    "Chicago",
    "Denver",
    "San Diego",
    "Portland",
    "Atlanta",
    "Palo Alto",
    "Mountain View",
    "Menlo Park",
    "Redmond",
];

/// Search-page (keyword, location) combinations covering the internship roles.
const DEFAULT_SEARCH_QUERIES: &[(&str, &str)] = &[
    ("software engineering intern", "United States"),
    ("software engineer intern", "Remote"),
    ("swe intern", "United States"),
    ("data science intern", "United States"),
    ("machine learning intern", "United States"),
    ("ai intern", "Remote"),
    ("backend intern", "United States"),
    ("frontend intern", "United States"),
    ("full stack intern", "Remote"),
    ("python intern", "United States"),
    ("computer science intern", "United States"),
    ("software intern", "United States"),
    ("engineering intern", "Remote"),
];

const DEFAULT_GREENHOUSE_BOARDS: &[&str] = &[
    "airbnb",
    "stripe",
    "uber",
    "robinhood",
    "snowflake",
    "databricks",
    "coinbase",
    "reddit",
    "doordash",
    "instacart",
];

const DEFAULT_LEVER_BOARDS: &[&str] = &["netflix", "shopify", "canva", "figma", "plaid"];

const DEFAULT_ASHBY_BOARDS: &[&str] = &["ramp.com", "anthropic.com", "scale.com"];

/// Which sources are polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceToggles {
    pub linkedin: bool,
    pub indeed: bool,
    pub greenhouse: bool,
    pub lever: bool,
    pub ashby: bool,
}

/// SMTP delivery settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipient: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub keywords: Vec<String>,
    pub locations: Vec<String>,
    pub search_queries: Vec<(String, String)>,
    pub sources: SourceToggles,
    pub greenhouse_boards: Vec<String>,
    pub lever_boards: Vec<String>,
    pub ashby_boards: Vec<String>,
    pub max_jobs_per_check: usize,
    pub check_interval_minutes: u64,
    pub user_agent: String,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub title_gate: Option<String>,
    pub identity_scheme: IdentityScheme,
    /// `None` when email is not configured; digests are logged instead
    pub email: Option<EmailConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let email = match var("RECIPIENT_EMAIL").filter(|v| !v.trim().is_empty()) {
            Some(recipient) => {
                let sender = var("SENDER_EMAIL")
                    .context("SENDER_EMAIL must be set when RECIPIENT_EMAIL is set")?;
                Some(EmailConfig {
                    smtp_server: var("SMTP_SERVER")
                        .unwrap_or_else(|| "smtp.gmail.com".to_string()),
                    smtp_port: var("SMTP_PORT")
                        .unwrap_or_else(|| "587".to_string())
                        .parse()
                        .context("SMTP_PORT must be a valid port number")?,
                    username: var("SMTP_USERNAME").unwrap_or_else(|| sender.clone()),
                    password: var("SMTP_PASSWORD")
                        .context("SMTP_PASSWORD must be set when RECIPIENT_EMAIL is set")?,
                    sender,
                    recipient,
                })
            }
            None => None,
        };

        let search_queries = match var("SEARCH_QUERIES") {
            Some(raw) => parse_queries(&raw).context("SEARCH_QUERIES must be keyword@location pairs separated by ';'")?,
            None => DEFAULT_SEARCH_QUERIES
                .iter()
                .map(|(k, l)| (k.to_string(), l.to_string()))
                .collect(),
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite://jobs.db".to_string()),
            keywords: list_or(var("JOB_KEYWORDS"), DEFAULT_KEYWORDS),
            locations: list_or(var("JOB_LOCATIONS"), DEFAULT_LOCATIONS),
            search_queries,
            sources: SourceToggles {
                linkedin: flag(&var, "ENABLE_LINKEDIN", true)?,
                indeed: flag(&var, "ENABLE_INDEED", false)?,
                greenhouse: flag(&var, "ENABLE_GREENHOUSE", true)?,
                lever: flag(&var, "ENABLE_LEVER", true)?,
                ashby: flag(&var, "ENABLE_ASHBY", false)?,
            },
            greenhouse_boards: list_or(var("GREENHOUSE_BOARDS"), DEFAULT_GREENHOUSE_BOARDS),
            lever_boards: list_or(var("LEVER_BOARDS"), DEFAULT_LEVER_BOARDS),
            ashby_boards: list_or(var("ASHBY_BOARDS"), DEFAULT_ASHBY_BOARDS),
            max_jobs_per_check: var("MAX_JOBS_PER_CHECK")
                .unwrap_or_else(|| "50".to_string())
                .parse()
                .context("MAX_JOBS_PER_CHECK must be a valid number")?,
            check_interval_minutes: var("CHECK_INTERVAL_MINUTES")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("CHECK_INTERVAL_MINUTES must be a valid number")?,
            user_agent: var("USER_AGENT")
                .unwrap_or_else(|| job_alerts::types::config::DEFAULT_USER_AGENT.to_string()),
            request_delay_ms: var("REQUEST_DELAY_MS")
                .unwrap_or_else(|| "1000".to_string())
                .parse()
                .context("REQUEST_DELAY_MS must be a valid number")?,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
            title_gate: match var("TITLE_GATE") {
                Some(gate) if gate.trim().is_empty() => None,
                Some(gate) => Some(gate.trim().to_string()),
                None => Some("intern".to_string()),
            },
            identity_scheme: var("IDENTITY_SCHEME")
                .unwrap_or_default()
                .parse()
                .context("IDENTITY_SCHEME must be 'delimited' or 'legacy'")?,
            email,
        })
    }

    /// Parameters for one pipeline run.
    pub fn run_context(&self) -> RunContext {
        let mut ctx = RunContext::new()
            .with_keywords(self.keywords.iter().cloned())
            .with_locations(self.locations.iter().cloned())
            .with_max_results(self.max_jobs_per_check)
            .with_user_agent(self.user_agent.clone());
        ctx.queries = self.search_queries.clone();
        ctx
    }

    /// Inclusion policy for every run.
    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy::new()
            .with_title_gate(self.title_gate.clone())
            .with_identity_scheme(self.identity_scheme)
    }

    /// Timeout and request spacing for network sources.
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.request_timeout_secs),
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }

    /// Time between scheduled checks.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.max(1) * 60)
    }
}

fn list_or(value: Option<String>, default: &[&str]) -> Vec<String> {
    match value {
        Some(raw) => parse_list(&raw),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// Comma-separated list, blanks dropped.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// `keyword@location;keyword@location`; a pair without `@` has no location.
fn parse_queries(raw: &str) -> Result<Vec<(String, String)>> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (keyword, location) = pair.split_once('@').unwrap_or((pair, ""));
            let keyword = keyword.trim();
            anyhow::ensure!(!keyword.is_empty(), "empty keyword in query '{pair}'");
            Ok((keyword.to_string(), location.trim().to_string()))
        })
        .collect()
}

fn flag(var: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> Result<bool> {
    let Some(raw) = var(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        "" => Ok(default),
        other => anyhow::bail!("{name} must be true or false, got '{other}'"),
    }
}
