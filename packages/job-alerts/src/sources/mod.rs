//! Source adapter implementations for the supported job boards.
//!
//! # Available Sources
//!
//! - `SearchPageSource` - HTML search pages, one request per (keyword, location)
//!   (`linkedin`, `indeed` profiles)
//! - `GreenhouseSource`, `LeverSource`, `AshbySource` - ATS APIs, one request
//!   per organization board
//!
//! # Example
//!
//! ```rust,ignore
//! use job_alerts::sources::{LeverSource, SearchPageSource};
//! use job_alerts::types::config::HttpSettings;
//!
//! let settings = HttpSettings::default();
//! let sources: Vec<Box<dyn SourceAdapter>> = vec![
//!     Box::new(SearchPageSource::linkedin(settings)?),
//!     Box::new(LeverSource::lever(["netflix", "figma"], settings)?),
//! ];
//! ```

mod ashby;
mod board;
#[cfg(test)]
mod fixture_server;
mod greenhouse;
mod http;
mod lever;
mod search_page;

pub use ashby::{AshbyApi, AshbySource};
pub use board::{board_slug, company_name, BoardApi, BoardSource, ResponseShape};
pub use greenhouse::{GreenhouseApi, GreenhouseSource};
pub use http::HttpFetcher;
pub use lever::{LeverApi, LeverSource};
pub use search_page::{SearchPageProfile, SearchPageSource};

// Re-export from traits for convenience
pub use crate::traits::source::SourceAdapter;
