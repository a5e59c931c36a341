//! Source adapter trait for pluggable job boards.
//!
//! Every job board (search pages, ATS APIs) is one `SourceAdapter`
//! implementation. Adapters are isolated from each other: a parse failure
//! in one cannot touch another, and the pipeline skips a failed adapter and
//! moves on.
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_alerts::{RunContext, SourceAdapter};
//!
//! let ctx = RunContext::new().with_keywords(["backend intern"]);
//! let postings = source.fetch(&ctx).await?;
//! ```

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::types::{
    config::{FilterMode, RunContext},
    posting::RawPosting,
};

/// A job board that can be polled for raw postings.
///
/// # Contract
///
/// - Failures on one item or one query combination are logged and skipped;
///   whatever was gathered is still returned.
/// - `ctx.max_results` caps each query combination (or board), not the
///   total.
/// - Postings discovered twice within one call (same URL) are returned once.
/// - Returning `Err` means the whole source was unusable this run.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch raw postings for this run.
    async fn fetch(&self, ctx: &RunContext) -> SourceResult<Vec<RawPosting>>;

    /// Source tag recorded on every posting from this adapter.
    ///
    /// Board-enumerable sources tag per board (e.g. `lever-netflix`) and
    /// override this via the posting's `source` metadata; see
    /// [`source_tag_for`].
    fn name(&self) -> &str;

    /// How the pipeline should filter this source's postings.
    fn filter_mode(&self) -> FilterMode;
}

/// Metadata key an adapter uses to give a posting a more specific source tag.
pub const SOURCE_TAG_KEY: &str = "source";

/// Source tag for a posting: its own `source` metadata, else the adapter name.
pub fn source_tag_for<'a>(adapter: &'a dyn SourceAdapter, posting: &'a RawPosting) -> &'a str {
    posting
        .metadata
        .get(SOURCE_TAG_KEY)
        .map(String::as_str)
        .filter(|tag| !tag.is_empty())
        .unwrap_or_else(|| adapter.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSource;

    #[test]
    fn test_source_tag_prefers_posting_metadata() {
        let source = MockSource::new("lever");

        let tagged = RawPosting::new("Intern", "https://a.co/1")
            .with_metadata(SOURCE_TAG_KEY, "lever-netflix");
        assert_eq!(source_tag_for(&source, &tagged), "lever-netflix");

        let untagged = RawPosting::new("Intern", "https://a.co/2");
        assert_eq!(source_tag_for(&source, &untagged), "lever");
    }
}
