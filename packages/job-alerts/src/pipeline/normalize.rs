//! Raw posting -> canonical job record.

use url::Url;

use crate::error::{AlertError, Result};
use crate::types::{
    job::{IdentityScheme, JobRecord},
    posting::RawPosting,
};

/// Normalize a raw posting into a [`JobRecord`] tagged with `source_tag`.
///
/// Text fields are trimmed, missing optional fields become empty strings and
/// the description is truncated. Rejects postings with an empty title, a URL
/// that is empty, relative or not `http(s)`, or an empty source tag.
pub fn normalize(raw: &RawPosting, source_tag: &str, scheme: IdentityScheme) -> Result<JobRecord> {
    let title = raw.title.trim();
    if title.is_empty() {
        return Err(invalid("empty title"));
    }

    let url = raw.url.trim();
    if url.is_empty() {
        return Err(invalid("empty url"));
    }
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => {
            return Err(invalid(format!(
                "unsupported url scheme {}: {url}",
                parsed.scheme()
            )))
        }
        Err(_) => return Err(invalid(format!("url is not absolute: {url}"))),
    }

    let source_tag = source_tag.trim();
    if source_tag.is_empty() {
        return Err(invalid("empty source tag"));
    }

    let company = trimmed(&raw.company);

    Ok(
        JobRecord::with_scheme(scheme, title, company, url, source_tag)
            .with_location(trimmed(&raw.location))
            .with_description(raw.description.as_deref().unwrap_or("").trim())
            .with_posted_date(trimmed(&raw.posted_date)),
    )
}

fn trimmed(field: &Option<String>) -> &str {
    field.as_deref().map(str::trim).unwrap_or("")
}

fn invalid(reason: impl Into<String>) -> AlertError {
    AlertError::InvalidPosting {
        reason: reason.into(),
    }
}
