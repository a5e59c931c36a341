//! Digest rendering: one message listing every new posting.

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use crate::types::job::{truncate_chars, JobRecord};

/// Characters of description shown per job in the HTML body.
pub const HTML_DESCRIPTION_CHARS: usize = 200;

const STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto; padding: 20px; }
    .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 10px; margin-bottom: 30px; text-align: center; }
    .job-card { border: 1px solid #e0e0e0; border-radius: 8px; padding: 20px; margin-bottom: 20px; background: white; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
    .job-title { font-size: 20px; font-weight: bold; color: #2c3e50; margin-bottom: 10px; }
    .job-company { font-size: 16px; color: #667eea; margin-bottom: 8px; }
    .job-details { font-size: 14px; color: #666; margin-bottom: 5px; }
    .badge { display: inline-block; background: #f0f0f0; padding: 4px 12px; border-radius: 12px; font-size: 12px; margin-right: 8px; color: #666; }
    .apply-button { display: inline-block; background: #667eea; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; margin-top: 15px; font-weight: bold; }
    .footer { text-align: center; margin-top: 40px; padding-top: 20px; border-top: 1px solid #e0e0e0; color: #666; font-size: 14px; }
"#;

/// A rendered digest, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Digest {
    /// Render a digest for `jobs`, stamped with `generated_at`.
    pub fn render(jobs: &[JobRecord], generated_at: DateTime<Utc>) -> Self {
        Self {
            subject: subject(jobs.len()),
            text: text_body(jobs, generated_at),
            html: html_body(jobs, generated_at),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// `Job Alert: N New Job(s) Found!`
pub fn subject(count: usize) -> String {
    format!("Job Alert: {count} New Job{} Found!", plural(count))
}

/// Plain-text body: a numbered list of postings.
pub fn text_body(jobs: &[JobRecord], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "New Job Alert - {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "{}", "=".repeat(60));
    out.push('\n');

    for (i, job) in jobs.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, job.title);
        let _ = writeln!(out, "   Company: {}", job.company);
        let _ = writeln!(out, "   Location: {}", job.display_location());
        let _ = writeln!(out, "   Source: {}", job.source);
        let _ = writeln!(out, "   URL: {}", job.url);
        out.push('\n');
    }

    out
}

/// HTML body: one card per posting. Every interpolated value is escaped.
pub fn html_body(jobs: &[JobRecord], generated_at: DateTime<Utc>) -> String {
    let count = jobs.len();
    let mut out = String::new();

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{STYLE}</style>\n</head>\n<body>\n"
    );
    let _ = write!(
        out,
        "<div class=\"header\">\n<h1>New Job Alert!</h1>\n<p>Found {count} new job{} matching your criteria</p>\n<p style=\"font-size: 14px; opacity: 0.9;\">{}</p>\n</div>\n",
        plural(count),
        generated_at.format("%B %d, %Y at %H:%M UTC"),
    );

    for job in jobs {
        let _ = write!(
            out,
            "<div class=\"job-card\">\n<div class=\"job-title\">{}</div>\n<div class=\"job-company\">{}</div>\n<div class=\"job-details\">\n<span class=\"badge\">{}</span>\n<span class=\"badge\">{}</span>\n</div>\n",
            encode_text(&job.title),
            encode_text(&job.company),
            encode_text(job.display_location()),
            encode_text(&source_badge(&job.source)),
        );

        if !job.description.is_empty() {
            let snippet = truncate_chars(&job.description, HTML_DESCRIPTION_CHARS);
            let _ = write!(
                out,
                "<div class=\"job-details\" style=\"margin-top: 10px;\">{}...</div>\n",
                encode_text(&snippet),
            );
        }

        let _ = write!(
            out,
            "<a href=\"{}\" class=\"apply-button\">Apply Now</a>\n</div>\n",
            encode_double_quoted_attribute(&job.url),
        );
    }

    out.push_str(
        "<div class=\"footer\">\n<p>This is an automated job alert from your Job Alert System.</p>\n<p>Apply early to increase your chances!</p>\n</div>\n</body>\n</html>\n",
    );
    out
}

/// `lever-netflix` -> `Lever-Netflix`
fn source_badge(source: &str) -> String {
    source
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
