//! Inclusion filter applied to raw postings before normalization.
//!
//! AND across axes (title gate, keywords, locations), OR within an axis.
//! All comparisons are case-insensitive.

use crate::types::config::{FilterMode, FilterPolicy, LocationMatch};

/// Decide whether a posting should be kept.
///
/// An unknown (empty) location never excludes a posting.
pub fn matches(
    title: &str,
    location: &str,
    keywords: &[String],
    locations: &[String],
    mode: FilterMode,
    policy: &FilterPolicy,
) -> bool {
    let title = title.to_lowercase();

    if let Some(gate) = &policy.title_gate {
        if !title.contains(&gate.to_lowercase()) {
            return false;
        }
    }

    let location_match = match mode {
        FilterMode::QueryMatched => return true,
        FilterMode::ClientSide(location_match) => location_match,
    };

    if !keywords.is_empty() && !contains_any(&title, keywords) {
        return false;
    }

    let location = location.trim();
    if locations.is_empty() || location.is_empty() {
        return true;
    }

    let lowered = location.to_lowercase();
    if contains_any(&lowered, locations) {
        return true;
    }

    match location_match {
        LocationMatch::Substring => false,
        LocationMatch::KnownCities => names_known_city(location, &policy.known_cities),
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .any(|n| haystack.contains(&n))
}

/// Whole-word match against the known-cities list, so `US` matches
/// `Remote - US` but not `Austin`.
fn names_known_city(location: &str, known_cities: &[String]) -> bool {
    let words = padded_words(location);
    known_cities
        .iter()
        .map(|city| padded_words(city))
        .filter(|city| !city.trim().is_empty())
        .any(|city| words.contains(&city))
}

/// Lowercase, punctuation to spaces, single-spaced, padded: `" new york ny "`.
fn padded_words(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}
