//! Ingestion pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Fetch from each configured source
//! - Filter (title gate, keywords, locations)
//! - Normalize into job records with a stable identity
//! - Dedup against the store (insert-if-absent)
//! - Delivery of pending records (mark notified only after success)

pub mod deliver;
pub mod filter;
pub mod ingest;
pub mod normalize;

pub use deliver::{deliver_pending, DeliveryReport};
pub use filter::matches;
pub use ingest::{ingest, IngestResult, SourceCounts};
pub use normalize::normalize;
