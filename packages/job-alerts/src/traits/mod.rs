//! Core trait abstractions for the job alerts library.
//!
//! These traits are the seams between the pipeline and the outside world:
//! where postings come from, where they are remembered, and how the user
//! hears about them.

pub mod notifier;
pub mod source;
pub mod store;
