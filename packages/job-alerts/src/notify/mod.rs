//! Notifier implementations and digest rendering.
//!
//! - [`LogNotifier`] - writes the text digest to the log (no transport configured)
//! - [`digest`] - subject, plain-text and HTML bodies shared by every channel

pub mod digest;
mod logging;

pub use digest::Digest;
pub use logging::LogNotifier;

// Re-export from traits for convenience
pub use crate::traits::notifier::Notifier;
