//! Data types for the job alerts library.

pub mod config;
pub mod job;
pub mod posting;
