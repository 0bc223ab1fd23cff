//! Shared plumbing for rollhub binaries.

pub mod logging;
