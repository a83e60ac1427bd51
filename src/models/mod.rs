// src/models/mod.rs

//! Domain models for the mirror index.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod entry;
mod filename;
mod mirror;

// Re-export all public types
pub use config::{Config, CrawlerConfig, PathsConfig, QuotaConfig};
pub use entry::{FallbackIndex, FileEntry};
pub use filename::ParsedFilename;
pub use mirror::{AccessPolicy, MirrorDescriptor};
