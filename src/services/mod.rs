//! Service layer for the mirror index.
//!
//! This module contains the business logic for:
//! - Identifier extraction from listing pages (`extract`)
//! - Relay admission control (`QuotaGate`)
//! - Mirror listing retrieval (`MirrorFetcher`)

pub mod extractor;
pub mod fetcher;
pub mod quota;

pub use extractor::extract;
pub use fetcher::{
    CredentialLookup, FetchOutcome, ListingFetch, MirrorFetcher, QUOTA_SKIP_REASON, RelayConfig,
};
pub use quota::{FixedRandom, QuotaGate, RandomSource, SeededRandom, ThreadRandom};
