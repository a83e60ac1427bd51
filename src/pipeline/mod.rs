//! Pipeline entry points for mirror index operations.
//!
//! - `run_fetch`: Fetch every mirror and replace the saved listing
//! - `run_validate`: Check settings and the mirror list
//! - `search`: Query a saved listing by title
//! - `summarize`: Per-mirror counts of a saved listing

pub mod aggregate;
pub mod fetch;
pub mod info;
pub mod search;
pub mod validate;

pub use aggregate::{AggregateOutcome, Aggregator, EntrySource, MirrorReport};
pub use fetch::{RunSummary, run_fetch, run_fetch_with};
pub use info::{MirrorCount, summarize};
pub use search::{SearchGroup, SearchLink, search};
pub use validate::{ValidationReport, run_validate};
