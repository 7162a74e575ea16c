//! Batch ingestion: wires the scraper and the database into a per-match
//! pipeline and a bounded-concurrency round orchestrator.
//!
//! The seams are trait objects ([`DocumentFetcher`], [`RoundSource`],
//! [`MatchStore`]) so the orchestration logic is testable without a network
//! or a database.

pub mod fetch;
pub mod orchestrator;
pub mod outcome;
pub mod pipeline;
pub mod store;
pub mod traits;

pub use fetch::{FixturePageSource, RenderFetcher};
pub use orchestrator::{BatchOrchestrator, CancellationFlag};
pub use outcome::{BatchResult, Stage, TaskFailure, TaskOutcome};
pub use pipeline::{IngestPipeline, RetryPolicy};
pub use store::PgMatchStore;
pub use traits::{DocumentFetcher, MatchStore, RoundSource};
