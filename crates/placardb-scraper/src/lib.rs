//! Extraction side of the placardb pipeline.
//!
//! Turns one rendered ogol.com.br match page into a canonical
//! [`placardb_core::MatchRecord`]:
//!
//! 1. [`client::RenderClient`] fetches the rendered HTML (single attempt;
//!    callers wrap it with [`retry::retry_with_backoff`]).
//! 2. [`parse::parse_match`] extracts raw field values with prioritized
//!    selector strategies.
//! 3. [`orient::validate_orientation`] corrects inverted home/away
//!    assignments against the source's own declaration.
//! 4. [`normalize::normalize_match`] coerces raw values into the typed,
//!    range-checked canonical record.
//!
//! [`crawl::extract_match_links`] discovers the round's match URLs from the
//! competition fixture page.

pub mod client;
pub mod crawl;
pub mod error;
pub mod normalize;
pub mod orient;
pub mod parse;
pub mod retry;
pub mod throttle;
pub mod types;

pub use client::RenderClient;
pub use crawl::{extract_match_links, round_listing_url};
pub use error::ScraperError;
pub use normalize::normalize_match;
pub use orient::{validate_orientation, Orientation};
pub use parse::parse_match;
pub use retry::retry_with_backoff;
pub use throttle::AdaptiveThrottle;
pub use types::{RawDocument, RawEvent, RawLineup, RawMatchFields, RawPlayer};
