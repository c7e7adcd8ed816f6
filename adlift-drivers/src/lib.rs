//! Browser collaborator for manual listing submission.
//!
//! A thin control wrapper around a WebDriver session that fills and submits
//! the marketplace's listing form. It carries no feed-document logic; the
//! submission pipeline never depends on it, and nothing flows back from it
//! into the feed core. Failures are reported as an outcome (success flag
//! plus reason), logged, and never retried here.

pub mod session;

pub use session::{AvitoSession, BrowserOptions, PostOutcome};
