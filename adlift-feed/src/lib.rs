//! In-memory model, validation, and persistence of the marketplace bulk-ad
//! feed document.
//!
//! The feed is the XML bulk-import format consumed by the marketplace's
//! autoload mechanism: a fixed `<Ads>` root carrying one `<Ad>` element per
//! listing. Construction is append-only, validation is pure and accumulates
//! every violation in one pass, and the writer guarantees that a file is
//! either completely written or absent.
//!
//! Typical flow: [`FeedDocument::new`] → [`FeedDocument::add_entry`] →
//! [`validate::validate`] → [`writer::FeedWriter::save`].

pub mod document;
pub mod parse;
pub mod validate;
pub mod writer;

pub use document::{AdEntry, FeedDocument, ImageRef, FEED_FORMAT_VERSION, FEED_ROOT_TAG, FEED_TARGET};
pub use validate::{validate, Violation};
pub use writer::{FeedWriter, SubmissionKind};
