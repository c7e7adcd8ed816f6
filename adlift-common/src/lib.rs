//! Common types and utilities shared across Adlift crates.
//!
//! This crate defines the shared error taxonomy, observability helpers, and
//! the listing payload exchanged between the submission pipeline and the
//! browser collaborator. It is intentionally lightweight and
//! dependency‑minimal so that all crates can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`ListingPayload`]: One classified-ad listing as handed between components
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`AdliftError`] and [`Result`]: Shared error handling
use serde::{Deserialize, Serialize};

pub mod observability;

/// One classified-ad listing as exchanged between the submission service and
/// the browser collaborator.
///
/// `images` and `extra_fields` keep the order in which the caller supplied
/// them; the feed serializer relies on that for deterministic output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPayload {
    pub title: String,
    pub description: String,
    /// Non-negative integer price. Serialized as canonical decimal text in
    /// the feed document.
    pub price: u64,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Marketplace-defined attribute names (condition, brand, ...) mapped to
    /// their values, in insertion order.
    #[serde(default)]
    pub extra_fields: Vec<(String, String)>,
}

/// Marketplace account credentials used by the browser collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Error types used across the Adlift system.
#[derive(thiserror::Error, Debug)]
pub enum AdliftError {
    /// A required field was absent from a request body.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Several required top-level fields were absent at once.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A required field was absent from one ad of a bulk submission.
    #[error("Missing required field in ad {index}: {field}")]
    MissingAdField { index: usize, field: &'static str },

    /// A price could not be coerced to a non-negative integer.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Document construction rejected the input (e.g. an unsafe extra-field
    /// element name).
    #[error("Document error: {0}")]
    Document(String),

    /// A built document failed structural validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Output directory creation or file write failure.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The browser collaborator reported a session or element failure.
    #[error("Automation error: {0}")]
    Automation(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdliftError {
    /// Whether the error was caused by a malformed request rather than a
    /// server-side failure. Drives the HTTP status mapping in the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::MissingFields(_)
                | Self::MissingAdField { .. }
                | Self::InvalidPrice(_)
        )
    }
}

/// Convenient alias for results that use [`AdliftError`].
pub type Result<T> = std::result::Result<T, AdliftError>;
