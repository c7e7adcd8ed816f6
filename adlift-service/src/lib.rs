//! HTTP-facing submission service for the ad feed pipeline.
//!
//! Accepts single or bulk ad submissions, enforces the request input
//! contract, drives the document model and validator in `adlift-feed`, and
//! persists the result through the feed writer. Request handling is split
//! between [`submit`] (transport-agnostic pipeline) and [`transport`] (axum
//! routes and status mapping).
//!
//! Error mapping: malformed requests (missing fields, bad prices) become
//! `400` responses naming the offending field; build/validate/persist
//! failures become `500` responses carrying the failure description. No
//! error path leaves a partial file on disk.

pub mod submit;
pub mod transport;
pub mod types;

pub use submit::SubmissionService;
pub use transport::router;
