//! Transport-agnostic submission pipeline.
//!
//! Each operation owns an independent [`FeedDocument`]; the only shared
//! state is the feed writer's output directory. Bulk submissions are
//! atomic: if any ad in the batch is malformed, nothing is written and a
//! single error identifying the bad ad is returned.

use std::path::PathBuf;

use adlift_common::{AdliftError, Result};
use adlift_feed::{validate, FeedDocument, FeedWriter, SubmissionKind};

use crate::types::{params_to_fields, BulkAdItem, CreateAdRequest, CreateBulkAdsRequest};

/// Outcome of a successful submission.
#[derive(Debug)]
pub struct CreatedFeed {
    pub ads_created: usize,
    pub file: PathBuf,
}

/// Validates incoming submissions, builds the feed document, and persists it.
#[derive(Debug, Clone)]
pub struct SubmissionService {
    writer: FeedWriter,
}

impl SubmissionService {
    pub fn new(writer: FeedWriter) -> Self {
        Self { writer }
    }

    /// Create a feed with a single ad.
    ///
    /// The four required fields are checked in the fixed order `title,
    /// description, price, category`; the first one absent is named in the
    /// error.
    pub fn create_ad(&self, request: CreateAdRequest) -> Result<CreatedFeed> {
        let title = request.title.ok_or(AdliftError::MissingField("title"))?;
        let description = request
            .description
            .ok_or(AdliftError::MissingField("description"))?;
        let price = request.price.ok_or(AdliftError::MissingField("price"))?;
        let category = request
            .category
            .ok_or(AdliftError::MissingField("category"))?;

        let price = price.canonicalize()?;

        let mut doc = FeedDocument::new(category);
        doc.add_entry(
            title,
            description,
            price,
            request.images,
            params_to_fields(request.params),
        )?;

        let file = self.persist(&doc, SubmissionKind::Single)?;
        tracing::info!(file = %file.display(), "submit.single.created");
        Ok(CreatedFeed {
            ads_created: 1,
            file,
        })
    }

    /// Create a feed containing every ad of a bulk submission, atomically.
    ///
    /// Top-level `category` and `ads` must both be present (absent names are
    /// reported jointly). A missing required field inside any single ad
    /// fails the whole batch before anything touches storage.
    pub fn create_bulk_ads(&self, request: CreateBulkAdsRequest) -> Result<CreatedFeed> {
        let mut absent = Vec::new();
        if request.category.is_none() {
            absent.push("category");
        }
        if request.ads.is_none() {
            absent.push("ads");
        }
        if !absent.is_empty() {
            return Err(AdliftError::MissingFields(absent));
        }
        // Checked above.
        let category = request.category.unwrap();
        let ads = request.ads.unwrap();

        let mut doc = FeedDocument::new(category);
        for (index, ad) in ads.into_iter().enumerate() {
            append_bulk_ad(&mut doc, index, ad)?;
        }

        let ads_created = doc.entries().len();
        let file = self.persist(&doc, SubmissionKind::Bulk)?;
        tracing::info!(file = %file.display(), ads = ads_created, "submit.bulk.created");
        Ok(CreatedFeed { ads_created, file })
    }

    /// Defensive validation pass before persistence. Input checks make
    /// violations unreachable on the happy path, but a construction defect
    /// must never reach storage.
    fn persist(&self, doc: &FeedDocument, kind: SubmissionKind) -> Result<PathBuf> {
        let violations = validate(doc);
        if !violations.is_empty() {
            let joined = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            tracing::error!(violations = %joined, "submit.validation_failed");
            return Err(AdliftError::Validation(joined));
        }
        self.writer.save(doc, kind)
    }
}

fn append_bulk_ad(doc: &mut FeedDocument, index: usize, ad: BulkAdItem) -> Result<()> {
    let title = ad.title.ok_or(AdliftError::MissingAdField {
        index,
        field: "title",
    })?;
    let description = ad.description.ok_or(AdliftError::MissingAdField {
        index,
        field: "description",
    })?;
    let price = ad
        .price
        .ok_or(AdliftError::MissingAdField {
            index,
            field: "price",
        })?
        .canonicalize()?;

    doc.add_entry(title, description, price, ad.images, params_to_fields(ad.params))?;
    Ok(())
}
