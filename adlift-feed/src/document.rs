//! The in-memory feed document tree.
//!
//! A [`FeedDocument`] exclusively owns its [`AdEntry`] sequence and each
//! entry exclusively owns its images and extra fields; there are no shared
//! or back references. Documents are transient: built for one submission,
//! validated, serialized, dropped.

use adlift_common::{AdliftError, Result};

/// Fixed root element tag of the feed document.
pub const FEED_ROOT_TAG: &str = "Ads";
/// Fixed feed format version emitted on the root element.
pub const FEED_FORMAT_VERSION: &str = "3";
/// Fixed marketplace identifier emitted on the root element.
pub const FEED_TARGET: &str = "Avito.ru";

/// Root container of the bulk-ad feed.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    root_tag: String,
    format_version: String,
    target: String,
    category: String,
    entries: Vec<AdEntry>,
}

/// One listing inside a feed document.
#[derive(Debug, Clone)]
pub struct AdEntry {
    title: String,
    description: String,
    /// Canonical decimal text of a non-negative integer price.
    price: String,
    images: Vec<ImageRef>,
    /// Marketplace attribute name → value, in insertion order. Keys become
    /// XML element names and are checked by [`is_safe_element_name`] before
    /// they are accepted.
    extra_fields: Vec<(String, String)>,
}

/// A single image URL or path attached to an ad entry.
#[derive(Debug, Clone)]
pub struct ImageRef {
    url: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedDocument {
    /// Create an empty feed document with the fixed format/target attributes.
    ///
    /// `category` is accepted for future per-category feed customisation; it
    /// is retained on the document but not yet embedded in the serialized
    /// output, matching the marketplace's current format.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            root_tag: FEED_ROOT_TAG.to_string(),
            format_version: FEED_FORMAT_VERSION.to_string(),
            target: FEED_TARGET.to_string(),
            category: category.into(),
            entries: Vec::new(),
        }
    }

    /// Append a new entry built from the given fields.
    ///
    /// `images` and `extra_fields` keep their supplied order. The price is a
    /// non-negative integer and is stored as its canonical decimal text
    /// (`1000`, never `1000.0` or grouped digits). Fails if an extra-field
    /// key is not a safe XML element name.
    pub fn add_entry(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        price: u64,
        images: Vec<String>,
        extra_fields: Vec<(String, String)>,
    ) -> Result<&AdEntry> {
        for (key, _) in &extra_fields {
            if !is_safe_element_name(key) {
                return Err(AdliftError::Document(format!(
                    "extra field key is not a valid element name: {key:?}"
                )));
            }
        }

        self.entries.push(AdEntry {
            title: title.into(),
            description: description.into(),
            price: price.to_string(),
            images: images.into_iter().map(ImageRef::new).collect(),
            extra_fields,
        });
        // Just pushed, so the sequence is non-empty.
        Ok(self.entries.last().unwrap())
    }

    pub fn root_tag(&self) -> &str {
        &self.root_tag
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The category the document was created for. Reserved; not serialized.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn entries(&self) -> &[AdEntry] {
        &self.entries
    }

    /// Used by the reader when round-tripping a persisted feed; regular
    /// construction always goes through [`FeedDocument::new`].
    pub(crate) fn from_parts(
        root_tag: String,
        format_version: String,
        target: String,
        entries: Vec<AdEntry>,
    ) -> Self {
        Self {
            root_tag,
            format_version,
            target,
            category: String::new(),
            entries,
        }
    }
}

impl AdEntry {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Price as canonical decimal text.
    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn extra_fields(&self) -> &[(String, String)] {
        &self.extra_fields
    }

    pub(crate) fn from_parts(
        title: String,
        description: String,
        price: String,
        images: Vec<ImageRef>,
        extra_fields: Vec<(String, String)>,
    ) -> Self {
        Self {
            title,
            description,
            price,
            images,
            extra_fields,
        }
    }
}

/// Whether `name` may be emitted as an XML element tag.
///
/// Extra-field keys are caller-controlled, so the serializer only accepts a
/// conservative subset of XML names: an ASCII letter or underscore first,
/// then ASCII alphanumerics, `-`, `_`, or `.`. Names beginning with `xml`
/// (any case) are reserved by the XML spec and rejected too.
pub fn is_safe_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.') {
        return false;
    }
    !name.to_ascii_lowercase().starts_with("xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_carries_fixed_attributes() {
        let doc = FeedDocument::new("Electronics");
        assert_eq!(doc.root_tag(), "Ads");
        assert_eq!(doc.format_version(), "3");
        assert_eq!(doc.target(), "Avito.ru");
        assert_eq!(doc.category(), "Electronics");
        assert!(doc.entries().is_empty());
    }

    #[test]
    fn add_entry_appends_in_order_and_keeps_field_order() {
        let mut doc = FeedDocument::new("Electronics");
        doc.add_entry(
            "First",
            "Desc 1",
            1000,
            vec!["a.jpg".into(), "b.jpg".into()],
            vec![
                ("Condition".into(), "New".into()),
                ("Brand".into(), "Apple".into()),
            ],
        )
        .unwrap();
        doc.add_entry("Second", "Desc 2", 2000, vec![], vec![])
            .unwrap();

        assert_eq!(doc.entries().len(), 2);
        let first = &doc.entries()[0];
        assert_eq!(first.title(), "First");
        assert_eq!(first.images()[0].url(), "a.jpg");
        assert_eq!(first.images()[1].url(), "b.jpg");
        assert_eq!(first.extra_fields()[0].0, "Condition");
        assert_eq!(first.extra_fields()[1].0, "Brand");
        assert_eq!(doc.entries()[1].title(), "Second");
    }

    #[test]
    fn price_serializes_as_canonical_decimal_text() {
        let mut doc = FeedDocument::new("Electronics");
        let entry = doc
            .add_entry("Ad", "Desc", 100000, vec![], vec![])
            .unwrap();
        assert_eq!(entry.price(), "100000");
    }

    #[test]
    fn unsafe_extra_field_keys_are_rejected() {
        let mut doc = FeedDocument::new("Electronics");
        let err = doc
            .add_entry(
                "Ad",
                "Desc",
                1,
                vec![],
                vec![("Bad Key/>".into(), "v".into())],
            )
            .unwrap_err();
        assert!(err.to_string().contains("element name"));
        assert!(doc.entries().is_empty());
    }

    #[test]
    fn element_name_safety() {
        assert!(is_safe_element_name("Condition"));
        assert!(is_safe_element_name("Brand_2"));
        assert!(is_safe_element_name("_private"));
        assert!(!is_safe_element_name(""));
        assert!(!is_safe_element_name("1starts-with-digit"));
        assert!(!is_safe_element_name("has space"));
        assert!(!is_safe_element_name("injected/><Evil"));
        assert!(!is_safe_element_name("xmlReserved"));
        assert!(!is_safe_element_name("XMLReserved"));
    }
}
