//! Reader for persisted feed documents.
//!
//! Used to round-trip a freshly written file back through the validator and
//! by tests that assert on the on-disk shape. The reader is tolerant: it
//! records whatever root tag and fields it finds and leaves judging them to
//! [`crate::validate::validate`].

use adlift_common::{AdliftError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{AdEntry, FeedDocument, ImageRef};

/// Parse feed XML back into a [`FeedDocument`].
pub fn parse_feed(xml: &str) -> Result<FeedDocument> {
    let mut reader = Reader::from_str(xml);

    let mut root_tag: Option<String> = None;
    let mut format_version = String::new();
    let mut target = String::new();
    let mut entries: Vec<AdEntry> = Vec::new();

    let mut current: Option<EntryBuilder> = None;
    let mut in_images = false;
    // Leaf element of the current entry whose text we are collecting.
    let mut leaf: Option<String> = None;

    loop {
        match reader.read_event().map_err(parse_err)? {
            Event::Start(elem) => {
                let name = element_name(&elem)?;
                if root_tag.is_none() {
                    for attr in elem.attributes() {
                        let attr = attr.map_err(parse_err)?;
                        let value = attr.unescape_value().map_err(parse_err)?.into_owned();
                        match attr.key.as_ref() {
                            b"formatVersion" => format_version = value,
                            b"target" => target = value,
                            _ => {}
                        }
                    }
                    root_tag = Some(name);
                } else if current.is_none() {
                    if name == "Ad" {
                        current = Some(EntryBuilder::default());
                    }
                } else if name == "Images" {
                    in_images = true;
                } else if !in_images {
                    leaf = Some(name);
                }
            }
            Event::Empty(elem) => {
                let name = element_name(&elem)?;
                if root_tag.is_none() {
                    for attr in elem.attributes() {
                        let attr = attr.map_err(parse_err)?;
                        let value = attr.unescape_value().map_err(parse_err)?.into_owned();
                        match attr.key.as_ref() {
                            b"formatVersion" => format_version = value,
                            b"target" => target = value,
                            _ => {}
                        }
                    }
                    root_tag = Some(name);
                } else if let Some(entry) = current.as_mut() {
                    if in_images && name == "Image" {
                        for attr in elem.attributes() {
                            let attr = attr.map_err(parse_err)?;
                            if attr.key.as_ref() == b"url" {
                                let url = attr.unescape_value().map_err(parse_err)?.into_owned();
                                entry.images.push(ImageRef::new(url));
                            }
                        }
                    } else if !in_images {
                        entry.set_field(&name, String::new());
                    }
                }
            }
            Event::Text(text) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), leaf.as_deref()) {
                    let value = text.unescape().map_err(parse_err)?.into_owned();
                    entry.set_field(field, value);
                }
            }
            Event::End(elem) => {
                let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
                if leaf.as_deref() == Some(name.as_str()) {
                    leaf = None;
                } else if name == "Images" {
                    in_images = false;
                } else if name == "Ad" {
                    if let Some(entry) = current.take() {
                        entries.push(entry.build());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root_tag =
        root_tag.ok_or_else(|| AdliftError::Document("feed has no root element".into()))?;
    Ok(FeedDocument::from_parts(
        root_tag,
        format_version,
        target,
        entries,
    ))
}

fn element_name(elem: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(elem.name().as_ref())
        .map(str::to_owned)
        .map_err(|e| AdliftError::Document(format!("element name is not UTF-8: {e}")))
}

fn parse_err(err: impl std::fmt::Display) -> AdliftError {
    AdliftError::Document(format!("feed parse failed: {err}"))
}

#[derive(Default)]
struct EntryBuilder {
    title: String,
    description: String,
    price: String,
    images: Vec<ImageRef>,
    extra_fields: Vec<(String, String)>,
}

impl EntryBuilder {
    fn set_field(&mut self, name: &str, value: String) {
        match name {
            "Title" => self.title = value,
            "Description" => self.description = value,
            "Price" => self.price = value,
            _ => self.extra_fields.push((name.to_string(), value)),
        }
    }

    fn build(self) -> AdEntry {
        AdEntry::from_parts(
            self.title,
            self.description,
            self.price,
            self.images,
            self.extra_fields,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use crate::writer::to_xml_string;

    fn sample_doc() -> FeedDocument {
        let mut doc = FeedDocument::new("Electronics");
        doc.add_entry(
            "Test iPhone",
            "Test Description",
            100000,
            vec!["https://x/1.jpg".into(), "https://x/2.jpg".into()],
            vec![
                ("Condition".into(), "New".into()),
                ("Brand".into(), "Apple".into()),
            ],
        )
        .unwrap();
        doc.add_entry("Second < item", "Desc & more", 2000, vec![], vec![])
            .unwrap();
        doc
    }

    #[test]
    fn round_trip_preserves_structure_and_field_text() {
        let doc = sample_doc();
        let parsed = parse_feed(&to_xml_string(&doc).unwrap()).unwrap();

        assert_eq!(parsed.root_tag(), doc.root_tag());
        assert_eq!(parsed.format_version(), doc.format_version());
        assert_eq!(parsed.target(), doc.target());
        assert_eq!(parsed.entries().len(), 2);

        let first = &parsed.entries()[0];
        assert_eq!(first.title(), "Test iPhone");
        assert_eq!(first.price(), "100000");
        assert_eq!(first.images().len(), 2);
        assert_eq!(first.images()[1].url(), "https://x/2.jpg");
        assert_eq!(
            first.extra_fields(),
            &[
                ("Condition".to_string(), "New".to_string()),
                ("Brand".to_string(), "Apple".to_string())
            ]
        );

        // Escaped markup comes back as the original text.
        assert_eq!(parsed.entries()[1].title(), "Second < item");
        assert_eq!(parsed.entries()[1].description(), "Desc & more");
    }

    #[test]
    fn freshly_written_feed_validates_clean() {
        let xml = to_xml_string(&sample_doc()).unwrap();
        let parsed = parse_feed(&xml).unwrap();
        assert!(validate(&parsed).is_empty());
    }

    #[test]
    fn foreign_root_tag_is_surfaced_to_the_validator() {
        let parsed = parse_feed(r#"<?xml version="1.0" encoding="utf-8"?><Junk/>"#).unwrap();
        let violations = validate(&parsed);
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].field, "root");
    }

    #[test]
    fn missing_root_is_a_parse_error() {
        assert!(parse_feed("").is_err());
    }
}
