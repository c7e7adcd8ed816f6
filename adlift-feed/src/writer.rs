//! Serialization of a feed document to durable storage.
//!
//! Output is byte-stable for identical input: fixed attribute order, fixed
//! element order, no embedded timestamps. Only the filename varies, and it
//! carries a process-wide monotonic counter so two submissions landing in
//! the same second still get distinct files. Writes go through a temporary
//! path and an atomic rename, so a file is either complete or absent.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use adlift_common::{AdliftError, Result};
use chrono::Local;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::document::FeedDocument;

/// Disambiguates filenames across concurrent writes within one second.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Which API operation produced the feed; selects the filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Single,
    Bulk,
}

impl SubmissionKind {
    fn file_prefix(self) -> &'static str {
        match self {
            Self::Single => "avito_ad",
            Self::Bulk => "avito_bulk",
        }
    }
}

/// Writes validated feed documents into a single configurable directory.
#[derive(Debug, Clone)]
pub struct FeedWriter {
    output_dir: PathBuf,
}

impl FeedWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Serialize `doc` into a uniquely named file and return its path.
    ///
    /// The output directory is created if absent (`create_dir_all` tolerates
    /// the concurrent first-use race). On any failure the temporary file is
    /// removed; no partial final file is ever left behind.
    pub fn save(&self, doc: &FeedDocument, kind: SubmissionKind) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let filename = format!("{}_{stamp}_{seq:04}.xml", kind.file_prefix());
        let final_path = self.output_dir.join(&filename);
        let tmp_path = self.output_dir.join(format!("{filename}.tmp"));

        let xml = to_xml_string(doc)?;

        if let Err(err) = fs::write(&tmp_path, xml.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(AdliftError::Storage(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(AdliftError::Storage(err));
        }

        tracing::info!(path = %final_path.display(), ads = doc.entries().len(), "feed.saved");
        Ok(final_path)
    }
}

/// Render `doc` as the marketplace's XML bulk-feed syntax with an explicit
/// encoding declaration.
pub fn to_xml_string(doc: &FeedDocument) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new(doc.root_tag());
    root.push_attribute(("formatVersion", doc.format_version()));
    root.push_attribute(("target", doc.target()));
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    for entry in doc.entries() {
        writer
            .write_event(Event::Start(BytesStart::new("Ad")))
            .map_err(xml_err)?;

        write_text_element(&mut writer, "Title", entry.title())?;
        write_text_element(&mut writer, "Description", entry.description())?;
        write_text_element(&mut writer, "Price", entry.price())?;

        writer
            .write_event(Event::Start(BytesStart::new("Images")))
            .map_err(xml_err)?;
        for image in entry.images() {
            let mut elem = BytesStart::new("Image");
            elem.push_attribute(("url", image.url()));
            writer.write_event(Event::Empty(elem)).map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("Images")))
            .map_err(xml_err)?;

        for (key, value) in entry.extra_fields() {
            write_text_element(&mut writer, key, value)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("Ad")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(doc.root_tag())))
        .map_err(xml_err)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| AdliftError::Document(format!("serialized feed is not UTF-8: {e}")))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)?;
    Ok(())
}

fn xml_err(err: impl std::fmt::Display) -> AdliftError {
    AdliftError::Document(format!("xml serialization failed: {err}"))
}
