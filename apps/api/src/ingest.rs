//! Document ingestion: plain text out of uploaded PDF, DOCX and TXT files.
//!
//! Everything is read from memory; nothing touches the filesystem.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

const DOCX_BODY: &str = "word/document.xml";

static XML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static XML_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:(tab|br|cr)\s*/>").expect("valid break regex"));

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: {0}. Allowed: pdf, docx, txt")]
    UnsupportedFormat(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("Text file is not valid UTF-8")]
    Encoding,

    #[error("No text could be extracted from the document")]
    Empty,
}

/// Lower-cased extension of `file_name` if it is one we can read.
pub fn supported_extension(file_name: &str) -> Result<String, IngestError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(IngestError::UnsupportedFormat(if ext.is_empty() {
            file_name.to_string()
        } else {
            ext
        }))
    }
}

pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, IngestError> {
    let ext = supported_extension(file_name)?;

    let text = match ext.as_str() {
        "pdf" => extract_pdf(bytes)?,
        "docx" => extract_docx(bytes)?,
        _ => String::from_utf8(bytes.to_vec()).map_err(|_| IngestError::Encoding)?,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(IngestError::Empty);
    }

    debug!(file = file_name, chars = text.len(), "Extracted document text");
    Ok(text)
}

/// pdf-extract panics on some malformed files; those count as unreadable.
fn extract_pdf(bytes: &[u8]) -> Result<String, IngestError> {
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| IngestError::Pdf("malformed document".to_string()))?
        .map_err(|e| IngestError::Pdf(e.to_string()))
}

/// Paragraph texts of the main document part, joined by single spaces.
fn extract_docx(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| IngestError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| IngestError::Docx(format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = xml
        .split("</w:p>")
        .map(|para| {
            let para = XML_BREAK_RE.replace_all(para, " ");
            decode_entities(&XML_TAG_RE.replace_all(&para, ""))
                .trim()
                .to_string()
        })
        .filter(|para| !para.is_empty())
        .collect();

    Ok(paragraphs.join(" "))
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_with(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCX_BODY, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        assert_eq!(supported_extension("CV.PDF").unwrap(), "pdf");
        assert_eq!(supported_extension("resume.final.Docx").unwrap(), "docx");
        assert!(matches!(
            supported_extension("resume.odt"),
            Err(IngestError::UnsupportedFormat(ext)) if ext == "odt"
        ));
        assert!(matches!(
            supported_extension("resume"),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_plain_text() {
        let text = extract_text("resume.txt", b"  Rust developer\n").unwrap();
        assert_eq!(text, "Rust developer");
    }

    #[test]
    fn test_invalid_utf8_text() {
        assert!(matches!(
            extract_text("resume.txt", &[0xff, 0xfe, 0x00]),
            Err(IngestError::Encoding)
        ));
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert!(matches!(
            extract_text("resume.txt", b" \n\t "),
            Err(IngestError::Empty)
        ));
    }

    #[test]
    fn test_docx_paragraphs_joined() {
        let xml = r#"<?xml version="1.0"?><w:document><w:body>
            <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
            <w:p><w:r><w:t>Skills:</w:t></w:r><w:r><w:tab/><w:t>Rust &amp; Go</w:t></w:r></w:p>
            <w:p></w:p>
            </w:body></w:document>"#;
        let text = extract_text("cv.docx", &docx_with(xml)).unwrap();
        assert_eq!(text, "Jane Doe Skills: Rust & Go");
    }

    #[test]
    fn test_docx_without_body_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            extract_text("cv.docx", &bytes),
            Err(IngestError::Docx(_))
        ));
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        assert!(extract_text("cv.pdf", b"not a pdf").is_err());
    }
}
