//! Attachment text extraction
//!
//! The relay turns attached CSV and PDF files into plain text and appends
//! it to the user prompt. Other kinds (images) are accepted but ignored.
//! A file that fails to decode is skipped with a warning; it never fails
//! the request.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use railchat_core::wire::FileData;

/// Separator placed between the user prompt and the extracted text
pub const EXTRACTED_HEADER: &str = "\n\n--- EXTRACTED FILE CONTENT ---\n";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),
}

/// File kinds the relay knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Pdf,
    Other,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            FileKind::Csv
        } else if lower.ends_with(".pdf") {
            FileKind::Pdf
        } else {
            FileKind::Other
        }
    }
}

/// Text content of one attachment, `None` when the kind is not readable or nothing was found
pub fn extract_file_text(file: &FileData) -> Result<Option<String>, ExtractError> {
    let kind = FileKind::from_filename(&file.filename);
    if kind == FileKind::Other {
        return Ok(None);
    }

    let bytes = STANDARD.decode(file.content.trim())?;

    let text = match kind {
        FileKind::Csv => csv_text(bytes)?,
        FileKind::Pdf => pdf_text(&bytes)?,
        FileKind::Other => return Ok(None),
    };

    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}

/// Rows re-joined with commas, one per line
fn csv_text(bytes: Vec<u8>) -> Result<String, ExtractError> {
    let text = String::from_utf8(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().collect::<Vec<_>>().join(","));
    }

    Ok(rows.join("\n"))
}

fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed documents.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("document could not be parsed".to_string())),
    }
}

/// Concatenated `--- Content from {name} ---` blocks for every readable file
pub fn extract_files(files: &[FileData]) -> String {
    let mut extracted = String::new();

    for file in files {
        match extract_file_text(file) {
            Ok(Some(text)) => {
                tracing::debug!(filename = %file.filename, chars = text.len(), "Extracted file content");
                extracted.push_str(&format!("\n--- Content from {} ---\n", file.filename));
                extracted.push_str(&text);
            }
            Ok(None) => {
                tracing::debug!(filename = %file.filename, "No text extracted from file");
            }
            Err(e) => {
                tracing::warn!(filename = %file.filename, error = %e, "Skipping attachment");
            }
        }
    }

    extracted
}

/// User prompt with the extracted file text appended, if any
pub fn compose_user_prompt(prompt: &str, files: Option<&[FileData]>) -> String {
    let extracted = files.map(extract_files).unwrap_or_default();
    if extracted.is_empty() {
        prompt.to_string()
    } else {
        format!("{}{}{}", prompt, EXTRACTED_HEADER, extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, bytes: &[u8]) -> FileData {
        FileData {
            filename: name.to_string(),
            content: STANDARD.encode(bytes),
        }
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::from_filename("Data.CSV"), FileKind::Csv);
        assert_eq!(FileKind::from_filename("paper.pdf"), FileKind::Pdf);
        assert_eq!(FileKind::from_filename("photo.png"), FileKind::Other);
        assert_eq!(FileKind::from_filename("csv"), FileKind::Other);
    }

    #[test]
    fn test_csv_rows_rejoined() {
        let text = extract_file_text(&file("t.csv", b"name,age\n\"Doe, J\",42\n"))
            .unwrap()
            .unwrap();
        assert_eq!(text, "name,age\nDoe, J,42");
    }

    #[test]
    fn test_images_ignored() {
        assert!(extract_file_text(&file("a.png", &[0x89, 0x50]))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_bad_payloads_are_errors() {
        let bad_base64 = FileData {
            filename: "a.csv".into(),
            content: "***".into(),
        };
        assert!(matches!(
            extract_file_text(&bad_base64),
            Err(ExtractError::Base64(_))
        ));

        assert!(matches!(
            extract_file_text(&file("a.csv", &[0xff, 0xfe, 0x00])),
            Err(ExtractError::Utf8(_))
        ));

        assert!(matches!(
            extract_file_text(&file("a.pdf", b"not a pdf")),
            Err(ExtractError::Pdf(_))
        ));
    }

    #[test]
    fn test_compose_user_prompt() {
        assert_eq!(compose_user_prompt("hi", None), "hi");

        let files = vec![
            file("a.csv", b"x,y\n1,2"),
            file("b.png", &[1, 2, 3]),
            FileData {
                filename: "broken.csv".into(),
                content: "%%%".into(),
            },
        ];
        assert_eq!(
            compose_user_prompt("summarize", Some(files.as_slice())),
            "summarize\n\n--- EXTRACTED FILE CONTENT ---\n\n--- Content from a.csv ---\nx,y\n1,2"
        );

        let unreadable = vec![file("b.png", &[1])];
        assert_eq!(compose_user_prompt("hi", Some(unreadable.as_slice())), "hi");
    }
}
