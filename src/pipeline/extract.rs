//! Text extraction: PDF via pdfium, DOCX via its WordprocessingML part.
//!
//! Both extractors are blocking (pdfium is not async-safe and the zip
//! reader does synchronous I/O), so [`extract_text`] runs them inside
//! `spawn_blocking`. The returned text is normalised by
//! [`super::normalise::clean_text`]; deciding whether it is long enough to
//! be worth a chain run is [`ensure_sufficient_text`]'s job.

use super::input::{DocumentFormat, ResolvedInput};
use super::normalise::clean_text;
use crate::error::FlashcardError;
use crate::output::ExtractedDocument;
use pdfium_render::prelude::*;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extract and normalise the text of a resolved document.
pub async fn extract_text(
    input: &ResolvedInput,
    password: Option<&str>,
) -> Result<ExtractedDocument, FlashcardError> {
    let path = input.path().to_path_buf();
    let format = input.format();
    let pwd = password.map(|s| s.to_string());

    let mut doc = tokio::task::spawn_blocking(move || match format {
        DocumentFormat::Pdf => extract_pdf_blocking(&path, pwd.as_deref()),
        DocumentFormat::Docx => extract_docx_blocking(&path),
    })
    .await
    .map_err(|e| FlashcardError::Internal(format!("Extraction task panicked: {}", e)))??;

    doc.text = clean_text(&doc.text);
    info!(
        "Extracted {} chars from {} ({})",
        doc.char_count(),
        input.path().display(),
        format
    );
    Ok(doc)
}

/// Refuse text too short to generate flashcards from.
///
/// Length is counted in characters after trimming, so 50 multi-byte
/// characters pass a threshold of 50.
pub fn ensure_sufficient_text(text: &str, min_chars: usize) -> Result<(), FlashcardError> {
    let chars = text.trim().chars().count();
    if chars < min_chars {
        return Err(FlashcardError::InsufficientText {
            chars,
            min: min_chars,
        });
    }
    Ok(())
}

// ── PDF ──────────────────────────────────────────────────────────────────

/// Bind pdfium from `PDFIUM_LIB_PATH` when set, else the system library.
fn bind_pdfium() -> Result<Pdfium, FlashcardError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(lib) if !lib.is_empty() => Pdfium::bind_to_library(Path::new(&lib)),
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| FlashcardError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

fn extract_pdf_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<ExtractedDocument, FlashcardError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                FlashcardError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                FlashcardError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            FlashcardError::CorruptDocument {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let title = document
        .metadata()
        .get(PdfDocumentMetadataTagType::Title)
        .map(|t| t.value().trim().to_string())
        .filter(|t| !t.is_empty());

    let pages = document.pages();
    let page_count = pages.len() as usize;
    let mut texts = Vec::with_capacity(page_count);

    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| FlashcardError::CorruptDocument {
            path: pdf_path.to_path_buf(),
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        let all = text.all();
        debug!("Page {}: {} chars", idx + 1, all.len());
        texts.push(all);
    }

    Ok(ExtractedDocument {
        format: DocumentFormat::Pdf,
        text: texts.join("\n"),
        page_count: Some(page_count),
        title,
    })
}

// ── DOCX ─────────────────────────────────────────────────────────────────

const DOCUMENT_PART: &str = "word/document.xml";

fn extract_docx_blocking(path: &Path) -> Result<ExtractedDocument, FlashcardError> {
    let corrupt = |detail: String| FlashcardError::CorruptDocument {
        path: PathBuf::from(path),
        detail,
    };

    let file = std::fs::File::open(path).map_err(|e| corrupt(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| corrupt(e.to_string()))?;

    let mut xml = String::new();
    {
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| corrupt(format!("{DOCUMENT_PART}: {e}")))?;
        part.read_to_string(&mut xml)
            .map_err(|e| corrupt(format!("{DOCUMENT_PART}: {e}")))?;
    }

    let text = document_xml_to_text(&xml).map_err(corrupt)?;

    Ok(ExtractedDocument {
        format: DocumentFormat::Docx,
        text,
        page_count: None,
        title: None,
    })
}

/// Flatten WordprocessingML body XML to plain text.
///
/// Only `w:t` runs carry text. Paragraph ends become newlines, `w:tab`
/// a tab, and `w:br` / `w:cr` a newline.
pub(crate) fn document_xml_to_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::with_capacity(xml.len() / 4);
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("bad text at byte {}: {e}", reader.buffer_position()))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Photosynthesis</w:t></w:r></w:p>
    <w:p>
      <w:r><w:t xml:space="preserve">Plants use light </w:t></w:r>
      <w:r><w:t>&amp; water.</w:t></w:r>
    </w:p>
    <w:p><w:r><w:t>Stage</w:t><w:tab/><w:t>Output</w:t><w:br/><w:t>Light</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn document_xml_paragraphs_and_runs() {
        let text = document_xml_to_text(BODY).unwrap();
        assert_eq!(
            text,
            "Photosynthesis\nPlants use light & water.\nStage\tOutput\nLight\n"
        );
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(document_xml_to_text("<w:p><w:t>oops</w:p>").is_err());
    }

    #[test]
    fn docx_container_is_read() {
        let tmp = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        {
            let mut zip = zip::ZipWriter::new(tmp.as_file().try_clone().unwrap());
            zip.start_file(DOCUMENT_PART, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(BODY.as_bytes()).unwrap();
            zip.finish().unwrap();
        }

        let doc = extract_docx_blocking(tmp.path()).unwrap();
        assert_eq!(doc.format, DocumentFormat::Docx);
        assert!(doc.text.starts_with("Photosynthesis\n"));
        assert_eq!(doc.page_count, None);
    }

    #[test]
    fn zip_without_document_part_is_corrupt() {
        let tmp = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        {
            let mut zip = zip::ZipWriter::new(tmp.as_file().try_clone().unwrap());
            zip.start_file("readme.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"not a word document").unwrap();
            zip.finish().unwrap();
        }

        let err = extract_docx_blocking(tmp.path()).unwrap_err();
        assert!(matches!(err, FlashcardError::CorruptDocument { .. }));
    }

    #[test]
    fn sufficient_text_boundary() {
        let short = "a".repeat(49);
        let exact = "a".repeat(50);
        assert!(matches!(
            ensure_sufficient_text(&short, 50),
            Err(FlashcardError::InsufficientText { chars: 49, min: 50 })
        ));
        assert!(ensure_sufficient_text(&exact, 50).is_ok());
    }

    #[test]
    fn sufficient_text_ignores_surrounding_whitespace() {
        let padded = format!("   {}   \n\n", "a".repeat(49));
        assert!(ensure_sufficient_text(&padded, 50).is_err());
    }

    #[test]
    fn sufficient_text_counts_chars_not_bytes() {
        let greek = "λ".repeat(50);
        assert!(ensure_sufficient_text(&greek, 50).is_ok());
        assert!(ensure_sufficient_text(&"λ".repeat(30), 50).is_err());
    }
}
