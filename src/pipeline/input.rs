//! Input resolution: normalise a user-supplied path or URL to a local
//! document file and decide which extractor reads it.
//!
//! Both extractors need a file-system path (pdfium opens files, the zip
//! reader wants a seekable file), so URLs are downloaded into a `TempDir`
//! that lives exactly as long as the returned [`ResolvedInput`].

use crate::error::FlashcardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// A document format we can extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Format implied by the file extension, case-insensitively.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    /// Format implied by the first four bytes of the file.
    pub fn sniff(magic: &[u8; 4]) -> Option<Self> {
        if magic == PDF_MAGIC {
            Some(DocumentFormat::Pdf)
        } else if magic == ZIP_MAGIC {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
        }
    }

    fn magic(&self) -> &'static [u8; 4] {
        match self {
            DocumentFormat::Pdf => PDF_MAGIC,
            DocumentFormat::Docx => ZIP_MAGIC,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved input: either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local { path: PathBuf, format: DocumentFormat },
    /// Input was a URL; the document was downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until extraction completes.
    Downloaded {
        path: PathBuf,
        format: DocumentFormat,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    /// Path to the document regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } => path,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn format(&self) -> DocumentFormat {
        match self {
            ResolvedInput::Local { format, .. } => *format,
            ResolvedInput::Downloaded { format, .. } => *format,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local document and its format.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, FlashcardError> {
    if input.trim().is_empty() {
        return Err(FlashcardError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Decide the format of `path` given its leading bytes.
///
/// A recognised extension decides the format and the magic bytes must agree
/// with it. A path without an extension is sniffed. Any other extension is
/// unsupported.
pub fn detect_format(path: &Path, magic: Option<[u8; 4]>) -> Result<DocumentFormat, FlashcardError> {
    let format = match DocumentFormat::from_extension(path) {
        Some(format) => format,
        None if path.extension().is_none() => magic
            .as_ref()
            .and_then(DocumentFormat::sniff)
            .ok_or_else(|| FlashcardError::UnsupportedFormat {
                path: path.to_path_buf(),
            })?,
        None => {
            return Err(FlashcardError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    if let Some(magic) = magic {
        if &magic != format.magic() {
            return Err(FlashcardError::FormatMismatch {
                path: path.to_path_buf(),
                expected: format.as_str(),
                magic,
            });
        }
    }

    Ok(format)
}

/// Resolve a local file path, validating existence, permissions and format.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, FlashcardError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(FlashcardError::FileNotFound { path });
    }

    let magic = match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            f.read_exact(&mut magic).ok().map(|_| magic)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FlashcardError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(FlashcardError::FileNotFound { path });
        }
    };

    let format = detect_format(&path, magic)?;
    debug!("Resolved local {}: {}", format, path.display());
    Ok(ResolvedInput::Local { path, format })
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, FlashcardError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FlashcardError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FlashcardError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            FlashcardError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(FlashcardError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FlashcardError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let temp_dir = TempDir::new().map_err(|e| FlashcardError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let magic = (bytes.len() >= 4).then(|| [bytes[0], bytes[1], bytes[2], bytes[3]]);
    let format = detect_format(&file_path, magic)?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| FlashcardError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} to: {}", format, file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        format,
        _temp_dir: temp_dir,
    })
}

/// Last path segment of the URL when it looks like a file name, else a
/// neutral name with no extension so the format is sniffed.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded".to_string()
}
