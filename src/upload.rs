//! Document selection: turn a local path into an upload-ready [`FileUpload`].
//!
//! Only PDF, DOC and DOCX are accepted, decided by extension. The first
//! bytes are checked against the extension before anything is sent so a
//! renamed image fails here with a clear message instead of as an opaque
//! service error after the upload.

use crate::error::WorkflowError;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    /// Match a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    /// Content type declared on the multipart part.
    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Doc => "application/msword",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Leading bytes every file of this kind starts with.
    ///
    /// DOCX is a zip container; DOC is an OLE compound document.
    pub fn magic(self) -> &'static [u8] {
        match self {
            DocumentKind::Pdf => b"%PDF",
            DocumentKind::Doc => &[0xD0, 0xCF, 0x11, 0xE0],
            DocumentKind::Docx => b"PK\x03\x04",
        }
    }

    fn name(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Doc => "DOC",
            DocumentKind::Docx => "DOCX",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A document ready to be sent to the save endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub kind: DocumentKind,
    pub content: Vec<u8>,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("kind", &self.kind)
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .finish()
    }
}

impl FileUpload {
    /// Read and validate a document from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let path = path.as_ref();
        let kind = kind_for(path)?;

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| read_error(path, e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("document.{}", kind.name().to_lowercase()));

        check_magic(path, kind, &content)?;
        debug!("Loaded {} ({} bytes, {})", path.display(), content.len(), kind);

        Ok(Self {
            file_name,
            kind,
            content,
        })
    }

    /// Wrap bytes that are already in memory. The name's extension decides
    /// the document kind.
    pub fn from_bytes(
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Result<Self, WorkflowError> {
        let file_name = file_name.into();
        let content = content.into();
        let path = PathBuf::from(&file_name);
        let kind = kind_for(&path)?;
        check_magic(&path, kind, &content)?;
        Ok(Self {
            file_name,
            kind,
            content,
        })
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}

fn kind_for(path: &Path) -> Result<DocumentKind, WorkflowError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    DocumentKind::from_extension(&ext).ok_or_else(|| WorkflowError::UnsupportedFileType {
        path: path.to_path_buf(),
        extension: ext,
    })
}

/// Files shorter than the signature are left to the service to judge.
fn check_magic(path: &Path, kind: DocumentKind, content: &[u8]) -> Result<(), WorkflowError> {
    let magic = kind.magic();
    if content.len() >= magic.len() && !content.starts_with(magic) {
        return Err(WorkflowError::ContentMismatch {
            path: path.to_path_buf(),
            expected: kind.name(),
            magic: content[..magic.len()].to_vec(),
        });
    }
    Ok(())
}

fn read_error(path: &Path, e: std::io::Error) -> WorkflowError {
    match e.kind() {
        std::io::ErrorKind::NotFound => WorkflowError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => WorkflowError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => WorkflowError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    }
}
