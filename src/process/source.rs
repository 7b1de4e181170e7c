use crate::error::LoadError;
use sha2::{Digest, Sha256};
use std::{
    borrow::Cow,
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

/// Where a title table comes from.
#[derive(Clone, Debug)]
pub enum Source {
    /// A CSV file on disk, e.g. the bundled default dataset.
    Path(PathBuf),
    /// Bytes handed over by the user.
    Upload { name: String, bytes: Arc<[u8]> },
}

/// Identity of a source for caching.
///
/// Uploads are identified by content, files by location plus a size/mtime
/// fingerprint so that an edited file is never confused with its old self.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Content { sha256: String },
    File {
        path: PathBuf,
        len: u64,
        modified: Option<SystemTime>,
    },
}

impl SourceKey {
    /// The canonical path, for file keys.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceKey::File { path, .. } => Some(path),
            SourceKey::Content { .. } => None,
        }
    }
}

pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

impl Source {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    pub fn from_upload(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Source::Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn key(&self) -> Result<SourceKey, LoadError> {
        match self {
            Source::Upload { bytes, .. } => Ok(SourceKey::Content {
                sha256: content_digest(bytes),
            }),
            Source::Path(path) => {
                let canonical = fs::canonicalize(path).map_err(|e| LoadError::io(path, e))?;
                let meta = fs::metadata(&canonical).map_err(|e| LoadError::io(path, e))?;
                Ok(SourceKey::File {
                    path: canonical,
                    len: meta.len(),
                    modified: meta.modified().ok(),
                })
            }
        }
    }

    /// Raw bytes of the source.
    pub fn read(&self) -> Result<Cow<'_, [u8]>, LoadError> {
        match self {
            Source::Upload { bytes, .. } => Ok(Cow::Borrowed(&bytes[..])),
            Source::Path(path) => fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| LoadError::io(path, e)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Upload { name, bytes } => write!(f, "upload:{} ({} bytes)", name, bytes.len()),
        }
    }
}
