//! cache::errors — failures of the parameter-keyed result store.
//!
//! Purpose
//! -------
//! Report missing, malformed and unwritable cache artifacts with the path
//! that caused them, so a failed sweep points directly at the offending
//! entry.
//!
//! Invariants & assumptions
//! ------------------------
//! - `std::io::Error` is neither `Clone` nor `PartialEq`; it is captured as
//!   `(io::ErrorKind, message)` to keep [`CacheError`] cloneable like the
//!   other error enums of the crate.
//! - A missing artifact is always `NotFound`, never `Io`.
use std::{io, path::Path, path::PathBuf};

#[cfg(feature = "python-bindings")]
use pyo3::{
    PyErr,
    exceptions::{PyFileNotFoundError, PyOSError, PyValueError},
};

pub type CacheResult<T> = Result<T, CacheError>;

/// CacheError — errors raised by `ResultCache`.
///
/// Variants
/// --------
/// - `NotFound { path }`
///   The entry directory or one of its two artifacts does not exist.
/// - `Parse { path, token }`
///   An artifact is empty or contains a token that is not a number.
/// - `Io { path, kind, message }`
///   Any other filesystem failure while reading, creating or renaming.
/// - `InvalidCodename { codename, reason }`
///   The codename cannot be used as a single path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheError {
    NotFound { path: PathBuf },
    Parse { path: PathBuf, token: String },
    Io { path: PathBuf, kind: io::ErrorKind, message: String },
    InvalidCodename { codename: String, reason: &'static str },
}

impl CacheError {
    /// Wrap an `io::Error`, mapping `ErrorKind::NotFound` to `NotFound`.
    pub(crate) fn from_io(path: &Path, err: io::Error) -> CacheError {
        if err.kind() == io::ErrorKind::NotFound {
            CacheError::NotFound { path: path.to_path_buf() }
        } else {
            CacheError::Io { path: path.to_path_buf(), kind: err.kind(), message: err.to_string() }
        }
    }
}

impl std::error::Error for CacheError {}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::NotFound { path } => {
                write!(f, "Cache artifact not found: {}.", path.display())
            }
            CacheError::Parse { path, token } => {
                write!(f, "Malformed cache artifact {}: cannot parse {token:?} as a number.", path.display())
            }
            CacheError::Io { path, kind, message } => {
                write!(f, "I/O failure ({kind:?}) on {}: {message}", path.display())
            }
            CacheError::InvalidCodename { codename, reason } => {
                write!(f, "Invalid estimator codename {codename:?}: {reason}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<CacheError> for PyErr {
    fn from(err: CacheError) -> PyErr {
        match err {
            CacheError::NotFound { .. } => PyFileNotFoundError::new_err(err.to_string()),
            CacheError::Io { .. } => PyOSError::new_err(err.to_string()),
            CacheError::Parse { .. } | CacheError::InvalidCodename { .. } => {
                PyValueError::new_err(format!("CacheError: {err}"))
            }
        }
    }
}
