//! cache::codec — text encoding of result arrays.
//!
//! An artifact is a single line of comma-separated decimal values in
//! sequence order. Values are written with Rust's shortest round-trip
//! formatting; non-finite values appear as `NaN`, `inf` and `-inf` and parse
//! back to the same class.
use std::path::Path;

use ndarray::Array1;

use crate::cache::errors::{CacheError, CacheResult};

/// Encode `values` as one comma-separated line (no trailing newline).
pub fn encode(values: &Array1<f64>) -> String {
    let mut out = String::with_capacity(values.len() * 20);
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out
}

/// Decode an artifact read from `path`.
///
/// Errors
/// ------
/// - `CacheError::Parse` if the content is empty or any token is not a
///   number. Surrounding whitespace (including a trailing newline) is
///   ignored.
pub fn decode(path: &Path, text: &str) -> CacheResult<Array1<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CacheError::Parse { path: path.to_path_buf(), token: String::new() });
    }
    text.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<f64>()
                .map_err(|_| CacheError::Parse { path: path.to_path_buf(), token: token.to_string() })
        })
        .collect::<CacheResult<Vec<f64>>>()
        .map(Array1::from)
}
