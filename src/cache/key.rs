//! cache::key — the single place where cache locations are derived.
//!
//! An entry lives at
//! `NN=<NN>/N=<N>/uplift=<uplift>/success_rate=<success_rate>/beta=<beta>/skew=<skew>/<codename>`
//! relative to the cache root. Values use the default `Display` formatting of
//! their Rust type, so `1000.0` renders as `1000` and `0.2` as `0.2`; two
//! points whose fields format identically share an entry.
//!
//! Python's `str(float)` keeps the trailing `.0` (`beta=1000.0`, `skew=1.0`),
//! so cache roots keyed by Python float formatting are not shared with this
//! crate: every integral float field lands in a different directory.
use std::path::PathBuf;

use crate::{
    cache::errors::{CacheError, CacheResult},
    simulation::ParameterPoint,
};

/// Key field names in path order.
pub const ENTRY_FIELDS: [&str; 6] = ["NN", "N", "uplift", "success_rate", "beta", "skew"];

/// The six `name=value` segments of `point`, in path order.
pub fn key_segments(point: &ParameterPoint) -> [String; 6] {
    let values = [
        point.nn.to_string(),
        point.n.to_string(),
        point.uplift.to_string(),
        point.success_rate.to_string(),
        point.beta.to_string(),
        point.skew.to_string(),
    ];
    let mut segments: [String; 6] = Default::default();
    for (slot, (name, value)) in segments.iter_mut().zip(ENTRY_FIELDS.iter().zip(values)) {
        *slot = format!("{name}={value}");
    }
    segments
}

/// Entry directory of `(point, codename)` relative to the cache root.
///
/// Errors
/// ------
/// - `CacheError::InvalidCodename` if `codename` is empty, `.`/`..`, or
///   contains a path separator.
pub fn entry_relative_path(point: &ParameterPoint, codename: &str) -> CacheResult<PathBuf> {
    validate_codename(codename)?;
    let mut path: PathBuf = key_segments(point).iter().collect();
    path.push(codename);
    Ok(path)
}

/// Require a codename usable as exactly one path segment.
pub fn validate_codename(codename: &str) -> CacheResult<()> {
    let reason = if codename.is_empty() {
        Some("must not be empty")
    } else if codename == "." || codename == ".." {
        Some("must not be a relative directory marker")
    } else if codename.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(CacheError::InvalidCodename { codename: codename.to_string(), reason }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    // Purpose
    // -------
    // Pin the on-disk layout, including float formatting.
    //
    // Given
    // -----
    // - NN=10, N=5, uplift=0.2, success_rate=0.02, beta=1000.0, skew=1.0.
    //
    // Expect
    // ------
    // - `NN=10/N=5/uplift=0.2/success_rate=0.02/beta=1000/skew=1/delta`.
    fn entry_path_uses_display_formatting() {
        // Arrange
        let point = ParameterPoint::new(10, 5, 0.2, 0.02, 1000.0, 1.0);

        // Act
        let path = entry_relative_path(&point, "delta").unwrap();

        // Assert
        assert_eq!(
            path,
            Path::new("NN=10/N=5/uplift=0.2/success_rate=0.02/beta=1000/skew=1/delta")
        );
    }

    #[test]
    fn integral_floats_have_no_trailing_zero() {
        let point = ParameterPoint::new(10, 5, 0.2, 0.02, 1000.0, 1.0);
        let segments = key_segments(&point);
        assert_eq!(segments[4], "beta=1000");
        assert_eq!(segments[5], "skew=1");
        assert_ne!(
            entry_relative_path(&point, "delta").unwrap(),
            Path::new("NN=10/N=5/uplift=0.2/success_rate=0.02/beta=1000.0/skew=1.0/delta")
        );
    }

    #[test]
    // Purpose
    // -------
    // Keys depend on field values only, not on how the point was built.
    //
    // Given
    // -----
    // - One point from `new`, one from a struct literal in a different
    //   field order, one derived through `null_control` + uplift override.
    //
    // Expect
    // ------
    // - Identical segments.
    fn key_segments_are_deterministic() {
        // Arrange
        let a = ParameterPoint::new(100, 50, 0.1, 0.05, 20.0, 0.5);
        let b = ParameterPoint { skew: 0.5, beta: 20.0, n: 50, nn: 100, success_rate: 0.05, uplift: 0.1 };
        let c = ParameterPoint { uplift: 0.1, ..a.null_control() };

        // Act / Assert
        assert_eq!(key_segments(&a), key_segments(&b));
        assert_eq!(key_segments(&a), key_segments(&c));
        assert_eq!(key_segments(&a)[2], "uplift=0.1");
    }

    #[test]
    fn invalid_codenames_are_rejected() {
        let point = ParameterPoint::new(1, 2, 0.0, 0.5, 1.0, 1.0);
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            assert!(
                matches!(entry_relative_path(&point, bad), Err(CacheError::InvalidCodename { .. })),
                "accepted {bad:?}"
            );
        }
    }
}
