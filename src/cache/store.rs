//! cache::store — directory-backed, write-once result cache.
//!
//! Purpose
//! -------
//! Persist the pair of result arrays `(ab, aa)` of every
//! `(ParameterPoint, codename)` under a root directory, and let the sweep
//! skip work whose results are already on disk.
//!
//! Key behaviors
//! -------------
//! - [`ResultCache::exists`] reports an entry complete only when **both**
//!   `ab_data` and `aa_data` are present.
//! - [`ResultCache::compute_if_absent`] evaluates the AB then AA result only
//!   on a miss, and writes nothing unless both computations succeed.
//! - Each artifact is written to a temporary file in the entry directory and
//!   renamed into place; `ab_data` lands before `aa_data`. A crash between
//!   the two leaves an incomplete entry that the next run recomputes.
//! - Complete entries are never rewritten.
//!
//! Invariants & assumptions
//! ------------------------
//! - One writer per cache root. The check-then-write of
//!   `compute_if_absent` is not atomic across processes.
//! - Entry locations come exclusively from `cache::key`.
//!
//! Downstream usage
//! ----------------
//! - The sweep orchestrator drives every estimator configuration through
//!   `compute_if_absent`; analysis code uses [`ResultCache::read`] and
//!   [`ResultCache::summarize`].
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use ndarray::Array1;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    cache::{
        codec::{decode, encode},
        errors::{CacheError, CacheResult},
        key::entry_relative_path,
    },
    simulation::{Condition, ParameterPoint},
    summary::RejectionSummary,
};

/// File name of the real-experiment artifact.
pub const AB_ARTIFACT: &str = "ab_data";
/// File name of the null-control artifact.
pub const AA_ARTIFACT: &str = "aa_data";

/// CacheEntry — the persisted results of one `(point, codename)`.
///
/// Fields
/// ------
/// - `ab_result`: `Array1<f64>`
///   Per-repetition output on the A/B condition.
/// - `aa_result`: `Array1<f64>`
///   Per-repetition output on the A/A condition.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub ab_result: Array1<f64>,
    pub aa_result: Array1<f64>,
}

/// Whether a `compute_if_absent`/`write` call produced new artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Computed,
    Skipped,
}

/// ResultCache — parameter-keyed store rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCache {
    root: PathBuf,
}

impl ResultCache {
    /// Open a cache at `root`. Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> ResultCache {
        ResultCache { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute entry directory of `(point, codename)`.
    ///
    /// Errors
    /// ------
    /// - `CacheError::InvalidCodename` for codenames that are not a single
    ///   path segment.
    pub fn entry_dir(&self, point: &ParameterPoint, codename: &str) -> CacheResult<PathBuf> {
        Ok(self.root.join(entry_relative_path(point, codename)?))
    }

    /// `true` iff both artifacts of `(point, codename)` are stored.
    ///
    /// Invalid codenames can never be stored and report `false`.
    pub fn exists(&self, point: &ParameterPoint, codename: &str) -> bool {
        match self.entry_dir(point, codename) {
            Ok(dir) => is_complete(&dir),
            Err(_) => false,
        }
    }

    /// Compute and store `(point, codename)` unless it already exists.
    ///
    /// Parameters
    /// ----------
    /// - `point`: `&ParameterPoint`
    ///   Key prefix of the entry.
    /// - `codename`: `&str`
    ///   Estimator configuration name; final key segment.
    /// - `provider`: `FnMut(Condition) -> Result<Array1<f64>, E>`
    ///   Called with `Condition::AB`, then `Condition::AA`, only on a miss.
    ///
    /// Returns
    /// -------
    /// `Result<CacheOutcome, E>`
    ///   `Skipped` without calling `provider` when the entry exists,
    ///   `Computed` after both artifacts were written.
    ///
    /// Errors
    /// ------
    /// - Whatever `provider` returns; nothing is written in that case.
    /// - Any [`CacheError`] from key derivation or writing, converted with
    ///   `E::from`.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use rust_stattests::cache::{CacheError, CacheOutcome, ResultCache};
    /// # use rust_stattests::simulation::ParameterPoint;
    /// # let dir = tempfile::tempdir().unwrap();
    /// let cache = ResultCache::new(dir.path());
    /// let point = ParameterPoint::new(2, 5, 0.2, 0.02, 1000.0, 1.0);
    /// let outcome = cache
    ///     .compute_if_absent(&point, "delta", |_| Ok::<_, CacheError>(array![0.5, 0.25]))
    ///     .unwrap();
    /// assert_eq!(outcome, CacheOutcome::Computed);
    /// assert!(cache.exists(&point, "delta"));
    /// ```
    pub fn compute_if_absent<E, F>(
        &self, point: &ParameterPoint, codename: &str, mut provider: F,
    ) -> Result<CacheOutcome, E>
    where
        E: From<CacheError>,
        F: FnMut(Condition) -> Result<Array1<f64>, E>,
    {
        let dir = self.entry_dir(point, codename)?;
        if is_complete(&dir) {
            debug!(codename, "cache hit");
            return Ok(CacheOutcome::Skipped);
        }
        debug!(codename, "cache miss");
        let ab = provider(Condition::AB)?;
        let aa = provider(Condition::AA)?;
        write_entry(&dir, &ab, &aa)?;
        Ok(CacheOutcome::Computed)
    }

    /// Store precomputed results for `(point, codename)`.
    ///
    /// Returns `Skipped` and leaves the disk untouched when the entry is
    /// already complete.
    pub fn write(
        &self, point: &ParameterPoint, codename: &str, ab: &Array1<f64>, aa: &Array1<f64>,
    ) -> CacheResult<CacheOutcome> {
        let dir = self.entry_dir(point, codename)?;
        if is_complete(&dir) {
            return Ok(CacheOutcome::Skipped);
        }
        write_entry(&dir, ab, aa)?;
        Ok(CacheOutcome::Computed)
    }

    /// Load both artifacts of `(point, codename)`.
    ///
    /// Errors
    /// ------
    /// - `CacheError::NotFound` if the entry or either artifact is missing.
    /// - `CacheError::Parse` if an artifact is not a comma-separated list of
    ///   numbers.
    /// - `CacheError::Io` for other read failures.
    pub fn read(&self, point: &ParameterPoint, codename: &str) -> CacheResult<CacheEntry> {
        let dir = self.entry_dir(point, codename)?;
        let ab_result = read_artifact(&dir.join(AB_ARTIFACT))?;
        let aa_result = read_artifact(&dir.join(AA_ARTIFACT))?;
        Ok(CacheEntry { ab_result, aa_result })
    }

    /// Power and false-positive rate of a stored entry at level `alpha`.
    pub fn summarize(
        &self, point: &ParameterPoint, codename: &str, alpha: f64,
    ) -> CacheResult<RejectionSummary> {
        let entry = self.read(point, codename)?;
        Ok(RejectionSummary::from_p_values(&entry.ab_result, &entry.aa_result, alpha))
    }
}

//
// ---------- Private helpers (compact docs) ----------
//

fn is_complete(dir: &Path) -> bool {
    dir.join(AB_ARTIFACT).is_file() && dir.join(AA_ARTIFACT).is_file()
}

fn write_entry(dir: &Path, ab: &Array1<f64>, aa: &Array1<f64>) -> CacheResult<()> {
    fs::create_dir_all(dir).map_err(|e| CacheError::from_io(dir, e))?;
    write_atomic(&dir.join(AB_ARTIFACT), &encode(ab))?;
    write_atomic(&dir.join(AA_ARTIFACT), &encode(aa))?;
    debug!(entry = %dir.display(), "cache entry written");
    Ok(())
}

/// Write `contents` to a temp sibling of `target`, sync, then rename.
fn write_atomic(target: &Path, contents: &str) -> CacheResult<()> {
    let dir = target.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CacheError::from_io(dir, e))?;
    tmp.write_all(contents.as_bytes()).map_err(|e| CacheError::from_io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| CacheError::from_io(tmp.path(), e))?;
    tmp.persist(target).map_err(|e| CacheError::from_io(target, e.error))?;
    Ok(())
}

fn read_artifact(path: &Path) -> CacheResult<Array1<f64>> {
    let text = fs::read_to_string(path).map_err(|e| CacheError::from_io(path, e))?;
    decode(path, &text)
}
