//! cache — parameter-keyed, write-once storage of estimator results.
//!
//! Purpose
//! -------
//! Map `(ParameterPoint, codename)` to a directory holding the A/B and A/A
//! result arrays of one estimator configuration, so interrupted or repeated
//! sweeps only compute what is missing.
//!
//! Key behaviors
//! -------------
//! - [`key`] derives every location; [`codec`] encodes arrays as single-line
//!   comma-separated text; [`store`] implements [`ResultCache`].
//! - Completeness is the presence of both artifacts; each artifact is
//!   published by an atomic rename.
//!
//! Invariants & assumptions
//! ------------------------
//! - Entries are immutable once complete; stale results after a change to an
//!   estimator must be removed by hand.
//! - One writer per cache root.

pub mod codec;
pub mod errors;
pub mod key;
pub mod store;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{CacheError, CacheResult};
pub use self::key::{ENTRY_FIELDS, entry_relative_path, key_segments};
pub use self::store::{AA_ARTIFACT, AB_ARTIFACT, CacheEntry, CacheOutcome, ResultCache};
