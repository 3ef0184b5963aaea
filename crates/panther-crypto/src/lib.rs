//! Canonical encoding and hash composition for Panther proofs.
//!
//! Provides the two primitives every proof is built from:
//! - [`CanonicalEncoder`] turns a JSON value into one exact byte sequence
//!   (sorted keys, no whitespace, ASCII-only strings).
//! - [`HashEngine`] digests bytes with SHA3-512 and composes two digests by
//!   hashing the concatenation of their hex renderings.
//!
//! Both are pure functions and safe to call from any thread.

pub mod canonical;
pub mod error;
pub mod hasher;

pub use canonical::{CanonicalEncoder, MAX_DEPTH};
pub use error::EncodingError;
pub use hasher::HashEngine;
