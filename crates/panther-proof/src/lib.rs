//! Proof computation and verification.
//!
//! [`ProofBuilder`] turns a validation session (prompt, providers, guideline
//! set, optional salt, and the results obtained from the providers) into a
//! [`Proof`](panther_types::Proof). [`Verifier`] recomputes that proof from
//! raw inputs and compares it with a claim, without trusting whoever issued
//! it.
//!
//! Guideline sets that are not supplied by the caller come from a
//! [`GuidelineLoader`]; what happens when the loader fails is decided by
//! [`GuidelineFallback`].

pub mod builder;
pub mod error;
pub mod guidelines;
pub mod verifier;

pub use builder::{parse_guidelines_text, ProofBuilder, SessionInput, SDK_VERSION};
pub use error::{ProofBuildError, ProofBuildResult};
pub use guidelines::{
    FileGuidelineLoader, GuidelineFallback, GuidelineLoader, GuidelineUnavailable,
    NoDefaultGuidelines, StaticGuidelineLoader,
};
pub use verifier::{Verification, Verifier};
