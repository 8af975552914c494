//! Fingerprint construction: typed pattern tokens, the builder that emits them
//! from a routine's opcodes, and routine size validation.

pub mod builder;
pub mod pattern;
pub mod size;

pub use builder::{FingerprintBuilder, DEFAULT_PATTERN_LIMIT};
pub use pattern::{Pattern, PatternToken, LABEL_ANCHOR_REGEX};
pub use size::Diagnostic;
