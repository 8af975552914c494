//! Listing text handling: line classification, the segment/routine parser,
//! known-bad fragment fixups, and ISO-8859-1 text IO.

pub mod classify;
pub mod fixups;
pub mod parser;
pub mod text;

use thiserror::Error;

pub use classify::{OpcodeClassifier, DEFAULT_LOCAL_LABEL_MARKER};
pub use fixups::{apply_fixups, builtin_fixups, ListingFixup};
pub use parser::{step, Effect, ListingParser, ParseState, ParsedListing, DEFAULT_CODE_SEGMENT_CLASS};

/// Structural problems that make a whole listing unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("Listing has no `Module:` header")]
    MissingModuleHeader,

    /// Some `Segment:` lines do not follow the five-token header grammar.
    #[error("Unexpected number of segment headers: {markers} marker lines, {headers} well-formed")]
    SegmentCount { markers: usize, headers: usize },
}
