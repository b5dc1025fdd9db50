//! Crate-wide error type.
//!
//! The three query entry points (`prefix_topk`, `conjunctive_topk`, `topk`)
//! never return `Result`; an unknown term or an empty lexicographic range
//! is a normal mid-typing state, not a failure (see `§7`). `AutocompleteError`
//! only surfaces from the builder and from artifact load, where a failure
//! really does mean the caller has nothing servable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutocompleteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed corpus line {line_no}: {reason}")]
    MalformedLine { line_no: usize, reason: String },

    #[error("corpus scores must be non-decreasing by line; line {line_no} has score {score} after {previous}")]
    UnsortedInput {
        line_no: usize,
        score: u64,
        previous: u64,
    },

    #[error("artifact has bad magic bytes (expected {expected:?}, found {found:?})")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("artifact format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { expected: u8, found: u8 },

    #[error("artifact is corrupt: {0}")]
    CorruptArtifact(#[from] Box<bincode::ErrorKind>),
}
