use crate::buffer::BufferError;
use crate::ts::TreeSitterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("swap targets overlap: [{a_start}, {a_end}) and [{b_start}, {b_end})")]
    OverlappingSwap {
        a_start: usize,
        a_end: usize,
        b_start: usize,
        b_end: usize,
    },

    #[error("reorder indices are not a permutation of 0..{child_count}")]
    InvalidReorder { child_count: usize },

    #[error("span [{start_byte}, {end_byte}) out of bounds for source of length {source_len}")]
    SpanOutOfBounds {
        start_byte: usize,
        end_byte: usize,
        source_len: usize,
    },

    #[error("no insertion point set; choose one with at_start_of, at_end_of, before, or after")]
    MissingInsertionPoint,

    #[error("no parser available: supply one or set a language")]
    MissingParser,

    #[error("target not found: {what}")]
    TargetNotFound { what: String },

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    TreeSitter(#[from] TreeSitterError),
}
