use thiserror::Error;
use tracing::debug;

/// The fundamental edit primitive: a byte-range replacement against the
/// original source.
///
/// All high-level operations (structural transforms, query rewrites,
/// syntax-aware inserts) compile down to this single primitive. Intelligence
/// lives in span acquisition, not application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub start_byte: usize,
    /// Ending byte offset (exclusive)
    pub end_byte: usize,
    /// Replacement text for `[start_byte, end_byte)`
    pub replacement: String,
}

impl Edit {
    /// Create a new edit. Equal offsets denote a pure insertion.
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
        }
    }

    /// Whether this edit inserts without removing anything.
    pub fn is_insertion(&self) -> bool {
        self.start_byte == self.end_byte
    }
}

/// An edit paired with the text it replaces, for inspection without mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPreview {
    pub start_byte: usize,
    pub end_byte: usize,
    /// Original source text at `[start_byte, end_byte)`
    pub original: String,
    pub replacement: String,
}

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("edit range [{start_byte}, {end_byte}) out of bounds for source of length {source_len}")]
    OutOfBounds {
        start_byte: usize,
        end_byte: usize,
        source_len: usize,
    },

    #[error("applying edits produced malformed UTF-8")]
    MalformedUtf8,
}

/// An ordered list of byte-range edits against one immutable source, with
/// deterministic batch application.
///
/// Edits are applied in descending order of `(start_byte, end_byte)`, so
/// each splice only mutates bytes strictly after the next edit's target
/// range and no offset adjustment is ever needed. When two edits share both
/// offsets, the earlier-added one is spliced last and therefore its text
/// lands earlier in the output; `wrap`-style callers rely on this by adding
/// their opening insertion first.
///
/// Overlapping non-insertion edits are neither detected nor rejected: the
/// later-applied edit (lower start) wins over any bytes the earlier already
/// touched, because its range refers to the original indices. Callers must
/// not generate overlapping replacements for the same logical transform; an
/// overlap that splits a multibyte character surfaces as
/// [`BufferError::MalformedUtf8`].
#[derive(Debug, Default)]
#[must_use = "an EditBuffer does nothing until apply() is called"]
pub struct EditBuffer {
    edits: Vec<Edit>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an edit. No deduplication: two pure insertions at the same
    /// offset may coexist.
    pub fn add(&mut self, start_byte: usize, end_byte: usize, replacement: impl Into<String>) {
        self.edits.push(Edit::new(start_byte, end_byte, replacement));
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn into_edits(self) -> Vec<Edit> {
        self.edits
    }

    /// Apply all accumulated edits to `source` and return the new string.
    ///
    /// Splicing is byte-level, bottom-to-top; the result is re-validated as
    /// UTF-8 before being returned.
    pub fn apply(&self, source: &str) -> Result<String, BufferError> {
        if self.edits.is_empty() {
            return Ok(source.to_string());
        }

        for edit in &self.edits {
            if edit.start_byte > edit.end_byte || edit.end_byte > source.len() {
                return Err(BufferError::OutOfBounds {
                    start_byte: edit.start_byte,
                    end_byte: edit.end_byte,
                    source_len: source.len(),
                });
            }
        }

        // Stable ascending sort over (start, end), then reverse iteration:
        // descending application overall, and for full ties the later-added
        // edit is spliced first so the earlier-added text precedes it.
        let mut order: Vec<usize> = (0..self.edits.len()).collect();
        order.sort_by_key(|&i| (self.edits[i].start_byte, self.edits[i].end_byte));

        debug!(edit_count = self.edits.len(), "applying edit buffer");

        let mut out: Vec<u8> = source.as_bytes().to_vec();
        for &i in order.iter().rev() {
            let edit = &self.edits[i];
            // An overlapping higher-start edit may already have shortened the
            // buffer past this edit's end.
            let end = edit.end_byte.min(out.len());
            out.splice(edit.start_byte..end, edit.replacement.bytes());
        }

        String::from_utf8(out).map_err(|_| BufferError::MalformedUtf8)
    }
}
