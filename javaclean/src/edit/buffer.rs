//! Span-safe rewrite buffer.
//!
//! Turns a validated set of text edits into the rewritten buffer contents.
//! Edits are applied back-to-front so earlier byte positions stay valid, and
//! the whole set is validated for overlap first. This is the only place the
//! engine touches raw buffer text during commit; everything upstream deals in
//! operations against the immutable tree.

use crate::ast::Span;
use thiserror::Error;

/// A single low-level text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Replaced range; zero-length for insertions.
    pub span: Span,
    /// Replacement content.
    pub replacement: String,
}

impl TextEdit {
    /// Replace `span` with `replacement`.
    #[must_use]
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    /// Insert `content` at `position`.
    #[must_use]
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self::new(Span::new(position, 0), content)
    }

    /// Delete `span`.
    #[must_use]
    pub fn delete(span: Span) -> Self {
        Self::new(span, "")
    }
}

/// Error during realization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Two edits claim intersecting ranges. Reaching this is a programming
    /// contract violation upstream; the buffer still refuses to guess.
    #[error("overlapping edits at bytes {first} and {second}")]
    Overlap {
        /// Start offset of the first edit involved.
        first: usize,
        /// Start offset of the second edit involved.
        second: usize,
    },
    /// An edit range ends past the end of the buffer.
    #[error("edit ends at byte {end} beyond buffer length {len}")]
    OutOfBounds {
        /// End offset of the bad edit.
        end: usize,
        /// Buffer length.
        len: usize,
    },
}

/// Applies a batch of edits to one buffer snapshot.
#[derive(Debug, Clone)]
pub struct RewriteBuffer {
    source: String,
    edits: Vec<TextEdit>,
}

impl RewriteBuffer {
    /// Create a buffer over the given source snapshot.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Queue one edit.
    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Queue several edits.
    pub fn extend(&mut self, edits: impl IntoIterator<Item = TextEdit>) {
        self.edits.extend(edits);
    }

    /// Number of queued edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether no edits are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Validate bounds and pairwise disjointness without applying.
    pub fn validate(&self) -> Result<(), RewriteError> {
        for edit in &self.edits {
            if edit.span.end() > self.source.len() {
                return Err(RewriteError::OutOfBounds {
                    end: edit.span.end(),
                    len: self.source.len(),
                });
            }
        }
        for (i, a) in self.edits.iter().enumerate() {
            for b in &self.edits[i + 1..] {
                if a.span.intersects(b.span) {
                    return Err(RewriteError::Overlap {
                        first: a.span.start,
                        second: b.span.start,
                    });
                }
            }
        }
        Ok(())
    }

    /// Apply all edits and return the rewritten text.
    ///
    /// Edits at the same insertion point keep their queue order in the
    /// output.
    pub fn apply(self) -> Result<String, RewriteError> {
        self.validate()?;

        let mut order: Vec<usize> = (0..self.edits.len()).collect();
        // Back-to-front; for equal starts the later-queued edit is applied
        // first so earlier-queued text ends up first in the result.
        order.sort_by_key(|&i| (self.edits[i].span.start, i));

        let mut result = self.source;
        for &i in order.iter().rev() {
            let edit = &self.edits[i];
            result.replace_range(edit.span.start..edit.span.end(), &edit.replacement);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_replacement() {
        let mut buffer = RewriteBuffer::new("hello world");
        buffer.push(TextEdit::new(Span::new(0, 5), "hi"));
        let result = buffer.apply().expect("should apply");
        assert_eq!(result, "hi world");
    }

    #[test]
    fn test_multiple_non_overlapping_edits() {
        let mut buffer = RewriteBuffer::new("aaa bbb ccc");
        buffer.push(TextEdit::new(Span::new(0, 3), "AAA"));
        buffer.push(TextEdit::new(Span::new(8, 3), "CCC"));
        let result = buffer.apply().expect("should apply");
        assert_eq!(result, "AAA bbb CCC");
    }

    #[test]
    fn test_overlapping_edits_error() {
        let mut buffer = RewriteBuffer::new("hello world");
        buffer.push(TextEdit::new(Span::new(0, 8), "hi"));
        buffer.push(TextEdit::new(Span::new(5, 5), "there"));
        assert!(matches!(
            buffer.apply(),
            Err(RewriteError::Overlap { .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_error() {
        let mut buffer = RewriteBuffer::new("short");
        buffer.push(TextEdit::new(Span::new(0, 100), "long"));
        assert!(matches!(
            buffer.apply(),
            Err(RewriteError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_deletion_and_insertion() {
        let mut buffer = RewriteBuffer::new("hello world");
        buffer.push(TextEdit::delete(Span::new(5, 6)));
        buffer.push(TextEdit::insert(0, ">> "));
        let result = buffer.apply().expect("should apply");
        assert_eq!(result, ">> hello");
    }

    #[test]
    fn test_adjacent_edits_are_disjoint() {
        let mut buffer = RewriteBuffer::new("abcdef");
        buffer.push(TextEdit::new(Span::new(0, 3), "XXX"));
        buffer.push(TextEdit::new(Span::new(3, 3), "YYY"));
        let result = buffer.apply().expect("should apply");
        assert_eq!(result, "XXXYYY");
    }

    #[test]
    fn test_insertions_at_same_point_keep_queue_order() {
        let mut buffer = RewriteBuffer::new("ab");
        buffer.push(TextEdit::insert(1, "1"));
        buffer.push(TextEdit::insert(1, "2"));
        let result = buffer.apply().expect("should apply");
        assert_eq!(result, "a12b");
    }

    #[test]
    fn test_empty_edit_set() {
        let buffer = RewriteBuffer::new("unchanged");
        assert!(buffer.is_empty());
        let result = buffer.apply().expect("should apply");
        assert_eq!(result, "unchanged");
    }

    #[test]
    fn test_preserves_surrounding_formatting() {
        let source = "if (x) {\n    // important comment\n    return 42;\n}\n";
        let pos = source.find("42").expect("should find 42");
        let mut buffer = RewriteBuffer::new(source);
        buffer.push(TextEdit::new(Span::new(pos, 2), "100"));
        let result = buffer.apply().expect("should apply");
        assert!(result.contains("// important comment"));
        assert!(result.contains("return 100;"));
    }
}
