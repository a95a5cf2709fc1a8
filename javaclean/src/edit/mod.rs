//! Rewrite operations and edit scripts.
//!
//! A `RewriteOperation` is a validated, self-contained edit instruction
//! against the immutable tree; an `EditScript` is the ordered, conflict-free
//! set of operations computed for one file. Scripts are conflict-free *by
//! construction* — finders stop descending once they consume a subtree — so
//! overlap here is a programming-contract violation, asserted in debug
//! builds and still refused by the realization buffer.

mod buffer;

pub use buffer::{RewriteBuffer, RewriteError, TextEdit};

use crate::ast::Span;
use crate::naming::LinkedProposalGroup;
use serde::Serialize;

/// Replacement content of an operation.
///
/// The two variants carry different guarantees and are never silently mixed:
/// a `Subtree` is engine-normalized text rendered from a synthesized node; a
/// `Verbatim` fragment is exact text whose indentation and escaping are the
/// producing transformation's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Engine-normalized rendering of a synthesized subtree.
    Subtree(String),
    /// Exact text, producer owns indentation and escaping.
    Verbatim(String),
}

impl Payload {
    /// The payload text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Payload::Subtree(s) | Payload::Verbatim(s) => s,
        }
    }

    /// Whether this payload is a verbatim fragment.
    #[must_use]
    pub fn is_verbatim(&self) -> bool {
        matches!(self, Payload::Verbatim(_))
    }
}

/// The edit instruction itself.
#[derive(Debug, Clone)]
pub enum OpKind {
    /// Replace `target` with the payload.
    Replace {
        /// Replaced range.
        target: Span,
        /// Replacement content.
        payload: Payload,
    },
    /// Insert the payload before `anchor`.
    InsertBefore {
        /// Anchor node range.
        anchor: Span,
        /// Inserted content.
        payload: Payload,
    },
    /// Insert the payload after `anchor`.
    InsertAfter {
        /// Anchor node range.
        anchor: Span,
        /// Inserted content.
        payload: Payload,
    },
    /// Delete `target`.
    Remove {
        /// Deleted range.
        target: Span,
    },
    /// Detach `source` byte-for-byte and splice it at `dest`. The moved
    /// fragment is never re-serialized, so its interior comments and
    /// formatting survive unchanged. `source` may sit inside another
    /// operation's replaced range (it is detached before the parent is
    /// replaced); in that case only the destination insertion is realized.
    Move {
        /// Moved range.
        source: Span,
        /// Destination byte offset.
        dest: usize,
    },
    /// Clone `source` at `dest`, leaving the original in place. Used when
    /// one original fragment must appear twice in the result.
    Copy {
        /// Cloned range.
        source: Span,
        /// Destination byte offset.
        dest: usize,
    },
    /// Replace `target` with exact text. Shorthand kind for the common
    /// replace-with-verbatim case so consumers can tell at a glance that no
    /// normalization guarantee applies.
    VerbatimSplice {
        /// Replaced range.
        target: Span,
        /// Exact replacement text.
        text: String,
    },
}

impl OpKind {
    /// The top-level range this operation claims, used for the pairwise
    /// disjointness contract. Insertions and move/copy destinations claim a
    /// zero-length point; a move source is handled separately by the
    /// detach-before-replace rule.
    #[must_use]
    pub fn claimed(&self) -> Span {
        match self {
            OpKind::Replace { target, .. }
            | OpKind::Remove { target }
            | OpKind::VerbatimSplice { target, .. } => *target,
            OpKind::InsertBefore { anchor, .. } => Span::new(anchor.start, 0),
            OpKind::InsertAfter { anchor, .. } => Span::new(anchor.end(), 0),
            OpKind::Move { dest, .. } | OpKind::Copy { dest, .. } => Span::new(*dest, 0),
        }
    }

    /// Replacement text arriving at the claimed range, if any.
    #[must_use]
    pub fn replacement_text(&self) -> Option<&str> {
        match self {
            OpKind::Replace { payload, .. }
            | OpKind::InsertBefore { payload, .. }
            | OpKind::InsertAfter { payload, .. } => Some(payload.text()),
            OpKind::VerbatimSplice { text, .. } => Some(text),
            OpKind::Remove { .. } | OpKind::Move { .. } | OpKind::Copy { .. } => None,
        }
    }
}

/// One validated edit instruction with its human-readable label.
#[derive(Debug, Clone)]
pub struct RewriteOperation {
    /// Label shown in previews and undo grouping.
    pub label: String,
    /// The edit instruction.
    pub kind: OpKind,
    /// Optional linked name proposals attached to this operation.
    pub linked_group: Option<LinkedProposalGroup>,
}

impl RewriteOperation {
    /// Create an operation.
    #[must_use]
    pub fn new(label: impl Into<String>, kind: OpKind) -> Self {
        Self {
            label: label.into(),
            kind,
            linked_group: None,
        }
    }

    /// Replace a range with exact text.
    #[must_use]
    pub fn verbatim_splice(label: impl Into<String>, target: Span, text: impl Into<String>) -> Self {
        Self::new(
            label,
            OpKind::VerbatimSplice {
                target,
                text: text.into(),
            },
        )
    }

    /// Replace a range with a synthesized subtree rendering.
    #[must_use]
    pub fn replace_subtree(
        label: impl Into<String>,
        target: Span,
        subtree: impl Into<String>,
    ) -> Self {
        Self::new(
            label,
            OpKind::Replace {
                target,
                payload: Payload::Subtree(subtree.into()),
            },
        )
    }

    /// Delete a range.
    #[must_use]
    pub fn remove(label: impl Into<String>, target: Span) -> Self {
        Self::new(label, OpKind::Remove { target })
    }

    /// Attach a linked proposal group.
    #[must_use]
    pub fn with_group(mut self, group: LinkedProposalGroup) -> Self {
        self.linked_group = Some(group);
        self
    }
}

/// The ordered, conflict-free operation set for one file.
#[derive(Debug, Clone, Default)]
pub struct EditScript {
    ops: Vec<RewriteOperation>,
}

impl EditScript {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation.
    ///
    /// Debug builds assert the disjointness contract here; release builds
    /// rely on construction and on the buffer's final validation.
    pub fn push(&mut self, op: RewriteOperation) {
        debug_assert!(
            self.accepts(&op.kind),
            "rewrite operations must claim disjoint ranges"
        );
        self.ops.push(op);
    }

    /// Whether `kind`'s claimed range is disjoint from every queued one.
    #[must_use]
    pub fn accepts(&self, kind: &OpKind) -> bool {
        let claim = kind.claimed();
        if claim.len == 0 {
            return true;
        }
        self.ops.iter().all(|op| {
            let other = op.kind.claimed();
            other.len == 0 || !other.intersects(claim)
        })
    }

    /// Queued operations in order.
    #[must_use]
    pub fn ops(&self) -> &[RewriteOperation] {
        &self.ops
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the script is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Merge another script into this one.
    pub fn merge(&mut self, other: EditScript) {
        for op in other.ops {
            self.push(op);
        }
    }

    /// Lower the operations to raw text edits against `source`.
    ///
    /// A `Move` whose source lies inside another operation's replaced or
    /// removed range realizes as the destination insertion only — the
    /// source bytes disappear with the parent edit.
    #[must_use]
    pub fn to_edits(&self, source: &str) -> Vec<TextEdit> {
        let mut edits = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            match &op.kind {
                OpKind::Replace { target, payload } => {
                    edits.push(TextEdit::new(*target, payload.text()));
                }
                OpKind::VerbatimSplice { target, text } => {
                    edits.push(TextEdit::new(*target, text.clone()));
                }
                OpKind::InsertBefore { anchor, payload } => {
                    edits.push(TextEdit::insert(anchor.start, payload.text()));
                }
                OpKind::InsertAfter { anchor, payload } => {
                    edits.push(TextEdit::insert(anchor.end(), payload.text()));
                }
                OpKind::Remove { target } => edits.push(TextEdit::delete(*target)),
                OpKind::Move { source: src, dest } => {
                    let text = &source[src.start..src.end()];
                    edits.push(TextEdit::insert(*dest, text));
                    if !self.nested_in_other_target(*src) {
                        edits.push(TextEdit::delete(*src));
                    }
                }
                OpKind::Copy { source: src, dest } => {
                    let text = &source[src.start..src.end()];
                    edits.push(TextEdit::insert(*dest, text));
                }
            }
        }
        edits
    }

    fn nested_in_other_target(&self, span: Span) -> bool {
        self.ops.iter().any(|op| match op.kind {
            OpKind::Replace { target, .. }
            | OpKind::Remove { target }
            | OpKind::VerbatimSplice { target, .. } => target.contains(span) && target != span,
            _ => false,
        })
    }

    /// Realize the script into the rewritten buffer contents.
    pub fn realize(&self, source: &str) -> Result<String, RewriteError> {
        let mut buffer = RewriteBuffer::new(source);
        buffer.extend(self.to_edits(source));
        buffer.apply()
    }

    /// Per-operation before/after preview for interactive display.
    #[must_use]
    pub fn preview(&self, source: &str) -> Vec<ChangePreview> {
        self.ops
            .iter()
            .map(|op| {
                let claim = op.kind.claimed();
                ChangePreview {
                    label: op.label.clone(),
                    start: claim.start,
                    end: claim.end(),
                    before: source[claim.start..claim.end()].to_owned(),
                    after: op.kind.replacement_text().unwrap_or("").to_owned(),
                }
            })
            .collect()
    }
}

/// A named, atomic group of operations offered to the caller.
#[derive(Debug, Clone)]
pub struct Fix {
    /// Human-readable label for preview and undo grouping.
    pub label: String,
    /// The operations of this fix.
    pub script: EditScript,
}

impl Fix {
    /// Create a fix over a script.
    #[must_use]
    pub fn new(label: impl Into<String>, script: EditScript) -> Self {
        Self {
            label: label.into(),
            script,
        }
    }
}

/// Serializable before/after snippet for one operation.
#[derive(Debug, Clone, Serialize)]
pub struct ChangePreview {
    /// Operation label.
    pub label: String,
    /// Claimed range start offset.
    pub start: usize,
    /// Claimed range end offset.
    pub end: usize,
    /// Original text of the claimed range.
    pub before: String,
    /// Replacement text ("" for removals).
    pub after: String,
}
