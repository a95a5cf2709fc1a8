//! Comment and localization-tag handling.
//!
//! The syntax tree does not own comments; they live in the raw buffer. This
//! module scans the buffer once per clean-up pass, classifies every comment,
//! and implements the two cross-cutting policies:
//!
//! - **Comment preservation**: an operation that vacates a source range must
//!   carry every comment in that range into its replacement text, or the
//!   single operation is aborted (never the whole fix).
//! - **NLS tag consistency**: merging string literals is only allowed when
//!   all merged literals carry a localization tag, or none do. A mixed
//!   result aborts the merge for that site only.

use crate::ast::Span;
use crate::utils::LineIndex;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Regex matching one `$NON-NLS-<n>$` localization tag.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
fn get_nls_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"\$NON-NLS-(\d+)\$").expect("Invalid NLS tag regex pattern"))
}

/// Kind of a scanned comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...` to end of line.
    Line,
    /// `/* ... */`, possibly spanning lines.
    Block,
}

/// A comment extracted from the raw buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Range including the delimiters.
    pub span: Span,
    /// Comment kind.
    pub kind: CommentKind,
    /// 1-indexed line of the comment start.
    pub line: usize,
    /// Whether code precedes the comment on its line.
    pub is_inline: bool,
}

impl Comment {
    /// The comment text including delimiters.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end()]
    }

    /// Whether this comment carries at least one localization tag.
    #[must_use]
    pub fn has_nls_tag(&self, source: &str) -> bool {
        self.kind == CommentKind::Line && get_nls_tag_re().is_match(self.text(source))
    }

    /// The tag numbers this comment carries, in order of appearance.
    #[must_use]
    pub fn nls_tags(&self, source: &str) -> Vec<usize> {
        if self.kind != CommentKind::Line {
            return Vec::new();
        }
        get_nls_tag_re()
            .captures_iter(self.text(source))
            .filter_map(|capture| capture.get(1).and_then(|m| m.as_str().parse().ok()))
            .collect()
    }
}

/// Scan the buffer for all comments, skipping string and character literals.
#[must_use]
pub fn scan_comments(source: &str) -> Vec<Comment> {
    let line_index = LineIndex::new(source);
    let bytes = source.as_bytes();
    let mut comments = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = skip_string(bytes, i),
            b'\'' => i = skip_char(bytes, i),
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                let start = i;
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                comments.push(make_comment(
                    source,
                    &line_index,
                    Span::from_range(start, i),
                    CommentKind::Line,
                ));
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                let start = i;
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                comments.push(make_comment(
                    source,
                    &line_index,
                    Span::from_range(start, i),
                    CommentKind::Block,
                ));
            }
            _ => i += 1,
        }
    }
    comments
}

fn make_comment(source: &str, line_index: &LineIndex, span: Span, kind: CommentKind) -> Comment {
    let line_start = line_index.line_start(span.start);
    let is_inline = source[line_start..span.start]
        .chars()
        .any(|c| !c.is_whitespace());
    Comment {
        span,
        kind,
        line: line_index.line_of(span.start),
        is_inline,
    }
}

fn skip_string(bytes: &[u8], mut i: usize) -> usize {
    i += 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            b'\n' => return i, // unterminated; recover at line end
            _ => i += 1,
        }
    }
    i
}

fn skip_char(bytes: &[u8], mut i: usize) -> usize {
    i += 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    i
}

/// Decide whether an operation that replaces `target` with `replacement`
/// keeps every comment attached to the vacated range.
///
/// A `None` replacement models plain removal. The check is textual on
/// purpose: a verbatim fragment that interleaves comments its own way still
/// passes as long as each comment survives byte-for-byte.
#[must_use]
pub fn comments_survive(
    source: &str,
    comments: &[Comment],
    target: Span,
    replacement: Option<&str>,
) -> bool {
    for comment in comments {
        if !comment.span.intersects(target) {
            continue;
        }
        let Some(text) = replacement else {
            return false;
        };
        if !text.contains(comment.text(source)) {
            return false;
        }
    }
    true
}

/// Localization-tag numbers present on the given 1-indexed line.
#[must_use]
pub fn nls_tags_on_line(source: &str, comments: &[Comment], line: usize) -> FxHashSet<usize> {
    let mut tags = FxHashSet::default();
    for comment in comments {
        if comment.line != line || comment.kind != CommentKind::Line {
            continue;
        }
        for capture in get_nls_tag_re().captures_iter(comment.text(source)) {
            if let Some(n) = capture.get(1).and_then(|m| m.as_str().parse().ok()) {
                tags.insert(n);
            }
        }
    }
    tags
}

/// 1-based position of the string literal at `lit_span` among the string
/// literals of its line. NLS tags reference literals by this ordinal.
#[must_use]
pub fn string_literal_ordinal(source: &str, lit_span: Span) -> usize {
    let line_start = source[..lit_span.start].rfind('\n').map_or(0, |pos| pos + 1);
    let bytes = source.as_bytes();
    let mut i = line_start;
    let mut ordinal = 0;
    while i <= lit_span.start && i < bytes.len() {
        match bytes[i] {
            b'"' => {
                ordinal += 1;
                if i == lit_span.start {
                    break;
                }
                i = skip_string(bytes, i);
            }
            b'\'' => i = skip_char(bytes, i),
            b'/' if i + 1 < bytes.len() && (bytes[i + 1] == b'/' || bytes[i + 1] == b'*') => {
                // A literal never starts inside a comment; the line scan is done.
                break;
            }
            _ => i += 1,
        }
    }
    ordinal
}

/// Whether the string literal at `lit_span` carries a localization tag.
#[must_use]
pub fn literal_has_nls_tag(source: &str, comments: &[Comment], lit_span: Span) -> bool {
    let line = LineIndex::new(source).line_of(lit_span.start);
    let tags = nls_tags_on_line(source, comments, line);
    if tags.is_empty() {
        return false;
    }
    tags.contains(&string_literal_ordinal(source, lit_span))
}

/// All-or-none localization-tag verdict over the literals of one merge site.
///
/// Returns `Some(true)` when every literal is tagged, `Some(false)` when none
/// is, and `None` for a mixed result (the merge must be aborted).
#[must_use]
pub fn tag_consistency(
    source: &str,
    comments: &[Comment],
    literal_spans: &[Span],
) -> Option<bool> {
    let mut tagged = 0usize;
    for span in literal_spans {
        if literal_has_nls_tag(source, comments, *span) {
            tagged += 1;
        }
    }
    if tagged == 0 {
        Some(false)
    } else if tagged == literal_spans.len() {
        Some(true)
    } else {
        None
    }
}
