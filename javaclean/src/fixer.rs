//! Fix aggregation.
//!
//! Runs the enabled transformation families over one tree snapshot, in a
//! fixed order, against a shared [`FixContext`] so no two families claim
//! intersecting ranges. Each family's surviving operations become one
//! [`Fix`]; the comment-preservation policy is applied per operation before
//! a fix is final.

use crate::ast::SourceTree;
use crate::comments::{comments_survive, scan_comments, Comment};
use crate::config::CleanUpOptions;
use crate::edit::{ChangePreview, EditScript, Fix, OpKind, RewriteError};
use crate::finder::braces::BraceCleanUp;
use crate::finder::concat::ConcatCleanUp;
use crate::finder::dispatch::DispatchCleanUp;
use crate::finder::element_loop::ElementLoopCleanUp;
use crate::finder::{CleanUp, FixContext};
use crate::imports::RecordingImportManager;
use crate::naming::LinkedProposalGroup;

/// Everything computed for one file: zero or more fixes, the linked name
/// proposals, and the import requirements the host must satisfy.
#[derive(Debug, Default)]
pub struct FileCleanUp {
    /// One fix per family that produced operations.
    pub fixes: Vec<Fix>,
    /// Name-proposal groups for interactive selection.
    pub groups: Vec<LinkedProposalGroup>,
    /// Imports to add or reconsider.
    pub imports: RecordingImportManager,
}

impl FileCleanUp {
    /// Whether any family produced a fix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// All operations of all fixes as one script.
    #[must_use]
    pub fn combined(&self) -> EditScript {
        let mut script = EditScript::new();
        for fix in &self.fixes {
            script.merge(fix.script.clone());
        }
        script
    }

    /// Realize every fix into the rewritten buffer contents.
    pub fn realize(&self, source: &str) -> Result<String, RewriteError> {
        self.combined().realize(source)
    }

    /// Per-operation previews across all fixes.
    #[must_use]
    pub fn previews(&self, source: &str) -> Vec<ChangePreview> {
        self.combined().preview(source)
    }
}

/// Runs the transformation families for one file.
pub struct FixAggregator {
    families: Vec<Box<dyn CleanUp>>,
}

impl Default for FixAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl FixAggregator {
    /// Aggregator over the built-in families.
    ///
    /// Order matters: whole-statement rewrites run before the brace and
    /// concatenation families so a consumed subtree is never edited twice.
    #[must_use]
    pub fn new() -> Self {
        Self {
            families: vec![
                Box::new(ElementLoopCleanUp),
                Box::new(DispatchCleanUp),
                Box::new(BraceCleanUp),
                Box::new(ConcatCleanUp),
            ],
        }
    }

    /// Aggregator over a caller-supplied family list.
    #[must_use]
    pub fn with_families(families: Vec<Box<dyn CleanUp>>) -> Self {
        Self { families }
    }

    /// Compute the fixes for one file against one tree snapshot.
    #[must_use]
    pub fn compute(&self, tree: &SourceTree, options: &CleanUpOptions) -> FileCleanUp {
        let mut result = FileCleanUp::default();
        if !options.any_enabled() {
            return result;
        }
        let comments = scan_comments(&tree.source);
        let mut ctx = FixContext::new();
        for family in &self.families {
            let raw = family.find(tree, options, &comments, &mut ctx);
            let script = keep_comment_safe(&tree.source, &comments, &raw);
            if script.is_empty() {
                continue;
            }
            result.groups.extend(
                script
                    .ops()
                    .iter()
                    .filter_map(|op| op.linked_group.clone()),
            );
            result.fixes.push(Fix::new(family.label(), script));
        }
        result.imports = std::mem::take(&mut ctx.imports);
        result
    }
}

/// Comment-preservation filter: an operation that vacates a range must keep
/// every comment in it, or that single operation is dropped (never the
/// whole fix). An operation targeting exactly one comment is a deliberate
/// comment edit and passes.
fn keep_comment_safe(source: &str, comments: &[Comment], script: &EditScript) -> EditScript {
    let mut kept = EditScript::new();
    for op in script.ops() {
        let survives = match &op.kind {
            OpKind::Remove { target } => comments_survive(source, comments, *target, None),
            OpKind::Replace { target, payload } => {
                comments_survive(source, comments, *target, Some(payload.text()))
            }
            OpKind::VerbatimSplice { target, text } => {
                comments.iter().any(|c| c.span == *target)
                    || comments_survive(source, comments, *target, Some(text))
            }
            // Insertions vacate nothing; a move carries its bytes along.
            OpKind::InsertBefore { .. }
            | OpKind::InsertAfter { .. }
            | OpKind::Move { .. }
            | OpKind::Copy { .. } => true,
        };
        if survives {
            kept.push(op.clone());
        }
    }
    kept
}
