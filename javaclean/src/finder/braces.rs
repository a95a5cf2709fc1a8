//! Brace normalization for control-statement bodies.
//!
//! Three variants: wrap every unbraced body in a block, remove the braces
//! around every single-statement body where the dangling-else analysis
//! allows it, or remove them only around single `return`/`throw` bodies.
//!
//! Removal is realized as two surgical deletions (the opening and closing
//! brace together with adjacent whitespace) so that nested removals in one
//! script never claim overlapping ranges and interior comments stay where
//! they are.

use crate::ast::{Block, SourceTree, Span, Stmt};
use crate::comments::Comment;
use crate::config::{BraceStyle, CleanUpOptions};
use crate::edit::{EditScript, RewriteOperation};
use crate::finder::{CleanUp, FixContext};
use crate::format::reindent;
use crate::safety::braces::{can_remove_braces, Ancestor, BodySlot};
use crate::utils::indent_at;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// The brace-normalization family.
#[derive(Debug, Default)]
pub struct BraceCleanUp;

impl CleanUp for BraceCleanUp {
    fn name(&self) -> &'static str {
        "braces"
    }

    fn label(&self) -> &'static str {
        "Normalize control statement braces"
    }

    fn find(
        &self,
        tree: &SourceTree,
        options: &CleanUpOptions,
        _comments: &[Comment],
        ctx: &mut FixContext,
    ) -> EditScript {
        let Some(style) = options.control_statement_braces else {
            return EditScript::new();
        };
        let mut script = EditScript::new();
        match style {
            BraceStyle::Always => {
                for stmt in &tree.body {
                    add_walk(tree, stmt, &options.indent_unit, ctx, &mut script);
                }
            }
            BraceStyle::Never | BraceStyle::OnlyReturnAndThrow => {
                let mut walker = RemoveWalk {
                    tree,
                    style,
                    ancestors: SmallVec::new(),
                    transparent: FxHashSet::default(),
                };
                for stmt in &tree.body {
                    walker.walk(stmt, ctx, &mut script);
                }
            }
        }
        script
    }
}

fn add_walk(
    tree: &SourceTree,
    stmt: &Stmt,
    unit: &str,
    ctx: &mut FixContext,
    script: &mut EditScript,
) {
    if stmt.is_error() || ctx.is_consumed(stmt.span()) {
        return;
    }
    match stmt {
        Stmt::Block(b) => {
            for s in &b.stmts {
                add_walk(tree, s, unit, ctx, script);
            }
        }
        Stmt::If(node) => {
            wrap_or_recurse(tree, stmt.span(), &node.then_branch, unit, ctx, script);
            if let Some(else_branch) = node.else_branch.as_deref() {
                if matches!(else_branch, Stmt::If(_)) {
                    // An `else if` link keeps its shape; only its own
                    // branches are wrapped.
                    add_walk(tree, else_branch, unit, ctx, script);
                } else {
                    wrap_or_recurse(tree, stmt.span(), else_branch, unit, ctx, script);
                }
            }
        }
        Stmt::While(node) => wrap_or_recurse(tree, stmt.span(), &node.body, unit, ctx, script),
        Stmt::DoWhile(node) => wrap_or_recurse(tree, stmt.span(), &node.body, unit, ctx, script),
        Stmt::For(node) => wrap_or_recurse(tree, stmt.span(), &node.body, unit, ctx, script),
        Stmt::ForEach(node) => wrap_or_recurse(tree, stmt.span(), &node.body, unit, ctx, script),
        Stmt::Switch(node) => {
            for case in &node.cases {
                for s in &case.stmts {
                    add_walk(tree, s, unit, ctx, script);
                }
            }
        }
        _ => {}
    }
}

/// Wrap an unbraced body in a block, or keep walking into a braced one.
///
/// Wrapping consumes the body subtree: the whole construct becomes one
/// operation, so a nested unbraced `if` inside it is deliberately left for
/// a later pass instead of producing a conflicting second operation.
fn wrap_or_recurse(
    tree: &SourceTree,
    owner: Span,
    body: &Stmt,
    unit: &str,
    ctx: &mut FixContext,
    script: &mut EditScript,
) {
    if body.is_error() || ctx.is_consumed(body.span()) {
        return;
    }
    if matches!(body, Stmt::Block(_)) {
        add_walk(tree, body, unit, ctx, script);
        return;
    }
    let body_text = tree.text(body.span());
    let text = if body_text.contains('\n') {
        let indent = indent_at(&tree.source, owner.start).to_owned();
        let deeper = format!("{indent}{unit}");
        let shifted = reindent(body_text, &indent, &deeper);
        format!("{{\n{deeper}{shifted}\n{indent}}}")
    } else {
        format!("{{ {body_text} }}")
    };
    script.push(RewriteOperation::verbatim_splice(
        "Add braces",
        body.span(),
        text,
    ));
    ctx.consume(body.span());
}

struct RemoveWalk<'a> {
    tree: &'a SourceTree,
    style: BraceStyle,
    ancestors: SmallVec<[Ancestor; 8]>,
    /// Blocks already accepted for unblocking, visible to outer candidates
    /// through the dangling-if walk.
    transparent: FxHashSet<Span>,
}

impl RemoveWalk<'_> {
    fn walk(&mut self, stmt: &Stmt, ctx: &mut FixContext, script: &mut EditScript) {
        if stmt.is_error() || ctx.is_consumed(stmt.span()) {
            return;
        }
        match stmt {
            Stmt::Block(b) => {
                self.ancestors.push(Ancestor::Sealed);
                for s in &b.stmts {
                    self.walk(s, ctx, script);
                }
                self.ancestors.pop();
            }
            Stmt::If(node) => {
                let has_else = node.else_branch.is_some();
                self.visit_body(
                    BodySlot::IfThen { has_else },
                    Ancestor::IfThen { has_else },
                    &node.then_branch,
                    ctx,
                    script,
                );
                if let Some(else_branch) = node.else_branch.as_deref() {
                    if matches!(else_branch, Stmt::If(_)) {
                        self.ancestors.push(Ancestor::IfElse);
                        self.walk(else_branch, ctx, script);
                        self.ancestors.pop();
                    } else {
                        self.visit_body(
                            BodySlot::IfElse,
                            Ancestor::IfElse,
                            else_branch,
                            ctx,
                            script,
                        );
                    }
                }
            }
            Stmt::While(node) => {
                self.visit_body(BodySlot::Loop, Ancestor::Loop, &node.body, ctx, script);
            }
            Stmt::DoWhile(node) => {
                self.visit_body(BodySlot::Loop, Ancestor::Loop, &node.body, ctx, script);
            }
            Stmt::For(node) => {
                self.visit_body(BodySlot::Loop, Ancestor::Loop, &node.body, ctx, script);
            }
            Stmt::ForEach(node) => {
                self.visit_body(BodySlot::Loop, Ancestor::Loop, &node.body, ctx, script);
            }
            Stmt::Switch(node) => {
                self.ancestors.push(Ancestor::Sealed);
                for case in &node.cases {
                    for s in &case.stmts {
                        self.walk(s, ctx, script);
                    }
                }
                self.ancestors.pop();
            }
            _ => {}
        }
    }

    /// Recurse into a control-statement body bottom-up, then decide whether
    /// its braces (if any) can go.
    fn visit_body(
        &mut self,
        slot: BodySlot,
        ancestor: Ancestor,
        body: &Stmt,
        ctx: &mut FixContext,
        script: &mut EditScript,
    ) {
        self.ancestors.push(ancestor);
        self.walk(body, ctx, script);
        self.ancestors.pop();

        let Stmt::Block(block) = body else {
            return;
        };
        if ctx.is_consumed(block.span) {
            return;
        }
        if self.style == BraceStyle::OnlyReturnAndThrow
            && !matches!(
                block.stmts.as_slice(),
                [Stmt::Return(_)] | [Stmt::Throw(_)]
            )
        {
            return;
        }
        let verdict = can_remove_braces(block, slot, &self.ancestors, &self.transparent);
        if !verdict.is_accept() {
            return;
        }
        self.transparent.insert(block.span);
        let (open, close) = brace_spans(&self.tree.source, block);
        script.push(RewriteOperation::remove("Remove braces", open));
        script.push(RewriteOperation::remove("Remove braces", close));
        ctx.consume(open);
        ctx.consume(close);
    }
}

/// The two deletion ranges of a block's braces: each brace together with
/// the whitespace run on its interior side. Comments are never swallowed.
fn brace_spans(source: &str, block: &Block) -> (Span, Span) {
    let bytes = source.as_bytes();
    let mut open_end = block.span.start + 1;
    while open_end < block.span.end() - 1 && bytes[open_end].is_ascii_whitespace() {
        open_end += 1;
    }
    let mut close_start = block.span.end() - 1;
    while close_start > open_end && bytes[close_start - 1].is_ascii_whitespace() {
        close_start -= 1;
    }
    (
        Span::from_range(block.span.start, open_end),
        Span::from_range(close_start, block.span.end()),
    )
}
