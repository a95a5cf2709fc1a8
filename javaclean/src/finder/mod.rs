//! Pattern finders and traversal infrastructure.
//!
//! Every transformation family implements [`CleanUp`]: one single-pass,
//! pre-order traversal over the tree that emits zero or more validated
//! rewrite operations. A finder that consumes a subtree must not descend
//! into it again — that rule, together with the pass-wide consumed-range
//! set shared across families, is what makes edit scripts conflict-free by
//! construction.
//!
//! Finders hold no per-instance accumulator state; everything mutable is
//! threaded explicitly through [`FixContext`] or local recursion, so a
//! finder value is freely reusable.

pub mod braces;
pub mod concat;
pub mod dispatch;
pub mod element_loop;

use crate::ast::{Expr, ForInit, IfStmt, SourceTree, Span, Stmt};
use crate::comments::Comment;
use crate::config::CleanUpOptions;
use crate::edit::EditScript;
use crate::imports::RecordingImportManager;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Visit decision for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    /// Keep walking into the children.
    Children,
    /// The node was consumed (or is of no interest); skip the subtree.
    Skip,
}

/// Outcome of a precondition check over one structurally-matched site.
///
/// Rejection is the expected, dominant outcome and is not an error; it
/// simply drops the candidate. `CannotCompute` marks structurally-required
/// information the resolver failed to produce — it also drops only the one
/// candidate, never the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The site is safe to rewrite.
    Accept,
    /// The site is structurally or semantically unsuitable.
    Reject(&'static str),
    /// Required resolution information is missing.
    CannotCompute(&'static str),
}

impl Verdict {
    /// Whether the candidate survived.
    #[must_use]
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Mutable bookkeeping scoped to one fix-aggregation pass.
///
/// Explicitly passed by reference through every finder — never process-wide
/// state — so concurrent passes over different files cannot interfere.
#[derive(Debug, Default)]
pub struct FixContext {
    consumed: SmallVec<[Span; 8]>,
    /// Names already introduced by operations committed earlier in this
    /// pass; the name proposer must avoid them.
    pub excluded_names: FxHashSet<String>,
    /// Import requirements recorded while building fixes.
    pub imports: RecordingImportManager,
}

impl FixContext {
    /// Fresh context for one file pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a subtree has been consumed by an operation.
    pub fn consume(&mut self, span: Span) {
        self.consumed.push(span);
    }

    /// Whether `span` intersects any consumed subtree.
    #[must_use]
    pub fn is_consumed(&self, span: Span) -> bool {
        self.consumed.iter().any(|c| c.intersects(span))
    }

    /// Reserve an introduced name for the remainder of the pass.
    pub fn exclude_name(&mut self, name: &str) {
        self.excluded_names.insert(name.to_owned());
    }
}

/// One transformation family.
pub trait CleanUp {
    /// Stable family identifier (configuration key suffix).
    fn name(&self) -> &'static str;

    /// Human-readable fix label for preview and undo grouping.
    fn label(&self) -> &'static str;

    /// Single pass over the tree; emits validated operations.
    fn find(
        &self,
        tree: &SourceTree,
        options: &CleanUpOptions,
        comments: &[Comment],
        ctx: &mut FixContext,
    ) -> EditScript;
}

/// Pre-order statement traversal with a descend/skip decision per node.
/// Parser-recovered regions are skipped outright and never reach `visit`.
pub fn each_stmt<'a, F>(stmts: &'a [Stmt], visit: &mut F)
where
    F: FnMut(&'a Stmt) -> Descend,
{
    for stmt in stmts {
        if stmt.is_error() {
            continue;
        }
        if visit(stmt) == Descend::Skip {
            continue;
        }
        match stmt {
            Stmt::Block(b) => each_stmt(&b.stmts, visit),
            Stmt::If(s) => {
                each_stmt(std::slice::from_ref(&s.then_branch), visit);
                if let Some(else_branch) = &s.else_branch {
                    each_stmt(std::slice::from_ref(else_branch), visit);
                }
            }
            Stmt::While(s) => each_stmt(std::slice::from_ref(&s.body), visit),
            Stmt::DoWhile(s) => each_stmt(std::slice::from_ref(&s.body), visit),
            Stmt::For(s) => each_stmt(std::slice::from_ref(&s.body), visit),
            Stmt::ForEach(s) => each_stmt(std::slice::from_ref(&s.body), visit),
            Stmt::Switch(s) => {
                for case in &s.cases {
                    each_stmt(&case.stmts, visit);
                }
            }
            Stmt::VarDecl(_)
            | Stmt::Expr(_)
            | Stmt::Return(_)
            | Stmt::Throw(_)
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Empty(_)
            | Stmt::Error(_) => {}
        }
    }
}

/// Visit an expression and all of its subexpressions, pre-order.
pub fn each_subexpr<'a, F>(expr: &'a Expr, visit: &mut F)
where
    F: FnMut(&'a Expr),
{
    visit(expr);
    match expr {
        Expr::Name(_) | Expr::Literal(_) => {}
        Expr::Binary(b) => {
            each_subexpr(&b.lhs, visit);
            each_subexpr(&b.rhs, visit);
        }
        Expr::Unary(u) => each_subexpr(&u.operand, visit),
        Expr::Postfix(p) => each_subexpr(&p.operand, visit),
        Expr::Assign(a) => {
            each_subexpr(&a.target, visit);
            each_subexpr(&a.value, visit);
        }
        Expr::Index(ix) => {
            each_subexpr(&ix.array, visit);
            each_subexpr(&ix.index, visit);
        }
        Expr::Field(f) => each_subexpr(&f.object, visit),
        Expr::Call(c) => {
            if let Some(receiver) = &c.receiver {
                each_subexpr(receiver, visit);
            }
            for arg in &c.args {
                each_subexpr(arg, visit);
            }
        }
        Expr::New(n) => {
            for arg in &n.args {
                each_subexpr(arg, visit);
            }
            for dim in &n.dims {
                each_subexpr(dim, visit);
            }
        }
    }
}

/// Visit every expression under a statement, including nested statements.
pub fn each_expr_in_stmt<'a, F>(stmt: &'a Stmt, visit: &mut F)
where
    F: FnMut(&'a Expr),
{
    let mut on_stmt = |s: &'a Stmt| -> Descend {
        match s {
            Stmt::If(node) => each_subexpr(&node.cond, visit),
            Stmt::While(node) => each_subexpr(&node.cond, visit),
            Stmt::DoWhile(node) => each_subexpr(&node.cond, visit),
            Stmt::For(node) => {
                for init in &node.init {
                    match init {
                        ForInit::Decl(decl) => {
                            for frag in &decl.frags {
                                if let Some(expr) = &frag.init {
                                    each_subexpr(expr, visit);
                                }
                            }
                        }
                        ForInit::Expr(expr) => each_subexpr(expr, visit),
                    }
                }
                if let Some(cond) = &node.cond {
                    each_subexpr(cond, visit);
                }
                for update in &node.update {
                    each_subexpr(update, visit);
                }
            }
            Stmt::ForEach(node) => each_subexpr(&node.iterable, visit),
            Stmt::VarDecl(node) => {
                for frag in &node.frags {
                    if let Some(expr) = &frag.init {
                        each_subexpr(expr, visit);
                    }
                }
            }
            Stmt::Expr(node) => each_subexpr(&node.expr, visit),
            Stmt::Return(node) => {
                if let Some(expr) = &node.value {
                    each_subexpr(expr, visit);
                }
            }
            Stmt::Throw(node) => each_subexpr(&node.value, visit),
            Stmt::Switch(node) => {
                each_subexpr(&node.scrutinee, visit);
                for case in &node.cases {
                    for label in &case.labels {
                        each_subexpr(label, visit);
                    }
                }
            }
            Stmt::Block(_)
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Empty(_)
            | Stmt::Error(_) => {}
        }
        Descend::Children
    };
    each_stmt(std::slice::from_ref(stmt), &mut on_stmt);
}

/// One link of an `if`/`else if` chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainLink<'a> {
    /// The link's guard.
    pub cond: &'a Expr,
    /// The link's then-body.
    pub body: &'a Stmt,
}

/// A structurally linked `if`/`else if`/.../`else` run, walked from its
/// topmost head. Callers start chains only at heads the traversal reaches
/// directly — an `else if` link is only reachable through its parent, so a
/// consumed chain is never re-entered in the middle.
#[derive(Debug)]
pub struct IfChain<'a> {
    /// Range of the head statement (covers the whole chain).
    pub span: Span,
    /// Guarded links in source order.
    pub links: Vec<ChainLink<'a>>,
    /// Trailing unguarded `else` body, if any.
    pub tail_else: Option<&'a Stmt>,
}

impl<'a> IfChain<'a> {
    /// Collect the chain hanging off `head`.
    #[must_use]
    pub fn from_head(head: &'a IfStmt) -> Self {
        let mut links = Vec::new();
        let mut tail_else = None;
        let mut current = head;
        loop {
            links.push(ChainLink {
                cond: &current.cond,
                body: &current.then_branch,
            });
            match current.else_branch.as_deref() {
                Some(Stmt::If(next)) => current = next,
                Some(other) => {
                    tail_else = Some(other);
                    break;
                }
                None => break,
            }
        }
        Self {
            span: head.span,
            links,
            tail_else,
        }
    }

    /// Number of guarded links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the chain has no links (never true for a real chain).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
