//! Brace/block safety for control-statement bodies.
//!
//! Removing the braces around a single-statement body is only legal when no
//! brace-less inner `if` could capture an `else` that currently binds to a
//! different conditional. The hazard runs both ways: the owning `if`'s own
//! `else` can be stolen by the unblocked content, and the unblocked content
//! can steal an `else` that textually belongs to an ancestor reached through
//! a chain of single-statement-bodied constructs.

use crate::ast::{Block, Span, Stmt};
use crate::finder::Verdict;
use rustc_hash::FxHashSet;

/// Where the candidate block sits in its owning control statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySlot {
    /// Then-branch of an `if`.
    IfThen {
        /// Whether the owning `if` has an `else` branch.
        has_else: bool,
    },
    /// Else-branch of an `if`.
    IfElse,
    /// Body of a `while`, `do`, `for`, or enhanced `for`.
    Loop,
}

/// One construct on the path from the root down to the owning statement,
/// innermost last. The chain only extends while each construct's body is
/// directly the next element; a brace-delimited block breaks it with
/// [`Ancestor::Sealed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ancestor {
    /// An `if` whose then-branch continues the chain.
    IfThen {
        /// Whether that `if` has an `else` branch.
        has_else: bool,
    },
    /// An `if` whose else-branch continues the chain.
    IfElse,
    /// A loop whose body continues the chain.
    Loop,
    /// A block or any other multi-statement context. Stops the walk.
    Sealed,
}

/// Whether `stmt`, considered unblocked, resolves as an `if` that a
/// following `else` could bind to.
///
/// The walk descends through single-statement loop bodies and stops at the
/// first `if` it reaches. `transparent` holds the spans of blocks already
/// scheduled for unblocking in the same pass; the walk looks through those
/// as if their braces were gone.
#[must_use]
pub fn ends_in_dangling_if(stmt: &Stmt, transparent: &FxHashSet<Span>) -> bool {
    match stmt {
        Stmt::If(_) => true,
        Stmt::While(s) => ends_in_dangling_if(&s.body, transparent),
        Stmt::DoWhile(s) => ends_in_dangling_if(&s.body, transparent),
        Stmt::For(s) => ends_in_dangling_if(&s.body, transparent),
        Stmt::ForEach(s) => ends_in_dangling_if(&s.body, transparent),
        Stmt::Block(b) if transparent.contains(&b.span) => match b.stmts.as_slice() {
            [sole] => ends_in_dangling_if(sole, transparent),
            _ => false,
        },
        _ => false,
    }
}

/// Upward half of the hazard: does any enclosing single-statement-bodied
/// `if` hold an `else` the unblocked content could capture?
#[must_use]
pub fn else_reachable_above(ancestors: &[Ancestor]) -> bool {
    for ancestor in ancestors.iter().rev() {
        match ancestor {
            Ancestor::IfThen { has_else: true } => return true,
            Ancestor::IfThen { has_else: false } | Ancestor::IfElse | Ancestor::Loop => {}
            Ancestor::Sealed => return false,
        }
    }
    false
}

/// Decide whether the braces of `block` may be removed.
///
/// `slot` is the block's position in its owning statement, `ancestors` the
/// construct chain above the owning statement (innermost last), and
/// `transparent` the blocks already scheduled for unblocking in the same
/// pass (empty for a single interactive suggestion).
#[must_use]
pub fn can_remove_braces(
    block: &Block,
    slot: BodySlot,
    ancestors: &[Ancestor],
    transparent: &FxHashSet<Span>,
) -> Verdict {
    let [inner] = block.stmts.as_slice() else {
        return Verdict::Reject("body is not a single statement");
    };
    if inner.is_error() {
        return Verdict::Reject("parser-recovered region");
    }
    if matches!(inner, Stmt::VarDecl(_)) {
        return Verdict::Reject("a declaration cannot stand as an unbraced body");
    }

    if !ends_in_dangling_if(inner, transparent) {
        return Verdict::Accept;
    }
    match slot {
        BodySlot::IfThen { has_else: true } => {
            Verdict::Reject("an inner if would capture the else")
        }
        BodySlot::IfThen { has_else: false } | BodySlot::IfElse | BodySlot::Loop => {
            if else_reachable_above(ancestors) {
                Verdict::Reject("an inner if would capture an enclosing else")
            } else {
                Verdict::Accept
            }
        }
    }
}
