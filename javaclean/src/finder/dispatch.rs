//! Chained-conditional to `switch` conversion.
//!
//! An `if`/`else if` run whose guards all test one stable scrutinee of a
//! switch-legal type against constants becomes a `switch` statement. Chains
//! are walked from their topmost unconsumed head; a rejected head leaves
//! its `else if` links free to match as shorter chains of their own.
//!
//! Only the statement form is synthesized here. Branches that mix
//! `return`-ending and fall-through bodies stay eligible: each case gets a
//! `break;` exactly when its body falls through.

use crate::ast::{BinOp, Expr, Lit, SourceTree, Span, Stmt, Type, UnOp};
use crate::comments::Comment;
use crate::config::CleanUpOptions;
use crate::edit::{EditScript, RewriteOperation};
use crate::finder::{
    each_expr_in_stmt, each_stmt, CleanUp, ChainLink, Descend, FixContext, IfChain,
};
use crate::format::reindent;
use crate::utils::indent_at;

/// The multi-way-dispatch family.
#[derive(Debug, Default)]
pub struct DispatchCleanUp;

impl CleanUp for DispatchCleanUp {
    fn name(&self) -> &'static str {
        "if-chain-to-switch"
    }

    fn label(&self) -> &'static str {
        "Convert if/else chain to switch"
    }

    fn find(
        &self,
        tree: &SourceTree,
        options: &CleanUpOptions,
        _comments: &[Comment],
        ctx: &mut FixContext,
    ) -> EditScript {
        let mut script = EditScript::new();
        if !options.if_chain_to_switch {
            return script;
        }
        each_stmt(&tree.body, &mut |stmt| {
            if ctx.is_consumed(stmt.span()) {
                return Descend::Skip;
            }
            if let Stmt::If(head) = stmt {
                let chain = IfChain::from_head(head);
                if let Some(op) = try_convert(tree, &chain, options) {
                    script.push(op);
                    ctx.consume(chain.span);
                    return Descend::Skip;
                }
            }
            Descend::Children
        });
        script
    }
}

fn try_convert(
    tree: &SourceTree,
    chain: &IfChain<'_>,
    options: &CleanUpOptions,
) -> Option<RewriteOperation> {
    let branch_count = chain.len() + usize::from(chain.tail_else.is_some());
    if branch_count < options.min_switch_branches {
        return None;
    }

    // The first test fixes the scrutinee; every other guard must test the
    // same reference.
    let first_tests = split_or(chain.links[0].cond);
    let (scrutinee, _) = equality_parts(first_tests.first()?)?;

    // A switch only accepts int-family, char, and String scrutinees. A
    // chain over long, float, double, or boolean has no switch form, and an
    // unresolved type cannot be proven to have one.
    let ty = scrutinee_type(tree, scrutinee);
    let int_family = matches!(&ty, Type::Int | Type::Short | Type::Byte | Type::Char);
    let string_scrutinee = matches!(&ty, Type::Named { simple, .. } if simple == "String");
    if !int_family && !string_scrutinee {
        return None;
    }

    let mut cases: Vec<(Vec<&Expr>, &ChainLink<'_>)> = Vec::new();
    let mut seen_labels: Vec<&Lit> = Vec::new();
    for link in &chain.links {
        let mut labels = Vec::new();
        for test in split_or(link.cond) {
            let (scrut, label) = equality_parts(test)?;
            if !crate::ast::same_reference(scrut, scrutinee) {
                return None;
            }
            let Expr::Literal(lit) = label else {
                return None;
            };
            let fits = match lit.value {
                Lit::Int(_) | Lit::Char(_) => int_family,
                Lit::Str(_) => string_scrutinee,
                _ => false,
            };
            if !fits {
                return None;
            }
            // A duplicate constant is unreachable in the chain but illegal
            // in a switch.
            if seen_labels.contains(&&lit.value) {
                return None;
            }
            seen_labels.push(&lit.value);
            labels.push(label);
        }
        cases.push((labels, link));
    }

    // The chain re-evaluates the scrutinee per guard; a switch evaluates it
    // once, so no body may write it.
    for link in &chain.links {
        if writes_to(link.body, scrutinee) {
            return None;
        }
    }
    if let Some(tail) = chain.tail_else {
        if writes_to(tail, scrutinee) {
            return None;
        }
    }

    let indent = indent_at(&tree.source, chain.span.start).to_owned();
    let deeper = format!("{indent}{}", options.indent_unit);
    let mut out = format!("switch ({}) {{\n", tree.text(scrutinee.span()));
    for (labels, link) in &cases {
        for label in labels {
            out.push_str(&format!("{indent}case {}:\n", tree.text(label.span())));
        }
        out.push_str(&body_lines(tree, link.body, &deeper));
        if !link.body.ends_abruptly() {
            out.push_str(&format!("{deeper}break;\n"));
        }
    }
    if let Some(tail) = chain.tail_else {
        out.push_str(&format!("{indent}default:\n"));
        out.push_str(&body_lines(tree, tail, &deeper));
    }
    out.push_str(&indent);
    out.push('}');

    Some(RewriteOperation::verbatim_splice(
        "Convert if/else chain to switch",
        chain.span,
        out,
    ))
}

/// `scrutinee == constant` (either side) or `scrutinee.equals("literal")`.
fn equality_parts(expr: &Expr) -> Option<(&Expr, &Expr)> {
    match expr {
        Expr::Binary(bin) if bin.op == BinOp::Eq => {
            if is_stable(&bin.lhs) && is_case_constant(&bin.rhs) {
                Some((&bin.lhs, &bin.rhs))
            } else if is_case_constant(&bin.lhs) && is_stable(&bin.rhs) {
                Some((&bin.rhs, &bin.lhs))
            } else {
                None
            }
        }
        Expr::Call(call) if call.name == "equals" => {
            let receiver = call.receiver.as_deref()?;
            let [arg] = call.args.as_slice() else {
                return None;
            };
            (is_stable(receiver) && matches!(arg, Expr::Literal(l) if matches!(l.value, Lit::Str(_))))
                .then_some((receiver, arg))
        }
        _ => None,
    }
}

/// Declared type of the scrutinee, `Type::Unknown` when the reference is
/// anything other than a resolved simple name.
fn scrutinee_type(tree: &SourceTree, scrutinee: &Expr) -> Type {
    match scrutinee {
        Expr::Name(n) => n
            .binding
            .map_or(Type::Unknown, |id| tree.bindings.type_of(id)),
        _ => Type::Unknown,
    }
}

/// Side-effect-free scrutinee shapes: a resolved name or a field chain.
fn is_stable(expr: &Expr) -> bool {
    match expr {
        Expr::Name(n) => n.binding.is_some(),
        Expr::Field(f) => is_stable(&f.object),
        _ => false,
    }
}

/// Constants a `case` label can carry when compared with `==`.
fn is_case_constant(expr: &Expr) -> bool {
    matches!(expr, Expr::Literal(l) if matches!(l.value, Lit::Int(_) | Lit::Char(_)))
}

/// Split an `a || b || c` guard into its tests.
fn split_or(cond: &Expr) -> Vec<&Expr> {
    let mut tests = Vec::new();
    fn go<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
        if let Expr::Binary(bin) = expr {
            if bin.op == BinOp::Or {
                go(&bin.lhs, out);
                go(&bin.rhs, out);
                return;
            }
        }
        out.push(expr);
    }
    go(cond, &mut tests);
    tests
}

/// Whether any expression in `stmt` assigns or steps `target`. Pure reads
/// under `!` or unary `-` do not count.
fn writes_to(stmt: &Stmt, target: &Expr) -> bool {
    let mut found = false;
    each_expr_in_stmt(stmt, &mut |expr| {
        found = found
            || match expr {
                Expr::Assign(a) => crate::ast::same_reference(&a.target, target),
                Expr::Unary(u) => {
                    matches!(u.op, UnOp::PreInc | UnOp::PreDec)
                        && crate::ast::same_reference(&u.operand, target)
                }
                Expr::Postfix(p) => crate::ast::same_reference(&p.operand, target),
                _ => false,
            };
    });
    found
}

/// A branch body rendered as switch-case lines at `indent`, interior
/// comments included.
fn body_lines(tree: &SourceTree, body: &Stmt, indent: &str) -> String {
    let (text, old_indent) = match body {
        Stmt::Block(block) => {
            let Some(first) = block.stmts.first() else {
                return String::new();
            };
            let interior =
                tree.source[block.span.start + 1..block.span.end() - 1].trim();
            (interior, indent_at(&tree.source, first.span().start))
        }
        other => (
            tree.text(other.span()),
            indent_at(&tree.source, other.span().start),
        ),
    };
    if text.is_empty() {
        return String::new();
    }
    format!("{indent}{}\n", reindent(text, old_indent, indent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::scan_comments;
    use crate::test_utils::parse;

    fn run(source: &str) -> String {
        let tree = parse(source).expect("should parse");
        let options = CleanUpOptions {
            if_chain_to_switch: true,
            ..CleanUpOptions::default()
        };
        let comments = scan_comments(source);
        let mut ctx = FixContext::new();
        let script = DispatchCleanUp.find(&tree, &options, &comments, &mut ctx);
        script.realize(source).expect("should realize")
    }

    #[test]
    fn test_int_chain_converts() {
        let source = "int x = 0;\n\
                      if (x == 1) { a(); } else if (x == 2) { b(); } else { c(); }";
        assert_eq!(
            run(source),
            "int x = 0;\n\
             switch (x) {\n\
             case 1:\n    a();\n    break;\n\
             case 2:\n    b();\n    break;\n\
             default:\n    c();\n\
             }"
        );
    }

    #[test]
    fn test_or_guard_becomes_label_list() {
        let source = "int x = 0;\n\
                      if (x == 1 || x == 2) { a(); } else if (x == 3) { b(); } else { c(); }";
        assert_eq!(
            run(source),
            "int x = 0;\n\
             switch (x) {\n\
             case 1:\ncase 2:\n    a();\n    break;\n\
             case 3:\n    b();\n    break;\n\
             default:\n    c();\n\
             }"
        );
    }

    #[test]
    fn test_return_bodies_get_no_break() {
        let source = "int x = 0;\n\
                      if (x == 1) { return; } else if (x == 2) { return; } else { c(); }";
        assert_eq!(
            run(source),
            "int x = 0;\n\
             switch (x) {\n\
             case 1:\n    return;\n\
             case 2:\n    return;\n\
             default:\n    c();\n\
             }"
        );
    }

    #[test]
    fn test_string_equals_chain_converts() {
        let source = "String s = \"\";\n\
                      if (s.equals(\"a\")) { a(); } else if (s.equals(\"b\")) { b(); } else { c(); }";
        assert_eq!(
            run(source),
            "String s = \"\";\n\
             switch (s) {\n\
             case \"a\":\n    a();\n    break;\n\
             case \"b\":\n    b();\n    break;\n\
             default:\n    c();\n\
             }"
        );
    }

    #[test]
    fn test_short_chain_left_alone() {
        let source = "int x = 0;\nif (x == 1) { a(); } else { b(); }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_mismatched_scrutinee_left_alone() {
        let source = "int x = 0;\nint y = 0;\n\
                      if (x == 1) { a(); } else if (y == 2) { b(); } else { c(); }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_scrutinee_write_in_body_left_alone() {
        let source = "int x = 0;\n\
                      if (x == 1) { x = 2; } else if (x == 2) { b(); } else { c(); }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_duplicate_labels_left_alone() {
        let source = "int x = 0;\n\
                      if (x == 1) { a(); } else if (x == 1) { b(); } else { c(); }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_long_scrutinee_left_alone() {
        // No switch form exists for a long scrutinee.
        let source = "long x = 0;\n\
                      if (x == 1) { a(); } else if (x == 2) { b(); } else { c(); }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_double_scrutinee_left_alone() {
        let source = "double x = 0;\n\
                      if (x == 1) { a(); } else if (x == 2) { b(); } else { c(); }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_unresolved_scrutinee_type_left_alone() {
        // A field chain resolves to no declared type; without one the
        // conversion cannot be proven legal.
        let source = "Point p = new Point();\n\
                      if (p.x == 1) { a(); } else if (p.x == 2) { b(); } else { c(); }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_negated_read_is_not_a_write() {
        let source = "int x = 0;\n\
                      if (x == 1) { a(-x); } else if (x == 2) { b(); } else { c(); }";
        assert_eq!(
            run(source),
            "int x = 0;\n\
             switch (x) {\n\
             case 1:\n    a(-x);\n    break;\n\
             case 2:\n    b();\n    break;\n\
             default:\n    c();\n\
             }"
        );
    }

    #[test]
    fn test_increment_in_body_left_alone() {
        let source = "int x = 0;\n\
                      if (x == 1) { ++x; } else if (x == 2) { b(); } else { c(); }";
        assert_eq!(run(source), source);
    }
}
