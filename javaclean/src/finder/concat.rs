//! String-concatenation merging.
//!
//! A `+` chain opening with a string literal is merged: all-literal chains
//! collapse into one literal (or a text block when the value is clearly
//! multi-line), and chains that mix literals with dynamic operands become a
//! `MessageFormat.format` call with the literals folded into the pattern.
//!
//! Localization tags gate every merge: a chain whose literals are partly
//! tagged and partly untagged is never touched. An all-tagged chain is
//! merged only when the surplus tag comments can be deleted cleanly.

use crate::ast::{BinOp, Expr, Lit, LiteralExpr, SourceTree, Span};
use crate::comments::{tag_consistency, Comment};
use crate::config::CleanUpOptions;
use crate::edit::{EditScript, RewriteOperation};
use crate::finder::{each_expr_in_stmt, each_stmt, CleanUp, Descend, FixContext};
use crate::imports::ImportManager;
use crate::utils::{indent_at, LineIndex};

/// The concatenation-merge family.
#[derive(Debug, Default)]
pub struct ConcatCleanUp;

impl CleanUp for ConcatCleanUp {
    fn name(&self) -> &'static str {
        "merge-string-concat"
    }

    fn label(&self) -> &'static str {
        "Merge string concatenation"
    }

    fn find(
        &self,
        tree: &SourceTree,
        options: &CleanUpOptions,
        comments: &[Comment],
        ctx: &mut FixContext,
    ) -> EditScript {
        let mut script = EditScript::new();
        if !options.merge_string_concat {
            return script;
        }
        each_stmt(&tree.body, &mut |stmt| {
            if ctx.is_consumed(stmt.span()) {
                return Descend::Skip;
            }
            each_expr_in_stmt(stmt, &mut |expr| {
                if ctx.is_consumed(expr.span()) {
                    return;
                }
                let Expr::Binary(bin) = expr else {
                    return;
                };
                if bin.op != BinOp::Add {
                    return;
                }
                if let Some(ops) = try_merge(tree, comments, expr, ctx) {
                    for op in ops {
                        script.push(op);
                    }
                    ctx.consume(expr.span());
                }
            });
            Descend::Children
        });
        script
    }
}

/// One operand of a flattened `+` chain.
enum Operand<'a> {
    Str(&'a LiteralExpr),
    Dynamic(&'a Expr),
}

fn flatten<'a>(expr: &'a Expr, out: &mut Vec<Operand<'a>>) {
    if let Expr::Binary(bin) = expr {
        if bin.op == BinOp::Add {
            flatten(&bin.lhs, out);
            flatten(&bin.rhs, out);
            return;
        }
    }
    match expr {
        Expr::Literal(lit) if matches!(lit.value, Lit::Str(_)) => out.push(Operand::Str(lit)),
        other => out.push(Operand::Dynamic(other)),
    }
}

fn try_merge(
    tree: &SourceTree,
    comments: &[Comment],
    chain: &Expr,
    ctx: &mut FixContext,
) -> Option<Vec<RewriteOperation>> {
    let mut operands = Vec::new();
    flatten(chain, &mut operands);

    // The chain is only unambiguously string concatenation when it opens
    // with a string literal; `1 + 2 + "a"` adds numerically first.
    if !matches!(operands.first(), Some(Operand::Str(_))) {
        return None;
    }
    let literal_spans: Vec<Span> = operands
        .iter()
        .filter_map(|op| match op {
            Operand::Str(lit) => Some(lit.span),
            Operand::Dynamic(_) => None,
        })
        .collect();
    if literal_spans.len() < 2 {
        return None;
    }

    // All-or-none tag policy; a mixed chain aborts this site only.
    let tagged = tag_consistency(&tree.source, comments, &literal_spans)?;

    let all_literal = operands
        .iter()
        .all(|op| matches!(op, Operand::Str(_)));

    if tagged {
        if !all_literal {
            // A tag references its literal by line ordinal; folding tagged
            // literals into a format pattern would orphan the tags.
            return None;
        }
        return merge_tagged_literals(tree, comments, chain, &operands, &literal_spans);
    }

    if all_literal {
        let merged = merged_value(&operands);
        let text = render_literal(tree, chain.span(), &merged);
        return Some(vec![RewriteOperation::verbatim_splice(
            "Merge string literals",
            chain.span(),
            text,
        )]);
    }

    message_format_call(tree, chain, &operands, ctx)
}

fn merged_value(operands: &[Operand<'_>]) -> String {
    let mut merged = String::new();
    for op in operands {
        if let Operand::Str(lit) = op {
            if let Lit::Str(s) = &lit.value {
                merged.push_str(s);
            }
        }
    }
    merged
}

/// Render a merged all-literal value: a text block when the value is
/// clearly multi-line and needs no escaping, a plain literal otherwise.
fn render_literal(tree: &SourceTree, site: Span, value: &str) -> String {
    let newlines = value.matches('\n').count();
    if newlines >= 2 && !value.contains('"') && !value.contains('\\') {
        let indent = indent_at(&tree.source, site.start);
        let mut block = String::from("\"\"\"\n");
        for line in value.split_inclusive('\n') {
            block.push_str(indent);
            block.push_str("    ");
            block.push_str(line.trim_end_matches('\n'));
            if line.ends_with('\n') {
                block.push('\n');
            }
        }
        block.push_str(indent);
        block.push_str("    \"\"\"");
        return block;
    }
    crate::ast::printer::quote_str(value)
}

/// Merge an all-tagged, all-literal chain. The literals must share one line
/// with the first at ordinal 1; the surplus tag comments are deleted so the
/// single remaining `$NON-NLS-1$` still points at the merged literal.
fn merge_tagged_literals(
    tree: &SourceTree,
    comments: &[Comment],
    chain: &Expr,
    operands: &[Operand<'_>],
    literal_spans: &[Span],
) -> Option<Vec<RewriteOperation>> {
    let index = LineIndex::new(&tree.source);
    let line = index.line_of(literal_spans[0].start);
    if literal_spans.iter().any(|s| index.line_of(s.start) != line) {
        return None;
    }
    if crate::comments::string_literal_ordinal(&tree.source, literal_spans[0]) != 1 {
        return None;
    }

    let mut ops = vec![RewriteOperation::verbatim_splice(
        "Merge string literals",
        chain.span(),
        crate::ast::printer::quote_str(&merged_value(operands)),
    )];
    for comment in comments {
        if comment.line != line || !comment.has_nls_tag(&tree.source) {
            continue;
        }
        let tags = comment.nls_tags(&tree.source);
        if tags == [1] {
            continue;
        }
        if tags.contains(&1) {
            // A trailing `//$NON-NLS-1$ //$NON-NLS-2$ ...` scans as one
            // comment; rewrite it down to the surviving tag.
            ops.push(RewriteOperation::verbatim_splice(
                "Drop surplus NLS tags",
                comment.span,
                "//$NON-NLS-1$",
            ));
            continue;
        }
        // Targeting exactly the comment span marks this as a deliberate
        // comment edit for the preservation filter.
        ops.push(RewriteOperation::verbatim_splice(
            "Drop surplus NLS tag",
            comment.span,
            "",
        ));
    }
    Some(ops)
}

/// Fold a mixed chain into `MessageFormat.format(pattern, args...)`.
fn message_format_call(
    tree: &SourceTree,
    chain: &Expr,
    operands: &[Operand<'_>],
    ctx: &mut FixContext,
) -> Option<Vec<RewriteOperation>> {
    let mut pattern = String::new();
    let mut args = Vec::new();
    for op in operands {
        match op {
            Operand::Str(lit) => {
                let Lit::Str(s) = &lit.value else {
                    return None;
                };
                // MessageFormat has its own quoting rules for these.
                if s.contains('{') || s.contains('}') || s.contains('\'') {
                    return None;
                }
                pattern.push_str(s);
            }
            Operand::Dynamic(expr) => {
                pattern.push('{');
                pattern.push_str(&args.len().to_string());
                pattern.push('}');
                args.push(tree.text(expr.span()));
            }
        }
    }

    let type_name = ctx
        .imports
        .ensure_import_available("java.text.MessageFormat");
    let mut call = format!(
        "{type_name}.format({}",
        crate::ast::printer::quote_str(&pattern)
    );
    for arg in args {
        call.push_str(", ");
        call.push_str(arg);
    }
    call.push(')');
    Some(vec![RewriteOperation::verbatim_splice(
        "Use MessageFormat",
        chain.span(),
        call,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::scan_comments;
    use crate::test_utils::parse;

    fn run(source: &str) -> (String, FixContext) {
        let tree = parse(source).expect("should parse");
        let options = CleanUpOptions {
            merge_string_concat: true,
            ..CleanUpOptions::default()
        };
        let comments = scan_comments(source);
        let mut ctx = FixContext::new();
        let script = ConcatCleanUp.find(&tree, &options, &comments, &mut ctx);
        (script.realize(source).expect("should realize"), ctx)
    }

    #[test]
    fn test_all_literal_chain_merges() {
        let (out, _) = run("String s = \"a\" + \"b\" + \"c\";");
        assert_eq!(out, "String s = \"abc\";");
    }

    #[test]
    fn test_mixed_chain_becomes_message_format() {
        let (out, ctx) = run("String s = \"a\" + \"b\" + x;");
        assert_eq!(out, "String s = MessageFormat.format(\"ab{0}\", x);");
        assert_eq!(ctx.imports.added(), vec!["java.text.MessageFormat"]);
    }

    #[test]
    fn test_mixed_tags_reject_merge() {
        let source = "String s = \"a\" //$NON-NLS-1$\n + \"b\" + x;";
        let (out, _) = run(source);
        assert_eq!(out, source);
    }

    #[test]
    fn test_all_tagged_literals_merge_and_drop_surplus_tags() {
        let source = "String s = \"a\" + \"b\"; //$NON-NLS-1$ //$NON-NLS-2$";
        let (out, _) = run(source);
        assert_eq!(out, "String s = \"ab\"; //$NON-NLS-1$");
    }

    #[test]
    fn test_numeric_prefix_is_not_string_concat() {
        let source = "String s = 1 + 2 + \"a\" + \"b\";";
        let (out, _) = run(source);
        assert_eq!(out, source);
    }

    #[test]
    fn test_single_literal_chain_left_alone() {
        let source = "String s = \"a\" + x;";
        let (out, _) = run(source);
        assert_eq!(out, source);
    }

    #[test]
    fn test_multiline_value_becomes_text_block() {
        let (out, _) = run("String s = \"one\\n\" + \"two\\n\" + \"three\\n\";");
        assert_eq!(
            out,
            "String s = \"\"\"\n    one\n    two\n    three\n    \"\"\";"
        );
    }
}
