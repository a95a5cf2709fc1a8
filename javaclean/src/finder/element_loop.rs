//! Indexed-loop to element-loop conversion.
//!
//! A matching counted `for` is replaced wholesale by a verbatim fragment:
//! a synthesized enhanced-for header followed by the original body text
//! with the element accesses substituted. Carrying the body bytes forward
//! keeps its interior comments and formatting untouched.

use crate::ast::{printer::type_text, Expr, ForStmt, SourceTree, Span, Stmt, VarDeclStmt};
use crate::comments::Comment;
use crate::config::CleanUpOptions;
use crate::edit::{EditScript, RewriteBuffer, RewriteOperation, TextEdit};
use crate::finder::{each_stmt, CleanUp, Descend, FixContext};
use crate::naming::{propose_element_name, visible_names, LinkedProposalGroup};
use crate::safety::loop_shape::{match_header, scan_body, BodyScan, LoopShape};

/// The indexed-loop conversion family.
#[derive(Debug, Default)]
pub struct ElementLoopCleanUp;

impl CleanUp for ElementLoopCleanUp {
    fn name(&self) -> &'static str {
        "element-loop"
    }

    fn label(&self) -> &'static str {
        "Convert to enhanced for loop"
    }

    fn find(
        &self,
        tree: &SourceTree,
        options: &CleanUpOptions,
        _comments: &[Comment],
        ctx: &mut FixContext,
    ) -> EditScript {
        let mut script = EditScript::new();
        if !options.convert_indexed_loops {
            return script;
        }
        each_stmt(&tree.body, &mut |stmt| {
            if ctx.is_consumed(stmt.span()) {
                return Descend::Skip;
            }
            if let Stmt::For(node) = stmt {
                if let Some(op) = try_convert(tree, node, ctx) {
                    script.push(op);
                    ctx.consume(node.span);
                    return Descend::Skip;
                }
            }
            Descend::Children
        });
        script
    }
}

fn try_convert(tree: &SourceTree, node: &ForStmt, ctx: &mut FixContext) -> Option<RewriteOperation> {
    let shape = match_header(tree, node).ok()?;
    let scan = scan_body(tree, &shape, &node.body).ok()?;

    // When the body's first action declares the element, reuse its name and
    // type and drop that statement.
    let reused = first_element_decl(&node.body, &scan);
    let (elem_ty_text, elem_name, group) = match reused {
        Some(decl) => (type_text(&decl.ty), decl.frags[0].name.to_string(), None),
        None => {
            let receiver_name = match shape.receiver {
                Expr::Name(n) => Some(n.name.as_str()),
                _ => None,
            };
            let taken = visible_names(tree);
            let (name, group) = propose_element_name(
                &format!("element_{}", node.span.start),
                node.span,
                receiver_name,
                &shape.element_ty,
                &taken,
                &ctx.excluded_names,
            );
            ctx.exclude_name(&name);
            (type_text(&shape.element_ty), name, Some(group))
        }
    };

    let body = rewrite_body(tree, node, &shape, &scan, reused, &elem_name)?;
    let receiver_text = tree.text(shape.receiver.span());
    let text = format!("for ({elem_ty_text} {elem_name} : {receiver_text}) {body}");

    let op = RewriteOperation::verbatim_splice("Convert to enhanced for loop", node.span, text);
    Some(match group {
        Some(g) => op.with_group(g),
        None => op,
    })
}

/// First statement of a block body when it is `ElementType v = <access>;`.
fn first_element_decl<'a>(body: &'a Stmt, scan: &BodyScan) -> Option<&'a VarDeclStmt> {
    let Stmt::Block(block) = body else {
        return None;
    };
    let Some(Stmt::VarDecl(decl)) = block.stmts.first() else {
        return None;
    };
    let [frag] = decl.frags.as_slice() else {
        return None;
    };
    let init = frag.init.as_ref()?;
    scan.accesses.contains(&init.span()).then_some(decl)
}

/// Original body text with every qualifying access replaced by the element
/// name and the reused declaration, if any, removed.
fn rewrite_body(
    tree: &SourceTree,
    node: &ForStmt,
    _shape: &LoopShape<'_>,
    scan: &BodyScan,
    reused: Option<&VarDeclStmt>,
    elem_name: &str,
) -> Option<String> {
    let body_span = node.body.span();
    let body_text = tree.text(body_span);
    let rel = |span: Span| Span::new(span.start - body_span.start, span.len);

    let removed = reused.map(|decl| {
        // Extend the deletion over trailing whitespace so no blank slot
        // remains where the declaration stood.
        let bytes = tree.source.as_bytes();
        let mut end = decl.span.end();
        while end < body_span.end() - 1 && bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        Span::from_range(decl.span.start, end)
    });

    let mut buffer = RewriteBuffer::new(body_text);
    if let Some(removal) = removed {
        buffer.push(TextEdit::delete(rel(removal)));
    }
    for access in &scan.accesses {
        if removed.is_some_and(|r| r.contains(*access)) {
            continue;
        }
        buffer.push(TextEdit::new(rel(*access), elem_name));
    }
    buffer.apply().ok()
}

/// Linked name-proposal groups attached to a script's operations.
#[must_use]
pub fn collect_groups(script: &EditScript) -> Vec<LinkedProposalGroup> {
    script
        .ops()
        .iter()
        .filter_map(|op| op.linked_group.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::scan_comments;
    use crate::test_utils::parse;

    fn run(source: &str) -> String {
        let tree = parse(source).expect("should parse");
        let options = CleanUpOptions {
            convert_indexed_loops: true,
            ..CleanUpOptions::default()
        };
        let comments = scan_comments(source);
        let mut ctx = FixContext::new();
        let script = ElementLoopCleanUp.find(&tree, &options, &comments, &mut ctx);
        script.realize(source).expect("should realize")
    }

    #[test]
    fn test_array_loop_with_fresh_name() {
        let source = "int[] arr = new int[10];\n\
                      for (int i = 0; i < arr.length; i++) { System.out.println(arr[i]); }";
        assert_eq!(
            run(source),
            "int[] arr = new int[10];\n\
             for (int element : arr) { System.out.println(element); }"
        );
    }

    #[test]
    fn test_first_statement_declaration_is_reused() {
        let source = "int[] arr = new int[10];\n\
                      for (int i = 0; i < arr.length; i++) { int v = arr[i]; use(v); }";
        assert_eq!(
            run(source),
            "int[] arr = new int[10];\nfor (int v : arr) { use(v); }"
        );
    }

    #[test]
    fn test_collection_loop_with_cached_bound() {
        let source = "java.util.List<String> names = x;\n\
                      for (int i = 0, n = names.size(); i < n; i++) { use(names.get(i)); }";
        assert_eq!(
            run(source),
            "java.util.List<String> names = x;\nfor (String name : names) { use(name); }"
        );
    }

    #[test]
    fn test_unsound_body_is_left_alone() {
        let source = "int[] arr = new int[10];\n\
                      for (int i = 0; i < arr.length; i++) { arr[i] = 0; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_fixpoint_after_conversion() {
        let source = "int[] arr = new int[10];\n\
                      for (int i = 0; i < arr.length; i++) { use(arr[i]); }";
        let converted = run(source);
        assert_eq!(run(&converted), converted);
    }

    #[test]
    fn test_body_comment_survives() {
        let source = "int[] arr = new int[10];\n\
                      for (int i = 0; i < arr.length; i++) { /* each */ use(arr[i]); }";
        assert_eq!(
            run(source),
            "int[] arr = new int[10];\nfor (int element : arr) { /* each */ use(element); }"
        );
    }

    #[test]
    fn test_proposal_group_offers_alternatives() {
        let source = "java.util.List<String> names = x;\n\
                      for (int i = 0; i < names.size(); i++) { use(names.get(i)); }";
        let tree = parse(source).expect("should parse");
        let options = CleanUpOptions {
            convert_indexed_loops: true,
            ..CleanUpOptions::default()
        };
        let comments = scan_comments(source);
        let mut ctx = FixContext::new();
        let script = ElementLoopCleanUp.find(&tree, &options, &comments, &mut ctx);
        let groups = collect_groups(&script);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].first(), Some("name"));
        // The chosen name is reserved for later operations in the pass.
        assert!(ctx.excluded_names.contains("name"));
    }
}
