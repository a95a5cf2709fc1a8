//! Shape and soundness analysis for indexed-loop conversion.
//!
//! A counted `for` loop may be rewritten as an element loop only when the
//! header matches one canonical shape exactly and a restricted body
//! traversal proves the index is used purely as an element access. Any
//! deviation rejects the whole site; there is no partial match.

use crate::ast::{
    same_reference, AssignOp, BinOp, BindingId, Expr, ForInit, ForStmt, Lit, PostOp, SourceTree,
    Span, Stmt, Type, UnOp,
};
use crate::finder::{each_stmt, Descend, Verdict};

/// Whether the iterated receiver is an array or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    /// Array; accesses look like `receiver[index]`, bound is `.length`.
    Array,
    /// Collection family; accesses look like `receiver.get(index)`,
    /// bound is `.size()`.
    Collection,
}

/// Structural facts extracted from a matching loop header.
#[derive(Debug)]
pub struct LoopShape<'a> {
    /// The index variable.
    pub index: BindingId,
    /// The iterated receiver expression from the bound query.
    pub receiver: &'a Expr,
    /// Array or collection.
    pub kind: ReceiverKind,
    /// Second initializer fragment caching the bound, when present.
    pub cached_bound: Option<BindingId>,
    /// Element type of the receiver.
    pub element_ty: Type,
}

/// Match the canonical counted-loop header.
///
/// Required shape: `for (int i = 0; i < receiver.length; i++)` with the
/// documented variants for the bound test (`>`/`!=`, cached bound variable)
/// and the updater (`++i`, `i += 1`, `i = i + 1`, `i = 1 + i`).
pub fn match_header<'a>(tree: &SourceTree, for_stmt: &'a ForStmt) -> Result<LoopShape<'a>, Verdict> {
    let [ForInit::Decl(decl)] = for_stmt.init.as_slice() else {
        return Err(Verdict::Reject("initializer is not a single declaration"));
    };
    if decl.ty != Type::Int {
        return Err(Verdict::Reject("index is not declared int"));
    }
    let (index_frag, cached_frag) = match decl.frags.as_slice() {
        [index] => (index, None),
        [index, cached] => (index, Some(cached)),
        _ => return Err(Verdict::Reject("too many initializer fragments")),
    };
    if !matches!(
        index_frag.init,
        Some(Expr::Literal(ref lit)) if lit.value == Lit::Int(0)
    ) {
        return Err(Verdict::Reject("index does not start at literal 0"));
    }
    let index = index_frag.binding;

    // A cached fragment must itself be a bound query on the receiver.
    let cached = match cached_frag {
        None => None,
        Some(frag) => {
            let Some(init) = &frag.init else {
                return Err(Verdict::Reject("cached bound has no initializer"));
            };
            let Some((receiver, member)) = as_bound_query(init) else {
                return Err(Verdict::Reject("second fragment is not a bound query"));
            };
            Some((frag.binding, receiver, member))
        }
    };

    let Some(cond) = &for_stmt.cond else {
        return Err(Verdict::Reject("loop has no bound test"));
    };
    let bound_expr = normalized_bound(cond, index)
        .ok_or(Verdict::Reject("bound test is not index-against-bound"))?;

    // Resolve the bound to a receiver and the queried member name. With a
    // cached fragment the test must reference the cached variable; without
    // one it must be an inline query.
    let (receiver, member) = match (cached, bound_expr) {
        (Some((cached_id, receiver, member)), Expr::Name(name)) => {
            if name.binding != Some(cached_id) {
                return Err(Verdict::Reject("bound test ignores the cached bound"));
            }
            (receiver, member)
        }
        (Some(_), _) => return Err(Verdict::Reject("bound test ignores the cached bound")),
        (None, bound) => {
            let Some((receiver, member)) = as_bound_query(bound) else {
                return Err(Verdict::Reject("bound is not a length/size query"));
            };
            (receiver, member)
        }
    };

    let kind = match tree.type_of(receiver) {
        Type::Array(_) => {
            if member != "length" {
                return Err(Verdict::Reject("array bound must be .length"));
            }
            ReceiverKind::Array
        }
        ty if ty.is_collection() => {
            if member != "size" {
                return Err(Verdict::Reject("collection bound must be .size()"));
            }
            ReceiverKind::Collection
        }
        Type::Unknown => return Err(Verdict::CannotCompute("receiver type unresolved")),
        _ => return Err(Verdict::Reject("receiver is neither array nor collection")),
    };
    let element_ty = tree
        .type_of(receiver)
        .element_type()
        .ok_or(Verdict::CannotCompute("no element type"))?;

    let [update] = for_stmt.update.as_slice() else {
        return Err(Verdict::Reject("updater is not a single expression"));
    };
    if !is_unit_increment(update, index) {
        return Err(Verdict::Reject("updater is not a unit increment"));
    }

    Ok(LoopShape {
        index,
        receiver,
        kind,
        cached_bound: cached.map(|(id, _, _)| id),
        element_ty,
    })
}

/// `receiver.length` or `receiver.size()` with the queried member name.
fn as_bound_query(expr: &Expr) -> Option<(&Expr, &str)> {
    match expr {
        Expr::Field(field) if field.name == "length" => Some((&field.object, "length")),
        Expr::Call(call) if call.name == "size" && call.args.is_empty() => {
            call.receiver.as_deref().map(|r| (r, "size"))
        }
        _ => None,
    }
}

/// Extract the bound side of `index < bound` and its commuted/`!=` variants.
fn normalized_bound<'a>(cond: &'a Expr, index: BindingId) -> Option<&'a Expr> {
    let Expr::Binary(bin) = cond else {
        return None;
    };
    let is_index = |e: &Expr| matches!(e, Expr::Name(n) if n.binding == Some(index));
    match bin.op {
        BinOp::Lt if is_index(&bin.lhs) => Some(&bin.rhs),
        BinOp::Gt if is_index(&bin.rhs) => Some(&bin.lhs),
        BinOp::Ne if is_index(&bin.lhs) => Some(&bin.rhs),
        BinOp::Ne if is_index(&bin.rhs) => Some(&bin.lhs),
        _ => None,
    }
}

/// `i++`, `++i`, `i += 1`, `i = i + 1`, `i = 1 + i`.
fn is_unit_increment(update: &Expr, index: BindingId) -> bool {
    let is_index = |e: &Expr| matches!(e, Expr::Name(n) if n.binding == Some(index));
    let is_one = |e: &Expr| matches!(e, Expr::Literal(l) if l.value == Lit::Int(1));
    match update {
        Expr::Postfix(p) => p.op == PostOp::Inc && is_index(&p.operand),
        Expr::Unary(u) => u.op == UnOp::PreInc && is_index(&u.operand),
        Expr::Assign(a) if a.op == AssignOp::Add => is_index(&a.target) && is_one(&a.value),
        Expr::Assign(a) if a.op == AssignOp::Assign => {
            if !is_index(&a.target) {
                return false;
            }
            match a.value.as_ref() {
                Expr::Binary(bin) if bin.op == BinOp::Add => {
                    (is_index(&bin.lhs) && is_one(&bin.rhs))
                        || (is_one(&bin.lhs) && is_index(&bin.rhs))
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Result of a clean body scan: the element-access expressions to replace.
#[derive(Debug, Default)]
pub struct BodyScan {
    /// Full spans of every `receiver[index]` / `receiver.get(index)`.
    pub accesses: Vec<Span>,
}

/// Restricted body traversal; aborts the whole match on the first violation.
///
/// The index may only appear inside a qualifying element access; the
/// receiver must not be written (directly or through an element); the cached
/// bound variable must not be referenced at all; receiver methods are
/// limited to the bound query, `get`, and `isEmpty`; and `continue` anywhere
/// in the body rejects the loop.
pub fn scan_body(tree: &SourceTree, shape: &LoopShape<'_>, body: &Stmt) -> Result<BodyScan, Verdict> {
    if contains_error(body) {
        return Err(Verdict::Reject("parser-recovered region in body"));
    }

    let mut scan = BodyScan::default();
    let mut verdict = None;
    each_stmt(std::slice::from_ref(body), &mut |stmt| {
        if verdict.is_some() {
            return Descend::Skip;
        }
        if matches!(stmt, Stmt::Continue(_)) {
            verdict = Some(Verdict::Reject("continue changes iteration semantics"));
            return Descend::Skip;
        }
        for expr in stmt_exprs(stmt) {
            if let Err(v) = scan_expr(tree, shape, expr, &mut scan) {
                verdict = Some(v);
                return Descend::Skip;
            }
        }
        Descend::Children
    });

    match verdict {
        Some(v) => Err(v),
        None => Ok(scan),
    }
}

fn contains_error(stmt: &Stmt) -> bool {
    if stmt.is_error() {
        return true;
    }
    let mut found = false;
    each_stmt(std::slice::from_ref(stmt), &mut |s| {
        // Error nodes themselves never reach the visitor, so look one
        // level down at each statement's direct children.
        found = found
            || match s {
                Stmt::Block(b) => b.stmts.iter().any(Stmt::is_error),
                Stmt::If(node) => {
                    node.then_branch.is_error()
                        || node.else_branch.as_deref().is_some_and(Stmt::is_error)
                }
                Stmt::While(node) => node.body.is_error(),
                Stmt::DoWhile(node) => node.body.is_error(),
                Stmt::For(node) => node.body.is_error(),
                Stmt::ForEach(node) => node.body.is_error(),
                Stmt::Switch(node) => node
                    .cases
                    .iter()
                    .any(|case| case.stmts.iter().any(Stmt::is_error)),
                _ => false,
            };
        if found {
            Descend::Skip
        } else {
            Descend::Children
        }
    });
    found
}

/// Top-level expressions owned directly by one statement.
fn stmt_exprs(stmt: &Stmt) -> Vec<&Expr> {
    let mut exprs = Vec::new();
    match stmt {
        Stmt::If(s) => exprs.push(&s.cond),
        Stmt::While(s) => exprs.push(&s.cond),
        Stmt::DoWhile(s) => exprs.push(&s.cond),
        Stmt::For(s) => {
            for init in &s.init {
                match init {
                    ForInit::Decl(decl) => {
                        exprs.extend(decl.frags.iter().filter_map(|f| f.init.as_ref()));
                    }
                    ForInit::Expr(e) => exprs.push(e),
                }
            }
            exprs.extend(s.cond.as_ref());
            exprs.extend(s.update.iter());
        }
        Stmt::ForEach(s) => exprs.push(&s.iterable),
        Stmt::VarDecl(decl) => {
            exprs.extend(decl.frags.iter().filter_map(|f| f.init.as_ref()));
        }
        Stmt::Expr(s) => exprs.push(&s.expr),
        Stmt::Return(s) => exprs.extend(s.value.as_ref()),
        Stmt::Throw(s) => exprs.push(&s.value),
        Stmt::Switch(s) => {
            exprs.push(&s.scrutinee);
            for case in &s.cases {
                exprs.extend(case.labels.iter());
            }
        }
        Stmt::Block(_)
        | Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Empty(_)
        | Stmt::Error(_) => {}
    }
    exprs
}

fn scan_expr(
    tree: &SourceTree,
    shape: &LoopShape<'_>,
    expr: &Expr,
    scan: &mut BodyScan,
) -> Result<(), Verdict> {
    let refers_to = |e: &Expr, id: BindingId| matches!(e, Expr::Name(n) if n.binding == Some(id));
    let is_receiver = |e: &Expr| same_reference(e, shape.receiver);

    match expr {
        Expr::Name(name) => {
            if name.binding == Some(shape.index) {
                return Err(Verdict::Reject("index used outside an element access"));
            }
            if shape.cached_bound.is_some() && name.binding == shape.cached_bound {
                return Err(Verdict::Reject("cached bound referenced in body"));
            }
            Ok(())
        }
        Expr::Index(ix) if is_receiver(&ix.array) && refers_to(&ix.index, shape.index) => {
            // Qualifying element read; the subscript is consumed with it.
            scan.accesses.push(ix.span);
            Ok(())
        }
        Expr::Index(ix) => {
            scan_expr(tree, shape, &ix.array, scan)?;
            scan_expr(tree, shape, &ix.index, scan)
        }
        Expr::Call(call) => {
            if let Some(receiver) = call.receiver.as_deref() {
                if is_receiver(receiver) {
                    match call.name.as_str() {
                        "get" => {
                            if let [arg] = call.args.as_slice() {
                                if refers_to(arg, shape.index) {
                                    scan.accesses.push(call.span);
                                    return Ok(());
                                }
                            }
                        }
                        "size" | "isEmpty" => {}
                        _ => {
                            return Err(Verdict::Reject(
                                "receiver method outside the allowed set",
                            ));
                        }
                    }
                } else {
                    scan_expr(tree, shape, receiver, scan)?;
                }
            }
            for arg in &call.args {
                scan_expr(tree, shape, arg, scan)?;
            }
            Ok(())
        }
        Expr::Assign(assign) => {
            match assign.target.as_ref() {
                target if refers_to(target, shape.index) => {
                    return Err(Verdict::Reject("index reassigned in body"));
                }
                target if is_receiver(target) => {
                    return Err(Verdict::Reject("receiver reassigned in body"));
                }
                Expr::Index(ix) if is_receiver(&ix.array) => {
                    return Err(Verdict::Reject("element assigned through receiver"));
                }
                target => scan_expr(tree, shape, target, scan)?,
            }
            scan_expr(tree, shape, &assign.value, scan)
        }
        Expr::Unary(unary) => {
            if matches!(unary.op, UnOp::PreInc | UnOp::PreDec)
                && (refers_to(&unary.operand, shape.index) || is_receiver(&unary.operand))
            {
                return Err(Verdict::Reject("index or receiver mutated in body"));
            }
            scan_expr(tree, shape, &unary.operand, scan)
        }
        Expr::Postfix(postfix) => {
            if refers_to(&postfix.operand, shape.index) || is_receiver(&postfix.operand) {
                return Err(Verdict::Reject("index or receiver mutated in body"));
            }
            scan_expr(tree, shape, &postfix.operand, scan)
        }
        Expr::Binary(bin) => {
            scan_expr(tree, shape, &bin.lhs, scan)?;
            scan_expr(tree, shape, &bin.rhs, scan)
        }
        Expr::Field(field) => scan_expr(tree, shape, &field.object, scan),
        Expr::New(new) => {
            for arg in &new.args {
                scan_expr(tree, shape, arg, scan)?;
            }
            for dim in &new.dims {
                scan_expr(tree, shape, dim, scan)?;
            }
            Ok(())
        }
        Expr::Literal(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse;

    fn first_for(tree: &SourceTree) -> &ForStmt {
        for stmt in &tree.body {
            if let Stmt::For(f) = stmt {
                return f;
            }
        }
        panic!("expected a for loop");
    }

    #[test]
    fn test_canonical_array_loop_matches() {
        let tree = parse(
            "int[] arr = new int[10];\n\
             for (int i = 0; i < arr.length; i++) { use(arr[i]); }",
        )
        .expect("should parse");
        let for_stmt = first_for(&tree);
        let shape = match_header(&tree, for_stmt).expect("should match");
        assert_eq!(shape.kind, ReceiverKind::Array);
        assert!(shape.cached_bound.is_none());
        assert_eq!(shape.element_ty, Type::Int);
        let scan = scan_body(&tree, &shape, &for_stmt.body).expect("body should be clean");
        assert_eq!(scan.accesses.len(), 1);
    }

    #[test]
    fn test_cached_bound_and_commuted_test() {
        let tree = parse(
            "java.util.List<String> list = x;\n\
             for (int i = 0, n = list.size(); n > i; ++i) { use(list.get(i)); }",
        )
        .expect("should parse");
        let for_stmt = first_for(&tree);
        let shape = match_header(&tree, for_stmt).expect("should match");
        assert_eq!(shape.kind, ReceiverKind::Collection);
        assert!(shape.cached_bound.is_some());
        let scan = scan_body(&tree, &shape, &for_stmt.body).expect("body should be clean");
        assert_eq!(scan.accesses.len(), 1);
    }

    #[test]
    fn test_nonzero_start_rejected() {
        let tree = parse(
            "int[] arr = new int[10];\n\
             for (int i = 1; i < arr.length; i++) { use(arr[i]); }",
        )
        .expect("should parse");
        let err = match_header(&tree, first_for(&tree)).expect_err("should reject");
        assert!(matches!(err, Verdict::Reject(_)));
    }

    #[test]
    fn test_index_reassignment_rejected() {
        let tree = parse(
            "int[] arr = new int[10];\n\
             for (int i = 0; i < arr.length; i++) { i = 3; }",
        )
        .expect("should parse");
        let for_stmt = first_for(&tree);
        let shape = match_header(&tree, for_stmt).expect("header should match");
        let err = scan_body(&tree, &shape, &for_stmt.body).expect_err("should reject");
        assert_eq!(err, Verdict::Reject("index reassigned in body"));
    }

    #[test]
    fn test_element_write_rejected() {
        let tree = parse(
            "int[] arr = new int[10];\n\
             for (int i = 0; i < arr.length; i++) { arr[i] = 0; }",
        )
        .expect("should parse");
        let for_stmt = first_for(&tree);
        let shape = match_header(&tree, for_stmt).expect("header should match");
        assert!(scan_body(&tree, &shape, &for_stmt.body).is_err());
    }

    #[test]
    fn test_cached_bound_reference_rejected() {
        let tree = parse(
            "java.util.List<String> list = x;\n\
             for (int i = 0, n = list.size(); i < n; i++) { use(n); }",
        )
        .expect("should parse");
        let for_stmt = first_for(&tree);
        let shape = match_header(&tree, for_stmt).expect("header should match");
        let err = scan_body(&tree, &shape, &for_stmt.body).expect_err("should reject");
        assert_eq!(err, Verdict::Reject("cached bound referenced in body"));
    }

    #[test]
    fn test_continue_rejected() {
        let tree = parse(
            "int[] arr = new int[10];\n\
             for (int i = 0; i < arr.length; i++) { if (odd(arr[i])) continue; use(arr[i]); }",
        )
        .expect("should parse");
        let for_stmt = first_for(&tree);
        let shape = match_header(&tree, for_stmt).expect("header should match");
        assert!(scan_body(&tree, &shape, &for_stmt.body).is_err());
    }

    #[test]
    fn test_other_receiver_method_rejected() {
        let tree = parse(
            "java.util.List<String> list = x;\n\
             for (int i = 0; i < list.size(); i++) { list.remove(i); }",
        )
        .expect("should parse");
        let for_stmt = first_for(&tree);
        let shape = match_header(&tree, for_stmt).expect("header should match");
        assert!(scan_body(&tree, &shape, &for_stmt.body).is_err());
    }

    #[test]
    fn test_unknown_receiver_type_cannot_compute() {
        // `mystery` is never declared, so the receiver type is unresolved.
        let tree = parse("for (int i = 0; i < mystery.length; i++) { use(mystery[i]); }")
            .expect("should parse");
        let err = match_header(&tree, first_for(&tree)).expect_err("should not match");
        assert!(matches!(err, Verdict::CannotCompute(_)));
    }
}
