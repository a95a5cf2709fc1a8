//! Element-variable name proposals and linked proposal groups.
//!
//! When a rewrite introduces a fresh variable, the engine proposes a
//! default name plus ranked alternatives the consumer can offer
//! interactively. Candidates come from the receiver's own identifier
//! (singularized) and from the element type's simple name, de-duplicated
//! against everything visible in the enclosing scope chain and against
//! names already introduced earlier in the same fix-aggregation pass.

use crate::ast::{Expr, SourceTree, Span, Type};
use crate::finder::each_expr_in_stmt;
use rustc_hash::FxHashSet;

/// One ranked name candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Candidate identifier.
    pub name: String,
    /// Relative rank; higher is offered first.
    pub weight: u32,
}

/// A named insertion point with its ordered name candidates. The consumer
/// renders the first candidate and offers the rest as alternatives.
#[derive(Debug, Clone)]
pub struct LinkedProposalGroup {
    /// Group identifier, unique within one file fix.
    pub group_id: String,
    /// Where the default candidate is rendered.
    pub position: Span,
    /// Candidates, best first.
    pub proposals: Vec<Proposal>,
}

impl LinkedProposalGroup {
    /// The default candidate.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.proposals.first().map(|p| p.name.as_str())
    }
}

/// Heuristic singular form of a plural identifier, `None` when the
/// identifier does not look plural.
#[must_use]
pub fn singularize(name: &str) -> Option<String> {
    if name.len() < 2 {
        return None;
    }
    let lower = name.to_lowercase();
    if lower == "children" {
        return Some(format!("{}child", &name[..name.len() - 8]));
    }
    if let Some(stem) = name.strip_suffix("ies") {
        if stem.len() >= 2 {
            return Some(format!("{stem}y"));
        }
    }
    for suffix in ["ches", "shes", "sses", "xes", "zes"] {
        if let Some(stem) = name.strip_suffix(suffix) {
            let keep = &suffix[..suffix.len() - 2];
            return Some(format!("{stem}{keep}"));
        }
    }
    if lower.ends_with("ss") {
        return None;
    }
    if let Some(stem) = name.strip_suffix('s') {
        if !stem.is_empty() {
            return Some(stem.to_owned());
        }
    }
    None
}

/// Name derived from the element type: lower-cased simple name for
/// reference types, `element` for primitives and unknowns.
#[must_use]
pub fn type_derived_name(ty: &Type) -> String {
    match ty {
        Type::Named { simple, .. } => {
            let mut chars = simple.chars();
            match chars.next() {
                Some(first) => {
                    let mut out: String = first.to_lowercase().collect();
                    out.push_str(chars.as_str());
                    out
                }
                None => "element".to_owned(),
            }
        }
        Type::Array(elem) => format!("{}s", type_derived_name(elem)),
        _ => "element".to_owned(),
    }
}

/// Every identifier visible anywhere in the tree. Deliberately coarse:
/// over-excluding only costs a ranked alternative, under-excluding shadows
/// a real name.
#[must_use]
pub fn visible_names(tree: &SourceTree) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for stmt in &tree.body {
        each_expr_in_stmt(stmt, &mut |expr| {
            if let Expr::Name(n) = expr {
                names.insert(n.name.to_string());
            }
        });
        collect_declared(stmt, &mut names);
    }
    names
}

fn collect_declared(stmt: &crate::ast::Stmt, names: &mut FxHashSet<String>) {
    use crate::ast::{ForInit, Stmt};
    match stmt {
        Stmt::Block(b) => {
            for s in &b.stmts {
                collect_declared(s, names);
            }
        }
        Stmt::If(s) => {
            collect_declared(&s.then_branch, names);
            if let Some(e) = &s.else_branch {
                collect_declared(e, names);
            }
        }
        Stmt::While(s) => collect_declared(&s.body, names),
        Stmt::DoWhile(s) => collect_declared(&s.body, names),
        Stmt::For(s) => {
            for init in &s.init {
                if let ForInit::Decl(decl) = init {
                    for frag in &decl.frags {
                        names.insert(frag.name.to_string());
                    }
                }
            }
            collect_declared(&s.body, names);
        }
        Stmt::ForEach(s) => {
            names.insert(s.name.to_string());
            collect_declared(&s.body, names);
        }
        Stmt::VarDecl(decl) => {
            for frag in &decl.frags {
                names.insert(frag.name.to_string());
            }
        }
        Stmt::Switch(s) => {
            for case in &s.cases {
                for st in &case.stmts {
                    collect_declared(st, names);
                }
            }
        }
        _ => {}
    }
}

/// Propose a fresh element name.
///
/// Returns the chosen default plus the full ranked group. `taken` is the
/// scope-visible name set; `excluded` is the pass-scoped set of names other
/// operations already introduced.
#[must_use]
pub fn propose_element_name(
    group_id: &str,
    position: Span,
    receiver_name: Option<&str>,
    element_ty: &Type,
    taken: &FxHashSet<String>,
    excluded: &FxHashSet<String>,
) -> (String, LinkedProposalGroup) {
    let mut candidates: Vec<String> = Vec::new();
    if let Some(receiver) = receiver_name {
        if let Some(singular) = singularize(receiver) {
            candidates.push(singular);
        }
    }
    let derived = type_derived_name(element_ty);
    if !candidates.contains(&derived) {
        candidates.push(derived);
    }

    let free = |name: &str| !taken.contains(name) && !excluded.contains(name);

    let chosen = candidates
        .iter()
        .find(|c| free(c))
        .cloned()
        .unwrap_or_else(|| {
            // Every candidate collides; suffix the best one until it frees up.
            let base = candidates.first().map_or("element", String::as_str);
            let mut n = 2;
            loop {
                let attempt = format!("{base}{n}");
                if free(&attempt) {
                    return attempt;
                }
                n += 1;
            }
        });

    let mut proposals: Vec<Proposal> = Vec::with_capacity(candidates.len() + 1);
    proposals.push(Proposal {
        name: chosen.clone(),
        weight: 10,
    });
    let mut weight = 9u32;
    for candidate in candidates {
        if candidate != chosen {
            proposals.push(Proposal {
                name: candidate,
                weight,
            });
            weight = weight.saturating_sub(1);
        }
    }

    let group = LinkedProposalGroup {
        group_id: group_id.to_owned(),
        position,
        proposals,
    };
    (chosen, group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("names"), Some("name".to_owned()));
        assert_eq!(singularize("entries"), Some("entry".to_owned()));
        assert_eq!(singularize("boxes"), Some("box".to_owned()));
        assert_eq!(singularize("branches"), Some("branch".to_owned()));
        assert_eq!(singularize("children"), Some("child".to_owned()));
        assert_eq!(singularize("arr"), None);
        assert_eq!(singularize("class"), None);
    }

    #[test]
    fn test_type_derived_name() {
        assert_eq!(type_derived_name(&Type::Int), "element");
        assert_eq!(type_derived_name(&Type::named("String")), "string");
        assert_eq!(
            type_derived_name(&Type::Array(Box::new(Type::named("File")))),
            "files"
        );
    }

    #[test]
    fn test_propose_prefers_receiver_singular() {
        let taken = FxHashSet::default();
        let excluded = FxHashSet::default();
        let (chosen, group) = propose_element_name(
            "element_name_1",
            Span::new(0, 0),
            Some("names"),
            &Type::named("String"),
            &taken,
            &excluded,
        );
        assert_eq!(chosen, "name");
        assert_eq!(group.first(), Some("name"));
        assert!(group.proposals.iter().any(|p| p.name == "string"));
    }

    #[test]
    fn test_propose_skips_taken_and_excluded() {
        let mut taken = FxHashSet::default();
        taken.insert("name".to_owned());
        let mut excluded = FxHashSet::default();
        excluded.insert("string".to_owned());
        let (chosen, _) = propose_element_name(
            "element_name_1",
            Span::new(0, 0),
            Some("names"),
            &Type::named("String"),
            &taken,
            &excluded,
        );
        // Both candidates collide: numeric fallback on the best one.
        assert_eq!(chosen, "name2");
    }

    #[test]
    fn test_propose_primitive_is_element() {
        let taken = FxHashSet::default();
        let excluded = FxHashSet::default();
        let (chosen, _) = propose_element_name(
            "element_name_1",
            Span::new(0, 0),
            Some("arr"),
            &Type::Int,
            &taken,
            &excluded,
        );
        assert_eq!(chosen, "element");
    }
}
