//! Engine-normalized serialization of synthesized subtrees.
//!
//! Structured replacement payloads are rendered through this printer, so a
//! `Payload::Subtree` always carries canonical spacing. Anything that must
//! preserve original bytes (moved bodies, receiver text) goes through
//! verbatim fragments instead and never passes through here.

use super::{AssignOp, BinOp, Expr, Lit, PostOp, Type, UnOp};
use std::fmt::Write as _;

/// Render a type reference.
#[must_use]
pub fn type_text(ty: &Type) -> String {
    match ty {
        Type::Int => "int".to_owned(),
        Type::Long => "long".to_owned(),
        Type::Short => "short".to_owned(),
        Type::Byte => "byte".to_owned(),
        Type::Char => "char".to_owned(),
        Type::Boolean => "boolean".to_owned(),
        Type::Float => "float".to_owned(),
        Type::Double => "double".to_owned(),
        Type::Array(elem) => format!("{}[]", type_text(elem)),
        Type::Named {
            simple, type_args, ..
        } => {
            if type_args.is_empty() {
                simple.to_string()
            } else {
                let args: Vec<String> = type_args.iter().map(type_text).collect();
                format!("{}<{}>", simple, args.join(", "))
            }
        }
        Type::Unknown => "Object".to_owned(),
    }
}

/// Render an expression with canonical spacing.
#[must_use]
pub fn expr_text(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, 0);
    out
}

/// Escape and quote a string literal value.
#[must_use]
pub fn quote_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn bin_op_text(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Rem => "%",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn bin_op_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Eq | BinOp::Ne => 3,
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 4,
        BinOp::Add | BinOp::Sub => 5,
        BinOp::Mul | BinOp::Div | BinOp::Rem => 6,
    }
}

fn assign_op_text(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::Add => "+=",
        AssignOp::Sub => "-=",
        AssignOp::Mul => "*=",
        AssignOp::Div => "/=",
    }
}

// `prec` is the minimum precedence the surrounding context requires;
// anything looser gets parenthesized.
fn write_expr(out: &mut String, expr: &Expr, prec: u8) {
    match expr {
        Expr::Name(n) => out.push_str(&n.name),
        Expr::Literal(l) => match &l.value {
            Lit::Int(v) => {
                let _ = write!(out, "{v}");
            }
            Lit::Str(s) => out.push_str(&quote_str(s)),
            Lit::Char(c) => {
                let _ = write!(out, "'{c}'");
            }
            Lit::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            Lit::Null => out.push_str("null"),
        },
        Expr::Binary(b) => {
            let own = bin_op_prec(b.op);
            let needs_parens = own < prec;
            if needs_parens {
                out.push('(');
            }
            write_expr(out, &b.lhs, own);
            let _ = write!(out, " {} ", bin_op_text(b.op));
            write_expr(out, &b.rhs, own + 1);
            if needs_parens {
                out.push(')');
            }
        }
        Expr::Unary(u) => {
            let sigil = match u.op {
                UnOp::Not => "!",
                UnOp::Neg => "-",
                UnOp::PreInc => "++",
                UnOp::PreDec => "--",
            };
            out.push_str(sigil);
            write_expr(out, &u.operand, 7);
        }
        Expr::Postfix(p) => {
            write_expr(out, &p.operand, 7);
            out.push_str(match p.op {
                PostOp::Inc => "++",
                PostOp::Dec => "--",
            });
        }
        Expr::Assign(a) => {
            if prec > 0 {
                out.push('(');
            }
            write_expr(out, &a.target, 7);
            let _ = write!(out, " {} ", assign_op_text(a.op));
            write_expr(out, &a.value, 0);
            if prec > 0 {
                out.push(')');
            }
        }
        Expr::Index(ix) => {
            write_expr(out, &ix.array, 7);
            out.push('[');
            write_expr(out, &ix.index, 0);
            out.push(']');
        }
        Expr::Field(f) => {
            write_expr(out, &f.object, 7);
            out.push('.');
            out.push_str(&f.name);
        }
        Expr::Call(c) => {
            if let Some(receiver) = &c.receiver {
                write_expr(out, receiver, 7);
                out.push('.');
            }
            out.push_str(&c.name);
            out.push('(');
            for (i, arg) in c.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg, 0);
            }
            out.push(')');
        }
        Expr::New(n) => {
            out.push_str("new ");
            if n.dims.is_empty() {
                let _ = write!(out, "{}(", type_text(&n.ty));
                for (i, arg) in n.args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_expr(out, arg, 0);
                }
                out.push(')');
            } else {
                out.push_str(&type_text(&n.ty));
                for dim in &n.dims {
                    out.push('[');
                    write_expr(out, dim, 0);
                    out.push(']');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        BinaryExpr, CallExpr, IndexExpr, LiteralExpr, NameExpr, Span, UnaryExpr,
    };
    use compact_str::CompactString;

    fn name(text: &str) -> Expr {
        Expr::Name(NameExpr {
            span: Span::new(0, 0),
            name: CompactString::from(text),
            binding: None,
        })
    }

    fn int(v: i64) -> Expr {
        Expr::Literal(LiteralExpr {
            span: Span::new(0, 0),
            value: Lit::Int(v),
        })
    }

    #[test]
    fn test_binary_precedence() {
        // a + b * 2 keeps no parentheses
        let e = Expr::Binary(BinaryExpr {
            span: Span::new(0, 0),
            op: BinOp::Add,
            lhs: Box::new(name("a")),
            rhs: Box::new(Expr::Binary(BinaryExpr {
                span: Span::new(0, 0),
                op: BinOp::Mul,
                lhs: Box::new(name("b")),
                rhs: Box::new(int(2)),
            })),
        });
        assert_eq!(expr_text(&e), "a + b * 2");

        // (a + b) * 2 needs them back
        let e = Expr::Binary(BinaryExpr {
            span: Span::new(0, 0),
            op: BinOp::Mul,
            lhs: Box::new(Expr::Binary(BinaryExpr {
                span: Span::new(0, 0),
                op: BinOp::Add,
                lhs: Box::new(name("a")),
                rhs: Box::new(name("b")),
            })),
            rhs: Box::new(int(2)),
        });
        assert_eq!(expr_text(&e), "(a + b) * 2");
    }

    #[test]
    fn test_call_and_index() {
        let e = Expr::Call(CallExpr {
            span: Span::new(0, 0),
            receiver: Some(Box::new(name("list"))),
            name: CompactString::from("get"),
            args: vec![Expr::Index(IndexExpr {
                span: Span::new(0, 0),
                array: Box::new(name("arr")),
                index: Box::new(int(0)),
            })],
        });
        assert_eq!(expr_text(&e), "list.get(arr[0])");
    }

    #[test]
    fn test_unary_binds_tight() {
        let e = Expr::Unary(UnaryExpr {
            span: Span::new(0, 0),
            op: UnOp::Not,
            operand: Box::new(name("done")),
        });
        assert_eq!(expr_text(&e), "!done");
    }

    #[test]
    fn test_quote_str_escapes() {
        assert_eq!(quote_str("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
    }

    #[test]
    fn test_type_text() {
        assert_eq!(type_text(&Type::Array(Box::new(Type::Int))), "int[]");
        let list = Type::Named {
            simple: CompactString::from("List"),
            qualified: None,
            collection: true,
            type_args: vec![Type::named("String")],
        };
        assert_eq!(type_text(&list), "List<String>");
    }
}
