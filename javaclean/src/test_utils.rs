//! A small Java statement parser for building test trees.
//!
//! The engine consumes trees produced by an external parser and resolver;
//! this module stands in for both so tests and examples can be written
//! against real source text. It covers the statement and expression subset
//! the clean-up families look at, resolves name bindings through a lexical
//! scope stack, and classifies declared types (arrays, `java.util`
//! collection family, generics) the way the real resolver would.
//!
//! Unparseable statements are recovered as [`Stmt::Error`] regions, which
//! the finders must skip, so tests can exercise that contract too.

use crate::ast::{
    AssignExpr, AssignOp, BinOp, BinaryExpr, BindingId, BindingKind, Bindings, Block, CallExpr,
    DoWhileStmt, Expr, ExprStmt, FieldExpr, ForEachStmt, ForInit, ForStmt, IfStmt, IndexExpr, Lit,
    LiteralExpr, NameExpr, NewExpr, PostOp, PostfixExpr, ReturnStmt, SourceTree, Span, Stmt,
    ThrowStmt, Type, UnOp, UnaryExpr, VarDeclStmt, VarFragment, WhileStmt,
};
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Parse failure. Statement-level trouble is recovered as [`Stmt::Error`];
/// this error only surfaces for unterminated constructs.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input ended inside an unfinished construct.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A token that cannot start or continue the expected construct.
    #[error("unexpected token at byte {0}")]
    Unexpected(usize),
}

/// Parse a statement sequence into a resolved [`SourceTree`].
pub fn parse(source: &str) -> Result<SourceTree, ParseError> {
    let tokens = lex(source);
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        bindings: Bindings::new(),
        scopes: vec![FxHashMap::default()],
    };
    let body = parser.parse_stmts(true)?;
    Ok(SourceTree {
        source: source.to_owned(),
        body,
        bindings: parser.bindings,
    })
}

/// Type names treated as assignable to the collection family.
const COLLECTION_NAMES: &[&str] = &[
    "Collection", "Iterable", "List", "ArrayList", "LinkedList", "Vector", "Set", "HashSet",
    "SortedSet", "TreeSet", "Queue", "Deque", "ArrayDeque",
];

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(CompactString),
    Int(i64),
    Str(String),
    Char(char),
    Punct(&'static str),
    Unknown,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    span: Span,
}

const PUNCTS2: &[&str] = &[
    "&&", "||", "==", "!=", "<=", ">=", "++", "--", "+=", "-=", "*=", "/=",
];
const PUNCTS1: &[&str] = &[
    "+", "-", "*", "/", "%", "<", ">", "=", "!", "(", ")", "{", "}", "[", "]", ";", ":", ",", ".",
];

fn lex(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        // Comments are trivia; the comment scanner finds them separately.
        if b == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if b == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            continue;
        }
        let start = i;
        if b.is_ascii_alphabetic() || b == b'_' || b == b'$' {
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
            {
                i += 1;
            }
            tokens.push(Token {
                tok: Tok::Ident(CompactString::from(&source[start..i])),
                span: Span::from_range(start, i),
            });
            continue;
        }
        if b.is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let value = source[start..i].parse().unwrap_or(0);
            tokens.push(Token {
                tok: Tok::Int(value),
                span: Span::from_range(start, i),
            });
            continue;
        }
        if b == b'"' {
            i += 1;
            let mut value = String::new();
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' && i + 1 < bytes.len() {
                    value.push(unescape(bytes[i + 1]));
                    i += 2;
                } else {
                    value.push(bytes[i] as char);
                    i += 1;
                }
            }
            i = (i + 1).min(bytes.len());
            tokens.push(Token {
                tok: Tok::Str(value),
                span: Span::from_range(start, i),
            });
            continue;
        }
        if b == b'\'' {
            i += 1;
            let value = if i < bytes.len() && bytes[i] == b'\\' {
                let c = unescape(*bytes.get(i + 1).unwrap_or(&b'\\'));
                i += 2;
                c
            } else {
                let c = *bytes.get(i).unwrap_or(&b' ') as char;
                i += 1;
                c
            };
            i = (i + 1).min(bytes.len());
            tokens.push(Token {
                tok: Tok::Char(value),
                span: Span::from_range(start, i),
            });
            continue;
        }
        if i + 1 < bytes.len() {
            let two = &source[i..i + 2];
            if let Some(&p) = PUNCTS2.iter().find(|p| **p == two) {
                tokens.push(Token {
                    tok: Tok::Punct(p),
                    span: Span::from_range(start, i + 2),
                });
                i += 2;
                continue;
            }
        }
        let one = &source[i..i + 1];
        if let Some(&p) = PUNCTS1.iter().find(|p| **p == one) {
            tokens.push(Token {
                tok: Tok::Punct(p),
                span: Span::from_range(start, i + 1),
            });
            i += 1;
            continue;
        }
        tokens.push(Token {
            tok: Tok::Unknown,
            span: Span::from_range(start, i + 1),
        });
        i += 1;
    }
    tokens
}

fn unescape(b: u8) -> char {
    match b {
        b'n' => '\n',
        b't' => '\t',
        b'r' => '\r',
        b'0' => '\0',
        other => other as char,
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    bindings: Bindings,
    scopes: Vec<FxHashMap<CompactString, BindingId>>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Some(Token { tok: Tok::Punct(q), .. }) if *q == p)
    }

    fn at_kw(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Token { tok: Tok::Ident(id), .. }) if id == kw)
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let token = self.peek().cloned().ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_punct(&mut self, p: &str) -> Result<Span, ParseError> {
        if self.at_punct(p) {
            Ok(self.bump()?.span)
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(t) => ParseError::Unexpected(t.span.start),
            None => ParseError::UnexpectedEof,
        }
    }

    fn span_from(&self, start: usize) -> Span {
        let end = self.tokens[self.pos - 1].span.end();
        Span::from_range(start, end)
    }

    // Scopes

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, ty: Type, kind: BindingKind) -> BindingId {
        let id = self.bindings.declare(name, ty, kind);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(CompactString::from(name), id);
        }
        id
    }

    fn resolve(&self, name: &str) -> Option<BindingId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    // Statements

    fn parse_stmts(&mut self, top_level: bool) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            if self.peek().is_none() {
                if top_level {
                    return Ok(stmts);
                }
                return Err(ParseError::UnexpectedEof);
            }
            if self.at_punct("}") {
                return Ok(stmts);
            }
            stmts.push(self.parse_stmt()?);
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let checkpoint = self.pos;
        match self.parse_stmt_inner() {
            Ok(stmt) => Ok(stmt),
            Err(ParseError::UnexpectedEof) if self.pos == checkpoint => {
                Err(ParseError::UnexpectedEof)
            }
            Err(_) => {
                // Recover: consume through the next `;` (or stop at `}`)
                // and mark the region as parser-recovered.
                self.pos = checkpoint;
                let start = self.tokens[self.pos].span.start;
                while let Some(token) = self.peek() {
                    if matches!(token.tok, Tok::Punct("}")) {
                        break;
                    }
                    let was_semi = matches!(token.tok, Tok::Punct(";"));
                    self.pos += 1;
                    if was_semi {
                        break;
                    }
                }
                Ok(Stmt::Error(self.span_from(start)))
            }
        }
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEof)?.clone();
        match &token.tok {
            Tok::Punct("{") => Ok(Stmt::Block(self.parse_block()?)),
            Tok::Punct(";") => {
                let span = self.bump()?.span;
                Ok(Stmt::Empty(span))
            }
            Tok::Ident(id) => match id.as_str() {
                "if" => self.parse_if(),
                "while" => self.parse_while(),
                "do" => self.parse_do_while(),
                "for" => self.parse_for(),
                "return" => self.parse_return(),
                "throw" => self.parse_throw(),
                "break" => {
                    let start = self.bump()?.span.start;
                    self.expect_punct(";")?;
                    Ok(Stmt::Break(self.span_from(start)))
                }
                "continue" => {
                    let start = self.bump()?.span.start;
                    self.expect_punct(";")?;
                    Ok(Stmt::Continue(self.span_from(start)))
                }
                _ => self.parse_decl_or_expr_stmt(),
            },
            _ => self.parse_decl_or_expr_stmt(),
        }
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.expect_punct("{")?.start;
        self.push_scope();
        let stmts = self.parse_stmts(false)?;
        self.pop_scope();
        self.expect_punct("}")?;
        Ok(Block {
            span: self.span_from(start),
            stmts,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump()?.span.start;
        self.expect_punct("(")?;
        let cond = self.parse_expr()?;
        self.expect_punct(")")?;
        let then_branch = Box::new(self.parse_stmt_inner()?);
        let else_branch = if self.at_kw("else") {
            self.bump()?;
            Some(Box::new(self.parse_stmt_inner()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            span: self.span_from(start),
            cond,
            then_branch,
            else_branch,
        }))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump()?.span.start;
        self.expect_punct("(")?;
        let cond = self.parse_expr()?;
        self.expect_punct(")")?;
        let body = Box::new(self.parse_stmt_inner()?);
        Ok(Stmt::While(WhileStmt {
            span: self.span_from(start),
            cond,
            body,
        }))
    }

    fn parse_do_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump()?.span.start;
        let body = Box::new(self.parse_stmt_inner()?);
        if !self.at_kw("while") {
            return Err(self.unexpected());
        }
        self.bump()?;
        self.expect_punct("(")?;
        let cond = self.parse_expr()?;
        self.expect_punct(")")?;
        self.expect_punct(";")?;
        Ok(Stmt::DoWhile(DoWhileStmt {
            span: self.span_from(start),
            body,
            cond,
        }))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump()?.span.start;
        self.expect_punct("(")?;
        self.push_scope();

        // Enhanced form: `Type name : iterable`.
        let checkpoint = self.pos;
        if let Ok(Some((ty, name))) = self.try_typed_name() {
            if self.at_punct(":") {
                self.bump()?;
                let iterable = self.parse_expr()?;
                self.expect_punct(")")?;
                let binding = self.declare(&name, ty.clone(), BindingKind::Parameter);
                let body = Box::new(self.parse_stmt_inner()?);
                self.pop_scope();
                return Ok(Stmt::ForEach(ForEachStmt {
                    span: self.span_from(start),
                    ty,
                    name,
                    binding,
                    iterable,
                    body,
                }));
            }
        }
        self.pos = checkpoint;

        let mut init = Vec::new();
        if !self.at_punct(";") {
            if let Some(decl) = self.try_parse_decl(false)? {
                init.push(ForInit::Decl(decl));
            } else {
                init.push(ForInit::Expr(self.parse_expr()?));
                while self.at_punct(",") {
                    self.bump()?;
                    init.push(ForInit::Expr(self.parse_expr()?));
                }
            }
        }
        self.expect_punct(";")?;
        let cond = if self.at_punct(";") {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_punct(";")?;
        let mut update = Vec::new();
        if !self.at_punct(")") {
            update.push(self.parse_expr()?);
            while self.at_punct(",") {
                self.bump()?;
                update.push(self.parse_expr()?);
            }
        }
        self.expect_punct(")")?;
        let body = Box::new(self.parse_stmt_inner()?);
        self.pop_scope();
        Ok(Stmt::For(ForStmt {
            span: self.span_from(start),
            init,
            cond,
            update,
            body,
        }))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump()?.span.start;
        let value = if self.at_punct(";") {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_punct(";")?;
        Ok(Stmt::Return(ReturnStmt {
            span: self.span_from(start),
            value,
        }))
    }

    fn parse_throw(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump()?.span.start;
        let value = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::Throw(ThrowStmt {
            span: self.span_from(start),
            value,
        }))
    }

    fn parse_decl_or_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        if let Some(decl) = self.try_parse_decl(true)? {
            return Ok(Stmt::VarDecl(decl));
        }
        let start = self
            .peek()
            .ok_or(ParseError::UnexpectedEof)?
            .span
            .start;
        let expr = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::Expr(ExprStmt {
            span: self.span_from(start),
            expr,
        }))
    }

    /// Backtracking declaration parse. With `with_semi` the trailing `;` is
    /// consumed and included in the span.
    fn try_parse_decl(&mut self, with_semi: bool) -> Result<Option<VarDeclStmt>, ParseError> {
        let checkpoint = self.pos;
        let start = match self.peek() {
            Some(t) => t.span.start,
            None => return Ok(None),
        };
        let Some((ty, first_name)) = self.try_typed_name()? else {
            self.pos = checkpoint;
            return Ok(None);
        };
        // Only `=`, `,`, or `;` after the name makes this a declaration.
        if !(self.at_punct("=") || self.at_punct(",") || self.at_punct(";")) {
            self.pos = checkpoint;
            return Ok(None);
        }

        let mut frags = Vec::new();
        let mut name = first_name;
        let mut name_start = self.tokens[self.pos - 1].span.start;
        loop {
            let init = if self.at_punct("=") {
                self.bump()?;
                Some(self.parse_expr()?)
            } else {
                None
            };
            let frag_span = self.span_from(name_start);
            let binding = self.declare(&name, ty.clone(), BindingKind::Local);
            frags.push(VarFragment {
                span: frag_span,
                name: name.clone(),
                binding,
                init,
            });
            if self.at_punct(",") {
                self.bump()?;
                let token = self.bump()?;
                let Tok::Ident(next) = token.tok else {
                    return Err(ParseError::Unexpected(token.span.start));
                };
                name = next;
                name_start = token.span.start;
                continue;
            }
            break;
        }
        if with_semi {
            self.expect_punct(";")?;
        }
        Ok(Some(VarDeclStmt {
            span: self.span_from(start),
            ty,
            frags,
        }))
    }

    /// `Type name` lookahead used by declarations and the enhanced for.
    /// Returns `None` (with position restored) when the tokens do not form
    /// a type followed by an identifier.
    fn try_typed_name(&mut self) -> Result<Option<(Type, CompactString)>, ParseError> {
        let checkpoint = self.pos;
        let Some(ty) = self.try_parse_type() else {
            self.pos = checkpoint;
            return Ok(None);
        };
        match self.peek().cloned() {
            Some(Token {
                tok: Tok::Ident(name),
                ..
            }) if !is_keyword(&name) => {
                self.pos += 1;
                Ok(Some((ty, name)))
            }
            _ => {
                self.pos = checkpoint;
                Ok(None)
            }
        }
    }

    fn try_parse_type(&mut self) -> Option<Type> {
        let token = self.peek()?.clone();
        let Tok::Ident(first) = token.tok else {
            return None;
        };
        let mut base = match first.as_str() {
            "int" => Some(Type::Int),
            "long" => Some(Type::Long),
            "short" => Some(Type::Short),
            "byte" => Some(Type::Byte),
            "char" => Some(Type::Char),
            "boolean" => Some(Type::Boolean),
            "float" => Some(Type::Float),
            "double" => Some(Type::Double),
            _ => None,
        };
        self.pos += 1;
        if base.is_none() {
            if is_keyword(&first) {
                return None;
            }
            // Dotted reference type with optional type arguments.
            let mut segments = vec![first];
            while self.at_punct(".") {
                let dot = self.pos;
                self.pos += 1;
                match self.peek().cloned() {
                    Some(Token {
                        tok: Tok::Ident(seg),
                        ..
                    }) => {
                        self.pos += 1;
                        segments.push(seg);
                    }
                    _ => {
                        self.pos = dot;
                        break;
                    }
                }
            }
            let mut type_args = Vec::new();
            if self.at_punct("<") {
                self.pos += 1;
                loop {
                    type_args.push(self.try_parse_type()?);
                    if self.at_punct(",") {
                        self.pos += 1;
                        continue;
                    }
                    break;
                }
                if !self.at_punct(">") {
                    return None;
                }
                self.pos += 1;
            }
            let simple = segments.last()?.clone();
            let qualified = (segments.len() > 1).then(|| segments.join("."));
            let collection = COLLECTION_NAMES.contains(&simple.as_str());
            base = Some(Type::Named {
                simple,
                qualified,
                collection,
                type_args,
            });
        }
        let mut ty = base?;
        while self.at_punct("[") {
            let bracket = self.pos;
            self.pos += 1;
            if self.at_punct("]") {
                self.pos += 1;
                ty = Type::Array(Box::new(ty));
            } else {
                self.pos = bracket;
                break;
            }
        }
        Some(ty)
    }

    // Expressions, precedence climbing.

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_binary(0)?;
        let op = match self.peek() {
            Some(Token { tok: Tok::Punct("="), .. }) => Some(AssignOp::Assign),
            Some(Token { tok: Tok::Punct("+="), .. }) => Some(AssignOp::Add),
            Some(Token { tok: Tok::Punct("-="), .. }) => Some(AssignOp::Sub),
            Some(Token { tok: Tok::Punct("*="), .. }) => Some(AssignOp::Mul),
            Some(Token { tok: Tok::Punct("/="), .. }) => Some(AssignOp::Div),
            _ => None,
        };
        let Some(op) = op else {
            return Ok(target);
        };
        self.bump()?;
        let value = self.parse_assign()?;
        let span = Span::from_range(target.span().start, value.span().end());
        Ok(Expr::Assign(AssignExpr {
            span,
            op,
            target: Box::new(target),
            value: Box::new(value),
        }))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some((op, prec)) = self.peek_bin_op() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump()?;
            let rhs = self.parse_binary(prec + 1)?;
            let span = Span::from_range(lhs.span().start, rhs.span().end());
            lhs = Expr::Binary(BinaryExpr {
                span,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn peek_bin_op(&self) -> Option<(BinOp, u8)> {
        let Token { tok: Tok::Punct(p), .. } = self.peek()? else {
            return None;
        };
        Some(match *p {
            "||" => (BinOp::Or, 1),
            "&&" => (BinOp::And, 2),
            "==" => (BinOp::Eq, 3),
            "!=" => (BinOp::Ne, 3),
            "<" => (BinOp::Lt, 4),
            ">" => (BinOp::Gt, 4),
            "<=" => (BinOp::Le, 4),
            ">=" => (BinOp::Ge, 4),
            "+" => (BinOp::Add, 5),
            "-" => (BinOp::Sub, 5),
            "*" => (BinOp::Mul, 6),
            "/" => (BinOp::Div, 6),
            "%" => (BinOp::Rem, 6),
            _ => return None,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEof)?.clone();
        let op = match token.tok {
            Tok::Punct("!") => Some(UnOp::Not),
            Tok::Punct("-") => Some(UnOp::Neg),
            Tok::Punct("++") => Some(UnOp::PreInc),
            Tok::Punct("--") => Some(UnOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.bump()?;
            let operand = self.parse_unary()?;
            let span = Span::from_range(token.span.start, operand.span().end());
            return Ok(Expr::Unary(UnaryExpr {
                span,
                op,
                operand: Box::new(operand),
            }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.at_punct(".") {
                self.bump()?;
                let token = self.bump()?;
                let Tok::Ident(name) = token.tok else {
                    return Err(ParseError::Unexpected(token.span.start));
                };
                if self.at_punct("(") {
                    let args = self.parse_args()?;
                    let span = self.span_from(expr.span().start);
                    expr = Expr::Call(CallExpr {
                        span,
                        receiver: Some(Box::new(expr)),
                        name,
                        args,
                    });
                } else {
                    let span = self.span_from(expr.span().start);
                    expr = Expr::Field(FieldExpr {
                        span,
                        object: Box::new(expr),
                        name,
                    });
                }
                continue;
            }
            if self.at_punct("[") {
                self.bump()?;
                let index = self.parse_expr()?;
                self.expect_punct("]")?;
                let span = self.span_from(expr.span().start);
                expr = Expr::Index(IndexExpr {
                    span,
                    array: Box::new(expr),
                    index: Box::new(index),
                });
                continue;
            }
            if self.at_punct("++") || self.at_punct("--") {
                let op = if self.at_punct("++") {
                    PostOp::Inc
                } else {
                    PostOp::Dec
                };
                self.bump()?;
                let span = self.span_from(expr.span().start);
                expr = Expr::Postfix(PostfixExpr {
                    span,
                    op,
                    operand: Box::new(expr),
                });
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.bump()?;
        match token.tok {
            Tok::Int(value) => Ok(Expr::Literal(LiteralExpr {
                span: token.span,
                value: Lit::Int(value),
            })),
            Tok::Str(value) => Ok(Expr::Literal(LiteralExpr {
                span: token.span,
                value: Lit::Str(value),
            })),
            Tok::Char(value) => Ok(Expr::Literal(LiteralExpr {
                span: token.span,
                value: Lit::Char(value),
            })),
            Tok::Punct("(") => {
                let expr = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(expr)
            }
            Tok::Ident(id) => match id.as_str() {
                "true" | "false" => Ok(Expr::Literal(LiteralExpr {
                    span: token.span,
                    value: Lit::Bool(id == "true"),
                })),
                "null" => Ok(Expr::Literal(LiteralExpr {
                    span: token.span,
                    value: Lit::Null,
                })),
                "new" => self.parse_new(token.span.start),
                _ if self.at_punct("(") => {
                    let args = self.parse_args()?;
                    Ok(Expr::Call(CallExpr {
                        span: self.span_from(token.span.start),
                        receiver: None,
                        name: id,
                        args,
                    }))
                }
                _ => Ok(Expr::Name(NameExpr {
                    span: token.span,
                    binding: self.resolve(&id),
                    name: id,
                })),
            },
            _ => Err(ParseError::Unexpected(token.span.start)),
        }
    }

    fn parse_new(&mut self, start: usize) -> Result<Expr, ParseError> {
        let ty = self.try_parse_type_no_array().ok_or_else(|| self.unexpected())?;
        if self.at_punct("[") {
            let mut dims = Vec::new();
            while self.at_punct("[") {
                self.bump()?;
                dims.push(self.parse_expr()?);
                self.expect_punct("]")?;
            }
            return Ok(Expr::New(NewExpr {
                span: self.span_from(start),
                ty,
                args: Vec::new(),
                dims,
            }));
        }
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if !self.at_punct(")") {
            args.push(self.parse_expr()?);
            while self.at_punct(",") {
                self.bump()?;
                args.push(self.parse_expr()?);
            }
        }
        self.expect_punct(")")?;
        Ok(Expr::New(NewExpr {
            span: self.span_from(start),
            ty,
            args,
            dims: Vec::new(),
        }))
    }

    /// Type parse for `new` expressions: array suffixes belong to the
    /// dimension list, not the element type.
    fn try_parse_type_no_array(&mut self) -> Option<Type> {
        // try_parse_type greedily consumes `[]` pairs; rewind those.
        let mut base = self.try_parse_type()?;
        while let Type::Array(elem) = base {
            base = *elem;
            self.pos -= 2;
        }
        Some(base)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if !self.at_punct(")") {
            args.push(self.parse_expr()?);
            while self.at_punct(",") {
                self.bump()?;
                args.push(self.parse_expr()?);
            }
        }
        self.expect_punct(")")?;
        Ok(args)
    }
}

fn is_keyword(id: &str) -> bool {
    matches!(
        id,
        "if" | "else"
            | "while"
            | "do"
            | "for"
            | "return"
            | "throw"
            | "break"
            | "continue"
            | "new"
            | "true"
            | "false"
            | "null"
            | "switch"
            | "case"
            | "default"
    )
}
