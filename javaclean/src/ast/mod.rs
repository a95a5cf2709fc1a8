//! Source tree data model.
//!
//! The engine consumes an already-parsed, binding-resolved syntax tree of a
//! single Java compilation region. The tree is immutable for the lifetime of
//! one clean-up computation; every "mutation" is expressed as a diff against
//! it (see the `edit` module).
//!
//! Statements and expressions are closed tagged unions. New transformation
//! families are added by adding match arms, not node subclasses.

pub mod printer;

use compact_str::CompactString;
use rustc_hash::FxHashMap;

/// A byte range inside the source buffer.
///
/// Spans double as node identity for consumed-subtree bookkeeping: within one
/// tree no two distinct nodes share the same range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Create a span from start offset and length.
    #[must_use]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Create a span from start (inclusive) and end (exclusive) offsets.
    #[must_use]
    pub const fn from_range(start: usize, end: usize) -> Self {
        Self {
            start,
            len: end.saturating_sub(start),
        }
    }

    /// End byte offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    /// Whether `other` lies entirely inside this span.
    #[must_use]
    pub const fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end() <= self.end()
    }

    /// Whether the two spans share at least one byte.
    #[must_use]
    pub const fn intersects(&self, other: Span) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Stable identity of a declared variable, usable to test "same entity"
/// across tree positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u32);

/// What kind of declaration a binding comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Local variable declaration.
    Local,
    /// Method or loop parameter.
    Parameter,
}

/// A resolved declaration produced by the external type resolver.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Identity.
    pub id: BindingId,
    /// Declared simple name.
    pub name: CompactString,
    /// Declared type.
    pub ty: Type,
    /// Declaration kind.
    pub kind: BindingKind,
}

/// Side table of all bindings in one tree.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    table: FxHashMap<BindingId, Binding>,
    next: u32,
}

impl Bindings {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new binding and return its identity.
    pub fn declare(&mut self, name: &str, ty: Type, kind: BindingKind) -> BindingId {
        let id = BindingId(self.next);
        self.next += 1;
        self.table.insert(
            id,
            Binding {
                id,
                name: CompactString::from(name),
                ty,
                kind,
            },
        );
        id
    }

    /// Look up a binding.
    #[must_use]
    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.table.get(&id)
    }

    /// Declared type of a binding, `Type::Unknown` if the id is stale.
    #[must_use]
    pub fn type_of(&self, id: BindingId) -> Type {
        self.table.get(&id).map_or(Type::Unknown, |b| b.ty.clone())
    }

    /// Declared name of a binding, empty if the id is stale.
    #[must_use]
    pub fn name_of(&self, id: BindingId) -> &str {
        self.table.get(&id).map_or("", |b| b.name.as_str())
    }
}

/// A resolved Java type, reduced to what the clean-up algorithms consult.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// `int`
    Int,
    /// `long`
    Long,
    /// `short`
    Short,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `boolean`
    Boolean,
    /// `float`
    Float,
    /// `double`
    Double,
    /// An array type with the given element type.
    Array(Box<Type>),
    /// A class or interface reference.
    Named {
        /// Simple name, e.g. `ArrayList`.
        simple: CompactString,
        /// Fully qualified name when the resolver produced one.
        qualified: Option<String>,
        /// Whether the type is assignable to the `java.util` collection
        /// family (decided by the external resolver).
        collection: bool,
        /// Type arguments, e.g. the `String` in `List<String>`.
        type_args: Vec<Type>,
    },
    /// Resolution failed; structurally-required uses of this become the
    /// "cannot compute" outcome, never a hard error.
    Unknown,
}

impl Type {
    /// Convenience constructor for a plain (non-collection) class reference.
    #[must_use]
    pub fn named(simple: &str) -> Self {
        Type::Named {
            simple: CompactString::from(simple),
            qualified: None,
            collection: false,
            type_args: Vec::new(),
        }
    }

    /// Whether this is a primitive type.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Int
                | Type::Long
                | Type::Short
                | Type::Byte
                | Type::Char
                | Type::Boolean
                | Type::Float
                | Type::Double
        )
    }

    /// Whether this is a collection-family reference type.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, Type::Named { collection: true, .. })
    }

    /// Element type when iterated: the array element type, or the first
    /// type argument of a collection (`java.lang.Object` when raw).
    #[must_use]
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Type::Array(elem) => Some((**elem).clone()),
            Type::Named {
                collection: true,
                type_args,
                ..
            } => Some(type_args.first().cloned().unwrap_or_else(|| Type::Named {
                simple: CompactString::from("Object"),
                qualified: Some("java.lang.Object".to_owned()),
                collection: false,
                type_args: Vec::new(),
            })),
            _ => None,
        }
    }
}

/// A brace-delimited statement list.
#[derive(Debug, Clone)]
pub struct Block {
    /// Range including the braces.
    pub span: Span,
    /// Contained statements.
    pub stmts: Vec<Stmt>,
}

/// `if (cond) then else alt`
#[derive(Debug, Clone)]
pub struct IfStmt {
    /// Full statement range.
    pub span: Span,
    /// Guard expression.
    pub cond: Expr,
    /// Then branch.
    pub then_branch: Box<Stmt>,
    /// Optional else branch; an `else if` chain is a nested `IfStmt` here.
    pub else_branch: Option<Box<Stmt>>,
}

/// `while (cond) body`
#[derive(Debug, Clone)]
pub struct WhileStmt {
    /// Full statement range.
    pub span: Span,
    /// Loop condition.
    pub cond: Expr,
    /// Loop body.
    pub body: Box<Stmt>,
}

/// `do body while (cond);`
#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    /// Full statement range.
    pub span: Span,
    /// Loop body.
    pub body: Box<Stmt>,
    /// Loop condition, evaluated after the body.
    pub cond: Expr,
}

/// One slot of a counted-for initializer list.
#[derive(Debug, Clone)]
pub enum ForInit {
    /// `int i = 0, n = a.length`
    Decl(VarDeclStmt),
    /// A bare initializer expression.
    Expr(Expr),
}

/// `for (init; cond; update) body`
#[derive(Debug, Clone)]
pub struct ForStmt {
    /// Full statement range.
    pub span: Span,
    /// Initializer slots.
    pub init: Vec<ForInit>,
    /// Bound test, absent for `for (;;)`.
    pub cond: Option<Expr>,
    /// Update expressions.
    pub update: Vec<Expr>,
    /// Loop body.
    pub body: Box<Stmt>,
}

/// `for (Type name : iterable) body`
#[derive(Debug, Clone)]
pub struct ForEachStmt {
    /// Full statement range.
    pub span: Span,
    /// Declared element type.
    pub ty: Type,
    /// Element variable name.
    pub name: CompactString,
    /// Element variable binding.
    pub binding: BindingId,
    /// Iterated expression.
    pub iterable: Expr,
    /// Loop body.
    pub body: Box<Stmt>,
}

/// One declared fragment of a local variable declaration.
#[derive(Debug, Clone)]
pub struct VarFragment {
    /// Fragment range (name through initializer).
    pub span: Span,
    /// Declared name.
    pub name: CompactString,
    /// Resolved binding.
    pub binding: BindingId,
    /// Optional initializer.
    pub init: Option<Expr>,
}

/// `Type a = x, b = y;`
#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    /// Full statement range.
    pub span: Span,
    /// Declared base type.
    pub ty: Type,
    /// Declared fragments.
    pub frags: Vec<VarFragment>,
}

/// An expression used as a statement.
#[derive(Debug, Clone)]
pub struct ExprStmt {
    /// Full statement range including the semicolon.
    pub span: Span,
    /// The expression.
    pub expr: Expr,
}

/// `return value;`
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    /// Full statement range.
    pub span: Span,
    /// Optional returned value.
    pub value: Option<Expr>,
}

/// `throw value;`
#[derive(Debug, Clone)]
pub struct ThrowStmt {
    /// Full statement range.
    pub span: Span,
    /// Thrown expression.
    pub value: Expr,
}

/// One `case`/`default` group of a switch statement.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// Range of the whole group.
    pub span: Span,
    /// Case label expressions; empty for `default`.
    pub labels: Vec<Expr>,
    /// Whether this is the `default` group.
    pub is_default: bool,
    /// Statements of the group.
    pub stmts: Vec<Stmt>,
}

/// `switch (scrutinee) { case ...: ... }`
#[derive(Debug, Clone)]
pub struct SwitchStmt {
    /// Full statement range.
    pub span: Span,
    /// Dispatched expression.
    pub scrutinee: Expr,
    /// Case groups in source order.
    pub cases: Vec<SwitchCase>,
}

/// A Java statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `{ ... }`
    Block(Block),
    /// `if`/`else`
    If(IfStmt),
    /// `while`
    While(WhileStmt),
    /// `do`/`while`
    DoWhile(DoWhileStmt),
    /// Counted `for`
    For(ForStmt),
    /// Enhanced `for`
    ForEach(ForEachStmt),
    /// Local variable declaration
    VarDecl(VarDeclStmt),
    /// Expression statement
    Expr(ExprStmt),
    /// `return`
    Return(ReturnStmt),
    /// `throw`
    Throw(ThrowStmt),
    /// `break;`
    Break(Span),
    /// `continue;`
    Continue(Span),
    /// `switch`
    Switch(SwitchStmt),
    /// A lone `;`
    Empty(Span),
    /// A region the parser recovered over. Never matched, never rewritten.
    Error(Span),
}

impl Stmt {
    /// Byte range of the statement.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForEach(s) => s.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) | Stmt::Empty(span) | Stmt::Error(span) => {
                *span
            }
        }
    }

    /// Whether this is a parser-recovered region (excluded from matching).
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Stmt::Error(_))
    }

    /// Whether control never falls out of the bottom of this statement.
    /// Used by the chain iterator's fall-through consistency test and by
    /// switch synthesis to decide whether a `break;` is needed.
    #[must_use]
    pub fn ends_abruptly(&self) -> bool {
        match self {
            Stmt::Return(_) | Stmt::Throw(_) => true,
            Stmt::Block(b) => b.stmts.last().is_some_and(Stmt::ends_abruptly),
            _ => false,
        }
    }
}

/// A name reference.
#[derive(Debug, Clone)]
pub struct NameExpr {
    /// Range of the identifier.
    pub span: Span,
    /// The identifier.
    pub name: CompactString,
    /// Resolved binding; `None` when resolution could not produce one.
    pub binding: Option<BindingId>,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    /// Integer literal.
    Int(i64),
    /// String literal (unescaped value).
    Str(String),
    /// Character literal.
    Char(char),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
}

/// A literal expression.
#[derive(Debug, Clone)]
pub struct LiteralExpr {
    /// Range including quotes for string/char literals.
    pub span: Span,
    /// The value.
    pub value: Lit,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// `lhs op rhs`
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    /// Full expression range.
    pub span: Span,
    /// Operator.
    pub op: BinOp,
    /// Left operand.
    pub lhs: Box<Expr>,
    /// Right operand.
    pub rhs: Box<Expr>,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum UnOp {
    Not,
    Neg,
    PreInc,
    PreDec,
}

/// `op operand`
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    /// Full expression range.
    pub span: Span,
    /// Operator.
    pub op: UnOp,
    /// Operand.
    pub operand: Box<Expr>,
}

/// Postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum PostOp {
    Inc,
    Dec,
}

/// `operand op`
#[derive(Debug, Clone)]
pub struct PostfixExpr {
    /// Full expression range.
    pub span: Span,
    /// Operator.
    pub op: PostOp,
    /// Operand.
    pub operand: Box<Expr>,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

/// `target op= value`
#[derive(Debug, Clone)]
pub struct AssignExpr {
    /// Full expression range.
    pub span: Span,
    /// Operator.
    pub op: AssignOp,
    /// Assignment target.
    pub target: Box<Expr>,
    /// Assigned value.
    pub value: Box<Expr>,
}

/// `array[index]`
#[derive(Debug, Clone)]
pub struct IndexExpr {
    /// Full expression range.
    pub span: Span,
    /// Subscripted expression.
    pub array: Box<Expr>,
    /// Subscript.
    pub index: Box<Expr>,
}

/// `object.name`
#[derive(Debug, Clone)]
pub struct FieldExpr {
    /// Full expression range.
    pub span: Span,
    /// Receiver.
    pub object: Box<Expr>,
    /// Accessed member name.
    pub name: CompactString,
}

/// `receiver.name(args)` or a bare `name(args)` call.
#[derive(Debug, Clone)]
pub struct CallExpr {
    /// Full expression range.
    pub span: Span,
    /// Receiver, absent for unqualified calls.
    pub receiver: Option<Box<Expr>>,
    /// Invoked method name.
    pub name: CompactString,
    /// Arguments.
    pub args: Vec<Expr>,
}

/// `new Type(args)` or `new Type[dims]`
#[derive(Debug, Clone)]
pub struct NewExpr {
    /// Full expression range.
    pub span: Span,
    /// Instantiated type (the array *element* type for array creation).
    pub ty: Type,
    /// Constructor arguments; empty for array creation.
    pub args: Vec<Expr>,
    /// Array dimension expressions; empty for object creation.
    pub dims: Vec<Expr>,
}

/// A Java expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Identifier reference
    Name(NameExpr),
    /// Literal
    Literal(LiteralExpr),
    /// Binary operation
    Binary(BinaryExpr),
    /// Prefix operation
    Unary(UnaryExpr),
    /// Postfix operation
    Postfix(PostfixExpr),
    /// Assignment
    Assign(AssignExpr),
    /// Array subscript
    Index(IndexExpr),
    /// Field access
    Field(FieldExpr),
    /// Method call
    Call(CallExpr),
    /// Object or array creation
    New(NewExpr),
}

impl Expr {
    /// Byte range of the expression.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Expr::Name(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Postfix(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Field(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::New(e) => e.span,
        }
    }

    /// String literal value, if this is one.
    #[must_use]
    pub fn as_str_lit(&self) -> Option<&str> {
        match self {
            Expr::Literal(LiteralExpr {
                value: Lit::Str(s), ..
            }) => Some(s),
            _ => None,
        }
    }
}

/// Whether two expressions denote the same storage location.
///
/// Name references compare by binding identity, never by spelling; an
/// unresolved name is never "the same" as anything. Field chains compare
/// member-wise on a same-reference base.
#[must_use]
pub fn same_reference(a: &Expr, b: &Expr) -> bool {
    match (a, b) {
        (Expr::Name(x), Expr::Name(y)) => match (x.binding, y.binding) {
            (Some(bx), Some(by)) => bx == by,
            _ => false,
        },
        (Expr::Field(x), Expr::Field(y)) => x.name == y.name && same_reference(&x.object, &y.object),
        _ => false,
    }
}

/// The immutable, binding-annotated input to one clean-up computation.
#[derive(Debug, Clone)]
pub struct SourceTree {
    /// Raw text of the underlying buffer.
    pub source: String,
    /// Statement sequence of the compilation region.
    pub body: Vec<Stmt>,
    /// Binding side table.
    pub bindings: Bindings,
}

impl SourceTree {
    /// Literal text of a range. Treated as a fast, synchronous buffer read.
    #[must_use]
    pub fn text(&self, span: Span) -> &str {
        &self.source[span.start..span.end()]
    }

    /// Shallow type inference for the expression positions the clean-up
    /// algorithms consult (receivers, subscripts). Anything deeper is the
    /// resolver's job and comes back through bindings.
    #[must_use]
    pub fn type_of(&self, expr: &Expr) -> Type {
        match expr {
            Expr::Name(n) => n
                .binding
                .map_or(Type::Unknown, |id| self.bindings.type_of(id)),
            Expr::Index(ix) => match self.type_of(&ix.array) {
                Type::Array(elem) => *elem,
                _ => Type::Unknown,
            },
            Expr::Literal(l) => match &l.value {
                Lit::Int(_) => Type::Int,
                Lit::Char(_) => Type::Char,
                Lit::Bool(_) => Type::Boolean,
                Lit::Str(_) => Type::Named {
                    simple: CompactString::from("String"),
                    qualified: Some("java.lang.String".to_owned()),
                    collection: false,
                    type_args: Vec::new(),
                },
                Lit::Null => Type::Unknown,
            },
            _ => Type::Unknown,
        }
    }
}
