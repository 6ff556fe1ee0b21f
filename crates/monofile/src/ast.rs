//! Go syntax tree handed over by a loader
//!
//! The tree mirrors the shape of Go's own `go/ast` closely enough that a
//! front end can serialize it directly. Identifiers carry the loader-assigned
//! [`IdentId`] used to look up resolved symbols; declarations, specs, fields
//! and statements carry a [`NodeId`] and a [`Span`] so comments can be
//! attached to them.

use serde::{Deserialize, Serialize};

/// Loader-assigned identity of one identifier occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentId(pub u32);

/// Identity of a comment-bearing node (file, declaration, spec, field, statement, clause)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// A source position, 1-based line and column
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Half-open source range of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// A span covering lines `start..=end`
    pub const fn lines(start: u32, end: u32) -> Self {
        Self {
            start: Pos::new(start, 1),
            end: Pos::new(end, u32::MAX),
        }
    }

    /// Whether `other` lies entirely inside this span
    pub fn contains(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    /// `None` for identifiers synthesized after loading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IdentId>,
}

impl Ident {
    /// An identifier without symbol information
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn with_id(name: impl Into<String>, id: IdentId) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// One source file of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub id: NodeId,
    pub span: Span,
    /// Span of the `package name` clause
    pub package_span: Span,
    pub package: Ident,
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub comments: Vec<CommentGroup>,
}

impl File {
    /// All import specs of the file, in source order
    pub fn import_specs(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Gen(gen_decl) if gen_decl.token == DeclToken::Import => {
                    Some(gen_decl.specs.iter())
                }
                _ => None,
            })
            .flatten()
            .filter_map(|spec| match spec {
                Spec::Import(import) => Some(import),
                _ => None,
            })
    }
}

/// A run of adjacent `//` or `/* */` comments, stored verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentGroup {
    pub span: Span,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

impl Decl {
    pub const fn id(&self) -> NodeId {
        match self {
            Self::Gen(decl) => decl.id,
            Self::Func(decl) => decl.id,
        }
    }

    pub const fn span(&self) -> Span {
        match self {
            Self::Gen(decl) => decl.span,
            Self::Func(decl) => decl.span,
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self, Self::Gen(decl) if decl.token == DeclToken::Import)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclToken {
    Import,
    Const,
    Type,
    Var,
}

impl DeclToken {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Const => "const",
            Self::Type => "type",
            Self::Var => "var",
        }
    }
}

/// `import`, `const`, `type` or `var` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenDecl {
    pub id: NodeId,
    pub span: Span,
    pub token: DeclToken,
    /// Whether the specs were written inside parentheses
    #[serde(default)]
    pub grouped: bool,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

impl Spec {
    pub const fn id(&self) -> NodeId {
        match self {
            Self::Import(spec) => spec.id,
            Self::Value(spec) => spec.id,
            Self::Type(spec) => spec.id,
        }
    }

    pub const fn span(&self) -> Span {
        match self {
            Self::Import(spec) => spec.span,
            Self::Value(spec) => spec.span,
            Self::Type(spec) => spec.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub id: NodeId,
    pub span: Span,
    /// Local name, including `_` and `.`
    #[serde(default)]
    pub name: Option<Ident>,
    /// Unquoted import path
    pub path: String,
}

impl ImportSpec {
    /// `import . "path"`, which brings every exported name into file scope
    pub fn is_dot(&self) -> bool {
        self.name.as_ref().is_some_and(|name| name.name == ".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub id: NodeId,
    pub span: Span,
    pub names: Vec<Ident>,
    #[serde(default)]
    pub ty: Option<Expr>,
    #[serde(default)]
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    #[serde(default)]
    pub type_params: Vec<Field>,
    /// `type A = B`
    #[serde(default)]
    pub alias: bool,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub id: NodeId,
    pub span: Span,
    #[serde(default)]
    pub recv: Option<Vec<Field>>,
    pub name: Ident,
    pub ty: FuncType,
    #[serde(default)]
    pub body: Option<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncType {
    #[serde(default)]
    pub type_params: Vec<Field>,
    #[serde(default)]
    pub params: Vec<Field>,
    #[serde(default)]
    pub results: Vec<Field>,
}

/// Struct field, interface method, parameter or result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: NodeId,
    pub span: Span,
    /// Empty for embedded fields and unnamed parameters
    #[serde(default)]
    pub names: Vec<Ident>,
    pub ty: Expr,
    /// Raw tag literal including its quotes
    #[serde(default)]
    pub tag: Option<String>,
}

impl Field {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Ident(Ident),
    /// Literal source text: `42`, `"hi"`, `'x'`, `` `raw` ``
    BasicLit(String),
    CompositeLit {
        #[serde(default)]
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    Paren(Box<Expr>),
    Selector {
        x: Box<Expr>,
        sel: Ident,
    },
    Index {
        x: Box<Expr>,
        indices: Vec<Expr>,
    },
    Slice {
        x: Box<Expr>,
        #[serde(default)]
        low: Option<Box<Expr>>,
        #[serde(default)]
        high: Option<Box<Expr>>,
        #[serde(default)]
        max: Option<Box<Expr>>,
    },
    /// `x.(T)`; `ty` is `None` for `x.(type)` in a type switch
    TypeAssert {
        x: Box<Expr>,
        #[serde(default)]
        ty: Option<Box<Expr>>,
    },
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
        #[serde(default)]
        ellipsis: bool,
    },
    Star(Box<Expr>),
    Unary {
        op: String,
        x: Box<Expr>,
    },
    Binary {
        x: Box<Expr>,
        op: String,
        y: Box<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayType {
        #[serde(default)]
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
    },
    /// `...T` in a parameter list, or bare `...` as an array length
    Ellipsis(Option<Box<Expr>>),
    StructType(Vec<Field>),
    FuncType(FuncType),
    InterfaceType(Vec<Field>),
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn selector(x: Self, sel: Ident) -> Self {
        Self::Selector {
            x: Box::new(x),
            sel,
        }
    }

    pub fn call(fun: Self, args: Vec<Self>) -> Self {
        Self::Call {
            fun: Box::new(fun),
            args,
            ellipsis: false,
        }
    }

    pub fn star(x: Self) -> Self {
        Self::Star(Box::new(x))
    }

    pub fn unary(op: &str, x: Self) -> Self {
        Self::Unary {
            op: op.to_owned(),
            x: Box::new(x),
        }
    }

    pub fn binary(x: Self, op: &str, y: Self) -> Self {
        Self::Binary {
            x: Box::new(x),
            op: op.to_owned(),
            y: Box::new(y),
        }
    }

    pub fn lit(value: impl Into<String>) -> Self {
        Self::BasicLit(value.into())
    }

    pub fn composite(ty: Self, elts: Vec<Self>) -> Self {
        Self::CompositeLit {
            ty: Some(Box::new(ty)),
            elts,
        }
    }

    pub fn key_value(key: Self, value: Self) -> Self {
        Self::KeyValue {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Decl(GenDecl),
    Empty,
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
        inc: bool,
    },
    /// `=`, `:=` and the compound assignment operators
    Assign {
        lhs: Vec<Expr>,
        op: String,
        rhs: Vec<Expr>,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    /// `break`, `continue`, `goto` or `fallthrough`
    Branch {
        keyword: String,
        #[serde(default)]
        label: Option<Ident>,
    },
    Block(Block),
    If {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: Block,
        #[serde(default)]
        els: Option<Box<Stmt>>,
    },
    Switch {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
    },
    TypeSwitch {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        assign: Box<Stmt>,
        clauses: Vec<CaseClause>,
    },
    Select(Vec<CommClause>),
    For {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        #[serde(default)]
        key: Option<Expr>,
        #[serde(default)]
        value: Option<Expr>,
        /// `:=` rather than `=`
        #[serde(default)]
        define: bool,
        x: Expr,
        body: Block,
    },
}

/// `case a, b:` or `default:` (empty `list`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseClause {
    pub id: NodeId,
    pub span: Span,
    #[serde(default)]
    pub list: Vec<Expr>,
    pub body: Vec<Stmt>,
}

/// `case <-ch:` inside a select, `default:` when `comm` is `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommClause {
    pub id: NodeId,
    pub span: Span,
    #[serde(default)]
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let outer = Span::lines(3, 10);
        assert!(outer.contains(Span::lines(4, 5)));
        assert!(outer.contains(Span::new(Pos::new(3, 4), Pos::new(3, 9))));
        assert!(!outer.contains(Span::lines(9, 11)));
        assert!(!Span::lines(4, 5).contains(outer));
    }

    #[test]
    fn test_import_specs_skip_other_decls() {
        let import = |id, path: &str| {
            Spec::Import(ImportSpec {
                id: NodeId(id),
                span: Span::lines(id, id),
                name: None,
                path: path.to_owned(),
            })
        };
        let file = File {
            name: "a.go".to_owned(),
            id: NodeId(0),
            span: Span::lines(1, 20),
            package_span: Span::lines(1, 1),
            package: Ident::new("a"),
            decls: vec![
                Decl::Gen(GenDecl {
                    id: NodeId(1),
                    span: Span::lines(3, 6),
                    token: DeclToken::Import,
                    grouped: true,
                    specs: vec![import(4, "fmt"), import(5, "strings")],
                }),
                Decl::Gen(GenDecl {
                    id: NodeId(7),
                    span: Span::lines(8, 8),
                    token: DeclToken::Var,
                    grouped: false,
                    specs: vec![Spec::Value(ValueSpec {
                        id: NodeId(8),
                        span: Span::lines(8, 8),
                        names: vec![Ident::new("x")],
                        ty: None,
                        values: vec![Expr::lit("1")],
                    })],
                }),
            ],
            comments: Vec::new(),
        };

        let paths: Vec<_> = file.import_specs().map(|spec| spec.path.as_str()).collect();
        assert_eq!(paths, ["fmt", "strings"]);
        assert!(file.decls[0].is_import());
        assert!(!file.decls[1].is_import());
    }

    #[test]
    fn test_expr_json_shape() {
        let expr = Expr::selector(
            Expr::Ident(Ident::with_id("fmt", IdentId(3))),
            Ident::new("Println"),
        );
        let json = serde_json::to_string(&expr).unwrap();
        assert_eq!(
            json,
            r#"{"selector":{"x":{"ident":{"name":"fmt","id":3}},"sel":{"name":"Println"}}}"#
        );
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}
