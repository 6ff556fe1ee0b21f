//! Mutable top-down traversal of the syntax tree
//!
//! Implementors override the hooks they care about and call the matching
//! `walk_*` function to continue into children. A hook that replaces its
//! node decides itself whether the replacement is walked.

use crate::{
    ast::{
        Block, CaseClause, CommClause, Decl, Expr, Field, File, FuncType, Ident, NodeId, Span,
        Spec, Stmt, StmtKind,
    },
    error::Result,
};

/// Syntactic position of an identifier, as far as symbol lookup cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentParent {
    /// Any expression position, including selector members
    Expr,
    /// Operand of a pointer type or dereference: `*T`
    Star,
    /// Name or bare type of a field, parameter or result
    Field,
    /// Name introduced by a declaration or spec
    Decl,
    /// Statement label
    Label,
    /// Local name of an import
    Import,
}

pub trait Transformer {
    /// Called for every comment-bearing node before its children are walked
    fn visit_node(&mut self, _id: NodeId, _span: Span) {}

    fn visit_decl(&mut self, decl: &mut Decl) -> Result<()> {
        walk_decl(self, decl)
    }

    fn visit_spec(&mut self, spec: &mut Spec) -> Result<()> {
        walk_spec(self, spec)
    }

    fn visit_field(&mut self, field: &mut Field) -> Result<()> {
        walk_field(self, field)
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        walk_expr(self, expr)
    }

    fn visit_ident(&mut self, _ident: &mut Ident, _parent: IdentParent) -> Result<()> {
        Ok(())
    }
}

pub fn walk_file<V: Transformer + ?Sized>(visitor: &mut V, file: &mut File) -> Result<()> {
    visitor.visit_node(file.id, file.span);
    for decl in &mut file.decls {
        visitor.visit_decl(decl)?;
    }
    Ok(())
}

pub fn walk_decl<V: Transformer + ?Sized>(visitor: &mut V, decl: &mut Decl) -> Result<()> {
    visitor.visit_node(decl.id(), decl.span());
    match decl {
        Decl::Gen(gen_decl) => {
            for spec in &mut gen_decl.specs {
                visitor.visit_spec(spec)?;
            }
        }
        Decl::Func(func) => {
            if let Some(recv) = &mut func.recv {
                walk_fields(visitor, recv)?;
            }
            visitor.visit_ident(&mut func.name, IdentParent::Decl)?;
            walk_func_type(visitor, &mut func.ty)?;
            if let Some(body) = &mut func.body {
                walk_block(visitor, body)?;
            }
        }
    }
    Ok(())
}

pub fn walk_spec<V: Transformer + ?Sized>(visitor: &mut V, spec: &mut Spec) -> Result<()> {
    visitor.visit_node(spec.id(), spec.span());
    match spec {
        Spec::Import(import) => {
            if let Some(name) = &mut import.name {
                visitor.visit_ident(name, IdentParent::Import)?;
            }
        }
        Spec::Value(value) => {
            for name in &mut value.names {
                visitor.visit_ident(name, IdentParent::Decl)?;
            }
            if let Some(ty) = &mut value.ty {
                visitor.visit_expr(ty)?;
            }
            for expr in &mut value.values {
                visitor.visit_expr(expr)?;
            }
        }
        Spec::Type(ty) => {
            visitor.visit_ident(&mut ty.name, IdentParent::Decl)?;
            walk_fields(visitor, &mut ty.type_params)?;
            visitor.visit_expr(&mut ty.ty)?;
        }
    }
    Ok(())
}

pub fn walk_fields<V: Transformer + ?Sized>(visitor: &mut V, fields: &mut [Field]) -> Result<()> {
    for field in fields {
        visitor.visit_field(field)?;
    }
    Ok(())
}

pub fn walk_field<V: Transformer + ?Sized>(visitor: &mut V, field: &mut Field) -> Result<()> {
    visitor.visit_node(field.id, field.span);
    for name in &mut field.names {
        visitor.visit_ident(name, IdentParent::Field)?;
    }
    match &mut field.ty {
        Expr::Ident(ident) => visitor.visit_ident(ident, IdentParent::Field),
        ty => visitor.visit_expr(ty),
    }
}

pub fn walk_func_type<V: Transformer + ?Sized>(visitor: &mut V, ty: &mut FuncType) -> Result<()> {
    walk_fields(visitor, &mut ty.type_params)?;
    walk_fields(visitor, &mut ty.params)?;
    walk_fields(visitor, &mut ty.results)
}

pub fn walk_block<V: Transformer + ?Sized>(visitor: &mut V, block: &mut Block) -> Result<()> {
    walk_stmts(visitor, &mut block.stmts)
}

fn walk_stmts<V: Transformer + ?Sized>(visitor: &mut V, stmts: &mut [Stmt]) -> Result<()> {
    for stmt in stmts {
        visitor.visit_stmt(stmt)?;
    }
    Ok(())
}

fn walk_exprs<V: Transformer + ?Sized>(visitor: &mut V, exprs: &mut [Expr]) -> Result<()> {
    for expr in exprs {
        visitor.visit_expr(expr)?;
    }
    Ok(())
}

fn walk_opt_expr<V: Transformer + ?Sized>(
    visitor: &mut V,
    expr: Option<&mut Box<Expr>>,
) -> Result<()> {
    match expr {
        Some(expr) => visitor.visit_expr(expr),
        None => Ok(()),
    }
}

fn walk_opt_stmt<V: Transformer + ?Sized>(
    visitor: &mut V,
    stmt: Option<&mut Box<Stmt>>,
) -> Result<()> {
    match stmt {
        Some(stmt) => visitor.visit_stmt(stmt),
        None => Ok(()),
    }
}

fn walk_case_clauses<V: Transformer + ?Sized>(
    visitor: &mut V,
    clauses: &mut [CaseClause],
) -> Result<()> {
    for clause in clauses {
        visitor.visit_node(clause.id, clause.span);
        walk_exprs(visitor, &mut clause.list)?;
        walk_stmts(visitor, &mut clause.body)?;
    }
    Ok(())
}

fn walk_comm_clauses<V: Transformer + ?Sized>(
    visitor: &mut V,
    clauses: &mut [CommClause],
) -> Result<()> {
    for clause in clauses {
        visitor.visit_node(clause.id, clause.span);
        walk_opt_stmt(visitor, clause.comm.as_mut())?;
        walk_stmts(visitor, &mut clause.body)?;
    }
    Ok(())
}

pub fn walk_stmt<V: Transformer + ?Sized>(visitor: &mut V, stmt: &mut Stmt) -> Result<()> {
    visitor.visit_node(stmt.id, stmt.span);
    match &mut stmt.kind {
        StmtKind::Decl(decl) => {
            for spec in &mut decl.specs {
                visitor.visit_spec(spec)?;
            }
        }
        StmtKind::Empty => {}
        StmtKind::Labeled { label, stmt } => {
            visitor.visit_ident(label, IdentParent::Label)?;
            visitor.visit_stmt(stmt)?;
        }
        StmtKind::Expr(expr) | StmtKind::Go(expr) | StmtKind::Defer(expr) => {
            visitor.visit_expr(expr)?;
        }
        StmtKind::Send { chan, value } => {
            visitor.visit_expr(chan)?;
            visitor.visit_expr(value)?;
        }
        StmtKind::IncDec { x, .. } => visitor.visit_expr(x)?,
        StmtKind::Assign { lhs, rhs, .. } => {
            walk_exprs(visitor, lhs)?;
            walk_exprs(visitor, rhs)?;
        }
        StmtKind::Return(results) => walk_exprs(visitor, results)?,
        StmtKind::Branch { label, .. } => {
            if let Some(label) = label {
                visitor.visit_ident(label, IdentParent::Label)?;
            }
        }
        StmtKind::Block(block) => walk_block(visitor, block)?,
        StmtKind::If {
            init,
            cond,
            body,
            els,
        } => {
            walk_opt_stmt(visitor, init.as_mut())?;
            visitor.visit_expr(cond)?;
            walk_block(visitor, body)?;
            walk_opt_stmt(visitor, els.as_mut())?;
        }
        StmtKind::Switch { init, tag, clauses } => {
            walk_opt_stmt(visitor, init.as_mut())?;
            if let Some(tag) = tag {
                visitor.visit_expr(tag)?;
            }
            walk_case_clauses(visitor, clauses)?;
        }
        StmtKind::TypeSwitch {
            init,
            assign,
            clauses,
        } => {
            walk_opt_stmt(visitor, init.as_mut())?;
            visitor.visit_stmt(assign)?;
            walk_case_clauses(visitor, clauses)?;
        }
        StmtKind::Select(clauses) => walk_comm_clauses(visitor, clauses)?,
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            walk_opt_stmt(visitor, init.as_mut())?;
            if let Some(cond) = cond {
                visitor.visit_expr(cond)?;
            }
            walk_opt_stmt(visitor, post.as_mut())?;
            walk_block(visitor, body)?;
        }
        StmtKind::Range {
            key,
            value,
            x,
            body,
            ..
        } => {
            if let Some(key) = key {
                visitor.visit_expr(key)?;
            }
            if let Some(value) = value {
                visitor.visit_expr(value)?;
            }
            visitor.visit_expr(x)?;
            walk_block(visitor, body)?;
        }
    }
    Ok(())
}

pub fn walk_expr<V: Transformer + ?Sized>(visitor: &mut V, expr: &mut Expr) -> Result<()> {
    match expr {
        Expr::Ident(ident) => visitor.visit_ident(ident, IdentParent::Expr),
        Expr::BasicLit(_) => Ok(()),
        Expr::CompositeLit { ty, elts } => {
            walk_opt_expr(visitor, ty.as_mut())?;
            walk_exprs(visitor, elts)
        }
        Expr::FuncLit { ty, body } => {
            walk_func_type(visitor, ty)?;
            walk_block(visitor, body)
        }
        Expr::Paren(x) => visitor.visit_expr(x),
        Expr::Selector { x, sel } => {
            visitor.visit_expr(x)?;
            visitor.visit_ident(sel, IdentParent::Expr)
        }
        Expr::Index { x, indices } => {
            visitor.visit_expr(x)?;
            walk_exprs(visitor, indices)
        }
        Expr::Slice { x, low, high, max } => {
            visitor.visit_expr(x)?;
            walk_opt_expr(visitor, low.as_mut())?;
            walk_opt_expr(visitor, high.as_mut())?;
            walk_opt_expr(visitor, max.as_mut())
        }
        Expr::TypeAssert { x, ty } => {
            visitor.visit_expr(x)?;
            walk_opt_expr(visitor, ty.as_mut())
        }
        Expr::Call { fun, args, .. } => {
            visitor.visit_expr(fun)?;
            walk_exprs(visitor, args)
        }
        Expr::Star(x) => match x.as_mut() {
            Expr::Ident(ident) => visitor.visit_ident(ident, IdentParent::Star),
            x => visitor.visit_expr(x),
        },
        Expr::Unary { x, .. } => visitor.visit_expr(x),
        Expr::Binary { x, y, .. } => {
            visitor.visit_expr(x)?;
            visitor.visit_expr(y)
        }
        Expr::KeyValue { key, value } => {
            visitor.visit_expr(key)?;
            visitor.visit_expr(value)
        }
        Expr::ArrayType { len, elt } => {
            walk_opt_expr(visitor, len.as_mut())?;
            visitor.visit_expr(elt)
        }
        Expr::Ellipsis(elt) => walk_opt_expr(visitor, elt.as_mut()),
        Expr::StructType(fields) | Expr::InterfaceType(fields) => walk_fields(visitor, fields),
        Expr::FuncType(ty) => walk_func_type(visitor, ty),
        Expr::MapType { key, value } => {
            visitor.visit_expr(key)?;
            visitor.visit_expr(value)
        }
        Expr::ChanType { value, .. } => visitor.visit_expr(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Pos, StmtKind};

    /// Records identifier names with their parent kind, in visit order
    #[derive(Default)]
    struct Recorder {
        idents: Vec<(String, IdentParent)>,
        nodes: Vec<NodeId>,
    }

    impl Transformer for Recorder {
        fn visit_node(&mut self, id: NodeId, _span: Span) {
            self.nodes.push(id);
        }

        fn visit_ident(&mut self, ident: &mut Ident, parent: IdentParent) -> Result<()> {
            self.idents.push((ident.name.clone(), parent));
            Ok(())
        }
    }

    fn span() -> Span {
        Span::new(Pos::new(1, 1), Pos::new(1, 2))
    }

    #[test]
    fn test_star_and_field_positions_are_distinguished() {
        // struct { *parent; Name string }
        let mut expr = Expr::StructType(vec![
            Field {
                id: NodeId(1),
                span: span(),
                names: Vec::new(),
                ty: Expr::star(Expr::Ident(Ident::new("parent"))),
                tag: None,
            },
            Field {
                id: NodeId(2),
                span: span(),
                names: vec![Ident::new("Name")],
                ty: Expr::Ident(Ident::new("string")),
                tag: None,
            },
        ]);

        let mut recorder = Recorder::default();
        recorder.visit_expr(&mut expr).unwrap();
        assert_eq!(
            recorder.idents,
            [
                ("parent".to_owned(), IdentParent::Star),
                ("Name".to_owned(), IdentParent::Field),
                ("string".to_owned(), IdentParent::Field),
            ]
        );
        assert_eq!(recorder.nodes, [NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_statements_and_clauses_report_nodes() {
        let mut stmt = Stmt {
            id: NodeId(10),
            span: span(),
            kind: StmtKind::Switch {
                init: None,
                tag: Some(Expr::Ident(Ident::new("x"))),
                clauses: vec![CaseClause {
                    id: NodeId(11),
                    span: span(),
                    list: vec![Expr::lit("1")],
                    body: vec![Stmt {
                        id: NodeId(12),
                        span: span(),
                        kind: StmtKind::Branch {
                            keyword: "goto".to_owned(),
                            label: Some(Ident::new("done")),
                        },
                    }],
                }],
            },
        };

        let mut recorder = Recorder::default();
        recorder.visit_stmt(&mut stmt).unwrap();
        assert_eq!(recorder.nodes, [NodeId(10), NodeId(11), NodeId(12)]);
        assert_eq!(
            recorder.idents,
            [
                ("x".to_owned(), IdentParent::Expr),
                ("done".to_owned(), IdentParent::Label),
            ]
        );
    }
}
