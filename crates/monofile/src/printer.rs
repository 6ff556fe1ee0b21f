//! Go source printer
//!
//! Renders the syntax tree back to gofmt-style text: tabs for indentation,
//! one statement per line, blocks on their own lines. Comments are printed
//! only where a node owns whole lines (declarations, specs, struct and
//! interface members, statements and clauses); simple statements inside
//! `if`, `for` and `switch` headers and parameter lists print bare, since a
//! line comment there would swallow the rest of the line.

use crate::{
    ast::{
        Block, CaseClause, ChanDir, CommClause, CommentGroup, Decl, Expr, Field, FuncDecl,
        FuncType, GenDecl, NodeId, Spec, Stmt, StmtKind,
    },
    comment_filter::{CommentMap, Placement},
};

#[derive(Debug, Default)]
pub struct Printer<'a> {
    out: String,
    indent: usize,
    /// Indentation is written lazily so blank lines stay empty
    line_start: bool,
    comments: Option<&'a CommentMap>,
}

impl<'a> Printer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A printer placing the comments of `comments` next to their nodes
    pub fn with_comments(comments: &'a CommentMap) -> Self {
        Self {
            comments: Some(comments),
            ..Self::default()
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn write(&mut self, text: &str) {
        if self.line_start {
            for _ in 0..self.indent {
                self.out.push('\t');
            }
            self.line_start = false;
        }
        self.out.push_str(text);
    }

    pub fn newline(&mut self) {
        self.out.push('\n');
        self.line_start = true;
    }

    /// Print a comment group verbatim, one source line per output line
    pub fn comment_group(&mut self, group: &CommentGroup) {
        for (index, line) in group.lines.iter().enumerate() {
            if index > 0 {
                self.newline();
            }
            self.write(line.trim_end());
        }
    }

    fn leading_comments(&mut self, id: NodeId) {
        let Some(comments) = self.comments else {
            return;
        };
        for group in comments.placed(id, Placement::Leading) {
            self.comment_group(group);
            self.newline();
        }
    }

    /// Comments ending the node's last line, then those left inside it
    fn trailing_comments(&mut self, id: NodeId) {
        self.line_end_comments(id);
        for group in self.dangling(id) {
            self.newline();
            self.comment_group(group);
        }
    }

    fn line_end_comments(&mut self, id: NodeId) {
        let Some(comments) = self.comments else {
            return;
        };
        for group in comments.placed(id, Placement::Trailing) {
            self.write(" ");
            self.comment_group(group);
        }
    }

    fn dangling(&self, id: NodeId) -> Vec<&'a CommentGroup> {
        self.comments
            .map(|comments| comments.placed(id, Placement::Dangling).collect())
            .unwrap_or_default()
    }

    /// Print a top-level declaration with its comments
    pub fn decl(&mut self, decl: &Decl) {
        self.leading_comments(decl.id());
        match decl {
            Decl::Gen(gen_decl) => self.gen_decl(gen_decl),
            Decl::Func(func) => self.func_decl(func),
        }
        match decl {
            // dangling comments already went into the body
            Decl::Func(func) if func.body.is_some() => self.line_end_comments(func.id),
            _ => self.trailing_comments(decl.id()),
        }
    }

    fn gen_decl(&mut self, decl: &GenDecl) {
        self.write(decl.token.keyword());
        match decl.specs.as_slice() {
            [spec] if !decl.grouped => {
                self.write(" ");
                self.spec(spec);
                self.trailing_comments(spec.id());
            }
            specs => {
                self.write(" (");
                self.indent += 1;
                for spec in specs {
                    self.newline();
                    self.leading_comments(spec.id());
                    self.spec(spec);
                    self.trailing_comments(spec.id());
                }
                self.indent -= 1;
                self.newline();
                self.write(")");
            }
        }
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(import) => {
                if let Some(name) = &import.name {
                    self.write(&name.name);
                    self.write(" ");
                }
                self.write(&format!("\"{}\"", import.path));
            }
            Spec::Value(value) => {
                self.idents(value.names.iter().map(|name| name.name.as_str()));
                if let Some(ty) = &value.ty {
                    self.write(" ");
                    self.expr(ty);
                }
                if !value.values.is_empty() {
                    self.write(" = ");
                    self.exprs(&value.values);
                }
            }
            Spec::Type(ty) => {
                self.write(&ty.name.name);
                if !ty.type_params.is_empty() {
                    self.write("[");
                    self.params(&ty.type_params);
                    self.write("]");
                }
                self.write(if ty.alias { " = " } else { " " });
                self.expr(&ty.ty);
            }
        }
    }

    fn func_decl(&mut self, func: &FuncDecl) {
        self.write("func ");
        if let Some(recv) = &func.recv {
            self.write("(");
            self.params(recv);
            self.write(") ");
        }
        self.write(&func.name.name);
        self.signature(&func.ty);
        if let Some(body) = &func.body {
            self.write(" ");
            self.owned_block(body, func.id);
        }
    }

    fn signature(&mut self, ty: &FuncType) {
        if !ty.type_params.is_empty() {
            self.write("[");
            self.params(&ty.type_params);
            self.write("]");
        }
        self.write("(");
        self.params(&ty.params);
        self.write(")");
        match ty.results.as_slice() {
            [] => {}
            [result] if result.names.is_empty() => {
                self.write(" ");
                self.expr(&result.ty);
            }
            results => {
                self.write(" (");
                self.params(results);
                self.write(")");
            }
        }
    }

    fn idents<'n>(&mut self, names: impl Iterator<Item = &'n str>) {
        for (index, name) in names.enumerate() {
            if index > 0 {
                self.write(", ");
            }
            self.write(name);
        }
    }

    /// Parameter, result, receiver or type parameter list, without comments
    fn params(&mut self, fields: &[Field]) {
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                self.write(", ");
            }
            if !field.names.is_empty() {
                self.idents(field.names.iter().map(|name| name.name.as_str()));
                self.write(" ");
            }
            self.expr(&field.ty);
        }
    }

    /// Body of a struct or interface type, one member per line
    fn members(&mut self, keyword: &str, fields: &[Field], interface: bool) {
        self.write(keyword);
        if fields.is_empty() {
            self.write("{}");
            return;
        }
        self.write(" {");
        self.indent += 1;
        for field in fields {
            self.newline();
            self.leading_comments(field.id);
            match (&field.ty, field.names.as_slice()) {
                (Expr::FuncType(ty), [name]) if interface => {
                    self.write(&name.name);
                    self.signature(ty);
                }
                (ty, names) => {
                    if !names.is_empty() {
                        self.idents(names.iter().map(|name| name.name.as_str()));
                        self.write(" ");
                    }
                    self.expr(ty);
                }
            }
            if let Some(tag) = &field.tag {
                self.write(" ");
                self.write(tag);
            }
            self.trailing_comments(field.id);
        }
        self.indent -= 1;
        self.newline();
        self.write("}");
    }

    fn block(&mut self, block: &Block) {
        self.write("{");
        if block.stmts.is_empty() {
            self.write("}");
            return;
        }
        self.indent += 1;
        self.stmt_list(&block.stmts);
        self.indent -= 1;
        self.newline();
        self.write("}");
    }

    /// A block that also holds the dangling comments of `owner`, after
    /// its statements and before the closing brace
    fn owned_block(&mut self, block: &Block, owner: NodeId) {
        let dangling = self.dangling(owner);
        if dangling.is_empty() {
            self.block(block);
            return;
        }
        self.write("{");
        self.indent += 1;
        self.stmt_list(&block.stmts);
        for group in dangling {
            self.newline();
            self.comment_group(group);
        }
        self.indent -= 1;
        self.newline();
        self.write("}");
    }

    fn stmt_list(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if stmt.kind == StmtKind::Empty {
                continue;
            }
            self.newline();
            self.stmt(stmt);
        }
    }

    /// A statement on its own line, with comments
    pub fn stmt(&mut self, stmt: &Stmt) {
        self.leading_comments(stmt.id);
        match &stmt.kind {
            StmtKind::Labeled { label, stmt: inner } => {
                // Labels sit one level left of the statement they label
                let indent = self.indent;
                self.indent = indent.saturating_sub(1);
                self.write(&label.name);
                self.write(":");
                self.indent = indent;
                if inner.kind != StmtKind::Empty {
                    self.newline();
                    self.stmt(inner);
                }
            }
            StmtKind::Block(block) => self.owned_block(block, stmt.id),
            StmtKind::If { .. } => self.if_stmt(stmt),
            StmtKind::Switch { init, tag, clauses } => {
                self.write("switch");
                self.header_init(init.as_deref());
                if let Some(tag) = tag {
                    self.write(" ");
                    self.expr(tag);
                }
                self.write(" {");
                self.case_clauses(clauses);
            }
            StmtKind::TypeSwitch {
                init,
                assign,
                clauses,
            } => {
                self.write("switch");
                self.header_init(init.as_deref());
                self.write(" ");
                self.simple_stmt(assign);
                self.write(" {");
                self.case_clauses(clauses);
            }
            StmtKind::Select(clauses) => {
                self.write("select {");
                self.comm_clauses(clauses);
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.write("for");
                if init.is_some() || post.is_some() {
                    self.write(" ");
                    if let Some(init) = init {
                        self.simple_stmt(init);
                    }
                    self.write(";");
                    if let Some(cond) = cond {
                        self.write(" ");
                        self.expr(cond);
                    }
                    self.write(";");
                    if let Some(post) = post {
                        self.write(" ");
                        self.simple_stmt(post);
                    }
                } else if let Some(cond) = cond {
                    self.write(" ");
                    self.expr(cond);
                }
                self.write(" ");
                self.owned_block(body, stmt.id);
            }
            StmtKind::Range {
                key,
                value,
                define,
                x,
                body,
            } => {
                self.write("for ");
                if let Some(key) = key {
                    self.expr(key);
                    if let Some(value) = value {
                        self.write(", ");
                        self.expr(value);
                    }
                    self.write(if *define { " := " } else { " = " });
                }
                self.write("range ");
                self.expr(x);
                self.write(" ");
                self.owned_block(body, stmt.id);
            }
            _ => self.simple_stmt(stmt),
        }
        self.stmt_comments_after(stmt);
    }

    fn stmt_comments_after(&mut self, stmt: &Stmt) {
        match stmt.kind {
            // these print their dangling comments inside the body
            StmtKind::Block(_) | StmtKind::For { .. } | StmtKind::Range { .. } => {
                self.line_end_comments(stmt.id);
            }
            _ => self.trailing_comments(stmt.id),
        }
    }

    fn header_init(&mut self, init: Option<&Stmt>) {
        if let Some(init) = init {
            self.write(" ");
            self.simple_stmt(init);
            self.write(";");
        }
    }

    fn if_stmt(&mut self, stmt: &Stmt) {
        let StmtKind::If {
            init,
            cond,
            body,
            els,
        } = &stmt.kind
        else {
            return self.stmt(stmt);
        };
        self.write("if");
        self.header_init(init.as_deref());
        self.write(" ");
        self.expr(cond);
        self.write(" ");
        self.block(body);
        if let Some(els) = els {
            self.write(" else ");
            match &els.kind {
                StmtKind::If { .. } => self.if_stmt(els),
                StmtKind::Block(block) => self.block(block),
                _ => self.stmt(els),
            }
        }
    }

    fn case_clauses(&mut self, clauses: &[CaseClause]) {
        for clause in clauses {
            self.newline();
            self.leading_comments(clause.id);
            if clause.list.is_empty() {
                self.write("default:");
            } else {
                self.write("case ");
                self.exprs(&clause.list);
                self.write(":");
            }
            self.trailing_comments(clause.id);
            self.indent += 1;
            self.stmt_list(&clause.body);
            self.indent -= 1;
        }
        self.newline();
        self.write("}");
    }

    fn comm_clauses(&mut self, clauses: &[CommClause]) {
        for clause in clauses {
            self.newline();
            self.leading_comments(clause.id);
            match &clause.comm {
                Some(comm) => {
                    self.write("case ");
                    self.simple_stmt(comm);
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.trailing_comments(clause.id);
            self.indent += 1;
            self.stmt_list(&clause.body);
            self.indent -= 1;
        }
        self.newline();
        self.write("}");
    }

    /// A statement that fits in a header, without comments
    fn simple_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Decl(decl) => self.gen_decl(decl),
            StmtKind::Empty => {}
            StmtKind::Expr(expr) => self.expr(expr),
            StmtKind::Send { chan, value } => {
                self.expr(chan);
                self.write(" <- ");
                self.expr(value);
            }
            StmtKind::IncDec { x, inc } => {
                self.expr(x);
                self.write(if *inc { "++" } else { "--" });
            }
            StmtKind::Assign { lhs, op, rhs } => {
                self.exprs(lhs);
                self.write(" ");
                self.write(op);
                self.write(" ");
                self.exprs(rhs);
            }
            StmtKind::Go(call) => {
                self.write("go ");
                self.expr(call);
            }
            StmtKind::Defer(call) => {
                self.write("defer ");
                self.expr(call);
            }
            StmtKind::Return(results) => {
                self.write("return");
                if !results.is_empty() {
                    self.write(" ");
                    self.exprs(results);
                }
            }
            StmtKind::Branch { keyword, label } => {
                self.write(keyword);
                if let Some(label) = label {
                    self.write(" ");
                    self.write(&label.name);
                }
            }
            _ => self.stmt(stmt),
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) {
        for (index, expr) in exprs.iter().enumerate() {
            if index > 0 {
                self.write(", ");
            }
            self.expr(expr);
        }
    }

    fn opt_expr(&mut self, expr: Option<&Expr>) {
        if let Some(expr) = expr {
            self.expr(expr);
        }
    }

    pub fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.write(&ident.name),
            Expr::BasicLit(value) => self.write(value),
            Expr::CompositeLit { ty, elts } => {
                self.opt_expr(ty.as_deref());
                self.write("{");
                self.exprs(elts);
                self.write("}");
            }
            Expr::FuncLit { ty, body } => {
                self.write("func");
                self.signature(ty);
                self.write(" ");
                self.block(body);
            }
            Expr::Paren(x) => {
                self.write("(");
                self.expr(x);
                self.write(")");
            }
            Expr::Selector { x, sel } => {
                self.expr(x);
                self.write(".");
                self.write(&sel.name);
            }
            Expr::Index { x, indices } => {
                self.expr(x);
                self.write("[");
                self.exprs(indices);
                self.write("]");
            }
            Expr::Slice { x, low, high, max } => {
                self.expr(x);
                self.write("[");
                self.opt_expr(low.as_deref());
                self.write(":");
                self.opt_expr(high.as_deref());
                if let Some(max) = max {
                    self.write(":");
                    self.expr(max);
                }
                self.write("]");
            }
            Expr::TypeAssert { x, ty } => {
                self.expr(x);
                self.write(".(");
                match ty {
                    Some(ty) => self.expr(ty),
                    None => self.write("type"),
                }
                self.write(")");
            }
            Expr::Call {
                fun,
                args,
                ellipsis,
            } => {
                self.expr(fun);
                self.write("(");
                self.exprs(args);
                if *ellipsis {
                    self.write("...");
                }
                self.write(")");
            }
            Expr::Star(x) => {
                self.write("*");
                self.expr(x);
            }
            Expr::Unary { op, x } => {
                self.write(op);
                self.expr(x);
            }
            Expr::Binary { x, op, y } => {
                self.expr(x);
                self.write(" ");
                self.write(op);
                self.write(" ");
                self.expr(y);
            }
            Expr::KeyValue { key, value } => {
                self.expr(key);
                self.write(": ");
                self.expr(value);
            }
            _ => self.type_expr(expr),
        }
    }

    fn type_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::ArrayType { len, elt } => {
                self.write("[");
                self.opt_expr(len.as_deref());
                self.write("]");
                self.expr(elt);
            }
            Expr::Ellipsis(elt) => {
                self.write("...");
                self.opt_expr(elt.as_deref());
            }
            Expr::StructType(fields) => self.members("struct", fields, false),
            Expr::InterfaceType(fields) => self.members("interface", fields, true),
            Expr::FuncType(ty) => {
                self.write("func");
                self.signature(ty);
            }
            Expr::MapType { key, value } => {
                self.write("map[");
                self.expr(key);
                self.write("]");
                self.expr(value);
            }
            Expr::ChanType { dir, value } => {
                self.write(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(value);
            }
            // value expressions are printed by `expr`
            _ => {}
        }
    }
}

/// Render one declaration without comments
pub fn print_decl(decl: &Decl) -> String {
    let mut printer = Printer::new();
    printer.decl(decl);
    printer.finish()
}

/// Render one expression
pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.expr(expr);
    printer.finish()
}
