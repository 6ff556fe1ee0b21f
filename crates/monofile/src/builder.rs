//! Programmatic construction of loaded packages and programs
//!
//! Front ends embedding the library (and the test suite) use
//! [`PackageBuilder`] to produce well-formed [`Package`] values without
//! hand-maintaining scope chains, object arenas or identifier ids, and
//! [`ProgramBuilder`] to assemble them into a [`Program`] with its roots.
//!
//! Lines are assigned in call order: imports first, then each declaration
//! reserves a header line before its children and a closing line after
//! them, so spans nest the way they would in formatted source.

use crate::{
    ast::{
        Block, CommentGroup, Decl, DeclToken, Expr, Field, File, FuncDecl, FuncType, GenDecl,
        Ident, IdentId, ImportSpec, NodeId, Pos, Span, Spec, Stmt, StmtKind, TypeSpec, ValueSpec,
    },
    naming::package_name_from_path,
    program::{Package, Program},
    types::{Object, ObjectId, ObjectKind, Scope, ScopeId, ScopeKind, TypeInfo, TypeRef},
};

#[derive(Debug)]
pub struct PackageBuilder {
    path: String,
    name: String,
    adhoc: bool,
    imports: Vec<String>,
    info: TypeInfo,
    universe: ScopeId,
    package_scope: ScopeId,
    file_scope: ScopeId,
    files: Vec<File>,
    /// Index into `files[last].decls` of the import declaration, once created
    import_decl: Option<usize>,
    next_ident: u32,
    next_node: u32,
    /// Line reserved for the next declaration's header
    header: u32,
    /// Next free line
    line: u32,
}

impl PackageBuilder {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut builder = Self {
            path: path.into(),
            name: name.clone(),
            adhoc: false,
            imports: Vec::new(),
            info: TypeInfo::default(),
            universe: ScopeId(0),
            package_scope: ScopeId(0),
            file_scope: ScopeId(0),
            files: Vec::new(),
            import_decl: None,
            next_ident: 0,
            next_node: 0,
            header: 0,
            line: 0,
        };
        builder.universe = builder.scope(ScopeKind::Universe, None);
        builder.package_scope = builder.scope(ScopeKind::Package, Some(builder.universe));
        builder.new_file(format!("{name}.go"));
        builder
    }

    /// Mark the package as an ad-hoc unit
    #[must_use]
    pub fn adhoc(mut self) -> Self {
        self.adhoc = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Start another source file; subsequent imports and declarations go there
    pub fn new_file(&mut self, name: impl Into<String>) {
        self.file_scope = self.scope(ScopeKind::File, Some(self.package_scope));
        let id = self.node();
        let package = Ident::new(self.name.clone());
        self.files.push(File {
            name: name.into(),
            id,
            span: Span::lines(1, 1),
            package_span: Span::lines(1, 1),
            package,
            decls: Vec::new(),
            comments: Vec::new(),
        });
        self.import_decl = None;
        self.header = 3;
        self.line = 4;
    }

    fn scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.info.scopes.len() as u32);
        self.info.scopes.push(Scope { kind, parent });
        id
    }

    /// Register an arbitrary object
    pub fn object(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.info.objects.len() as u32);
        self.info.objects.push(object);
        id
    }

    /// A package-scope declaration of this package
    pub fn declare(&mut self, name: &str, kind: ObjectKind) -> ObjectId {
        let object = Object {
            name: name.to_owned(),
            kind,
            package: Some(self.path.clone()),
            parent: Some(self.package_scope),
            ty: None,
        };
        self.object(object)
    }

    pub fn declare_func(&mut self, name: &str) -> ObjectId {
        self.declare(name, ObjectKind::Func)
    }

    pub fn declare_type(&mut self, name: &str) -> ObjectId {
        self.declare(name, ObjectKind::TypeName)
    }

    pub fn declare_var(&mut self, name: &str) -> ObjectId {
        self.declare(name, plain_var())
    }

    pub fn declare_const(&mut self, name: &str) -> ObjectId {
        self.declare(name, ObjectKind::Const)
    }

    /// A variable or parameter living in its own function scope
    pub fn local(&mut self, name: &str) -> ObjectId {
        let scope = self.scope(ScopeKind::Local, Some(self.file_scope));
        let object = Object {
            name: name.to_owned(),
            kind: plain_var(),
            package: Some(self.path.clone()),
            parent: Some(scope),
            ty: None,
        };
        self.object(object)
    }

    /// A predeclared identifier such as `int` or `len`
    pub fn universe(&mut self, name: &str, kind: ObjectKind) -> ObjectId {
        let object = Object {
            name: name.to_owned(),
            kind,
            package: None,
            parent: Some(self.universe),
            ty: None,
        };
        self.object(object)
    }

    /// A method; methods belong to their receiver type, not to any scope
    pub fn method(&mut self, name: &str) -> ObjectId {
        let object = Object {
            name: name.to_owned(),
            kind: ObjectKind::Func,
            package: Some(self.path.clone()),
            parent: None,
            ty: None,
        };
        self.object(object)
    }

    /// A named struct field declared by `owner` in `package`
    pub fn field(&mut self, package: &str, owner: &str, name: &str) -> ObjectId {
        let object = Object {
            name: name.to_owned(),
            kind: ObjectKind::Var {
                field: true,
                embedded: false,
                owner: Some(owner.to_owned()),
            },
            package: Some(package.to_owned()),
            parent: None,
            ty: None,
        };
        self.object(object)
    }

    /// An embedded field of `owner` (declared in `package`) with type `ty`;
    /// its name is the base name of the type
    pub fn embedded_field(&mut self, package: &str, owner: &str, ty: TypeRef) -> ObjectId {
        let name = match ty.deref() {
            TypeRef::Named { name, .. } | TypeRef::Basic(name) => name.clone(),
            TypeRef::Pointer(_) | TypeRef::Other => String::new(),
        };
        let object = Object {
            name,
            kind: ObjectKind::Var {
                field: true,
                embedded: true,
                owner: Some(owner.to_owned()),
            },
            package: Some(package.to_owned()),
            parent: None,
            ty: Some(ty),
        };
        self.object(object)
    }

    /// An object declared by another package, as seen through a reference
    pub fn foreign(&mut self, package: &str, name: &str, kind: ObjectKind) -> ObjectId {
        let object = Object {
            name: name.to_owned(),
            kind,
            package: Some(package.to_owned()),
            parent: None,
            ty: None,
        };
        self.object(object)
    }

    fn next_ident_id(&mut self) -> IdentId {
        let id = IdentId(self.next_ident);
        self.next_ident += 1;
        id
    }

    fn name_of(&self, object: ObjectId) -> String {
        self.info
            .object(object)
            .map(|object| object.name.clone())
            .unwrap_or_default()
    }

    /// The identifier declaring `object`
    pub fn def(&mut self, object: ObjectId) -> Ident {
        let id = self.next_ident_id();
        self.info.defs.insert(id, object);
        Ident::with_id(self.name_of(object), id)
    }

    /// An identifier referring to `object`
    pub fn use_(&mut self, object: ObjectId) -> Ident {
        let id = self.next_ident_id();
        self.info.uses.insert(id, object);
        Ident::with_id(self.name_of(object), id)
    }

    /// An identifier that both declares `def` and refers to `used`, as the
    /// type name of an embedded field does
    pub fn def_use(&mut self, def: ObjectId, used: ObjectId) -> Ident {
        let id = self.next_ident_id();
        self.info.defs.insert(id, def);
        self.info.uses.insert(id, used);
        Ident::with_id(self.name_of(used), id)
    }

    /// An identifier carrying an id but no resolved object
    pub fn unresolved(&mut self, name: &str) -> Ident {
        let id = self.next_ident_id();
        Ident::with_id(name, id)
    }

    /// `pkg.Member` where `pkg` is the package name object from [`Self::import`]
    pub fn qualified(&mut self, package: ObjectId, member: &str) -> Expr {
        let qualifier = self.use_(package);
        let member = self.unresolved(member);
        Expr::selector(Expr::Ident(qualifier), member)
    }

    /// `x.sel` where `sel` refers to `object`
    pub fn select(&mut self, x: Expr, object: ObjectId) -> Expr {
        let sel = self.use_(object);
        Expr::selector(x, sel)
    }

    pub fn node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Claim the next free line for a child node
    fn claim_line(&mut self) -> Span {
        let span = Span::new(Pos::new(self.line, 2), Pos::new(self.line, 60));
        self.line += 1;
        span
    }

    /// Close the current declaration and reserve the next header line
    fn close_decl(&mut self) -> Span {
        let span = Span::new(Pos::new(self.header, 1), Pos::new(self.line, 2));
        self.line += 2;
        self.header = self.line;
        self.line += 1;
        span
    }

    fn file_mut(&mut self) -> &mut File {
        let last = self.files.len() - 1;
        &mut self.files[last]
    }

    /// `import "path"`; returns the package name object for qualified references
    pub fn import(&mut self, path: &str) -> ObjectId {
        self.import_with(path, None)
    }

    /// `import alias "path"`
    pub fn import_as(&mut self, path: &str, alias: &str) -> ObjectId {
        self.import_with(path, Some(alias))
    }

    fn import_with(&mut self, path: &str, alias: Option<&str>) -> ObjectId {
        let local_name = alias.unwrap_or_else(|| package_name_from_path(path));
        let object = self.object(Object {
            name: local_name.to_owned(),
            kind: ObjectKind::PkgName {
                imported: path.to_owned(),
            },
            package: Some(self.path.clone()),
            parent: Some(self.file_scope),
            ty: None,
        });
        let name = alias.map(|_| self.def(object));
        self.push_import(name, path);
        object
    }

    /// `import _ "path"`
    pub fn blank_import(&mut self, path: &str) {
        self.push_import(Some(Ident::new("_")), path);
    }

    /// `import . "path"`
    pub fn dot_import(&mut self, path: &str) {
        self.push_import(Some(Ident::new(".")), path);
    }

    fn push_import(&mut self, name: Option<Ident>, path: &str) {
        if !self.imports.iter().any(|existing| existing == path) {
            self.imports.push(path.to_owned());
        }
        let id = self.node();
        if let Some(index) = self.import_decl {
            let file = self.file_mut();
            let is_last = index + 1 == file.decls.len();
            if let Decl::Gen(decl) = &mut file.decls[index] {
                let line = decl.span.end.line;
                decl.specs.push(Spec::Import(ImportSpec {
                    id,
                    span: Span::new(Pos::new(line, 2), Pos::new(line, 60)),
                    name,
                    path: path.to_owned(),
                }));
                decl.span.end.line += 1;
            }
            if is_last {
                self.header += 1;
                self.line += 1;
            }
            return;
        }

        let span = self.claim_line();
        let spec = Spec::Import(ImportSpec {
            id,
            span,
            name,
            path: path.to_owned(),
        });
        let decl_id = self.node();
        let span = self.close_decl();
        let file = self.file_mut();
        file.decls.push(Decl::Gen(GenDecl {
            id: decl_id,
            span,
            token: DeclToken::Import,
            grouped: true,
            specs: vec![spec],
        }));
        self.import_decl = Some(file.decls.len() - 1);
    }

    /// A doc comment placed directly above the next declaration
    pub fn doc_comment(&mut self, text: &str) {
        let span = Span::new(Pos::new(self.header, 1), Pos::new(self.header, 40));
        self.header += 1;
        self.line = self.header + 1;
        self.push_comment(span, text);
    }

    /// A comment on its own line among the children being built
    pub fn inner_comment(&mut self, text: &str) {
        let span = self.claim_line();
        self.push_comment(span, text);
    }

    /// A comment ending the line of the most recently built child
    pub fn trailing_comment(&mut self, text: &str) {
        let line = self.line.saturating_sub(1);
        let span = Span::new(Pos::new(line, 70), Pos::new(line, 90));
        self.push_comment(span, text);
    }

    fn push_comment(&mut self, span: Span, text: &str) {
        self.file_mut().comments.push(CommentGroup {
            span,
            lines: vec![text.to_owned()],
        });
    }

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        let id = self.node();
        let span = self.claim_line();
        Stmt { id, span, kind }
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    /// A field, parameter or method entry
    pub fn field_entry(&mut self, names: Vec<Ident>, ty: Expr) -> Field {
        let id = self.node();
        let span = self.claim_line();
        Field {
            id,
            span,
            names,
            ty,
            tag: None,
        }
    }

    pub fn push_decl(&mut self, decl: Decl) {
        self.file_mut().decls.push(decl);
    }

    /// `func name(params) (results) { body }`
    pub fn func(&mut self, name: Ident, params: Vec<Field>, results: Vec<Field>, body: Vec<Stmt>) {
        self.func_decl(None, name, params, results, body);
    }

    /// `func (recv) name(params) (results) { body }`
    pub fn method_decl(
        &mut self,
        recv: Field,
        name: Ident,
        params: Vec<Field>,
        body: Vec<Stmt>,
    ) {
        self.func_decl(Some(vec![recv]), name, params, Vec::new(), body);
    }

    fn func_decl(
        &mut self,
        recv: Option<Vec<Field>>,
        name: Ident,
        params: Vec<Field>,
        results: Vec<Field>,
        body: Vec<Stmt>,
    ) {
        let id = self.node();
        let span = self.close_decl();
        self.push_decl(Decl::Func(FuncDecl {
            id,
            span,
            recv,
            name,
            ty: FuncType {
                type_params: Vec::new(),
                params,
                results,
            },
            body: Some(Block { stmts: body }),
        }));
    }

    /// `type name ty`
    pub fn type_decl(&mut self, name: Ident, ty: Expr) {
        let spec_id = self.node();
        let id = self.node();
        let span = self.close_decl();
        self.push_decl(Decl::Gen(GenDecl {
            id,
            span,
            token: DeclToken::Type,
            grouped: false,
            specs: vec![Spec::Type(TypeSpec {
                id: spec_id,
                span,
                name,
                type_params: Vec::new(),
                alias: false,
                ty,
            })],
        }));
    }

    /// `var names ty = values`
    pub fn var_decl(&mut self, names: Vec<Ident>, ty: Option<Expr>, values: Vec<Expr>) {
        self.value_decl(DeclToken::Var, names, ty, values);
    }

    /// `const names ty = values`
    pub fn const_decl(&mut self, names: Vec<Ident>, ty: Option<Expr>, values: Vec<Expr>) {
        self.value_decl(DeclToken::Const, names, ty, values);
    }

    fn value_decl(
        &mut self,
        token: DeclToken,
        names: Vec<Ident>,
        ty: Option<Expr>,
        values: Vec<Expr>,
    ) {
        let spec_id = self.node();
        let id = self.node();
        let span = self.close_decl();
        self.push_decl(Decl::Gen(GenDecl {
            id,
            span,
            token,
            grouped: false,
            specs: vec![Spec::Value(ValueSpec {
                id: spec_id,
                span,
                names,
                ty,
                values,
            })],
        }));
    }

    pub fn build(self) -> Package {
        let mut files = self.files;
        for file in &mut files {
            let last = file
                .decls
                .iter()
                .map(|decl| decl.span().end.line)
                .chain(file.comments.iter().map(|comment| comment.span.end.line))
                .max()
                .unwrap_or(1);
            file.span = Span::lines(1, last);
        }
        Package {
            path: self.path,
            name: self.name,
            adhoc: self.adhoc,
            imports: self.imports,
            files,
            info: self.info,
            errors: Vec::new(),
        }
    }
}

/// Collects packages into a [`Program`]
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    roots: Vec<String>,
    packages: Vec<Package>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package and select it as a root, in call order
    #[must_use]
    pub fn root(mut self, package: Package) -> Self {
        self.roots.push(package.path.clone());
        self.packages.push(package);
        self
    }

    /// Add a dependency
    #[must_use]
    pub fn package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    pub fn build(self) -> Program {
        Program::new(self.roots, self.packages)
    }
}

const fn plain_var() -> ObjectKind {
    ObjectKind::Var {
        field: false,
        embedded: false,
        owner: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations_resolve_to_package_scope() {
        let mut builder = PackageBuilder::new("example.com/lib", "lib");
        let helper = builder.declare_func("Helper");
        let local = builder.local("x");
        let ident = builder.def(helper);
        let local_ident = builder.use_(local);
        let package = builder.build();

        let info = &package.info;
        assert_eq!(ident.name, "Helper");
        assert_eq!(info.object_of(&ident), Some(helper));
        assert!(info.is_top_level(helper));
        assert_eq!(info.use_of(&local_ident), Some(local));
        assert!(!info.is_top_level(local));
    }

    #[test]
    fn test_imports_are_grouped_in_one_declaration() {
        let mut builder = PackageBuilder::new("example.com/lib", "lib");
        let fmt = builder.import("fmt");
        builder.import_as("strings", "str");
        builder.blank_import("embed");
        let package = builder.build();

        assert_eq!(package.imports, ["fmt", "strings", "embed"]);
        assert_eq!(package.files[0].decls.len(), 1);
        let specs: Vec<_> = package.files[0].import_specs().collect();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[1].name.as_ref().map(|n| n.name.as_str()), Some("str"));
        assert!(package.info.is_top_level_import(fmt));
        assert_eq!(package.info.objects[fmt.0 as usize].name, "fmt");
    }

    #[test]
    fn test_spans_nest_inside_declarations() {
        let mut builder = PackageBuilder::new("example.com/lib", "lib");
        let run = builder.declare_func("Run");
        let name = builder.def(run);
        let stmt = builder.stmt(StmtKind::Return(Vec::new()));
        let stmt_span = stmt.span;
        builder.func(name, Vec::new(), Vec::new(), vec![stmt]);
        let package = builder.build();

        let decl_span = package.files[0].decls[0].span();
        assert!(decl_span.contains(stmt_span));
        assert!(package.files[0].span.contains(decl_span));
    }
}
