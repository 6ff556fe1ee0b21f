//! Small Go programs shared by the integration tests
#![allow(dead_code, unreachable_pub)]

use monofile::{
    PackageBuilder, Program, ProgramBuilder,
    ast::{Expr, StmtKind},
    program::{ADHOC_PACKAGE_PATH, Package},
    types::{ObjectKind, TypeRef},
};

pub const GREET: &str = "example.com/greet";
pub const CHAIN: &str = "example.com/chain";

/// `func main() { fmt.Println("hi"); os.Exit(0) }`
pub fn system_only() -> Program {
    let mut b = PackageBuilder::new(ADHOC_PACKAGE_PATH, "main");
    let os = b.import("os");
    let fmt = b.import("fmt");
    let main = b.declare_func("main");
    let name = b.def(main);
    let println = b.qualified(fmt, "Println");
    let exit = b.qualified(os, "Exit");
    let body = vec![
        b.expr_stmt(Expr::call(println, vec![Expr::lit("\"hi\"")])),
        b.expr_stmt(Expr::call(exit, vec![Expr::lit("0")])),
    ];
    b.func(name, Vec::new(), Vec::new(), body);
    ProgramBuilder::new().root(b.build()).build()
}

/// `func Greet(name string) string { return strings.ToUpper(name) }`
pub fn greet_package() -> Package {
    let mut b = PackageBuilder::new(GREET, "greet");
    let strings = b.import("strings");
    let greet = b.declare_func("Greet");
    let string = b.universe("string", ObjectKind::TypeName);
    let param = b.local("name");

    let name = b.def(greet);
    let param_name = b.def(param);
    let param_type = b.use_(string);
    let params = vec![b.field_entry(vec![param_name], Expr::Ident(param_type))];
    let result_type = b.use_(string);
    let results = vec![b.field_entry(Vec::new(), Expr::Ident(result_type))];
    let upper = b.qualified(strings, "ToUpper");
    let arg = b.use_(param);
    let body = vec![b.stmt(StmtKind::Return(vec![Expr::call(
        upper,
        vec![Expr::Ident(arg)],
    )]))];
    b.func(name, params, results, body);
    b.build()
}

/// `func main() { fmt.Println(greet.Greet("gopher")) }`
pub fn greeter() -> Program {
    let mut b = PackageBuilder::new(ADHOC_PACKAGE_PATH, "main");
    let greet = b.import(GREET);
    let fmt = b.import("fmt");
    let main = b.declare_func("main");
    let name = b.def(main);
    let call = b.qualified(greet, "Greet");
    let println = b.qualified(fmt, "Println");
    let body = vec![b.expr_stmt(Expr::call(
        println,
        vec![Expr::call(call, vec![Expr::lit("\"gopher\"")])],
    ))];
    b.func(name, Vec::new(), Vec::new(), body);

    ProgramBuilder::new()
        .root(b.build())
        .package(greet_package())
        .build()
}

/// A package declaring `const <name> = <value>`
pub fn const_package(path: &str, name: &str, value: &str) -> Package {
    let package_name = path.rsplit('/').next().unwrap_or(path);
    let mut b = PackageBuilder::new(path, package_name);
    let object = b.declare_const(name);
    let ident = b.def(object);
    b.const_decl(vec![ident], None, vec![Expr::lit(value)]);
    b.build()
}

/// Three-level embedding chain:
///
/// ```go
/// type A struct { *B }
/// type B struct { C }
/// type C struct{}
/// func (c C) M() {}
/// ```
pub fn chain_package() -> Package {
    let mut b = PackageBuilder::new(CHAIN, "chain");
    let a = b.declare_type("A");
    let b_type = b.declare_type("B");
    let c = b.declare_type("C");
    let m = b.method("M");
    let recv = b.local("c");
    let a_embeds_b = b.embedded_field(CHAIN, "A", TypeRef::pointer(TypeRef::named(CHAIN, "B")));
    let b_embeds_c = b.embedded_field(CHAIN, "B", TypeRef::named(CHAIN, "C"));

    let a_name = b.def(a);
    let embedded = b.def_use(a_embeds_b, b_type);
    let field = b.field_entry(Vec::new(), Expr::star(Expr::Ident(embedded)));
    b.type_decl(a_name, Expr::StructType(vec![field]));

    let b_name = b.def(b_type);
    let embedded = b.def_use(b_embeds_c, c);
    let field = b.field_entry(Vec::new(), Expr::Ident(embedded));
    b.type_decl(b_name, Expr::StructType(vec![field]));

    let c_name = b.def(c);
    b.type_decl(c_name, Expr::StructType(Vec::new()));

    let recv_name = b.def(recv);
    let recv_type = b.use_(c);
    let recv = b.field_entry(vec![recv_name], Expr::Ident(recv_type));
    let m_name = b.def(m);
    b.method_decl(recv, m_name, Vec::new(), Vec::new());
    b.build()
}

/// `func run(a *chain.A) { a.M(); a.B.C.M() }`
pub fn chain_program() -> Program {
    let mut b = PackageBuilder::new(ADHOC_PACKAGE_PATH, "main");
    let chain = b.import(CHAIN);
    let run = b.declare_func("run");
    let param = b.local("a");
    let m = b.foreign(CHAIN, "M", ObjectKind::Func);
    let a_embeds_b = b.embedded_field(CHAIN, "A", TypeRef::pointer(TypeRef::named(CHAIN, "B")));
    let b_embeds_c = b.embedded_field(CHAIN, "B", TypeRef::named(CHAIN, "C"));

    let run_name = b.def(run);
    let param_name = b.def(param);
    let param_type = b.qualified(chain, "A");
    let params = vec![b.field_entry(vec![param_name], Expr::star(param_type))];

    let a = b.use_(param);
    let promoted = b.select(Expr::Ident(a), m);
    let first = b.expr_stmt(Expr::call(promoted, Vec::new()));
    let a = b.use_(param);
    let explicit = b.select(Expr::Ident(a), a_embeds_b);
    let explicit = b.select(explicit, b_embeds_c);
    let explicit = b.select(explicit, m);
    let second = b.expr_stmt(Expr::call(explicit, Vec::new()));
    b.func(run_name, params, Vec::new(), vec![first, second]);

    ProgramBuilder::new()
        .root(b.build())
        .package(chain_package())
        .build()
}
