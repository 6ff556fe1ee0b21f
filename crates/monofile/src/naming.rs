//! Generated names and collision checks
//!
//! Inlined declarations become `unfold{N}__{name}` where `N` is the package's
//! position in the inline order; retained packages are imported as
//! `retain{M}`. Declarations of ad-hoc roots keep their names, so those are
//! checked against the generated scheme, the predeclared identifiers and
//! each other.

use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    ast::{Decl, Spec},
    error::{BundleError, Result},
    program::Package,
};

/// Separator between a generated prefix and the original name
pub const DELIMITER: &str = "__";

/// Universe scope of Go; a package-scope declaration with one of these names
/// shadows it for every file of the package
pub const PREDECLARED: &[&str] = &[
    "any", "append", "bool", "byte", "cap", "clear", "close", "comparable", "complex",
    "complex64", "complex128", "copy", "delete", "error", "false", "float32", "float64",
    "imag", "int", "int8", "int16", "int32", "int64", "iota", "len", "make", "max", "min",
    "new", "nil", "panic", "print", "println", "real", "recover", "rune", "string", "true",
    "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
];

static GENERATED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(unfold[0-9]+__|retain[0-9]+$)").expect("generated name pattern is valid")
});

static MAJOR_VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/v[0-9]+$").expect("major version pattern is valid"));

static GOPKG_VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.v[0-9]+(-unstable)?$").expect("gopkg.in pattern is valid"));

pub fn inline_alias(index: usize) -> String {
    format!("unfold{index}")
}

pub fn retain_alias(index: usize) -> String {
    format!("retain{index}")
}

/// New name of `name` declared in (or promoted from) inlined package `index`
pub fn inlined_name(index: usize, name: &str) -> String {
    format!("{}{DELIMITER}{name}", inline_alias(index))
}

/// Whether `name` could have been produced by [`inlined_name`] or [`retain_alias`]
pub fn is_generated_name(name: &str) -> bool {
    GENERATED_NAME.is_match(name)
}

/// Package name implied by an import path: its last element, ignoring a
/// trailing major version (`/v2`) or `gopkg.in` style `.v2` suffix
pub fn package_name_from_path(path: &str) -> &str {
    let trimmed = if path.starts_with("gopkg.in/") {
        GOPKG_VERSION_SUFFIX
            .find(path)
            .map_or(path, |suffix| &path[..suffix.start()])
    } else {
        match MAJOR_VERSION_SUFFIX.find(path) {
            // `/v1` and `/v0` are ordinary directories
            Some(suffix) if !matches!(suffix.as_str(), "/v0" | "/v1") => &path[..suffix.start()],
            _ => path,
        }
    };
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Names a file declares at package scope, in source order
///
/// Methods are excluded, as are `init` functions and blank identifiers,
/// which Go allows to repeat.
pub fn package_scope_names(package: &Package) -> Vec<&str> {
    let mut names = Vec::new();
    for file in &package.files {
        for decl in &file.decls {
            match decl {
                Decl::Func(func) => {
                    if func.recv.is_none() && func.name.name != "init" {
                        names.push(func.name.name.as_str());
                    }
                }
                Decl::Gen(gen_decl) => {
                    for spec in &gen_decl.specs {
                        match spec {
                            Spec::Value(value) => {
                                names.extend(value.names.iter().map(|name| name.name.as_str()));
                            }
                            Spec::Type(ty) => names.push(ty.name.name.as_str()),
                            Spec::Import(_) => {}
                        }
                    }
                }
            }
        }
    }
    names.retain(|name| *name != "_");
    names
}

/// Ensure the names that survive unprefixed cannot clash with generated
/// names or with each other
pub fn check_root_collisions<'a>(roots: impl IntoIterator<Item = &'a Package>) -> Result<()> {
    let mut declared: IndexMap<&str, &str> = IndexMap::new();
    for package in roots.into_iter().filter(|package| package.is_adhoc()) {
        for name in package_scope_names(package) {
            if is_generated_name(name) {
                return Err(BundleError::NameCollision {
                    name: name.to_owned(),
                    first: package.path.clone(),
                    second: "a generated name".to_owned(),
                });
            }
            // Once merged, the shadowing would reach the inlined packages too
            if PREDECLARED.contains(&name) {
                return Err(BundleError::NameCollision {
                    name: name.to_owned(),
                    first: package.path.clone(),
                    second: "a predeclared identifier".to_owned(),
                });
            }
            match declared.get(name) {
                Some(owner) if *owner != package.path => {
                    return Err(BundleError::NameCollision {
                        name: name.to_owned(),
                        first: (*owner).to_owned(),
                        second: package.path.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    declared.insert(name, &package.path);
                }
            }
        }
    }
    debug!("{} root names keep their spelling", declared.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Expr, Ident},
        builder::PackageBuilder,
    };

    #[test]
    fn test_generated_names() {
        assert_eq!(inline_alias(0), "unfold0");
        assert_eq!(retain_alias(12), "retain12");
        assert_eq!(inlined_name(2, "Widget"), "unfold2__Widget");
    }

    #[test]
    fn test_is_generated_name() {
        assert!(is_generated_name("unfold0__x"));
        assert!(is_generated_name("unfold17__Widget"));
        assert!(is_generated_name("retain3"));

        assert!(!is_generated_name("unfold"));
        assert!(!is_generated_name("unfold_x"));
        assert!(!is_generated_name("retain3x"));
        assert!(!is_generated_name("retainer"));
        assert!(!is_generated_name("myunfold0__x"));
    }

    fn adhoc_root(path: &str, names: &[&str]) -> Package {
        let mut b = PackageBuilder::new(path, "main").adhoc();
        for name in names {
            let object = b.declare_var(name);
            let ident = b.def(object);
            b.var_decl(vec![ident], Some(Expr::Ident(Ident::new("int"))), Vec::new());
        }
        b.build()
    }

    #[test]
    fn test_root_collisions() {
        let one = adhoc_root("cmd/one", &["count", "_"]);
        let two = adhoc_root("cmd/two", &["total", "_"]);
        assert!(check_root_collisions([&one, &two]).is_ok());

        let three = adhoc_root("cmd/three", &["count"]);
        let err = check_root_collisions([&one, &three]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "top-level name `count` declared by cmd/one collides with cmd/three"
        );
    }

    #[test]
    fn test_roots_may_not_shadow_predeclared_names() {
        let root = adhoc_root("cmd/one", &["len"]);
        let err = check_root_collisions([&root]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "top-level name `len` declared by cmd/one collides with a predeclared identifier"
        );

        // Inlined packages are renamed, so only ad-hoc roots are checked
        let mut named = adhoc_root("example.com/lib", &["string"]);
        named.adhoc = false;
        assert!(check_root_collisions([&named]).is_ok());
    }

    #[test]
    fn test_package_name_from_path() {
        assert_eq!(package_name_from_path("fmt"), "fmt");
        assert_eq!(package_name_from_path("net/http"), "http");
        assert_eq!(
            package_name_from_path("example.com/mypackage/embedding"),
            "embedding"
        );
        assert_eq!(package_name_from_path("github.com/foo/bar/v2"), "bar");
        assert_eq!(package_name_from_path("github.com/foo/bar/v1"), "v1");
        assert_eq!(package_name_from_path("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(package_name_from_path("rsc.io/quote"), "quote");
    }
}
