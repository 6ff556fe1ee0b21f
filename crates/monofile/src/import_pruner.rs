//! Removal of import declarations from inlined packages
//!
//! Once every qualified reference is rewritten, the original imports carry
//! no information the synthesized import block does not already have.

use log::debug;

use crate::{ast::File, program::Package};

/// Drop every import declaration of `file`, returning how many were removed
pub fn prune_file(file: &mut File) -> usize {
    let before = file.decls.len();
    file.decls.retain(|decl| !decl.is_import());
    before - file.decls.len()
}

/// Drop every import declaration of every file of `package`
pub fn prune_imports(package: &mut Package) -> usize {
    let removed: usize = package.files.iter_mut().map(prune_file).sum();
    debug!("Removed {removed} import declarations from {}", package.path);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::Decl, builder::PackageBuilder};

    #[test]
    fn test_imports_removed_from_every_file() {
        let mut builder = PackageBuilder::new("example.com/lib", "lib");
        builder.import("fmt");
        builder.import("strings");
        let helper = builder.declare_func("Helper");
        let name = builder.def(helper);
        builder.func(name, Vec::new(), Vec::new(), Vec::new());
        builder.new_file("other.go");
        builder.blank_import("embed");
        let mut package = builder.build();

        assert_eq!(prune_imports(&mut package), 2);
        assert_eq!(package.files[0].decls.len(), 1);
        assert!(matches!(&package.files[0].decls[0], Decl::Func(func) if func.name.name == "Helper"));
        assert!(package.files[1].decls.is_empty());
    }

    #[test]
    fn test_files_without_imports_are_untouched() {
        let mut builder = PackageBuilder::new("example.com/lib", "lib");
        let value = builder.declare_const("Answer");
        let name = builder.def(value);
        builder.const_decl(vec![name], None, vec![crate::ast::Expr::lit("42")]);
        let mut package = builder.build();

        assert_eq!(prune_imports(&mut package), 0);
        assert_eq!(package.files[0].decls.len(), 1);
    }
}
