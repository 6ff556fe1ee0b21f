//! Identifier rewriting for inlined packages
//!
//! Three rules run at every node, first match wins:
//!
//! 1. `pkg.Member` where `pkg` names an import becomes `unfold{N}__Member`
//!    for an inlined package, or `retain{M}.Member` for a retained one.
//! 2. An identifier resolving to a package-scope declaration of the package
//!    being rewritten becomes `unfold{N}__Name`. Ad-hoc units skip this rule,
//!    their declarations form the public surface of the output.
//! 3. An identifier resolving to an embedded field whose type lives in an
//!    inlined package becomes the renamed type name, so promoted selector
//!    chains like `a.B.C.D` stay valid one link at a time.

use std::collections::BTreeSet;

use log::{debug, trace};
use rustc_hash::FxHashSet;

use crate::{
    ast::{Expr, File, Ident},
    embedding::EmbeddingTable,
    error::{BundleError, Result},
    graph_scanner::ScanResult,
    naming::{inlined_name, retain_alias},
    program::Package,
    types::{Object, ObjectKind, TypeInfo},
    visitors::{IdentParent, Transformer, walk_expr, walk_file},
};

/// Predeclared types that can be embedded; they have no home package
const PREDECLARED_TYPES: &[&str] = &["error", "any", "comparable"];

/// Counts of what a rewrite touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Rule 1 hits into inlined packages
    pub inlined_references: usize,
    /// Rule 1 hits into retained packages
    pub retained_references: usize,
    /// Rule 2 hits
    pub declarations: usize,
    /// Rule 3 hits
    pub promoted_fields: usize,
    /// Retain indices referenced at least once
    pub used_retained: BTreeSet<usize>,
}

impl RewriteStats {
    pub fn merge(&mut self, other: Self) {
        self.inlined_references += other.inlined_references;
        self.retained_references += other.retained_references;
        self.declarations += other.declarations;
        self.promoted_fields += other.promoted_fields;
        self.used_retained.extend(other.used_retained);
    }
}

/// Rewrites the files of one inlined package
#[derive(Debug)]
pub struct IdentifierRewriter<'a> {
    package: &'a str,
    info: &'a TypeInfo,
    scan: &'a ScanResult,
    embeddings: &'a EmbeddingTable,
    /// Index of the package in the inline order, `None` to skip rule 2
    own_index: Option<usize>,
    /// Packages whose declarations keep their names
    unrenamed: &'a FxHashSet<String>,
    stats: RewriteStats,
}

impl<'a> IdentifierRewriter<'a> {
    fn imported_package(&self, qualifier: &Ident) -> Option<&'a str> {
        let info = self.info;
        let object = info.object_of(qualifier)?;
        if !info.is_top_level_import(object) {
            return None;
        }
        match &info.object(object)?.kind {
            ObjectKind::PkgName { imported } => Some(imported),
            _ => None,
        }
    }

    /// Rule 1
    fn qualified_reference(&mut self, expr: &Expr) -> Result<Option<Expr>> {
        let Expr::Selector { x, sel } = expr else {
            return Ok(None);
        };
        let Expr::Ident(qualifier) = x.as_ref() else {
            return Ok(None);
        };
        let Some(imported) = self.imported_package(qualifier) else {
            return Ok(None);
        };

        if let Some(index) = self.scan.inline_index(imported) {
            let name = inlined_name(index, &sel.name);
            trace!("{}.{} -> {name}", qualifier.name, sel.name);
            self.stats.inlined_references += 1;
            return Ok(Some(Expr::Ident(Ident::new(name))));
        }
        if let Some(index) = self.scan.retain_index(imported) {
            let alias = retain_alias(index);
            trace!("{}.{} -> {alias}.{}", qualifier.name, sel.name, sel.name);
            self.stats.retained_references += 1;
            self.stats.used_retained.insert(index);
            return Ok(Some(Expr::selector(
                Expr::Ident(Ident::new(alias)),
                Ident::new(sel.name.clone()),
            )));
        }
        Err(BundleError::InternalConsistency(format!(
            "{} references package {imported}, which is neither inlined nor retained",
            self.package
        )))
    }

    /// Rule 2
    fn top_level_name(&self, ident: &Ident, parent: IdentParent) -> Result<Option<String>> {
        let Some(own_index) = self.own_index else {
            return Ok(None);
        };
        // The type of an embedded field both defines the field and uses the
        // type, also under `*T` or `T[int]`; the type is what gets renamed
        let object = match parent {
            IdentParent::Star | IdentParent::Field => self.info.use_of(ident),
            _ if self.defines_embedded_field(ident) => self.info.use_of(ident),
            _ => self.info.object_of(ident),
        };
        let Some(object) = object else {
            return Ok(None);
        };
        if ident.is_blank() || !self.info.is_top_level(object) {
            return Ok(None);
        }
        let Some(object) = self.info.object(object) else {
            return Ok(None);
        };
        // Go runs every `init` implicitly and allows several per package
        if object.kind == ObjectKind::Func && object.name == "init" {
            return Ok(None);
        }
        if object.package.as_deref() != Some(self.package) {
            return Err(BundleError::InternalConsistency(format!(
                "`{}` in {} resolves to a package-scope declaration of {}",
                ident.name,
                self.package,
                object.package.as_deref().unwrap_or("no package")
            )));
        }
        Ok(Some(inlined_name(own_index, &ident.name)))
    }

    fn defines_embedded_field(&self, ident: &Ident) -> bool {
        self.info
            .def_of(ident)
            .and_then(|id| self.info.object(id))
            .is_some_and(Object::is_embedded_field)
    }

    /// Rule 3
    fn promoted_name(&self, ident: &Ident) -> Result<Option<String>> {
        let Some(field) = self.info.use_of(ident).and_then(|id| self.embeddings.get(id)) else {
            return Ok(None);
        };
        let Some(home) = field.home.as_deref() else {
            if PREDECLARED_TYPES.contains(&field.type_name.as_str()) {
                return Ok(None);
            }
            let owner = field
                .owner
                .as_deref()
                .map_or_else(String::new, |owner| format!(" of {owner}"));
            return Err(BundleError::InternalConsistency(format!(
                "embedded type {} of field {}{owner} in {} has no home package",
                field.type_name, field.name, self.package
            )));
        };
        if self.unrenamed.contains(home) {
            return Ok(None);
        }
        Ok(self
            .scan
            .inline_index(home)
            .map(|index| inlined_name(index, &field.type_name)))
    }
}

impl Transformer for IdentifierRewriter<'_> {
    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        if let Some(replacement) = self.qualified_reference(expr)? {
            *expr = replacement;
            return Ok(());
        }
        walk_expr(self, expr)
    }

    fn visit_ident(&mut self, ident: &mut Ident, parent: IdentParent) -> Result<()> {
        if let Some(name) = self.top_level_name(ident, parent)? {
            trace!("{} -> {name}", ident.name);
            self.stats.declarations += 1;
            *ident = Ident::new(name);
            return Ok(());
        }
        if let Some(name) = self.promoted_name(ident)? {
            trace!("promoted {} -> {name}", ident.name);
            self.stats.promoted_fields += 1;
            *ident = Ident::new(name);
        }
        Ok(())
    }
}

/// Reject blanket imports, whose references carry no qualifier to rewrite
pub fn check_imports(package: &Package) -> Result<()> {
    let dot_import = package
        .files
        .iter()
        .flat_map(File::import_specs)
        .find(|spec| spec.is_dot());
    match dot_import {
        Some(spec) => Err(BundleError::UnsupportedImport {
            package: package.path.clone(),
            imported: spec.path.clone(),
        }),
        None => Ok(()),
    }
}

/// Apply all three rules to every file of `package`
///
/// `unrenamed` lists the packages whose declarations keep their names; the
/// package itself skips rule 2 when it is among them.
pub fn rewrite_package(
    package: &mut Package,
    scan: &ScanResult,
    unrenamed: &FxHashSet<String>,
) -> Result<RewriteStats> {
    check_imports(package)?;

    let own_index = if unrenamed.contains(&package.path) {
        None
    } else {
        Some(scan.inline_index(&package.path).ok_or_else(|| {
            BundleError::InternalConsistency(format!(
                "package {} is rewritten but not in the inline order",
                package.path
            ))
        })?)
    };

    let Package {
        path, files, info, ..
    } = package;
    let embeddings = EmbeddingTable::build(info);
    let mut rewriter = IdentifierRewriter {
        package: path,
        info,
        scan,
        embeddings: &embeddings,
        own_index,
        unrenamed,
        stats: RewriteStats::default(),
    };
    for file in files.iter_mut() {
        walk_file(&mut rewriter, file)?;
    }

    let stats = rewriter.stats;
    debug!(
        "Rewrote {path}: {} inlined refs, {} retained refs, {} declarations, {} promoted fields",
        stats.inlined_references,
        stats.retained_references,
        stats.declarations,
        stats.promoted_fields
    );
    Ok(stats)
}
