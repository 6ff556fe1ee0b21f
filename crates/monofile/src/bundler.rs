//! Bundling pipeline
//!
//! Stages run strictly in order and never look back:
//! 1. validation of the loaded program
//! 2. classification of the import closure ([`graph_scanner`])
//! 3. input checks: blanket imports, names of ad-hoc roots
//! 4. per inlined package: comment snapshot, identifier rewrite, import
//!    pruning, comment filtering
//! 5. emission of the merged unit
//!
//! Any error aborts the whole run; no partial output is produced.
//!
//! [`graph_scanner`]: crate::graph_scanner

use log::{debug, info};
use rustc_hash::FxHashSet;

use crate::{
    comment_filter::PackageComments,
    config::Config,
    emitter::{Emitter, Section, destination_name},
    error::{BundleError, Result},
    graph_scanner::scan,
    import_pruner::prune_imports,
    loader::{Loader, validate},
    naming::check_root_collisions,
    program::{Package, Program},
    stdlib_detection::is_retained,
    visitors::{RewriteStats, check_imports, rewrite_package},
};

#[derive(Debug, Clone, Default)]
pub struct Bundler {
    config: Config,
}

impl Bundler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Load `patterns` through `loader` and bundle the result
    pub fn bundle_patterns(&self, loader: &impl Loader, patterns: &[String]) -> Result<String> {
        let program = loader.load(patterns)?;
        self.bundle(program)
    }

    /// Merge `program` into the text of one Go source file
    pub fn bundle(&self, mut program: Program) -> Result<String> {
        validate(&program)?;
        let scan = scan(&program, is_retained)?;

        for path in &scan.inline {
            let package = program.package(path).ok_or_else(|| missing(path))?;
            check_imports(package)?;
        }
        check_root_collisions(program.root_packages())?;

        let package_name = destination_name(&program, &self.config);
        info!("Bundling {} roots into package {package_name}", program.roots.len());

        let unrenamed: FxHashSet<String> = program
            .root_packages()
            .filter(|package| package.is_adhoc())
            .map(|package| package.path.clone())
            .collect();

        let mut sections: Vec<(Package, PackageComments)> = Vec::with_capacity(scan.inline.len());
        let mut stats = RewriteStats::default();
        for path in &scan.inline {
            let mut package = program
                .packages
                .shift_remove(path)
                .ok_or_else(|| missing(path))?;
            let comments = PackageComments::snapshot(&mut package)?;
            stats.merge(rewrite_package(&mut package, &scan, &unrenamed)?);
            prune_imports(&mut package);
            let comments = comments.filter(&mut package)?;
            sections.push((package, comments));
        }
        info!(
            "Rewrote {} qualified references, {} declarations, {} promoted fields",
            stats.inlined_references + stats.retained_references,
            stats.declarations,
            stats.promoted_fields
        );
        debug!(
            "{} of {} retained packages referenced",
            stats.used_retained.len(),
            scan.retain.len()
        );

        let mut emitter = Emitter::new(&package_name, &self.config);
        emitter.imports(&scan.retain, &stats.used_retained);
        for (package, comments) in &sections {
            emitter.section(Section { package, comments });
        }
        Ok(emitter.finish())
    }
}

/// Merge `program` with `config`
pub fn bundle(program: Program, config: &Config) -> Result<String> {
    Bundler::new(config.clone()).bundle(program)
}

fn missing(path: &str) -> BundleError {
    BundleError::InternalConsistency(format!("inlined package {path} is not loaded"))
}
