//! Loading packages from an external front end
//!
//! Parsing and type checking Go is the job of a Go front end; it hands its
//! result over as a JSON manifest of [`Package`] values. [`ManifestLoader`]
//! reads that manifest, selects roots from the caller's patterns and rejects
//! anything the core cannot work with before rewriting starts.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    error::LoadError,
    program::{Package, Program},
    stdlib_detection::is_retained,
};

/// Source of loaded programs
pub trait Loader {
    /// Load the packages named by `patterns` and everything they import
    fn load(&self, patterns: &[String]) -> Result<Program, LoadError>;
}

/// On-disk shape of a loader manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Roots used when no patterns are given
    #[serde(default)]
    pub roots: Vec<String>,
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone)]
pub struct ManifestLoader {
    path: PathBuf,
}

impl ManifestLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Manifest, LoadError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| LoadError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}

impl Loader for ManifestLoader {
    fn load(&self, patterns: &[String]) -> Result<Program, LoadError> {
        info!("Loading manifest {}", self.path.display());
        let manifest = self.read()?;
        program_from_manifest(manifest, patterns)
    }
}

/// Turn a manifest into a validated program, selecting roots by `patterns`
pub fn program_from_manifest(
    manifest: Manifest,
    patterns: &[String],
) -> Result<Program, LoadError> {
    let mut packages: IndexMap<String, Package> = IndexMap::new();
    for mut package in manifest.packages {
        if package.imports.is_empty() {
            package.imports = package.imports_from_syntax();
        }
        if packages.contains_key(&package.path) {
            return Err(LoadError::DuplicatePackage(package.path));
        }
        packages.insert(package.path.clone(), package);
    }

    let roots = if patterns.is_empty() {
        manifest.roots
    } else {
        select_roots(&packages, patterns)?
    };
    if roots.is_empty() {
        return Err(LoadError::NoRoots);
    }
    for root in &roots {
        if !packages.contains_key(root) {
            return Err(LoadError::NoMatch(root.clone()));
        }
    }
    debug!("Roots: {roots:?}");

    let program = Program { roots, packages };
    validate(&program)?;
    Ok(program)
}

/// Roots named by `patterns`, in pattern order without repeats
///
/// A pattern is either an exact package path or `prefix/...`, matching the
/// prefix itself and every package below it.
fn select_roots(
    packages: &IndexMap<String, Package>,
    patterns: &[String],
) -> Result<Vec<String>, LoadError> {
    let mut roots: Vec<String> = Vec::new();
    for pattern in patterns {
        let matched: Vec<&String> = match pattern.strip_suffix("/...") {
            Some(prefix) => packages
                .keys()
                .filter(|path| {
                    path.as_str() == prefix
                        || path
                            .strip_prefix(prefix)
                            .is_some_and(|rest| rest.starts_with('/'))
                })
                .collect(),
            None => packages.keys().filter(|path| *path == pattern).collect(),
        };
        if matched.is_empty() {
            return Err(LoadError::NoMatch(pattern.clone()));
        }
        for path in matched {
            if !roots.contains(path) {
                roots.push(path.clone());
            }
        }
    }
    Ok(roots)
}

/// Reject programs with diagnostics or with inlined imports that were never loaded
pub fn validate(program: &Program) -> Result<(), LoadError> {
    for package in program.packages.values() {
        if !package.errors.is_empty() {
            return Err(LoadError::Diagnostics {
                package: package.path.clone(),
                diagnostics: package.errors.clone(),
            });
        }
    }
    for package in program.packages.values() {
        for imported in &package.imports {
            if program.package(imported).is_some() {
                continue;
            }
            // Retained packages only matter by path
            if !is_retained(&Package::stub(imported.clone(), String::new())) {
                return Err(LoadError::MissingPackage {
                    package: package.path.clone(),
                    imported: imported.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(paths: &[&str]) -> Manifest {
        Manifest {
            roots: vec![paths[0].to_owned()],
            packages: paths
                .iter()
                .map(|path| Package::stub(*path, crate::naming::package_name_from_path(path)))
                .collect(),
        }
    }

    #[test]
    fn test_manifest_roots_used_without_patterns() {
        let program = program_from_manifest(manifest(&["example.com/app"]), &[]).unwrap();
        assert_eq!(program.roots, ["example.com/app"]);
    }

    #[test]
    fn test_patterns_select_roots() {
        let manifest = manifest(&[
            "example.com/app",
            "example.com/app/cmd",
            "example.com/application",
            "example.com/lib",
        ]);
        let program = program_from_manifest(
            manifest,
            &["example.com/lib".to_owned(), "example.com/app/...".to_owned()],
        )
        .unwrap();
        assert_eq!(
            program.roots,
            ["example.com/lib", "example.com/app", "example.com/app/cmd"]
        );
    }

    #[test]
    fn test_unmatched_pattern_is_an_error() {
        let err = program_from_manifest(
            manifest(&["example.com/app"]),
            &["example.com/other".to_owned()],
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::NoMatch(pattern) if pattern == "example.com/other"));
    }

    #[test]
    fn test_no_roots_is_an_error() {
        let mut manifest = manifest(&["example.com/app"]);
        manifest.roots.clear();
        let err = program_from_manifest(manifest, &[]).unwrap_err();
        assert!(matches!(err, LoadError::NoRoots));
    }

    #[test]
    fn test_diagnostics_reject_the_program() {
        let mut manifest = manifest(&["example.com/app", "example.com/lib"]);
        manifest.packages[1].errors = vec!["lib.go:3:1: undefined: Foo".to_owned()];
        let err = program_from_manifest(manifest, &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "package load errors in example.com/lib: lib.go:3:1: undefined: Foo"
        );
    }

    #[test]
    fn test_missing_inlined_import_is_an_error() {
        let mut manifest = manifest(&["example.com/app"]);
        manifest.packages[0].imports = vec!["fmt".to_owned(), "example.com/gone".to_owned()];
        let err = program_from_manifest(manifest, &[]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingPackage { imported, .. } if imported == "example.com/gone"
        ));
    }

    #[test]
    fn test_duplicate_packages_are_rejected() {
        let manifest = manifest(&["example.com/app", "example.com/app"]);
        let err = program_from_manifest(manifest, &[]).unwrap_err();
        assert!(matches!(err, LoadError::DuplicatePackage(path) if path == "example.com/app"));
    }
}
