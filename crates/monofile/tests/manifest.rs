mod common;

use std::path::{Path, PathBuf};

use monofile::{BundleError, Bundler, Config, LoadError, Loader, Manifest, ManifestLoader, Program};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_manifest(dir: &TempDir, program: &Program) -> PathBuf {
    let manifest = Manifest {
        roots: program.roots.clone(),
        packages: program.packages.values().cloned().collect(),
    };
    let path = dir.path().join("monofile.json");
    std::fs::write(&path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
    path
}

fn bundle_file(path: &Path, patterns: &[String]) -> monofile::Result<String> {
    Bundler::new(Config::default()).bundle_patterns(&ManifestLoader::new(path), patterns)
}

#[test]
fn test_manifest_bundles_like_the_program_it_describes() {
    let dir = TempDir::new().unwrap();
    let path = write_manifest(&dir, &common::greeter());

    let from_manifest = bundle_file(&path, &[]).unwrap();
    let direct = monofile::bundle(common::greeter(), &Config::default()).unwrap();
    assert_eq!(from_manifest, direct);
}

#[test]
fn test_patterns_override_manifest_roots() {
    let dir = TempDir::new().unwrap();
    let path = write_manifest(&dir, &common::greeter());

    let out = bundle_file(&path, &[common::GREET.to_owned()]).unwrap();
    assert_eq!(
        out,
        "package greet

import (
\tretain0 \"strings\"
)

// package example.com/greet

func unfold0__Greet(name string) string {
\treturn retain0.ToUpper(name)
}
"
    );
}

#[test]
fn test_imports_are_derived_when_absent() {
    let dir = TempDir::new().unwrap();
    let mut program = common::chain_program();
    for package in program.packages.values_mut() {
        package.imports.clear();
    }
    let path = write_manifest(&dir, &program);

    let loaded = ManifestLoader::new(&path).load(&[]).unwrap();
    let root = loaded.package(&loaded.roots[0]).unwrap();
    assert_eq!(root.imports, [common::CHAIN]);
}

#[test]
fn test_missing_manifest_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = bundle_file(&dir.path().join("absent.json"), &[]).unwrap_err();
    assert!(matches!(err, BundleError::Load(LoadError::Io { .. })));
}

#[test]
fn test_malformed_manifest_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monofile.json");
    std::fs::write(&path, "{\"roots\": [\"main\"], \"packages\": 3}").unwrap();

    let err = bundle_file(&path, &[]).unwrap_err();
    assert!(matches!(err, BundleError::Load(LoadError::Malformed { .. })));
    assert!(err.to_string().starts_with("malformed manifest"));
}
