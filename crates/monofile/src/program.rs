//! Packages and the loaded program

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ast::File, types::TypeInfo};

/// Path the Go tool gives a package assembled from files named on the command line
pub const ADHOC_PACKAGE_PATH: &str = "command-line-arguments";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Import path identifying the package
    pub path: String,
    /// Name from the package clause
    pub name: String,
    /// Marks an ad-hoc unit under a path other than [`ADHOC_PACKAGE_PATH`]
    #[serde(default)]
    pub adhoc: bool,
    /// Direct import paths
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub files: Vec<File>,
    #[serde(default)]
    pub info: TypeInfo,
    /// Loader diagnostics; a package with any is rejected
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Package {
    /// An empty package, as loaders report retained dependencies
    pub fn stub(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            adhoc: false,
            imports: Vec::new(),
            files: Vec::new(),
            info: TypeInfo::default(),
            errors: Vec::new(),
        }
    }

    /// Whether this is an unnamed unit built from loose files
    pub fn is_adhoc(&self) -> bool {
        self.adhoc || self.path == ADHOC_PACKAGE_PATH
    }

    /// Import paths used by the package's files, deduplicated in source order
    pub fn imports_from_syntax(&self) -> Vec<String> {
        let mut seen = indexmap::IndexSet::new();
        for file in &self.files {
            for spec in file.import_specs() {
                seen.insert(spec.path.clone());
            }
        }
        seen.into_iter().collect()
    }
}

/// Everything the loader produced for one invocation
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// Packages named by the caller's patterns, in pattern order
    pub roots: Vec<String>,
    /// Every package reachable from the roots, keyed by path
    pub packages: IndexMap<String, Package>,
}

impl Program {
    pub fn new(roots: Vec<String>, packages: impl IntoIterator<Item = Package>) -> Self {
        Self {
            roots,
            packages: packages
                .into_iter()
                .map(|package| (package.path.clone(), package))
                .collect(),
        }
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.get(path)
    }

    pub fn root_packages(&self) -> impl Iterator<Item = &Package> {
        self.roots.iter().filter_map(|root| self.packages.get(root))
    }
}
