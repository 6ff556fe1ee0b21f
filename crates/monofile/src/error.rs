//! Error kinds surfaced by the bundler
//!
//! Every error is fatal: the pipeline never emits partial output.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = BundleError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// `import . "path"` brings every exported name into scope, which makes
    /// references impossible to attribute to their package.
    #[error("dot import not supported: {package} imports {imported} with `.`")]
    UnsupportedImport { package: String, imported: String },

    /// A resolution invariant does not hold; this is a defect, not bad input
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),

    #[error("top-level name `{name}` declared by {first} collides with {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("package load errors in {package}: {}", .diagnostics.join("; "))]
    Diagnostics {
        package: String,
        diagnostics: Vec<String>,
    },

    #[error("failed to read manifest {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("package {0} appears more than once")]
    DuplicatePackage(String),

    #[error("package {package} imports {imported}, which was not loaded")]
    MissingPackage { package: String, imported: String },

    #[error("pattern `{0}` matched no packages")]
    NoMatch(String),

    #[error("no root packages to bundle")]
    NoRoots,

    #[error("import cycle through {0}")]
    ImportCycle(String),
}
