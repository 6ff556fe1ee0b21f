//! Merge a multi-package Go program into a single source file.
//!
//! Standard library imports are kept, aliased `retain{M}`; every other
//! package is inlined with its package-scope names prefixed `unfold{N}__`.
//! Parsing and type checking happen outside this crate: a [`Loader`] hands
//! over the syntax trees together with resolved symbol tables.

pub mod ast;
pub mod builder;
pub mod bundler;
pub mod comment_filter;
pub mod config;
pub mod embedding;
pub mod emitter;
pub mod error;
pub mod graph_scanner;
pub mod import_pruner;
pub mod loader;
pub mod naming;
pub mod printer;
pub mod program;
pub mod stdlib_detection;
pub mod types;
pub mod visitors;

pub use builder::{PackageBuilder, ProgramBuilder};
pub use bundler::{Bundler, bundle};
pub use config::Config;
pub use error::{BundleError, LoadError, Result};
pub use loader::{Loader, Manifest, ManifestLoader};
pub use program::{Package, Program};
