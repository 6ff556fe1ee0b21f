//! Classification of the import closure into inlined and retained packages
//!
//! The walk is a depth-first descent from each root, visiting imports in
//! lexicographic order. A package joins the inline order only after all of
//! its imports did, so the order is dependency-before-dependent and package
//! initialisation keeps its relative order once bodies are concatenated.

use indexmap::IndexSet;
use log::{debug, info};
use petgraph::{
    algo::toposort,
    graph::{DiGraph, NodeIndex},
};
use rustc_hash::FxHashMap;

use crate::{
    error::{LoadError, Result},
    program::{Package, Program},
};

/// The two package orders every later stage indexes into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Packages merged into the output, dependencies first, roots last
    pub inline: IndexSet<String>,
    /// Packages kept as ordinary imports, in discovery order
    pub retain: IndexSet<String>,
}

impl ScanResult {
    pub fn inline_index(&self, path: &str) -> Option<usize> {
        self.inline.get_index_of(path)
    }

    pub fn retain_index(&self, path: &str) -> Option<usize> {
        self.retain.get_index_of(path)
    }
}

/// Walk the import graph from the program's roots
///
/// `is_retain` decides from a package (a stub when the loader did not
/// provide one) whether it stays an import. Roots are always inlined.
pub fn scan(program: &Program, is_retain: impl Fn(&Package) -> bool) -> Result<ScanResult> {
    if program.roots.is_empty() {
        return Err(LoadError::NoRoots.into());
    }
    let is_retain = |package: &Package| {
        !program.roots.iter().any(|root| *root == package.path) && is_retain(package)
    };
    reject_cycles(program, &is_retain)?;

    let mut walker = Walker {
        program,
        is_retain: &is_retain,
        result: ScanResult::default(),
    };
    for root in &program.roots {
        if walker.result.inline.contains(root) {
            debug!("Root {root} already inlined as a dependency");
            continue;
        }
        let package = program
            .package(root)
            .ok_or_else(|| LoadError::NoMatch(root.clone()))?;
        walker.walk(package)?;
    }

    let result = walker.result;
    info!(
        "Inlining {} packages, retaining {} imports",
        result.inline.len(),
        result.retain.len()
    );
    debug!("Inline order: {:?}", result.inline);
    debug!("Retain order: {:?}", result.retain);
    Ok(result)
}

struct Walker<'a, F> {
    program: &'a Program,
    is_retain: &'a F,
    result: ScanResult,
}

impl<'a, F: Fn(&Package) -> bool> Walker<'a, F> {
    fn walk(&mut self, package: &'a Package) -> Result<()> {
        let mut imports: Vec<&str> = package.imports.iter().map(String::as_str).collect();
        imports.sort_unstable();
        imports.dedup();

        for path in imports {
            let imported = self.program.package(path);
            if retained(self.is_retain, path, imported) {
                self.result.retain.insert(path.to_owned());
                continue;
            }
            // A package already in the inline order had its whole closure walked
            if self.result.inline.contains(path) {
                continue;
            }
            let imported = imported.ok_or_else(|| LoadError::MissingPackage {
                package: package.path.clone(),
                imported: path.to_owned(),
            })?;
            self.walk(imported)?;
        }

        self.result.inline.insert(package.path.clone());
        Ok(())
    }
}

fn retained(is_retain: impl Fn(&Package) -> bool, path: &str, package: Option<&Package>) -> bool {
    match package {
        Some(package) => is_retain(package),
        None => is_retain(&Package::stub(path, String::new())),
    }
}

/// Fail on an import cycle among inlined packages; the post-order walk
/// would otherwise never terminate
fn reject_cycles(program: &Program, is_retain: &impl Fn(&Package) -> bool) -> Result<()> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: FxHashMap<&str, NodeIndex> = FxHashMap::default();

    for package in program.packages.values() {
        if is_retain(package) {
            continue;
        }
        nodes.insert(&package.path, graph.add_node(&package.path));
    }
    for package in program.packages.values() {
        let Some(&from) = nodes.get(package.path.as_str()) else {
            continue;
        };
        for imported in &package.imports {
            if let Some(&to) = nodes.get(imported.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
    }

    toposort(&graph, None)
        .map(|_| ())
        .map_err(|cycle| LoadError::ImportCycle(graph[cycle.node_id()].to_owned()).into())
}
