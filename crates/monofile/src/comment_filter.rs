//! Comment attachment and filtering
//!
//! Comments live beside the tree, not in it, so removing a declaration does
//! not remove its comments. Before any mutation each comment group is
//! attached to one node; after mutation only groups whose node survived are
//! kept. The printer uses the same attachment to place comments.
//!
//! A group attaches to, in order of preference:
//! - the node ending on the group's first line before it (trailing),
//! - the next node starting after it inside the innermost enclosing node
//!   (leading),
//! - the innermost enclosing node itself (dangling).
//!
//! Groups before the package clause are package documentation.

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    ast::{CommentGroup, File, Ident, NodeId, Span},
    error::Result,
    program::Package,
    visitors::{IdentParent, Transformer, walk_file},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Printed on the lines above the node
    Leading,
    /// Printed after the node on its last line
    Trailing,
    /// Printed on the lines after the node
    Dangling,
    /// Printed at the start of the file's section
    PackageDoc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attached {
    pub placement: Placement,
    pub group: CommentGroup,
}

/// Comment groups of one file keyed by the node they belong to
#[derive(Debug, Clone, Default)]
pub struct CommentMap {
    attached: FxHashMap<NodeId, Vec<Attached>>,
}

/// Records every comment-bearing node in preorder
#[derive(Default)]
struct NodeCollector {
    nodes: Vec<(NodeId, Span)>,
}

impl Transformer for NodeCollector {
    fn visit_node(&mut self, id: NodeId, span: Span) {
        self.nodes.push((id, span));
    }

    fn visit_ident(&mut self, _ident: &mut Ident, _parent: IdentParent) -> Result<()> {
        Ok(())
    }
}

fn collect_nodes(file: &mut File) -> Result<Vec<(NodeId, Span)>> {
    let mut collector = NodeCollector::default();
    walk_file(&mut collector, file)?;
    Ok(collector.nodes)
}

impl CommentMap {
    /// Attach every comment group of `file` to a node
    pub fn new(file: &mut File) -> Result<Self> {
        let nodes = collect_nodes(file)?;
        let mut map = Self::default();
        for group in &file.comments {
            let (node, placement) = attach(file, &nodes, group);
            map.attached.entry(node).or_default().push(Attached {
                placement,
                group: group.clone(),
            });
        }
        Ok(map)
    }

    /// Keep only groups attached to nodes still present in `file`, and
    /// replace the file's comment list with them
    pub fn filter(&self, file: &mut File) -> Result<Self> {
        if self.is_empty() {
            file.comments.clear();
            return Ok(Self::default());
        }
        let surviving: FxHashSet<NodeId> = collect_nodes(file)?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let attached: FxHashMap<NodeId, Vec<Attached>> = self
            .attached
            .iter()
            .filter(|(id, _)| surviving.contains(*id))
            .map(|(id, comments)| (*id, comments.clone()))
            .collect();
        let filtered = Self { attached };
        file.comments = filtered.comments();
        Ok(filtered)
    }

    /// Groups attached to `node`, in source order
    pub fn get(&self, node: NodeId) -> &[Attached] {
        self.attached.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Groups attached to `node` with the given placement
    pub fn placed(&self, node: NodeId, placement: Placement) -> impl Iterator<Item = &CommentGroup> {
        self.get(node)
            .iter()
            .filter(move |attached| attached.placement == placement)
            .map(|attached| &attached.group)
    }

    /// All kept groups, in source order
    pub fn comments(&self) -> Vec<CommentGroup> {
        let mut comments: Vec<CommentGroup> = self
            .attached
            .values()
            .flatten()
            .map(|attached| attached.group.clone())
            .collect();
        comments.sort_by_key(|group| (group.span.start, group.span.end));
        comments
    }

    pub fn len(&self) -> usize {
        self.attached.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

fn attach(file: &File, nodes: &[(NodeId, Span)], group: &CommentGroup) -> (NodeId, Placement) {
    let span = group.span;
    if span.end <= file.package_span.start {
        return (file.id, Placement::PackageDoc);
    }

    // Strictly greater keeps the outermost of nodes ending at the same spot
    let mut trailing: Option<(NodeId, Span)> = None;
    for &(id, node) in nodes {
        if node.end.line == span.start.line
            && node.end <= span.start
            && trailing.is_none_or(|(_, best)| node.end > best.end)
        {
            trailing = Some((id, node));
        }
    }
    if let Some((id, _)) = trailing {
        return (id, Placement::Trailing);
    }

    // In preorder the last node containing the group is the innermost one
    let (enclosing, bounds) = nodes
        .iter()
        .rev()
        .find(|(_, node)| node.contains(span))
        .copied()
        .unwrap_or((file.id, file.span));
    let next = nodes.iter().find(|(id, node)| {
        *id != enclosing && node.start >= span.end && bounds.contains(*node)
    });
    match next {
        Some(&(id, _)) => (id, Placement::Leading),
        None => (enclosing, Placement::Dangling),
    }
}

/// Comment maps of every file of a package, snapshotted before mutation
#[derive(Debug, Clone, Default)]
pub struct PackageComments {
    files: Vec<CommentMap>,
}

impl PackageComments {
    pub fn snapshot(package: &mut Package) -> Result<Self> {
        let files = package
            .files
            .iter_mut()
            .map(CommentMap::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { files })
    }

    /// Filter every file's comments against the mutated package
    pub fn filter(&self, package: &mut Package) -> Result<Self> {
        let before: usize = self.files.iter().map(CommentMap::len).sum();
        let files = package
            .files
            .iter_mut()
            .zip(&self.files)
            .map(|(file, map)| map.filter(file))
            .collect::<Result<Vec<_>>>()?;
        let filtered = Self { files };
        let after: usize = filtered.files.iter().map(CommentMap::len).sum();
        debug!(
            "Kept {after} of {before} comment groups in {}",
            package.path
        );
        Ok(filtered)
    }

    /// Comment map of the file at `index` in loader order
    pub fn file(&self, index: usize) -> Option<&CommentMap> {
        self.files.get(index)
    }
}
