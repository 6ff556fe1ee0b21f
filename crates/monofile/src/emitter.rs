//! Assembly of the merged compilation unit
//!
//! Output layout: the package clause, one import block for the retained
//! packages, then every inlined package in inline order. Top-level chunks
//! are separated by one blank line.

use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::{
    ast::NodeId,
    comment_filter::{CommentMap, PackageComments, Placement},
    config::Config,
    naming::{package_name_from_path, retain_alias},
    printer::Printer,
    program::{Package, Program},
};

/// Package clause name of the merged unit
pub fn destination_name(program: &Program, config: &Config) -> String {
    if let Some(name) = &config.package_name {
        return name.clone();
    }
    let mut roots = program.root_packages();
    match (roots.next(), roots.next()) {
        (Some(root), None) if root.is_adhoc() => config.adhoc_package_name.clone(),
        (Some(root), None) => package_name_from_path(&root.path).to_owned(),
        (Some(first), Some(_)) if first.is_adhoc() => config.adhoc_package_name.clone(),
        _ => config.merged_package_name.clone(),
    }
}

/// An inlined package ready for printing
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub package: &'a Package,
    pub comments: &'a PackageComments,
}

#[derive(Debug)]
pub struct Emitter<'a> {
    package_name: &'a str,
    annotate: bool,
    chunks: Vec<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(package_name: &'a str, config: &Config) -> Self {
        Self {
            package_name,
            annotate: config.annotate_packages,
            chunks: Vec::new(),
        }
    }

    /// The import block: referenced packages under their canonical alias,
    /// the rest as blank imports so their initialisation still runs
    pub fn imports(&mut self, retain: &IndexSet<String>, used: &BTreeSet<usize>) {
        if retain.is_empty() {
            return;
        }
        let mut block = String::from("import (");
        for (index, path) in retain.iter().enumerate() {
            let alias = if used.contains(&index) {
                retain_alias(index)
            } else {
                "_".to_owned()
            };
            block.push_str(&format!("\n\t{alias} \"{path}\""));
        }
        block.push_str("\n)");
        self.chunks.push(block);
    }

    pub fn section(&mut self, section: Section<'_>) {
        if self.annotate {
            self.chunks
                .push(format!("// package {}", section.package.path));
        }
        for (index, file) in section.package.files.iter().enumerate() {
            let empty = CommentMap::default();
            let comments = section.comments.file(index).unwrap_or(&empty);

            let docs = print_comments(comments, file.id, Placement::PackageDoc);
            if !docs.is_empty() {
                self.chunks.push(docs);
            }
            for decl in &file.decls {
                let mut printer = Printer::with_comments(comments);
                printer.decl(decl);
                self.chunks.push(printer.finish());
            }
            let dangling = print_comments(comments, file.id, Placement::Dangling);
            if !dangling.is_empty() {
                self.chunks.push(dangling);
            }
        }
    }

    pub fn finish(self) -> String {
        let mut out = format!("package {}\n", self.package_name);
        for chunk in &self.chunks {
            out.push('\n');
            out.push_str(chunk);
            out.push('\n');
        }
        out
    }
}

fn print_comments(comments: &CommentMap, node: NodeId, placement: Placement) -> String {
    let mut printer = Printer::new();
    for (index, group) in comments.placed(node, placement).enumerate() {
        if index > 0 {
            printer.newline();
        }
        printer.comment_group(group);
    }
    printer.finish()
}
