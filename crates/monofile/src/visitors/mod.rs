//! Traversals over loaded Go syntax
//!
//! The rewriter renames identifiers in place; the transformer trait and
//! its walk functions are shared with the comment collector.

mod identifier_rewriter;
mod transformer;

pub use identifier_rewriter::{IdentifierRewriter, RewriteStats, check_imports, rewrite_package};
pub use transformer::{
    IdentParent, Transformer, walk_block, walk_decl, walk_expr, walk_field, walk_fields,
    walk_file, walk_func_type, walk_spec, walk_stmt,
};
