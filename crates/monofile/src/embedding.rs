//! Embedded field relations
//!
//! A struct field declared without a name takes the base name of its type,
//! and selectors reach it (and everything promoted through it) by that name.
//! Once the type is renamed, every such selector has to follow. The table
//! maps each embedded field object to the type it embeds and the package
//! that type lives in, computed once per package from the symbol table.

use log::trace;
use rustc_hash::FxHashMap;

use crate::types::{ObjectId, ObjectKind, TypeInfo, TypeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedField {
    /// Implicit field name
    pub name: String,
    /// Struct type declaring the field, when the loader reported it
    pub owner: Option<String>,
    /// Name of the embedded named type, after stripping one pointer
    pub type_name: String,
    /// Package declaring the embedded type; `None` for predeclared types
    pub home: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    fields: FxHashMap<ObjectId, EmbeddedField>,
}

impl EmbeddingTable {
    /// Collect every embedded field of a named type known to `info`
    ///
    /// Fields embedding unnamed or basic types are skipped: their implicit
    /// names never change.
    pub fn build(info: &TypeInfo) -> Self {
        let mut fields = FxHashMap::default();
        for (index, object) in info.objects.iter().enumerate() {
            if !object.is_embedded_field() {
                continue;
            }
            let Some(TypeRef::Named { package, name }) = object.ty.as_ref().map(TypeRef::deref)
            else {
                continue;
            };
            let owner = match &object.kind {
                ObjectKind::Var { owner, .. } => owner.clone(),
                _ => None,
            };
            trace!(
                "Embedded field {} of {:?} -> {:?}.{}",
                object.name, owner, package, name
            );
            fields.insert(
                ObjectId(index as u32),
                EmbeddedField {
                    name: object.name.clone(),
                    owner,
                    type_name: name.clone(),
                    home: package.clone(),
                },
            );
        }
        Self { fields }
    }

    pub fn get(&self, field: ObjectId) -> Option<&EmbeddedField> {
        self.fields.get(&field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PackageBuilder;

    #[test]
    fn test_pointer_and_value_embeddings_are_recorded() {
        let mut builder = PackageBuilder::new("example.com/m/embedding", "embedding");
        let child = builder.embedded_field(
            "example.com/m/embedding",
            "parent",
            TypeRef::pointer(TypeRef::named("example.com/m/embedding/child", "Child")),
        );
        let parent2 = builder.embedded_field(
            "example.com/m/embedding",
            "parent3",
            TypeRef::named("example.com/m/embedding", "parent2"),
        );
        let hoge = builder.field("example.com/m/embedding", "parent", "Hoge");
        let package = builder.build();

        let table = EmbeddingTable::build(&package.info);
        assert_eq!(
            table.get(child),
            Some(&EmbeddedField {
                name: "Child".to_owned(),
                owner: Some("parent".to_owned()),
                type_name: "Child".to_owned(),
                home: Some("example.com/m/embedding/child".to_owned()),
            })
        );
        assert_eq!(
            table.get(parent2).and_then(|field| field.home.as_deref()),
            Some("example.com/m/embedding")
        );
        assert!(table.get(hoge).is_none());
    }

    #[test]
    fn test_basic_and_predeclared_embeddings() {
        let mut builder = PackageBuilder::new("example.com/lib", "lib");
        let int = builder.embedded_field("example.com/lib", "T", TypeRef::Basic("int".to_owned()));
        let error = builder.embedded_field(
            "example.com/lib",
            "T",
            TypeRef::Named {
                package: None,
                name: "error".to_owned(),
            },
        );
        let not_embedded = builder.declare("x", ObjectKind::Const);
        let package = builder.build();

        let table = EmbeddingTable::build(&package.info);
        assert!(table.get(int).is_none());
        assert!(table.get(not_embedded).is_none());
        assert_eq!(table.get(error).map(|field| field.home.clone()), Some(None));
    }
}
