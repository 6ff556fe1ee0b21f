//! Resolved symbol information for one package
//!
//! This is the loader's answer to "what does this identifier refer to".
//! Objects and scopes live in flat arenas indexed by [`ObjectId`] and
//! [`ScopeId`]; the `defs`/`uses` maps connect identifier occurrences to
//! objects the same way Go's `types.Info` does.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ast::{Ident, IdentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Predeclared identifiers (`int`, `len`, `panic`, ...)
    Universe,
    Package,
    File,
    /// Function bodies, blocks and everything nested below them
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub kind: ScopeKind,
    #[serde(default)]
    pub parent: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Local name of an imported package
    PkgName {
        imported: String,
    },
    Const,
    TypeName,
    Var {
        /// Struct field rather than a variable or parameter
        #[serde(default)]
        field: bool,
        /// Field declared without an explicit name
        #[serde(default)]
        embedded: bool,
        /// Name of the struct type declaring the field, when known
        #[serde(default)]
        owner: Option<String>,
    },
    Func,
    Label,
    Builtin,
    Nil,
}

/// Structural description of an object's type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// A defined type; `package` is `None` for predeclared types like `error`
    Named {
        #[serde(default)]
        package: Option<String>,
        name: String,
    },
    Pointer(Box<TypeRef>),
    Basic(String),
    Other,
}

impl TypeRef {
    pub fn named(package: &str, name: &str) -> Self {
        Self::Named {
            package: Some(package.to_owned()),
            name: name.to_owned(),
        }
    }

    pub fn pointer(inner: Self) -> Self {
        Self::Pointer(Box::new(inner))
    }

    /// Strips one level of pointer indirection
    pub fn deref(&self) -> &Self {
        match self {
            Self::Pointer(inner) => inner,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    /// Path of the declaring package; `None` for universe objects
    #[serde(default)]
    pub package: Option<String>,
    /// Enclosing scope; `None` for fields, methods and blank declarations
    #[serde(default)]
    pub parent: Option<ScopeId>,
    #[serde(default)]
    pub ty: Option<TypeRef>,
}

impl Object {
    pub const fn is_embedded_field(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Var {
                field: true,
                embedded: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Identifiers that declare an object
    #[serde(default)]
    pub defs: FxHashMap<IdentId, ObjectId>,
    /// Identifiers that refer to an object declared elsewhere
    #[serde(default)]
    pub uses: FxHashMap<IdentId, ObjectId>,
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

impl TypeInfo {
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0 as usize)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn def_of(&self, ident: &Ident) -> Option<ObjectId> {
        ident.id.and_then(|id| self.defs.get(&id).copied())
    }

    pub fn use_of(&self, ident: &Ident) -> Option<ObjectId> {
        ident.id.and_then(|id| self.uses.get(&id).copied())
    }

    /// The object an identifier defines, or failing that the one it uses
    pub fn object_of(&self, ident: &Ident) -> Option<ObjectId> {
        self.def_of(ident).or_else(|| self.use_of(ident))
    }

    /// Whether `scope` is a package scope sitting directly under a root
    /// universe scope. Local scopes and the universe itself fail this.
    fn is_package_scope(&self, scope: ScopeId) -> bool {
        let Some(package) = self.scope(scope) else {
            return false;
        };
        if package.kind != ScopeKind::Package {
            return false;
        }
        let Some(universe) = package.parent.and_then(|id| self.scope(id)) else {
            return false;
        };
        universe.kind == ScopeKind::Universe && universe.parent.is_none()
    }

    /// Whether the object is declared at package scope
    pub fn is_top_level(&self, id: ObjectId) -> bool {
        self.object(id)
            .and_then(|object| object.parent)
            .is_some_and(|parent| self.is_package_scope(parent))
    }

    /// Whether the object is a package name declared by a file's import,
    /// i.e. its file scope hangs off the package scope
    pub fn is_top_level_import(&self, id: ObjectId) -> bool {
        let Some(object) = self.object(id) else {
            return false;
        };
        if !matches!(object.kind, ObjectKind::PkgName { .. }) {
            return false;
        }
        let Some(file) = object.parent.and_then(|parent| self.scope(parent)) else {
            return false;
        };
        file.kind == ScopeKind::File && file.parent.is_some_and(|id| self.is_package_scope(id))
    }
}
