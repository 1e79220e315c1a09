//! The module metadata model.
//!
//! A compiled module is described by one JSON document:
//!
//! ```json
//! {
//!   "name": "SampleApp",
//!   "references": ["SampleLib"],
//!   "types": [{
//!     "namespace": "MyNamespace",
//!     "name": "MyClass",
//!     "methods": [{
//!       "name": "Run",
//!       "parameters": [],
//!       "return_type": "System.Int32",
//!       "markers": [{ "kind": "export", "entry_point": "run" }]
//!     }]
//!   }]
//! }
//! ```
//!
//! The builder methods mirror that shape so tests and embedders can assemble
//! modules in code.

use pdkgen_types::{Parameter, PrimitiveKind, TypeRef};
use serde::{Deserialize, Serialize};

/// Extension appended to a module name when no explicit file name is given.
pub const DEFAULT_MODULE_FILE_EXTENSION: &str = "dll";

/// Metadata of one compiled module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Simple module name (`SampleApp`).
    pub name: String,
    /// File the interpreter loads the module from; `<name>.dll` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Names of referenced modules, in declaration order.
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl ModuleMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            references: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| format!("{}.{}", self.name, DEFAULT_MODULE_FILE_EXTENSION))
    }

    pub fn with_reference(mut self, name: impl Into<String>) -> Self {
        self.references.push(name.into());
        self
    }

    pub fn with_type(mut self, ty: TypeDef) -> Self {
        self.types.push(ty);
        self
    }

    /// Parse a module from its JSON description.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> String {
        // A tree of strings and vectors cannot fail to serialize.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// A type declared in a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

impl TypeDef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }
}

/// A method declared on a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_static: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default = "void")]
    pub return_type: TypeRef,
    /// Binding-time markers, in the order they appear in metadata.
    #[serde(default)]
    pub markers: Vec<Marker>,
}

fn default_true() -> bool {
    true
}

fn void() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Void)
}

impl MethodDef {
    pub fn new(name: impl Into<String>, return_type: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            is_static: true,
            parameters: Vec::new(),
            return_type: return_type.into(),
            markers: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// Mark as an export, optionally under an explicit external name.
    pub fn export(mut self, entry_point: Option<&str>) -> Self {
        self.markers.push(Marker::Export {
            entry_point: entry_point.map(str::to_string),
        });
        self
    }

    /// Mark as an import from `module`, optionally under an explicit name.
    pub fn import(mut self, module: &str, entry_point: Option<&str>) -> Self {
        self.markers.push(Marker::Import {
            module: module.to_string(),
            entry_point: entry_point.map(str::to_string),
        });
        self
    }
}

/// A binding-time marker on a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Marker {
    /// Callable from the sandbox.
    Export {
        #[serde(default)]
        entry_point: Option<String>,
    },
    /// Supplied by a host module.
    Import {
        module: String,
        #[serde(default)]
        entry_point: Option<String>,
    },
}

impl Marker {
    pub fn is_export(&self) -> bool {
        matches!(self, Self::Export { .. })
    }

    pub fn is_import(&self) -> bool {
        matches!(self, Self::Import { .. })
    }
}

/// Conversion from a type name, so builders accept `"System.String"` directly.
pub fn ty(name: &str) -> TypeRef {
    TypeRef::parse(name)
}
