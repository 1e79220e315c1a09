//! Method bindings discovered in module metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeRef;

/// One parameter of a bound method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// The identity and signature of a static method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// File name of the module declaring the method (e.g. `SampleApp.dll`).
    pub module_file: String,
    pub namespace: String,
    /// Declaring type name, without namespace.
    pub type_name: String,
    pub method_name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeRef,
}

impl MethodSignature {
    /// `Namespace.Type`, or just `Type` for the global namespace.
    pub fn declaring_type(&self) -> String {
        if self.namespace.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.type_name)
        }
    }

    /// `Namespace.Type::Method`, used to identify the method in diagnostics.
    pub fn full_name(&self) -> String {
        format!("{}::{}", self.declaring_type(), self.method_name)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type.short_name(), self.full_name())?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", p.ty.short_name(), p.name)?;
        }
        f.write_str(")")
    }
}

/// A managed method the host may call into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBinding {
    pub method: MethodSignature,
    /// Explicit external name, if the marker carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

impl ExportBinding {
    /// The name the wrapper is exported under.
    pub fn export_name(&self) -> &str {
        match self.entry_point.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.method.method_name,
        }
    }
}

/// A managed method whose body the host supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBinding {
    pub method: MethodSignature,
    /// Host module the function is imported from.
    pub module: String,
    /// Explicit call target, if the marker carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

impl ImportBinding {
    /// The host function name; also the name of the forwarding function.
    pub fn function_name(&self) -> &str {
        match self.entry_point.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.method.method_name,
        }
    }
}
