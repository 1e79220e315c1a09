//! The type compatibility table.
//!
//! The bridge only moves a closed set of primitive numeric kinds across the
//! sandbox boundary. Each kind has exactly one metadata spelling (the CLR
//! fully-qualified name) and exactly one native C spelling:
//!
//! | Kind | Metadata name   | C spelling |
//! |------|-----------------|------------|
//! | I8   | `System.SByte`  | `int8_t`   |
//! | I16  | `System.Int16`  | `int16_t`  |
//! | I32  | `System.Int32`  | `int32_t`  |
//! | I64  | `System.Int64`  | `int64_t`  |
//! | U8   | `System.Byte`   | `uint8_t`  |
//! | U16  | `System.UInt16` | `uint16_t` |
//! | U32  | `System.UInt32` | `uint32_t` |
//! | U64  | `System.UInt64` | `uint64_t` |
//! | F32  | `System.Single` | `float`    |
//! | F64  | `System.Double` | `double`   |
//! | Void | `System.Void`   | `void`     |
//!
//! `Void` is only valid in return position.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A primitive kind the bridge can marshal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Void,
}

impl PrimitiveKind {
    /// Every member of the table, in table order.
    pub const ALL: [PrimitiveKind; 11] = [
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Void,
    ];

    /// Native C spelling of this kind.
    pub fn native_spelling(self) -> &'static str {
        match self {
            Self::I8 => "int8_t",
            Self::I16 => "int16_t",
            Self::I32 => "int32_t",
            Self::I64 => "int64_t",
            Self::U8 => "uint8_t",
            Self::U16 => "uint16_t",
            Self::U32 => "uint32_t",
            Self::U64 => "uint64_t",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::Void => "void",
        }
    }

    /// Fully-qualified metadata name of this kind.
    pub fn metadata_name(self) -> &'static str {
        match self {
            Self::I8 => "System.SByte",
            Self::I16 => "System.Int16",
            Self::I32 => "System.Int32",
            Self::I64 => "System.Int64",
            Self::U8 => "System.Byte",
            Self::U16 => "System.UInt16",
            Self::U32 => "System.UInt32",
            Self::U64 => "System.UInt64",
            Self::F32 => "System.Single",
            Self::F64 => "System.Double",
            Self::Void => "System.Void",
        }
    }

    /// Look up a kind by its exact metadata name.
    pub fn from_metadata_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.metadata_name() == name)
    }

    pub fn is_void(self) -> bool {
        matches!(self, Self::Void)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_spelling())
    }
}

/// Returned when a name is not a member of the type table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a supported primitive type")]
pub struct UnknownPrimitive(pub String);

impl FromStr for PrimitiveKind {
    type Err = UnknownPrimitive;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_metadata_name(s).ok_or_else(|| UnknownPrimitive(s.to_string()))
    }
}

/// A type as it appears in a method signature.
///
/// Serialized as the plain metadata name, so `"System.Int32"` round-trips to
/// `TypeRef::Primitive(PrimitiveKind::I32)` and anything else is kept verbatim
/// as `TypeRef::Unsupported`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Unsupported { name: String },
}

impl TypeRef {
    pub fn parse(name: &str) -> Self {
        match PrimitiveKind::from_metadata_name(name) {
            Some(kind) => Self::Primitive(kind),
            None => Self::Unsupported {
                name: name.to_string(),
            },
        }
    }

    /// The metadata spelling, as read.
    pub fn metadata_name(&self) -> &str {
        match self {
            Self::Primitive(kind) => kind.metadata_name(),
            Self::Unsupported { name } => name,
        }
    }

    /// The kind, if this type is a table member.
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            Self::Unsupported { .. } => None,
        }
    }

    /// Table membership.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Valid as a parameter: a table member other than `Void`.
    pub fn is_supported_param(&self) -> bool {
        matches!(self, Self::Primitive(kind) if !kind.is_void())
    }

    /// Valid as a return type: any table member.
    pub fn is_supported_return(&self) -> bool {
        self.is_supported()
    }

    /// The short name (last dotted segment), used in human-readable messages.
    pub fn short_name(&self) -> &str {
        let full = self.metadata_name();
        full.rsplit('.').next().unwrap_or(full)
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metadata_name())
    }
}

impl Serialize for TypeRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.metadata_name())
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}
