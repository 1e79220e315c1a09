//! pdkgen metadata layer.
//!
//! ```text
//! <module>.json → ModuleReader → ModuleMetadata → scan → ScanResult { exports, imports }
//! ```
//!
//! The rest of the pipeline only sees [`ScanResult`]; how module metadata is
//! obtained stays behind the [`ModuleReader`] trait.

pub mod error;
pub mod model;
pub mod reader;
pub mod scanner;

pub use error::{MetadataError, MetadataResult};
pub use model::{Marker, MethodDef, ModuleMetadata, TypeDef};
pub use reader::{DirectoryModuleReader, MemoryModuleReader, ModuleReader};
pub use scanner::{scan, ScanResult};
