pub mod catalog;
pub mod model;
pub mod resolve;

pub use catalog::{PackageCatalog, PackageExports};
pub use model::{GoComment, GoFileSemantics, GoImport};
pub use resolve::{ImportGraph, NodeKey, PackageFile, Symbol, TypeInfo};
