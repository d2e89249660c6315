pub mod go;

// Re-export the Go model for convenience
pub use go::{GoFileSemantics, ImportGraph, PackageCatalog, PackageFile, Symbol, TypeInfo};
