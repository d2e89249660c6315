//! Resolution of the logging facility's entry points to target symbols.

use std::collections::BTreeSet;

use log::debug;
use logdel_core::semantics::go::{ImportGraph, PackageCatalog, PackageExports, Symbol};

use crate::config::LogFacility;

/// Package catalog with the facility's entry points registered.
///
/// The standard catalog already knows `log`; a custom facility package is
/// registered with its configured entry points as its exports.
pub fn catalog_for(facility: &LogFacility) -> PackageCatalog {
    let mut catalog = PackageCatalog::standard();
    catalog.register(PackageExports::new(
        &facility.package_path,
        &facility.package_name(),
        facility.entry_points.iter().cloned(),
    ));
    catalog
}

/// Resolved identities of the facility's entry points for one package.
///
/// Built once per package and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSymbolSet {
    symbols: BTreeSet<SymbolKey>,
}

/// Ordered stand-in for `Symbol::PackageMember`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SymbolKey {
    package: String,
    name: String,
}

impl TargetSymbolSet {
    /// Look up every entry point in the package's import graph.
    ///
    /// A package that is not imported, or an entry point it does not
    /// export, contributes nothing.
    pub fn resolve(graph: &ImportGraph, facility: &LogFacility) -> Self {
        let mut symbols = BTreeSet::new();
        for name in &facility.entry_points {
            match graph.lookup(&facility.package_path, name) {
                Some(Symbol::PackageMember { package, name }) => {
                    symbols.insert(SymbolKey { package, name });
                }
                _ => debug!("no symbol for {}.{}", facility.package_path, name),
            }
        }
        Self { symbols }
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        match symbol {
            Symbol::PackageMember { package, name } => self.symbols.contains(&SymbolKey {
                package: package.clone(),
                name: name.clone(),
            }),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Entry point names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(|key| key.name.as_str())
    }
}
