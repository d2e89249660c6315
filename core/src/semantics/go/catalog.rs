//! Exported API of packages the resolver knows about.
//!
//! There is no Go type checker behind the resolver, so package members can
//! only be resolved for packages whose exports are registered here. The
//! standard `log` package is always present.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Exported identifiers of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageExports {
    pub path: String,
    /// Name declared by the package clause.
    pub name: String,
    pub members: BTreeSet<String>,
}

impl PackageExports {
    pub fn new<I, S>(path: &str, name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exports(&self, member: &str) -> bool {
        self.members.contains(member)
    }
}

/// Exported functions, types and constants of Go's `log` package.
const STD_LOG_EXPORTS: &[&str] = &[
    "Default",
    "Fatal",
    "Fatalf",
    "Fatalln",
    "Flags",
    "LUTC",
    "Ldate",
    "Llongfile",
    "Lmicroseconds",
    "Lmsgprefix",
    "Logger",
    "Lshortfile",
    "LstdFlags",
    "Ltime",
    "New",
    "Output",
    "Panic",
    "Panicf",
    "Panicln",
    "Prefix",
    "Print",
    "Printf",
    "Println",
    "SetFlags",
    "SetOutput",
    "SetPrefix",
    "Writer",
];

#[derive(Debug, Clone, Default)]
pub struct PackageCatalog {
    packages: HashMap<String, PackageExports>,
}

impl PackageCatalog {
    /// An empty catalog: no package member resolves.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog of the standard library packages the tool cares about.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        catalog.register(PackageExports::new("log", "log", STD_LOG_EXPORTS.iter().copied()));
        catalog
    }

    /// Register (or extend) a package's exports.
    pub fn register(&mut self, exports: PackageExports) {
        match self.packages.get_mut(&exports.path) {
            Some(existing) => existing.members.extend(exports.members),
            None => {
                self.packages.insert(exports.path.clone(), exports);
            }
        }
    }

    pub fn lookup(&self, path: &str) -> Option<&PackageExports> {
        self.packages.get(path)
    }
}
