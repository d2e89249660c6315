//! Identifier resolution for one Go package.
//!
//! A lexical scope walk that maps the identifiers of `qualifier.member`
//! selectors to the declarations they refer to. It answers the one question
//! the rewriter asks of a type checker: does `x.Y` name an exported member of
//! an imported package, or something else that happens to be spelled `x`?
//!
//! Lookup order follows Go scoping: innermost local scope, then the package
//! block (top-level declarations of every file), then the file block
//! (imports). A local binding is only visible after its declaring statement.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use super::catalog::{PackageCatalog, PackageExports};
use super::model::GoFileSemantics;
use crate::parse::ast::{FileId, ParsedFile};

/// The declaration an identifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symbol {
    /// An identifier naming an imported package.
    PackageName { path: String },
    /// An exported member of an imported package, e.g. `log.Println`.
    PackageMember { package: String, name: String },
    /// A top-level declaration of the package being checked.
    PackageLevel { name: String },
    /// A function-local binding (parameter, variable, constant or type).
    Local { name: String, declared_at: usize },
}

/// Position key of an identifier node within a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub file_id: FileId,
    pub start_byte: usize,
}

impl NodeKey {
    pub fn of(file_id: FileId, node: &Node) -> Self {
        Self {
            file_id,
            start_byte: node.start_byte(),
        }
    }
}

/// A parsed file together with its extracted semantics.
#[derive(Debug)]
pub struct PackageFile {
    pub parsed: ParsedFile,
    pub semantics: GoFileSemantics,
}

impl PackageFile {
    pub fn new(parsed: ParsedFile) -> Self {
        let semantics = GoFileSemantics::from_parsed(&parsed);
        Self { parsed, semantics }
    }
}

/// Packages imported by a Go package, with their exports when known.
#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    packages: BTreeMap<String, Option<PackageExports>>,
}

impl ImportGraph {
    /// Collect the import paths of every file of a package.
    pub fn from_files<'a, I>(files: I, catalog: &PackageCatalog) -> Self
    where
        I: IntoIterator<Item = &'a GoFileSemantics>,
    {
        let mut packages = BTreeMap::new();
        for sem in files {
            for import in &sem.imports {
                packages
                    .entry(import.path.clone())
                    .or_insert_with(|| catalog.lookup(&import.path).cloned());
            }
        }
        Self { packages }
    }

    pub fn is_imported(&self, path: &str) -> bool {
        self.packages.contains_key(path)
    }

    pub fn exports(&self, path: &str) -> Option<&PackageExports> {
        self.packages.get(path).and_then(Option::as_ref)
    }

    /// Resolve `member` of the imported package `path`.
    ///
    /// `None` when the package is not imported, its exports are unknown,
    /// or it does not export `member`.
    pub fn lookup(&self, path: &str, member: &str) -> Option<Symbol> {
        self.exports(path)
            .filter(|exports| exports.exports(member))
            .map(|_| Symbol::PackageMember {
                package: path.to_string(),
                name: member.to_string(),
            })
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }
}

/// Resolved selector identifiers of one package.
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    uses: HashMap<NodeKey, Symbol>,
}

impl TypeInfo {
    /// Resolve every `qualifier.member` selector in the package's files.
    pub fn check(files: &[PackageFile], imports: &ImportGraph) -> Self {
        let package_names = package_level_names(files);
        let mut info = TypeInfo::default();

        for file in files {
            let mut checker = Checker::new(file, imports, &package_names);
            checker.visit(file.parsed.tree.root_node());
            info.uses.extend(checker.uses);
        }

        debug!(
            "resolved {} selector identifiers across {} file(s)",
            info.uses.len(),
            files.len()
        );
        info
    }

    /// The symbol an identifier node resolves to, if any.
    pub fn symbol_of(&self, file_id: FileId, node: &Node) -> Option<&Symbol> {
        self.uses.get(&NodeKey::of(file_id, node))
    }

    pub fn len(&self) -> usize {
        self.uses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uses.is_empty()
    }
}

const SPEC_KINDS: &[&str] = &["var_spec", "const_spec", "type_spec", "type_alias"];

/// Names declared at the top level of any file of the package.
fn package_level_names(files: &[PackageFile]) -> HashSet<String> {
    let mut names = HashSet::new();
    for file in files {
        let parsed = &file.parsed;
        let root = parsed.tree.root_node();
        let mut cursor = root.walk();
        for decl in root.named_children(&mut cursor) {
            match decl.kind() {
                "function_declaration" => {
                    if let Some(name) = decl.child_by_field_name("name") {
                        names.insert(parsed.text_for_node(&name));
                    }
                }
                "var_declaration" | "const_declaration" | "type_declaration" => {
                    collect_spec_names(parsed, decl, &mut names);
                }
                _ => {}
            }
        }
    }
    names
}

fn collect_spec_names(parsed: &ParsedFile, node: Node, names: &mut HashSet<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if SPEC_KINDS.contains(&child.kind()) {
            let mut name_cursor = child.walk();
            for name in child.children_by_field_name("name", &mut name_cursor) {
                names.insert(parsed.text_for_node(&name));
            }
        } else if child.kind().ends_with("_spec_list") {
            collect_spec_names(parsed, child, names);
        }
    }
}

struct Checker<'a> {
    parsed: &'a ParsedFile,
    imports: &'a ImportGraph,
    package_names: &'a HashSet<String>,
    /// Local name -> import path.
    file_scope: HashMap<String, String>,
    /// Innermost scope last; name -> declaring byte offset.
    scopes: Vec<HashMap<String, usize>>,
    uses: HashMap<NodeKey, Symbol>,
}

impl<'a> Checker<'a> {
    fn new(file: &'a PackageFile, imports: &'a ImportGraph, package_names: &'a HashSet<String>) -> Self {
        let mut file_scope = HashMap::new();
        for import in &file.semantics.imports {
            let declared = imports.exports(&import.path).map(|e| e.name.as_str());
            if let Some(name) = import.local_name(declared) {
                file_scope.insert(name, import.path.clone());
            }
        }

        Self {
            parsed: &file.parsed,
            imports,
            package_names,
            file_scope,
            scopes: Vec::new(),
            uses: HashMap::new(),
        }
    }

    fn visit(&mut self, node: Node<'a>) {
        match node.kind() {
            "function_declaration" | "method_declaration" | "func_literal" => {
                self.scopes.push(HashMap::new());
                for field in ["type_parameters", "receiver", "parameters", "result"] {
                    if let Some(list) = node.child_by_field_name(field) {
                        self.declare_params(list);
                    }
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit(body);
                }
                self.scopes.pop();
            }
            "block"
            | "if_statement"
            | "for_statement"
            | "expression_switch_statement"
            | "select_statement"
            | "expression_case"
            | "default_case"
            | "type_case"
            | "communication_case" => {
                self.scopes.push(HashMap::new());
                self.visit_children(node);
                self.scopes.pop();
            }
            "type_switch_statement" => {
                self.scopes.push(HashMap::new());
                let alias = node.child_by_field_name("alias");
                let value = node.child_by_field_name("value");
                for child in named_children(node) {
                    if Some(child) == alias {
                        continue;
                    }
                    self.visit(child);
                    if Some(child) == value {
                        if let Some(alias) = alias {
                            self.declare_identifiers(alias);
                        }
                    }
                }
                self.scopes.pop();
            }
            "short_var_declaration" => {
                if let Some(right) = node.child_by_field_name("right") {
                    self.visit(right);
                }
                if let Some(left) = node.child_by_field_name("left") {
                    self.declare_identifiers(left);
                }
            }
            "range_clause" | "receive_statement" => {
                let defines = has_token(node, ":=");
                if let Some(right) = node.child_by_field_name("right") {
                    self.visit(right);
                }
                if let Some(left) = node.child_by_field_name("left") {
                    if defines {
                        self.declare_identifiers(left);
                    } else {
                        self.visit(left);
                    }
                }
            }
            "var_spec" | "const_spec" => {
                // initialisers are resolved before the new names come into scope
                self.visit_children(node);
                if !self.scopes.is_empty() {
                    self.declare_field(node, "name");
                }
            }
            "type_spec" | "type_alias" => {
                if !self.scopes.is_empty() {
                    self.declare_field(node, "name");
                }
            }
            "selector_expression" => {
                self.resolve_selector(node);
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node<'a>) {
        for child in named_children(node) {
            self.visit(child);
        }
    }

    fn resolve_selector(&mut self, node: Node<'a>) {
        let Some(operand) = node.child_by_field_name("operand") else {
            return;
        };
        if operand.kind() != "identifier" {
            return;
        }

        let parsed = self.parsed;
        let Some(symbol) = self.lookup(parsed.str_for_node(&operand)) else {
            return;
        };

        if let Symbol::PackageName { path } = &symbol {
            if let Some(field) = node.child_by_field_name("field") {
                if let Some(member) = self.imports.lookup(path, parsed.str_for_node(&field)) {
                    self.uses.insert(NodeKey::of(parsed.file_id, &field), member);
                }
            }
        }
        self.uses.insert(NodeKey::of(parsed.file_id, &operand), symbol);
    }

    fn lookup(&self, name: &str) -> Option<Symbol> {
        for scope in self.scopes.iter().rev() {
            if let Some(declared_at) = scope.get(name) {
                return Some(Symbol::Local {
                    name: name.to_string(),
                    declared_at: *declared_at,
                });
            }
        }
        if self.package_names.contains(name) {
            return Some(Symbol::PackageLevel {
                name: name.to_string(),
            });
        }
        self.file_scope
            .get(name)
            .map(|path| Symbol::PackageName { path: path.clone() })
    }

    fn declare(&mut self, ident: Node<'a>) {
        let name = self.parsed.str_for_node(&ident);
        if name == "_" {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ident.start_byte());
        }
    }

    /// Declare an identifier or every identifier of an expression list.
    fn declare_identifiers(&mut self, node: Node<'a>) {
        if node.kind() == "identifier" {
            self.declare(node);
            return;
        }
        for child in named_children(node) {
            if child.kind() == "identifier" {
                self.declare(child);
            }
        }
    }

    fn declare_field(&mut self, node: Node<'a>, field: &str) {
        let mut cursor = node.walk();
        let names: Vec<Node<'a>> = node.children_by_field_name(field, &mut cursor).collect();
        for name in names {
            self.declare(name);
        }
    }

    /// Declare the names of a parameter, receiver, result or type-parameter list.
    fn declare_params(&mut self, list: Node<'a>) {
        for param in named_children(list) {
            self.declare_field(param, "name");
        }
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}
