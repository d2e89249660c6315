use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::parse::ast::{FileId, ParsedFile};

/// A single `import` spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoImport {
    /// Import path without quotes, e.g. `log` or `github.com/rs/zerolog`.
    pub path: String,
    /// Explicit local name (`lg "log"`), excluding `_` and `.`.
    pub alias: Option<String>,
    pub is_blank: bool,
    pub is_dot: bool,
}

impl GoImport {
    /// Build an import from an `import_spec` node.
    pub fn from_spec(parsed: &ParsedFile, spec: &Node) -> Option<Self> {
        let path_node = spec.child_by_field_name("path")?;
        let path = parsed
            .str_for_node(&path_node)
            .trim_matches('"')
            .trim_matches('`')
            .to_string();
        if path.is_empty() {
            return None;
        }

        let mut alias = None;
        let mut is_blank = false;
        let mut is_dot = false;

        if let Some(name) = spec.child_by_field_name("name") {
            match (name.kind(), parsed.str_for_node(&name)) {
                ("blank_identifier", _) | (_, "_") => is_blank = true,
                ("dot", _) | (_, ".") => is_dot = true,
                (_, text) => alias = Some(text.to_string()),
            }
        }

        Some(GoImport {
            path,
            alias,
            is_blank,
            is_dot,
        })
    }

    /// The identifier this import binds in file scope, if any.
    ///
    /// Blank and dot imports bind no name. Without an alias the package's
    /// declared name is used; `package_name` supplies it when known.
    pub fn local_name(&self, package_name: Option<&str>) -> Option<String> {
        if self.is_blank || self.is_dot {
            return None;
        }
        if let Some(alias) = &self.alias {
            return Some(alias.clone());
        }
        Some(
            package_name
                .map(str::to_string)
                .unwrap_or_else(|| default_package_name(&self.path)),
        )
    }
}

/// Best-effort package name for an import path: the last path element,
/// skipping a major-version suffix such as `/v2`.
pub fn default_package_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_version {
        if let Some(prev) = segments.next() {
            return prev.to_string();
        }
    }
    last.to_string()
}

/// A comment and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoComment {
    /// Raw comment text including the `//` or `/* */` delimiters
    pub text: String,
    /// 1-based line number of the first character
    pub line: u32,
}

/// Per-file facts the rewriter needs: package clause, imports, comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoFileSemantics {
    pub file_id: FileId,
    pub path: String,
    pub package_name: String,
    pub imports: Vec<GoImport>,
    /// Comments in source order
    pub comments: Vec<GoComment>,
}

impl GoFileSemantics {
    /// Build the semantic model from a parsed Go file.
    pub fn from_parsed(parsed: &ParsedFile) -> Self {
        let mut sem = GoFileSemantics {
            file_id: parsed.file_id,
            path: parsed.path.clone(),
            package_name: String::new(),
            imports: Vec::new(),
            comments: Vec::new(),
        };

        collect(parsed, parsed.tree.root_node(), &mut sem);
        sem
    }
}

fn collect(parsed: &ParsedFile, node: Node, sem: &mut GoFileSemantics) {
    match node.kind() {
        "package_clause" => {
            // In tree-sitter-go, package name is a package_identifier child, not a field
            let mut cursor = node.walk();
            if let Some(name) = node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "package_identifier")
            {
                sem.package_name = parsed.text_for_node(&name);
            };
        }
        "import_spec" => {
            if let Some(import) = GoImport::from_spec(parsed, &node) {
                sem.imports.push(import);
            }
        }
        "comment" => {
            sem.comments.push(GoComment {
                text: parsed.text_for_node(&node),
                line: parsed.line_of(&node),
            });
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(parsed, child, sem);
    }
}
