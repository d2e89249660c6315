//! The pre-order walk that decides what to delete.
//!
//! Two kinds of nodes can be deleted:
//!
//! - an `import_spec` of the facility's package, gated by the file-wide
//!   suppression flag (or, under [`ImportPolicy::Symmetric`], by whether any
//!   reference to the package survives). A declaration whose every spec is
//!   deleted goes as a whole.
//! - an expression statement, assignment, short variable declaration or
//!   return statement whose direct call matches, unless the comment on its
//!   first line carries the marker. The statement is removed whole.
//!
//! Only statements that sit in a statement list can be removed; `if`/`for`/
//! `switch` initialisers and labeled statements are kept. The walk never
//! prunes: children of deleted nodes are visited too, and deletions nested
//! inside another deletion are folded into it.

use log::warn;
use logdel_core::parse::ast::ParsedFile;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::config::ImportPolicy;
use crate::matcher::{CallMatcher, MatchOutcome};
use crate::suppression::SuppressionIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionKind {
    /// One spec of a grouped import.
    Import,
    /// A whole `import` declaration.
    ImportDeclaration,
    Statement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
    pub kind: DeletionKind,
    pub start_byte: usize,
    pub end_byte: usize,
    /// 1-based line of the first byte
    pub line: u32,
    pub text: String,
}

impl Deletion {
    fn of(kind: DeletionKind, parsed: &ParsedFile, node: &Node) -> Self {
        Self {
            kind,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            line: parsed.line_of(node),
            text: parsed.text_for_node(node),
        }
    }

    fn contains(&self, other: &Deletion) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }
}

/// A matched statement kept because its line carries the marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressedCall {
    pub line: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitOutcome {
    /// Sorted by position, none contained in another.
    pub deletions: Vec<Deletion>,
    pub suppressed: Vec<SuppressedCall>,
    /// Calls whose qualifier was not an identifier.
    pub skipped: usize,
    /// A facility import exists and was kept.
    pub import_retained: bool,
}

impl VisitOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.deletions.is_empty()
    }

    pub fn removed_statements(&self) -> usize {
        self.deletions
            .iter()
            .filter(|d| d.kind == DeletionKind::Statement)
            .count()
    }
}

const STATEMENT_KINDS: &[&str] = &[
    "expression_statement",
    "assignment_statement",
    "short_var_declaration",
    "return_statement",
];

const LIST_PARENTS: &[&str] = &[
    "block",
    "statement_list",
    "expression_case",
    "default_case",
    "type_case",
    "communication_case",
];

struct ImportDecl<'t> {
    decl: Node<'t>,
    spec_count: usize,
    facility_specs: Vec<Node<'t>>,
    has_dot_import: bool,
}

#[derive(Default)]
struct WalkState<'t> {
    imports: Vec<ImportDecl<'t>>,
    statements: Vec<Deletion>,
    suppressed: Vec<SuppressedCall>,
    skipped: usize,
    /// Start bytes of identifiers referring to the facility's package.
    references: Vec<usize>,
}

pub struct DeletionVisitor<'a> {
    parsed: &'a ParsedFile,
    matcher: &'a dyn CallMatcher,
    suppressions: &'a SuppressionIndex,
    package_path: &'a str,
    policy: ImportPolicy,
}

impl<'a> DeletionVisitor<'a> {
    pub fn new(
        parsed: &'a ParsedFile,
        matcher: &'a dyn CallMatcher,
        suppressions: &'a SuppressionIndex,
        package_path: &'a str,
        policy: ImportPolicy,
    ) -> Self {
        Self {
            parsed,
            matcher,
            suppressions,
            package_path,
            policy,
        }
    }

    pub fn visit(&self) -> VisitOutcome {
        let mut state = WalkState::default();
        self.walk(self.parsed.tree.root_node(), &mut state);

        let mut deletions = state.statements;
        let mut import_retained = false;
        for import in &state.imports {
            if import.facility_specs.is_empty() {
                continue;
            }
            if !self.remove_import(import, &deletions, &state.references) {
                import_retained = true;
                continue;
            }
            if import.facility_specs.len() == import.spec_count {
                deletions.push(Deletion::of(
                    DeletionKind::ImportDeclaration,
                    self.parsed,
                    &import.decl,
                ));
            } else {
                for spec in &import.facility_specs {
                    deletions.push(Deletion::of(DeletionKind::Import, self.parsed, spec));
                }
            }
        }

        VisitOutcome {
            deletions: fold_nested(deletions),
            suppressed: state.suppressed,
            skipped: state.skipped,
            import_retained,
        }
    }

    fn remove_import(&self, import: &ImportDecl, statements: &[Deletion], references: &[usize]) -> bool {
        match self.policy {
            ImportPolicy::FileFlag => !self.suppressions.file_flag(),
            ImportPolicy::Symmetric => {
                if import.has_dot_import {
                    return false;
                }
                !references
                    .iter()
                    .any(|&at| !statements.iter().any(|d| d.start_byte <= at && at < d.end_byte))
            }
        }
    }

    fn walk<'t>(&self, node: Node<'t>, state: &mut WalkState<'t>) {
        match node.kind() {
            "import_declaration" => self.collect_import(node, state),
            "selector_expression" => {
                if let Some(operand) = node.child_by_field_name("operand") {
                    if operand.kind() == "identifier"
                        && self.matcher.refers_to_facility(&operand, self.parsed)
                    {
                        state.references.push(operand.start_byte());
                    }
                }
            }
            kind if STATEMENT_KINDS.contains(&kind) => self.check_statement(node, state),
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        for child in children {
            self.walk(child, state);
        }
    }

    fn collect_import<'t>(&self, decl: Node<'t>, state: &mut WalkState<'t>) {
        let mut specs = Vec::new();
        import_specs(decl, &mut specs);

        let mut facility_specs = Vec::new();
        let mut has_dot_import = false;
        for spec in &specs {
            let is_facility = spec
                .child_by_field_name("path")
                .map(|p| unquote(self.parsed.str_for_node(&p)) == self.package_path)
                .unwrap_or(false);
            if !is_facility {
                continue;
            }
            if spec
                .child_by_field_name("name")
                .is_some_and(|n| self.parsed.str_for_node(&n) == ".")
            {
                has_dot_import = true;
            }
            facility_specs.push(*spec);
        }

        state.imports.push(ImportDecl {
            decl,
            spec_count: specs.len(),
            facility_specs,
            has_dot_import,
        });
    }

    fn check_statement<'t>(&self, stmt: Node<'t>, state: &mut WalkState<'t>) {
        if !in_statement_list(&stmt) {
            return;
        }

        let mut matched = false;
        for call in direct_calls(&stmt) {
            match self.matcher.matches(&call, self.parsed) {
                MatchOutcome::Matched => matched = true,
                MatchOutcome::Skipped => state.skipped += 1,
                MatchOutcome::NoMatch => {}
            }
        }
        if !matched {
            return;
        }

        let line = self.parsed.line_of(&stmt);
        if self.suppressions.is_line_suppressed(&self.parsed.path, line) {
            state.suppressed.push(SuppressedCall {
                line,
                text: self.parsed.text_for_node(&stmt),
            });
            return;
        }

        if stmt.kind() != "expression_statement" {
            warn!(
                "{}:{}: removing whole {} also discards its other values: {}",
                self.parsed.path,
                line,
                stmt.kind().replace('_', " "),
                self.parsed.str_for_node(&stmt)
            );
        }
        state
            .statements
            .push(Deletion::of(DeletionKind::Statement, self.parsed, &stmt));
    }
}

fn unquote(text: &str) -> &str {
    text.trim_matches('"').trim_matches('`')
}

fn import_specs<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => out.push(child),
            "import_spec_list" => import_specs(child, out),
            _ => {}
        }
    }
}

/// Whether the statement occupies a slot of a statement list.
fn in_statement_list(stmt: &Node) -> bool {
    let Some(parent) = stmt.parent() else {
        return false;
    };
    if !LIST_PARENTS.contains(&parent.kind()) {
        return false;
    }
    // `case v := <-ch:` is the clause's header, not a body statement
    parent.child_by_field_name("communication") != Some(*stmt)
}

/// Call expressions at the statement's own level.
fn direct_calls<'t>(stmt: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = stmt.walk();
    match stmt.kind() {
        "expression_statement" => stmt
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "call_expression")
            .collect(),
        "assignment_statement" | "short_var_declaration" => stmt
            .child_by_field_name("right")
            .map(|right| calls_in_list(right))
            .unwrap_or_default(),
        "return_statement" => stmt
            .named_children(&mut cursor)
            .flat_map(|c| calls_in_list(c))
            .collect(),
        _ => Vec::new(),
    }
}

fn calls_in_list<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    if node.kind() == "call_expression" {
        return vec![node];
    }
    if node.kind() != "expression_list" {
        return Vec::new();
    }
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() == "call_expression")
        .collect()
}

/// Sort by position and drop deletions contained in an earlier one.
fn fold_nested(mut deletions: Vec<Deletion>) -> Vec<Deletion> {
    deletions.sort_by_key(|d| (d.start_byte, std::cmp::Reverse(d.end_byte)));
    let mut folded: Vec<Deletion> = Vec::with_capacity(deletions.len());
    for deletion in deletions {
        if folded.last().is_some_and(|outer| outer.contains(&deletion)) {
            continue;
        }
        folded.push(deletion);
    }
    folded
}
