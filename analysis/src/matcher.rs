//! Deciding whether a call expression calls the logging facility.
//!
//! Two strategies share the [`CallMatcher`] trait:
//!
//! - [`SymbolMatcher`] compares the resolved identity of the callee against
//!   the [`TargetSymbolSet`]. Aliased imports match, locals named `log`
//!   don't.
//! - [`NameMatcher`] compares the qualifier's text against the package
//!   name. It needs no resolution but cannot see aliases, and a local
//!   variable named like the package is a false positive.

use log::{debug, info};
use logdel_core::parse::ast::ParsedFile;
use logdel_core::semantics::go::{Symbol, TypeInfo};
use tree_sitter::Node;

use crate::resolve::TargetSymbolSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    NoMatch,
    /// The callee is a selector on something other than an identifier,
    /// e.g. `a.b.Println()` or `f().Println()`.
    Skipped,
}

pub trait CallMatcher: Send + Sync {
    /// Classify a `call_expression` node.
    fn matches(&self, call: &Node, parsed: &ParsedFile) -> MatchOutcome;

    /// Whether an identifier names the facility's package.
    fn refers_to_facility(&self, ident: &Node, parsed: &ParsedFile) -> bool;

    fn name(&self) -> &'static str;
}

/// `qualifier.member` parts of a call's callee.
enum Callee<'tree> {
    Qualified {
        qualifier: Node<'tree>,
        member: Node<'tree>,
    },
    NonIdentifierQualifier,
    Other,
}

fn split_callee<'tree>(call: &Node<'tree>) -> Callee<'tree> {
    let Some(function) = call.child_by_field_name("function") else {
        return Callee::Other;
    };
    if function.kind() != "selector_expression" {
        return Callee::Other;
    }
    match (
        function.child_by_field_name("operand"),
        function.child_by_field_name("field"),
    ) {
        (Some(qualifier), Some(member)) if qualifier.kind() == "identifier" => {
            Callee::Qualified { qualifier, member }
        }
        (Some(_), Some(_)) => Callee::NonIdentifierQualifier,
        _ => Callee::Other,
    }
}

fn log_match(call: &Node, parsed: &ParsedFile, matcher: &str) {
    let loc = parsed.location_for_node(call);
    let callee = call
        .child_by_field_name("function")
        .map(|f| parsed.str_for_node(&f))
        .unwrap_or_default();
    info!(
        "{}:{}:{}: {} call matched by {}",
        parsed.path,
        loc.line(),
        loc.column(),
        callee,
        matcher
    );
}

fn log_skip(call: &Node, parsed: &ParsedFile) {
    let loc = parsed.location_for_node(call);
    debug!(
        "{}:{}:{}: skipping call with non-identifier qualifier",
        parsed.path,
        loc.line(),
        loc.column()
    );
}

/// Identity-based matching against resolved symbols.
pub struct SymbolMatcher<'a> {
    info: &'a TypeInfo,
    targets: &'a TargetSymbolSet,
    package_path: String,
}

impl<'a> SymbolMatcher<'a> {
    pub fn new(info: &'a TypeInfo, targets: &'a TargetSymbolSet, package_path: &str) -> Self {
        Self {
            info,
            targets,
            package_path: package_path.to_string(),
        }
    }
}

impl CallMatcher for SymbolMatcher<'_> {
    fn matches(&self, call: &Node, parsed: &ParsedFile) -> MatchOutcome {
        match split_callee(call) {
            Callee::Qualified { member, .. } => {
                let matched = self
                    .info
                    .symbol_of(parsed.file_id, &member)
                    .is_some_and(|symbol| self.targets.contains(symbol));
                if matched {
                    log_match(call, parsed, self.name());
                    MatchOutcome::Matched
                } else {
                    MatchOutcome::NoMatch
                }
            }
            Callee::NonIdentifierQualifier => {
                log_skip(call, parsed);
                MatchOutcome::Skipped
            }
            Callee::Other => MatchOutcome::NoMatch,
        }
    }

    fn refers_to_facility(&self, ident: &Node, parsed: &ParsedFile) -> bool {
        matches!(
            self.info.symbol_of(parsed.file_id, ident),
            Some(Symbol::PackageName { path }) if *path == self.package_path
        )
    }

    fn name(&self) -> &'static str {
        "symbol"
    }
}

/// Text-based matching on the qualifier identifier.
pub struct NameMatcher {
    package_name: String,
}

impl NameMatcher {
    pub fn new(package_name: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
        }
    }
}

impl CallMatcher for NameMatcher {
    fn matches(&self, call: &Node, parsed: &ParsedFile) -> MatchOutcome {
        match split_callee(call) {
            Callee::Qualified { qualifier, .. } => {
                if parsed.str_for_node(&qualifier) == self.package_name {
                    log_match(call, parsed, self.name());
                    MatchOutcome::Matched
                } else {
                    MatchOutcome::NoMatch
                }
            }
            Callee::NonIdentifierQualifier => {
                log_skip(call, parsed);
                MatchOutcome::Skipped
            }
            Callee::Other => MatchOutcome::NoMatch,
        }
    }

    fn refers_to_facility(&self, ident: &Node, parsed: &ParsedFile) -> bool {
        parsed.str_for_node(ident) == self.package_name
    }

    fn name(&self) -> &'static str {
        "name"
    }
}
