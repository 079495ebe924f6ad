//! Undocumented declaration discovery
//!
//! Walks the tree in document order and reports every type and method
//! declaration whose leading trivia carries no doc comment. Only declaration
//! containers (the compilation unit, namespaces, and class/struct/interface/
//! record bodies) are descended into; method bodies, expression bodies,
//! fields, properties and enum member lists are never entered.

use std::fmt;

use rowan::TextRange;
use serde::Serialize;

use crate::cst::trivia::{self, LeadingTrivia};
use crate::cst::{CsSyntaxKind, CsSyntaxNode};
use crate::semantic::SemanticModel;

/// Stable identity of a declaration
///
/// The byte offset of the declaration's first significant token in the
/// original tree. It stays valid for as long as the original tree is
/// retained, which is the whole run: the tree is never mutated and the
/// rewriter reads offsets from the original nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocId(u32);

impl DocId {
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Identity of `node`, or `None` for a node with no significant token
    pub fn of(node: &CsSyntaxNode) -> Option<Self> {
        trivia::first_significant_token(node).map(|t| Self(t.text_range().start().into()))
    }

    pub const fn offset(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Kind of declaration that can receive documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
    Method,
}

impl DeclKind {
    /// Targeted kind for a syntax kind, if it is one
    pub fn from_syntax(kind: CsSyntaxKind) -> Option<Self> {
        match kind {
            CsSyntaxKind::ClassDecl => Some(Self::Class),
            CsSyntaxKind::StructDecl => Some(Self::Struct),
            CsSyntaxKind::InterfaceDecl => Some(Self::Interface),
            CsSyntaxKind::EnumDecl => Some(Self::Enum),
            CsSyntaxKind::RecordDecl => Some(Self::Record),
            CsSyntaxKind::MethodDecl => Some(Self::Method),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Record => "record",
            Self::Method => "method",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An undocumented declaration found in the tree
#[derive(Debug, Clone)]
pub struct DocTarget {
    pub id: DocId,
    pub kind: DeclKind,
    pub node: CsSyntaxNode,
}

impl DocTarget {
    /// Source text from the first to the last significant token
    ///
    /// Leading trivia (indentation, comments, blank lines) and trailing
    /// trivia are excluded.
    pub fn snippet(&self) -> String {
        let (Some(first), Some(last)) = (
            trivia::first_significant_token(&self.node),
            trivia::last_significant_token(&self.node),
        ) else {
            return String::new();
        };
        let range = TextRange::new(first.text_range().start(), last.text_range().end());

        self.node
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| range.contains_range(t.text_range()))
            .map(|t| t.text().to_string())
            .collect()
    }

    /// Owned, thread-safe description of this target for the generator
    pub fn to_request(&self, model: &SemanticModel) -> DocRequest {
        DocRequest {
            id: self.id,
            kind: self.kind,
            name: model.name_or_unknown(&self.node),
            snippet: self.snippet(),
        }
    }
}

/// What the generation service needs to know about one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocRequest {
    pub id: DocId,
    pub kind: DeclKind,
    /// Fully-qualified name, or `Unknown`
    pub name: String,
    pub snippet: String,
}

/// Collects undocumented declarations
#[derive(Debug, Default)]
pub struct TargetCollector;

impl TargetCollector {
    pub fn new() -> Self {
        Self
    }

    /// Every undocumented target, in document order
    pub fn collect(&self, root: &CsSyntaxNode) -> Vec<DocTarget> {
        let mut targets = Vec::new();
        self.visit(root, &mut targets);
        tracing::debug!(count = targets.len(), "Collected undocumented declarations");
        targets
    }

    fn visit(&self, container: &CsSyntaxNode, targets: &mut Vec<DocTarget>) {
        for child in container.children() {
            if let Some(kind) = DeclKind::from_syntax(child.kind()) {
                let documented = LeadingTrivia::of(&child).has_documentation();
                match DocId::of(&child) {
                    Some(id) if !documented => targets.push(DocTarget {
                        id,
                        kind,
                        node: child.clone(),
                    }),
                    Some(_) => {}
                    None => tracing::debug!(kind = %kind, "Skipping declaration without tokens"),
                }
            }

            if child.kind().is_declaration_container() {
                self.visit(&child, targets);
            }
        }
    }
}

/// Convenience: collect targets and turn them into owned requests
pub fn collect_requests(root: &CsSyntaxNode) -> Vec<DocRequest> {
    let model = SemanticModel::new();
    TargetCollector::new()
        .collect(root)
        .iter()
        .map(|target| target.to_request(&model))
        .collect()
}
