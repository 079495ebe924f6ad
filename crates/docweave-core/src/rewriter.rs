//! Documentation rewriter
//!
//! Rebuilds the green tree bottom-up, splicing `///` trivia into the leading
//! trivia of every declaration that has an entry in the [`RewriteMap`].
//! Subtrees without entries are reused as-is, so everything outside the
//! inserted trivia prints exactly as it was parsed.
//!
//! Placement rules:
//!
//! - The inserted lines take the indentation of the line the declaration
//!   starts on. A declaration sharing its line with earlier code is moved
//!   onto a fresh line. That line copies the indentation of the line its
//!   leading trivia starts on, or gets the configured default indent when
//!   the line began before the declaration.
//! - With [`TriviaPlacement::AfterExisting`] the block sits directly above
//!   the declaration, below any existing comments. With
//!   [`TriviaPlacement::BeforeExisting`] it goes above existing comments and
//!   blank lines.
//! - Line breaks use the document's own newline style.

use std::collections::BTreeSet;

use rowan::{GreenNode, GreenToken, NodeOrToken};
use serde::{Deserialize, Serialize};

use crate::collector::{DeclKind, DocId};
use crate::coordinator::{GeneratedDoc, RewriteMap};
use crate::cst::trivia::{self, LeadingTrivia};
use crate::cst::{CsSyntaxKind, CsSyntaxNode, print_green};
use crate::error::DocweaveError;
use crate::result::Result;

/// Indentation used when a declaration's own line gives no hint
pub const DEFAULT_INDENT: &str = "    ";

type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Where generated lines go relative to existing leading comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriviaPlacement {
    /// Between existing comments and the declaration
    #[default]
    AfterExisting,
    /// Above existing comments and blank lines
    BeforeExisting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    pub placement: TriviaPlacement,
    pub default_indent: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            placement: TriviaPlacement::default(),
            default_indent: DEFAULT_INDENT.to_string(),
        }
    }
}

/// A rewritten tree
#[derive(Debug, Clone)]
pub struct RewriteResult {
    pub green: GreenNode,
    /// Number of declarations that received documentation
    pub applied: usize,
}

impl RewriteResult {
    pub fn text(&self) -> String {
        print_green(&self.green)
    }

    pub fn syntax(&self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.green.clone())
    }
}

struct RewriteContext {
    newline: String,
    applied: BTreeSet<DocId>,
}

/// Applies a [`RewriteMap`] to the tree it was built from
pub struct TreeRewriter<'a> {
    map: &'a RewriteMap,
    options: RewriteOptions,
}

impl<'a> TreeRewriter<'a> {
    pub fn new(map: &'a RewriteMap, options: RewriteOptions) -> Self {
        Self { map, options }
    }

    /// Produce the documented tree
    ///
    /// Fails with [`DocweaveError::RewriteInconsistency`] when an entry's id
    /// matches no declaration in `root`; nothing is returned in that case.
    pub fn rewrite(&self, root: &CsSyntaxNode) -> Result<RewriteResult> {
        if self.map.is_empty() {
            return Ok(RewriteResult {
                green: root.green().into_owned(),
                applied: 0,
            });
        }

        let mut cx = RewriteContext {
            newline: trivia::newline_style(root),
            applied: BTreeSet::new(),
        };
        let green = self
            .rebuild(root, &mut cx)
            .unwrap_or_else(|| root.green().into_owned());

        let missing: Vec<u32> = self
            .map
            .ids()
            .filter(|id| !cx.applied.contains(id))
            .map(DocId::offset)
            .collect();
        if !missing.is_empty() {
            return Err(DocweaveError::RewriteInconsistency { missing });
        }

        tracing::debug!(applied = cx.applied.len(), "Rewrote tree");
        Ok(RewriteResult {
            green,
            applied: cx.applied.len(),
        })
    }

    /// Rebuilt green node for `node`, or `None` when nothing below it changed
    fn rebuild(&self, node: &CsSyntaxNode, cx: &mut RewriteContext) -> Option<GreenNode> {
        let mut changed = false;
        let mut children: Vec<GreenElement> = Vec::new();

        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Token(token) => {
                    children.push(NodeOrToken::Token(token.green().to_owned()));
                }
                NodeOrToken::Node(child) => {
                    let rebuilt = if may_hold_targets(&child) {
                        self.rebuild(&child, cx)
                    } else {
                        None
                    };
                    match rebuilt {
                        Some(green) => {
                            changed = true;
                            children.push(NodeOrToken::Node(green));
                        }
                        None => children.push(NodeOrToken::Node(child.green().into_owned())),
                    }
                }
            }
        }

        if let Some(doc) = self.entry_for(node) {
            let (at, inserted) = self.doc_trivia(node, doc, &cx.newline);
            children.splice(at..at, inserted);
            cx.applied.insert(doc.id);
            changed = true;
        }

        changed.then(|| GreenNode::new(node.kind().into(), children))
    }

    fn entry_for(&self, node: &CsSyntaxNode) -> Option<&'a GeneratedDoc> {
        DeclKind::from_syntax(node.kind())?;
        self.map.get(DocId::of(node)?)
    }

    /// Trivia to insert and the child index to insert it at
    fn doc_trivia(
        &self,
        node: &CsSyntaxNode,
        doc: &GeneratedDoc,
        newline: &str,
    ) -> (usize, Vec<GreenElement>) {
        let leading = LeadingTrivia::of(node);
        let first = trivia::first_significant_token(node);
        let starts_line = first.as_ref().is_some_and(trivia::starts_line);

        let indent = if starts_line {
            first
                .as_ref()
                .and_then(|token| token.prev_token())
                .filter(|prev| prev.kind() == CsSyntaxKind::Whitespace)
                .map(|prev| prev.text().to_string())
                .unwrap_or_default()
        } else if leading.at_line_start() {
            leading.line_indent().unwrap_or_default().to_string()
        } else {
            self.options.default_indent.clone()
        };

        let lines = doc_lines(&doc.text);
        let mut out = Vec::with_capacity(lines.len() * 3 + 2);
        let push_indent = |out: &mut Vec<GreenElement>| {
            if !indent.is_empty() {
                out.push(trivia_element(CsSyntaxKind::Whitespace, &indent));
            }
        };

        let above_comments = self.options.placement == TriviaPlacement::BeforeExisting
            && !leading.is_empty()
            && leading.at_line_start()
            && starts_line;

        if above_comments {
            for line in &lines {
                push_indent(&mut out);
                out.push(trivia_element(CsSyntaxKind::DocCommentLine, line));
                out.push(trivia_element(CsSyntaxKind::Newline, newline));
            }
            return (0, out);
        }

        if !starts_line {
            out.push(trivia_element(CsSyntaxKind::Newline, newline));
            push_indent(&mut out);
        }
        for line in &lines {
            out.push(trivia_element(CsSyntaxKind::DocCommentLine, line));
            out.push(trivia_element(CsSyntaxKind::Newline, newline));
            push_indent(&mut out);
        }
        (leading.len(), out)
    }
}

/// Only containers and declarations themselves can carry entries
fn may_hold_targets(node: &CsSyntaxNode) -> bool {
    node.kind().is_declaration_container() || DeclKind::from_syntax(node.kind()).is_some()
}

fn trivia_element(kind: CsSyntaxKind, text: &str) -> GreenElement {
    NodeOrToken::Token(trivia::make_token(kind, text))
}

/// Normalize generated text into `///` comment lines
///
/// Blank lines are dropped and surrounding whitespace is trimmed. Lines that
/// already start with `///` are kept, everything else gets the prefix.
pub fn doc_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.starts_with("///") && !line.starts_with("////") {
                line.to_string()
            } else {
                format!("/// {line}")
            }
        })
        .collect()
}
