//! Trivia inspection for declaration nodes
//!
//! The parser places a declaration's leading trivia (blank lines, comments,
//! doc comments, directives and indentation) as the first children of the
//! declaration node. The helpers here read that run back out and answer the
//! questions the collector and rewriter ask of it.
//!
//! # Example
//!
//! ```rust,ignore
//! use docweave_core::cst::{parse_csharp, trivia::LeadingTrivia};
//!
//! let parsed = parse_csharp("/// <summary>Foo</summary>\nclass Foo {}");
//! let class = parsed.syntax().first_child().unwrap();
//! assert!(LeadingTrivia::of(&class).has_documentation());
//! ```

use rowan::{GreenToken, TextRange};

use super::{CsLanguage, CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

/// A single trivia token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaToken {
    /// The kind of trivia
    pub kind: CsSyntaxKind,
    /// The text content
    pub text: String,
    /// Position in the source the token was read from
    pub range: TextRange,
}

impl TriviaToken {
    pub fn from_token(token: &CsSyntaxToken) -> Self {
        Self {
            kind: token.kind(),
            text: token.text().to_string(),
            range: token.text_range(),
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == CsSyntaxKind::Whitespace
    }

    pub fn is_newline(&self) -> bool {
        self.kind == CsSyntaxKind::Newline
    }

    pub fn is_comment(&self) -> bool {
        self.kind.is_comment()
    }

    pub fn is_doc_comment(&self) -> bool {
        self.kind.is_doc_comment()
    }
}

/// Leading trivia of a declaration node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadingTrivia {
    tokens: Vec<TriviaToken>,
    /// Whether the first token begins a line (follows a line break or opens
    /// the document)
    at_line_start: bool,
}

impl LeadingTrivia {
    /// Collect the trivia tokens that precede the first significant child
    pub fn of(node: &CsSyntaxNode) -> Self {
        let tokens: Vec<CsSyntaxToken> = node
            .children_with_tokens()
            .map_while(|element| element.into_token())
            .take_while(|token| token.kind().is_trivia())
            .collect();

        let at_line_start = match tokens.first() {
            Some(first) => follows_line_break(first),
            None => false,
        };

        Self {
            tokens: tokens.iter().map(TriviaToken::from_token).collect(),
            at_line_start,
        }
    }

    pub fn tokens(&self) -> &[TriviaToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// True iff a `///` or `/** */` comment is present
    pub fn has_documentation(&self) -> bool {
        self.tokens.iter().any(TriviaToken::is_doc_comment)
    }

    pub fn has_comments(&self) -> bool {
        self.tokens.iter().any(TriviaToken::is_comment)
    }

    /// The last whitespace fragment that begins a line
    ///
    /// This is the indentation of the line the declaration starts on when
    /// only whitespace precedes it, and the indentation of the comment line
    /// otherwise.
    pub fn line_indent(&self) -> Option<&str> {
        let mut indent = None;
        let mut line_start = self.at_line_start;
        for token in &self.tokens {
            if token.is_whitespace() && line_start {
                indent = Some(token.text.as_str());
            }
            line_start = token.is_newline();
        }
        indent
    }
}

/// Does anything other than whitespace precede `token` on its line?
pub fn starts_line(token: &CsSyntaxToken) -> bool {
    let mut current = token.prev_token();
    while let Some(prev) = current {
        match prev.kind() {
            CsSyntaxKind::Newline => return true,
            CsSyntaxKind::Whitespace => current = prev.prev_token(),
            _ => return false,
        }
    }
    true
}

/// True when `token` opens the document or directly follows a line break
fn follows_line_break(token: &CsSyntaxToken) -> bool {
    token
        .prev_token()
        .is_none_or(|prev| prev.kind() == CsSyntaxKind::Newline)
}

/// First non-trivia token inside `node`
pub fn first_significant_token(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| !token.kind().is_trivia())
}

/// Last non-trivia token inside `node`
pub fn last_significant_token(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    let mut token = node.last_token()?;
    let range = node.text_range();
    while token.kind().is_trivia() {
        token = token.prev_token()?;
        if token.text_range().start() < range.start() {
            return None;
        }
    }
    Some(token)
}

/// Newline style of a document: the first line break found, or `\n`
pub fn newline_style(root: &CsSyntaxNode) -> String {
    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == CsSyntaxKind::Newline)
        .map(|token| token.text().to_string())
        .unwrap_or_else(|| "\n".to_string())
}

/// Build a detached trivia token for splicing into a green tree
pub fn make_token(kind: CsSyntaxKind, text: &str) -> GreenToken {
    use rowan::Language;
    GreenToken::new(CsLanguage::kind_to_raw(kind), text)
}
