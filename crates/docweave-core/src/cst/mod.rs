//! Concrete Syntax Tree (CST) for C#
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! The CST preserves every byte of the source including whitespace, comments,
//! doc comments and preprocessor directives, enabling:
//! - Byte-faithful output after documentation is spliced in
//! - Stable node identity across concurrent work (byte offsets into an
//!   immutable tree)
//! - Trivia inspection without a separate comment index
//!
//! ## Architecture
//!
//! The CST uses Rowan's green/red tree pattern:
//!
//! - **Green Tree**: Immutable, position-independent storage
//!   - Stores actual source text with trivia
//!   - Cheap to clone (uses Arc internally) and `Send + Sync`
//!
//! - **Red Tree**: Dynamically constructed view with parent pointers
//!   - Created on demand for traversal
//!   - Provides offsets, parents and siblings
//!
//! ## Trivia Handling
//!
//! - **Trailing trivia**: after a significant token, everything up to and
//!   including the next line break stays with that token's node
//! - **Leading trivia**: the rest is placed as the first children of the next
//!   declaration
//!
//! This enables lossless representation: `parse(source).text() == source`
//!
//! ## Example
//!
//! ```rust,ignore
//! use docweave_core::cst::{parse_csharp, CsSyntaxKind};
//!
//! let parsed = parse_csharp("/// <summary>Foo</summary>\nclass Foo {}");
//! assert_eq!(parsed.syntax().text().to_string(), "/// <summary>Foo</summary>\nclass Foo {}");
//!
//! for token in parsed.syntax().descendants_with_tokens() {
//!     if let Some(comment) = token.as_token() {
//!         if comment.kind() == CsSyntaxKind::DocCommentLine {
//!             println!("Found doc comment: {}", comment.text());
//!         }
//!     }
//! }
//! ```

mod language;
mod lexer;
mod parser;
mod syntax_kind;

pub mod ast;
pub mod printer;
pub mod trivia;

pub use language::CsLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use parser::{ParseError, ParseOutput, line_col, parse_csharp};
pub use printer::{print, print_green};
pub use syntax_kind::CsSyntaxKind;
pub use trivia::{LeadingTrivia, TriviaToken};

/// Red tree node for C#
pub type CsSyntaxNode = rowan::SyntaxNode<CsLanguage>;
/// Red tree token for C#
pub type CsSyntaxToken = rowan::SyntaxToken<CsLanguage>;
/// Node or token
pub type CsSyntaxElement = rowan::SyntaxElement<CsLanguage>;

#[cfg(test)]
mod tests;
