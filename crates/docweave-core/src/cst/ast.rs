//! Typed AST layer over the CST
//!
//! Thin wrappers that give names to the parts of a declaration the semantic
//! layer needs: names, type parameters and parameter types.
//!
//! # Example
//!
//! ```ignore
//! use docweave_core::cst::{parse_csharp, ast::{AstNode, TypeDeclaration}};
//!
//! let parsed = parse_csharp("class Foo<T> {}");
//! let class = TypeDeclaration::cast(parsed.syntax().first_child().unwrap()).unwrap();
//! assert_eq!(class.name().unwrap(), "Foo");
//! assert_eq!(class.type_parameters(), vec!["T"]);
//! ```

use super::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: CsSyntaxKind) -> bool;
    fn cast(node: CsSyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &CsSyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            syntax: CsSyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: CsSyntaxKind) -> bool {
                matches!(kind, $(CsSyntaxKind::$kind)|+)
            }

            fn cast(node: CsSyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &CsSyntaxNode {
                &self.syntax
            }
        }
    };
}

/// Helper function to find first child of a specific kind
fn child_of_kind(parent: &CsSyntaxNode, kind: CsSyntaxKind) -> Option<CsSyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

/// Helper function to find first direct token of a specific kind
fn token_of_kind(parent: &CsSyntaxNode, kind: CsSyntaxKind) -> Option<CsSyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Significant tokens of a node, in order
fn significant_tokens(node: &CsSyntaxNode) -> impl Iterator<Item = CsSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
}

/// Ident tokens directly before the given child node kind, skipping trivia
fn ident_before(parent: &CsSyntaxNode, kinds: &[CsSyntaxKind]) -> Option<CsSyntaxToken> {
    let mut last_ident = None;
    for element in parent.children_with_tokens() {
        match element {
            rowan::NodeOrToken::Node(node) if kinds.contains(&node.kind()) => return last_ident,
            rowan::NodeOrToken::Node(_) => last_ident = None,
            rowan::NodeOrToken::Token(token) if token.kind().is_trivia() => {}
            rowan::NodeOrToken::Token(token) if token.kind() == CsSyntaxKind::Ident => {
                last_ident = Some(token)
            }
            rowan::NodeOrToken::Token(_) => last_ident = None,
        }
    }
    None
}

/// Render type tokens compactly: words separated by one space, a space after
/// each comma, nothing else
pub fn join_type_tokens<'a>(texts: impl IntoIterator<Item = (CsSyntaxKind, &'a str)>) -> String {
    let mut out = String::new();
    let mut prev_word = false;
    for (kind, text) in texts {
        let word = is_word(kind);
        if word && prev_word {
            out.push(' ');
        }
        out.push_str(text);
        if kind == CsSyntaxKind::Comma {
            out.push(' ');
        }
        prev_word = word;
    }
    out
}

fn is_word(kind: CsSyntaxKind) -> bool {
    kind == CsSyntaxKind::Ident || kind == CsSyntaxKind::Number || kind.is_keyword()
}

// ============================================================================
// Compilation unit and namespaces
// ============================================================================

ast_node!(
    /// Root of a parsed document
    CompilationUnit,
    CompilationUnit
);

impl CompilationUnit {
    pub fn namespaces(&self) -> impl Iterator<Item = NamespaceDeclaration> {
        self.syntax.children().filter_map(NamespaceDeclaration::cast)
    }

    pub fn types(&self) -> impl Iterator<Item = TypeDeclaration> {
        self.syntax.children().filter_map(TypeDeclaration::cast)
    }
}

ast_node!(
    /// `namespace A.B { ... }` or `namespace A.B;`
    NamespaceDeclaration,
    NamespaceDecl
);

impl NamespaceDeclaration {
    /// Dotted namespace name
    pub fn name(&self) -> Option<String> {
        let mut name = String::new();
        let mut after_keyword = false;
        for element in self.syntax.children_with_tokens() {
            let Some(token) = element.into_token() else {
                break;
            };
            match token.kind() {
                CsSyntaxKind::NamespaceKw => after_keyword = true,
                CsSyntaxKind::Ident | CsSyntaxKind::Dot if after_keyword => {
                    name.push_str(token.text())
                }
                kind if kind.is_trivia() => {}
                _ if after_keyword => break,
                _ => {}
            }
        }
        (!name.is_empty()).then_some(name)
    }

    pub fn is_file_scoped(&self) -> bool {
        child_of_kind(&self.syntax, CsSyntaxKind::DeclarationBody).is_none()
    }

    pub fn body(&self) -> Option<DeclarationBody> {
        child_of_kind(&self.syntax, CsSyntaxKind::DeclarationBody).and_then(DeclarationBody::cast)
    }
}

ast_node!(
    /// `{ ... }` member list of a type or namespace
    DeclarationBody,
    DeclarationBody
);

impl DeclarationBody {
    pub fn types(&self) -> impl Iterator<Item = TypeDeclaration> {
        self.syntax.children().filter_map(TypeDeclaration::cast)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDeclaration> {
        self.syntax.children().filter_map(MethodDeclaration::cast)
    }
}

// ============================================================================
// Types
// ============================================================================

ast_node!(
    /// Class, struct, interface, enum or record declaration
    TypeDeclaration,
    ClassDecl | StructDecl | InterfaceDecl | EnumDecl | RecordDecl
);

impl TypeDeclaration {
    pub fn kind(&self) -> CsSyntaxKind {
        self.syntax.kind()
    }

    /// Declared name (first identifier after the type keyword)
    pub fn name(&self) -> Option<String> {
        token_of_kind(&self.syntax, CsSyntaxKind::Ident).map(|t| t.text().to_string())
    }

    pub fn type_parameters(&self) -> Vec<String> {
        child_of_kind(&self.syntax, CsSyntaxKind::TypeParameterList)
            .and_then(TypeParameterList::cast)
            .map(|list| list.names())
            .unwrap_or_default()
    }

    /// Name with type parameters, e.g. `Repository<T>`
    pub fn display_name(&self) -> Option<String> {
        let name = self.name()?;
        let params = self.type_parameters();
        if params.is_empty() {
            Some(name)
        } else {
            Some(format!("{name}<{}>", params.join(", ")))
        }
    }

    pub fn body(&self) -> Option<DeclarationBody> {
        child_of_kind(&self.syntax, CsSyntaxKind::DeclarationBody).and_then(DeclarationBody::cast)
    }

    pub fn attributes(&self) -> impl Iterator<Item = CsSyntaxNode> {
        self.syntax
            .children()
            .filter(|n| n.kind() == CsSyntaxKind::AttributeList)
    }
}

ast_node!(
    /// `<T, U>` on a type or method name
    TypeParameterList,
    TypeParameterList
);

impl TypeParameterList {
    /// Parameter names, with variance annotations dropped
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut current: Option<String> = None;
        for token in significant_tokens(&self.syntax) {
            match token.kind() {
                CsSyntaxKind::Ident => current = Some(token.text().to_string()),
                CsSyntaxKind::Comma | CsSyntaxKind::Gt => names.extend(current.take()),
                _ => {}
            }
        }
        names
    }
}

// ============================================================================
// Methods
// ============================================================================

ast_node!(
    /// Method or constructor declaration
    MethodDeclaration,
    MethodDecl | ConstructorDecl
);

impl MethodDeclaration {
    pub fn is_constructor(&self) -> bool {
        self.syntax.kind() == CsSyntaxKind::ConstructorDecl
    }

    /// Identifier directly before the type parameters or parameter list
    pub fn name(&self) -> Option<String> {
        ident_before(
            &self.syntax,
            &[CsSyntaxKind::TypeParameterList, CsSyntaxKind::ParameterList],
        )
        .map(|t| t.text().to_string())
    }

    pub fn type_parameters(&self) -> Vec<String> {
        child_of_kind(&self.syntax, CsSyntaxKind::TypeParameterList)
            .and_then(TypeParameterList::cast)
            .map(|list| list.names())
            .unwrap_or_default()
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        child_of_kind(&self.syntax, CsSyntaxKind::ParameterList).and_then(ParameterList::cast)
    }

    /// `true` for `=> expr;` bodies
    pub fn has_expression_body(&self) -> bool {
        child_of_kind(&self.syntax, CsSyntaxKind::ExpressionBody).is_some()
    }
}

ast_node!(
    /// `(...)` parameter list of a method, constructor or record
    ParameterList,
    ParameterList
);

/// One parameter split out of a parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Type as written, including `ref`/`out`/`params` style modifiers
    pub type_text: String,
    pub name: Option<String>,
}

impl ParameterList {
    pub fn parameters(&self) -> Vec<Parameter> {
        let tokens: Vec<CsSyntaxToken> = significant_tokens(&self.syntax).collect();
        // Drop the surrounding parentheses
        let inner = match tokens.as_slice() {
            [first, inner @ .., last]
                if first.kind() == CsSyntaxKind::LParen && last.kind() == CsSyntaxKind::RParen =>
            {
                inner
            }
            other => other,
        };

        let mut parameters = Vec::new();
        let mut depth = 0usize;
        let mut segment: Vec<&CsSyntaxToken> = Vec::new();
        for token in inner {
            match token.kind() {
                CsSyntaxKind::LParen | CsSyntaxKind::LBracket | CsSyntaxKind::Lt | CsSyntaxKind::LBrace => {
                    depth += 1
                }
                CsSyntaxKind::RParen | CsSyntaxKind::RBracket | CsSyntaxKind::Gt | CsSyntaxKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                CsSyntaxKind::Comma if depth == 0 => {
                    parameters.extend(Parameter::from_tokens(&segment));
                    segment.clear();
                    continue;
                }
                _ => {}
            }
            segment.push(token);
        }
        parameters.extend(Parameter::from_tokens(&segment));
        parameters
    }

    /// Parameter types only
    pub fn types(&self) -> Vec<String> {
        self.parameters().into_iter().map(|p| p.type_text).collect()
    }
}

impl Parameter {
    fn from_tokens(tokens: &[&CsSyntaxToken]) -> Option<Self> {
        // Leading attribute sections
        let mut start = 0;
        while tokens.get(start).is_some_and(|t| t.kind() == CsSyntaxKind::LBracket) {
            let mut depth = 0usize;
            while let Some(token) = tokens.get(start) {
                start += 1;
                match token.kind() {
                    CsSyntaxKind::LBracket => depth += 1,
                    CsSyntaxKind::RBracket => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }

        // Default value
        let mut end = tokens.len();
        let mut depth = 0usize;
        for (idx, token) in tokens.iter().enumerate().skip(start) {
            match token.kind() {
                CsSyntaxKind::LParen | CsSyntaxKind::LBracket | CsSyntaxKind::Lt => depth += 1,
                CsSyntaxKind::RParen | CsSyntaxKind::RBracket | CsSyntaxKind::Gt => {
                    depth = depth.saturating_sub(1)
                }
                CsSyntaxKind::Equals if depth == 0 => {
                    end = idx;
                    break;
                }
                _ => {}
            }
        }

        let declared = tokens.get(start..end)?;
        if declared.is_empty() {
            return None;
        }

        // `__arglist` and lambda-style untyped parameters have a single token
        let (type_tokens, name) = match declared.split_last() {
            Some((last, rest)) if last.kind() == CsSyntaxKind::Ident && !rest.is_empty() => {
                (rest, Some(last.text().to_string()))
            }
            _ => (declared, None),
        };

        Some(Self {
            type_text: join_type_tokens(type_tokens.iter().map(|t| (t.kind(), t.text()))),
            name,
        })
    }
}
