//! Declaration-level parser for C#
//!
//! Builds a Rowan green tree from the lexer's token stream. The parser only
//! gives structure to what the documentation pipeline cares about:
//! namespaces, type declarations, member declarations and their headers.
//! Method bodies, expression bodies, accessor lists and enum member lists are
//! kept as opaque balanced token groups.
//!
//! # Trivia attachment
//!
//! After each significant token the parser consumes trailing trivia (spaces
//! and comments) up to and including the first line break. Everything after
//! that, up to the next significant token, becomes *leading* trivia of the
//! next declaration and is placed as that declaration's first children. This
//! is what lets the collector ask "does this declaration carry a doc comment?"
//! by looking only at the node itself.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, Language};

use super::lexer::{CstSpan, CstToken, LexerError, lex_with_trivia};
use super::{CsLanguage, CsSyntaxKind, CsSyntaxNode};

/// A lexical or structural error found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: CstSpan,
    /// 1-based line of the span start
    pub line: usize,
    /// 1-based column (in characters) of the span start
    pub column: usize,
}

impl ParseError {
    fn at(source: &str, message: impl Into<String>, span: CstSpan) -> Self {
        let (line, column) = line_col(source, span.start);
        Self {
            message: message.into(),
            span,
            line,
            column,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Convert a byte offset to a 1-based line/column pair
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Result of parsing a document
///
/// The green tree is always complete and always round-trips to the input,
/// even when `errors` is non-empty.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl ParseOutput {
    /// Red view of the tree
    pub fn syntax(&self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.green.clone())
    }

    /// Immutable green tree (cheap to clone, `Send + Sync`)
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_parts(self) -> (GreenNode, Vec<ParseError>) {
        (self.green, self.errors)
    }
}

/// Parse C# source into a lossless CST
///
/// # Example
///
/// ```rust,ignore
/// use docweave_core::cst::parse_csharp;
///
/// let source = "class Foo {\n    void Bar() {}\n}\n";
/// let parsed = parse_csharp(source);
/// assert!(!parsed.has_errors());
/// assert_eq!(parsed.syntax().text().to_string(), source);
/// ```
pub fn parse_csharp(source: &str) -> ParseOutput {
    let (tokens, lexer_errors) = lex_with_trivia(source);

    let mut parser = Parser::new(&tokens);
    parser.parse_compilation_unit();
    let (green, structural) = parser.finish();

    let errors: Vec<ParseError> = lexer_errors
        .into_iter()
        .chain(structural)
        .map(|LexerError { message, span }| ParseError::at(source, message, span))
        .collect();

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "Parse produced errors");
    }

    ParseOutput { green, errors }
}

/// How a member declaration was classified by lookahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MemberShape {
    kind: CsSyntaxKind,
    /// Token index of the parameter list `(` for methods and constructors
    paren: Option<usize>,
    /// Token index of the method's type parameter `<`
    type_params: Option<usize>,
    /// `[assembly: ...]` style section that stands alone
    standalone_attribute: bool,
}

impl MemberShape {
    fn simple(kind: CsSyntaxKind) -> Self {
        Self {
            kind,
            paren: None,
            type_params: None,
            standalone_attribute: false,
        }
    }
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<LexerError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> (GreenNode, Vec<LexerError>) {
        (self.builder.finish(), self.errors)
    }

    fn parse_compilation_unit(&mut self) {
        self.builder.start_node(CsLanguage::kind_to_raw(CsSyntaxKind::CompilationUnit));
        self.parse_members(false);
        self.builder.finish_node();
    }

    /// Parse a run of member declarations
    ///
    /// With `closing` set, stops before the `}` that ends the enclosing body.
    fn parse_members(&mut self, closing: bool) {
        loop {
            let checkpoint = self.builder.checkpoint();
            self.consume_trivia();

            match self.current_kind() {
                None => break,
                Some(CsSyntaxKind::RBrace) if closing => break,
                Some(
                    kind @ (CsSyntaxKind::RBrace | CsSyntaxKind::RParen | CsSyntaxKind::RBracket),
                ) => {
                    self.error_here(format!("Unexpected {kind} at declaration level"));
                    self.start_node_at(checkpoint, CsSyntaxKind::Error);
                    self.bump();
                    self.builder.finish_node();
                }
                Some(CsSyntaxKind::Semicolon) => {
                    self.start_node_at(checkpoint, CsSyntaxKind::MemberDecl);
                    self.bump();
                    self.builder.finish_node();
                }
                Some(_) => self.parse_member(checkpoint),
            }
        }
    }

    fn parse_member(&mut self, checkpoint: Checkpoint) {
        let shape = self.classify_member();

        match shape.kind {
            CsSyntaxKind::NamespaceDecl => self.parse_namespace(checkpoint),
            CsSyntaxKind::UsingDirective => self.parse_using(checkpoint),
            CsSyntaxKind::ClassDecl
            | CsSyntaxKind::StructDecl
            | CsSyntaxKind::InterfaceDecl
            | CsSyntaxKind::EnumDecl
            | CsSyntaxKind::RecordDecl => self.parse_type_declaration(checkpoint, shape.kind),
            CsSyntaxKind::MethodDecl | CsSyntaxKind::ConstructorDecl => {
                self.parse_method(checkpoint, shape)
            }
            _ if shape.standalone_attribute => {
                self.start_node_at(checkpoint, CsSyntaxKind::MemberDecl);
                self.parse_balanced_node(
                    CsSyntaxKind::AttributeList,
                    CsSyntaxKind::LBracket,
                    CsSyntaxKind::RBracket,
                );
                self.builder.finish_node();
            }
            _ => self.parse_member_declaration(checkpoint),
        }
    }

    /// Parse `namespace A.B { ... }` or file-scoped `namespace A.B;`
    fn parse_namespace(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, CsSyntaxKind::NamespaceDecl);
        self.parse_prefix();
        self.bump(); // namespace

        loop {
            self.consume_trivia();
            match self.current_kind() {
                None | Some(CsSyntaxKind::RBrace) => break,
                Some(CsSyntaxKind::LBrace) => {
                    self.parse_declaration_body();
                    break;
                }
                Some(CsSyntaxKind::Semicolon) => {
                    self.bump();
                    // File-scoped: the rest of the document belongs to it
                    self.parse_members(false);
                    break;
                }
                Some(_) => self.bump(),
            }
        }

        self.builder.finish_node(); // NAMESPACE_DECL
    }

    fn parse_using(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, CsSyntaxKind::UsingDirective);

        loop {
            self.consume_trivia();
            match self.current_kind() {
                None | Some(CsSyntaxKind::RBrace) => break,
                Some(CsSyntaxKind::Semicolon) => {
                    self.bump();
                    break;
                }
                Some(CsSyntaxKind::LBrace) => {
                    self.bump_balanced(CsSyntaxKind::LBrace, CsSyntaxKind::RBrace);
                    break;
                }
                Some(CsSyntaxKind::LParen) => {
                    self.bump_balanced(CsSyntaxKind::LParen, CsSyntaxKind::RParen)
                }
                Some(_) => self.bump(),
            }
        }

        self.builder.finish_node(); // USING_DIRECTIVE
    }

    /// Parse a class, struct, interface, enum or record declaration
    fn parse_type_declaration(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.start_node_at(checkpoint, kind);
        self.parse_prefix();

        if self.at(CsSyntaxKind::RecordKw) {
            self.bump();
            self.consume_trivia();
            if self.at(CsSyntaxKind::ClassKw) || self.at(CsSyntaxKind::StructKw) {
                self.bump();
            }
        } else {
            self.bump(); // class / struct / interface / enum
        }

        self.consume_trivia();
        if self.at(CsSyntaxKind::Ident) {
            self.bump();
        }
        self.consume_trivia();
        if self.at(CsSyntaxKind::Lt) {
            self.parse_balanced_node(
                CsSyntaxKind::TypeParameterList,
                CsSyntaxKind::Lt,
                CsSyntaxKind::Gt,
            );
        }

        // Primary constructor, base list, constraints, then the body
        loop {
            self.consume_trivia();
            match self.current_kind() {
                None | Some(CsSyntaxKind::RBrace) => break,
                Some(CsSyntaxKind::LBrace) => {
                    if kind == CsSyntaxKind::EnumDecl {
                        self.parse_balanced_node(
                            CsSyntaxKind::Block,
                            CsSyntaxKind::LBrace,
                            CsSyntaxKind::RBrace,
                        );
                    } else {
                        self.parse_declaration_body();
                    }
                    if self.next_significant_kind() == Some(CsSyntaxKind::Semicolon) {
                        self.consume_trivia();
                        self.bump();
                    }
                    break;
                }
                Some(CsSyntaxKind::Semicolon) => {
                    self.bump();
                    break;
                }
                Some(CsSyntaxKind::LParen) => self.parse_balanced_node(
                    CsSyntaxKind::ParameterList,
                    CsSyntaxKind::LParen,
                    CsSyntaxKind::RParen,
                ),
                Some(CsSyntaxKind::LBracket) => {
                    self.bump_balanced(CsSyntaxKind::LBracket, CsSyntaxKind::RBracket)
                }
                Some(_) => self.bump(),
            }
        }

        self.builder.finish_node();
    }

    /// Parse `{ member* }` of a type or namespace
    fn parse_declaration_body(&mut self) {
        self.start_node(CsSyntaxKind::DeclarationBody);
        self.bump(); // {
        self.parse_members(true);
        if self.at(CsSyntaxKind::RBrace) {
            self.bump();
        }
        self.builder.finish_node(); // DECLARATION_BODY
    }

    /// Parse a method or constructor using the positions found by lookahead
    fn parse_method(&mut self, checkpoint: Checkpoint, shape: MemberShape) {
        self.start_node_at(checkpoint, shape.kind);

        let Some(paren) = shape.paren else {
            self.parse_member_tail();
            self.builder.finish_node();
            return;
        };

        let mut in_prefix = true;
        while self.pos < paren && !self.at_end() {
            if self.at_trivia() {
                self.add_current_token();
                continue;
            }
            if Some(self.pos) == shape.type_params {
                self.parse_balanced_node(
                    CsSyntaxKind::TypeParameterList,
                    CsSyntaxKind::Lt,
                    CsSyntaxKind::Gt,
                );
                continue;
            }
            match self.current_kind() {
                Some(CsSyntaxKind::LBracket) if in_prefix => self.parse_balanced_node(
                    CsSyntaxKind::AttributeList,
                    CsSyntaxKind::LBracket,
                    CsSyntaxKind::RBracket,
                ),
                Some(CsSyntaxKind::ModifierKw) => self.bump(),
                Some(CsSyntaxKind::LBracket) => {
                    self.bump_balanced(CsSyntaxKind::LBracket, CsSyntaxKind::RBracket)
                }
                Some(CsSyntaxKind::LParen) => {
                    in_prefix = false;
                    self.bump_balanced(CsSyntaxKind::LParen, CsSyntaxKind::RParen);
                }
                _ => {
                    in_prefix = false;
                    self.bump();
                }
            }
        }

        if self.at(CsSyntaxKind::LParen) {
            self.parse_balanced_node(
                CsSyntaxKind::ParameterList,
                CsSyntaxKind::LParen,
                CsSyntaxKind::RParen,
            );
        }
        self.parse_member_tail();

        self.builder.finish_node();
    }

    /// Constraints or constructor initializer, then `{...}`, `=> ...;` or `;`
    fn parse_member_tail(&mut self) {
        loop {
            if self.at_trivia() {
                self.add_current_token();
                continue;
            }
            match self.current_kind() {
                None | Some(CsSyntaxKind::RBrace) => break,
                Some(CsSyntaxKind::LBrace) => {
                    self.parse_balanced_node(
                        CsSyntaxKind::Block,
                        CsSyntaxKind::LBrace,
                        CsSyntaxKind::RBrace,
                    );
                    break;
                }
                Some(CsSyntaxKind::FatArrow) => {
                    self.parse_expression_body();
                    break;
                }
                Some(CsSyntaxKind::Semicolon) => {
                    self.bump();
                    break;
                }
                Some(CsSyntaxKind::LParen) => {
                    self.bump_balanced(CsSyntaxKind::LParen, CsSyntaxKind::RParen)
                }
                Some(CsSyntaxKind::LBracket) => {
                    self.bump_balanced(CsSyntaxKind::LBracket, CsSyntaxKind::RBracket)
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Parse `=> expression;`
    fn parse_expression_body(&mut self) {
        self.start_node(CsSyntaxKind::ExpressionBody);
        self.bump(); // =>

        loop {
            if self.at_trivia() {
                self.add_current_token();
                continue;
            }
            match self.current_kind() {
                None | Some(CsSyntaxKind::RBrace) => break,
                Some(CsSyntaxKind::Semicolon) => {
                    self.bump();
                    break;
                }
                Some(CsSyntaxKind::LParen) => {
                    self.bump_balanced(CsSyntaxKind::LParen, CsSyntaxKind::RParen)
                }
                Some(CsSyntaxKind::LBracket) => {
                    self.bump_balanced(CsSyntaxKind::LBracket, CsSyntaxKind::RBracket)
                }
                Some(CsSyntaxKind::LBrace) => {
                    self.bump_balanced(CsSyntaxKind::LBrace, CsSyntaxKind::RBrace)
                }
                Some(_) => self.bump(),
            }
        }

        self.builder.finish_node(); // EXPRESSION_BODY
    }

    /// Fields, properties, events, indexers, operators, delegates and anything
    /// else that is not a method, constructor or type
    fn parse_member_declaration(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, CsSyntaxKind::MemberDecl);

        let mut in_prefix = true;
        loop {
            if self.at_trivia() {
                self.add_current_token();
                continue;
            }
            match self.current_kind() {
                None | Some(CsSyntaxKind::RBrace) => break,
                Some(CsSyntaxKind::LBracket) if in_prefix => self.parse_balanced_node(
                    CsSyntaxKind::AttributeList,
                    CsSyntaxKind::LBracket,
                    CsSyntaxKind::RBracket,
                ),
                Some(CsSyntaxKind::ModifierKw) => self.bump(),
                Some(CsSyntaxKind::Semicolon) => {
                    self.bump();
                    break;
                }
                Some(CsSyntaxKind::FatArrow) => {
                    self.parse_expression_body();
                    break;
                }
                Some(CsSyntaxKind::LBrace) => {
                    self.parse_balanced_node(
                        CsSyntaxKind::Block,
                        CsSyntaxKind::LBrace,
                        CsSyntaxKind::RBrace,
                    );
                    // `{ get; set; } = initializer;`
                    if self.next_significant_kind() != Some(CsSyntaxKind::Equals) {
                        break;
                    }
                }
                Some(CsSyntaxKind::LParen) => {
                    in_prefix = false;
                    self.bump_balanced(CsSyntaxKind::LParen, CsSyntaxKind::RParen);
                }
                Some(CsSyntaxKind::LBracket) => {
                    self.bump_balanced(CsSyntaxKind::LBracket, CsSyntaxKind::RBracket)
                }
                Some(_) => {
                    in_prefix = false;
                    self.bump();
                }
            }
        }

        self.builder.finish_node(); // MEMBER_DECL
    }

    /// Attribute sections and modifiers that precede a declaration keyword
    fn parse_prefix(&mut self) {
        loop {
            self.consume_trivia();
            match self.current_kind() {
                Some(CsSyntaxKind::LBracket) => self.parse_balanced_node(
                    CsSyntaxKind::AttributeList,
                    CsSyntaxKind::LBracket,
                    CsSyntaxKind::RBracket,
                ),
                Some(CsSyntaxKind::ModifierKw) => self.bump(),
                _ => break,
            }
        }
    }

    // Classification

    /// Decide what kind of declaration starts at the current token
    fn classify_member(&self) -> MemberShape {
        let mut idx = self.pos;

        loop {
            match self.kind_at(idx) {
                Some(CsSyntaxKind::LBracket) => {
                    if idx == self.pos && self.is_global_attribute(idx) {
                        return MemberShape {
                            standalone_attribute: true,
                            ..MemberShape::simple(CsSyntaxKind::MemberDecl)
                        };
                    }
                    let close = self.matching_close(idx);
                    idx = self.next_significant_from(close + 1);
                }
                Some(CsSyntaxKind::ModifierKw) => idx = self.next_significant_from(idx + 1),
                _ => break,
            }
        }

        let kind = match self.kind_at(idx) {
            None => return MemberShape::simple(CsSyntaxKind::MemberDecl),
            Some(kind) => kind,
        };

        match kind {
            CsSyntaxKind::NamespaceKw => MemberShape::simple(CsSyntaxKind::NamespaceDecl),
            CsSyntaxKind::UsingKw => MemberShape::simple(CsSyntaxKind::UsingDirective),
            CsSyntaxKind::Ident
                if self.tokens[idx].text == "global"
                    && self.kind_at(self.next_significant_from(idx + 1))
                        == Some(CsSyntaxKind::UsingKw) =>
            {
                MemberShape::simple(CsSyntaxKind::UsingDirective)
            }
            CsSyntaxKind::ClassKw => MemberShape::simple(CsSyntaxKind::ClassDecl),
            CsSyntaxKind::StructKw => MemberShape::simple(CsSyntaxKind::StructDecl),
            CsSyntaxKind::InterfaceKw => MemberShape::simple(CsSyntaxKind::InterfaceDecl),
            CsSyntaxKind::EnumKw => MemberShape::simple(CsSyntaxKind::EnumDecl),
            CsSyntaxKind::RecordKw => MemberShape::simple(CsSyntaxKind::RecordDecl),
            CsSyntaxKind::DelegateKw | CsSyntaxKind::EventKw => {
                MemberShape::simple(CsSyntaxKind::MemberDecl)
            }
            _ => self.classify_by_header(idx),
        }
    }

    /// Scan a member header up to its first structural token at depth 0
    fn classify_by_header(&self, start: usize) -> MemberShape {
        let mut scanned: Vec<usize> = Vec::new();
        let mut angle = 0usize;
        let mut idx = start;

        while let Some(kind) = self.kind_at(idx) {
            match kind {
                CsSyntaxKind::Lt => {
                    angle += 1;
                    scanned.push(idx);
                }
                CsSyntaxKind::Gt => {
                    angle = angle.saturating_sub(1);
                    scanned.push(idx);
                }
                CsSyntaxKind::LParen if angle == 0 && !scanned.is_empty() => {
                    return self.shape_for_parameter_list(&scanned, idx);
                }
                CsSyntaxKind::LParen | CsSyntaxKind::LBracket => {
                    // Tuple types, array ranks, indexer parameters
                    scanned.push(idx);
                    idx = self.matching_close(idx);
                }
                CsSyntaxKind::LBrace | CsSyntaxKind::Semicolon => break,
                CsSyntaxKind::Equals | CsSyntaxKind::FatArrow if angle == 0 => break,
                CsSyntaxKind::RBrace | CsSyntaxKind::RParen | CsSyntaxKind::RBracket => break,
                _ => scanned.push(idx),
            }
            idx = self.next_significant_from(idx + 1);
        }

        MemberShape::simple(CsSyntaxKind::MemberDecl)
    }

    /// Classify a header whose parameter list starts at `paren`
    ///
    /// `scanned` holds the significant tokens between the modifiers and the
    /// parenthesis.
    fn shape_for_parameter_list(&self, scanned: &[usize], paren: usize) -> MemberShape {
        let member = MemberShape::simple(CsSyntaxKind::MemberDecl);
        let kind_of = |i: usize| self.tokens[scanned[i]].kind;

        if scanned
            .iter()
            .any(|&i| self.tokens[i].kind == CsSyntaxKind::OperatorKw)
        {
            return member;
        }

        if kind_of(0) == CsSyntaxKind::Tilde {
            return MemberShape {
                paren: Some(paren),
                ..MemberShape::simple(CsSyntaxKind::ConstructorDecl)
            };
        }

        let last = scanned.len() - 1;
        let (name_pos, type_params) = if kind_of(last) == CsSyntaxKind::Gt {
            match matching_angle(last, kind_of) {
                Some(lt) if lt >= 1 => (lt - 1, Some(scanned[lt])),
                _ => return member,
            }
        } else {
            (last, None)
        };

        if kind_of(name_pos) != CsSyntaxKind::Ident {
            return member;
        }

        if name_pos == 0 && type_params.is_none() {
            return MemberShape {
                paren: Some(paren),
                ..MemberShape::simple(CsSyntaxKind::ConstructorDecl)
            };
        }

        // Walk back over an explicit interface qualifier like `IFoo<T>.`
        let mut qualified_start = name_pos;
        while qualified_start >= 2 && kind_of(qualified_start - 1) == CsSyntaxKind::Dot {
            qualified_start -= 2;
            if kind_of(qualified_start) == CsSyntaxKind::Gt {
                match matching_angle(qualified_start, kind_of) {
                    Some(lt) if lt >= 1 => qualified_start = lt - 1,
                    _ => return member,
                }
            }
        }

        if qualified_start == 0 {
            // `Console.WriteLine(...)` and similar statements
            return member;
        }

        MemberShape {
            kind: CsSyntaxKind::MethodDecl,
            paren: Some(paren),
            type_params,
            standalone_attribute: false,
        }
    }

    /// `[assembly: ...]` or `[module: ...]`
    fn is_global_attribute(&self, open: usize) -> bool {
        let target = self.next_significant_from(open + 1);
        let colon = self.next_significant_from(target + 1);
        self.tokens
            .get(target)
            .is_some_and(|t| t.text == "assembly" || t.text == "module")
            && self.kind_at(colon) == Some(CsSyntaxKind::Colon)
    }

    /// Index of the token closing the group opened at `open`
    fn matching_close(&self, open: usize) -> usize {
        let open_kind = self.tokens[open].kind;
        let close_kind = match open_kind {
            CsSyntaxKind::LParen => CsSyntaxKind::RParen,
            CsSyntaxKind::LBracket => CsSyntaxKind::RBracket,
            CsSyntaxKind::Lt => CsSyntaxKind::Gt,
            _ => CsSyntaxKind::RBrace,
        };
        let mut depth = 0usize;
        for (idx, token) in self.tokens.iter().enumerate().skip(open) {
            if token.kind == open_kind {
                depth += 1;
            } else if token.kind == close_kind {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return idx;
                }
            }
        }
        self.tokens.len()
    }

    // Helper methods

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current(&self) -> Option<&CstToken> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<CsSyntaxKind> {
        self.current().map(|t| t.kind)
    }

    fn kind_at(&self, idx: usize) -> Option<CsSyntaxKind> {
        self.tokens.get(idx).map(|t| t.kind)
    }

    fn at(&self, kind: CsSyntaxKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn at_trivia(&self) -> bool {
        self.current_kind().is_some_and(CsSyntaxKind::is_trivia)
    }

    /// First non-trivia token index at or after `idx`
    fn next_significant_from(&self, idx: usize) -> usize {
        let mut idx = idx;
        while self.kind_at(idx).is_some_and(CsSyntaxKind::is_trivia) {
            idx += 1;
        }
        idx
    }

    fn next_significant_kind(&self) -> Option<CsSyntaxKind> {
        self.kind_at(self.next_significant_from(self.pos))
    }

    fn start_node(&mut self, kind: CsSyntaxKind) {
        self.builder.start_node(CsLanguage::kind_to_raw(kind));
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.builder
            .start_node_at(checkpoint, CsLanguage::kind_to_raw(kind));
    }

    fn add_current_token(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder
                .token(CsLanguage::kind_to_raw(token.kind), &token.text);
            self.pos += 1;
        }
    }

    /// Add the current significant token and its trailing trivia
    fn bump(&mut self) {
        self.add_current_token();
        self.consume_trailing_trivia();
    }

    /// Trivia on the same line, up to and including the line break
    fn consume_trailing_trivia(&mut self) {
        while let Some(kind) = self.current_kind() {
            if !kind.is_trivia() {
                break;
            }
            self.add_current_token();
            if kind == CsSyntaxKind::Newline {
                break;
            }
        }
    }

    /// All trivia up to the next significant token
    fn consume_trivia(&mut self) {
        while self.at_trivia() {
            self.add_current_token();
        }
    }

    /// Add a delimited group verbatim, then its trailing trivia
    fn bump_balanced(&mut self, open: CsSyntaxKind, close: CsSyntaxKind) {
        let mut depth = 0usize;
        while let Some(kind) = self.current_kind() {
            self.add_current_token();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
        }
        self.consume_trailing_trivia();
    }

    fn parse_balanced_node(&mut self, kind: CsSyntaxKind, open: CsSyntaxKind, close: CsSyntaxKind) {
        self.start_node(kind);
        self.bump_balanced(open, close);
        self.builder.finish_node();
    }

    fn error_here(&mut self, message: String) {
        let span = self
            .current()
            .map(|t| t.span.clone())
            .unwrap_or_else(|| self.tokens.last().map(|t| t.span.end..t.span.end).unwrap_or(0..0));
        self.errors.push(LexerError::new(message, span));
    }
}

/// Position of the `<` matching the `>` at `gt`, looking backwards
fn matching_angle(gt: usize, kind_of: impl Fn(usize) -> CsSyntaxKind) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=gt).rev() {
        match kind_of(i) {
            CsSyntaxKind::Gt => depth += 1,
            CsSyntaxKind::Lt => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
