//! Syntax kind enumeration for the C# CST
//!
//! This module defines every node and token type that can appear in the
//! syntax tree. Raw values are grouped by range so classification helpers can
//! work on the discriminant alone.

use std::fmt;

/// Syntax kind for C# language elements
///
/// The enum covers:
/// - Trivia (whitespace, newlines, comments, doc comments, directives)
/// - Keywords that shape declarations
/// - Punctuation
/// - Literals and identifiers
/// - Structural nodes (namespaces, type and member declarations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum CsSyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Spaces and tabs
    Whitespace = 0,
    /// `\n`, `\r\n` or `\r`
    Newline = 1,
    /// Line comment starting with `//`
    CommentLine = 2,
    /// Block comment `/* ... */`
    CommentBlock = 3,
    /// Documentation line comment starting with exactly `///`
    DocCommentLine = 4,
    /// Documentation block comment `/** ... */`
    DocCommentBlock = 5,
    /// Preprocessor directive line (`#region`, `#if`, `#pragma`, ...)
    Directive = 6,

    // ==================
    // Keywords (10-99)
    // ==================
    /// "namespace"
    NamespaceKw = 10,
    /// "using"
    UsingKw = 11,
    /// "class"
    ClassKw = 12,
    /// "struct"
    StructKw = 13,
    /// "interface"
    InterfaceKw = 14,
    /// "enum"
    EnumKw = 15,
    /// "record"
    RecordKw = 16,
    /// "delegate"
    DelegateKw = 17,
    /// "operator"
    OperatorKw = 18,
    /// "event"
    EventKw = 19,
    /// "where"
    WhereKw = 20,
    /// Declaration modifier (`public`, `static`, `async`, ...)
    ModifierKw = 30,

    // ==================
    // Punctuation (100-149)
    // ==================
    LBrace = 100,
    RBrace = 101,
    LParen = 102,
    RParen = 103,
    LBracket = 104,
    RBracket = 105,
    Lt = 106,
    Gt = 107,
    Semicolon = 108,
    Comma = 109,
    Dot = 110,
    Colon = 111,
    Equals = 112,
    /// `=>`
    FatArrow = 113,
    Question = 114,
    Tilde = 115,
    /// Any other operator character
    Punct = 116,

    // ==================
    // Literals & Identifiers (150-199)
    // ==================
    Ident = 150,
    /// Regular, verbatim, interpolated or raw string literal
    String = 151,
    /// Character literal
    Char = 152,
    /// Numeric literal
    Number = 153,

    // ==================
    // Structure nodes (200-399)
    // ==================
    /// Root of a parsed document
    CompilationUnit = 200,
    /// `namespace A.B { ... }` or file-scoped `namespace A.B;`
    NamespaceDecl = 201,
    /// `using ...;`
    UsingDirective = 202,
    ClassDecl = 210,
    StructDecl = 211,
    InterfaceDecl = 212,
    EnumDecl = 213,
    RecordDecl = 214,
    /// `{ ... }` member list of a type or namespace
    DeclarationBody = 220,
    /// Method declaration (return type + name + parameter list)
    MethodDecl = 230,
    /// Constructor or destructor
    ConstructorDecl = 231,
    /// Field, property, event, indexer, operator, delegate, or any other member
    MemberDecl = 232,
    /// `(...)` parameter list of a method
    ParameterList = 240,
    /// `{ ... }` block body, kept opaque
    Block = 241,
    /// `=> expr;` expression body, kept opaque
    ExpressionBody = 242,
    /// `[...]` attribute section
    AttributeList = 243,
    /// `<...>` type parameter list on a declaration name
    TypeParameterList = 244,

    // ==================
    // Special (400+)
    // ==================
    /// Unrecoverable token sequence
    Error = 400,
    /// Kind for raw values that do not map to any variant
    Unknown = 401,
}

impl CsSyntaxKind {
    /// Check if this is a trivia kind
    pub const fn is_trivia(self) -> bool {
        (self as u16) < 10
    }

    /// Check if this is a documentation comment kind
    pub const fn is_doc_comment(self) -> bool {
        matches!(self, Self::DocCommentLine | Self::DocCommentBlock)
    }

    /// Check if this is a plain or documentation comment
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            Self::CommentLine | Self::CommentBlock | Self::DocCommentLine | Self::DocCommentBlock
        )
    }

    /// Check if this is a keyword
    pub const fn is_keyword(self) -> bool {
        (self as u16) >= 10 && (self as u16) < 100
    }

    /// Check if this is punctuation
    pub const fn is_punct(self) -> bool {
        (self as u16) >= 100 && (self as u16) < 150
    }

    /// Check if this is a structural node
    pub const fn is_node(self) -> bool {
        (self as u16) >= 200 && (self as u16) < 400
    }

    /// Check if this kind declares a type
    pub const fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDecl | Self::StructDecl | Self::InterfaceDecl | Self::EnumDecl | Self::RecordDecl
        )
    }

    /// Kinds whose members may themselves be declarations
    pub const fn is_declaration_container(self) -> bool {
        matches!(
            self,
            Self::CompilationUnit
                | Self::NamespaceDecl
                | Self::DeclarationBody
                | Self::ClassDecl
                | Self::StructDecl
                | Self::InterfaceDecl
                | Self::RecordDecl
        )
    }

    /// Keyword kind for an identifier-like word, if it is one we track
    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "namespace" => Self::NamespaceKw,
            "using" => Self::UsingKw,
            "class" => Self::ClassKw,
            "struct" => Self::StructKw,
            "interface" => Self::InterfaceKw,
            "enum" => Self::EnumKw,
            "record" => Self::RecordKw,
            "delegate" => Self::DelegateKw,
            "operator" => Self::OperatorKw,
            "event" => Self::EventKw,
            "where" => Self::WhereKw,
            "public" | "private" | "protected" | "internal" | "static" | "abstract"
            | "sealed" | "partial" | "virtual" | "override" | "async" | "readonly" | "extern"
            | "unsafe" | "new" | "const" | "volatile" | "required" => Self::ModifierKw,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for CsSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<CsSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: CsSyntaxKind) -> Self {
        Self(kind as u16)
    }
}
