//! Rowan language implementation for C#
//!
//! Connects `CsSyntaxKind` to Rowan's generic tree types.

use rowan::Language;

use super::CsSyntaxKind;

/// Language marker for C# syntax trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsLanguage;

impl Language for CsLanguage {
    type Kind = CsSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            // Trivia
            0 => CsSyntaxKind::Whitespace,
            1 => CsSyntaxKind::Newline,
            2 => CsSyntaxKind::CommentLine,
            3 => CsSyntaxKind::CommentBlock,
            4 => CsSyntaxKind::DocCommentLine,
            5 => CsSyntaxKind::DocCommentBlock,
            6 => CsSyntaxKind::Directive,

            // Keywords (10-99)
            10 => CsSyntaxKind::NamespaceKw,
            11 => CsSyntaxKind::UsingKw,
            12 => CsSyntaxKind::ClassKw,
            13 => CsSyntaxKind::StructKw,
            14 => CsSyntaxKind::InterfaceKw,
            15 => CsSyntaxKind::EnumKw,
            16 => CsSyntaxKind::RecordKw,
            17 => CsSyntaxKind::DelegateKw,
            18 => CsSyntaxKind::OperatorKw,
            19 => CsSyntaxKind::EventKw,
            20 => CsSyntaxKind::WhereKw,
            30 => CsSyntaxKind::ModifierKw,

            // Punctuation (100-149)
            100 => CsSyntaxKind::LBrace,
            101 => CsSyntaxKind::RBrace,
            102 => CsSyntaxKind::LParen,
            103 => CsSyntaxKind::RParen,
            104 => CsSyntaxKind::LBracket,
            105 => CsSyntaxKind::RBracket,
            106 => CsSyntaxKind::Lt,
            107 => CsSyntaxKind::Gt,
            108 => CsSyntaxKind::Semicolon,
            109 => CsSyntaxKind::Comma,
            110 => CsSyntaxKind::Dot,
            111 => CsSyntaxKind::Colon,
            112 => CsSyntaxKind::Equals,
            113 => CsSyntaxKind::FatArrow,
            114 => CsSyntaxKind::Question,
            115 => CsSyntaxKind::Tilde,
            116 => CsSyntaxKind::Punct,

            // Literals & identifiers (150-199)
            150 => CsSyntaxKind::Ident,
            151 => CsSyntaxKind::String,
            152 => CsSyntaxKind::Char,
            153 => CsSyntaxKind::Number,

            // Structure nodes (200-399)
            200 => CsSyntaxKind::CompilationUnit,
            201 => CsSyntaxKind::NamespaceDecl,
            202 => CsSyntaxKind::UsingDirective,
            210 => CsSyntaxKind::ClassDecl,
            211 => CsSyntaxKind::StructDecl,
            212 => CsSyntaxKind::InterfaceDecl,
            213 => CsSyntaxKind::EnumDecl,
            214 => CsSyntaxKind::RecordDecl,
            220 => CsSyntaxKind::DeclarationBody,
            230 => CsSyntaxKind::MethodDecl,
            231 => CsSyntaxKind::ConstructorDecl,
            232 => CsSyntaxKind::MemberDecl,
            240 => CsSyntaxKind::ParameterList,
            241 => CsSyntaxKind::Block,
            242 => CsSyntaxKind::ExpressionBody,
            243 => CsSyntaxKind::AttributeList,
            244 => CsSyntaxKind::TypeParameterList,

            // Special (400+)
            400 => CsSyntaxKind::Error,
            _ => {
                tracing::warn!(raw = raw.0, "Unknown syntax kind");
                CsSyntaxKind::Unknown
            }
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}
