//! Declared-symbol resolution
//!
//! Produces the fully-qualified display name the generation service receives
//! as context, e.g. `Acme.Billing.Invoice<T>.Total(int, string)`. Resolution
//! is purely syntactic: enclosing namespaces and types are read off the
//! node's ancestors.

use thiserror::Error;

use crate::cst::ast::{AstNode, MethodDeclaration, NamespaceDeclaration, TypeDeclaration};
use crate::cst::{CsSyntaxKind, CsSyntaxNode};
use crate::error::DocweaveError;
use crate::result::ResultExt;

/// Name substituted when resolution fails
pub const UNKNOWN_SYMBOL: &str = "Unknown";

/// Why a declaration's name could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("{kind} does not declare a symbol")]
    NotADeclaration { kind: CsSyntaxKind },

    #[error("declaration at offset {offset} has no name")]
    MissingName { offset: u32 },
}

/// Resolves declaration names within one parsed document
#[derive(Debug, Clone, Default)]
pub struct SemanticModel;

impl SemanticModel {
    pub fn new() -> Self {
        Self
    }

    /// Fully-qualified name of the symbol declared by `node`
    ///
    /// Types render as `Ns.Outer.Name<T>`, methods and constructors as
    /// `Ns.Type.Name<T>(ParamType, ParamType)`.
    pub fn declared_symbol_name(&self, node: &CsSyntaxNode) -> Result<String, SymbolError> {
        let own = if let Some(ty) = TypeDeclaration::cast(node.clone()) {
            ty.display_name().ok_or_else(|| missing_name(node))?
        } else if let Some(method) = MethodDeclaration::cast(node.clone()) {
            method_signature(&method).ok_or_else(|| missing_name(node))?
        } else {
            return Err(SymbolError::NotADeclaration { kind: node.kind() });
        };

        let mut segments = self.containing_names(node)?;
        segments.push(own);
        Ok(segments.join("."))
    }

    /// Like `declared_symbol_name`, falling back to [`UNKNOWN_SYMBOL`]
    pub fn name_or_unknown(&self, node: &CsSyntaxNode) -> String {
        self.declared_symbol_name(node)
            .map_err(DocweaveError::from)
            .or_log()
            .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string())
    }

    /// Names of enclosing namespaces and types, outermost first
    fn containing_names(&self, node: &CsSyntaxNode) -> Result<Vec<String>, SymbolError> {
        let mut names = Vec::new();
        for ancestor in node.ancestors().skip(1) {
            if let Some(ns) = NamespaceDeclaration::cast(ancestor.clone()) {
                names.push(ns.name().ok_or_else(|| missing_name(&ancestor))?);
            } else if let Some(ty) = TypeDeclaration::cast(ancestor.clone()) {
                names.push(ty.display_name().ok_or_else(|| missing_name(&ancestor))?);
            }
        }
        names.reverse();
        Ok(names)
    }
}

fn method_signature(method: &MethodDeclaration) -> Option<String> {
    let name = method.name()?;
    let type_params = method.type_parameters();
    let params = method
        .parameter_list()
        .map(|list| list.types())
        .unwrap_or_default();

    let mut signature = name;
    if !type_params.is_empty() {
        signature.push('<');
        signature.push_str(&type_params.join(", "));
        signature.push('>');
    }
    signature.push('(');
    signature.push_str(&params.join(", "));
    signature.push(')');
    Some(signature)
}

fn missing_name(node: &CsSyntaxNode) -> SymbolError {
    SymbolError::MissingName {
        offset: node.text_range().start().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_csharp;

    fn names(source: &str) -> Vec<String> {
        let parsed = parse_csharp(source);
        let model = SemanticModel::new();
        parsed
            .syntax()
            .descendants()
            .filter(|n| {
                n.kind().is_type_declaration()
                    || matches!(n.kind(), CsSyntaxKind::MethodDecl | CsSyntaxKind::ConstructorDecl)
            })
            .map(|n| model.declared_symbol_name(&n).expect("resolves"))
            .collect()
    }

    #[test]
    fn test_top_level_names() {
        assert_eq!(
            names("class Foo {\n    void Bar() {}\n}"),
            vec!["Foo", "Foo.Bar()"]
        );
    }

    #[test]
    fn test_namespaces_and_nesting() {
        let source = "namespace Acme.Billing\n{\n    public class Invoice<T>\n    {\n        public class Line\n        {\n            public decimal Total(int count, string currency = \"EUR\") => 0;\n        }\n    }\n}\n";
        assert_eq!(
            names(source),
            vec![
                "Acme.Billing.Invoice<T>",
                "Acme.Billing.Invoice<T>.Line",
                "Acme.Billing.Invoice<T>.Line.Total(int, string)",
            ]
        );
    }

    #[test]
    fn test_file_scoped_namespace() {
        assert_eq!(
            names("namespace Acme;\n\ninterface IRepo\n{\n    Task<T> Find<T>(Guid id);\n}\n"),
            vec!["Acme.IRepo", "Acme.IRepo.Find<T>(Guid)"]
        );
    }

    #[test]
    fn test_nested_block_namespaces() {
        assert_eq!(
            names("namespace A { namespace B { enum E { X } } }"),
            vec!["A.B.E"]
        );
    }

    #[test]
    fn test_constructor_name() {
        assert_eq!(
            names("class Foo { public Foo(int x, params string[] rest) {} }"),
            vec!["Foo", "Foo.Foo(int, params string[])"]
        );
    }

    #[test]
    fn test_non_declaration_is_error() {
        let parsed = parse_csharp("class Foo { int x; }");
        let field = parsed
            .syntax()
            .descendants()
            .find(|n| n.kind() == CsSyntaxKind::MemberDecl)
            .expect("field");
        let model = SemanticModel::new();
        assert_eq!(
            model.declared_symbol_name(&field),
            Err(SymbolError::NotADeclaration {
                kind: CsSyntaxKind::MemberDecl
            })
        );
        assert_eq!(model.name_or_unknown(&field), UNKNOWN_SYMBOL);
    }

    #[test]
    fn test_anonymous_type_falls_back() {
        let parsed = parse_csharp("class { }");
        let class = parsed.syntax().first_child().expect("class");
        let model = SemanticModel::new();
        assert!(matches!(
            model.declared_symbol_name(&class),
            Err(SymbolError::MissingName { offset: 0 })
        ));
        assert_eq!(model.name_or_unknown(&class), "Unknown");
    }
}
