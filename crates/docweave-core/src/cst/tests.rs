//! Tests for CST construction

use super::*;
use CsSyntaxKind::*;

fn declaration_kinds(source: &str) -> Vec<CsSyntaxKind> {
    let parsed = parse_csharp(source);
    assert!(!parsed.has_errors(), "unexpected errors: {:?}", parsed.errors());
    parsed
        .syntax()
        .descendants()
        .map(|n| n.kind())
        .filter(|k| {
            k.is_type_declaration()
                || matches!(
                    k,
                    NamespaceDecl | UsingDirective | MethodDecl | ConstructorDecl | MemberDecl
                )
        })
        .collect()
}

fn assert_lossless(source: &str) {
    let parsed = parse_csharp(source);
    assert_eq!(parsed.syntax().text().to_string(), source);
}

#[test]
fn test_simple_class_structure() {
    let parsed = parse_csharp("class Foo {\n    void Bar() {}\n}");
    let root = parsed.syntax();
    assert_eq!(root.kind(), CompilationUnit);

    let class = root.first_child().expect("class");
    assert_eq!(class.kind(), ClassDecl);

    let body = class.children().find(|n| n.kind() == DeclarationBody).expect("body");
    let method = body.first_child().expect("method");
    assert_eq!(method.kind(), MethodDecl);

    let child_kinds: Vec<_> = method.children().map(|n| n.kind()).collect();
    assert_eq!(child_kinds, vec![ParameterList, Block]);
}

#[test]
fn test_member_classification() {
    let source = r#"public class A
{
    private int _x;
    public A(int x) { _x = x; }
    ~A() { }
    public int X { get; set; } = 5;
    public int Y => _x;
    public static A operator +(A a, A b) => a;
    public event EventHandler Changed;
    public T Get<T>() where T : new() => new T();
    public (int, string) Pair() => (1, "");
    public int this[int i] => i;
    public delegate void Handler(int x);
    void IDisposable.Dispose() { }
}
"#;
    assert_eq!(
        declaration_kinds(source),
        vec![
            ClassDecl,
            MemberDecl,
            ConstructorDecl,
            ConstructorDecl,
            MemberDecl,
            MemberDecl,
            MemberDecl,
            MemberDecl,
            MethodDecl,
            MethodDecl,
            MemberDecl,
            MemberDecl,
            MethodDecl,
        ]
    );
    assert_lossless(source);
}

#[test]
fn test_interface_and_enum() {
    let source = "interface IShape\n{\n    double Area();\n    string Name { get; }\n}\n\nenum Color { Red, Green = 2, Blue }\n";
    assert_eq!(
        declaration_kinds(source),
        vec![InterfaceDecl, MethodDecl, MemberDecl, EnumDecl]
    );

    let parsed = parse_csharp(source);
    let enum_decl = parsed
        .syntax()
        .children()
        .find(|n| n.kind() == EnumDecl)
        .expect("enum");
    assert!(enum_decl.children().any(|n| n.kind() == Block));
    assert!(!enum_decl.children().any(|n| n.kind() == DeclarationBody));
}

#[test]
fn test_namespaces() {
    let block = "using System;\n\nnamespace Acme\n{\n    namespace Inner\n    {\n        public struct S { }\n    }\n}\n";
    assert_eq!(
        declaration_kinds(block),
        vec![UsingDirective, NamespaceDecl, NamespaceDecl, StructDecl]
    );
    assert_lossless(block);

    let file_scoped = "namespace Acme.Core;\n\npublic record Person(string Name);\n\npublic class C { }\n";
    let parsed = parse_csharp(file_scoped);
    let ns = parsed.syntax().first_child().expect("namespace");
    assert_eq!(ns.kind(), NamespaceDecl);
    let members: Vec<_> = ns.children().map(|n| n.kind()).collect();
    assert_eq!(members, vec![RecordDecl, ClassDecl]);
}

#[test]
fn test_leading_trivia_belongs_to_declaration() {
    let parsed = parse_csharp("// header\n\n/// <summary>Foo</summary>\nclass Foo {}\n");
    let class = parsed.syntax().first_child().expect("class");
    let leading: Vec<_> = class
        .children_with_tokens()
        .map_while(|e| e.into_token())
        .take_while(|t| t.kind().is_trivia())
        .map(|t| t.kind())
        .collect();
    assert_eq!(
        leading,
        vec![CommentLine, Newline, Newline, DocCommentLine, Newline]
    );
}

#[test]
fn test_trailing_trivia_stays_with_previous_token() {
    let parsed = parse_csharp("class Foo { // trailing\n    void Bar() {}\n}");
    let method = parsed
        .syntax()
        .descendants()
        .find(|n| n.kind() == MethodDecl)
        .expect("method");
    let first = method.first_token().expect("token");
    assert_eq!(first.kind(), Whitespace);
    assert_eq!(first.text(), "    ");
}

#[test]
fn test_attributes_inside_declaration() {
    let parsed = parse_csharp("class A {\n    [Test]\n    [Category(\"x\")]\n    public void M() {}\n}");
    let method = parsed
        .syntax()
        .descendants()
        .find(|n| n.kind() == MethodDecl)
        .expect("method");
    assert_eq!(
        method.children().filter(|n| n.kind() == AttributeList).count(),
        2
    );
}

#[test]
fn test_global_attribute_stands_alone() {
    let source = "[assembly: InternalsVisibleTo(\"Tests\")]\nclass A {}\n";
    assert_eq!(declaration_kinds(source), vec![MemberDecl, ClassDecl]);
}

#[test]
fn test_generic_type_parameters() {
    let parsed = parse_csharp("class Cache<TKey, TValue> where TKey : notnull { }");
    let class = parsed.syntax().first_child().expect("class");
    assert!(class.children().any(|n| n.kind() == TypeParameterList));
    assert!(class.children().any(|n| n.kind() == DeclarationBody));
}

#[test]
fn test_directives_and_regions_round_trip() {
    let source = "#nullable enable\nclass A\n{\n    #region Api\n    public void M() { }\n    #endregion\n}\n";
    assert_eq!(declaration_kinds(source), vec![ClassDecl, MethodDecl]);
    assert_lossless(source);
}

#[test]
fn test_crlf_round_trip() {
    assert_lossless("namespace N\r\n{\r\n    class A\r\n    {\r\n        int M() => 1;\r\n    }\r\n}\r\n");
}

#[test]
fn test_lexer_errors_are_reported_with_position() {
    let parsed = parse_csharp("class A\n{\n    string s = \"open;\n}\n");
    assert!(parsed.has_errors());
    let error = &parsed.errors()[0];
    assert_eq!(error.line, 3);
    assert_eq!(error.column, 16);
}

#[test]
fn test_unbalanced_braces_are_errors() {
    assert!(parse_csharp("class A {").has_errors());
    assert!(parse_csharp("class A { } }").has_errors());
}

#[test]
fn test_broken_input_still_round_trips() {
    for source in ["class A {", "class A { } }", "void M( {", "/* open"] {
        assert_lossless(source);
    }
}

#[test]
fn test_line_col() {
    assert_eq!(line_col("ab\ncd", 0), (1, 1));
    assert_eq!(line_col("ab\ncd", 4), (2, 2));
}
