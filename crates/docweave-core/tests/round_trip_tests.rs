//! Parsing then printing must reproduce the input exactly

use std::sync::Arc;

use docweave_core::cst::{parse_csharp, print};
use docweave_core::{DocPipeline, StaticGenerator};

const SOURCES: &[&str] = &[
    "",
    "\n\n",
    "class A {}",
    "using System;\r\nusing static System.Math;\r\n\r\nnamespace N\r\n{\r\n    class A { }\r\n}\r\n",
    "#if DEBUG\nclass Debug { }\n#else\nclass Release { }\n#endif\n",
    "/* leading block */ class A { } // trailing\n",
    "class A\n{\n    string s = @\"verbatim \"\"quoted\"\" {\";\n    string t = $\"{s} and {{braces}}\";\n    char c = '}';\n}\n",
    "class A\n{\n    string raw = \"\"\"\n        { not a brace }\n        \"\"\";\n}\n",
    "public partial class Widget<T> : Base<T>, IDisposable where T : class, new()\n{\n    public event EventHandler<T>? Changed;\n    public T this[int index] => default!;\n    public static implicit operator string(Widget<T> w) => w.ToString();\n    void IDisposable.Dispose() { }\n}\n",
    "namespace N;\n\n[Serializable]\npublic sealed record Person(string First, string Last)\n{\n    public string Full => $\"{First} {Last}\";\n}\n",
    "enum Flags : byte\n{\n    None = 0,\n    A = 1 << 0,\n    B = 1 << 1,\n}\n",
    "class A\n{\n\tvoid M()\n\t{\n\t\tvar f = (int x) => { return x; };\n\t}\n}\n",
];

#[test]
fn test_valid_sources_round_trip_without_errors() {
    for source in SOURCES {
        let parsed = parse_csharp(source);
        assert!(
            !parsed.has_errors(),
            "errors for {source:?}: {:?}",
            parsed.errors()
        );
        assert_eq!(print(&parsed.syntax()), *source);
    }
}

#[test]
fn test_invalid_sources_still_round_trip() {
    for source in [
        "class A {",
        "}",
        "class A { void M( }",
        "string s = \"unterminated\nclass B {}",
        "/* never closed",
    ] {
        let parsed = parse_csharp(source);
        assert!(parsed.has_errors(), "expected errors for {source:?}");
        assert_eq!(print(&parsed.syntax()), source);
    }
}

#[tokio::test]
async fn test_documented_output_parses_cleanly() {
    let pipeline = DocPipeline::new(Arc::new(StaticGenerator::new(
        "<summary>\nGenerated.\n</summary>",
    )));
    for source in SOURCES {
        let report = pipeline.document_source(source).await.unwrap();
        let reparsed = parse_csharp(&report.output);
        assert!(
            !reparsed.has_errors(),
            "errors after documenting {source:?}: {:?}",
            reparsed.errors()
        );
        assert_eq!(print(&reparsed.syntax()), report.output);
    }
}
