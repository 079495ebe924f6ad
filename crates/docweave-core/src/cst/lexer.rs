//! CST lexer that preserves all trivia
//!
//! Every byte of the input ends up in exactly one token, so concatenating the
//! token texts reproduces the source. Whitespace, newlines, comments, doc
//! comments and preprocessor directives are emitted as trivia tokens; the
//! parser decides which declaration they attach to.

use crate::cst::CsSyntaxKind;
use std::ops::Range;

/// Simple span representing a byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: CsSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: CsSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex C# source preserving all trivia
///
/// Unterminated strings, characters and block comments are reported as
/// errors, as are unbalanced `{}`, `()` and `[]` pairs. The token stream is
/// still complete in that case so callers can inspect it.
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0usize;

    while i < len {
        let Some(current) = input[i..].chars().next() else {
            break;
        };
        let size = current.len_utf8();
        let start = i;

        let (kind, end) = match current {
            '\r' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    (CsSyntaxKind::Newline, i + 2)
                } else {
                    (CsSyntaxKind::Newline, i + 1)
                }
            }
            '\n' => (CsSyntaxKind::Newline, i + 1),
            c if c.is_whitespace() => (CsSyntaxKind::Whitespace, lex_whitespace(input, i)),
            '/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = line_end(input, i);
                let text = &input[i..end];
                let kind = if text.starts_with("///") && !text.starts_with("////") {
                    CsSyntaxKind::DocCommentLine
                } else {
                    CsSyntaxKind::CommentLine
                };
                (kind, end)
            }
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = match input[i + 2..].find("*/") {
                    Some(offset) => i + 2 + offset + 2,
                    None => {
                        errors.push(LexerError::new("Unterminated block comment", start..len));
                        len
                    }
                };
                let text = &input[i..end];
                let kind = if text.starts_with("/**") && !text.starts_with("/**/") && text.len() > 4
                {
                    CsSyntaxKind::DocCommentBlock
                } else {
                    CsSyntaxKind::CommentBlock
                };
                (kind, end)
            }
            '#' if at_line_start(input, i) => (CsSyntaxKind::Directive, line_end(input, i)),
            '"' | '@' | '$' if starts_string(input, i) => {
                let (end, error) = lex_string(input, i);
                if let Some(err) = error {
                    errors.push(err);
                }
                (CsSyntaxKind::String, end)
            }
            '\'' => {
                let (end, error) = lex_char(input, i);
                if let Some(err) = error {
                    errors.push(err);
                }
                (CsSyntaxKind::Char, end)
            }
            c if c.is_ascii_digit() => (CsSyntaxKind::Number, lex_number(input, i)),
            '.' if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                (CsSyntaxKind::Number, lex_number(input, i))
            }
            c if is_ident_start(c) || c == '@' && next_is_ident_start(input, i + 1) => {
                let end = lex_ident(input, i + size);
                let text = &input[i..end];
                let kind = CsSyntaxKind::from_keyword(text).unwrap_or(CsSyntaxKind::Ident);
                (kind, end)
            }
            '=' if bytes.get(i + 1) == Some(&b'>') => (CsSyntaxKind::FatArrow, i + 2),
            '=' | '!' | '<' if bytes.get(i + 1) == Some(&b'=') => (CsSyntaxKind::Punct, i + 2),
            '{' => (CsSyntaxKind::LBrace, i + 1),
            '}' => (CsSyntaxKind::RBrace, i + 1),
            '(' => (CsSyntaxKind::LParen, i + 1),
            ')' => (CsSyntaxKind::RParen, i + 1),
            '[' => (CsSyntaxKind::LBracket, i + 1),
            ']' => (CsSyntaxKind::RBracket, i + 1),
            '<' => (CsSyntaxKind::Lt, i + 1),
            '>' => (CsSyntaxKind::Gt, i + 1),
            ';' => (CsSyntaxKind::Semicolon, i + 1),
            ',' => (CsSyntaxKind::Comma, i + 1),
            '.' => (CsSyntaxKind::Dot, i + 1),
            ':' => (CsSyntaxKind::Colon, i + 1),
            '=' => (CsSyntaxKind::Equals, i + 1),
            '?' => (CsSyntaxKind::Question, i + 1),
            '~' => (CsSyntaxKind::Tilde, i + 1),
            _ => (CsSyntaxKind::Punct, i + size),
        };

        tokens.push(CstToken::new(kind, &input[start..end], start..end));
        i = end;
    }

    check_delimiters(&tokens, &mut errors);

    (tokens, errors)
}

/// Report unbalanced or mismatched `{}`, `()` and `[]`
fn check_delimiters(tokens: &[CstToken], errors: &mut Vec<LexerError>) {
    let mut stack: Vec<&CstToken> = Vec::new();

    for token in tokens {
        match token.kind {
            CsSyntaxKind::LBrace | CsSyntaxKind::LParen | CsSyntaxKind::LBracket => {
                stack.push(token)
            }
            CsSyntaxKind::RBrace | CsSyntaxKind::RParen | CsSyntaxKind::RBracket => {
                let expected = match token.kind {
                    CsSyntaxKind::RBrace => CsSyntaxKind::LBrace,
                    CsSyntaxKind::RParen => CsSyntaxKind::LParen,
                    _ => CsSyntaxKind::LBracket,
                };
                match stack.pop() {
                    Some(open) if open.kind == expected => {}
                    Some(open) => {
                        errors.push(LexerError::new(
                            format!("Mismatched '{}' closing '{}'", token.text, open.text),
                            token.span.clone(),
                        ));
                        return;
                    }
                    None => {
                        errors.push(LexerError::new(
                            format!("Unexpected '{}'", token.text),
                            token.span.clone(),
                        ));
                        return;
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        errors.push(LexerError::new(
            format!("Unclosed '{}'", open.text),
            open.span.clone(),
        ));
    }
}

fn lex_whitespace(input: &str, start: usize) -> usize {
    let mut end = start;
    for c in input[start..].chars() {
        if c == '\n' || c == '\r' || !c.is_whitespace() {
            break;
        }
        end += c.len_utf8();
    }
    end
}

/// Offset of the next line break (exclusive), or end of input
fn line_end(input: &str, start: usize) -> usize {
    input[start..]
        .find(['\n', '\r'])
        .map(|offset| start + offset)
        .unwrap_or(input.len())
}

/// True when only spaces or tabs separate `pos` from the previous line break
fn at_line_start(input: &str, pos: usize) -> bool {
    input[..pos]
        .chars()
        .rev()
        .take_while(|c| *c != '\n' && *c != '\r')
        .all(|c| c == ' ' || c == '\t')
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn next_is_ident_start(input: &str, pos: usize) -> bool {
    input[pos..].chars().next().is_some_and(is_ident_start)
}

fn lex_ident(input: &str, start: usize) -> usize {
    let mut end = start;
    for c in input[start..].chars() {
        if !is_ident_continue(c) {
            break;
        }
        end += c.len_utf8();
    }
    end
}

fn lex_number(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() {
        let b = bytes[end];
        let continues = b.is_ascii_alphanumeric()
            || b == b'_'
            || (b == b'.' && bytes.get(end + 1).is_some_and(u8::is_ascii_digit));
        if !continues {
            break;
        }
        end += 1;
    }
    end
}

/// Does a string literal (with any `@`/`$` prefix) start at `pos`?
fn starts_string(input: &str, pos: usize) -> bool {
    let prefix: String = input[pos..]
        .chars()
        .take_while(|c| *c == '@' || *c == '$')
        .collect();
    if prefix.matches('@').count() > 1 {
        return false;
    }
    input[pos + prefix.len()..].starts_with('"')
}

/// Lex a string literal of any flavor starting at `start`
fn lex_string(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let mut pos = start;
    let mut verbatim = false;
    let mut dollars = 0usize;
    while bytes[pos] == b'@' || bytes[pos] == b'$' {
        if bytes[pos] == b'@' {
            verbatim = true;
        } else {
            dollars += 1;
        }
        pos += 1;
    }

    let quotes = bytes[pos..].iter().take_while(|b| **b == b'"').count();
    if quotes >= 3 {
        return lex_raw_string(input, start, pos, quotes);
    }

    // Skip the opening quote
    pos += 1;
    let mut hole_depth = 0usize;
    while pos < bytes.len() {
        let b = bytes[pos];
        if hole_depth > 0 {
            match b {
                b'{' => hole_depth += 1,
                b'}' => hole_depth -= 1,
                b'"' => {
                    let (end, error) = lex_string(input, pos);
                    if error.is_some() {
                        return (end, error);
                    }
                    pos = end;
                    continue;
                }
                _ => {}
            }
            pos += 1;
            continue;
        }

        match b {
            b'"' if verbatim && bytes.get(pos + 1) == Some(&b'"') => pos += 2,
            b'"' => return (pos + 1, None),
            b'\\' if !verbatim => pos += 2,
            b'{' if dollars > 0 && bytes.get(pos + 1) == Some(&b'{') => pos += 2,
            b'{' if dollars > 0 => {
                hole_depth = 1;
                pos += 1;
            }
            b'\n' | b'\r' if !verbatim => break,
            _ => pos += 1,
        }
    }

    let end = pos.min(bytes.len());
    (
        end,
        Some(LexerError::new("Unterminated string literal", start..end)),
    )
}

/// Raw string literal: a run of three or more quotes closed by the same run
fn lex_raw_string(
    input: &str,
    start: usize,
    open: usize,
    quotes: usize,
) -> (usize, Option<LexerError>) {
    let delimiter = "\"".repeat(quotes);
    let body = open + quotes;
    match input[body..].find(&delimiter) {
        Some(offset) => (body + offset + quotes, None),
        None => (
            input.len(),
            Some(LexerError::new(
                "Unterminated raw string literal",
                start..input.len(),
            )),
        ),
    }
}

fn lex_char(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\'' => return (pos + 1, None),
            b'\n' | b'\r' => break,
            _ => pos += 1,
        }
    }
    let end = pos.min(bytes.len());
    (
        end,
        Some(LexerError::new("Unterminated character literal", start..end)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<CsSyntaxKind> {
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    fn concat(source: &str) -> String {
        let (tokens, _) = lex_with_trivia(source);
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_lexes_class_header() {
        use CsSyntaxKind::*;
        assert_eq!(
            kinds("public class Foo {}"),
            vec![ModifierKw, Whitespace, ClassKw, Whitespace, Ident, Whitespace, LBrace, RBrace]
        );
    }

    #[test]
    fn test_doc_comment_discrimination() {
        use CsSyntaxKind::*;
        assert_eq!(kinds("/// doc"), vec![DocCommentLine]);
        assert_eq!(kinds("//// not doc"), vec![CommentLine]);
        assert_eq!(kinds("// plain"), vec![CommentLine]);
        assert_eq!(kinds("/** doc */"), vec![DocCommentBlock]);
        assert_eq!(kinds("/* plain */"), vec![CommentBlock]);
        assert_eq!(kinds("/**/"), vec![CommentBlock]);
    }

    #[test]
    fn test_newline_styles() {
        use CsSyntaxKind::*;
        assert_eq!(kinds("a\r\nb\nc"), vec![Ident, Newline, Ident, Newline, Ident]);
        let (tokens, _) = lex_with_trivia("a\r\nb");
        assert_eq!(tokens[1].text, "\r\n");
    }

    #[test]
    fn test_strings_hide_braces() {
        use CsSyntaxKind::*;
        assert_eq!(kinds(r#""{ not a brace""#), vec![String]);
        assert_eq!(kinds(r#"@"a ""quoted"" }""#), vec![String]);
        assert_eq!(kinds(r#"$"x = {x} {{literal}}""#), vec![String]);
        assert_eq!(kinds(r#"$"{(a ? "}" : "{")}""#), vec![String]);
        assert_eq!(kinds("\"\"\"\nraw \" { text\n\"\"\""), vec![String]);
        assert_eq!(kinds("'}'"), vec![Char]);
        assert_eq!(kinds(r"'\''"), vec![Char]);
    }

    #[test]
    fn test_directive_only_at_line_start() {
        use CsSyntaxKind::*;
        assert_eq!(
            kinds("  #region Members\nx"),
            vec![Whitespace, Directive, Newline, Ident]
        );
        assert_eq!(kinds("a#b"), vec![Ident, Punct, Ident]);
    }

    #[test]
    fn test_fat_arrow_and_comparisons() {
        use CsSyntaxKind::*;
        assert_eq!(kinds("=>"), vec![FatArrow]);
        assert_eq!(kinds("=="), vec![Punct]);
        assert_eq!(kinds("="), vec![Equals]);
        assert_eq!(kinds(">>"), vec![Gt, Gt]);
    }

    #[test]
    fn test_verbatim_identifier() {
        use CsSyntaxKind::*;
        assert_eq!(kinds("@class"), vec![Ident]);
    }

    #[test]
    fn test_unterminated_string_reports_error() {
        let (_, errors) = lex_with_trivia("var s = \"abc\n;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("string"));
    }

    #[test]
    fn test_unterminated_block_comment_reports_error() {
        let (_, errors) = lex_with_trivia("class A {} /* open");
        assert!(errors.iter().any(|e| e.message.contains("block comment")));
    }

    #[test]
    fn test_unbalanced_braces_report_error() {
        let (_, errors) = lex_with_trivia("class A {");
        assert!(errors.iter().any(|e| e.message.contains("Unclosed")));

        let (_, errors) = lex_with_trivia("class A { } }");
        assert!(errors.iter().any(|e| e.message.contains("Unexpected")));

        let (_, errors) = lex_with_trivia("void M( { )");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_lossless_concatenation() {
        let sources = [
            "namespace N;\r\n\r\n/// doc\r\npublic class A<T> where T : new() { }\r\n",
            "class Ünïcödé { string s = $@\"{x}\"; char c = 'q'; }",
            "#if DEBUG\nclass A {}\n#endif\n",
            "  \t\n",
        ];
        for source in sources {
            assert_eq!(concat(source), source);
        }
    }
}
