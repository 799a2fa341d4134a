//! CST-aware lexer that preserves all trivia (whitespace, comments)
//!
//! Every byte of the input ends up in exactly one token, so the tokens can be
//! reassembled into the original source. A run of spaces, tabs and line
//! breaks forms a single [`KtSyntaxKind::Whitespace`] token, matching the
//! way the Kotlin PSI represents insignificant text.

use crate::cst::KtSyntaxKind;
use std::ops::Range;

/// Simple span representing a range in the source
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
    pub kind: KtSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: KtSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Multi-character operators, longest first
const OPERATORS: &[(&str, KtSyntaxKind)] = &[
    ("===", KtSyntaxKind::EqEq),
    ("!==", KtSyntaxKind::ExclEq),
    ("?.", KtSyntaxKind::SafeAccess),
    ("?:", KtSyntaxKind::Elvis),
    ("->", KtSyntaxKind::Arrow),
    ("==", KtSyntaxKind::EqEq),
    ("!=", KtSyntaxKind::ExclEq),
    ("<=", KtSyntaxKind::LtEq),
    (">=", KtSyntaxKind::GtEq),
    ("&&", KtSyntaxKind::AndAnd),
    ("||", KtSyntaxKind::OrOr),
    ("..", KtSyntaxKind::Range),
    ("+=", KtSyntaxKind::PlusEq),
    ("-=", KtSyntaxKind::MinusEq),
    ("!!", KtSyntaxKind::ExclExcl),
    ("++", KtSyntaxKind::PlusPlus),
    ("--", KtSyntaxKind::MinusMinus),
];

/// Lex input preserving ALL trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let len = input.len();
    let mut i = 0usize;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        let (kind, end) = match current {
            c if c.is_whitespace() => {
                let mut end = i + size;
                while let Some((next, next_size)) = next_char(input, end) {
                    if !next.is_whitespace() {
                        break;
                    }
                    end += next_size;
                }
                (KtSyntaxKind::Whitespace, end)
            }

            '/' if input[i..].starts_with("//") => {
                let end = input[i..].find('\n').map_or(len, |rel| i + rel);
                (KtSyntaxKind::EolComment, end)
            }

            '/' if input[i..].starts_with("/*") => {
                let (end, terminated) = lex_block_comment(input, start);
                if !terminated {
                    errors.push(LexerError::new("Unterminated comment", span(start, end)));
                }
                let text = &input[start..end];
                let kind = if text.starts_with("/**") && text != "/**/" {
                    KtSyntaxKind::KDoc
                } else {
                    KtSyntaxKind::BlockComment
                };
                (kind, end)
            }

            '"' => {
                let (end, error) = lex_string(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                (KtSyntaxKind::StringLiteral, end)
            }

            '\'' => {
                let (end, error) = lex_char(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                (KtSyntaxKind::CharLiteral, end)
            }

            '`' => {
                let end = input[i + size..]
                    .find(['`', '\n'])
                    .map_or(len, |rel| i + size + rel);
                if input[end..].starts_with('`') {
                    (KtSyntaxKind::Ident, end + 1)
                } else {
                    errors.push(LexerError::new(
                        "Unterminated backtick identifier",
                        span(start, end),
                    ));
                    (KtSyntaxKind::Ident, end)
                }
            }

            c if c.is_ascii_digit() => lex_number(input, start),

            // `@Annotation`, `return@label`, `this@Outer`
            '@' if next_char(input, i + size)
                .is_some_and(|(c, _)| c.is_alphabetic() || c == '_') =>
            {
                (KtSyntaxKind::AtIdent, read_word(input, i + size))
            }

            c if c.is_alphabetic() || c == '_' => {
                let end = read_word(input, start);
                let kind =
                    KtSyntaxKind::from_keyword(&input[start..end]).unwrap_or(KtSyntaxKind::Ident);
                (kind, end)
            }

            _ => {
                if let Some((op, kind)) = OPERATORS
                    .iter()
                    .find(|(op, _)| input[start..].starts_with(op))
                {
                    (*kind, start + op.len())
                } else if let Some(kind) = single_char_kind(current) {
                    (kind, i + size)
                } else {
                    errors.push(LexerError::new(
                        format!("Unexpected character '{current}'"),
                        span(start, i + size),
                    ));
                    (KtSyntaxKind::Error, i + size)
                }
            }
        };

        tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
        i = end;
    }

    (tokens, errors)
}

fn single_char_kind(ch: char) -> Option<KtSyntaxKind> {
    let kind = match ch {
        '(' => KtSyntaxKind::LParen,
        ')' => KtSyntaxKind::RParen,
        '[' => KtSyntaxKind::LBracket,
        ']' => KtSyntaxKind::RBracket,
        '{' => KtSyntaxKind::LBrace,
        '}' => KtSyntaxKind::RBrace,
        '<' => KtSyntaxKind::Lt,
        '>' => KtSyntaxKind::Gt,
        '.' => KtSyntaxKind::Dot,
        ',' => KtSyntaxKind::Comma,
        ':' => KtSyntaxKind::Colon,
        ';' => KtSyntaxKind::Semicolon,
        '=' => KtSyntaxKind::Eq,
        '+' => KtSyntaxKind::Plus,
        '-' => KtSyntaxKind::Minus,
        '*' => KtSyntaxKind::Star,
        '/' => KtSyntaxKind::Slash,
        '%' => KtSyntaxKind::Percent,
        '!' => KtSyntaxKind::Excl,
        '?' => KtSyntaxKind::Question,
        _ => return None,
    };
    Some(kind)
}

/// Lex a (possibly nested) block comment starting at `start`
///
/// Returns the end offset and whether the comment was terminated.
fn lex_block_comment(input: &str, start: usize) -> (usize, bool) {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return (i, true);
                }
            }
            _ => i += 1,
        }
    }
    (input.len(), false)
}

/// Lex a string literal (regular or raw) starting at the opening quote
fn lex_string(input: &str, start: usize) -> (usize, Option<LexerError>) {
    if input[start..].starts_with("\"\"\"") {
        return match input[start + 3..].find("\"\"\"") {
            Some(rel) => {
                // Raw strings may end with extra quotes: `""""x""""`
                let mut end = start + 3 + rel + 3;
                while input[end..].starts_with('"') {
                    end += 1;
                }
                (end, None)
            }
            None => (
                input.len(),
                Some(LexerError::new(
                    "Unterminated raw string",
                    span(start, input.len()),
                )),
            ),
        };
    }

    let mut end = start + 1;
    while let Some((ch, size)) = next_char(input, end) {
        match ch {
            '\\' => {
                end += size;
                if let Some((_, escaped)) = next_char(input, end) {
                    end += escaped;
                }
            }
            '"' => return (end + size, None),
            '\n' => break,
            _ => end += size,
        }
    }
    (
        end,
        Some(LexerError::new("Unterminated string", span(start, end))),
    )
}

fn lex_char(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let mut end = start + 1;
    while let Some((ch, size)) = next_char(input, end) {
        match ch {
            '\\' => {
                end += size;
                if let Some((_, escaped)) = next_char(input, end) {
                    end += escaped;
                }
            }
            '\'' => return (end + size, None),
            '\n' => break,
            _ => end += size,
        }
    }
    (
        end,
        Some(LexerError::new(
            "Unterminated character literal",
            span(start, end),
        )),
    )
}

fn lex_number(input: &str, start: usize) -> (KtSyntaxKind, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut end = start;

    if input[start..].starts_with("0x") || input[start..].starts_with("0X") {
        end += 2;
        while end < len && (bytes[end].is_ascii_hexdigit() || bytes[end] == b'_') {
            end += 1;
        }
        return (KtSyntaxKind::IntLiteral, consume_suffix(bytes, end, b"uUL"));
    }

    let mut is_float = false;
    while end < len && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
        end += 1;
    }
    // `1..2` is a range, `1.5` a fraction
    if end + 1 < len && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        is_float = true;
        end += 1;
        while end < len && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
            end += 1;
        }
    }
    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < len && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < len && bytes[exp].is_ascii_digit() {
            is_float = true;
            end = exp;
            while end < len && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
    }
    if end < len && (bytes[end] == b'f' || bytes[end] == b'F') {
        return (KtSyntaxKind::FloatLiteral, end + 1);
    }

    if is_float {
        (KtSyntaxKind::FloatLiteral, end)
    } else {
        (KtSyntaxKind::IntLiteral, consume_suffix(bytes, end, b"uUL"))
    }
}

fn consume_suffix(bytes: &[u8], mut end: usize, suffixes: &[u8]) -> usize {
    while end < bytes.len() && suffixes.contains(&bytes[end]) {
        end += 1;
    }
    end
}

fn read_word(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((ch, size)) = next_char(input, end) {
        if ch.is_alphanumeric() || ch == '_' {
            end += size;
        } else {
            break;
        }
    }
    end
}

fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input[pos..].chars().next().map(|c| (c, c.len_utf8()))
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<KtSyntaxKind> {
        lex_with_trivia(input).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_whitespace_run_includes_newlines_and_tabs() {
        let (tokens, errors) = lex_with_trivia("a \n\t\tb");
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, KtSyntaxKind::Whitespace);
        assert_eq!(tokens[1].text, " \n\t\t");
    }

    #[test]
    fn test_lossless_reconstruction() {
        let source = "fun main() {\n    val a = listOf(1, 2)?.map { it * 2 } // done\n}\n";
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty(), "{errors:?}");
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("// a\n/* b */ /** c */"),
            vec![
                KtSyntaxKind::EolComment,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::BlockComment,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::KDoc,
            ]
        );
        assert_eq!(kinds("/* a /* b */ c */"), vec![KtSyntaxKind::BlockComment]);
    }

    #[test]
    fn test_eol_comment_stops_before_newline() {
        let (tokens, _) = lex_with_trivia("// note\nx");
        assert_eq!(tokens[0].text, "// note");
        assert_eq!(tokens[1].text, "\n");
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("a?.b ?: c..d"),
            vec![
                KtSyntaxKind::Ident,
                KtSyntaxKind::SafeAccess,
                KtSyntaxKind::Ident,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::Elvis,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::Ident,
                KtSyntaxKind::Range,
                KtSyntaxKind::Ident,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("1..2")[0], KtSyntaxKind::IntLiteral);
        assert_eq!(kinds("1.5")[0], KtSyntaxKind::FloatLiteral);
        assert_eq!(kinds("0xFFL")[0], KtSyntaxKind::IntLiteral);
        assert_eq!(kinds("2f")[0], KtSyntaxKind::FloatLiteral);
        assert_eq!(lex_with_trivia("1_000L").0[0].text, "1_000L");
    }

    #[test]
    fn test_keywords_and_soft_keywords() {
        assert_eq!(kinds("where")[0], KtSyntaxKind::WhereKw);
        assert_eq!(kinds("get")[0], KtSyntaxKind::Ident);
        assert_eq!(kinds("override")[0], KtSyntaxKind::Ident);
    }

    #[test]
    fn test_strings() {
        let (tokens, errors) = lex_with_trivia(r#""a\"b" """raw
text""""#);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].text, r#""a\"b""#);
        assert_eq!(tokens[2].kind, KtSyntaxKind::StringLiteral);
        assert!(tokens[2].text.ends_with("\"\"\""));
    }

    #[test]
    fn test_unterminated_string_reports_error() {
        let (tokens, errors) = lex_with_trivia("\"abc\nx");
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[0].text, "\"abc");
        assert_eq!(tokens[1].kind, KtSyntaxKind::Whitespace);
    }

    #[test]
    fn test_postfix_operators() {
        assert_eq!(
            kinds("a!! i++ j-- k != l"),
            vec![
                KtSyntaxKind::Ident,
                KtSyntaxKind::ExclExcl,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::Ident,
                KtSyntaxKind::PlusPlus,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::Ident,
                KtSyntaxKind::MinusMinus,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::Ident,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::ExclEq,
                KtSyntaxKind::Whitespace,
                KtSyntaxKind::Ident,
            ]
        );
    }

    #[test]
    fn test_annotations_and_labels() {
        let (tokens, errors) = lex_with_trivia("@Suppress(\"x\") return@forEach");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(tokens[0].kind, KtSyntaxKind::AtIdent);
        assert_eq!(tokens[0].text, "@Suppress");
        assert_eq!(tokens[5].kind, KtSyntaxKind::ReturnKw);
        assert_eq!(tokens[6].kind, KtSyntaxKind::AtIdent);
        assert_eq!(tokens[6].text, "@forEach");
    }

    #[test]
    fn test_unknown_character() {
        let (tokens, errors) = lex_with_trivia("a @ b");
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[2].kind, KtSyntaxKind::Error);
    }
}
