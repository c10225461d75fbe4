//! # Lexer - Tokenizing Suggestion Markup
//!
//! This module provides the first stage of parsing: breaking source text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the input appears in exactly one token. We never skip or
//! discard characters:
//!
//! ```
//! use criticmark_syntax::lexer::lex;
//!
//! let input = "a {++b++} c";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Token Design
//!
//! Tokens are context-free. The lexer emits `{++` whether or not a matching
//! `++}` follows; pairing brackets is the parser's job. Lone bracket
//! characters (`{`, `+`, `~`, ...) that do not form a bracket are emitted one
//! at a time as `TEXT`.

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// This enum exists separately from [`SyntaxKind`] because Logos needs to
/// derive on it. Each variant maps to a corresponding `SyntaxKind` token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum TokenKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF or CRLF)
    #[regex(r"\r?\n")]
    Newline,

    #[token("{++")]
    AddOpen,
    #[token("++}")]
    AddClose,

    #[token("{--")]
    DelOpen,
    #[token("--}")]
    DelClose,

    #[token("{~~")]
    SubOpen,
    #[token("~>")]
    SubSep,
    #[token("~~}")]
    SubClose,

    #[token("{==")]
    HlOpen,
    #[token("==}")]
    HlClose,

    #[token("{>>")]
    CommentOpen,
    #[token("<<}")]
    CommentClose,

    #[token("@@")]
    MetaEnd,

    /// Plain text - anything not matched by other rules
    #[regex(r"[^\s{}+~=<>@-]+")]
    Text,

    /// A single bracket character that is not part of a bracket
    #[regex(r"[{}+~=<>@-]")]
    Punct,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::AddOpen => SyntaxKind::ADD_OPEN,
            TokenKind::AddClose => SyntaxKind::ADD_CLOSE,
            TokenKind::DelOpen => SyntaxKind::DEL_OPEN,
            TokenKind::DelClose => SyntaxKind::DEL_CLOSE,
            TokenKind::SubOpen => SyntaxKind::SUB_OPEN,
            TokenKind::SubSep => SyntaxKind::SUB_SEP,
            TokenKind::SubClose => SyntaxKind::SUB_CLOSE,
            TokenKind::HlOpen => SyntaxKind::HL_OPEN,
            TokenKind::HlClose => SyntaxKind::HL_CLOSE,
            TokenKind::CommentOpen => SyntaxKind::COMMENT_OPEN,
            TokenKind::CommentClose => SyntaxKind::COMMENT_CLOSE,
            TokenKind::MetaEnd => SyntaxKind::META_END,
            TokenKind::Text | TokenKind::Punct => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            Err(()) => SyntaxKind::TEXT,
        };
        tokens.push((Token { kind, text }, span));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn token(kind: SyntaxKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_plain_text() {
        let tokens = lex("hello");
        assert_eq!(tokens, vec![token(SyntaxKind::TEXT, "hello")]);
    }

    #[test]
    fn lex_newline_crlf() {
        let tokens = lex("\r\n");
        assert_eq!(tokens, vec![token(SyntaxKind::NEWLINE, "\r\n")]);
    }

    #[rstest]
    #[case("{++", SyntaxKind::ADD_OPEN)]
    #[case("++}", SyntaxKind::ADD_CLOSE)]
    #[case("{--", SyntaxKind::DEL_OPEN)]
    #[case("--}", SyntaxKind::DEL_CLOSE)]
    #[case("{~~", SyntaxKind::SUB_OPEN)]
    #[case("~>", SyntaxKind::SUB_SEP)]
    #[case("~~}", SyntaxKind::SUB_CLOSE)]
    #[case("{==", SyntaxKind::HL_OPEN)]
    #[case("==}", SyntaxKind::HL_CLOSE)]
    #[case("{>>", SyntaxKind::COMMENT_OPEN)]
    #[case("<<}", SyntaxKind::COMMENT_CLOSE)]
    #[case("@@", SyntaxKind::META_END)]
    fn lex_brackets(#[case] input: &str, #[case] kind: SyntaxKind) {
        assert_eq!(lex(input), vec![token(kind, input)]);
    }

    #[test]
    fn lex_addition() {
        let tokens = lex("{++new text++}");
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::ADD_OPEN, "{++"),
                token(SyntaxKind::TEXT, "new"),
                token(SyntaxKind::WHITESPACE, " "),
                token(SyntaxKind::TEXT, "text"),
                token(SyntaxKind::ADD_CLOSE, "++}"),
            ]
        );
    }

    #[test]
    fn lex_substitution_with_metadata() {
        let tokens = lex("{~~author:A@@old~>new~~}");
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::SUB_OPEN, "{~~"),
                token(SyntaxKind::TEXT, "author:A"),
                token(SyntaxKind::META_END, "@@"),
                token(SyntaxKind::TEXT, "old"),
                token(SyntaxKind::SUB_SEP, "~>"),
                token(SyntaxKind::TEXT, "new"),
                token(SyntaxKind::SUB_CLOSE, "~~}"),
            ]
        );
    }

    #[test]
    fn lone_bracket_characters_become_text() {
        let tokens = lex("a-b");
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::TEXT, "a"),
                token(SyntaxKind::TEXT, "-"),
                token(SyntaxKind::TEXT, "b"),
            ]
        );
    }

    #[test]
    fn all_bytes_preserved_complex() {
        let input = "Intro {--cut--} and {~~a~>b~~}\n{==look==}{>>c:x@@why?<<} {+ + ++ }";
        let tokens = lex(input);
        let reconstructed: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn spans_are_correct() {
        let input = "x {++y++} z";
        let tokens = lex_with_spans(input);
        for (token, span) in &tokens {
            assert_eq!(token.text, &input[span.clone()]);
        }
    }
}
