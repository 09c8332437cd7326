//! Lexer for the import header of a module, using logos
//!
//! Markup regions are scanned by the parser's cursor because text and tag
//! contexts there are position dependent. Import declarations are token
//! shaped, so they get a real lexer.

use logos::Logos;

/// Token types for import declarations
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'src> {
    // Keywords
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("as")]
    As,
    #[token("type")]
    Type,

    // Identifiers
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    // Literals
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len()-1]  // Strip quotes
    })]
    String(&'src str),

    #[regex(r"'([^'\\]|\\.)*'", |lex| {
        let s = lex.slice();
        &s[1..s.len()-1]  // Strip quotes
    })]
    SingleQuoteString(&'src str),

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("*")]
    Star,
}

/// A token with its byte range
pub type SpannedToken<'src> = (Token<'src>, std::ops::Range<usize>);

/// Lex an import statement region into tokens with spans.
/// Stops at the first lex error so the caller can report a position.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, usize>> {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok((token, span)),
            Err(_) => Err(span.start),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_named_import() {
        let tokens: Vec<_> = Token::lexer(r#"import { Button, cn } from "@/ui";"#)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Import,
                Token::LBrace,
                Token::Ident("Button"),
                Token::Comma,
                Token::Ident("cn"),
                Token::RBrace,
                Token::From,
                Token::String("@/ui"),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn lexes_namespace_and_default() {
        let tokens: Vec<_> = Token::lexer("import React, * as All from 'react'")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tokens[0], Token::Import);
        assert_eq!(tokens[1], Token::Ident("React"));
        assert_eq!(tokens[2], Token::Comma);
        assert_eq!(tokens[3], Token::Star);
        assert_eq!(tokens[4], Token::As);
        assert_eq!(tokens[5], Token::Ident("All"));
        assert_eq!(tokens[6], Token::From);
        assert_eq!(tokens[7], Token::SingleQuoteString("react"));
    }

    #[test]
    fn keywords_do_not_swallow_identifiers() {
        let tokens: Vec<_> = Token::lexer("importer typeof")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tokens, vec![Token::Ident("importer"), Token::Ident("typeof")]);
    }
}
