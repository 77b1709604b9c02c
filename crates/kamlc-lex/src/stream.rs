//! The token-stream shaper.
//!
//! [`TokenStream`] sits between the raw lexer and the parser. It owns a
//! small pushback buffer and normalizes the stream: runs of
//! `STRING_LIT` fragments separated only by whitespace are fused into a
//! single literal, so the parser never sees two adjacent string tokens.
//! Whitespace filtering and N-token lookahead live here as well.

use std::collections::VecDeque;

use kamlc_util::{Handler, Symbol};

use crate::error::LexError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind, TokenValue};

/// Buffered, shaping token source.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    buffer: VecDeque<Token>,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            lexer: Lexer::new(source, handler),
            buffer: VecDeque::new(),
        }
    }

    /// Returns the next token. With `filter_ws`, whitespace tokens are
    /// skipped (they are still consumed).
    pub fn next(&mut self, filter_ws: bool) -> Result<Token, LexError> {
        loop {
            let token = self.shaped_next()?;
            if filter_ws && token.kind == TokenKind::Ws {
                continue;
            }
            return Ok(token);
        }
    }

    /// Returns the `n`-th upcoming token (1-based) without consuming
    /// anything. A later sequence of `next` calls with the same
    /// `filter_ws` yields the same token in position `n`.
    pub fn lookahead(&mut self, n: usize, filter_ws: bool) -> Result<Token, LexError> {
        let mut pulled = Vec::new();
        let mut matched = 0usize;
        let mut target = None;
        while matched < n.max(1) {
            let token = self.shaped_next()?;
            let counts = !(filter_ws && token.kind == TokenKind::Ws);
            pulled.push(token);
            if counts {
                matched += 1;
                if matched == n.max(1) {
                    target = Some(token);
                }
            }
        }
        for token in pulled.into_iter().rev() {
            self.push_back(token);
        }
        match target {
            Some(token) => Ok(token),
            // Unreachable: Eof repeats and always counts.
            None => self.lookahead(1, false),
        }
    }

    /// Puts a token back at the front of the stream.
    pub fn push_back(&mut self, token: Token) {
        self.buffer.push_front(token);
    }

    /// Discards the next `n` tokens (whitespace included).
    pub fn skip(&mut self, n: usize) -> Result<(), LexError> {
        for _ in 0..n {
            self.next(false)?;
        }
        Ok(())
    }

    /// Pulls one raw token from the buffer or the lexer.
    fn pull(&mut self) -> Result<Token, LexError> {
        if let Some(token) = self.buffer.pop_front() {
            return Ok(token);
        }
        self.lexer.next_token()
    }

    /// Delivers the next token with string coalescing applied.
    fn shaped_next(&mut self) -> Result<Token, LexError> {
        let token = self.pull()?;
        if token.kind != TokenKind::StringLit {
            return Ok(token);
        }
        self.coalesce(token)
    }

    /// Fuses a run of `STRING_LIT`/`WS` tokens starting at `first`.
    ///
    /// Whitespace between the first and last fragment is discarded;
    /// whitespace after the last fragment is merged into a single `WS`
    /// token delivered next. The fused literal keeps the first
    /// fragment's location. The token that ends the run is pushed back.
    fn coalesce(&mut self, first: Token) -> Result<Token, LexError> {
        let mut run = vec![first];
        loop {
            let token = self.pull()?;
            match token.kind {
                TokenKind::StringLit | TokenKind::Ws => run.push(token),
                _ => {
                    self.push_back(token);
                    break;
                }
            }
        }

        let mut last_fragment = 0;
        for (i, token) in run.iter().enumerate() {
            if token.kind == TokenKind::StringLit {
                last_fragment = i;
            }
        }

        let mut text = String::new();
        for token in &run[..=last_fragment] {
            if token.kind == TokenKind::StringLit {
                if let Some(s) = token.sym() {
                    text.push_str(s.as_str());
                }
            }
        }

        // Trailing whitespace collapses into one outer WS token.
        let trailing = &run[last_fragment + 1..];
        if !trailing.is_empty() {
            let mut ws = String::new();
            for token in trailing {
                if let Some(s) = token.sym() {
                    ws.push_str(s.as_str());
                }
            }
            let mut span = trailing[0].span;
            if let Some(last) = trailing.last() {
                span = span.to(last.span);
            }
            self.push_back(Token::new(
                TokenKind::Ws,
                TokenValue::Str(Symbol::intern(&ws)),
                span,
            ));
        }

        let span = run[0].span.to(run[last_fragment].span);
        Ok(Token::new(
            TokenKind::StringLit,
            TokenValue::Str(Symbol::intern(&text)),
            span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kamlc_util::Handler;

    fn shaped(source: &str, filter_ws: bool) -> Vec<Token> {
        let handler = Handler::new();
        let mut stream = TokenStream::new(source, &handler);
        let mut out = Vec::new();
        loop {
            let tok = stream.next(filter_ws).expect("lex error");
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok);
        }
        out
    }

    fn values(tokens: &[Token]) -> Vec<(TokenKind, String)> {
        tokens
            .iter()
            .map(|t| {
                let v = t.sym().map(|s| s.as_str().to_owned()).unwrap_or_default();
                (t.kind, v)
            })
            .collect()
    }

    fn s(text: &str) -> (TokenKind, String) {
        (TokenKind::StringLit, text.to_owned())
    }

    fn w(text: &str) -> (TokenKind, String) {
        (TokenKind::Ws, text.to_owned())
    }

    fn id(text: &str) -> (TokenKind, String) {
        (TokenKind::Id, text.to_owned())
    }

    #[test]
    fn test_single_string_collapses_anchors() {
        assert_eq!(values(&shaped("'ABCD'", false)), vec![s("ABCD")]);
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        assert_eq!(values(&shaped("'AB''CD'", false)), vec![s("ABCD")]);
        assert_eq!(values(&shaped("\"AB\"\"CD\"", false)), vec![s("ABCD")]);
    }

    #[test]
    fn test_concatenation_across_whitespace() {
        assert_eq!(
            values(&shaped("\n'AB'\n 'CD'\n", false)),
            vec![w("\n"), s("ABCD"), w("\n")]
        );
        assert_eq!(
            values(&shaped(" \n 'AB' \n 'CD' \n ", false)),
            vec![w(" \n "), s("ABCD"), w(" \n ")]
        );
    }

    #[test]
    fn test_mixed_quoting_styles_concatenate() {
        assert_eq!(
            values(&shaped(" \n \"AB\" \n 'CD' \n ", false)),
            vec![w(" \n "), s("ABCD"), w(" \n ")]
        );
        assert_eq!(
            values(&shaped(" \n {{{AB}}} \n \"CD\" \n 'EF' \n ", false)),
            vec![w(" \n "), s("ABCDEF"), w(" \n ")]
        );
        assert_eq!(
            values(&shaped(" \n \"AB\" \n {{{CD}}} \n 'EF' \n ", false)),
            vec![w(" \n "), s("ABCDEF"), w(" \n ")]
        );
        assert_eq!(
            values(&shaped(" \n 'AB' \n \"CD\" \n {{{EF}}} \n ", false)),
            vec![w(" \n "), s("ABCDEF"), w(" \n ")]
        );
    }

    #[test]
    fn test_interpolation_bounds_runs() {
        assert_eq!(
            values(&shaped("'$bar'", false)),
            vec![s(""), id("$bar"), s("")]
        );
        assert_eq!(
            values(&shaped("'Hello $bar World'", false)),
            vec![s("Hello "), id("$bar"), s(" World")]
        );
        assert_eq!(
            values(&shaped("\"Hello {bar} World\"", false)),
            vec![s("Hello "), id("bar"), s(" World")]
        );
        assert_eq!(
            values(&shaped("'Hello ${bar} World'", false)),
            vec![s("Hello "), id("bar"), s(" World")]
        );
    }

    #[test]
    fn test_interpolation_with_adjacent_strings() {
        assert_eq!(
            values(&shaped("\"Hello \"\"{bar} World\"", false)),
            vec![s("Hello "), id("bar"), s(" World")]
        );
        assert_eq!(
            values(&shaped(" \"Hello \" \" {bar} World\" ", false)),
            vec![w(" "), s("Hello  "), id("bar"), s(" World"), w(" ")]
        );
        assert_eq!(
            values(&shaped("\"Hello {bar}\"\" World\"", false)),
            vec![s("Hello "), id("bar"), s(" World")]
        );
        assert_eq!(
            values(&shaped("\"Hello {bar} \" \"World\"", false)),
            vec![s("Hello "), id("bar"), s(" World")]
        );
    }

    #[test]
    fn test_whitespace_inside_interpolation_survives() {
        assert_eq!(
            values(&shaped("\" Hello {\nbar\n} World\"", false)),
            vec![s(" Hello "), w("\n"), id("bar"), w("\n"), s(" World")]
        );
    }

    #[test]
    fn test_raw_block_scenario() {
        // `{{{Hello ${foo}}}}` keeps its trailing empty literal.
        assert_eq!(
            values(&shaped("{{{Hello ${foo}}}}", false)),
            vec![s("Hello "), id("foo"), s("")]
        );
    }

    #[test]
    fn test_raw_edge_interpolations() {
        assert_eq!(
            values(&shaped("{{{${foo} Hello ${foo}}}}", false)),
            vec![s(""), id("foo"), s(" Hello "), id("foo"), s("")]
        );
    }

    #[test]
    fn test_filter_ws() {
        assert_eq!(
            values(&shaped("\n'AB'\n 'CD'\n", true)),
            vec![s("ABCD")]
        );
        let kinds: Vec<_> = shaped("a \n b", true).iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Id, TokenKind::Id]);
    }

    #[test]
    fn test_code_tokens_pass_through() {
        let kinds: Vec<_> = shaped("-set x = 1;", true).iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Set,
                TokenKind::Id,
                TokenKind::Assign,
                TokenKind::IntLit,
                TokenKind::Semi
            ]
        );
    }

    #[test]
    fn test_lookahead_matches_next() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("-set x = 1;", &handler);
        let la1 = stream.lookahead(1, true).expect("la");
        let la3 = stream.lookahead(3, true).expect("la");
        assert_eq!(la1.kind, TokenKind::Set);
        assert_eq!(la3.kind, TokenKind::Assign);
        assert_eq!(stream.next(true).expect("next").kind, TokenKind::Set);
        assert_eq!(stream.next(true).expect("next").kind, TokenKind::Id);
        assert_eq!(stream.next(true).expect("next").kind, TokenKind::Assign);
    }

    #[test]
    fn test_lookahead_preserves_whitespace() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("a b", &handler);
        // A filtering lookahead must not eat the whitespace for
        // non-filtering consumers.
        let la2 = stream.lookahead(2, true).expect("la");
        assert_eq!(la2.kind, TokenKind::Id);
        assert_eq!(stream.next(false).expect("next").kind, TokenKind::Id);
        assert_eq!(stream.next(false).expect("next").kind, TokenKind::Ws);
        assert_eq!(stream.next(false).expect("next").kind, TokenKind::Id);
    }

    #[test]
    fn test_push_back_round_trip() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("x y", &handler);
        let first = stream.next(true).expect("next");
        stream.push_back(first);
        let again = stream.next(true).expect("next");
        assert_eq!(first, again);
        assert_eq!(
            again.sym().map(|s| s.as_str()),
            Some("x")
        );
    }

    #[test]
    fn test_skip() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("a b c", &handler);
        stream.skip(2).expect("skip"); // Id, Ws
        assert_eq!(
            stream.next(false).expect("next").sym().map(|s| s.as_str()),
            Some("b")
        );
    }

    #[test]
    fn test_eof_repeats() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("", &handler);
        assert_eq!(stream.next(true).expect("next").kind, TokenKind::Eof);
        assert_eq!(stream.next(true).expect("next").kind, TokenKind::Eof);
        assert_eq!(stream.lookahead(1, true).expect("la").kind, TokenKind::Eof);
    }

    #[test]
    fn test_fused_literal_keeps_first_location() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("'AB' 'CD'", &handler);
        let tok = stream.next(false).expect("next");
        assert_eq!(tok.kind, TokenKind::StringLit);
        assert_eq!(tok.span.start, 0);
        assert_eq!((tok.line(), tok.column()), (1, 1));
    }

    #[test]
    fn test_round_trip_of_literal_content() {
        // For plain content, the fused literal equals the inner text.
        let inner = "plain text without specials";
        let source = format!("'{}'", inner);
        let tokens = shaped(&source, false);
        assert_eq!(values(&tokens), vec![s(inner)]);
    }
}
