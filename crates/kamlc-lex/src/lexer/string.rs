//! String-mode rules: quoted strings, raw blocks, and the transitions
//! into interpolation.
//!
//! All three quoting styles emit `STRING_LIT` fragments plus empty
//! anchors at their delimiters; the shaper concatenates adjacent
//! fragments afterwards. Quoted strings admit `$name`, `{expr}` and
//! `${expr}` interpolation; raw blocks only `${expr}`.

use kamlc_util::Symbol;

use super::{Lexer, Mode};
use crate::error::LexError;
use crate::token::{Token, TokenKind, TokenValue};

impl<'a> Lexer<'a> {
    /// One step inside `'…'` or `"…"`. Returns `None` when the step was
    /// a mode transition that produced no token.
    pub(super) fn quoted_token(&mut self, quote: char) -> Result<Option<Token>, LexError> {
        if self.cursor.is_at_end() {
            let (line, column) = self.mode_origin();
            return Err(LexError::UnterminatedString { line, column });
        }

        let c = self.cursor.current();
        if c == quote {
            self.cursor.advance();
            self.pop_mode();
            return Ok(Some(self.anchor()));
        }

        match c {
            '\\' => self.escape_sequence().map(Some),
            '$' => self.dollar(),
            '{' => {
                if self.cursor.peek(1) == '{' {
                    self.cursor.advance_n(2);
                    Ok(Some(self.string_fragment("{")))
                } else {
                    self.cursor.advance();
                    self.push_interp();
                    Ok(None)
                }
            }
            '}' => {
                if self.cursor.peek(1) == '}' {
                    self.cursor.advance_n(2);
                    Ok(Some(self.string_fragment("}")))
                } else {
                    Err(LexError::UnescapedBrace {
                        line: self.token_line,
                        column: self.token_column,
                    })
                }
            }
            '\n' => {
                self.cursor.advance();
                Ok(Some(self.string_fragment("\n")))
            }
            _ => {
                // A run of plain content. The non-matching quote kind is
                // ordinary text here.
                let run = self
                    .cursor
                    .eat_while(|ch| ch != quote && !matches!(ch, '{' | '}' | '$' | '\\' | '\n'));
                Ok(Some(self.string_fragment(run)))
            }
        }
    }

    /// One step inside `{{{…}}}`.
    pub(super) fn raw_token(&mut self) -> Result<Option<Token>, LexError> {
        if self.cursor.is_at_end() {
            let (line, column) = self.mode_origin();
            return Err(LexError::UnterminatedRawBlock { line, column });
        }

        match self.cursor.current() {
            '$' => {
                if self.cursor.starts_with("${{") {
                    self.cursor.advance_n(3);
                    Ok(Some(self.string_fragment("${")))
                } else if self.cursor.starts_with("${") {
                    self.cursor.advance_n(2);
                    self.push_interp();
                    Ok(None)
                } else {
                    self.cursor.advance();
                    Ok(Some(self.string_fragment("$")))
                }
            }
            '}' => {
                if self.cursor.starts_with("}}}") {
                    self.cursor.advance_n(3);
                    self.pop_mode();
                    Ok(Some(self.anchor()))
                } else if self.cursor.starts_with("}}") {
                    self.cursor.advance_n(2);
                    Ok(Some(self.string_fragment("}}")))
                } else {
                    self.cursor.advance();
                    Ok(Some(self.string_fragment("}")))
                }
            }
            _ => {
                // Braces other than the closers are plain content, as are
                // backslashes and newlines.
                let run = self.cursor.eat_while(|ch| ch != '$' && ch != '}');
                Ok(Some(self.string_fragment(run)))
            }
        }
    }

    /// Handles `$` inside a quoted string: a simple variable, an
    /// interpolation opener, the `${{` escape, or a literal dollar.
    fn dollar(&mut self) -> Result<Option<Token>, LexError> {
        let next = self.cursor.peek(1);
        if is_var_start(next) {
            self.cursor.advance(); // '$'
            self.cursor.advance(); // first name character
            self.cursor
                .eat_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            let text = self.cursor.slice_from(self.token_start);
            return Ok(Some(self.token(
                TokenKind::Id,
                TokenValue::Str(Symbol::intern(text)),
            )));
        }
        if next == '{' {
            if self.cursor.peek(2) == '{' {
                self.cursor.advance_n(3);
                return Ok(Some(self.string_fragment("${")));
            }
            self.cursor.advance_n(2);
            self.push_interp();
            return Ok(None);
        }
        self.cursor.advance();
        Ok(Some(self.string_fragment("$")))
    }

    /// CSS-style escape: `\` + up to six hex digits and one optional
    /// trailing whitespace decodes to the codepoint; `\` + any other
    /// non-newline character yields that character.
    fn escape_sequence(&mut self) -> Result<Token, LexError> {
        self.cursor.advance(); // backslash

        let invalid = LexError::InvalidEscape {
            line: self.token_line,
            column: self.token_column,
        };

        if self.cursor.is_at_end() || self.cursor.current() == '\n' {
            return Err(invalid);
        }

        let c = self.cursor.current();
        if c.is_ascii_hexdigit() {
            let mut hex = String::new();
            while hex.len() < 6 && self.cursor.current().is_ascii_hexdigit() {
                hex.push(self.cursor.current());
                self.cursor.advance();
            }
            // One whitespace character may terminate the escape; it is
            // consumed and not part of the string.
            if self.cursor.starts_with("\r\n") {
                self.cursor.advance_n(2);
            } else if matches!(self.cursor.current(), ' ' | '\t' | '\n' | '\r' | '\x0c') {
                self.cursor.advance();
            }
            let code = u32::from_str_radix(&hex, 16).map_err(|_| invalid.clone())?;
            let ch = char::from_u32(code).ok_or(invalid)?;
            let mut buf = [0u8; 4];
            let text: &str = ch.encode_utf8(&mut buf);
            return Ok(self.string_fragment(text));
        }

        self.cursor.advance();
        let mut buf = [0u8; 4];
        let text: &str = c.encode_utf8(&mut buf);
        Ok(self.string_fragment(text))
    }

    /// Enters interpolation, remembering the nesting depth the closing
    /// `}` must return to.
    pub(super) fn push_interp(&mut self) {
        let base = self.nesting;
        self.push_mode(Mode::Interp { base });
        self.nesting += 1;
    }
}

fn is_var_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-'
}
