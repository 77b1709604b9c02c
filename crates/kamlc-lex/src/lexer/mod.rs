//! The KAML mode-stack lexer.
//!
//! The lexer keeps a stack of [`Mode`]s, each selecting its own rule set.
//! Code is the initial mode; quoted strings, raw `{{{…}}}` blocks and
//! `{…}`/`${…}` interpolations push and pop modes as their delimiters go
//! by. A `nesting` counter of unmatched `{` decides when an interpolation
//! hands control back to its enclosing string.
//!
//! Tokens are produced on demand via [`Lexer::next_token`]. String
//! delimiters emit empty `STRING_LIT` anchors; the
//! [`TokenStream`](crate::TokenStream) shaper fuses those with adjacent
//! fragments downstream.

mod comment;
mod string;

use kamlc_util::{Handler, Span, Symbol};

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{keyword, Token, TokenKind, TokenValue};

/// A lexical mode. Each mode owns a distinct token alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Keywords, identifiers, numbers, operators, punctuation.
    Code,
    /// Inside `'…'`.
    SString,
    /// Inside `"…"`.
    DString,
    /// Inside `{{{…}}}`.
    RawStr,
    /// Inside `{…}` or `${…}` embedded in a string mode. `base` is the
    /// value `nesting` must return to for this interpolation to close.
    Interp { base: u32 },
    /// Inside `/* … */`.
    Comment,
}

/// A pushed mode plus where its opener started, for unterminated-region
/// reporting.
struct ModeFrame {
    mode: Mode,
    line: u32,
    column: u32,
}

/// The KAML lexer.
///
/// # Example
///
/// ```
/// use kamlc_util::Handler;
/// use kamlc_lex::{Lexer, TokenKind};
///
/// let handler = Handler::new();
/// let mut lexer = Lexer::new("-set x = 1;", &handler);
/// assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Set);
/// ```
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    handler: &'a Handler,
    modes: Vec<ModeFrame>,
    nesting: u32,
    token_start: usize,
    token_line: u32,
    token_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            modes: vec![ModeFrame {
                mode: Mode::Code,
                line: 1,
                column: 1,
            }],
            nesting: 0,
            token_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Produces the next token.
    ///
    /// Returns `TokenKind::Eof` repeatedly once the input is exhausted.
    /// Reaching the end inside a pushed mode is an error.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.mark_start();
            let produced = match self.mode() {
                Mode::Code => self.code_token()?,
                Mode::Interp { base } => self.interp_token(base)?,
                Mode::SString => self.quoted_token('\'')?,
                Mode::DString => self.quoted_token('"')?,
                Mode::RawStr => self.raw_token()?,
                // Only reachable when resuming after an error surfaced
                // mid-comment; finish consuming it.
                Mode::Comment => {
                    self.finish_block_comment()?;
                    None
                }
            };
            if let Some(token) = produced {
                return Ok(token);
            }
        }
    }

    /// The active mode.
    pub fn mode(&self) -> Mode {
        self.modes.last().map(|f| f.mode).unwrap_or(Mode::Code)
    }

    /// Depth of the mode stack; 1 means only code mode is active.
    pub fn mode_depth(&self) -> usize {
        self.modes.len()
    }

    /// Count of unmatched `{` inside interpolations.
    pub fn nesting(&self) -> u32 {
        self.nesting
    }

    // ------------------------------------------------------------------
    // Code mode
    // ------------------------------------------------------------------

    fn code_token(&mut self) -> Result<Option<Token>, LexError> {
        if self.cursor.is_at_end() {
            return Ok(Some(self.bare(TokenKind::Eof)));
        }

        let c = self.cursor.current();
        match c {
            '/' if self.cursor.peek(1) == '/' => {
                self.line_comment();
                Ok(None)
            }
            '/' if self.cursor.peek(1) == '*' => {
                self.cursor.advance_n(2);
                self.push_mode(Mode::Comment);
                self.finish_block_comment()?;
                Ok(None)
            }

            c if is_space(c) => Ok(Some(self.whitespace_run())),

            '\'' => {
                self.cursor.advance();
                self.push_mode(Mode::SString);
                Ok(Some(self.anchor()))
            }
            '"' => {
                self.cursor.advance();
                self.push_mode(Mode::DString);
                Ok(Some(self.anchor()))
            }
            // The raw opener must win over a plain '{'.
            '{' if self.cursor.starts_with("{{{") => {
                self.cursor.advance_n(3);
                self.push_mode(Mode::RawStr);
                Ok(Some(self.anchor()))
            }

            c if is_name_start(c) => Ok(Some(self.identifier())),
            '-' if is_name_start(self.cursor.peek(1)) => Ok(Some(self.identifier())),

            c if c.is_ascii_digit() => self.number().map(Some),

            ':' if self.cursor.peek(1) == ':' && is_name_start(self.cursor.peek(2)) => {
                Ok(Some(self.scoped_id()))
            }

            _ => self.operator().map(Some),
        }
    }

    fn interp_token(&mut self, base: u32) -> Result<Option<Token>, LexError> {
        if self.cursor.is_at_end() {
            let (line, column) = self.mode_origin();
            return Err(LexError::UnterminatedInterpolation { line, column });
        }
        match self.cursor.current() {
            '{' => {
                self.cursor.advance();
                self.nesting += 1;
                Ok(Some(self.bare(TokenKind::LBrace)))
            }
            '}' => {
                self.cursor.advance();
                self.nesting -= 1;
                if self.nesting == base {
                    self.pop_mode();
                    Ok(None)
                } else {
                    Ok(Some(self.bare(TokenKind::RBrace)))
                }
            }
            _ => self.code_token(),
        }
    }

    /// Lexes an identifier or keyword. Identifiers may begin with `-`
    /// (when a letter or underscore follows) and may contain interior
    /// hyphens; reserved lexemes become keyword tokens.
    fn identifier(&mut self) -> Token {
        if self.cursor.current() == '-' {
            self.cursor.advance();
        }
        self.cursor.advance();
        self.cursor.eat_while(is_name_continue);
        let text = self.cursor.slice_from(self.token_start);
        let kind = keyword(text).unwrap_or(TokenKind::Id);
        self.token(kind, TokenValue::Str(Symbol::intern(text)))
    }

    /// Lexes a `::`-prefixed scoped name, possibly chained
    /// (`::a`, `::a::b`).
    fn scoped_id(&mut self) -> Token {
        loop {
            self.cursor.advance_n(2);
            self.cursor.eat_while(is_name_continue);
            if !(self.cursor.starts_with("::") && is_name_start(self.cursor.peek(2))) {
                break;
            }
        }
        let text = self.cursor.slice_from(self.token_start);
        self.token(TokenKind::ScopedId, TokenValue::Str(Symbol::intern(text)))
    }

    /// Lexes a numeric literal.
    ///
    /// Priority order: float (`digits.digits`), then octal (`0[1-7]+`),
    /// then hex (`0x…`), then decimal (`0` or `[1-9][0-9]*`).
    fn number(&mut self) -> Result<Token, LexError> {
        let mut ahead = 0;
        while self.cursor.peek(ahead).is_ascii_digit() {
            ahead += 1;
        }
        if self.cursor.peek(ahead) == '.' && self.cursor.peek(ahead + 1).is_ascii_digit() {
            self.cursor.advance_n(ahead + 1);
            self.cursor.eat_while(|c| c.is_ascii_digit());
            let text = self.cursor.slice_from(self.token_start);
            let value: f64 = text
                .parse()
                .map_err(|_| self.number_error("not a valid float"))?;
            return Ok(self.token(TokenKind::FloatLit, TokenValue::Float(value)));
        }

        if self.cursor.current() == '0' {
            match self.cursor.peek(1) {
                'x' | 'X' => {
                    self.cursor.advance_n(2);
                    let digits = self.cursor.eat_while(|c| c.is_ascii_hexdigit());
                    if digits.is_empty() {
                        return Err(self.number_error("missing digits after '0x'"));
                    }
                    let value = i64::from_str_radix(digits, 16)
                        .map_err(|_| self.number_error("hex literal out of range"))?;
                    return Ok(self.token(TokenKind::IntLit, TokenValue::Int(value)));
                }
                '1'..='7' => {
                    self.cursor.advance();
                    let digits = self.cursor.eat_while(|c| ('1'..='7').contains(&c));
                    let value = i64::from_str_radix(digits, 8)
                        .map_err(|_| self.number_error("octal literal out of range"))?;
                    return Ok(self.token(TokenKind::IntLit, TokenValue::Int(value)));
                }
                _ => {
                    self.cursor.advance();
                    return Ok(self.token(TokenKind::IntLit, TokenValue::Int(0)));
                }
            }
        }

        let digits = self.cursor.eat_while(|c| c.is_ascii_digit());
        let value: i64 = digits
            .parse()
            .map_err(|_| self.number_error("integer literal out of range"))?;
        Ok(self.token(TokenKind::IntLit, TokenValue::Int(value)))
    }

    /// Lexes operators and punctuation, longest match first.
    fn operator(&mut self) -> Result<Token, LexError> {
        if self.cursor.starts_with("<<=") {
            self.cursor.advance_n(3);
            return Ok(self.bare(TokenKind::ShlEq));
        }
        if self.cursor.starts_with(">>=") {
            self.cursor.advance_n(3);
            return Ok(self.bare(TokenKind::ShrEq));
        }

        let c = self.cursor.current();
        let two = match (c, self.cursor.peek(1)) {
            ('<', '<') => Some(TokenKind::Shl),
            ('>', '>') => Some(TokenKind::Shr),
            ('<', '=') => Some(TokenKind::Lte),
            ('>', '=') => Some(TokenKind::Gte),
            ('=', '=') => Some(TokenKind::EqEq),
            ('!', '=') => Some(TokenKind::Ne),
            ('+', '=') => Some(TokenKind::AddEq),
            ('-', '=') => Some(TokenKind::SubEq),
            ('*', '=') => Some(TokenKind::MulEq),
            ('/', '=') => Some(TokenKind::DivEq),
            ('%', '=') => Some(TokenKind::ModEq),
            ('&', '=') => Some(TokenKind::AndEq),
            ('^', '=') => Some(TokenKind::XorEq),
            ('|', '=') => Some(TokenKind::OrEq),
            // Symbolic spellings of the word operators.
            ('&', '&') => Some(TokenKind::And),
            ('|', '|') => Some(TokenKind::Or),
            _ => None,
        };
        if let Some(kind) = two {
            self.cursor.advance_n(2);
            let text = self.cursor.slice_from(self.token_start);
            if matches!(kind, TokenKind::And | TokenKind::Or) {
                return Ok(self.token(kind, TokenValue::Str(Symbol::intern(text))));
            }
            return Ok(self.bare(kind));
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Assign,
            '>' => TokenKind::Gt,
            '<' => TokenKind::Lt,
            '~' => TokenKind::Tilde,
            '!' => TokenKind::Bang,
            '^' => TokenKind::Caret,
            '&' => TokenKind::Amp,
            '|' => TokenKind::Pipe,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            '#' => TokenKind::Hash,
            '$' => TokenKind::Dollar,
            '\\' => TokenKind::Backslash,
            ch => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    line: self.token_line,
                    column: self.token_column,
                });
            }
        };
        self.cursor.advance();
        Ok(self.bare(kind))
    }

    /// Consumes a maximal whitespace run, preserving the lexeme.
    ///
    /// Newline-vs-space is semantic (statement terminators), so the run
    /// is carried verbatim rather than collapsed.
    fn whitespace_run(&mut self) -> Token {
        let run = self.cursor.eat_while(is_space);
        self.token(TokenKind::Ws, TokenValue::Str(Symbol::intern(run)))
    }

    fn line_comment(&mut self) {
        self.cursor.advance_n(2);
        // Leave the newline for the whitespace rule; it may terminate a
        // statement.
        self.cursor.eat_while(|c| c != '\n');
    }

    // ------------------------------------------------------------------
    // Shared plumbing
    // ------------------------------------------------------------------

    fn mark_start(&mut self) {
        self.token_start = self.cursor.position();
        self.token_line = self.cursor.line();
        self.token_column = self.cursor.column();
    }

    fn token_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_line,
            self.token_column,
        )
    }

    fn token(&self, kind: TokenKind, value: TokenValue) -> Token {
        Token::new(kind, value, self.token_span())
    }

    fn bare(&self, kind: TokenKind) -> Token {
        Token::bare(kind, self.token_span())
    }

    /// Empty `STRING_LIT` emitted at string delimiters; the shaper fuses
    /// it with neighboring fragments.
    fn anchor(&self) -> Token {
        self.token(TokenKind::StringLit, TokenValue::Str(Symbol::intern("")))
    }

    fn string_fragment(&self, text: &str) -> Token {
        self.token(TokenKind::StringLit, TokenValue::Str(Symbol::intern(text)))
    }

    fn push_mode(&mut self, mode: Mode) {
        self.modes.push(ModeFrame {
            mode,
            line: self.token_line,
            column: self.token_column,
        });
    }

    fn pop_mode(&mut self) {
        if self.modes.len() > 1 {
            self.modes.pop();
        }
    }

    /// Where the innermost pushed mode was opened.
    fn mode_origin(&self) -> (u32, u32) {
        self.modes
            .last()
            .map(|f| (f.line, f.column))
            .unwrap_or((self.token_line, self.token_column))
    }

    fn number_error(&self, reason: &str) -> LexError {
        LexError::InvalidNumber {
            line: self.token_line,
            column: self.token_column,
            reason: reason.to_owned(),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}
