//! Token definitions for the KAML lexer.
//!
//! A token is a kind, an optional payload, and a span. The kind set is
//! closed: keywords, identifiers, literals, operators, single-character
//! punctuation, whitespace and end-of-input.

use std::fmt;

use kamlc_util::{Span, Symbol};

/// The closed set of token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords. Spelled `-def`, `-set`, ... at use sites, except the
    // bare `or` / `and` / `true` / `false`.
    Def,
    Set,
    For,
    If,
    Elif,
    Else,
    Use,
    While,
    Continue,
    Break,
    Return,
    Or,
    And,
    True,
    False,

    // Identifiers. `Id` may carry leading and interior hyphens;
    // `ScopedId` is a `::`-prefixed name chain.
    Id,
    ScopedId,

    // Literals.
    IntLit,
    FloatLit,
    StringLit,

    // Multi-character operators.
    AddEq,
    SubEq,
    MulEq,
    DivEq,
    ModEq,
    AndEq,
    XorEq,
    OrEq,
    Shl,
    Shr,
    ShlEq,
    ShrEq,
    Gte,
    Lte,
    EqEq,
    Ne,

    // Single-character tokens.
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Gt,
    Lt,
    Tilde,
    Bang,
    Caret,
    Amp,
    Pipe,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    Question,
    Colon,
    Semi,
    Comma,
    Hash,
    Dollar,
    Backslash,

    /// Whitespace run; the lexeme is preserved verbatim so the parser can
    /// tell newline-bearing runs from purely horizontal ones.
    Ws,

    /// End of input. Delivered repeatedly once reached.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Def => "DEF",
            TokenKind::Set => "SET",
            TokenKind::For => "FOR",
            TokenKind::If => "IF",
            TokenKind::Elif => "ELIF",
            TokenKind::Else => "ELSE",
            TokenKind::Use => "USE",
            TokenKind::While => "WHILE",
            TokenKind::Continue => "CONTINUE",
            TokenKind::Break => "BREAK",
            TokenKind::Return => "RETURN",
            TokenKind::Or => "OR",
            TokenKind::And => "AND",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Id => "ID",
            TokenKind::ScopedId => "SCOPEDID",
            TokenKind::IntLit => "INT_LIT",
            TokenKind::FloatLit => "FLOAT_LIT",
            TokenKind::StringLit => "STRING_LIT",
            TokenKind::AddEq => "'+='",
            TokenKind::SubEq => "'-='",
            TokenKind::MulEq => "'*='",
            TokenKind::DivEq => "'/='",
            TokenKind::ModEq => "'%='",
            TokenKind::AndEq => "'&='",
            TokenKind::XorEq => "'^='",
            TokenKind::OrEq => "'|='",
            TokenKind::Shl => "'<<'",
            TokenKind::Shr => "'>>'",
            TokenKind::ShlEq => "'<<='",
            TokenKind::ShrEq => "'>>='",
            TokenKind::Gte => "'>='",
            TokenKind::Lte => "'<='",
            TokenKind::EqEq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Assign => "'='",
            TokenKind::Gt => "'>'",
            TokenKind::Lt => "'<'",
            TokenKind::Tilde => "'~'",
            TokenKind::Bang => "'!'",
            TokenKind::Caret => "'^'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Dot => "'.'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",
            TokenKind::Hash => "'#'",
            TokenKind::Dollar => "'$'",
            TokenKind::Backslash => "'\\'",
            TokenKind::Ws => "WS",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// Payload carried by a token, if any.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenValue {
    None,
    Int(i64),
    Float(f64),
    Str(Symbol),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::None => Ok(()),
            TokenValue::Int(v) => write!(f, "{}", v),
            TokenValue::Float(v) => write!(f, "{}", v),
            TokenValue::Str(s) => write!(f, "{:?}", s.as_str()),
        }
    }
}

/// A lexical token.
///
/// Equality is the test-fixture kind: kinds must match, and payloads are
/// compared only when both sides carry one. Spans never participate, so
/// an expected token built with `Span::DUMMY` matches the real thing.
#[derive(Clone, Copy, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, span: Span) -> Self {
        Self { kind, value, span }
    }

    /// A token without a payload.
    pub fn bare(kind: TokenKind, span: Span) -> Self {
        Self::new(kind, TokenValue::None, span)
    }

    /// The string payload, if the token carries one.
    pub fn sym(&self) -> Option<Symbol> {
        match self.value {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }

    pub fn column(&self) -> u32 {
        self.span.column
    }

    /// True for a whitespace token whose lexeme contains a newline.
    /// Such tokens terminate statements.
    pub fn is_newline_ws(&self) -> bool {
        self.kind == TokenKind::Ws
            && self.sym().map(|s| s.as_str().contains('\n')).unwrap_or(false)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (&self.value, &other.value) {
            (TokenValue::None, _) | (_, TokenValue::None) => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            TokenValue::None => write!(f, "{}", self.kind),
            _ => write!(f, "{}({})", self.kind, self.value),
        }
    }
}

/// Maps a scanned identifier lexeme to its keyword kind, if reserved.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "-def" => TokenKind::Def,
        "-set" => TokenKind::Set,
        "-for" => TokenKind::For,
        "-if" => TokenKind::If,
        "-elif" => TokenKind::Elif,
        "-else" => TokenKind::Else,
        "-use" => TokenKind::Use,
        "-while" => TokenKind::While,
        "-continue" => TokenKind::Continue,
        "-break" => TokenKind::Break,
        "-return" => TokenKind::Return,
        "or" => TokenKind::Or,
        "and" => TokenKind::And,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => return None,
    })
}
