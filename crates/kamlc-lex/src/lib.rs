//! kamlc-lex - Lexical analysis for KAML.
//!
//! The front half of the KAML front-end: a hand-written lexer with a
//! stack of exclusive modes (code, single- and double-quoted strings,
//! raw `{{{…}}}` blocks, `{…}`/`${…}` interpolation, block comments) and
//! the [`TokenStream`] shaper that fuses adjacent string fragments and
//! provides lookahead/pushback for the parser.
//!
//! # Example
//!
//! ```
//! use kamlc_util::Handler;
//! use kamlc_lex::{TokenStream, TokenKind};
//!
//! let handler = Handler::new();
//! let mut stream = TokenStream::new("'AB' 'CD'", &handler);
//! let tok = stream.next(true).unwrap();
//! assert_eq!(tok.kind, TokenKind::StringLit);
//! assert_eq!(tok.sym().unwrap().as_str(), "ABCD");
//! ```

pub mod cursor;
mod edge_cases;
pub mod error;
pub mod lexer;
pub mod stream;
pub mod token;

pub use error::LexError;
pub use lexer::{Lexer, Mode};
pub use stream::TokenStream;
pub use token::{keyword, Token, TokenKind, TokenValue};
