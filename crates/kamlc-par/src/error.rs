//! Parse-time error types.
//!
//! The parser recovers nothing: the first error aborts the `parse` call
//! and no partial tree is emitted. Lexical errors pass through; syntax
//! errors render the expected/actual pair; semantic errors cover the
//! parse-time checks (compile-time calls, parameter-sequence
//! invariants); importer failures surface unrecovered.

use std::path::PathBuf;

use thiserror::Error;

use kamlc_lex::LexError;

/// Any error aborting a parse.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Expecting {expected} but got {found} at {line}:{column}")]
    Syntax {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    #[error("{message} at {line}:{column}")]
    Semantic {
        message: String,
        line: u32,
        column: u32,
    },

    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Failures surfaced by the package importer.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not find `{name}` in search paths {searched:?}")]
    NotFound {
        name: String,
        searched: Vec<PathBuf>,
    },

    #[error("already imported {}", path.display())]
    AlreadyImported { path: PathBuf },

    #[error("error parsing imported package `{name}`: {source}")]
    Parse {
        name: String,
        #[source]
        source: Box<ParseError>,
    },
}
