//! String interning.
//!
//! A [`Symbol`] is a 4-byte handle to a string stored once in a global,
//! thread-safe table. Identifiers, keywords, string fragments and
//! whitespace lexemes all pass through here, so token and AST equality
//! reduce to integer comparisons.
//!
//! Interned strings live for the remainder of the process; the total is
//! bounded by the source text, which makes the leak acceptable.
//!
//! # Example
//!
//! ```
//! use kamlc_util::Symbol;
//!
//! let a = Symbol::intern("hello");
//! let b = Symbol::intern("hello");
//! let c = Symbol::intern("world");
//!
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! assert_eq!(a.as_str(), "hello");
//! ```

mod interner;

use std::fmt;

/// An interned string handle.
///
/// Two symbols are equal iff they were interned from equal strings.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Interns `string`, returning its symbol.
    ///
    /// Safe to call from multiple threads; the same string always yields
    /// the same symbol.
    pub fn intern(string: &str) -> Self {
        Symbol(interner::intern(string))
    }

    /// Returns the interned string.
    pub fn as_str(self) -> &'static str {
        interner::resolve(self.0)
    }

    /// Returns the raw table index, for debugging.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// True if the interned string is empty.
    pub fn is_empty(self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
