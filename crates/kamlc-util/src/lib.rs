//! kamlc-util - Foundation types for the KAML front-end.
//!
//! This crate provides the small set of types shared by every phase of the
//! front-end: source spans, interned symbols, and the diagnostic handler
//! used for non-fatal reports. It carries no knowledge of KAML itself.

pub mod diagnostic;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use span::Span;
pub use symbol::Symbol;

// Re-export the hash containers used throughout the front-end so the
// phase crates agree on one hasher.
pub use rustc_hash::{FxHashMap, FxHashSet};
