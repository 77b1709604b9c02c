//! Edge case and property tests for kamlc-lex.
