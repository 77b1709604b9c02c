//! Edge case tests for kamlc-par.
