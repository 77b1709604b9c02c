//! Block comment consumption.
//!
//! `/* … */` regions are entered through the mode stack and discarded
//! wholesale. An escaped `\*/` does not close the region. Block comments
//! do not nest; an interior `/*` is reported through the handler but the
//! region keeps scanning (errors in a dropped region never abort).

use kamlc_util::Span;

use super::Lexer;
use crate::error::LexError;

impl<'a> Lexer<'a> {
    /// Consumes the remainder of a block comment and pops the comment
    /// mode. The opener `/*` has already been consumed and the mode
    /// pushed.
    pub(super) fn finish_block_comment(&mut self) -> Result<(), LexError> {
        loop {
            if self.cursor.is_at_end() {
                let (line, column) = self.mode_origin();
                return Err(LexError::UnterminatedComment { line, column });
            }
            if self.cursor.current() == '\\'
                && self.cursor.peek(1) == '*'
                && self.cursor.peek(2) == '/'
            {
                self.cursor.advance_n(3);
                continue;
            }
            if self.cursor.starts_with("*/") {
                self.cursor.advance_n(2);
                self.pop_mode();
                return Ok(());
            }
            if self.cursor.starts_with("/*") {
                let span = Span::point(
                    self.cursor.position(),
                    self.cursor.line(),
                    self.cursor.column(),
                );
                self.handler
                    .note("block comments do not nest; '/*' ignored inside a comment", span);
                self.cursor.advance_n(2);
                continue;
            }
            self.cursor.advance();
        }
    }
}
