//! Statement parsing.
//!
//! `block-item` dispatches on the leading token kind; everything else is
//! an expression statement. Statements end at a `;` or at a whitespace
//! token containing a newline; the closing brace of a suite (or the end
//! of input) also ends the final statement. Terminator checks are the
//! one place the parser asks the stream for unfiltered tokens.

use kamlc_lex::TokenKind;

use crate::ast::{ForStmt, Node, ReturnStmt, SetStmt, WhileStmt};
use crate::error::ParseError;
use crate::Parser;

impl<'a> Parser<'a> {
    /// One statement of a suite or the top level.
    pub(crate) fn block_item(&mut self) -> Result<Node, ParseError> {
        let la = self.la(true)?;
        match la.kind {
            TokenKind::Set => self.set_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Break => self.break_stmt(),
            TokenKind::Continue => self.continue_stmt(),
            TokenKind::LBrace => Ok(Node::Suite(self.suite()?)),
            _ => self.expr_stmt(),
        }
    }

    fn set_stmt(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::Set)?;
        let name = self.ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.expr()?;
        self.end_of_stmt()?;
        Ok(Node::Set(SetStmt {
            name,
            value: Box::new(value),
        }))
    }

    fn if_stmt(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::If)?;
        Ok(Node::If(self.if_tail()?))
    }

    fn while_stmt(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.suite()?;
        Ok(Node::While(WhileStmt {
            cond: Box::new(cond),
            body,
        }))
    }

    /// `-for (init; cond; step) { … }`; every header slot may be empty.
    fn for_stmt(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;
        let init = self.for_slot(TokenKind::Semi)?;
        self.expect(TokenKind::Semi)?;
        let cond = self.for_slot(TokenKind::Semi)?;
        self.expect(TokenKind::Semi)?;
        let step = self.for_slot(TokenKind::RParen)?;
        self.expect(TokenKind::RParen)?;
        let body = self.suite()?;
        Ok(Node::For(ForStmt {
            init: Box::new(init),
            cond: Box::new(cond),
            step: Box::new(step),
            body,
        }))
    }

    fn for_slot(&mut self, delimiter: TokenKind) -> Result<Node, ParseError> {
        if self.la(true)?.kind == delimiter {
            Ok(Node::Empty)
        } else {
            self.expr()
        }
    }

    fn return_stmt(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::Return)?;
        let la = self.la(false)?;
        let expr = if self.is_stmt_end(la.kind) || la.is_newline_ws() {
            None
        } else {
            Some(Box::new(self.expr()?))
        };
        self.end_of_stmt()?;
        Ok(Node::Return(ReturnStmt { expr }))
    }

    fn break_stmt(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::Break)?;
        self.end_of_stmt()?;
        Ok(Node::Break)
    }

    fn continue_stmt(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::Continue)?;
        self.end_of_stmt()?;
        Ok(Node::Continue)
    }

    /// Expression statement. The terminator is optional: interpolated
    /// template text arrives as back-to-back fragments with nothing in
    /// between, so a following token simply starts the next item.
    fn expr_stmt(&mut self) -> Result<Node, ParseError> {
        let expr = self.expr()?;
        self.opt_end_of_stmt()?;
        Ok(expr)
    }

    fn is_stmt_end(&self, kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof
        )
    }

    /// Consumes a statement terminator: `;` or a newline-bearing
    /// whitespace token. A lookahead `}` or end of input terminates the
    /// statement without being consumed. Horizontal whitespace before
    /// the terminator is skipped.
    pub(crate) fn end_of_stmt(&mut self) -> Result<(), ParseError> {
        loop {
            let la = self.la(false)?;
            match la.kind {
                TokenKind::Semi => {
                    self.t(false)?;
                    return Ok(());
                }
                TokenKind::Ws => {
                    let ws = self.t(false)?;
                    if ws.is_newline_ws() {
                        return Ok(());
                    }
                    // Horizontal space; keep scanning for the real
                    // terminator.
                }
                TokenKind::RBrace | TokenKind::Eof => return Ok(()),
                _ => return Err(self.syntax_error("';'", la)),
            }
        }
    }

    /// Like [`Parser::end_of_stmt`] but tolerant: consumes a `;` or a
    /// newline run when present and otherwise leaves the stream alone.
    fn opt_end_of_stmt(&mut self) -> Result<(), ParseError> {
        loop {
            let la = self.la(false)?;
            match la.kind {
                TokenKind::Semi => {
                    self.t(false)?;
                    return Ok(());
                }
                TokenKind::Ws => {
                    let ws = self.t(false)?;
                    if ws.is_newline_ws() {
                        return Ok(());
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}
