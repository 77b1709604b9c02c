//! Parameter-sequence parsing for declarations and calls.
//!
//! Declarations and calls share the surface:
//! `#id` then `.class`es then `[key=value, …]` then `( … )`. In a
//! declaration the parenthesized entries are variable declarations; in a
//! call they are argument expressions. List entries are separated by any
//! mix of whitespace and a comma.
//!
//! Parameter positions are also where compile-time functions fire: an
//! identifier bound to a compile-time `FuncDef` is evaluated on the spot
//! and the resulting subtree spliced into the sequence.

use kamlc_lex::{Token, TokenKind};

use crate::ast::{DotDecl, HashDecl, KWArgDecl, Node, ParamSeq, VariableDecl};
use crate::error::ParseError;
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses the parameter sequence of a function declaration:
    /// `(#ID)? (.ID)* ([kwargs])? ('(' positional ')')?` - every part
    /// optional.
    pub(crate) fn param_seq_decl(&mut self) -> Result<ParamSeq, ParseError> {
        let mut params = ParamSeq::default();
        loop {
            let la = self.la(true)?;
            match la.kind {
                TokenKind::Hash => {
                    let at = self.t(true)?;
                    let name = self.ident()?;
                    self.seq_push(&mut params, Node::Hash(HashDecl { name }), at)?;
                }
                TokenKind::Dot => {
                    let at = self.t(true)?;
                    let name = self.ident()?;
                    self.seq_push(&mut params, Node::DotArg(DotDecl { name }), at)?;
                }
                TokenKind::LBracket => {
                    let group = self.kwarg_group()?;
                    self.seq_push(&mut params, Node::KWArgs(group), la)?;
                }
                TokenKind::LParen => {
                    self.positional_decls(&mut params)?;
                    break;
                }
                _ => break,
            }
        }
        Ok(params)
    }

    /// Parses call arguments: the same decoration surface, with
    /// arbitrary expressions in the parentheses.
    pub(crate) fn call_params(&mut self) -> Result<ParamSeq, ParseError> {
        let mut params = ParamSeq::default();

        if self.la(true)?.kind == TokenKind::Hash {
            loop {
                let la = self.la(true)?;
                match la.kind {
                    TokenKind::Hash => {
                        let at = self.t(true)?;
                        let name = self.ident()?;
                        self.seq_push(&mut params, Node::Hash(HashDecl { name }), at)?;
                    }
                    TokenKind::Dot => {
                        let at = self.t(true)?;
                        let name = self.ident()?;
                        self.seq_push(&mut params, Node::DotArg(DotDecl { name }), at)?;
                    }
                    TokenKind::LBracket => {
                        let group = self.kwarg_group()?;
                        self.seq_push(&mut params, Node::KWArgs(group), la)?;
                    }
                    _ => break,
                }
            }
        }

        if self.la(true)?.kind == TokenKind::LParen {
            self.t(true)?;
            loop {
                let la = self.la(true)?;
                if la.kind == TokenKind::RParen {
                    break;
                }
                let arg = self.expr()?;
                self.seq_push(&mut params, arg, la)?;
                self.list_sep(true)?;
            }
            self.expect(TokenKind::RParen)?;
        }

        Ok(params)
    }

    /// `'[' (ID ('=' expression)? sep*)* ']'`.
    fn kwarg_group(&mut self) -> Result<KWArgDecl, ParseError> {
        self.expect(TokenKind::LBracket)?;
        let mut group = KWArgDecl::default();
        loop {
            let la = self.la(true)?;
            if la.kind == TokenKind::RBracket {
                break;
            }
            let name = self.ident()?;
            let value = if self.la(true)?.kind == TokenKind::Assign {
                self.t(true)?;
                self.expr()?
            } else {
                Node::Empty
            };
            if group.kwargs.insert(name, value).is_some() {
                return Err(
                    self.semantic_error(format!("duplicate keyword parameter '{}'", name), la)
                );
            }
            self.list_sep(true)?;
        }
        self.expect(TokenKind::RBracket)?;
        Ok(group)
    }

    /// `'(' (param-def sep*)* ')'` for declarations.
    fn positional_decls(&mut self, params: &mut ParamSeq) -> Result<(), ParseError> {
        self.expect(TokenKind::LParen)?;
        loop {
            let la = self.la(true)?;
            if la.kind == TokenKind::RParen {
                break;
            }
            let item = self.param_def()?;
            self.seq_push(params, item, la)?;
            self.list_sep(true)?;
        }
        self.expect(TokenKind::RParen)?;
        Ok(())
    }

    /// One declared parameter, or a compile-time function splice.
    fn param_def(&mut self) -> Result<Node, ParseError> {
        let at = self.la(true)?;
        let name = self.ident()?;

        if let Some(def) = self.bound_function(name) {
            if def.decl.compile_time {
                return self.call_compile_time(&def, at);
            }
            return Err(self.semantic_error(
                format!("Tried to call a function <{}> that is not compile time", name),
                at,
            ));
        }

        if self.la(true)?.kind == TokenKind::Assign {
            self.t(true)?;
            let init = self.expr()?;
            Ok(Node::VarDecl(VariableDecl::new(name, init)))
        } else {
            Ok(Node::VarDecl(VariableDecl::bare(name)))
        }
    }

    /// Consumes a list separator: whitespace and/or one comma. Reports
    /// an error only when a separator was mandatory and absent.
    pub(crate) fn list_sep(&mut self, could_be_end: bool) -> Result<bool, ParseError> {
        let mut seen = false;
        loop {
            let la = self.la(false)?;
            if la.kind == TokenKind::Ws {
                self.t(false)?;
                seen = true;
            } else {
                break;
            }
        }
        if self.la(false)?.kind == TokenKind::Comma {
            self.t(false)?;
            seen = true;
            loop {
                let la = self.la(false)?;
                if la.kind == TokenKind::Ws {
                    self.t(false)?;
                } else {
                    break;
                }
            }
        }
        if !seen && !could_be_end {
            let la = self.la(false)?;
            return Err(self.syntax_error("a list separator (',' or whitespace)", la));
        }
        Ok(seen)
    }

    fn seq_push(&mut self, params: &mut ParamSeq, item: Node, at: Token) -> Result<(), ParseError> {
        params
            .push(item)
            .map_err(|e| self.semantic_error(e.to_string(), at))
    }
}
