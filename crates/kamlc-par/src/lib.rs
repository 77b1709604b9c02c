//! kamlc-par - Recursive-descent parser for KAML.
//!
//! Consumes the shaped token stream from `kamlc-lex` and produces the
//! [`ast::Node`] tree. The parser drives the stream with one-token
//! lookahead, threads a [`scope::Scope`] through its productions so
//! compile-time function references can be recognized, and consults a
//! [`importer::PackageImporter`] for `-use` statements.
//!
//! # Example
//!
//! ```
//! use kamlc_util::Handler;
//! use kamlc_par::{ast::Node, Parser};
//!
//! let handler = Handler::new();
//! let mut parser = Parser::new("-def fn(x){}", &handler);
//! let tree = parser.parse().unwrap();
//! assert!(matches!(tree, Node::TranslationUnit(_)));
//! ```

pub mod ast;
mod edge_cases;
pub mod error;
pub mod expr;
pub mod importer;
pub mod param;
pub mod scope;
pub mod stmt;

use kamlc_util::Handler;

use kamlc_lex::{Token, TokenKind, TokenStream, TokenValue};

use crate::ast::{ElseArm, FuncDecl, FuncDef, IfStmt, Node, Suite, UseChild, UseRoot, UseStmt};
use crate::error::ParseError;
use crate::importer::PackageImporter;
use crate::scope::{Binding, Scope};

pub use crate::error::ImportError;
pub use crate::importer::FsImporter;

/// Hook invoked for compile-time function calls recognized during
/// parsing. The returned tree is spliced in at the call site.
pub trait CompileTimeEval {
    fn call(&mut self, func: &FuncDef, scope: &mut Scope) -> Result<Node, ParseError>;
}

/// The recursive-descent KAML parser.
pub struct Parser<'a> {
    stream: TokenStream<'a>,
    scope: Scope,
    importer: Option<Box<dyn PackageImporter>>,
    evaluator: Option<Box<dyn CompileTimeEval>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            stream: TokenStream::new(source, handler),
            scope: Scope::new(),
            importer: None,
            evaluator: None,
        }
    }

    /// Attaches a package importer; `-use` statements then splice in the
    /// imported tree.
    pub fn with_importer(mut self, importer: Box<dyn PackageImporter>) -> Self {
        self.importer = Some(importer);
        self
    }

    /// Attaches a compile-time function evaluator.
    pub fn with_evaluator(mut self, evaluator: Box<dyn CompileTimeEval>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Parses the whole input into a `TranslationUnit`, or `Empty` for
    /// blank input. No partial tree is produced on error.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        self.translation_unit()
    }

    /// Scope depth, exposed for balance assertions in tests.
    pub fn scope_depth(&self) -> usize {
        self.scope.depth()
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    /// Consumes the next token.
    pub(crate) fn t(&mut self, filter_ws: bool) -> Result<Token, ParseError> {
        Ok(self.stream.next(filter_ws)?)
    }

    /// Peeks at the next token.
    pub(crate) fn la(&mut self, filter_ws: bool) -> Result<Token, ParseError> {
        Ok(self.stream.lookahead(1, filter_ws)?)
    }

    /// Consumes a token of the given kind or fails.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.t(true)?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.syntax_error(&kind.to_string(), token))
        }
    }

    /// Consumes an `ID` token and returns its name.
    pub(crate) fn ident(&mut self) -> Result<kamlc_util::Symbol, ParseError> {
        let token = self.expect(TokenKind::Id)?;
        match token.value {
            TokenValue::Str(sym) => Ok(sym),
            _ => Err(self.syntax_error("ID", token)),
        }
    }

    pub(crate) fn syntax_error(&self, expected: &str, found: Token) -> ParseError {
        ParseError::Syntax {
            expected: expected.to_owned(),
            found: found.to_string(),
            line: found.line(),
            column: found.column(),
        }
    }

    pub(crate) fn semantic_error(&self, message: impl Into<String>, at: Token) -> ParseError {
        ParseError::Semantic {
            message: message.into(),
            line: at.line(),
            column: at.column(),
        }
    }

    /// Runs `body` inside a pushed scope frame, popping on every exit
    /// path.
    pub(crate) fn scoped<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.scope.push();
        let out = body(self);
        self.scope.pop();
        out
    }

    // ------------------------------------------------------------------
    // Top-level productions
    // ------------------------------------------------------------------

    fn translation_unit(&mut self) -> Result<Node, ParseError> {
        let mut items = Vec::new();
        loop {
            let la = self.la(true)?;
            let item = match la.kind {
                TokenKind::Eof => break,
                TokenKind::Use => self.use_stmt()?,
                TokenKind::Def => self.func_def()?,
                _ => self.block_item()?,
            };
            items.push(item);
        }
        if items.is_empty() {
            Ok(Node::Empty)
        } else {
            Ok(Node::TranslationUnit(items))
        }
    }

    /// `use-stmt -> USE ID (':' (ID | '*'))* ';'`, nesting left. With an
    /// importer attached, the imported tree replaces the statement.
    fn use_stmt(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::Use)?;
        let root = self.ident()?;
        let mut target = UseStmt::name(root);

        while self.la(true)?.kind == TokenKind::Colon {
            self.expect(TokenKind::Colon)?;
            let token = self.t(true)?;
            let child = match token.kind {
                TokenKind::Star => UseChild::Glob,
                TokenKind::Id => match token.value {
                    TokenValue::Str(sym) => UseChild::Name(sym),
                    _ => return Err(self.syntax_error("ID or '*'", token)),
                },
                _ => return Err(self.syntax_error("ID or '*'", token)),
            };
            let terminal = child == UseChild::Glob;
            target = match target.child {
                UseChild::None => UseStmt {
                    root: target.root,
                    child,
                },
                _ => UseStmt {
                    root: UseRoot::Chain(Box::new(target)),
                    child,
                },
            };
            if terminal {
                break;
            }
        }

        self.expect(TokenKind::Semi)?;

        match self.importer.as_mut() {
            Some(importer) => Ok(importer.import_package(&target.dotted())?),
            None => Ok(Node::Use(target)),
        }
    }

    /// `func-def -> DEF (ID | STRING_LIT) param-seq suite`. A string
    /// literal name marks the definition as compile-time.
    fn func_def(&mut self) -> Result<Node, ParseError> {
        let decl = self.func_decl()?;
        let body = self.suite()?;
        let def = FuncDef { decl, body };
        self.scope.bind(def.decl.name, Binding::Func(def.clone()));
        Ok(Node::FuncDef(def))
    }

    fn func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        self.expect(TokenKind::Def)?;
        let token = self.t(true)?;
        let (name, compile_time) = match (token.kind, token.value) {
            (TokenKind::Id, TokenValue::Str(sym)) => (sym, false),
            (TokenKind::StringLit, TokenValue::Str(sym)) => (sym, true),
            _ => return Err(self.syntax_error("ID or STRING_LIT", token)),
        };
        let params = self.param_seq_decl()?;
        Ok(FuncDecl {
            name,
            params,
            compile_time,
        })
    }

    /// `suite -> '{' block-item* '}'`. Exactly one scope frame.
    pub(crate) fn suite(&mut self) -> Result<Suite, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let items = self.scoped(|p| {
            let mut items = Vec::new();
            loop {
                let la = p.la(true)?;
                match la.kind {
                    TokenKind::RBrace => break,
                    TokenKind::Eof => return Err(p.syntax_error("'}'", la)),
                    TokenKind::Def => items.push(p.func_def()?),
                    _ => items.push(p.block_item()?),
                }
            }
            Ok(items)
        })?;
        self.expect(TokenKind::RBrace)?;
        Ok(Suite::new(items))
    }

    /// Builds the `-if`/`-elif`/`-else` chain after the introducing
    /// keyword has been consumed.
    pub(crate) fn if_tail(&mut self) -> Result<IfStmt, ParseError> {
        self.expect(TokenKind::LParen)?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen)?;
        let then = self.suite()?;

        let orelse = match self.la(true)?.kind {
            TokenKind::Elif => {
                self.expect(TokenKind::Elif)?;
                Some(Box::new(ElseArm::If(Box::new(self.if_tail()?))))
            }
            TokenKind::Else => {
                self.expect(TokenKind::Else)?;
                Some(Box::new(ElseArm::Suite(self.suite()?)))
            }
            _ => None,
        };

        Ok(IfStmt {
            cond: Box::new(cond),
            then,
            orelse,
        })
    }

    /// Invokes the compile-time evaluator for `def`, bracketed by a
    /// scope frame that is popped on every exit path.
    pub(crate) fn call_compile_time(
        &mut self,
        def: &FuncDef,
        at: Token,
    ) -> Result<Node, ParseError> {
        if self.evaluator.is_none() {
            return Err(self.semantic_error(
                format!(
                    "compile-time function <{}> cannot be evaluated here: no evaluator configured",
                    def.decl.name
                ),
                at,
            ));
        }
        self.scope.push();
        let out = match self.evaluator.as_mut() {
            Some(evaluator) => evaluator.call(def, &mut self.scope),
            None => Ok(Node::Empty),
        };
        self.scope.pop();
        out
    }

    /// Looks up `name` and, when it resolves to a function definition,
    /// returns it for compile-time handling.
    pub(crate) fn bound_function(&self, name: kamlc_util::Symbol) -> Option<FuncDef> {
        match self.scope.lookup(name) {
            Some(Binding::Func(def)) => Some(def.clone()),
            _ => None,
        }
    }
}
