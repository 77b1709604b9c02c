//! Expression parsing via precedence climbing.
//!
//! One Pratt loop covers the whole layered grammar. Binding powers run
//! from the right-associative assignment/ternary level up to the
//! multiplicative operators; unary prefixes and the postfix forms
//! (`.attr`, `[index]`, `(call)`, scoped names) sit above the table.
//!
//! `and`/`or` build [`TestOp`] nodes so short-circuit semantics survive
//! into evaluation; the ternary desugars to an [`IfStmt`] with
//! single-expression suites.

use kamlc_lex::{TokenKind, TokenValue};

use crate::ast::{
    Assignment, AssignOp, BinOp, BinaryOp, BoolLiteral, ElseArm, FuncCall, GetAttr, GetItem,
    Identifier, IfStmt, Node, StringLiteral, Suite, TestKind, TestOp, UnOp, UnaryOp,
};
use crate::error::ParseError;
use crate::Parser;

/// Left binding powers, lowest first. Left-associative operators bind
/// their right side one step tighter; the assignment/ternary level binds
/// it at the same strength (right associativity).
mod bp {
    pub const MIN: u8 = 0;
    /// `? :`, `=` and the compound assignments.
    pub const ASSIGN: u8 = 2;
    pub const OR_TEST: u8 = 4;
    pub const AND_TEST: u8 = 6;
    pub const BIT_OR: u8 = 8;
    pub const BIT_XOR: u8 = 10;
    pub const BIT_AND: u8 = 12;
    pub const EQUALITY: u8 = 14;
    pub const RELATIONAL: u8 = 16;
    pub const SHIFT: u8 = 18;
    pub const ADDITIVE: u8 = 20;
    pub const MULTIPLICATIVE: u8 = 22;
}

enum Infix {
    Bin(BinOp),
    Test(TestKind),
}

fn infix(kind: TokenKind) -> Option<(u8, Infix)> {
    let entry = match kind {
        TokenKind::Or => (bp::OR_TEST, Infix::Test(TestKind::Or)),
        TokenKind::And => (bp::AND_TEST, Infix::Test(TestKind::And)),
        TokenKind::Pipe => (bp::BIT_OR, Infix::Bin(BinOp::BitOr)),
        TokenKind::Caret => (bp::BIT_XOR, Infix::Bin(BinOp::BitXor)),
        TokenKind::Amp => (bp::BIT_AND, Infix::Bin(BinOp::BitAnd)),
        TokenKind::EqEq => (bp::EQUALITY, Infix::Bin(BinOp::Eq)),
        TokenKind::Ne => (bp::EQUALITY, Infix::Bin(BinOp::Ne)),
        TokenKind::Lt => (bp::RELATIONAL, Infix::Bin(BinOp::Lt)),
        TokenKind::Lte => (bp::RELATIONAL, Infix::Bin(BinOp::Lte)),
        TokenKind::Gt => (bp::RELATIONAL, Infix::Bin(BinOp::Gt)),
        TokenKind::Gte => (bp::RELATIONAL, Infix::Bin(BinOp::Gte)),
        TokenKind::Shl => (bp::SHIFT, Infix::Bin(BinOp::Shl)),
        TokenKind::Shr => (bp::SHIFT, Infix::Bin(BinOp::Shr)),
        TokenKind::Plus => (bp::ADDITIVE, Infix::Bin(BinOp::Add)),
        TokenKind::Minus => (bp::ADDITIVE, Infix::Bin(BinOp::Sub)),
        TokenKind::Star => (bp::MULTIPLICATIVE, Infix::Bin(BinOp::Mul)),
        TokenKind::Slash => (bp::MULTIPLICATIVE, Infix::Bin(BinOp::Div)),
        TokenKind::Percent => (bp::MULTIPLICATIVE, Infix::Bin(BinOp::Mod)),
        _ => return None,
    };
    Some(entry)
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::AddEq => AssignOp::Add,
        TokenKind::SubEq => AssignOp::Sub,
        TokenKind::MulEq => AssignOp::Mul,
        TokenKind::DivEq => AssignOp::Div,
        TokenKind::ModEq => AssignOp::Mod,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        TokenKind::AndEq => AssignOp::BitAnd,
        TokenKind::XorEq => AssignOp::BitXor,
        TokenKind::OrEq => AssignOp::BitOr,
        _ => return None,
    };
    Some(op)
}

fn prefix_op(kind: TokenKind) -> Option<UnOp> {
    let op = match kind {
        TokenKind::Plus => UnOp::Pos,
        TokenKind::Minus => UnOp::Neg,
        TokenKind::Bang => UnOp::Not,
        TokenKind::Tilde => UnOp::BitNot,
        _ => return None,
    };
    Some(op)
}

impl<'a> Parser<'a> {
    /// Parses a full expression. Commas are list separators, never an
    /// operator, so this starts at the assignment level.
    pub(crate) fn expr(&mut self) -> Result<Node, ParseError> {
        self.expr_bp(bp::MIN)
    }

    fn expr_bp(&mut self, min_bp: u8) -> Result<Node, ParseError> {
        let mut lhs = self.unary_expr()?;

        loop {
            let la = self.la(true)?;

            // Ternary, right-associative with the assignments.
            if la.kind == TokenKind::Question {
                if bp::ASSIGN < min_bp {
                    break;
                }
                self.t(true)?;
                let then = self.expr_bp(bp::ASSIGN)?;
                self.expect(TokenKind::Colon)?;
                let orelse = self.expr_bp(bp::ASSIGN)?;
                lhs = Node::If(IfStmt {
                    cond: Box::new(lhs),
                    then: Suite::single(then),
                    orelse: Some(Box::new(ElseArm::Suite(Suite::single(orelse)))),
                });
                continue;
            }

            if let Some(op) = assign_op(la.kind) {
                if bp::ASSIGN < min_bp {
                    break;
                }
                self.t(true)?;
                let value = self.expr_bp(bp::ASSIGN)?;
                lhs = Node::Assign(Assignment {
                    target: Box::new(lhs),
                    op,
                    value: Box::new(value),
                });
                continue;
            }

            let Some((lbp, infix_kind)) = infix(la.kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.t(true)?;
            let rhs = self.expr_bp(lbp + 1)?;
            lhs = match infix_kind {
                Infix::Bin(op) => Node::Binary(BinaryOp {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                }),
                Infix::Test(op) => Node::Test(TestOp {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                }),
            };
        }

        Ok(lhs)
    }

    /// Prefix operators chain right-associatively.
    fn unary_expr(&mut self) -> Result<Node, ParseError> {
        let la = self.la(true)?;
        if let Some(op) = prefix_op(la.kind) {
            self.t(true)?;
            let expr = self.unary_expr()?;
            return Ok(Node::Unary(UnaryOp {
                op,
                expr: Box::new(expr),
            }));
        }
        self.postfix_expr()
    }

    /// Postfix forms compose left to right: attribute access, indexing,
    /// calls (with optional `#id`/`.class`/`[kwargs]` decorations), and
    /// scoped names.
    fn postfix_expr(&mut self) -> Result<Node, ParseError> {
        let mut expr = self.primary_expr()?;
        loop {
            let la = self.la(true)?;
            match la.kind {
                TokenKind::Dot => {
                    self.t(true)?;
                    let name = self.ident()?;
                    expr = Node::GetAttr(GetAttr {
                        base: Box::new(expr),
                        name,
                    });
                }
                TokenKind::ScopedId => {
                    let token = self.t(true)?;
                    let name = match token.value {
                        TokenValue::Str(sym) => sym,
                        _ => return Err(self.syntax_error("SCOPEDID", token)),
                    };
                    expr = Node::GetAttr(GetAttr {
                        base: Box::new(expr),
                        name,
                    });
                }
                TokenKind::LBracket => {
                    self.t(true)?;
                    let index = self.expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Node::GetItem(GetItem {
                        base: Box::new(expr),
                        index: Box::new(index),
                    });
                }
                TokenKind::LParen | TokenKind::Hash => {
                    let params = self.call_params()?;
                    expr = Node::Call(FuncCall {
                        callee: Box::new(expr),
                        params,
                    });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn primary_expr(&mut self) -> Result<Node, ParseError> {
        let token = self.t(true)?;
        match (token.kind, token.value) {
            (TokenKind::IntLit, TokenValue::Int(value)) => Ok(Node::int(value)),
            (TokenKind::FloatLit, TokenValue::Float(value)) => Ok(Node::float(value)),
            (TokenKind::StringLit, TokenValue::Str(value)) => {
                Ok(Node::Str(StringLiteral { value }))
            }
            (TokenKind::True, _) => Ok(Node::Bool(BoolLiteral { value: true })),
            (TokenKind::False, _) => Ok(Node::Bool(BoolLiteral { value: false })),
            (TokenKind::Id, TokenValue::Str(name)) => Ok(Node::Ident(Identifier { name })),
            (TokenKind::LParen, _) => {
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(self.syntax_error("an expression", token)),
        }
    }
}

#[cfg(test)]
mod tests {
    use kamlc_util::Handler;

    use crate::ast::*;
    use crate::Parser;

    /// Parses `code` as a returned expression, mirroring the original
    /// harness's `-def fn(){ return code; }` wrapper.
    fn expr(code: &str) -> Node {
        let source = format!("-def fn(){{ -return {}; }}", code);
        let handler = Handler::new();
        let mut parser = Parser::new(&source, &handler);
        let tree = parser.parse().expect("parse error");
        let Node::TranslationUnit(items) = tree else {
            panic!("expected translation unit");
        };
        let Node::FuncDef(def) = items.into_iter().next().expect("one item") else {
            panic!("expected function definition");
        };
        let Node::Return(ret) = def.body.items.into_iter().next().expect("one stmt") else {
            panic!("expected return statement");
        };
        *ret.expr.expect("return value")
    }

    fn bin(lhs: Node, op: BinOp, rhs: Node) -> Node {
        Node::Binary(BinaryOp {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        })
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("42"), Node::int(42));
        assert_eq!(expr("3.14"), Node::float(3.14));
        assert_eq!(expr("'hi'"), Node::string("hi"));
        assert_eq!(expr("true"), Node::Bool(BoolLiteral { value: true }));
        assert_eq!(expr("false"), Node::Bool(BoolLiteral { value: false }));
        assert_eq!(expr("x"), Node::ident("x"));
    }

    #[test]
    fn test_parenthesized() {
        assert_eq!(expr("(42)"), Node::int(42));
    }

    #[test]
    fn test_mul_binds_tighter_than_add() {
        assert_eq!(
            expr("a + b * c"),
            bin(
                Node::ident("a"),
                BinOp::Add,
                bin(Node::ident("b"), BinOp::Mul, Node::ident("c"))
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            expr("a - b - c"),
            bin(
                bin(Node::ident("a"), BinOp::Sub, Node::ident("b")),
                BinOp::Sub,
                Node::ident("c")
            )
        );
    }

    #[test]
    fn test_shift_binds_looser_than_additive() {
        assert_eq!(
            expr("a + b << c - d"),
            bin(
                bin(Node::ident("a"), BinOp::Add, Node::ident("b")),
                BinOp::Shl,
                bin(Node::ident("c"), BinOp::Sub, Node::ident("d"))
            )
        );
    }

    #[test]
    fn test_relational_binds_tighter_than_equality() {
        // KAML places == / != below the relational operators.
        assert_eq!(
            expr("a == b < c"),
            bin(
                Node::ident("a"),
                BinOp::Eq,
                bin(Node::ident("b"), BinOp::Lt, Node::ident("c"))
            )
        );
    }

    #[test]
    fn test_bitwise_hierarchy() {
        assert_eq!(
            expr("a | b ^ c & d"),
            bin(
                Node::ident("a"),
                BinOp::BitOr,
                bin(
                    Node::ident("b"),
                    BinOp::BitXor,
                    bin(Node::ident("c"), BinOp::BitAnd, Node::ident("d"))
                )
            )
        );
    }

    #[test]
    fn test_and_or_build_test_ops() {
        let tree = expr("a and b or c");
        let Node::Test(or) = tree else {
            panic!("expected or at the top");
        };
        assert_eq!(or.op, TestKind::Or);
        let Node::Test(and) = *or.lhs else {
            panic!("expected and on the left");
        };
        assert_eq!(and.op, TestKind::And);
    }

    #[test]
    fn test_symbolic_and_or_spellings() {
        assert_eq!(expr("a && b"), expr("a and b"));
        assert_eq!(expr("a || b"), expr("a or b"));
    }

    #[test]
    fn test_bitwise_binds_tighter_than_tests() {
        let tree = expr("a | b and c");
        let Node::Test(and) = tree else {
            panic!("expected and at the top");
        };
        assert!(matches!(*and.lhs, Node::Binary(_)));
    }

    #[test]
    fn test_unary_chain() {
        let tree = expr("-!~x");
        let Node::Unary(neg) = tree else {
            panic!("expected unary");
        };
        assert_eq!(neg.op, UnOp::Neg);
        let Node::Unary(not) = *neg.expr else {
            panic!("expected nested unary");
        };
        assert_eq!(not.op, UnOp::Not);
        let Node::Unary(bitnot) = *not.expr else {
            panic!("expected innermost unary");
        };
        assert_eq!(bitnot.op, UnOp::BitNot);
    }

    #[test]
    fn test_unary_binds_tighter_than_mul() {
        // `- a`, spaced: a leading hyphen glued to a letter would lex as
        // a hyphenated identifier.
        assert_eq!(
            expr("- a * b"),
            bin(
                Node::Unary(UnaryOp {
                    op: UnOp::Neg,
                    expr: Box::new(Node::ident("a")),
                }),
                BinOp::Mul,
                Node::ident("b")
            )
        );
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let tree = expr("a = b = c");
        let Node::Assign(outer) = tree else {
            panic!("expected assignment");
        };
        assert_eq!(outer.op, AssignOp::Assign);
        assert_eq!(*outer.target, Node::ident("a"));
        let Node::Assign(inner) = *outer.value else {
            panic!("expected nested assignment");
        };
        assert_eq!(*inner.target, Node::ident("b"));
        assert_eq!(*inner.value, Node::ident("c"));
    }

    #[test]
    fn test_compound_assignment_carries_spelling() {
        let Node::Assign(assign) = expr("x <<= 2") else {
            panic!("expected assignment");
        };
        assert_eq!(assign.op, AssignOp::Shl);
        assert_eq!(assign.op.as_str(), "<<=");
    }

    #[test]
    fn test_assignment_binds_looser_than_or() {
        let Node::Assign(assign) = expr("x = a or b") else {
            panic!("expected assignment");
        };
        assert!(matches!(*assign.value, Node::Test(_)));
    }

    #[test]
    fn test_ternary_builds_if_stmt() {
        let Node::If(if_stmt) = expr("c ? 1 : 2") else {
            panic!("expected if node");
        };
        assert_eq!(*if_stmt.cond, Node::ident("c"));
        assert_eq!(if_stmt.then, Suite::single(Node::int(1)));
        assert_eq!(
            if_stmt.orelse.as_deref(),
            Some(&ElseArm::Suite(Suite::single(Node::int(2))))
        );
    }

    #[test]
    fn test_ternary_nests_right() {
        let Node::If(outer) = expr("a ? 1 : b ? 2 : 3") else {
            panic!("expected if node");
        };
        let Some(arm) = outer.orelse.as_deref() else {
            panic!("expected else arm");
        };
        let ElseArm::Suite(suite) = arm else {
            panic!("expected suite arm");
        };
        assert!(matches!(suite.items[0], Node::If(_)));
    }

    #[test]
    fn test_get_attr() {
        assert_eq!(
            expr("a.b"),
            Node::GetAttr(GetAttr {
                base: Box::new(Node::ident("a")),
                name: kamlc_util::Symbol::intern("b"),
            })
        );
    }

    #[test]
    fn test_postfix_composes_left_to_right() {
        let Node::GetItem(item) = expr("a.b[0]") else {
            panic!("expected index at the top");
        };
        assert!(matches!(*item.base, Node::GetAttr(_)));
        assert_eq!(*item.index, Node::int(0));
    }

    #[test]
    fn test_scoped_id_postfix() {
        let Node::GetAttr(attr) = expr("a::width") else {
            panic!("expected scoped access");
        };
        assert_eq!(*attr.base, Node::ident("a"));
        assert_eq!(attr.name, kamlc_util::Symbol::intern("::width"));
    }

    #[test]
    fn test_plain_call() {
        let Node::Call(call) = expr("f(1, x)") else {
            panic!("expected call");
        };
        assert_eq!(*call.callee, Node::ident("f"));
        assert_eq!(call.params.positional, vec![Node::int(1), Node::ident("x")]);
    }

    #[test]
    fn test_call_of_attribute() {
        let Node::Call(call) = expr("a.f(1)") else {
            panic!("expected call");
        };
        assert!(matches!(*call.callee, Node::GetAttr(_)));
    }

    #[test]
    fn test_decorated_call() {
        let Node::Call(call) = expr("div#main.wide[role=box](content)") else {
            panic!("expected call");
        };
        assert_eq!(*call.callee, Node::ident("div"));
        assert_eq!(
            call.params.hash_arg,
            Some(HashDecl {
                name: kamlc_util::Symbol::intern("main"),
            })
        );
        assert_eq!(
            call.params.dot_args,
            vec![DotDecl {
                name: kamlc_util::Symbol::intern("wide"),
            }]
        );
        assert_eq!(
            call.params
                .kwargs
                .get(&kamlc_util::Symbol::intern("role"))
                .cloned(),
            Some(Node::ident("box"))
        );
        assert_eq!(call.params.positional, vec![Node::ident("content")]);
    }

    #[test]
    fn test_decorated_call_without_parens() {
        let Node::Call(call) = expr("div#main") else {
            panic!("expected call");
        };
        assert!(call.params.positional.is_empty());
        assert!(call.params.hash_arg.is_some());
    }

    #[test]
    fn test_nested_calls() {
        let Node::Call(outer) = expr("f(g(1))") else {
            panic!("expected call");
        };
        assert!(matches!(outer.params.positional[0], Node::Call(_)));
    }

    #[test]
    fn test_whitespace_neutrality_in_expressions() {
        assert_eq!(expr("a+b*c"), expr("a  +\tb *  c"));
    }
}
