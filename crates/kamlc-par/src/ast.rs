//! AST node definitions.
//!
//! The tree is a closed family of tagged variants with structural
//! equality; nodes own their children outright, so a parse result is a
//! plain tree with no sharing. Scope state lives in the parser, never on
//! nodes.

use indexmap::IndexMap;
use kamlc_util::Symbol;
use thiserror::Error;

/// Any node of the KAML syntax tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Nothing. Also the empty-initializer sentinel in declarations,
    /// which keeps `x` distinct from an explicit initializer in the tree.
    Empty,

    /// The root: every top-level item of a source file.
    TranslationUnit(Vec<Node>),

    /// A brace-delimited block. Introduces exactly one scope frame.
    Suite(Suite),

    /// A `-use` target chain (produced when no importer is configured).
    Use(UseStmt),

    /// Function definition.
    FuncDef(FuncDef),

    /// A declared parameter, possibly with a default.
    VarDecl(VariableDecl),

    /// A `#name` parameter decoration.
    Hash(HashDecl),

    /// A `.name` parameter decoration.
    DotArg(DotDecl),

    /// A `[name=value, …]` keyword-parameter group.
    KWArgs(KWArgDecl),

    /// `-if` / `-elif` / `-else` chain; also the ternary operator.
    If(IfStmt),

    /// `-while` loop.
    While(WhileStmt),

    /// C-style `-for (init; cond; step)` loop.
    For(ForStmt),

    /// `-set name = value`.
    Set(SetStmt),

    /// `-return` with an optional value.
    Return(ReturnStmt),

    /// `-break`.
    Break,

    /// `-continue`.
    Continue,

    /// Integer or float literal.
    Number(NumberLiteral),

    /// String literal (fragments already fused by the shaper).
    Str(StringLiteral),

    /// `true` / `false`.
    Bool(BoolLiteral),

    /// Prefix operator application.
    Unary(UnaryOp),

    /// Infix operator application.
    Binary(BinaryOp),

    /// `and` / `or`, kept apart from [`BinaryOp`] to preserve
    /// short-circuit semantics for evaluation.
    Test(TestOp),

    /// Plain or compound assignment.
    Assign(Assignment),

    /// `base[index]`.
    GetItem(GetItem),

    /// `base.name` or `base::name`.
    GetAttr(GetAttr),

    /// Function call with the full parameter-sequence argument syntax.
    Call(FuncCall),

    /// Name reference.
    Ident(Identifier),
}

impl Node {
    /// Convenience constructor for integer literals.
    pub fn int(value: i64) -> Node {
        Node::Number(NumberLiteral {
            value: NumberValue::Int(value),
        })
    }

    /// Convenience constructor for float literals.
    pub fn float(value: f64) -> Node {
        Node::Number(NumberLiteral {
            value: NumberValue::Float(value),
        })
    }

    /// Convenience constructor for string literals.
    pub fn string(value: &str) -> Node {
        Node::Str(StringLiteral {
            value: Symbol::intern(value),
        })
    }

    /// Convenience constructor for identifiers.
    pub fn ident(name: &str) -> Node {
        Node::Ident(Identifier {
            name: Symbol::intern(name),
        })
    }
}

/// A brace-delimited block of statements.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Suite {
    pub items: Vec<Node>,
}

impl Suite {
    pub fn new(items: Vec<Node>) -> Self {
        Self { items }
    }

    /// A suite holding one expression, as built for ternary branches.
    pub fn single(item: Node) -> Self {
        Self { items: vec![item] }
    }
}

/// The head of a `-use` chain: either a plain name or a nested chain.
#[derive(Clone, Debug, PartialEq)]
pub enum UseRoot {
    Name(Symbol),
    Chain(Box<UseStmt>),
}

/// The rightmost element of a `-use` chain.
#[derive(Clone, Debug, PartialEq)]
pub enum UseChild {
    None,
    Name(Symbol),
    Glob,
}

/// A `-use` statement. Chains nest left: `-use a:b:c` becomes
/// `UseStmt(UseStmt(a, b), c)`.
#[derive(Clone, Debug, PartialEq)]
pub struct UseStmt {
    pub root: UseRoot,
    pub child: UseChild,
}

impl UseStmt {
    pub fn name(root: Symbol) -> Self {
        Self {
            root: UseRoot::Name(root),
            child: UseChild::None,
        }
    }

    /// Renders the chain as the importer key, e.g. `"a:b:c"` or `"a:*"`.
    pub fn dotted(&self) -> String {
        let mut out = match &self.root {
            UseRoot::Name(name) => name.as_str().to_owned(),
            UseRoot::Chain(inner) => inner.dotted(),
        };
        match &self.child {
            UseChild::None => {}
            UseChild::Name(name) => {
                out.push(':');
                out.push_str(name.as_str());
            }
            UseChild::Glob => out.push_str(":*"),
        }
        out
    }
}

/// Function definition: declaration plus body.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDef {
    pub decl: FuncDecl,
    pub body: Suite,
}

/// Function declaration. A string-literal name marks the function as
/// compile-time.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: Symbol,
    pub params: ParamSeq,
    pub compile_time: bool,
}

/// Errors raised while assembling a [`ParamSeq`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("duplicate '#' parameter '{0}'")]
    DuplicateHashArg(Symbol),
    #[error("duplicate keyword parameter '{0}'")]
    DuplicateKwarg(Symbol),
    #[error("cannot add {0} to a parameter sequence")]
    Incompatible(&'static str),
}

/// The aggregate of positional, hash, dot and keyword parameters of a
/// declaration or call.
///
/// In declarations the positional entries are [`VariableDecl`] nodes; in
/// calls they are arbitrary expressions. At most one hash argument is
/// allowed.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ParamSeq {
    pub positional: Vec<Node>,
    pub hash_arg: Option<HashDecl>,
    pub dot_args: Vec<DotDecl>,
    pub kwargs: IndexMap<Symbol, Node>,
}

impl ParamSeq {
    /// Routes `item` into the right bucket, enforcing the
    /// single-hash-arg and unique-kwarg invariants.
    pub fn push(&mut self, item: Node) -> Result<(), ParamError> {
        match item {
            Node::Hash(hash) => {
                if self.hash_arg.is_some() {
                    return Err(ParamError::DuplicateHashArg(hash.name));
                }
                self.hash_arg = Some(hash);
                Ok(())
            }
            Node::DotArg(dot) => {
                self.dot_args.push(dot);
                Ok(())
            }
            Node::KWArgs(group) => {
                for (name, value) in group.kwargs {
                    if self.kwargs.contains_key(&name) {
                        return Err(ParamError::DuplicateKwarg(name));
                    }
                    self.kwargs.insert(name, value);
                }
                Ok(())
            }
            Node::Empty => Err(ParamError::Incompatible("an empty node")),
            other => {
                self.positional.push(other);
                Ok(())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
            && self.hash_arg.is_none()
            && self.dot_args.is_empty()
            && self.kwargs.is_empty()
    }
}

/// A declared variable or parameter. `init` is [`Node::Empty`] when no
/// initializer was written.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    pub name: Symbol,
    pub init: Box<Node>,
}

impl VariableDecl {
    pub fn new(name: Symbol, init: Node) -> Self {
        Self {
            name,
            init: Box::new(init),
        }
    }

    pub fn bare(name: Symbol) -> Self {
        Self::new(name, Node::Empty)
    }
}

/// `#name` decoration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashDecl {
    pub name: Symbol,
}

/// `.name` decoration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DotDecl {
    pub name: Symbol,
}

/// `[name=value, …]` keyword group. Values are [`Node::Empty`] for bare
/// names.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct KWArgDecl {
    pub kwargs: IndexMap<Symbol, Node>,
}

/// The else arm of an [`IfStmt`]: a plain suite or the next link of an
/// `-elif` chain.
#[derive(Clone, Debug, PartialEq)]
pub enum ElseArm {
    Suite(Suite),
    If(Box<IfStmt>),
}

/// Conditional statement (and the ternary expression, whose branches are
/// single-expression suites).
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub cond: Box<Node>,
    pub then: Suite,
    pub orelse: Option<Box<ElseArm>>,
}

/// `-while (cond) { … }`.
#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub cond: Box<Node>,
    pub body: Suite,
}

/// `-for (init; cond; step) { … }`. Absent header slots are
/// [`Node::Empty`].
#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub init: Box<Node>,
    pub cond: Box<Node>,
    pub step: Box<Node>,
    pub body: Suite,
}

/// `-set name = value`.
#[derive(Clone, Debug, PartialEq)]
pub struct SetStmt {
    pub name: Symbol,
    pub value: Box<Node>,
}

/// `-return expr?`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStmt {
    pub expr: Option<Box<Node>>,
}

/// The numeric payload of a literal; the variant is the `numeric_kind`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

/// Numeric literal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberLiteral {
    pub value: NumberValue,
}

/// String literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StringLiteral {
    pub value: Symbol,
}

/// Boolean literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoolLiteral {
    pub value: bool,
}

/// Prefix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Pos,
    Neg,
    Not,
    BitNot,
}

/// Prefix application.
#[derive(Clone, Debug, PartialEq)]
pub struct UnaryOp {
    pub op: UnOp,
    pub expr: Box<Node>,
}

/// Infix operators (short-circuit `and`/`or` excluded; see [`TestOp`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// Infix application.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryOp {
    pub lhs: Box<Node>,
    pub op: BinOp,
    pub rhs: Box<Node>,
}

/// `and` / `or`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestKind {
    And,
    Or,
}

/// Short-circuit test application.
#[derive(Clone, Debug, PartialEq)]
pub struct TestOp {
    pub lhs: Box<Node>,
    pub op: TestKind,
    pub rhs: Box<Node>,
}

/// Assignment operators; `as_str` recovers the source spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitXor,
    BitOr,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitXor => "^=",
            AssignOp::BitOr => "|=",
        }
    }
}

/// Plain or compound assignment expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub target: Box<Node>,
    pub op: AssignOp,
    pub value: Box<Node>,
}

/// `base[index]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GetItem {
    pub base: Box<Node>,
    pub index: Box<Node>,
}

/// `base.name` and `base::name`.
#[derive(Clone, Debug, PartialEq)]
pub struct GetAttr {
    pub base: Box<Node>,
    pub name: Symbol,
}

/// Call expression.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncCall {
    pub callee: Box<Node>,
    pub params: ParamSeq,
}

/// Name reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub name: Symbol,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn test_dotted_single() {
        assert_eq!(UseStmt::name(sym("foo")).dotted(), "foo");
    }

    #[test]
    fn test_dotted_chain() {
        let chain = UseStmt {
            root: UseRoot::Chain(Box::new(UseStmt {
                root: UseRoot::Name(sym("foo")),
                child: UseChild::Name(sym("bar")),
            })),
            child: UseChild::Name(sym("baz")),
        };
        assert_eq!(chain.dotted(), "foo:bar:baz");
    }

    #[test]
    fn test_dotted_glob() {
        let glob = UseStmt {
            root: UseRoot::Name(sym("foo")),
            child: UseChild::Glob,
        };
        assert_eq!(glob.dotted(), "foo:*");
    }

    #[test]
    fn test_param_seq_routing() {
        let mut params = ParamSeq::default();
        params
            .push(Node::Hash(HashDecl { name: sym("id") }))
            .expect("hash");
        params
            .push(Node::DotArg(DotDecl { name: sym("cls") }))
            .expect("dot");
        params
            .push(Node::VarDecl(VariableDecl::bare(sym("x"))))
            .expect("positional");

        assert_eq!(params.hash_arg, Some(HashDecl { name: sym("id") }));
        assert_eq!(params.dot_args.len(), 1);
        assert_eq!(params.positional.len(), 1);
    }

    #[test]
    fn test_param_seq_rejects_second_hash() {
        let mut params = ParamSeq::default();
        params
            .push(Node::Hash(HashDecl { name: sym("a") }))
            .expect("first hash");
        let err = params
            .push(Node::Hash(HashDecl { name: sym("b") }))
            .expect_err("second hash must fail");
        assert_eq!(err, ParamError::DuplicateHashArg(sym("b")));
    }

    #[test]
    fn test_param_seq_rejects_duplicate_kwarg() {
        let mut params = ParamSeq::default();
        let mut first = KWArgDecl::default();
        first.kwargs.insert(sym("k"), Node::int(1));
        params.push(Node::KWArgs(first)).expect("first group");

        let mut second = KWArgDecl::default();
        second.kwargs.insert(sym("k"), Node::int(2));
        let err = params
            .push(Node::KWArgs(second))
            .expect_err("duplicate kwarg must fail");
        assert_eq!(err, ParamError::DuplicateKwarg(sym("k")));
    }

    #[test]
    fn test_param_seq_rejects_empty() {
        let mut params = ParamSeq::default();
        assert!(params.push(Node::Empty).is_err());
    }

    #[test]
    fn test_structural_equality() {
        let a = Node::Binary(BinaryOp {
            lhs: Box::new(Node::int(1)),
            op: BinOp::Add,
            rhs: Box::new(Node::ident("x")),
        });
        let b = Node::Binary(BinaryOp {
            lhs: Box::new(Node::int(1)),
            op: BinOp::Add,
            rhs: Box::new(Node::ident("x")),
        });
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_init_distinct_from_value() {
        let bare = VariableDecl::bare(sym("x"));
        let with_default = VariableDecl::new(sym("x"), Node::int(0));
        assert_ne!(bare, with_default);
    }

    #[test]
    fn test_assign_op_spelling() {
        assert_eq!(AssignOp::Assign.as_str(), "=");
        assert_eq!(AssignOp::Shl.as_str(), "<<=");
        assert_eq!(AssignOp::BitXor.as_str(), "^=");
    }
}
