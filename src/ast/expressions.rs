use crate::ast::{BinOp, UnaryOp};
use crate::value::Value;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Produced once per parse and never mutated afterwards; every node owns
/// its children, so a tree can be shared read-only across threads.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Null, boolean, number or string literal
    ///
    /// # Examples
    /// ```text
    /// null
    /// true
    /// 0x2A
    /// 'hello'
    /// ```
    Literal(Value),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, a, 'b']
    /// ```
    Array(Vec<Expr>),

    /// Object literal, entries in source order
    ///
    /// Keys are bare identifiers or string literals. Duplicate keys are
    /// kept here and resolved at evaluation (last one wins).
    ///
    /// # Example
    /// ```text
    /// {name: 'Jonathan', "age": 32}
    /// ```
    Object(Vec<(String, Expr)>),

    // References
    /// Host-resolved identifier
    Identifier(String),

    // Operations
    /// Chain of prefix operators applied to one operand
    ///
    /// `ops` are stored in source order and applied right to left, so the
    /// operator closest to the operand applies first.
    ///
    /// # Example
    /// ```text
    /// -+-+100
    /// ```
    Unary { ops: Vec<UnaryOp>, operand: Box<Expr> },

    /// Flat chain of same-precedence binary operations
    ///
    /// Reduced left to right. `**` chains are nested instead, because they
    /// associate to the right.
    ///
    /// # Example
    /// ```text
    /// 1 + 2 - 3     // head: 1, tail: [(+, 2), (-, 3)]
    /// ```
    Binary { head: Box<Expr>, tail: Vec<(BinOp, Expr)> },

    /// Ternary conditional
    ///
    /// `when_true` is `None` for the Elvis form `test ?: when_false`, in
    /// which case the value already computed for `test` is returned.
    ///
    /// # Examples
    /// ```text
    /// a ? 'yes' : 'no'
    /// a ?: 'fallback'
    /// ```
    Conditional {
        test: Box<Expr>,
        /// `None` for Elvis: the already evaluated `test` value is the
        /// true branch, so `a ?: b` behaves like `a ? a : b` without
        /// evaluating `a` twice.
        when_true: Option<Box<Expr>>,
        when_false: Box<Expr>,
    },

    /// Property and index access chain
    ///
    /// # Examples
    /// ```text
    /// user.name
    /// matrix[y][x]
    /// data['key'].length
    /// ```
    Accessor { base: Box<Expr>, keys: Vec<AccessorKey> },

    /// Function call on a bare name
    ///
    /// # Example
    /// ```text
    /// Math_pow(2, 6)
    /// ```
    Call { name: String, args: Vec<Expr> },

    // Type grammar
    /// Union of single types (`A | B`); the root of every type expression
    UnionType(Vec<Expr>),

    /// Single named type with optional template arguments and config
    ///
    /// Each `template` entry is itself a `UnionType`. `fullname` is the
    /// exact source text the type was parsed from.
    ///
    /// # Examples
    /// ```text
    /// String
    /// Map<String, List<String>>
    /// String{value: "Hello"}
    /// ```
    SingleType {
        name: String,
        config: Option<Box<Expr>>,
        fullname: String,
        template: Vec<Expr>,
    },
}

/// One step of an accessor chain.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessorKey {
    /// Key known at parse time (`.name` or `['name']`)
    Literal(String),
    /// Key computed at evaluation (`[expr]`)
    Computed(Expr),
}

impl Expr {
    /// Shorthand for a literal node.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }
}
