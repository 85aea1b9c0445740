use crate::ast::{BinOp, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Numeric literal (decimal, hexadecimal, binary, fractional or exponent form)
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0x2A
    /// 0b101010
    /// .5
    /// 324.01e3
    /// ```
    Number(f64),

    /// String literal enclosed in `"`, `'` or backticks
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// `multi
    /// line`
    /// ```
    String(String),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    /// Null value
    Null,

    // Identifiers
    /// Identifier bound by the host (or a built-in)
    ///
    /// Starts with a Unicode letter, `_` or `$`, continues with letters,
    /// digits, `_` or `$`.
    ///
    /// # Examples
    /// ```text
    /// price
    /// _ident900
    /// $line$
    /// accentué
    /// ```
    Identifier(String),

    // Arithmetic
    /// Addition, concatenation or unary plus
    Plus,

    /// Subtraction or negation
    Minus,

    /// Multiplication
    Star,

    /// Exponentiation (`**`)
    StarStar,

    /// Division
    Slash,

    /// Remainder
    Percent,

    /// `++`, never valid in this language
    Increment,

    /// `--`, never valid in this language
    Decrement,

    // Shifts
    /// `<<`
    Shl,

    /// `>>`
    Shr,

    /// `>>>`
    UShr,

    // Comparison
    /// Less than
    Lt,

    /// Less than or equal
    LtEq,

    /// Greater than
    Gt,

    /// Greater than or equal
    GtEq,

    /// Loose equality (`==`)
    EqEq,

    /// Loose inequality (`!=`)
    NotEq,

    /// Strict equality (`===`)
    EqEqEq,

    /// Strict inequality (`!==`)
    NotEqEq,

    /// Single `=`, only produced by the filter grammar
    ///
    /// # Examples
    /// ```text
    /// age = 32
    /// ```
    Assign,

    // Bitwise
    /// Bitwise AND
    Ampersand,

    /// Bitwise XOR
    Caret,

    /// Bitwise OR
    Pipe,

    /// Bitwise NOT
    Tilde,

    // Logical
    /// Logical AND (`&&`)
    AmpAmp,

    /// Logical OR (`||`)
    PipePipe,

    /// Logical NOT (`!`)
    Bang,

    /// Logical AND written as a word
    ///
    /// # Examples
    /// ```text
    /// 128 AND false
    /// ```
    And,

    /// Logical OR written as a word
    Or,

    /// Logical NOT written as a word, may be glued to its operand
    ///
    /// # Examples
    /// ```text
    /// NOT x
    /// NOTtrue
    /// ```
    Not,

    // Conditionals
    /// Ternary test marker
    Question,

    /// Elvis operator (`?:`), written without whitespace
    ///
    /// # Examples
    /// ```text
    /// 0 ?: 10
    /// ```
    Elvis,

    /// Ternary branch separator and object key separator
    Colon,

    // Delimiters
    /// Left bracket for accessors and array literals
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Left brace for object literals and type configs
    LBrace,

    /// Right brace
    RBrace,

    /// Dot for property access
    Dot,

    /// Comma for separating arguments or literal elements
    Comma,

    /// End of input
    Eof,
}

impl Token {
    /// Binary operator denoted by this token, if any.
    pub fn binary_op(&self) -> Option<BinOp> {
        let op = match self {
            Token::PipePipe | Token::Or => BinOp::Or,
            Token::AmpAmp | Token::And => BinOp::And,
            Token::Pipe => BinOp::BitOr,
            Token::Caret => BinOp::BitXor,
            Token::Ampersand => BinOp::BitAnd,
            Token::EqEq => BinOp::Equal,
            Token::NotEq => BinOp::NotEqual,
            Token::EqEqEq => BinOp::StrictEqual,
            Token::NotEqEq => BinOp::StrictNotEqual,
            Token::Lt => BinOp::LessThan,
            Token::LtEq => BinOp::LessEqual,
            Token::Gt => BinOp::GreaterThan,
            Token::GtEq => BinOp::GreaterEqual,
            Token::Shl => BinOp::ShiftLeft,
            Token::Shr => BinOp::ShiftRight,
            Token::UShr => BinOp::UnsignedShiftRight,
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Subtract,
            Token::Star => BinOp::Multiply,
            Token::Slash => BinOp::Divide,
            Token::Percent => BinOp::Modulo,
            Token::StarStar => BinOp::Power,
            _ => return None,
        };
        Some(op)
    }

    /// Prefix operator denoted by this token, if any.
    pub fn unary_op(&self) -> Option<UnaryOp> {
        match self {
            Token::Tilde => Some(UnaryOp::BitNot),
            Token::Bang | Token::Not => Some(UnaryOp::Not),
            Token::Plus => Some(UnaryOp::Plus),
            Token::Minus => Some(UnaryOp::Minus),
            _ => None,
        }
    }

    /// Short human-readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", crate::number::format_number(*n)),
            Token::String(s) => format!("string {:?}", s),
            Token::Boolean(b) => b.to_string(),
            Token::Null => "null".to_string(),
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::StarStar => "**",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Increment => "++",
            Token::Decrement => "--",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::UShr => ">>>",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::EqEqEq => "===",
            Token::NotEqEq => "!==",
            Token::Assign => "=",
            Token::Ampersand => "&",
            Token::Caret => "^",
            Token::Pipe => "|",
            Token::Tilde => "~",
            Token::AmpAmp => "&&",
            Token::PipePipe => "||",
            Token::Bang => "!",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::Question => "?",
            Token::Elvis => "?:",
            Token::Colon => ":",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Dot => ".",
            Token::Comma => ",",
            Token::Number(_)
            | Token::String(_)
            | Token::Boolean(_)
            | Token::Null
            | Token::Identifier(_)
            | Token::Eof => "",
        }
    }
}
