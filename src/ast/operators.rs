/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Bitwise NOT (`~`)
    BitNot,
    /// Logical NOT (`!` or `NOT`)
    Not,
    /// Numeric conversion (`+`)
    Plus,
    /// Negation (`-`)
    Minus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    /// Logical OR (`||`, `OR`)
    Or,
    /// Logical AND (`&&`, `AND`)
    And,

    // Bitwise
    /// Bitwise OR (`|`)
    BitOr,
    /// Bitwise XOR (`^`)
    BitXor,
    /// Bitwise AND (`&`)
    BitAnd,

    // Equality
    /// Loose equality (`==`)
    Equal,
    /// Loose inequality (`!=`)
    NotEqual,
    /// Strict equality (`===`)
    StrictEqual,
    /// Strict inequality (`!==`)
    StrictNotEqual,

    // Relational
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Shift
    /// Left shift (`<<`)
    ShiftLeft,
    /// Sign-propagating right shift (`>>`)
    ShiftRight,
    /// Zero-fill right shift (`>>>`)
    UnsignedShiftRight,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Remainder (`%`)
    Modulo,
    /// Exponentiation (`**`), right-associative
    Power,
}

/// Lowest binary precedence level (logical OR).
pub const LOWEST_PRECEDENCE: u8 = 1;

/// Highest left-associative level (multiplicative). `**` sits above it and
/// is parsed separately because it associates to the right.
pub const HIGHEST_CHAIN_PRECEDENCE: u8 = 10;

impl BinOp {
    /// Binding strength, 1 (loosest) through 11 (tightest).
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::BitOr => 3,
            BinOp::BitXor => 4,
            BinOp::BitAnd => 5,
            BinOp::Equal | BinOp::NotEqual | BinOp::StrictEqual | BinOp::StrictNotEqual => 6,
            BinOp::LessThan | BinOp::LessEqual | BinOp::GreaterThan | BinOp::GreaterEqual => 7,
            BinOp::ShiftLeft | BinOp::ShiftRight | BinOp::UnsignedShiftRight => 8,
            BinOp::Add | BinOp::Subtract => 9,
            BinOp::Multiply | BinOp::Divide | BinOp::Modulo => 10,
            BinOp::Power => 11,
        }
    }

    /// Whether the right operand may be skipped once the left is known.
    pub fn short_circuits(self) -> bool {
        matches!(self, BinOp::Or | BinOp::And)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::StrictEqual => "===",
            BinOp::StrictNotEqual => "!==",
            BinOp::LessThan => "<",
            BinOp::LessEqual => "<=",
            BinOp::GreaterThan => ">",
            BinOp::GreaterEqual => ">=",
            BinOp::ShiftLeft => "<<",
            BinOp::ShiftRight => ">>",
            BinOp::UnsignedShiftRight => ">>>",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::Power => "**",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_logical_operators_short_circuit() {
        assert!(BinOp::And.short_circuits());
        assert!(BinOp::Or.short_circuits());
        assert!(!BinOp::BitOr.short_circuits());
        assert!(!BinOp::Equal.short_circuits());
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert!(BinOp::Multiply.precedence() > BinOp::Add.precedence());
        assert!(BinOp::Power.precedence() > BinOp::Modulo.precedence());
        assert_eq!(BinOp::Or.precedence(), LOWEST_PRECEDENCE);
        assert_eq!(BinOp::Divide.precedence(), HIGHEST_CHAIN_PRECEDENCE);
    }
}
