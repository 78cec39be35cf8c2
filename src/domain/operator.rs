// ============================================================================
// Operator Kinds
// ============================================================================

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Binary operators usable in compound assignment (`lhs op= rhs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AssignOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    ShiftLeft,
    ShiftRight,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
}

impl AssignOp {
    /// Binary operator applied before the result is converted back.
    pub const fn binary(self) -> OperatorKind {
        match self {
            AssignOp::Add => OperatorKind::Add,
            AssignOp::Subtract => OperatorKind::Subtract,
            AssignOp::Multiply => OperatorKind::Multiply,
            AssignOp::Divide => OperatorKind::Divide,
            AssignOp::Modulo => OperatorKind::Modulo,
            AssignOp::ShiftLeft => OperatorKind::ShiftLeft,
            AssignOp::ShiftRight => OperatorKind::ShiftRight,
            AssignOp::BitwiseAnd => OperatorKind::BitwiseAnd,
            AssignOp::BitwiseOr => OperatorKind::BitwiseOr,
            AssignOp::BitwiseXor => OperatorKind::BitwiseXor,
        }
    }
}

/// Every operator the resolution engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OperatorKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    ShiftLeft,
    ShiftRight,
    Negate,
    Plus,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseNot,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    CompoundAssign(AssignOp),
}

impl OperatorKind {
    /// Binary operators producing a number.
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            OperatorKind::Add
                | OperatorKind::Subtract
                | OperatorKind::Multiply
                | OperatorKind::Divide
                | OperatorKind::Modulo
                | OperatorKind::ShiftLeft
                | OperatorKind::ShiftRight
                | OperatorKind::BitwiseAnd
                | OperatorKind::BitwiseOr
                | OperatorKind::BitwiseXor
        )
    }

    pub const fn is_unary(&self) -> bool {
        matches!(
            self,
            OperatorKind::Negate | OperatorKind::Plus | OperatorKind::BitwiseNot
        )
    }

    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            OperatorKind::Equal
                | OperatorKind::NotEqual
                | OperatorKind::Less
                | OperatorKind::Greater
                | OperatorKind::LessEq
                | OperatorKind::GreaterEq
        )
    }

    pub const fn is_shift(&self) -> bool {
        matches!(self, OperatorKind::ShiftLeft | OperatorKind::ShiftRight)
    }

    /// Operators whose operands must share an exponent before combining.
    pub const fn aligns_operands(&self) -> bool {
        matches!(
            self,
            OperatorKind::Add
                | OperatorKind::Subtract
                | OperatorKind::Modulo
                | OperatorKind::BitwiseAnd
                | OperatorKind::BitwiseOr
                | OperatorKind::BitwiseXor
        )
    }

    /// Operators that rewrite their left operand in place.
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            OperatorKind::PreIncrement
                | OperatorKind::PreDecrement
                | OperatorKind::PostIncrement
                | OperatorKind::PostDecrement
                | OperatorKind::CompoundAssign(_)
        )
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            OperatorKind::Add | OperatorKind::Plus => "+",
            OperatorKind::Subtract | OperatorKind::Negate => "-",
            OperatorKind::Multiply => "*",
            OperatorKind::Divide => "/",
            OperatorKind::Modulo => "%",
            OperatorKind::ShiftLeft => "<<",
            OperatorKind::ShiftRight => ">>",
            OperatorKind::BitwiseAnd => "&",
            OperatorKind::BitwiseOr => "|",
            OperatorKind::BitwiseXor => "^",
            OperatorKind::BitwiseNot => "~",
            OperatorKind::Equal => "==",
            OperatorKind::NotEqual => "!=",
            OperatorKind::Less => "<",
            OperatorKind::Greater => ">",
            OperatorKind::LessEq => "<=",
            OperatorKind::GreaterEq => ">=",
            OperatorKind::PreIncrement | OperatorKind::PostIncrement => "++",
            OperatorKind::PreDecrement | OperatorKind::PostDecrement => "--",
            OperatorKind::CompoundAssign(op) => match op {
                AssignOp::Add => "+=",
                AssignOp::Subtract => "-=",
                AssignOp::Multiply => "*=",
                AssignOp::Divide => "/=",
                AssignOp::Modulo => "%=",
                AssignOp::ShiftLeft => "<<=",
                AssignOp::ShiftRight => ">>=",
                AssignOp::BitwiseAnd => "&=",
                AssignOp::BitwiseOr => "|=",
                AssignOp::BitwiseXor => "^=",
            },
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
