// ============================================================================
// Number Operators
// std::ops and comparison traits backed by the process-wide engine
// ============================================================================

use super::operator_engine::OperatorEngine;
use crate::domain::{AssignOp, DivisionPolicy, Number, NumberType, OperatorKind};
use crate::numeric::NumericResult;
use std::cmp::Ordering;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div, DivAssign,
    Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub, SubAssign,
};

// ============================================================================
// Checked Operations
// ============================================================================

impl Number {
    pub fn checked_add(&self, rhs: &Number) -> NumericResult<Number> {
        OperatorEngine::global().apply(OperatorKind::Add, self, rhs)
    }

    pub fn checked_sub(&self, rhs: &Number) -> NumericResult<Number> {
        OperatorEngine::global().apply(OperatorKind::Subtract, self, rhs)
    }

    pub fn checked_mul(&self, rhs: &Number) -> NumericResult<Number> {
        OperatorEngine::global().apply(OperatorKind::Multiply, self, rhs)
    }

    pub fn checked_div(&self, rhs: &Number) -> NumericResult<Number> {
        OperatorEngine::global().apply(OperatorKind::Divide, self, rhs)
    }

    pub fn checked_rem(&self, rhs: &Number) -> NumericResult<Number> {
        OperatorEngine::global().apply(OperatorKind::Modulo, self, rhs)
    }

    pub fn checked_neg(&self) -> NumericResult<Number> {
        OperatorEngine::global().apply_unary(OperatorKind::Negate, self)
    }

    /// Static shift: Scaled numbers move their exponent, others their bits.
    pub fn checked_shl(&self, amount: u32) -> NumericResult<Number> {
        OperatorEngine::global().shift_static(OperatorKind::ShiftLeft, self, amount)
    }

    pub fn checked_shr(&self, amount: u32) -> NumericResult<Number> {
        OperatorEngine::global().shift_static(OperatorKind::ShiftRight, self, amount)
    }

    /// Division that keeps the fractional precision of the quotient.
    pub fn quotient(&self, rhs: &Number) -> NumericResult<Number> {
        OperatorEngine::global().quotient(self, rhs)
    }

    pub fn divide_with(&self, rhs: &Number, policy: DivisionPolicy) -> NumericResult<Number> {
        OperatorEngine::global().divide_with(self, rhs, policy)
    }

    pub fn abs(&self) -> NumericResult<Number> {
        OperatorEngine::global().abs(self)
    }

    pub fn floor(&self) -> NumericResult<Number> {
        OperatorEngine::global().floor(self)
    }

    pub fn sqrt(&self) -> NumericResult<Number> {
        OperatorEngine::global().sqrt(self)
    }

    /// Same value expressed in `ty`, applying its rounding and overflow policies.
    pub fn convert_to(&self, ty: &NumberType) -> NumericResult<Number> {
        OperatorEngine::global().convert(self, ty)
    }
}

// ============================================================================
// Comparison
// ============================================================================

// Equality and ordering are by mathematical value, across types.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        OperatorEngine::global().ordering(self, other) == Ordering::Equal
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(OperatorEngine::global().ordering(self, other))
    }
}

// ============================================================================
// Binary Operators
// ============================================================================

// Infallible operators for ergonomics (panic on error - use checked_* or the
// engine directly where failure is expected)
macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:expr, $message:literal) => {
        impl $trait<&Number> for &Number {
            type Output = Number;

            fn $method(self, rhs: &Number) -> Number {
                OperatorEngine::global().apply($op, self, rhs).expect($message)
            }
        }

        impl $trait<Number> for Number {
            type Output = Number;

            fn $method(self, rhs: Number) -> Number {
                $trait::$method(&self, &rhs)
            }
        }

        impl $trait<&Number> for Number {
            type Output = Number;

            fn $method(self, rhs: &Number) -> Number {
                $trait::$method(&self, rhs)
            }
        }

        impl $trait<Number> for &Number {
            type Output = Number;

            fn $method(self, rhs: Number) -> Number {
                $trait::$method(self, &rhs)
            }
        }
    };
}

binary_operator!(Add, add, OperatorKind::Add, "Number addition failed");
binary_operator!(Sub, sub, OperatorKind::Subtract, "Number subtraction failed");
binary_operator!(Mul, mul, OperatorKind::Multiply, "Number multiplication failed");
binary_operator!(Div, div, OperatorKind::Divide, "Number division failed");
binary_operator!(Rem, rem, OperatorKind::Modulo, "Number remainder failed");
binary_operator!(BitAnd, bitand, OperatorKind::BitwiseAnd, "Number bitwise and failed");
binary_operator!(BitOr, bitor, OperatorKind::BitwiseOr, "Number bitwise or failed");
binary_operator!(BitXor, bitxor, OperatorKind::BitwiseXor, "Number bitwise xor failed");
binary_operator!(Shl, shl, OperatorKind::ShiftLeft, "Number shift failed");
binary_operator!(Shr, shr, OperatorKind::ShiftRight, "Number shift failed");

// Shifting by a plain u32 is a static shift.
impl Shl<u32> for &Number {
    type Output = Number;

    fn shl(self, amount: u32) -> Number {
        self.checked_shl(amount).expect("Number shift failed")
    }
}

impl Shl<u32> for Number {
    type Output = Number;

    fn shl(self, amount: u32) -> Number {
        &self << amount
    }
}

impl Shr<u32> for &Number {
    type Output = Number;

    fn shr(self, amount: u32) -> Number {
        self.checked_shr(amount).expect("Number shift failed")
    }
}

impl Shr<u32> for Number {
    type Output = Number;

    fn shr(self, amount: u32) -> Number {
        &self >> amount
    }
}

// ============================================================================
// Unary Operators
// ============================================================================

impl Neg for &Number {
    type Output = Number;

    fn neg(self) -> Number {
        self.checked_neg().expect("Number negation failed")
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        -&self
    }
}

impl Not for &Number {
    type Output = Number;

    fn not(self) -> Number {
        OperatorEngine::global()
            .apply_unary(OperatorKind::BitwiseNot, self)
            .expect("Number bitwise not failed")
    }
}

impl Not for Number {
    type Output = Number;

    fn not(self) -> Number {
        !&self
    }
}

// ============================================================================
// Compound Assignment
// ============================================================================

// The result is converted back into the left operand's type.
macro_rules! assign_operator {
    ($trait:ident, $method:ident, $op:expr, $message:literal) => {
        impl $trait<&Number> for Number {
            fn $method(&mut self, rhs: &Number) {
                OperatorEngine::global().assign($op, self, rhs).expect($message)
            }
        }

        impl $trait<Number> for Number {
            fn $method(&mut self, rhs: Number) {
                $trait::$method(self, &rhs)
            }
        }
    };
}

assign_operator!(AddAssign, add_assign, AssignOp::Add, "Number addition failed");
assign_operator!(SubAssign, sub_assign, AssignOp::Subtract, "Number subtraction failed");
assign_operator!(MulAssign, mul_assign, AssignOp::Multiply, "Number multiplication failed");
assign_operator!(DivAssign, div_assign, AssignOp::Divide, "Number division failed");
assign_operator!(RemAssign, rem_assign, AssignOp::Modulo, "Number remainder failed");
assign_operator!(BitAndAssign, bitand_assign, AssignOp::BitwiseAnd, "Number bitwise and failed");
assign_operator!(BitOrAssign, bitor_assign, AssignOp::BitwiseOr, "Number bitwise or failed");
assign_operator!(BitXorAssign, bitxor_assign, AssignOp::BitwiseXor, "Number bitwise xor failed");
assign_operator!(ShlAssign, shl_assign, AssignOp::ShiftLeft, "Number shift failed");
assign_operator!(ShrAssign, shr_assign, AssignOp::ShiftRight, "Number shift failed");
