// ============================================================================
// Operator Evaluation
// Executes resolved operators on raw values
// ============================================================================
//
// Evaluation never trusts the host integer type: operands are aligned and
// combined as exact integers, and only the final narrowing into the resolved
// result type applies overflow and rounding policy.

use super::operator_engine::OperatorEngine;
use super::resolution::Resolution;
use crate::behavior::{rounding, scaled};
use crate::domain::{AssignOp, DivisionPolicy, Number, NumberType, OperatorKind};
use crate::numeric::{ExactInt, NumericError, NumericResult, RepType};
use std::cmp::Ordering;

/// Largest amount accepted by a static or dynamic shift.
pub const MAX_SHIFT: u32 = 1 << 16;

impl OperatorEngine {
    // ========================================================================
    // Binary Operators
    // ========================================================================

    /// Evaluate a binary arithmetic, bitwise or shift operator.
    ///
    /// `CompoundAssign(op)` evaluates `op` without writing back; use
    /// [`OperatorEngine::assign`] to update a number in place.
    ///
    /// # Errors
    /// - `IncompatibleTags` when the operand types cannot be combined
    /// - `DivideByZero` for `/` or `%` by zero
    /// - `InvalidShift` for a negative, fractional or huge shift amount
    /// - `Overflow` when the result type is Throwing and the result is out of range
    /// - `UnsupportedOperator` for comparisons and unary operators
    pub fn apply(&self, op: OperatorKind, lhs: &Number, rhs: &Number) -> NumericResult<Number> {
        match op {
            OperatorKind::CompoundAssign(assign) => self.apply(assign.binary(), lhs, rhs),
            op if op.is_arithmetic() => {
                let resolution = self.resolve(op, lhs.number_type(), rhs.number_type())?;
                self.evaluate(&resolution, lhs, rhs)
            },
            _ => Err(NumericError::UnsupportedOperator),
        }
    }

    /// Evaluate a comparison on exact mathematical values.
    ///
    /// Tag stacks are ignored, so comparisons never fail on a tag mismatch.
    pub fn compare(&self, op: OperatorKind, lhs: &Number, rhs: &Number) -> NumericResult<bool> {
        let ordering = self.ordering(lhs, rhs);
        match op {
            OperatorKind::Equal => Ok(ordering == Ordering::Equal),
            OperatorKind::NotEqual => Ok(ordering != Ordering::Equal),
            OperatorKind::Less => Ok(ordering == Ordering::Less),
            OperatorKind::Greater => Ok(ordering == Ordering::Greater),
            OperatorKind::LessEq => Ok(ordering != Ordering::Greater),
            OperatorKind::GreaterEq => Ok(ordering != Ordering::Less),
            _ => Err(NumericError::UnsupportedOperator),
        }
    }

    /// Three-way comparison of exact values.
    pub fn ordering(&self, lhs: &Number, rhs: &Number) -> Ordering {
        let (l, r) = (lhs.number_type(), rhs.number_type());
        scaled::compare(
            &lhs.raw_value(),
            (l.exponent(), l.radix()),
            &rhs.raw_value(),
            (r.exponent(), r.radix()),
        )
    }

    /// Division with an explicit result shape.
    pub fn divide_with(
        &self,
        lhs: &Number,
        rhs: &Number,
        policy: DivisionPolicy,
    ) -> NumericResult<Number> {
        let resolution = self.resolve_division(lhs.number_type(), rhs.number_type(), policy)?;
        self.evaluate(&resolution, lhs, rhs)
    }

    /// Named division: keeps the quotient's fractional precision by default.
    pub fn quotient(&self, lhs: &Number, rhs: &Number) -> NumericResult<Number> {
        self.divide_with(lhs, rhs, self.config.named_division)
    }

    fn evaluate(
        &self,
        resolution: &Resolution,
        lhs: &Number,
        rhs: &Number,
    ) -> NumericResult<Number> {
        let ty = resolution
            .result_type()
            .ok_or(NumericError::UnsupportedOperator)?;
        let radix = ty.radix();
        let policy = ty.rounding_policy();
        let a = align(&lhs.raw_value(), radix, resolution.lhs_alignment);
        let b = align(&rhs.raw_value(), radix, resolution.rhs_alignment);

        let exact = match resolution.op {
            OperatorKind::Add => a.add(&b),
            OperatorKind::Subtract => a.sub(&b),
            OperatorKind::Multiply => a.mul(&b),
            OperatorKind::Divide => {
                let dividend = align(&a, radix, resolution.dividend_scale);
                rounding::divide(&dividend, &b, policy)?
            },
            OperatorKind::Modulo => a.div_rem(&b)?.1,
            OperatorKind::BitwiseAnd => a.bitand(&b),
            OperatorKind::BitwiseOr => a.bitor(&b),
            OperatorKind::BitwiseXor => a.bitxor(&b),
            OperatorKind::ShiftLeft => a.shl(shift_amount(rhs)?),
            OperatorKind::ShiftRight => rounding::shift_right(&a, shift_amount(rhs)?, policy),
            _ => return Err(NumericError::UnsupportedOperator),
        };
        self.narrow(exact, ty)
    }

    // ========================================================================
    // Unary Operators and Static Shifts
    // ========================================================================

    /// Evaluate `-x`, `+x`, `~x`, or an increment/decrement on a copy.
    pub fn apply_unary(&self, op: OperatorKind, operand: &Number) -> NumericResult<Number> {
        match op {
            OperatorKind::Negate | OperatorKind::Plus | OperatorKind::BitwiseNot => {
                let resolution = self.resolve_unary(op, operand.number_type())?;
                let ty = resolution
                    .result_type()
                    .ok_or(NumericError::UnsupportedOperator)?;
                let raw = operand.raw_value();
                let exact = match op {
                    OperatorKind::Negate => raw.neg(),
                    OperatorKind::BitwiseNot if ty.is_signed() => raw.not(),
                    OperatorKind::BitwiseNot => ty.max_raw().sub(&raw),
                    _ => raw,
                };
                self.narrow(exact, ty)
            },
            OperatorKind::PreIncrement
            | OperatorKind::PreDecrement
            | OperatorKind::PostIncrement
            | OperatorKind::PostDecrement => {
                let mut target = operand.clone();
                self.step(op, &mut target)
            },
            _ => Err(NumericError::UnsupportedOperator),
        }
    }

    /// Shift by an amount fixed up front.
    ///
    /// Scaled numbers only move their exponent; other numbers shift raw bits
    /// (growing or shrinking an Elastic budget by the amount).
    pub fn shift_static(
        &self,
        op: OperatorKind,
        lhs: &Number,
        amount: u32,
    ) -> NumericResult<Number> {
        if !op.is_shift() {
            return Err(NumericError::UnsupportedOperator);
        }
        if amount > MAX_SHIFT {
            return Err(NumericError::InvalidShift);
        }
        let resolution = self.resolve_static_shift(op, lhs.number_type(), amount)?;
        let ty = resolution
            .result_type()
            .ok_or(NumericError::UnsupportedOperator)?;
        let raw = lhs.raw_value();
        let exact = match (op, resolution.raw_shift) {
            (_, None) => raw,
            (OperatorKind::ShiftLeft, Some(n)) => raw.shl(n),
            (_, Some(n)) => rounding::shift_right(&raw, n, ty.rounding_policy()),
        };
        self.narrow(exact, ty)
    }

    // ========================================================================
    // In-place Operators
    // ========================================================================

    /// `target op= rhs`: evaluate the binary operator, then convert the result
    /// back into the target's type.
    pub fn assign(&self, op: AssignOp, target: &mut Number, rhs: &Number) -> NumericResult<()> {
        let result = self.apply(op.binary(), target, rhs)?;
        *target = self.convert(&result, target.number_type())?;
        Ok(())
    }

    /// Increment or decrement in place.
    ///
    /// Returns the new value for the prefix forms and the prior value for the
    /// postfix forms. On error the target is left unchanged.
    pub fn step(&self, op: OperatorKind, target: &mut Number) -> NumericResult<Number> {
        let (assign, postfix) = match op {
            OperatorKind::PreIncrement => (AssignOp::Add, false),
            OperatorKind::PostIncrement => (AssignOp::Add, true),
            OperatorKind::PreDecrement => (AssignOp::Subtract, false),
            OperatorKind::PostDecrement => (AssignOp::Subtract, true),
            _ => return Err(NumericError::UnsupportedOperator),
        };
        let previous = target.clone();
        self.assign(assign, target, &unit())?;
        Ok(if postfix { previous } else { target.clone() })
    }
}

/// Plain `1` used by increment and decrement.
fn unit() -> Number {
    Number::from_raw_unchecked(NumberType::native(RepType::U8), &ExactInt::ONE)
}

fn align(raw: &ExactInt, radix: u32, steps: u32) -> ExactInt {
    if steps == 0 {
        raw.clone()
    } else {
        raw.mul(&ExactInt::pow(radix, steps))
    }
}

/// Shift amount carried by a number: a non-negative integer up to
/// [`MAX_SHIFT`].
fn shift_amount(amount: &Number) -> NumericResult<u32> {
    let value = amount.to_integer().ok_or(NumericError::InvalidShift)?;
    match value.to_i128() {
        Some(v) if (0..=MAX_SHIFT as i128).contains(&v) => Ok(v as u32),
        _ => Err(NumericError::InvalidShift),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineConfig, OverflowPolicy, RoundingPolicy, Tag, TagStack};
    use crate::engine::DispatchTable;
    use crate::interfaces::NoOpEventHandler;
    use std::sync::Arc;

    fn engine() -> OperatorEngine {
        OperatorEngine::new(
            EngineConfig::standard(),
            DispatchTable::standard(),
            Arc::new(NoOpEventHandler),
        )
    }

    fn ty(rep: RepType, tags: &[Tag]) -> NumberType {
        NumberType::new(rep, TagStack::from_tags(tags.iter().copied()).unwrap()).unwrap()
    }

    fn elastic(digits: u32, signed: bool) -> NumberType {
        ty(RepType::for_digits(digits, signed), &[Tag::elastic(digits)])
    }

    fn num(engine: &OperatorEngine, ty: &NumberType, value: i128) -> Number {
        engine.from_i128(ty, value).unwrap()
    }

    fn raw(ty: &NumberType, raw: i128) -> Number {
        Number::from_raw_value(ty.clone(), &ExactInt::from_i128(raw)).unwrap()
    }

    #[test]
    fn test_elastic_addition_never_overflows() {
        let engine = engine();
        let e7 = elastic(7, true);
        let high = num(&engine, &e7, 127);
        let sum = engine.apply(OperatorKind::Add, &high, &high).unwrap();
        assert_eq!(sum.to_string(), "254");
        assert_eq!(sum.number_type().digits(), 8);

        let low = num(&engine, &e7, -127);
        let low = engine.apply(OperatorKind::Add, &low, &low).unwrap();
        assert_eq!(low.to_string(), "-254");
    }

    #[test]
    fn test_saturating_and_throwing_int8() {
        let engine = engine();
        let sat = ty(RepType::I8, &[Tag::Overflow(OverflowPolicy::Saturating)]);
        let one = num(&engine, &sat, 1);

        let high = engine.apply(OperatorKind::Add, &num(&engine, &sat, 127), &one).unwrap();
        assert_eq!(high.to_string(), "127");
        let low = engine.apply(OperatorKind::Subtract, &num(&engine, &sat, -128), &one).unwrap();
        assert_eq!(low.to_string(), "-128");

        let thr = ty(RepType::I8, &[Tag::Overflow(OverflowPolicy::Throwing)]);
        let one = num(&engine, &thr, 1);
        assert_eq!(
            engine.apply(OperatorKind::Add, &num(&engine, &thr, 127), &one).err(),
            Some(NumericError::positive_overflow())
        );
        assert_eq!(
            engine.apply(OperatorKind::Subtract, &num(&engine, &thr, -128), &one).err(),
            Some(NumericError::negative_overflow())
        );
    }

    #[test]
    fn test_native_wraps() {
        let engine = engine();
        let i8 = NumberType::native(RepType::I8);
        let hundred = num(&engine, &i8, 100);
        let sum = engine.apply(OperatorKind::Add, &hundred, &hundred).unwrap();
        assert_eq!(sum.to_string(), "-56");
    }

    #[test]
    fn test_scaled_addition_aligns_exactly() {
        let engine = engine();
        let q2 = ty(RepType::I32, &[Tag::scaled(-2)]);
        let q5 = ty(RepType::I32, &[Tag::scaled(-5)]);
        let a = raw(&q2, 7); // 1.75
        let b = raw(&q5, 3); // 0.09375

        let sum = engine.apply(OperatorKind::Add, &a, &b).unwrap();
        assert_eq!(sum.number_type().exponent(), -5);
        assert_eq!(sum.to_string(), "1.84375");

        let pre_aligned = engine.convert(&a, &q5).unwrap();
        let aligned_sum = engine.apply(OperatorKind::Add, &pre_aligned, &b).unwrap();
        assert!(aligned_sum.is_identical(&sum));
    }

    #[test]
    fn test_nearest_rounding_division() {
        let engine = engine();
        let nearest = ty(RepType::I32, &[Tag::Rounding(RoundingPolicy::Nearest)]);
        let divide = |n: i128, d: i128| {
            engine
                .apply(OperatorKind::Divide, &num(&engine, &nearest, n), &num(&engine, &nearest, d))
                .unwrap()
                .to_string()
        };
        assert_eq!(divide(1, 2), "1");
        assert_eq!(divide(-1, 2), "-1");
        assert_eq!(divide(49, 100), "0");
        assert_eq!(divide(7, 2), "4");
    }

    #[test]
    fn test_elastic_multiply_digits() {
        let engine = engine();
        let product = engine
            .apply(
                OperatorKind::Multiply,
                &num(&engine, &elastic(1, false), 1),
                &num(&engine, &elastic(10, false), 1023),
            )
            .unwrap();
        assert_eq!(product.number_type().digits(), 10);
        assert_eq!(product.to_string(), "1023");
    }

    #[test]
    fn test_lean_and_wide_division() {
        let engine = engine();
        let i32 = NumberType::native(RepType::I32);
        let a = num(&engine, &i32, 7);
        let b = num(&engine, &i32, 3);

        let lean = engine.apply(OperatorKind::Divide, &a, &b).unwrap();
        assert_eq!(lean.to_string(), "2");
        assert!(lean.number_type().rep().width() <= 32);

        let wide = engine.quotient(&a, &b).unwrap();
        assert_eq!(wide.number_type().exponent(), -31);
        let product = engine.apply(OperatorKind::Multiply, &wide, &b).unwrap();
        let recovered = engine.convert(&product, &i32).unwrap();
        let error = recovered.raw_value().sub(&a.raw_value()).abs();
        assert!(error <= ExactInt::ONE);
    }

    #[test]
    fn test_divide_by_zero_is_error() {
        let engine = engine();
        let sat = ty(RepType::I8, &[Tag::Overflow(OverflowPolicy::Saturating)]);
        let zero = num(&engine, &sat, 0);
        let one = num(&engine, &sat, 1);
        for op in [OperatorKind::Divide, OperatorKind::Modulo] {
            assert_eq!(engine.apply(op, &one, &zero).err(), Some(NumericError::DivideByZero));
        }
        assert_eq!(engine.quotient(&one, &zero).err(), Some(NumericError::DivideByZero));
    }

    #[test]
    fn test_modulo_and_bitwise() {
        let engine = engine();
        let i16 = NumberType::native(RepType::I16);
        let a = num(&engine, &i16, -7);
        let b = num(&engine, &i16, 3);
        assert_eq!(engine.apply(OperatorKind::Modulo, &a, &b).unwrap().to_string(), "-1");
        assert_eq!(engine.apply(OperatorKind::BitwiseAnd, &a, &b).unwrap().to_string(), "1");
        assert_eq!(engine.apply(OperatorKind::BitwiseOr, &a, &b).unwrap().to_string(), "-5");
        assert_eq!(engine.apply(OperatorKind::BitwiseXor, &a, &b).unwrap().to_string(), "-6");
    }

    #[test]
    fn test_dynamic_shifts() {
        let engine = engine();
        let e8 = elastic(8, true);
        let amount = num(&engine, &elastic(3, false), 3);

        let left = engine.apply(OperatorKind::ShiftLeft, &num(&engine, &e8, 5), &amount).unwrap();
        assert_eq!(left.to_string(), "40");
        assert_eq!(left.number_type(), &NumberType::native(RepType::I16));

        let right = engine
            .apply(OperatorKind::ShiftRight, &num(&engine, &e8, -20), &amount)
            .unwrap();
        assert_eq!(right.to_string(), "-3");

        // Native right shift floors like the host `>>`
        let i8 = NumberType::native(RepType::I8);
        let one = num(&engine, &i8, 1);
        for (value, shifted) in [(-5, "-3"), (5, "2")] {
            let x = num(&engine, &i8, value);
            let result = engine.apply(OperatorKind::ShiftRight, &x, &one).unwrap();
            assert_eq!(result.to_string(), shifted);
        }

        let negative = num(&engine, &NumberType::native(RepType::I8), -1);
        assert_eq!(
            engine.apply(OperatorKind::ShiftLeft, &left, &negative).err(),
            Some(NumericError::InvalidShift)
        );
        let fractional = raw(&ty(RepType::I8, &[Tag::scaled(-1)]), 1);
        assert_eq!(
            engine.apply(OperatorKind::ShiftLeft, &left, &fractional).err(),
            Some(NumericError::InvalidShift)
        );
    }

    #[test]
    fn test_static_shifts() {
        let engine = engine();
        let x = num(&engine, &elastic(8, true), 200);

        let left = engine.shift_static(OperatorKind::ShiftLeft, &x, 4).unwrap();
        assert_eq!(left.to_string(), "3200");
        assert_eq!(left.number_type().digits(), 12);

        let right = engine.shift_static(OperatorKind::ShiftRight, &x, 3).unwrap();
        assert_eq!(right.to_string(), "25");
        assert_eq!(right.number_type().digits(), 5);

        let fixed = raw(&ty(RepType::I16, &[Tag::scaled(-4)]), 40); // 2.5
        let shifted = engine.shift_static(OperatorKind::ShiftLeft, &fixed, 2).unwrap();
        assert_eq!(shifted.to_raw(), fixed.to_raw());
        assert_eq!(shifted.number_type().exponent(), -2);
        assert_eq!(shifted.to_string(), "10");
    }

    #[test]
    fn test_static_shift_amount_bounded() {
        let engine = engine();
        let x = num(&engine, &elastic(3, false), 5);
        let native = num(&engine, &NumberType::native(RepType::I32), 5);

        for amount in [MAX_SHIFT + 1, u32::MAX - 2, u32::MAX] {
            assert_eq!(
                engine.shift_static(OperatorKind::ShiftLeft, &x, amount).err(),
                Some(NumericError::InvalidShift)
            );
            assert_eq!(
                engine.shift_static(OperatorKind::ShiftRight, &native, amount).err(),
                Some(NumericError::InvalidShift)
            );
        }

        let widest = engine.shift_static(OperatorKind::ShiftLeft, &x, MAX_SHIFT).unwrap();
        assert_eq!(widest.number_type().digits(), 3 + MAX_SHIFT);
    }

    #[test]
    fn test_unary() {
        let engine = engine();
        let x = num(&engine, &elastic(5, false), 20);

        let negated = engine.apply_unary(OperatorKind::Negate, &x).unwrap();
        assert_eq!(negated.to_string(), "-20");
        assert!(negated.number_type().is_signed());

        let inverted = engine.apply_unary(OperatorKind::BitwiseNot, &x).unwrap();
        assert_eq!(inverted.to_string(), "11");

        let signed = num(&engine, &NumberType::native(RepType::I8), 5);
        let inverted = engine.apply_unary(OperatorKind::BitwiseNot, &signed).unwrap();
        assert_eq!(inverted.to_string(), "-6");
        assert_eq!(engine.apply_unary(OperatorKind::Plus, &signed).unwrap().to_string(), "5");
    }

    #[test]
    fn test_comparisons_across_types() {
        let engine = engine();
        let half = raw(&ty(RepType::I8, &[Tag::scaled(-1)]), 1);
        let decimal_half = raw(&ty(RepType::I8, &[Tag::Scaled { exponent: -1, radix: 10 }]), 5);
        let saturating = ty(RepType::I8, &[Tag::Overflow(OverflowPolicy::Saturating)]);
        let sat_one = num(&engine, &saturating, 1);

        assert!(engine.compare(OperatorKind::Equal, &half, &decimal_half).unwrap());
        assert!(engine.compare(OperatorKind::Less, &half, &sat_one).unwrap());
        assert!(engine.compare(OperatorKind::GreaterEq, &sat_one, &half).unwrap());
        assert!(!engine.compare(OperatorKind::NotEqual, &half, &decimal_half).unwrap());
        assert_eq!(
            engine.compare(OperatorKind::Add, &half, &half),
            Err(NumericError::UnsupportedOperator)
        );
    }

    #[test]
    fn test_compound_assignment() {
        let engine = engine();
        let sat = ty(RepType::I8, &[Tag::Overflow(OverflowPolicy::Saturating)]);
        let mut x = num(&engine, &sat, 100);
        engine.assign(AssignOp::Add, &mut x, &num(&engine, &sat, 100)).unwrap();
        assert_eq!(x.to_string(), "127");
        assert_eq!(x.number_type(), &sat);

        // Mismatched tags fall back to plain wrapping arithmetic.
        let mut y = num(&engine, &sat, 100);
        engine.assign(AssignOp::Add, &mut y, &num(&engine, &elastic(7, true), 100)).unwrap();
        assert_eq!(y.to_string(), "-56");
        assert_eq!(y.number_type(), &sat);

        engine.assign(AssignOp::ShiftRight, &mut x, &num(&engine, &sat, 2)).unwrap();
        assert_eq!(x.to_string(), "31");
    }

    #[test]
    fn test_increment_and_decrement() {
        let engine = engine();
        let sat = ty(RepType::I8, &[Tag::Overflow(OverflowPolicy::Saturating)]);
        let mut x = num(&engine, &sat, 126);

        let previous = engine.step(OperatorKind::PostIncrement, &mut x).unwrap();
        assert_eq!(previous.to_string(), "126");
        assert_eq!(x.to_string(), "127");

        let next = engine.step(OperatorKind::PreIncrement, &mut x).unwrap();
        assert_eq!(next.to_string(), "127");

        let decremented = engine.step(OperatorKind::PreDecrement, &mut x).unwrap();
        assert_eq!(decremented.to_string(), "126");

        let fixed = raw(&ty(RepType::I16, &[Tag::scaled(-4)]), 8); // 0.5
        let bumped = engine.apply_unary(OperatorKind::PostDecrement, &fixed).unwrap();
        assert!(bumped.is_identical(&fixed));
    }

    #[test]
    fn test_increment_throwing_leaves_target() {
        let engine = engine();
        let thr = ty(RepType::I8, &[Tag::Overflow(OverflowPolicy::Throwing)]);
        let mut x = num(&engine, &thr, 127);
        assert_eq!(
            engine.step(OperatorKind::PreIncrement, &mut x).err(),
            Some(NumericError::positive_overflow())
        );
        assert_eq!(x.to_string(), "127");
    }

    #[test]
    fn test_unsupported_forms() {
        let engine = engine();
        let x = num(&engine, &NumberType::native(RepType::I8), 1);
        let unsupported = Some(NumericError::UnsupportedOperator);
        assert_eq!(engine.apply(OperatorKind::Less, &x, &x).err(), unsupported);
        assert_eq!(engine.apply_unary(OperatorKind::Add, &x).err(), unsupported);
        assert_eq!(
            engine.shift_static(OperatorKind::Add, &x, 1).err(),
            Some(NumericError::UnsupportedOperator)
        );
    }
}
