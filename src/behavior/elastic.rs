// ============================================================================
// Elastic Tag
// Digit budgets that grow just enough to hold every possible result
// ============================================================================

use crate::domain::{OperatorKind, Tag, TagFamily};
use crate::interfaces::{RuleContext, Shape, TagRule};
use crate::numeric::{NumericError, NumericResult, TypeError};

/// Digit growth per operator.
///
/// | Operator  | Digits                          | Signed            |
/// |-----------|---------------------------------|-------------------|
/// | `+`       | `max + 1`                       | either            |
/// | `-`       | `max + (either signed ? 1 : 0)` | always            |
/// | `*`       | `max(1, c(l) + c(r))`, `c(1)=0` | either            |
/// | `/` `%`   | `D(lhs)`                        | either            |
/// | `&`       | `min`                           | either            |
/// | `\|` `^`  | `max`                           | either            |
/// | `<< n`    | `D(lhs) + n`                    | lhs               |
/// | `>> n`    | `max(1, D(lhs) - n)`            | lhs               |
/// | unary `-` | `D`                             | always            |
///
/// Dynamic shifts drop the Elastic layer: the result keeps the physical width.
pub struct ElasticRule;

impl ElasticRule {
    /// Digits and signedness of `op` applied to the given operand shapes.
    ///
    /// Returns `None` when the result is not governed by an Elastic budget.
    ///
    /// # Errors
    /// - `InvalidShift` when a static left shift pushes the budget past `u32`
    /// - `InvalidType(DigitsExceedStorage)` when any other growth does
    pub fn digits(
        op: OperatorKind,
        lhs: Shape,
        rhs: Option<Shape>,
        static_shift: Option<u32>,
    ) -> NumericResult<Option<(u32, bool)>> {
        let either = lhs.signed || rhs.map(|r| r.signed).unwrap_or(false);
        let grow = |digits: u32, extra: u32| {
            digits
                .checked_add(extra)
                .ok_or(NumericError::InvalidType(TypeError::DigitsExceedStorage))
        };

        let shape = match (op, rhs) {
            (OperatorKind::Add, Some(rhs)) => (grow(lhs.digits.max(rhs.digits), 1)?, either),
            (OperatorKind::Subtract, Some(rhs)) => {
                (grow(lhs.digits.max(rhs.digits), either as u32)?, true)
            },
            (OperatorKind::Multiply, Some(rhs)) => {
                let contribution = |digits: u32| if digits == 1 { 0 } else { digits };
                (grow(contribution(lhs.digits), contribution(rhs.digits))?.max(1), either)
            },
            (OperatorKind::Divide | OperatorKind::Modulo, Some(_)) => (lhs.digits, either),
            (OperatorKind::BitwiseAnd, Some(rhs)) => (lhs.digits.min(rhs.digits), either),
            (OperatorKind::BitwiseOr | OperatorKind::BitwiseXor, Some(rhs)) => {
                (lhs.digits.max(rhs.digits), either)
            },
            (OperatorKind::ShiftLeft | OperatorKind::ShiftRight, Some(_)) => return Ok(None),
            (OperatorKind::ShiftLeft, None) => {
                let amount = static_shift.unwrap_or(0);
                let digits = lhs.digits.checked_add(amount).ok_or(NumericError::InvalidShift)?;
                (digits, lhs.signed)
            },
            (OperatorKind::ShiftRight, None) => {
                let amount = static_shift.unwrap_or(0);
                (lhs.digits.saturating_sub(amount).max(1), lhs.signed)
            },
            (OperatorKind::Negate, _) => (lhs.digits, true),
            _ => (lhs.digits, lhs.signed),
        };
        Ok(Some(shape))
    }
}

impl TagRule for ElasticRule {
    fn family(&self) -> TagFamily {
        TagFamily::Elastic
    }

    fn resolve(
        &self,
        _lhs: Option<&Tag>,
        _rhs: Option<&Tag>,
        ctx: &mut RuleContext,
    ) -> NumericResult<Option<Tag>> {
        match Self::digits(ctx.op, ctx.lhs, ctx.rhs, ctx.raw_shift)? {
            Some((digits, signed)) => {
                ctx.result.digits = digits;
                ctx.result.signed = signed;
                ctx.elastic = true;
                Ok(Some(Tag::Elastic { digits }))
            },
            None => {
                ctx.elastic = false;
                Ok(None)
            },
        }
    }

    fn name(&self) -> &str {
        "elastic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DivisionPolicy;

    fn shape(digits: u32, signed: bool) -> Shape {
        Shape {
            digits,
            signed,
            exponent: 0,
            radix: 2,
        }
    }

    fn digits(op: OperatorKind, lhs: Shape, rhs: Shape) -> (u32, bool) {
        ElasticRule::digits(op, lhs, Some(rhs), None).unwrap().unwrap()
    }

    #[test]
    fn test_add_and_subtract() {
        assert_eq!(digits(OperatorKind::Add, shape(8, false), shape(4, false)), (9, false));
        assert_eq!(digits(OperatorKind::Add, shape(7, true), shape(7, false)), (8, true));
        assert_eq!(digits(OperatorKind::Subtract, shape(8, false), shape(8, false)), (8, true));
        assert_eq!(digits(OperatorKind::Subtract, shape(7, true), shape(3, true)), (8, true));
    }

    #[test]
    fn test_multiply_contributions() {
        // A one-digit operand contributes nothing.
        assert_eq!(digits(OperatorKind::Multiply, shape(1, false), shape(10, false)), (10, false));
        assert_eq!(digits(OperatorKind::Multiply, shape(1, false), shape(1, false)), (1, false));
        assert_eq!(digits(OperatorKind::Multiply, shape(7, true), shape(8, false)), (15, true));
    }

    #[test]
    fn test_division_and_bitwise() {
        assert_eq!(digits(OperatorKind::Divide, shape(12, false), shape(3, true)), (12, true));
        assert_eq!(digits(OperatorKind::Modulo, shape(12, false), shape(3, false)), (12, false));
        assert_eq!(digits(OperatorKind::BitwiseAnd, shape(12, false), shape(3, false)), (3, false));
        assert_eq!(
            digits(OperatorKind::BitwiseXor, shape(12, false), shape(3, false)),
            (12, false)
        );
    }

    #[test]
    fn test_shifts() {
        let lhs = shape(8, true);
        assert_eq!(
            ElasticRule::digits(OperatorKind::ShiftLeft, lhs, None, Some(4)),
            Ok(Some((12, true)))
        );
        assert_eq!(
            ElasticRule::digits(OperatorKind::ShiftRight, lhs, None, Some(20)),
            Ok(Some((1, true)))
        );
        assert_eq!(
            ElasticRule::digits(OperatorKind::ShiftLeft, lhs, Some(shape(3, false)), None),
            Ok(None)
        );
    }

    #[test]
    fn test_growth_past_u32_is_an_error() {
        let huge = shape(u32::MAX - 1, true);
        assert_eq!(
            ElasticRule::digits(OperatorKind::ShiftLeft, shape(3, false), None, Some(u32::MAX - 2)),
            Err(NumericError::InvalidShift)
        );
        assert_eq!(
            ElasticRule::digits(OperatorKind::Add, huge, Some(huge), None),
            Err(NumericError::InvalidType(TypeError::DigitsExceedStorage))
        );
        assert_eq!(
            ElasticRule::digits(OperatorKind::Multiply, huge, Some(shape(8, false)), None),
            Err(NumericError::InvalidType(TypeError::DigitsExceedStorage))
        );
    }

    #[test]
    fn test_resolve_drops_layer_for_dynamic_shift() {
        let lhs = shape(8, true);
        let mut ctx =
            RuleContext::new(OperatorKind::ShiftRight, DivisionPolicy::Lean, lhs, Some(lhs), lhs);
        let tag = ElasticRule
            .resolve(Some(&Tag::elastic(8)), Some(&Tag::elastic(8)), &mut ctx)
            .unwrap();
        assert_eq!(tag, None);
        assert!(!ctx.elastic);
    }

    #[test]
    fn test_negate_is_signed() {
        let mut ctx = RuleContext::new(
            OperatorKind::Negate,
            DivisionPolicy::Lean,
            shape(5, false),
            None,
            shape(5, false),
        );
        let tag = ElasticRule.resolve(Some(&Tag::elastic(5)), None, &mut ctx).unwrap();
        assert_eq!(tag, Some(Tag::elastic(5)));
        assert!(ctx.result.signed);
    }
}
