// ============================================================================
// Scaled Tag
// Fixed-point exponent propagation, operand alignment and rescaling
// ============================================================================
//
// A scaled value is `raw × radix^exponent`. Exponents are static: every
// operator derives the result exponent from the operand exponents alone.
//
// | Operator                  | Result exponent                   |
// |---------------------------|-----------------------------------|
// | + - % & | ^               | min(e_l, e_r), operands aligned   |
// | *                         | e_l + e_r                         |
// | / (lean)                  | e_l - e_r                         |
// | / (wide)                  | e_l - e_r - k, k = digits(rhs)    |
// | << n, >> n (static)       | e_l + n, e_l - n; raw untouched   |
// | << x, >> x (dynamic), unary | e_l                             |

use super::rounding;
use crate::domain::{DivisionPolicy, OperatorKind, RoundingPolicy, Tag, TagFamily, DEFAULT_RADIX};
use crate::interfaces::{RuleContext, TagRule};
use crate::numeric::{ExactInt, NumericError, NumericResult};
use std::cmp::Ordering;

pub struct ScaledRule;

impl TagRule for ScaledRule {
    fn family(&self) -> TagFamily {
        TagFamily::Scaled
    }

    fn resolve(
        &self,
        lhs: Option<&Tag>,
        rhs: Option<&Tag>,
        ctx: &mut RuleContext,
    ) -> NumericResult<Option<Tag>> {
        let radix = match lhs.or(rhs) {
            Some(Tag::Scaled { radix, .. }) => *radix,
            _ => DEFAULT_RADIX,
        };
        let lhs_exponent = ctx.lhs.exponent as i64;

        let exponent = match (ctx.op, ctx.rhs) {
            (op, Some(rhs)) if op.aligns_operands() => {
                let target = lhs_exponent.min(rhs.exponent as i64);
                let lhs_steps = steps(lhs_exponent - target)?;
                let rhs_steps = steps(rhs.exponent as i64 - target)?;

                ctx.lhs_alignment = lhs_steps;
                ctx.rhs_alignment = rhs_steps;
                ctx.lhs.digits += alignment_digits(radix, lhs_steps);
                ctx.lhs.exponent = to_exponent(target)?;
                if let Some(shape) = ctx.rhs.as_mut() {
                    shape.digits += alignment_digits(radix, rhs_steps);
                    shape.exponent = to_exponent(target)?;
                }
                target
            },
            (OperatorKind::Multiply, Some(rhs)) => lhs_exponent + rhs.exponent as i64,
            (OperatorKind::Divide, Some(rhs)) => match ctx.division {
                DivisionPolicy::Lean => lhs_exponent - rhs.exponent as i64,
                DivisionPolicy::Wide => {
                    let k = radix_digits_for(rhs.digits, radix);
                    ctx.dividend_scale = k;
                    ctx.lhs.digits += alignment_digits(radix, k);
                    ctx.required_digits = ctx.required_digits.max(ctx.lhs.digits);
                    lhs_exponent - rhs.exponent as i64 - k as i64
                },
            },
            (OperatorKind::ShiftLeft, None) => match ctx.static_shift {
                Some(amount) => {
                    ctx.raw_shift = None;
                    lhs_exponent + amount as i64
                },
                None => lhs_exponent,
            },
            (OperatorKind::ShiftRight, None) => match ctx.static_shift {
                Some(amount) => {
                    ctx.raw_shift = None;
                    lhs_exponent - amount as i64
                },
                None => lhs_exponent,
            },
            _ => lhs_exponent,
        };

        let exponent = to_exponent(exponent)?;
        ctx.result.exponent = exponent;
        ctx.result.radix = radix;
        Ok(Some(Tag::Scaled { exponent, radix }))
    }

    fn name(&self) -> &str {
        "scaled"
    }
}

fn to_exponent(value: i64) -> NumericResult<i32> {
    i32::try_from(value).map_err(|_| NumericError::PrecisionLoss)
}

fn steps(value: i64) -> NumericResult<u32> {
    u32::try_from(value).map_err(|_| NumericError::PrecisionLoss)
}

/// Extra binary digits a value gains when multiplied by `radix^steps`.
pub fn alignment_digits(radix: u32, steps: u32) -> u32 {
    if steps == 0 {
        return 0;
    }
    if radix.is_power_of_two() {
        return radix.trailing_zeros() * steps;
    }
    ExactInt::pow(radix, steps).sub(&ExactInt::ONE).used_bits()
}

/// Smallest `k` with `radix^k >= 2^bits`.
pub fn radix_digits_for(bits: u32, radix: u32) -> u32 {
    if radix.is_power_of_two() {
        return bits.div_ceil(radix.trailing_zeros());
    }
    let target = ExactInt::power_of_two(bits);
    let base = ExactInt::from_i128(radix as i128);
    let mut power = ExactInt::ONE;
    let mut k = 0;
    while power < target {
        power = power.mul(&base);
        k += 1;
    }
    k
}

/// Re-express `raw × from.1^from.0` as a raw value at scale `to`, rounding
/// any discarded fraction with `policy`.
pub fn rescale(
    raw: &ExactInt,
    from: (i32, u32),
    to: (i32, u32),
    policy: RoundingPolicy,
) -> NumericResult<ExactInt> {
    let (from_exponent, from_radix) = from;
    let (to_exponent, to_radix) = to;

    if from_radix == to_radix {
        let delta = from_exponent as i64 - to_exponent as i64;
        let power = ExactInt::pow(from_radix, steps(delta.abs())?);
        return if delta >= 0 {
            Ok(raw.mul(&power))
        } else {
            rounding::divide(raw, &power, policy)
        };
    }

    let (from_num, from_den) = ratio(from_exponent, from_radix);
    let (to_num, to_den) = ratio(to_exponent, to_radix);
    let numerator = raw.mul(&from_num).mul(&to_den);
    let denominator = from_den.mul(&to_num);
    if denominator == ExactInt::ONE {
        Ok(numerator)
    } else {
        rounding::divide(&numerator, &denominator, policy)
    }
}

/// `radix^exponent` as a positive fraction.
fn ratio(exponent: i32, radix: u32) -> (ExactInt, ExactInt) {
    let power = ExactInt::pow(radix, exponent.unsigned_abs());
    if exponent >= 0 {
        (power, ExactInt::ONE)
    } else {
        (ExactInt::ONE, power)
    }
}

/// Order of two scaled values by their exact mathematical value.
pub fn compare(
    lhs: &ExactInt,
    lhs_scale: (i32, u32),
    rhs: &ExactInt,
    rhs_scale: (i32, u32),
) -> Ordering {
    if lhs_scale.1 == rhs_scale.1 {
        let radix = lhs_scale.1;
        let target = lhs_scale.0.min(rhs_scale.0);
        let left = lhs.mul(&ExactInt::pow(radix, lhs_scale.0.abs_diff(target)));
        let right = rhs.mul(&ExactInt::pow(radix, rhs_scale.0.abs_diff(target)));
        return left.cmp(&right);
    }

    let (lhs_num, lhs_den) = ratio(lhs_scale.0, lhs_scale.1);
    let (rhs_num, rhs_den) = ratio(rhs_scale.0, rhs_scale.1);
    let left = lhs.mul(&lhs_num).mul(&rhs_den);
    let right = rhs.mul(&rhs_num).mul(&lhs_den);
    left.cmp(&right)
}
