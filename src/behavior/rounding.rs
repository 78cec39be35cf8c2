// ============================================================================
// Rounding Tag
// Decides which way discarded low-order bits push a result
// ============================================================================

use crate::domain::{RoundingPolicy, Tag, TagFamily};
use crate::interfaces::{RuleContext, TagRule};
use crate::numeric::{ExactInt, NumericResult};
use std::cmp::Ordering;

/// Rounding layers pass through every operator unchanged; the policy is
/// consulted when a result is divided, right-shifted or rescaled.
pub struct RoundingRule;

impl TagRule for RoundingRule {
    fn family(&self) -> TagFamily {
        TagFamily::Rounding
    }

    fn resolve(
        &self,
        lhs: Option<&Tag>,
        rhs: Option<&Tag>,
        _ctx: &mut RuleContext,
    ) -> NumericResult<Option<Tag>> {
        Ok(lhs.or(rhs).copied())
    }

    fn name(&self) -> &str {
        "rounding"
    }
}

/// `numerator / denominator` rounded by `policy`.
///
/// # Errors
/// `DivideByZero` if the denominator is zero.
pub fn divide(
    numerator: &ExactInt,
    denominator: &ExactInt,
    policy: RoundingPolicy,
) -> NumericResult<ExactInt> {
    let (quotient, remainder) = numerator.div_rem(denominator)?;
    if remainder.is_zero() {
        return Ok(quotient);
    }

    let negative = numerator.is_negative() != denominator.is_negative();
    let away = if negative {
        quotient.sub(&ExactInt::ONE)
    } else {
        quotient.add(&ExactInt::ONE)
    };
    // Twice the remainder against the divisor tells below/at/above the half.
    let half = remainder.abs().shl(1).cmp(&denominator.abs());

    let rounded = match policy {
        RoundingPolicy::Native => quotient,
        RoundingPolicy::NegInf => {
            if negative {
                away
            } else {
                quotient
            }
        },
        RoundingPolicy::Nearest => match half {
            Ordering::Less => quotient,
            _ => away,
        },
        RoundingPolicy::TieToPosInf => match half {
            Ordering::Less => quotient,
            Ordering::Greater => away,
            Ordering::Equal if negative => quotient,
            Ordering::Equal => away,
        },
    };
    Ok(rounded)
}

/// `value / 2^amount` rounded by `policy`.
///
/// Native rounding is the host's arithmetic shift, which floors.
pub fn shift_right(value: &ExactInt, amount: u32, policy: RoundingPolicy) -> ExactInt {
    match policy {
        RoundingPolicy::Native => value.shr(amount),
        _ => divide(value, &ExactInt::power_of_two(amount), policy)
            .unwrap_or_else(|_| value.shr(amount)),
    }
}
