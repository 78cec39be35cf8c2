// ============================================================================
// Conversion Engine
// The only path by which a value crosses from one number type to another
// ============================================================================

use super::operator_engine::OperatorEngine;
use crate::behavior::{overflow, rounding, scaled};
use crate::domain::{Number, NumberType, RoundingPolicy, Tag, TagFamily};
use crate::numeric::{ExactInt, NumericError, NumericResult, RepType};

impl OperatorEngine {
    /// Store an exact raw value in `ty`, applying its overflow policy.
    ///
    /// # Errors
    /// `Overflow` when `ty` is Throwing and the value is out of range.
    pub fn narrow(&self, raw: ExactInt, ty: &NumberType) -> NumericResult<Number> {
        let raw = overflow::apply(raw, ty, self.event_handler.as_ref())?;
        Number::from_raw_value(ty.clone(), &raw)
    }

    /// Re-express `source` in `dest`.
    ///
    /// Dropped fractional digits are rounded with the destination's rounding
    /// policy, or the source's when the destination has no Rounding tag.
    /// Out-of-range values follow the destination's overflow policy.
    ///
    /// # Errors
    /// `Overflow` when `dest` is Throwing and the value does not fit.
    pub fn convert(&self, source: &Number, dest: &NumberType) -> NumericResult<Number> {
        let src = source.number_type();
        if src == dest {
            return Ok(source.clone());
        }
        let policy = if dest.tags().contains(TagFamily::Rounding) {
            dest.rounding_policy()
        } else {
            src.rounding_policy()
        };
        let raw = scaled::rescale(
            &source.raw_value(),
            (src.exponent(), src.radix()),
            (dest.exponent(), dest.radix()),
            policy,
        )?;
        self.narrow(raw, dest)
    }

    /// Number of type `ty` holding the integer `value`.
    pub fn from_value(&self, ty: &NumberType, value: &ExactInt) -> NumericResult<Number> {
        let (radix, policy) = (ty.radix(), ty.rounding_policy());
        let raw = scaled::rescale(value, (0, radix), (ty.exponent(), radix), policy)?;
        self.narrow(raw, ty)
    }

    pub fn from_i128(&self, ty: &NumberType, value: i128) -> NumericResult<Number> {
        self.from_value(ty, &ExactInt::from_i128(value))
    }

    /// Same value with an Elastic budget of `digits` (storage resized to fit).
    pub fn set_digits(&self, source: &Number, digits: u32) -> NumericResult<Number> {
        let src = source.number_type();
        let rep = RepType::for_digits(digits, src.is_signed());
        let dest = NumberType::new(rep, src.tags().with(Tag::elastic(digits)))?;
        self.convert(source, &dest)
    }

    /// Same value and tags over a different representation.
    pub fn set_rep(&self, source: &Number, rep: RepType) -> NumericResult<Number> {
        let dest = source.number_type().with_rep(rep)?;
        self.convert(source, &dest)
    }

    /// Same value with `tag` replacing (or joining) its family.
    pub fn set_tag(&self, source: &Number, tag: Tag) -> NumericResult<Number> {
        let src = source.number_type();
        let widened = match tag {
            Tag::Elastic { digits } if digits > src.rep().digits() => {
                src.with_rep(RepType::for_digits(digits, src.is_signed()))?
            },
            _ => src.clone(),
        };
        self.convert(source, &widened.with_tag(tag)?)
    }

    /// Same value with the given tag family removed.
    pub fn strip_tag(&self, source: &Number, family: TagFamily) -> NumericResult<Number> {
        self.convert(source, &source.number_type().without(family))
    }

    /// Absolute value in the operand's own type.
    pub fn abs(&self, value: &Number) -> NumericResult<Number> {
        self.narrow(value.raw_value().abs(), value.number_type())
    }

    /// Largest integer not above the value, in the operand's own type.
    pub fn floor(&self, value: &Number) -> NumericResult<Number> {
        let ty = value.number_type();
        if ty.exponent() >= 0 {
            return Ok(value.clone());
        }
        let unit = ExactInt::pow(ty.radix(), ty.exponent().unsigned_abs());
        let whole = rounding::divide(&value.raw_value(), &unit, RoundingPolicy::NegInf)?;
        self.narrow(whole.mul(&unit), ty)
    }

    /// Number of type `ty` closest to `numerator / denominator`, rounded with
    /// the type's rounding policy.
    ///
    /// # Errors
    /// `DivideByZero` for a zero denominator; `Overflow` when `ty` is Throwing
    /// and the quotient does not fit.
    pub fn from_fraction(
        &self,
        ty: &NumberType,
        numerator: &ExactInt,
        denominator: &ExactInt,
    ) -> NumericResult<Number> {
        let unit = ExactInt::pow(ty.radix(), ty.exponent().unsigned_abs());
        let (n, d) = if ty.exponent() <= 0 {
            (numerator.mul(&unit), denominator.clone())
        } else {
            (numerator.clone(), denominator.mul(&unit))
        };
        let raw = rounding::divide(&n, &d, ty.rounding_policy())?;
        self.narrow(raw, ty)
    }

    /// Square root in the operand's own type.
    ///
    /// Native and NegInf rounding keep the floor of the exact root; Nearest
    /// and TieToPosInf round half up.
    ///
    /// # Errors
    /// `NegativeRoot` when the value is below zero.
    pub fn sqrt(&self, value: &Number) -> NumericResult<Number> {
        let ty = value.number_type();
        let raw = value.raw_value();
        if raw.is_negative() {
            return Err(NumericError::NegativeRoot);
        }

        // The root's raw value is sqrt(n / d) with the exponent folded in.
        let unit = ExactInt::pow(ty.radix(), ty.exponent().unsigned_abs());
        let (n, d) = if ty.exponent() <= 0 {
            (raw.mul(&unit), ExactInt::ONE)
        } else {
            (raw, unit)
        };
        let (whole, _) = n.div_rem(&d)?;
        let mut root = whole.isqrt().ok_or(NumericError::NegativeRoot)?;

        if matches!(ty.rounding_policy(), RoundingPolicy::Nearest | RoundingPolicy::TieToPosInf) {
            // Round up when sqrt(n / d) >= root + 1/2.
            let midpoint = root.shl(1).add(&ExactInt::ONE);
            if n.shl(2) >= midpoint.mul(&midpoint).mul(&d) {
                root = root.add(&ExactInt::ONE);
            }
        }
        self.narrow(root, ty)
    }
}
