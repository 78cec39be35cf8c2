// ============================================================================
// Number
// A representation paired with the type that gives it meaning
// ============================================================================

use super::number_type::NumberType;
use crate::numeric::{
    ExactInt, NumericError, NumericResult, OverflowDirection, Representation, TypeError,
};
use rust_decimal::Decimal;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most fractional digits a `Decimal` can carry.
const DECIMAL_MAX_SCALE: u32 = 28;

/// A value of a [`NumberType`].
///
/// Its mathematical value is `raw × radix^exponent`. Numbers are immutable;
/// only increment, decrement and compound assignment replace one in place.
///
/// `==` and `<` compare mathematical values across types. Use
/// [`Number::is_identical`] for bit-exact equality including the type.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Number {
    ty: NumberType,
    rep: Representation,
}

impl Number {
    /// Wrap a representation without applying any policy.
    ///
    /// # Errors
    /// `InvalidType(RepresentationMismatch)` if `rep` is not of `ty`'s
    /// representation type.
    pub fn from_raw(ty: NumberType, rep: Representation) -> NumericResult<Self> {
        if rep.rep_type() != ty.rep() {
            return Err(NumericError::InvalidType(TypeError::RepresentationMismatch));
        }
        Ok(Self { ty, rep })
    }

    /// Store a raw integer without applying any policy.
    ///
    /// # Errors
    /// `Overflow` if the raw value does not fit the physical representation.
    pub fn from_raw_value(ty: NumberType, raw: &ExactInt) -> NumericResult<Self> {
        let rep = Representation::new(ty.rep(), raw)?;
        Ok(Self { ty, rep })
    }

    // Caller guarantees the raw value fits the physical representation.
    pub(crate) fn from_raw_unchecked(ty: NumberType, raw: &ExactInt) -> Self {
        let rep = Representation::wrapping(ty.rep(), raw);
        Self { ty, rep }
    }

    /// Zero of the given type.
    pub fn zero(ty: &NumberType) -> Self {
        Self {
            rep: Representation::zero(ty.rep()),
            ty: ty.clone(),
        }
    }

    /// Highest value of the type.
    pub fn max(ty: &NumberType) -> Self {
        Self::from_raw_unchecked(ty.clone(), &ty.max_raw())
    }

    /// Lowest value of the type.
    pub fn lowest(ty: &NumberType) -> Self {
        Self::from_raw_unchecked(ty.clone(), &ty.lowest_raw())
    }

    /// Smallest positive value (one unit in the last place).
    pub fn min_positive(ty: &NumberType) -> Self {
        Self::from_raw_unchecked(ty.clone(), &ExactInt::ONE)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn number_type(&self) -> &NumberType {
        &self.ty
    }

    /// Underlying representation; `from_raw(ty, to_raw())` is the identity.
    #[inline]
    pub fn to_raw(&self) -> &Representation {
        &self.rep
    }

    pub fn into_raw(self) -> Representation {
        self.rep
    }

    /// Raw integer (the value divided by `radix^exponent`).
    pub fn raw_value(&self) -> ExactInt {
        self.rep.value()
    }

    pub fn is_zero(&self) -> bool {
        self.raw_value().is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.raw_value().is_negative()
    }

    /// Same type and same bits.
    pub fn is_identical(&self, other: &Number) -> bool {
        self.ty == other.ty && self.rep == other.rep
    }

    /// Magnitude bits the raw value occupies.
    pub fn used_digits(&self) -> u32 {
        self.raw_value().used_bits()
    }

    /// Unused magnitude bits above the value, relative to the digit budget.
    pub fn leading_bits(&self) -> u32 {
        self.ty.digits().saturating_sub(self.used_digits())
    }

    /// Mathematical value as an integer, if it is one.
    pub fn to_integer(&self) -> Option<ExactInt> {
        let raw = self.raw_value();
        let exponent = self.ty.exponent();
        if exponent >= 0 {
            return Some(raw.mul(&ExactInt::pow(self.ty.radix(), exponent as u32)));
        }
        let divisor = ExactInt::pow(self.ty.radix(), exponent.unsigned_abs());
        match raw.div_rem(&divisor) {
            Ok((quotient, remainder)) if remainder.is_zero() => Some(quotient),
            _ => None,
        }
    }

    /// Convert to a `Decimal`.
    ///
    /// # Errors
    /// - `PrecisionLoss` if the value needs more than 28 fractional digits or
    ///   the radix has no finite decimal expansion
    /// - `Overflow` if the value exceeds the `Decimal` range
    pub fn to_decimal(&self) -> NumericResult<Decimal> {
        let (mantissa, scale) =
            decimal_expansion(&self.raw_value(), self.ty.exponent(), self.ty.radix())
                .ok_or(NumericError::PrecisionLoss)?;
        if scale > DECIMAL_MAX_SCALE {
            return Err(NumericError::PrecisionLoss);
        }
        let direction = if mantissa.is_negative() {
            OverflowDirection::Negative
        } else {
            OverflowDirection::Positive
        };
        let small = mantissa.to_i128().ok_or(NumericError::Overflow(direction))?;
        Decimal::try_from_i128_with_scale(small, scale)
            .map_err(|_| NumericError::Overflow(direction))
    }
}

/// Finite decimal expansion of `raw × radix^exponent` as `(mantissa, scale)`
/// with trailing zeros removed, or `None` when the radix has prime factors
/// other than 2 and 5 and the exponent is negative.
pub(crate) fn decimal_expansion(
    raw: &ExactInt,
    exponent: i32,
    radix: u32,
) -> Option<(ExactInt, u32)> {
    if exponent >= 0 {
        return Some((raw.mul(&ExactInt::pow(radix, exponent as u32)), 0));
    }

    let mut rest = radix;
    let (mut twos, mut fives) = (0u32, 0u32);
    while rest % 2 == 0 {
        rest /= 2;
        twos += 1;
    }
    while rest % 5 == 0 {
        rest /= 5;
        fives += 1;
    }
    if rest != 1 {
        return None;
    }

    let k = exponent.unsigned_abs();
    let mut scale = k * twos.max(fives);
    let numerator = raw.mul(&ExactInt::pow(10, scale));
    let (mut mantissa, _) = numerator.div_rem(&ExactInt::pow(radix, k)).ok()?;

    let ten = ExactInt::from_i128(10);
    while scale > 0 {
        let (quotient, remainder) = mantissa.div_rem(&ten).ok()?;
        if !remainder.is_zero() {
            break;
        }
        mantissa = quotient;
        scale -= 1;
    }
    Some((mantissa, scale))
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.raw_value();
        let (exponent, radix) = (self.ty.exponent(), self.ty.radix());

        let Some((mantissa, scale)) = decimal_expansion(&raw, exponent, radix) else {
            return write!(f, "{}*{}^{}", raw, radix, exponent);
        };
        if scale == 0 {
            return write!(f, "{}", mantissa);
        }

        let unit = ExactInt::pow(10, scale);
        let magnitude = mantissa.abs();
        let (whole, fraction) = magnitude.div_rem(&unit).map_err(|_| fmt::Error)?;
        let sign = if mantissa.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{}.{:0>width$}",
            sign,
            whole,
            fraction.to_string(),
            width = scale as usize
        )
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number<{}>({})", self.ty, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tag::Tag;
    use crate::numeric::RepType;

    fn fixed(exponent: i32) -> NumberType {
        NumberType::native(RepType::I32).with_tag(Tag::scaled(exponent)).unwrap()
    }

    #[test]
    fn test_raw_round_trip() {
        let ty = fixed(-8);
        let n = Number::from_raw_value(ty.clone(), &ExactInt::from_i128(-300)).unwrap();
        let back = Number::from_raw(ty, n.to_raw().clone()).unwrap();
        assert!(back.is_identical(&n));
    }

    #[test]
    fn test_from_raw_rejects_foreign_representation() {
        let rep = Representation::from_i128(RepType::I8, 1).unwrap();
        let result = Number::from_raw(NumberType::native(RepType::I16), rep);
        assert_eq!(
            result.err(),
            Some(NumericError::InvalidType(TypeError::RepresentationMismatch))
        );
    }

    #[test]
    fn test_display_exact() {
        let half = Number::from_raw_value(fixed(-1), &ExactInt::from_i128(1)).unwrap();
        assert_eq!(half.to_string(), "0.5");

        let neg = Number::from_raw_value(fixed(-4), &ExactInt::from_i128(-25)).unwrap();
        assert_eq!(neg.to_string(), "-1.5625");

        let big = Number::from_raw_value(fixed(3), &ExactInt::from_i128(5)).unwrap();
        assert_eq!(big.to_string(), "40");

        let decimal = NumberType::native(RepType::I32)
            .with_tag(Tag::Scaled { exponent: -2, radix: 10 })
            .unwrap();
        let cents = Number::from_raw_value(decimal, &ExactInt::from_i128(1999)).unwrap();
        assert_eq!(cents.to_string(), "19.99");
    }

    #[test]
    fn test_to_decimal() {
        let n = Number::from_raw_value(fixed(-2), &ExactInt::from_i128(-7)).unwrap();
        assert_eq!(n.to_decimal().unwrap(), Decimal::new(-175, 2));

        let tiny = Number::from_raw_value(fixed(-40), &ExactInt::ONE).unwrap();
        assert_eq!(tiny.to_decimal(), Err(NumericError::PrecisionLoss));
    }

    #[test]
    fn test_limits() {
        let ty = fixed(-4);
        assert_eq!(Number::max(&ty).raw_value(), ExactInt::from_i128(i32::MAX as i128));
        assert_eq!(Number::lowest(&ty).raw_value(), ExactInt::from_i128(i32::MIN as i128));
        assert_eq!(Number::min_positive(&ty).to_string(), "0.0625");
    }

    #[test]
    fn test_digit_queries() {
        let n = Number::from_raw_value(NumberType::native(RepType::I16), &ExactInt::from_i128(5))
            .unwrap();
        assert_eq!(n.used_digits(), 3);
        assert_eq!(n.leading_bits(), 12);
    }

    #[test]
    fn test_to_integer() {
        let n = Number::from_raw_value(fixed(-2), &ExactInt::from_i128(12)).unwrap();
        assert_eq!(n.to_integer(), Some(ExactInt::from_i128(3)));
        let m = Number::from_raw_value(fixed(-2), &ExactInt::from_i128(13)).unwrap();
        assert_eq!(m.to_integer(), None);
    }
}
