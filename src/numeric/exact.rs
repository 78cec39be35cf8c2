// ============================================================================
// Exact Integer
// Unbounded signed integer used for intermediate results
// ============================================================================
//
// Every operator computes its mathematically exact result first and only then
// narrows into the destination type. Values that fit an i128 stay on the
// native fast path; anything larger moves into a WideInteger sized to hold the
// exact result.

use super::errors::{NumericError, NumericResult};
use super::wide_integer::{WideInteger, LIMB_BITS};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Exact signed integer: native `i128` when it fits, limbs otherwise.
///
/// Normalized: the `Wide` variant only ever holds values outside the `i128`
/// range. Equality and hashing look at the value, not the limb count.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExactInt {
    Small(i128),
    Wide(WideInteger),
}

impl ExactInt {
    pub const ZERO: ExactInt = ExactInt::Small(0);
    pub const ONE: ExactInt = ExactInt::Small(1);

    // ========================================================================
    // Construction
    // ========================================================================

    #[inline]
    pub const fn from_i128(value: i128) -> Self {
        ExactInt::Small(value)
    }

    /// Interpreted value of a wide integer (signed or unsigned).
    pub fn from_wide(value: &WideInteger) -> Self {
        if let Some(small) = value.to_i128() {
            return ExactInt::Small(small);
        }
        let signed = if value.is_signed() {
            value.clone()
        } else {
            value.resize(value.width() + LIMB_BITS, true)
        };
        ExactInt::Wide(signed)
    }

    /// `2^exponent`.
    pub fn power_of_two(exponent: u32) -> Self {
        if exponent < 127 {
            ExactInt::Small(1i128 << exponent)
        } else {
            ExactInt::Wide(WideInteger::power_of_two(exponent + 2, true, exponent))
        }
    }

    /// `base^exponent` by repeated squaring.
    pub fn pow(base: u32, exponent: u32) -> Self {
        if base.is_power_of_two() {
            return Self::power_of_two(base.trailing_zeros() * exponent);
        }
        let mut result = ExactInt::ONE;
        let mut square = ExactInt::from_i128(base as i128);
        let mut remaining = exponent;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.mul(&square);
            }
            remaining >>= 1;
            if remaining > 0 {
                square = square.mul(&square);
            }
        }
        result
    }

    fn normalize(value: WideInteger) -> Self {
        match value.to_i128() {
            Some(small) => ExactInt::Small(small),
            None => ExactInt::Wide(value),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn to_i128(&self) -> Option<i128> {
        match self {
            ExactInt::Small(v) => Some(*v),
            ExactInt::Wide(_) => None,
        }
    }

    /// Two's-complement pattern at the given width (wraps when too narrow).
    pub fn to_wide(&self, width: u32, signed: bool) -> WideInteger {
        match self {
            ExactInt::Small(v) => WideInteger::from_i128(width, signed, *v),
            ExactInt::Wide(w) => w.resize(width, signed),
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, ExactInt::Small(0))
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        match self {
            ExactInt::Small(v) => *v < 0,
            ExactInt::Wide(w) => w.is_negative(),
        }
    }

    /// Magnitude bits, sign excluded (`-x - 1` for negatives).
    pub fn used_bits(&self) -> u32 {
        match self {
            ExactInt::Small(v) => {
                let magnitude = if *v < 0 { !*v } else { *v };
                128 - magnitude.leading_zeros()
            },
            ExactInt::Wide(w) => w.used_bits(),
        }
    }

    /// Bits needed to hold the value in two's complement.
    #[inline]
    pub fn bit_len(&self) -> u32 {
        self.used_bits() + 1
    }

    pub fn trailing_zeros(&self) -> Option<u32> {
        match self {
            ExactInt::Small(0) => None,
            ExactInt::Small(v) => Some(v.trailing_zeros()),
            ExactInt::Wide(w) => w.trailing_zeros(),
        }
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    fn wide_binary(
        &self,
        rhs: &Self,
        width: u32,
        op: impl Fn(&WideInteger, &WideInteger) -> WideInteger,
    ) -> Self {
        let a = self.to_wide(width, true);
        let b = rhs.to_wide(width, true);
        Self::normalize(op(&a, &b))
    }

    fn common_width(&self, rhs: &Self, extra: u32) -> u32 {
        self.bit_len().max(rhs.bit_len()) + extra
    }

    pub fn add(&self, rhs: &Self) -> Self {
        if let (ExactInt::Small(a), ExactInt::Small(b)) = (self, rhs) {
            if let Some(sum) = a.checked_add(*b) {
                return ExactInt::Small(sum);
            }
        }
        let width = self.common_width(rhs, 1);
        self.wide_binary(rhs, width, WideInteger::wrapping_add)
    }

    pub fn sub(&self, rhs: &Self) -> Self {
        if let (ExactInt::Small(a), ExactInt::Small(b)) = (self, rhs) {
            if let Some(diff) = a.checked_sub(*b) {
                return ExactInt::Small(diff);
            }
        }
        let width = self.common_width(rhs, 1);
        self.wide_binary(rhs, width, WideInteger::wrapping_sub)
    }

    pub fn mul(&self, rhs: &Self) -> Self {
        if let (ExactInt::Small(a), ExactInt::Small(b)) = (self, rhs) {
            if let Some(product) = a.checked_mul(*b) {
                return ExactInt::Small(product);
            }
        }
        let width = self.bit_len() + rhs.bit_len();
        self.wide_binary(rhs, width, WideInteger::wrapping_mul)
    }

    pub fn neg(&self) -> Self {
        ExactInt::ZERO.sub(self)
    }

    pub fn abs(&self) -> Self {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    /// Truncating division; the remainder takes the dividend's sign.
    ///
    /// # Errors
    /// Returns `DivideByZero` if `rhs` is zero.
    pub fn div_rem(&self, rhs: &Self) -> NumericResult<(Self, Self)> {
        if rhs.is_zero() {
            return Err(NumericError::DivideByZero);
        }
        if let (ExactInt::Small(a), ExactInt::Small(b)) = (self, rhs) {
            if let (Some(q), Some(r)) = (a.checked_div(*b), a.checked_rem(*b)) {
                return Ok((ExactInt::Small(q), ExactInt::Small(r)));
            }
        }
        let width = self.common_width(rhs, 1);
        let (q, r) = self.to_wide(width, true).div_rem(&rhs.to_wide(width, true))?;
        Ok((Self::normalize(q), Self::normalize(r)))
    }

    /// Multiply by `2^amount`.
    pub fn shl(&self, amount: u32) -> Self {
        if let ExactInt::Small(v) = self {
            if amount < 127 && self.used_bits() + amount < 127 {
                return ExactInt::Small(v << amount);
            }
        }
        let width = self.bit_len() + amount;
        Self::normalize(self.to_wide(width, true).shl(amount))
    }

    /// Arithmetic right shift (rounds toward negative infinity).
    pub fn shr(&self, amount: u32) -> Self {
        match self {
            ExactInt::Small(v) => ExactInt::Small(if amount >= 128 {
                if *v < 0 {
                    -1
                } else {
                    0
                }
            } else {
                v >> amount
            }),
            ExactInt::Wide(w) => Self::normalize(w.shr(amount)),
        }
    }

    // ========================================================================
    // Bitwise (infinite two's-complement semantics)
    // ========================================================================

    pub fn bitand(&self, rhs: &Self) -> Self {
        match (self, rhs) {
            (ExactInt::Small(a), ExactInt::Small(b)) => ExactInt::Small(a & b),
            _ => self.wide_binary(rhs, self.common_width(rhs, 0), WideInteger::bitand),
        }
    }

    pub fn bitor(&self, rhs: &Self) -> Self {
        match (self, rhs) {
            (ExactInt::Small(a), ExactInt::Small(b)) => ExactInt::Small(a | b),
            _ => self.wide_binary(rhs, self.common_width(rhs, 0), WideInteger::bitor),
        }
    }

    pub fn bitxor(&self, rhs: &Self) -> Self {
        match (self, rhs) {
            (ExactInt::Small(a), ExactInt::Small(b)) => ExactInt::Small(a ^ b),
            _ => self.wide_binary(rhs, self.common_width(rhs, 0), WideInteger::bitxor),
        }
    }

    pub fn not(&self) -> Self {
        match self {
            ExactInt::Small(v) => ExactInt::Small(!v),
            ExactInt::Wide(w) => Self::normalize(w.not()),
        }
    }

    /// Floor of the square root; `None` for negative values.
    pub fn isqrt(&self) -> Option<Self> {
        if self.is_negative() {
            return None;
        }
        if self.is_zero() {
            return Some(ExactInt::ZERO);
        }
        // Newton's method from above converges down onto the floor.
        let mut x = Self::power_of_two(self.used_bits().div_ceil(2));
        loop {
            let (q, _) = self.div_rem(&x).ok()?;
            let next = x.add(&q).shr(1);
            if next >= x {
                return Some(x);
            }
            x = next;
        }
    }

    /// Reduce modulo `2^bits` into the signed or unsigned range of that width.
    pub fn wrap(&self, bits: u32, signed: bool) -> Self {
        let modulus = Self::power_of_two(bits);
        let masked = self.bitand(&modulus.sub(&ExactInt::ONE));
        if signed && bits > 0 && masked >= Self::power_of_two(bits - 1) {
            masked.sub(&modulus)
        } else {
            masked
        }
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Default for ExactInt {
    fn default() -> Self {
        ExactInt::ZERO
    }
}

impl From<i128> for ExactInt {
    fn from(value: i128) -> Self {
        ExactInt::Small(value)
    }
}

impl From<i64> for ExactInt {
    fn from(value: i64) -> Self {
        ExactInt::Small(value as i128)
    }
}

impl PartialEq for ExactInt {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ExactInt {}

impl Hash for ExactInt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ExactInt::Small(v) => v.hash(state),
            ExactInt::Wide(w) => w.resize(self.bit_len(), true).limbs().hash(state),
        }
    }
}

impl PartialOrd for ExactInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExactInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ExactInt::Small(a), ExactInt::Small(b)) => a.cmp(b),
            _ => {
                let width = self.common_width(other, 0);
                self.to_wide(width, true).cmp(&other.to_wide(width, true))
            },
        }
    }
}

impl fmt::Display for ExactInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExactInt::Small(v) => write!(f, "{}", v),
            ExactInt::Wide(w) => f.write_str(&w.to_decimal_string()),
        }
    }
}

impl fmt::Debug for ExactInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExactInt({})", self)
    }
}
