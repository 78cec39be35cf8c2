// ============================================================================
// Wide Integer
// Limb-based two's-complement integer of caller-specified width
// ============================================================================

use super::errors::{NumericError, NumericResult};
use smallvec::{smallvec, SmallVec};
use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bits per limb.
pub const LIMB_BITS: u32 = 64;

/// Limb storage; four limbs (256 bits) live inline.
pub type Limbs = SmallVec<[u64; 4]>;

/// Number of limbs needed to hold `bits` bits (at least one).
#[inline]
pub const fn limbs_for(bits: u32) -> usize {
    if bits == 0 {
        1
    } else {
        bits.div_ceil(LIMB_BITS) as usize
    }
}

/// Two's-complement integer made of 64-bit limbs.
///
/// Limbs are stored little-endian (`limbs[0]` is least significant). The width
/// is always a whole number of limbs; a requested width is rounded up. All
/// arithmetic wraps at the width, except division by zero which fails.
///
/// # Example
/// ```
/// use compositional_numeric::numeric::WideInteger;
///
/// let a = WideInteger::from_i128(192, true, i128::MAX);
/// let b = a.wrapping_add(&a);
/// assert_eq!(b.to_string(), "340282366920938463463374607431768211454");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WideInteger {
    limbs: Limbs,
    signed: bool,
}

// ============================================================================
// Low-level helpers
// ============================================================================

/// Add with carry: (result, carry) = a + b + carry_in
#[inline(always)]
const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let tmp = a as u128 + b as u128 + carry as u128;
    (tmp as u64, (tmp >> 64) as u64)
}

/// Subtract with borrow: (result, borrow) = a - b - borrow_in
#[inline(always)]
const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let tmp = (a as u128)
        .wrapping_sub(b as u128)
        .wrapping_sub(borrow as u128);
    (tmp as u64, (tmp >> 127) as u64)
}

/// Multiply-accumulate: (lo, carry) = a * b + c + carry_in
#[inline(always)]
const fn mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let tmp = a as u128 * b as u128 + c as u128 + carry as u128;
    (tmp as u64, (tmp >> 64) as u64)
}

impl WideInteger {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Zero of the given width and signedness.
    pub fn zero(width: u32, signed: bool) -> Self {
        Self {
            limbs: smallvec![0u64; limbs_for(width)],
            signed,
        }
    }

    /// Build from raw little-endian limbs.
    ///
    /// Returns `None` when `limbs` is empty.
    pub fn from_limbs(limbs: &[u64], signed: bool) -> Option<Self> {
        if limbs.is_empty() {
            return None;
        }
        Some(Self {
            limbs: Limbs::from_slice(limbs),
            signed,
        })
    }

    /// Two's-complement pattern of `value`, wrapped to `width` bits.
    pub fn from_i128(width: u32, signed: bool, value: i128) -> Self {
        let n = limbs_for(width);
        let ext = if value < 0 { u64::MAX } else { 0 };
        let mut limbs: Limbs = smallvec![ext; n];
        limbs[0] = value as u64;
        if n > 1 {
            limbs[1] = ((value as u128) >> 64) as u64;
        }
        Self { limbs, signed }
    }

    /// Pattern of an unsigned `value`, wrapped to `width` bits.
    pub fn from_u128(width: u32, signed: bool, value: u128) -> Self {
        let n = limbs_for(width);
        let mut limbs: Limbs = smallvec![0u64; n];
        limbs[0] = value as u64;
        if n > 1 {
            limbs[1] = (value >> 64) as u64;
        }
        Self { limbs, signed }
    }

    /// `2^exponent` at the given width (wraps to zero when out of range).
    pub fn power_of_two(width: u32, signed: bool, exponent: u32) -> Self {
        let mut result = Self::zero(width, signed);
        let limb = (exponent / LIMB_BITS) as usize;
        if limb < result.limbs.len() {
            result.limbs[limb] = 1u64 << (exponent % LIMB_BITS);
        }
        result
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Width in bits (a multiple of [`LIMB_BITS`]).
    #[inline]
    pub fn width(&self) -> u32 {
        self.limbs.len() as u32 * LIMB_BITS
    }

    /// Whether the bit pattern is interpreted as signed.
    #[inline]
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Raw little-endian limbs.
    #[inline]
    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// True when signed and the top bit is set.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.signed && self.top_bit()
    }

    #[inline]
    fn top_bit(&self) -> bool {
        self.limbs[self.limbs.len() - 1] >> (LIMB_BITS - 1) == 1
    }

    #[inline]
    fn extension(&self) -> u64 {
        if self.is_negative() {
            u64::MAX
        } else {
            0
        }
    }

    /// Value as `i128`, if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        let ext = self.extension();
        if self.limbs.iter().skip(2).any(|&l| l != ext) {
            return None;
        }
        let high = self.limbs.get(1).copied().unwrap_or(ext);
        let low = (self.limbs[0] as u128) | ((high as u128) << 64);
        let value = low as i128;
        if (value < 0) != self.is_negative() {
            return None;
        }
        Some(value)
    }

    /// Number of bits needed to hold the magnitude, sign excluded.
    ///
    /// For negative values this counts the bits of `-x - 1`, so `-1` uses zero
    /// bits and `-128` uses seven.
    pub fn used_bits(&self) -> u32 {
        let ext = self.extension();
        for (i, &limb) in self.limbs.iter().enumerate().rev() {
            let bits = limb ^ ext;
            if bits != 0 {
                return i as u32 * LIMB_BITS + (LIMB_BITS - bits.leading_zeros());
            }
        }
        0
    }

    /// Count of trailing zero bits, `None` for zero.
    pub fn trailing_zeros(&self) -> Option<u32> {
        for (i, &limb) in self.limbs.iter().enumerate() {
            if limb != 0 {
                return Some(i as u32 * LIMB_BITS + limb.trailing_zeros());
            }
        }
        None
    }

    /// Sign- or zero-extend (or truncate) into a new width and signedness.
    pub fn resize(&self, width: u32, signed: bool) -> Self {
        let n = limbs_for(width);
        let ext = self.extension();
        let mut limbs: Limbs = smallvec![ext; n];
        for (dst, src) in limbs.iter_mut().zip(self.limbs.iter()) {
            *dst = *src;
        }
        Self { limbs, signed }
    }

    fn aligned(&self, other: &Self) -> Self {
        if other.limbs.len() == self.limbs.len() {
            other.clone()
        } else {
            other.resize(self.width(), other.signed)
        }
    }

    // ========================================================================
    // Arithmetic (wrapping at the width of `self`)
    // ========================================================================

    pub fn wrapping_add(&self, rhs: &Self) -> Self {
        let rhs = self.aligned(rhs);
        let mut limbs: Limbs = smallvec![0u64; self.limbs.len()];
        let mut carry = 0u64;
        for (i, res) in limbs.iter_mut().enumerate() {
            let (r, c) = adc(self.limbs[i], rhs.limbs[i], carry);
            *res = r;
            carry = c;
        }
        Self {
            limbs,
            signed: self.signed,
        }
    }

    pub fn wrapping_sub(&self, rhs: &Self) -> Self {
        let rhs = self.aligned(rhs);
        let mut limbs: Limbs = smallvec![0u64; self.limbs.len()];
        let mut borrow = 0u64;
        for (i, res) in limbs.iter_mut().enumerate() {
            let (r, b) = sbb(self.limbs[i], rhs.limbs[i], borrow);
            *res = r;
            borrow = b;
        }
        Self {
            limbs,
            signed: self.signed,
        }
    }

    /// Schoolbook multiplication truncated to the width.
    pub fn wrapping_mul(&self, rhs: &Self) -> Self {
        let rhs = self.aligned(rhs);
        let n = self.limbs.len();
        let mut limbs: Limbs = smallvec![0u64; n];
        for i in 0..n {
            let mut carry = 0u64;
            for j in 0..(n - i) {
                let (lo, hi) = mac(self.limbs[i], rhs.limbs[j], limbs[i + j], carry);
                limbs[i + j] = lo;
                carry = hi;
            }
        }
        Self {
            limbs,
            signed: self.signed,
        }
    }

    /// Two's-complement negation.
    pub fn wrapping_neg(&self) -> Self {
        let one = Self::from_u128(self.width(), self.signed, 1);
        self.not().wrapping_add(&one)
    }

    /// Magnitude as an unsigned integer of the same width.
    pub fn unsigned_abs(&self) -> Self {
        let magnitude = if self.is_negative() {
            self.wrapping_neg()
        } else {
            self.clone()
        };
        Self {
            limbs: magnitude.limbs,
            signed: false,
        }
    }

    /// Truncating division returning `(quotient, remainder)`.
    ///
    /// The remainder takes the sign of the dividend.
    ///
    /// # Errors
    /// Returns `DivideByZero` if `rhs` is zero.
    pub fn div_rem(&self, rhs: &Self) -> NumericResult<(Self, Self)> {
        let rhs = self.aligned(rhs);
        if rhs.is_zero() {
            return Err(NumericError::DivideByZero);
        }
        let lhs_negative = self.is_negative();
        let rhs_negative = rhs.is_negative();
        let (quotient, remainder) = self.unsigned_abs().divmod_unsigned(&rhs.unsigned_abs());

        let mut quotient = Self {
            limbs: quotient.limbs,
            signed: self.signed,
        };
        let mut remainder = Self {
            limbs: remainder.limbs,
            signed: self.signed,
        };
        if lhs_negative != rhs_negative {
            quotient = quotient.wrapping_neg();
        }
        if lhs_negative {
            remainder = remainder.wrapping_neg();
        }
        Ok((quotient, remainder))
    }

    /// Shift-subtract long division on unsigned magnitudes of equal width.
    fn divmod_unsigned(&self, divisor: &Self) -> (Self, Self) {
        let n = self.limbs.len();
        let mut quotient = Self::zero(self.width(), false);
        let mut remainder = Self::zero(self.width(), false);
        let top = self.used_bits();

        for i in (0..top).rev() {
            // remainder = remainder << 1 | bit i
            let mut carry = 0u64;
            for limb in remainder.limbs.iter_mut() {
                let next = *limb >> 63;
                *limb = (*limb << 1) | carry;
                carry = next;
            }
            let limb_idx = (i / LIMB_BITS) as usize;
            remainder.limbs[0] |= (self.limbs[limb_idx] >> (i % LIMB_BITS)) & 1;

            if carry != 0 || remainder.cmp_magnitude(divisor) != Ordering::Less {
                let mut borrow = 0u64;
                for j in 0..n {
                    let (r, b) = sbb(remainder.limbs[j], divisor.limbs[j], borrow);
                    remainder.limbs[j] = r;
                    borrow = b;
                }
                quotient.limbs[limb_idx] |= 1u64 << (i % LIMB_BITS);
            }
        }
        (quotient, remainder)
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        for i in (0..self.limbs.len()).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    // ========================================================================
    // Bitwise
    // ========================================================================

    pub fn not(&self) -> Self {
        Self {
            limbs: self.limbs.iter().map(|l| !l).collect(),
            signed: self.signed,
        }
    }

    fn zip_with(&self, rhs: &Self, f: impl Fn(u64, u64) -> u64) -> Self {
        let rhs = self.aligned(rhs);
        Self {
            limbs: self
                .limbs
                .iter()
                .zip(rhs.limbs.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
            signed: self.signed,
        }
    }

    pub fn bitand(&self, rhs: &Self) -> Self {
        self.zip_with(rhs, |a, b| a & b)
    }

    pub fn bitor(&self, rhs: &Self) -> Self {
        self.zip_with(rhs, |a, b| a | b)
    }

    pub fn bitxor(&self, rhs: &Self) -> Self {
        self.zip_with(rhs, |a, b| a ^ b)
    }

    /// Left shift; bits shifted past the width are lost.
    pub fn shl(&self, amount: u32) -> Self {
        let n = self.limbs.len();
        let mut limbs: Limbs = smallvec![0u64; n];
        let limb_shift = (amount / LIMB_BITS) as usize;
        let bit_shift = amount % LIMB_BITS;
        for i in (limb_shift..n).rev() {
            let src = i - limb_shift;
            let mut value = self.limbs[src] << bit_shift;
            if bit_shift != 0 && src > 0 {
                value |= self.limbs[src - 1] >> (LIMB_BITS - bit_shift);
            }
            limbs[i] = value;
        }
        Self {
            limbs,
            signed: self.signed,
        }
    }

    /// Right shift: arithmetic when signed, logical otherwise.
    pub fn shr(&self, amount: u32) -> Self {
        let n = self.limbs.len();
        let ext = self.extension();
        let mut limbs: Limbs = smallvec![ext; n];
        let limb_shift = (amount / LIMB_BITS) as usize;
        let bit_shift = amount % LIMB_BITS;
        for (i, limb) in limbs.iter_mut().enumerate() {
            let src = i + limb_shift;
            if src >= n {
                break;
            }
            let mut value = self.limbs[src] >> bit_shift;
            if bit_shift != 0 {
                let upper = self.limbs.get(src + 1).copied().unwrap_or(ext);
                value |= upper << (LIMB_BITS - bit_shift);
            }
            *limb = value;
        }
        Self {
            limbs,
            signed: self.signed,
        }
    }

    // ========================================================================
    // Formatting
    // ========================================================================

    /// Decimal rendering of the interpreted value.
    pub fn to_decimal_string(&self) -> String {
        const CHUNK: u64 = 10_000_000_000_000_000_000; // 10^19
        let mut magnitude = self.unsigned_abs();
        let chunk = Self::from_u128(magnitude.width(), false, CHUNK as u128);
        let mut parts = Vec::new();
        while !magnitude.is_zero() {
            let (q, r) = magnitude.divmod_unsigned(&chunk);
            parts.push(r.limbs[0]);
            magnitude = q;
        }

        let mut out = String::new();
        if self.is_negative() {
            out.push('-');
        }
        match parts.split_last() {
            None => out.push('0'),
            Some((head, rest)) => {
                out.push_str(&head.to_string());
                for part in rest.iter().rev() {
                    out.push_str(&format!("{:019}", part));
                }
            },
        }
        out
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl PartialOrd for WideInteger {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WideInteger {
    /// Compares interpreted values, regardless of width or signedness.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {},
        }
        let n = self.limbs.len().max(other.limbs.len());
        let (ext_a, ext_b) = (self.extension(), other.extension());
        for i in (0..n).rev() {
            let a = self.limbs.get(i).copied().unwrap_or(ext_a);
            let b = other.limbs.get(i).copied().unwrap_or(ext_b);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for WideInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl fmt::Debug for WideInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WideInteger<{}{}>({})",
            if self.signed { "i" } else { "u" },
            self.width(),
            self
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(v: i128) -> WideInteger {
        WideInteger::from_i128(256, true, v)
    }

    #[test]
    fn test_width_rounds_to_limbs() {
        assert_eq!(WideInteger::zero(65, true).width(), 128);
        assert_eq!(WideInteger::zero(1, false).width(), 64);
        assert_eq!(WideInteger::zero(256, false).width(), 256);
    }

    #[test]
    fn test_i128_round_trip() {
        for v in [0, 1, -1, i128::MAX, i128::MIN, 12345678901234567890] {
            assert_eq!(w(v).to_i128(), Some(v));
        }
    }

    #[test]
    fn test_to_i128_rejects_large() {
        let big = WideInteger::power_of_two(256, true, 130);
        assert_eq!(big.to_i128(), None);
    }

    #[test]
    fn test_add_sub() {
        assert_eq!(w(100).wrapping_add(&w(-250)).to_i128(), Some(-150));
        assert_eq!(w(-5).wrapping_sub(&w(7)).to_i128(), Some(-12));
    }

    #[test]
    fn test_add_carries_across_limbs() {
        let a = WideInteger::from_u128(192, false, u64::MAX as u128);
        let b = a.wrapping_add(&WideInteger::from_u128(192, false, 1));
        assert_eq!(b.limbs(), &[0, 1, 0]);
    }

    #[test]
    fn test_mul_beyond_i128() {
        let a = w(i128::MAX);
        let sq = a.wrapping_mul(&a);
        assert_eq!(
            sq.to_string(),
            "28948022309329048855892746252171976962977213799489202546401021394546514198529"
        );
    }

    #[test]
    fn test_mul_signs() {
        assert_eq!(w(-7).wrapping_mul(&w(6)).to_i128(), Some(-42));
        assert_eq!(w(-7).wrapping_mul(&w(-6)).to_i128(), Some(42));
    }

    #[test]
    fn test_div_rem_truncates_toward_zero() {
        let (q, r) = w(-7).div_rem(&w(2)).unwrap();
        assert_eq!(q.to_i128(), Some(-3));
        assert_eq!(r.to_i128(), Some(-1));

        let (q, r) = w(7).div_rem(&w(-2)).unwrap();
        assert_eq!(q.to_i128(), Some(-3));
        assert_eq!(r.to_i128(), Some(1));
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(w(1).div_rem(&w(0)), Err(NumericError::DivideByZero));
    }

    #[test]
    fn test_div_large() {
        let big = WideInteger::power_of_two(256, true, 200);
        let (q, r) = big.div_rem(&WideInteger::power_of_two(256, true, 190)).unwrap();
        assert_eq!(q.to_i128(), Some(1024));
        assert!(r.is_zero());
    }

    #[test]
    fn test_shifts() {
        assert_eq!(w(1).shl(100).shr(99).to_i128(), Some(2));
        assert_eq!(w(-8).shr(1).to_i128(), Some(-4));
        assert_eq!(w(-1).shr(300).to_i128(), Some(-1));

        let unsigned = WideInteger::from_i128(128, false, -1);
        assert_eq!(unsigned.shr(127).to_i128(), Some(1));
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(w(0b1100).bitand(&w(0b1010)).to_i128(), Some(0b1000));
        assert_eq!(w(0b1100).bitor(&w(0b1010)).to_i128(), Some(0b1110));
        assert_eq!(w(0b1100).bitxor(&w(0b1010)).to_i128(), Some(0b0110));
        assert_eq!(w(5).not().to_i128(), Some(-6));
    }

    #[test]
    fn test_ordering_across_signedness() {
        let unsigned_max = WideInteger::from_i128(64, false, -1);
        let negative = WideInteger::from_i128(64, true, -1);
        assert!(negative < unsigned_max);
        assert!(w(3) > WideInteger::from_i128(128, true, 2));
    }

    #[test]
    fn test_used_bits_and_trailing_zeros() {
        assert_eq!(w(0).used_bits(), 0);
        assert_eq!(w(127).used_bits(), 7);
        assert_eq!(w(128).used_bits(), 8);
        assert_eq!(w(-1).used_bits(), 0);
        assert_eq!(w(-128).used_bits(), 7);
        assert_eq!(w(40).trailing_zeros(), Some(3));
        assert_eq!(w(0).trailing_zeros(), None);
    }

    #[test]
    fn test_resize() {
        let narrow = WideInteger::from_i128(64, true, -3);
        assert_eq!(narrow.resize(192, true).to_i128(), Some(-3));
        let truncated = WideInteger::power_of_two(128, true, 70).resize(64, true);
        assert!(truncated.is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(w(0).to_string(), "0");
        assert_eq!(w(-42).to_string(), "-42");
        assert_eq!(
            WideInteger::power_of_two(128, false, 127).to_string(),
            "170141183460469231731687303715884105728"
        );
    }
}
