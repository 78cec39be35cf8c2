// ============================================================================
// Raw Representation
// Fixed-width signed/unsigned integers backing every number type
// ============================================================================

use super::errors::{NumericError, NumericResult, OverflowDirection};
use super::exact::ExactInt;
use super::wide_integer::{limbs_for, WideInteger, LIMB_BITS};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical shape of a representation: bit width and signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepType {
    width: u32,
    signed: bool,
}

impl RepType {
    /// Widths served by native machine integers.
    pub const NATIVE_WIDTHS: [u32; 4] = [8, 16, 32, 64];

    pub const I8: Self = Self::new(8, true);
    pub const U8: Self = Self::new(8, false);
    pub const I16: Self = Self::new(16, true);
    pub const U16: Self = Self::new(16, false);
    pub const I32: Self = Self::new(32, true);
    pub const U32: Self = Self::new(32, false);
    pub const I64: Self = Self::new(64, true);
    pub const U64: Self = Self::new(64, false);

    /// Create a representation shape. Widths above 64 are rounded up to whole
    /// limbs; narrower non-native widths are rounded up to the next native one.
    pub const fn new(width: u32, signed: bool) -> Self {
        Self {
            width: Self::physical_width(width),
            signed,
        }
    }

    const fn physical_width(bits: u32) -> u32 {
        let mut i = 0;
        while i < Self::NATIVE_WIDTHS.len() {
            if bits <= Self::NATIVE_WIDTHS[i] {
                return Self::NATIVE_WIDTHS[i];
            }
            i += 1;
        }
        limbs_for(bits) as u32 * LIMB_BITS
    }

    /// Narrowest shape holding `digits` magnitude bits (plus a sign bit).
    pub const fn for_digits(digits: u32, signed: bool) -> Self {
        Self::new(digits + signed as u32, signed)
    }

    /// Narrowest shape that can hold every value of both operands.
    pub fn common(lhs: RepType, rhs: RepType) -> Self {
        let signed = lhs.signed || rhs.signed;
        let digits = lhs.digits().max(rhs.digits());
        let candidate = Self::for_digits(digits, signed);
        if candidate.width < lhs.width.max(rhs.width) {
            Self::new(lhs.width.max(rhs.width), signed)
        } else {
            candidate
        }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    /// Magnitude bits available (sign bit excluded).
    #[inline]
    pub const fn digits(&self) -> u32 {
        self.width - self.signed as u32
    }

    /// True when a machine integer backs this shape.
    #[inline]
    pub const fn is_native(&self) -> bool {
        self.width <= 64
    }

    pub const fn signed_counterpart(&self) -> Self {
        Self::new(self.width, true)
    }

    pub const fn unsigned_counterpart(&self) -> Self {
        Self::new(self.width, false)
    }

    /// Lowest value of the full physical range.
    pub fn lowest(&self) -> ExactInt {
        if self.signed {
            ExactInt::power_of_two(self.digits()).neg()
        } else {
            ExactInt::ZERO
        }
    }

    /// Highest value of the full physical range.
    pub fn max(&self) -> ExactInt {
        ExactInt::power_of_two(self.digits()).sub(&ExactInt::ONE)
    }
}

impl fmt::Display for RepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.signed { "i" } else { "u" }, self.width)
    }
}

/// Backing storage: a machine integer for native widths, limbs otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum Storage {
    Native(i64),
    NativeUnsigned(u64),
    Wide(WideInteger),
}

/// Integer value of exact width and signedness.
///
/// Immutable once built. The value always lies inside the physical range of
/// its [`RepType`].
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Representation {
    ty: RepType,
    storage: Storage,
}

impl Representation {
    /// Store `value` without any policy.
    ///
    /// # Errors
    /// Returns `Overflow` if the value does not fit the physical range.
    pub fn new(ty: RepType, value: &ExactInt) -> NumericResult<Self> {
        if *value > ty.max() {
            return Err(NumericError::Overflow(OverflowDirection::Positive));
        }
        if *value < ty.lowest() {
            return Err(NumericError::Overflow(OverflowDirection::Negative));
        }
        Ok(Self::store(ty, value))
    }

    /// Keep the low `width` bits of `value` (two's-complement wraparound).
    pub fn wrapping(ty: RepType, value: &ExactInt) -> Self {
        Self::store(ty, &value.wrap(ty.width, ty.signed))
    }

    /// Zero of the given shape.
    pub fn zero(ty: RepType) -> Self {
        Self::store(ty, &ExactInt::ZERO)
    }

    /// Convenience constructor from a machine integer.
    ///
    /// # Errors
    /// Returns `Overflow` if the value does not fit the physical range.
    pub fn from_i128(ty: RepType, value: i128) -> NumericResult<Self> {
        Self::new(ty, &ExactInt::from_i128(value))
    }

    /// Reinterpret a raw bit pattern in little-endian limbs.
    ///
    /// Bits beyond the width are ignored.
    pub fn from_bits(ty: RepType, limbs: &[u64]) -> Self {
        let mut padded = vec![0u64; limbs_for(ty.width)];
        for (dst, src) in padded.iter_mut().zip(limbs.iter()) {
            *dst = *src;
        }
        let pattern = match WideInteger::from_limbs(&padded, false) {
            Some(pattern) => ExactInt::from_wide(&pattern),
            None => ExactInt::ZERO,
        };
        Self::wrapping(ty, &pattern)
    }

    // Caller guarantees `value` is inside the physical range.
    fn store(ty: RepType, value: &ExactInt) -> Self {
        let storage = match (ty.is_native(), ty.signed, value.to_i128()) {
            (true, true, Some(v)) => Storage::Native(v as i64),
            (true, false, Some(v)) => Storage::NativeUnsigned(v as u64),
            _ => Storage::Wide(value.to_wide(ty.width, ty.signed)),
        };
        Self { ty, storage }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn rep_type(&self) -> RepType {
        self.ty
    }

    /// Whether the value lives in limb storage.
    #[inline]
    pub fn is_wide(&self) -> bool {
        matches!(self.storage, Storage::Wide(_))
    }

    /// Exact integer value.
    pub fn value(&self) -> ExactInt {
        match &self.storage {
            Storage::Native(v) => ExactInt::from_i128(*v as i128),
            Storage::NativeUnsigned(v) => ExactInt::from_i128(*v as i128),
            Storage::Wide(w) => ExactInt::from_wide(w),
        }
    }

    /// Value as `i128`, if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        self.value().to_i128()
    }

    /// Two's-complement bit pattern as little-endian limbs.
    pub fn to_bits(&self) -> Vec<u64> {
        let pattern = self.value().to_wide(self.ty.width.max(LIMB_BITS), false);
        let mut limbs = pattern.limbs().to_vec();
        if self.ty.width < LIMB_BITS {
            limbs[0] &= (1u64 << self.ty.width) - 1;
        }
        limbs
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl fmt::Debug for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Representation<{}>({})", self.ty, self.value())
    }
}
