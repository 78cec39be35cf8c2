// ============================================================================
// Number Type Descriptor
// Immutable (representation, tag stack) pair with derived digit budget and range
// ============================================================================

use super::tag::{OverflowPolicy, RoundingPolicy, Tag, TagFamily, TagStack, DEFAULT_RADIX};
use crate::numeric::{ExactInt, NumericError, NumericResult, RepType, TypeError};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Static description of a number: its physical representation and the
/// behavior tags wrapped around it.
///
/// Every parameter is fixed at construction; resolution and conversion only
/// ever read it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumberType {
    rep: RepType,
    tags: TagStack,
}

impl NumberType {
    /// Validate and build a descriptor.
    ///
    /// # Errors
    /// - `ZeroDigits` for an Elastic tag with no digits
    /// - `DigitsExceedStorage` if Elastic digits do not fit the representation
    /// - `InvalidRadix` for a Scaled radix below 2
    pub fn new(rep: RepType, tags: TagStack) -> NumericResult<Self> {
        for tag in tags.iter() {
            match tag {
                Tag::Elastic { digits: 0 } => {
                    return Err(NumericError::InvalidType(TypeError::ZeroDigits));
                },
                Tag::Elastic { digits } if *digits > rep.digits() => {
                    return Err(NumericError::InvalidType(TypeError::DigitsExceedStorage));
                },
                Tag::Scaled { radix, .. } if *radix < 2 => {
                    return Err(NumericError::InvalidType(TypeError::InvalidRadix));
                },
                _ => {},
            }
        }
        Ok(Self { rep, tags })
    }

    /// Untagged type over `rep`.
    pub const fn native(rep: RepType) -> Self {
        Self {
            rep,
            tags: TagStack::new_const(),
        }
    }

    /// Same tags over a different representation.
    pub fn with_rep(&self, rep: RepType) -> NumericResult<Self> {
        Self::new(rep, self.tags.clone())
    }

    /// Same representation with `tag` replacing (or joining) its family.
    pub fn with_tag(&self, tag: Tag) -> NumericResult<Self> {
        Self::new(self.rep, self.tags.with(tag))
    }

    /// Same representation without the given family.
    pub fn without(&self, family: TagFamily) -> Self {
        Self {
            rep: self.rep,
            tags: self.tags.without(family),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn rep(&self) -> RepType {
        self.rep
    }

    #[inline]
    pub fn tags(&self) -> &TagStack {
        &self.tags
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        self.tags.is_native()
    }

    #[inline]
    pub fn is_elastic(&self) -> bool {
        self.tags.contains(TagFamily::Elastic)
    }

    #[inline]
    pub fn is_scaled(&self) -> bool {
        self.tags.contains(TagFamily::Scaled)
    }

    /// Effective magnitude digits: the Elastic budget if present, otherwise
    /// the storage digits.
    pub fn digits(&self) -> u32 {
        self.tags.elastic_digits().unwrap_or_else(|| self.rep.digits())
    }

    #[inline]
    pub fn is_signed(&self) -> bool {
        self.rep.is_signed()
    }

    pub fn exponent(&self) -> i32 {
        self.tags.scale().map(|(exponent, _)| exponent).unwrap_or(0)
    }

    pub fn radix(&self) -> u32 {
        self.tags.scale().map(|(_, radix)| radix).unwrap_or(DEFAULT_RADIX)
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.tags.overflow_policy()
    }

    pub fn rounding_policy(&self) -> RoundingPolicy {
        self.tags.rounding_policy()
    }

    /// Radix digits after the radix point.
    pub fn fractional_digits(&self) -> i32 {
        -self.exponent()
    }

    /// Binary digits before the radix point.
    pub fn integer_digits(&self) -> i32 {
        self.digits() as i32 + self.exponent()
    }

    // ========================================================================
    // Range (in raw units)
    // ========================================================================

    /// Highest raw value.
    pub fn max_raw(&self) -> ExactInt {
        ExactInt::power_of_two(self.digits()).sub(&ExactInt::ONE)
    }

    /// Lowest raw value. Elastic ranges are symmetric around zero.
    pub fn lowest_raw(&self) -> ExactInt {
        if !self.is_signed() {
            ExactInt::ZERO
        } else if self.is_elastic() {
            self.max_raw().neg()
        } else {
            ExactInt::power_of_two(self.digits()).neg()
        }
    }

    /// Whether `raw` lies in `[lowest_raw, max_raw]`.
    pub fn contains_raw(&self, raw: &ExactInt) -> bool {
        *raw >= self.lowest_raw() && *raw <= self.max_raw()
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in self.tags.iter() {
            write!(f, "{}(", tag)?;
        }
        write!(f, "{}", self.rep)?;
        for _ in 0..self.tags.len() {
            write!(f, ")")?;
        }
        Ok(())
    }
}
