// ============================================================================
// Behavior Tags
// Static metadata describing how a number type grows, overflows, rounds and scales
// ============================================================================

use crate::numeric::{NumericError, NumericResult, TypeError};
use arrayvec::ArrayVec;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Radix used when none is given.
pub const DEFAULT_RADIX: u32 = 2;

/// Deepest supported tag nesting (one tag per family).
pub const MAX_TAG_DEPTH: usize = 4;

// ============================================================================
// Policies
// ============================================================================

/// What happens when an exact result does not fit the destination range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverflowPolicy {
    /// Wrap the bit pattern into the destination
    #[default]
    Native,
    /// No guarantee is made on overflow; currently identical to `Native`
    Unchecked,
    /// Report `Overflow(direction)` to the caller
    Throwing,
    /// Clamp to the nearest boundary value
    Saturating,
    /// Abort the process
    Trapping,
}

impl OverflowPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            OverflowPolicy::Native => "native",
            OverflowPolicy::Unchecked => "unchecked",
            OverflowPolicy::Throwing => "throwing",
            OverflowPolicy::Saturating => "saturating",
            OverflowPolicy::Trapping => "trapping",
        }
    }

    /// Whether an operation under this policy can return an error.
    pub fn is_fallible(&self) -> bool {
        matches!(self, OverflowPolicy::Throwing)
    }
}

/// How bits that cannot be represented are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoundingPolicy {
    /// Truncate toward zero; right shifts floor like the host `>>`
    #[default]
    Native,
    /// Round to nearest, ties away from zero
    Nearest,
    /// Round toward negative infinity
    NegInf,
    /// Round to nearest, ties toward positive infinity
    TieToPosInf,
}

impl RoundingPolicy {
    /// Alias of [`RoundingPolicy::Native`].
    pub const TRUNCATE: RoundingPolicy = RoundingPolicy::Native;

    pub fn name(&self) -> &'static str {
        match self {
            RoundingPolicy::Native => "native",
            RoundingPolicy::Nearest => "nearest",
            RoundingPolicy::NegInf => "neg_inf",
            RoundingPolicy::TieToPosInf => "tie_to_pos_inf",
        }
    }
}

// ============================================================================
// Tag
// ============================================================================

/// One layer of behavior wrapped around a representation.
///
/// A plain (Native) number is one whose stack holds no tags at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tag {
    /// Declared digit budget that grows per operation
    Elastic { digits: u32 },
    /// Overflow handling at every narrowing
    Overflow(OverflowPolicy),
    /// Rounding at every precision-dropping step
    Rounding(RoundingPolicy),
    /// Value is `raw × radix^exponent`
    Scaled { exponent: i32, radix: u32 },
}

impl Tag {
    pub const fn elastic(digits: u32) -> Self {
        Tag::Elastic { digits }
    }

    pub const fn scaled(exponent: i32) -> Self {
        Tag::Scaled {
            exponent,
            radix: DEFAULT_RADIX,
        }
    }

    pub const fn family(&self) -> TagFamily {
        match self {
            Tag::Elastic { .. } => TagFamily::Elastic,
            Tag::Overflow(_) => TagFamily::Overflow,
            Tag::Rounding(_) => TagFamily::Rounding,
            Tag::Scaled { .. } => TagFamily::Scaled,
        }
    }

    /// Kind of behavior, with numeric parameters stripped.
    pub const fn kind(&self) -> TagKind {
        match self {
            Tag::Elastic { .. } => TagKind::Elastic,
            Tag::Overflow(policy) => TagKind::Overflow(*policy),
            Tag::Rounding(policy) => TagKind::Rounding(*policy),
            Tag::Scaled { radix, .. } => TagKind::Scaled { radix: *radix },
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Elastic { digits } => write!(f, "elastic<{}>", digits),
            Tag::Overflow(policy) => write!(f, "overflow<{}>", policy.name()),
            Tag::Rounding(policy) => write!(f, "rounding<{}>", policy.name()),
            Tag::Scaled { exponent, radix } if *radix == DEFAULT_RADIX => {
                write!(f, "scaled<{}>", exponent)
            },
            Tag::Scaled { exponent, radix } => write!(f, "scaled<{}, {}>", exponent, radix),
        }
    }
}

/// Tag category used to look up the rule that governs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TagFamily {
    Elastic,
    Overflow,
    Rounding,
    Scaled,
}

impl TagFamily {
    pub const ALL: [TagFamily; 4] = [
        TagFamily::Scaled,
        TagFamily::Elastic,
        TagFamily::Overflow,
        TagFamily::Rounding,
    ];
}

/// Behavioral kind of a tag: family plus the parameters that change behavior.
///
/// Elastic digits and Scaled exponents are not part of the kind; overflow and
/// rounding policies and the radix are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TagKind {
    Native,
    Elastic,
    Overflow(OverflowPolicy),
    Rounding(RoundingPolicy),
    Scaled { radix: u32 },
}

impl TagKind {
    /// Family governing this kind; `None` for Native.
    pub const fn family(&self) -> Option<TagFamily> {
        match self {
            TagKind::Native => None,
            TagKind::Elastic => Some(TagFamily::Elastic),
            TagKind::Overflow(_) => Some(TagFamily::Overflow),
            TagKind::Rounding(_) => Some(TagFamily::Rounding),
            TagKind::Scaled { .. } => Some(TagFamily::Scaled),
        }
    }

    /// `Native` underlies every other kind.
    pub fn is_behavioral_base_of(&self, other: &TagKind) -> bool {
        *self == TagKind::Native && *other != TagKind::Native
    }

    pub fn is_family_equivalent(&self, other: &TagKind) -> bool {
        self == other || self.is_behavioral_base_of(other) || other.is_behavioral_base_of(self)
    }
}

// ============================================================================
// Tag Stack
// ============================================================================

/// Ordered (outermost first) list of tags around a representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TagStack {
    tags: ArrayVec<Tag, MAX_TAG_DEPTH>,
}

impl TagStack {
    /// Empty stack (a Native number).
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn new_const() -> Self {
        Self {
            tags: ArrayVec::new_const(),
        }
    }

    /// Build from tags listed outermost first.
    ///
    /// # Errors
    /// `InvalidType(DuplicateTag)` when a family repeats.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> NumericResult<Self> {
        let mut stack = Self::new();
        for tag in tags {
            stack.push_inner(tag)?;
        }
        Ok(stack)
    }

    /// Add a tag just outside the representation.
    ///
    /// # Errors
    /// `InvalidType(DuplicateTag)` when the family is already present.
    pub fn push_inner(&mut self, tag: Tag) -> NumericResult<()> {
        if self.get(tag.family()).is_some() {
            return Err(NumericError::InvalidType(TypeError::DuplicateTag));
        }
        self.tags
            .try_push(tag)
            .map_err(|_| NumericError::InvalidType(TypeError::TooManyTags))
    }

    /// Replace the tag of the same family, or insert it (Scaled outermost,
    /// everything else innermost).
    pub fn with(&self, tag: Tag) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.tags.iter_mut().find(|t| t.family() == tag.family()) {
            *slot = tag;
        } else if tag.family() == TagFamily::Scaled {
            next.tags.insert(0, tag);
        } else {
            next.tags.push(tag);
        }
        next
    }

    /// Stack without the given family.
    pub fn without(&self, family: TagFamily) -> Self {
        Self {
            tags: self
                .tags
                .iter()
                .copied()
                .filter(|t| t.family() != family)
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// True for the Native (untagged) stack.
    #[inline]
    pub fn is_native(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Tag at nesting depth `index` (0 is outermost).
    pub fn at(&self, index: usize) -> Option<&Tag> {
        self.tags.get(index)
    }

    /// Kind at nesting depth `index`; `Native` past the innermost tag.
    pub fn kind_at(&self, index: usize) -> TagKind {
        self.tags
            .get(index)
            .map(Tag::kind)
            .unwrap_or(TagKind::Native)
    }

    pub fn get(&self, family: TagFamily) -> Option<&Tag> {
        self.tags.iter().find(|t| t.family() == family)
    }

    pub fn contains(&self, family: TagFamily) -> bool {
        self.get(family).is_some()
    }

    pub fn elastic_digits(&self) -> Option<u32> {
        match self.get(TagFamily::Elastic) {
            Some(Tag::Elastic { digits }) => Some(*digits),
            _ => None,
        }
    }

    pub fn scale(&self) -> Option<(i32, u32)> {
        match self.get(TagFamily::Scaled) {
            Some(Tag::Scaled { exponent, radix }) => Some((*exponent, *radix)),
            _ => None,
        }
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        match self.get(TagFamily::Overflow) {
            Some(Tag::Overflow(policy)) => *policy,
            _ => OverflowPolicy::Native,
        }
    }

    pub fn rounding_policy(&self) -> RoundingPolicy {
        match self.get(TagFamily::Rounding) {
            Some(Tag::Rounding(policy)) => *policy,
            _ => RoundingPolicy::Native,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ignores_numeric_parameters() {
        assert_eq!(Tag::elastic(8).kind(), Tag::elastic(16).kind());
        assert_eq!(Tag::scaled(-4).kind(), Tag::scaled(3).kind());
        assert_ne!(
            Tag::Overflow(OverflowPolicy::Saturating).kind(),
            Tag::Overflow(OverflowPolicy::Throwing).kind()
        );
        assert_ne!(
            Tag::Scaled { exponent: 0, radix: 2 }.kind(),
            Tag::Scaled { exponent: 0, radix: 10 }.kind()
        );
    }

    #[test]
    fn test_native_is_base_of_everything() {
        assert!(TagKind::Native.is_behavioral_base_of(&TagKind::Elastic));
        assert!(!TagKind::Elastic.is_behavioral_base_of(&TagKind::Native));
        assert!(TagKind::Elastic.is_family_equivalent(&TagKind::Native));
        let saturating = TagKind::Overflow(OverflowPolicy::Saturating);
        assert!(!TagKind::Elastic.is_family_equivalent(&saturating));
    }

    #[test]
    fn test_duplicate_family_rejected() {
        let result = TagStack::from_tags([Tag::elastic(8), Tag::elastic(9)]);
        assert_eq!(result, Err(NumericError::InvalidType(TypeError::DuplicateTag)));
    }

    #[test]
    fn test_stack_queries() {
        let stack = TagStack::from_tags([
            Tag::scaled(-4),
            Tag::Overflow(OverflowPolicy::Saturating),
            Tag::elastic(12),
        ])
        .unwrap();

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.scale(), Some((-4, 2)));
        assert_eq!(stack.elastic_digits(), Some(12));
        assert_eq!(stack.overflow_policy(), OverflowPolicy::Saturating);
        assert_eq!(stack.rounding_policy(), RoundingPolicy::Native);
        assert_eq!(stack.kind_at(2), TagKind::Elastic);
        assert_eq!(stack.kind_at(3), TagKind::Native);
    }

    #[test]
    fn test_with_and_without() {
        let stack = TagStack::from_tags([Tag::elastic(8)]).unwrap();
        let scaled = stack.with(Tag::scaled(-2));
        assert_eq!(scaled.at(0), Some(&Tag::scaled(-2)));
        assert_eq!(scaled.with(Tag::elastic(9)).elastic_digits(), Some(9));
        assert!(scaled.without(TagFamily::Elastic).elastic_digits().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Tag::elastic(8).to_string(), "elastic<8>");
        assert_eq!(Tag::scaled(-3).to_string(), "scaled<-3>");
        assert_eq!(
            Tag::Scaled { exponent: -2, radix: 10 }.to_string(),
            "scaled<-2, 10>"
        );
        assert_eq!(
            Tag::Overflow(OverflowPolicy::Saturating).to_string(),
            "overflow<saturating>"
        );
    }
}
