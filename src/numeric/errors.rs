// ============================================================================
// Numeric Errors
// Error types for tagged integer and fixed-point operations
// ============================================================================

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Side of the destination range that a value fell outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverflowDirection {
    /// Value exceeded the destination's maximum
    Positive,
    /// Value fell below the destination's lowest value
    Negative,
}

impl fmt::Display for OverflowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowDirection::Positive => write!(f, "positive"),
            OverflowDirection::Negative => write!(f, "negative"),
        }
    }
}

/// Reasons a number type descriptor cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeError {
    /// A digit budget of zero was requested
    ZeroDigits,
    /// Two tags of the same family in one stack
    DuplicateTag,
    /// Tag stack deeper than the supported nesting
    TooManyTags,
    /// Radix below 2
    InvalidRadix,
    /// Elastic budget larger than the chosen storage
    DigitsExceedStorage,
    /// Representation does not match the number type it is paired with
    RepresentationMismatch,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::ZeroDigits => write!(f, "digit budget must be at least 1"),
            TypeError::DuplicateTag => write!(f, "tag family appears twice in the stack"),
            TypeError::TooManyTags => write!(f, "tag stack is nested too deeply"),
            TypeError::InvalidRadix => write!(f, "radix must be at least 2"),
            TypeError::DigitsExceedStorage => {
                write!(f, "declared digits exceed the representation width")
            },
            TypeError::RepresentationMismatch => {
                write!(f, "representation does not belong to the number type")
            },
        }
    }
}

/// Errors that can occur during tagged numeric operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericError {
    /// Exact result lies outside the destination range
    Overflow(OverflowDirection),
    /// Attempted division (or modulo) by zero
    DivideByZero,
    /// Literal text contains a character that is not a digit of its base
    InvalidLiteralDigit { digit: char, position: usize },
    /// Operand tag stacks cannot be combined unambiguously
    IncompatibleTags,
    /// Shift amount is negative, fractional or absurdly large
    InvalidShift,
    /// Conversion would lose significant digits
    PrecisionLoss,
    /// Number type descriptor is malformed
    InvalidType(TypeError),
    /// Operator cannot be evaluated by the requested entry point
    UnsupportedOperator,
    /// Square root of a negative value
    NegativeRoot,
}

impl NumericError {
    /// Convenience constructor for positive overflow.
    pub const fn positive_overflow() -> Self {
        NumericError::Overflow(OverflowDirection::Positive)
    }

    /// Convenience constructor for negative overflow.
    pub const fn negative_overflow() -> Self {
        NumericError::Overflow(OverflowDirection::Negative)
    }
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::Overflow(OverflowDirection::Positive) => {
                write!(f, "arithmetic overflow: result exceeded maximum value")
            },
            NumericError::Overflow(OverflowDirection::Negative) => {
                write!(f, "arithmetic overflow: result below lowest value")
            },
            NumericError::DivideByZero => write!(f, "division by zero"),
            NumericError::InvalidLiteralDigit { digit, position } => {
                write!(f, "invalid literal digit {:?} at position {}", digit, position)
            },
            NumericError::IncompatibleTags => {
                write!(f, "operand tag stacks cannot be combined")
            },
            NumericError::InvalidShift => write!(f, "shift amount out of range"),
            NumericError::PrecisionLoss => write!(
                f,
                "precision loss: conversion would lose significant digits"
            ),
            NumericError::InvalidType(reason) => write!(f, "invalid number type: {}", reason),
            NumericError::UnsupportedOperator => {
                write!(f, "operator not supported by this operation")
            },
            NumericError::NegativeRoot => write!(f, "square root of a negative value"),
        }
    }
}

impl std::error::Error for NumericError {}

impl From<TypeError> for NumericError {
    fn from(reason: TypeError) -> Self {
        NumericError::InvalidType(reason)
    }
}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            NumericError::positive_overflow().to_string(),
            "arithmetic overflow: result exceeded maximum value"
        );
        assert_eq!(NumericError::DivideByZero.to_string(), "division by zero");
        assert_eq!(
            NumericError::InvalidType(TypeError::InvalidRadix).to_string(),
            "invalid number type: radix must be at least 2"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            NumericError::positive_overflow(),
            NumericError::Overflow(OverflowDirection::Positive)
        );
        assert_ne!(
            NumericError::positive_overflow(),
            NumericError::negative_overflow()
        );
    }

    #[test]
    fn test_type_error_conversion() {
        let err: NumericError = TypeError::ZeroDigits.into();
        assert_eq!(err, NumericError::InvalidType(TypeError::ZeroDigits));
    }
}
