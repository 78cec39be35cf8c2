// ============================================================================
// Literal Ingestion
// Numbers typed as narrowly as their compile-time value allows
// ============================================================================

use super::factory::NumberTypeBuilder;
use crate::domain::Number;
use crate::numeric::{ExactInt, NumericError, NumericResult};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Smallest Elastic integer holding `value`.
pub fn constant(value: i128) -> NumericResult<Number> {
    constant_exact(&ExactInt::from_i128(value))
}

/// Smallest Elastic integer holding `value`; signed only when negative.
pub fn constant_exact(value: &ExactInt) -> NumericResult<Number> {
    elastic_number(value, None)
}

/// Elastic Scaled number with the trailing zero bits of `value` moved into
/// the exponent: `4` becomes one digit at exponent 2.
pub fn literal(value: i128) -> NumericResult<Number> {
    let exact = ExactInt::from_i128(value);
    match exact.trailing_zeros() {
        Some(zeros) if zeros > 0 => elastic_number(&exact.shr(zeros), Some((zeros as i32, 2))),
        _ => elastic_number(&exact, None),
    }
}

/// Exact number for a decimal value: radix-10 Scaled when it has a fraction.
pub fn from_decimal(value: Decimal) -> NumericResult<Number> {
    let normalized = value.normalize();
    let mantissa = ExactInt::from_i128(normalized.mantissa());
    match normalized.scale() {
        0 => elastic_number(&mantissa, None),
        scale => elastic_number(&mantissa, Some((-(scale as i32), 10))),
    }
}

/// `numerator / denominator` as a Scaled number whose fractional bits match
/// the denominator's width, the type wide division deduces. Use
/// `OperatorEngine::from_fraction` to pick the destination type instead.
///
/// # Errors
/// `DivideByZero` for a zero denominator.
pub fn fraction(numerator: i128, denominator: i128) -> NumericResult<Number> {
    constant(numerator)?.quotient(&constant(denominator)?)
}

fn elastic_number(raw: &ExactInt, scale: Option<(i32, u32)>) -> NumericResult<Number> {
    let digits = raw.abs().used_bits().max(1);
    let mut builder = NumberTypeBuilder::new()
        .digits(digits)
        .signed(raw.is_negative())
        .elastic();
    if let Some((exponent, radix)) = scale {
        builder = builder.scaled_radix(exponent, radix);
    }
    Number::from_raw_value(builder.build()?, raw)
}

// ============================================================================
// Text Parsing
// ============================================================================

/// Parse integer text (`0x`, `0b`, `0o` or decimal, optional leading `-`,
/// `_` separators) or a decimal fraction such as `-12.375`.
///
/// # Errors
/// - `InvalidLiteralDigit` for a character outside the radix, a second `.`,
///   or an empty digit sequence (reported as `'\0'` at the end of the text)
/// - `PrecisionLoss` for fractions beyond `Decimal` precision
pub fn parse(text: &str) -> NumericResult<Number> {
    let (negative, body, offset) = match text.strip_prefix('-') {
        Some(rest) => (true, rest, 1),
        None => (false, text, 0),
    };
    let (radix, digits, offset) = match body.get(..2) {
        Some("0x") | Some("0X") => (16, &body[2..], offset + 2),
        Some("0b") | Some("0B") => (2, &body[2..], offset + 2),
        Some("0o") | Some("0O") => (8, &body[2..], offset + 2),
        _ => (10, body, offset),
    };

    let base = ExactInt::from_i128(radix as i128);
    let mut mantissa = ExactInt::ZERO;
    let mut fraction_digits: Option<u32> = None;
    let mut seen = false;

    for (index, ch) in digits.char_indices() {
        match ch {
            '_' => continue,
            '.' if radix == 10 && fraction_digits.is_none() => {
                fraction_digits = Some(0);
                continue;
            },
            _ => {},
        }
        let digit = ch.to_digit(radix).ok_or(NumericError::InvalidLiteralDigit {
            digit: ch,
            position: offset + index,
        })?;
        mantissa = mantissa.mul(&base).add(&ExactInt::from_i128(digit as i128));
        if let Some(count) = fraction_digits.as_mut() {
            *count += 1;
        }
        seen = true;
    }

    if !seen {
        return Err(NumericError::InvalidLiteralDigit {
            digit: '\0',
            position: text.len(),
        });
    }
    let mantissa = if negative { mantissa.neg() } else { mantissa };

    match fraction_digits {
        None | Some(0) => constant_exact(&mantissa),
        Some(scale) => {
            let small = mantissa.to_i128().ok_or(NumericError::PrecisionLoss)?;
            let decimal = Decimal::try_from_i128_with_scale(small, scale)
                .map_err(|_| NumericError::PrecisionLoss)?;
            from_decimal(decimal)
        },
    }
}

impl FromStr for Number {
    type Err = NumericError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse(text)
    }
}

impl TryFrom<Decimal> for Number {
    type Error = NumericError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        from_decimal(value)
    }
}
