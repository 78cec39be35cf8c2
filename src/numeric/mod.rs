// ============================================================================
// Numeric Module
// Raw integer layer underneath every tagged number type
// ============================================================================
//
// This module provides:
// - WideInteger: limb-based two's-complement integer of arbitrary width
// - ExactInt: unbounded intermediate used before any narrowing happens
// - RepType/Representation: the fixed-width value a number wraps
// - NumericError: error types for all operations
//
// Design principles:
// - Intermediate results are exact; only conversion narrows
// - Native widths (8/16/32/64) use machine integers, wider ones use limbs
// - All fallible operations return Result

mod errors;
mod exact;
mod representation;
mod wide_integer;

pub use errors::{NumericError, NumericResult, OverflowDirection, TypeError};
pub use exact::ExactInt;
pub use representation::{RepType, Representation};
pub use wide_integer::{limbs_for, Limbs, WideInteger, LIMB_BITS};
