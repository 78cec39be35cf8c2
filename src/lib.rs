// ============================================================================
// Compositional Numeric Library
// Integer and fixed-point types assembled from orthogonal behavior tags
// ============================================================================

//! # Compositional Numeric
//!
//! Number types built by wrapping a raw integer representation in a stack of
//! behavior tags, with every operator's result type derived from its operand
//! types.
//!
//! ## Features
//!
//! - **Wide integers** of any width, with native machine integers up to 64 bits
//! - **Elastic** digit budgets that grow so arithmetic never overflows
//! - **Overflow policies**: native wrap, throwing, saturating, trapping
//! - **Rounding policies** for division, right shifts and conversions
//! - **Scaled** fixed-point with arbitrary radix and exact operand alignment
//! - **Cached resolution** of result types per operand type combination
//!
//! ## Example
//!
//! ```rust
//! use compositional_numeric::prelude::*;
//!
//! // Elastic integers grow instead of overflowing
//! let a = constant(200).unwrap();
//! let b = constant(100).unwrap();
//! let sum = &a + &b;
//! assert_eq!(sum.to_string(), "300");
//! assert_eq!(sum.number_type().digits(), 9);
//!
//! // Saturating 8-bit arithmetic
//! let sat = overflow_integer(RepType::I8, OverflowPolicy::Saturating).unwrap();
//! let x = constant(100).unwrap().convert_to(&sat).unwrap();
//! assert_eq!((&x + &x).to_string(), "127");
//!
//! // Binary fixed-point meets decimal input
//! let fixed = scaled_integer(RepType::I32, -8).unwrap();
//! let price = parse("1.5").unwrap().convert_to(&fixed).unwrap();
//! assert_eq!(price.to_string(), "1.5");
//! ```

pub mod behavior;
pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        AssignOp, DivisionPolicy, EngineConfig, MismatchPolicy, Number, NumberType, OperatorKind,
        OverflowPolicy, RoundingPolicy, Tag, TagFamily, TagStack,
    };
    pub use crate::engine::{
        constant, create_from_config, elastic_integer, fraction, from_decimal, literal,
        overflow_integer, parse, rounding_integer, scaled_integer, static_number, NumberTypeBuilder,
        OperatorEngine, OperatorEngineBuilder, Resolution, ResultType,
    };
    pub use crate::interfaces::{
        EngineEvent, EventHandler, LoggingEventHandler, NoOpEventHandler, TagRule,
    };
    pub use crate::numeric::{ExactInt, NumericError, NumericResult, RepType, WideInteger};
}
