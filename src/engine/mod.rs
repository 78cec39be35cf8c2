// ============================================================================
// Engine Module
// Operator resolution, evaluation and conversion
// ============================================================================

mod conversion;
mod dispatch;
mod number_ops;
mod operator_engine;
mod operators;
mod resolution;

pub mod factory;
pub mod literal;

pub use dispatch::{Dispatch, DispatchTable};
pub use factory::{
    create_from_config, elastic_integer, overflow_integer, rounding_integer, scaled_integer,
    static_number, NumberTypeBuilder, OperatorEngineBuilder,
};
pub use literal::{constant, constant_exact, fraction, from_decimal, literal, parse};
pub use operator_engine::OperatorEngine;
pub use operators::MAX_SHIFT;
pub use resolution::{baseline_rep, Operands, Resolution, ResolutionKey, ResolutionPath, ResultType};
