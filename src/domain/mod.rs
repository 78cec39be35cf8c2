// ============================================================================
// Domain Models Module
// Type descriptors, tags, operators and numbers
// ============================================================================

pub mod config;
pub mod number;
pub mod number_type;
pub mod operator;
pub mod tag;

pub use config::{DivisionPolicy, EngineConfig, MismatchPolicy};
pub use number::Number;
pub use number_type::NumberType;
pub use operator::{AssignOp, OperatorKind};
pub use tag::{
    OverflowPolicy, RoundingPolicy, Tag, TagFamily, TagKind, TagStack, DEFAULT_RADIX,
    MAX_TAG_DEPTH,
};
