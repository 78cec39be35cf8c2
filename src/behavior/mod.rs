// ============================================================================
// Behavior Rules Module
// One rule per tag family, plugged into the operator engine's dispatch table
// ============================================================================

pub mod elastic;
pub mod overflow;
pub mod rounding;
pub mod scaled;

pub use elastic::ElasticRule;
pub use overflow::OverflowRule;
pub use rounding::RoundingRule;
pub use scaled::ScaledRule;
