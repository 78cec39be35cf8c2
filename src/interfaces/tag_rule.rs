// ============================================================================
// Tag Rule Interface
// Defines the contract for per-family operator resolution rules
// ============================================================================

use crate::domain::{DivisionPolicy, NumberType, OperatorKind, Tag, TagFamily};
use crate::numeric::NumericResult;

/// Digit budget, signedness and scale of one side of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub digits: u32,
    pub signed: bool,
    pub exponent: i32,
    pub radix: u32,
}

impl Shape {
    pub fn of(ty: &NumberType) -> Self {
        Self {
            digits: ty.digits(),
            signed: ty.is_signed(),
            exponent: ty.exponent(),
            radix: ty.radix(),
        }
    }
}

/// Working state threaded through the rules of one resolution.
///
/// Rules run in a fixed order (Scaled, Elastic, Overflow, Rounding) so that
/// the digit rules see operands after exponent alignment.
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub op: OperatorKind,
    pub division: DivisionPolicy,

    /// Left operand, possibly widened by alignment
    pub lhs: Shape,

    /// Right operand; `None` for unary operators and static shifts
    pub rhs: Option<Shape>,

    /// Amount of a static (compile-time) shift
    pub static_shift: Option<u32>,

    /// Result being built; starts as the Native result shape
    pub result: Shape,

    /// Whether an Elastic layer governs the result digits
    pub elastic: bool,

    /// Digits a non-elastic result must be able to hold
    pub required_digits: u32,

    /// Radix steps the left raw value is scaled up by before combining
    pub lhs_alignment: u32,

    /// Radix steps the right raw value is scaled up by before combining
    pub rhs_alignment: u32,

    /// Radix steps the dividend is scaled up by before dividing
    pub dividend_scale: u32,

    /// Static shift still to be applied to the raw bits
    pub raw_shift: Option<u32>,
}

impl RuleContext {
    pub fn new(
        op: OperatorKind,
        division: DivisionPolicy,
        lhs: Shape,
        rhs: Option<Shape>,
        result: Shape,
    ) -> Self {
        Self {
            op,
            division,
            lhs,
            rhs,
            static_shift: None,
            result,
            elastic: false,
            required_digits: 0,
            lhs_alignment: 0,
            rhs_alignment: 0,
            dividend_scale: 0,
            raw_shift: None,
        }
    }

    pub fn with_static_shift(mut self, amount: u32) -> Self {
        self.static_shift = Some(amount);
        self.raw_shift = Some(amount);
        self
    }

    /// Right operand shape, or the left one for unary operators.
    pub fn rhs_or_lhs(&self) -> Shape {
        self.rhs.unwrap_or(self.lhs)
    }
}

/// Strategy pattern interface for tag families
/// Implementations: Elastic, Overflow, Rounding, Scaled
pub trait TagRule: Send + Sync {
    /// Family this rule governs
    fn family(&self) -> TagFamily;

    /// Refine the context for one merged layer
    ///
    /// # Arguments
    /// * `lhs` - The left operand's tag at this layer (`None` if adopted)
    /// * `rhs` - The right operand's tag at this layer (`None` if adopted or unary)
    /// * `ctx` - Resolution state shared by all layers
    ///
    /// # Returns
    /// The tag the result carries at this layer, or `None` to drop the layer
    fn resolve(
        &self,
        lhs: Option<&Tag>,
        rhs: Option<&Tag>,
        ctx: &mut RuleContext,
    ) -> NumericResult<Option<Tag>>;

    /// Get the rule name for logging
    fn name(&self) -> &str;
}
