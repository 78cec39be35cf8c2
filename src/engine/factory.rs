// ============================================================================
// Type and Engine Factory
// Creates number types and operator engines with proper configuration
// ============================================================================

use crate::domain::{
    DivisionPolicy, EngineConfig, MismatchPolicy, NumberType, OverflowPolicy, RoundingPolicy, Tag,
    TagStack, DEFAULT_RADIX,
};
use crate::engine::{DispatchTable, OperatorEngine};
use crate::interfaces::{EventHandler, TagRule};
use crate::numeric::{NumericError, NumericResult, RepType, TypeError};
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates an operator engine from configuration
///
/// # Arguments
/// * `config` - Engine configuration
/// * `event_handler` - Event handler for resolution and overflow events
///
/// # Returns
/// * `Result<OperatorEngine, String>` - Configured engine or error
///
/// # Example
/// ```
/// use compositional_numeric::prelude::*;
/// use compositional_numeric::engine::factory::create_from_config;
/// use std::sync::Arc;
///
/// let engine = create_from_config(EngineConfig::precise(), Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(engine.config().operator_division, DivisionPolicy::Wide);
/// ```
pub fn create_from_config(
    config: EngineConfig,
    event_handler: Arc<dyn EventHandler>,
) -> Result<OperatorEngine, String> {
    config.validate()?;
    Ok(OperatorEngine::new(config, DispatchTable::standard(), event_handler))
}

// ============================================================================
// Preset Number Types
// ============================================================================

/// Integer with an Elastic budget of `digits`, stored in the narrowest fit.
pub fn elastic_integer(digits: u32, signed: bool) -> NumericResult<NumberType> {
    NumberTypeBuilder::new().digits(digits).signed(signed).elastic().build()
}

/// Binary fixed-point over `rep`: the value is `raw × 2^exponent`.
pub fn scaled_integer(rep: RepType, exponent: i32) -> NumericResult<NumberType> {
    NumberTypeBuilder::new().rep(rep).scaled(exponent).build()
}

/// `rep` with the given overflow policy.
pub fn overflow_integer(rep: RepType, policy: OverflowPolicy) -> NumericResult<NumberType> {
    NumberTypeBuilder::new().rep(rep).overflow(policy).build()
}

/// `rep` with the given rounding policy.
pub fn rounding_integer(rep: RepType, policy: RoundingPolicy) -> NumericResult<NumberType> {
    NumberTypeBuilder::new().rep(rep).rounding(policy).build()
}

/// General-purpose fixed-point real: elastic digits, binary exponent,
/// round-to-nearest and unchecked overflow.
pub fn static_number(digits: u32, exponent: i32) -> NumericResult<NumberType> {
    NumberTypeBuilder::new()
        .digits(digits)
        .elastic()
        .scaled(exponent)
        .rounding(RoundingPolicy::Nearest)
        .overflow(OverflowPolicy::Unchecked)
        .build()
}

// ============================================================================
// Number Type Builder
// ============================================================================

/// Builder for number types with fluent API
///
/// Tags are layered Scaled, Rounding, Overflow, Elastic (outermost first)
/// whatever order the builder methods are called in.
///
/// # Example
/// ```
/// use compositional_numeric::prelude::*;
///
/// let ty = NumberTypeBuilder::new()
///     .digits(12)
///     .elastic()
///     .scaled(-4)
///     .overflow(OverflowPolicy::Saturating)
///     .build()
///     .unwrap();
///
/// assert_eq!(ty.digits(), 12);
/// assert_eq!(ty.exponent(), -4);
/// assert_eq!(ty.rep(), RepType::I16);
/// ```
#[derive(Debug, Clone)]
pub struct NumberTypeBuilder {
    digits: Option<u32>,
    signed: bool,
    rep: Option<RepType>,
    elastic: bool,
    overflow: Option<OverflowPolicy>,
    rounding: Option<RoundingPolicy>,
    scaled: Option<(i32, u32)>,
}

impl NumberTypeBuilder {
    /// Signed 32-bit plain integer until configured otherwise
    pub fn new() -> Self {
        Self {
            digits: None,
            signed: true,
            rep: None,
            elastic: false,
            overflow: None,
            rounding: None,
            scaled: None,
        }
    }

    // ========================================================================
    // Representation
    // ========================================================================

    /// Magnitude digits (sign bit excluded)
    pub fn digits(mut self, digits: u32) -> Self {
        self.digits = Some(digits);
        self
    }

    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    pub fn unsigned(self) -> Self {
        self.signed(false)
    }

    /// Explicit representation; overrides signedness and storage width
    pub fn rep(mut self, rep: RepType) -> Self {
        self.rep = Some(rep);
        self
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Grow the digit budget with every operation
    pub fn elastic(mut self) -> Self {
        self.elastic = true;
        self
    }

    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = Some(policy);
        self
    }

    pub fn rounding(mut self, policy: RoundingPolicy) -> Self {
        self.rounding = Some(policy);
        self
    }

    /// Binary exponent
    pub fn scaled(self, exponent: i32) -> Self {
        self.scaled_radix(exponent, DEFAULT_RADIX)
    }

    pub fn scaled_radix(mut self, exponent: i32, radix: u32) -> Self {
        self.scaled = Some((exponent, radix));
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the number type
    ///
    /// # Errors
    /// `InvalidType` when the digits are zero or exceed the explicit
    /// representation, or when the radix is below 2.
    pub fn build(self) -> NumericResult<NumberType> {
        if self.digits == Some(0) {
            return Err(NumericError::InvalidType(TypeError::ZeroDigits));
        }

        let rep = match (self.rep, self.digits) {
            (Some(rep), _) => rep,
            (None, Some(digits)) => RepType::for_digits(digits, self.signed),
            (None, None) if self.signed => RepType::I32,
            (None, None) => RepType::U32,
        };
        let digits = self.digits.unwrap_or_else(|| rep.digits());

        let mut tags = Vec::with_capacity(4);
        if let Some((exponent, radix)) = self.scaled {
            tags.push(Tag::Scaled { exponent, radix });
        }
        if let Some(policy) = self.rounding {
            tags.push(Tag::Rounding(policy));
        }
        if let Some(policy) = self.overflow {
            tags.push(Tag::Overflow(policy));
        }
        if self.elastic {
            tags.push(Tag::elastic(digits));
        } else if digits > rep.digits() {
            return Err(NumericError::InvalidType(TypeError::DigitsExceedStorage));
        }

        NumberType::new(rep, TagStack::from_tags(tags)?)
    }
}

impl Default for NumberTypeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Operator Engine Builder
// ============================================================================

/// Builder for creating operator engines with fluent API
///
/// # Example
/// ```
/// use compositional_numeric::prelude::*;
/// use std::sync::Arc;
///
/// let engine = OperatorEngineBuilder::new()
///     .wide_operator_division()
///     .reject_mismatches()
///     .with_cache_capacity(256)
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
///
/// assert_eq!(engine.config().mismatch, MismatchPolicy::Reject);
/// ```
pub struct OperatorEngineBuilder {
    config: EngineConfig,
    rules: Vec<Box<dyn TagRule>>,
}

impl OperatorEngineBuilder {
    /// Create a new builder with the standard configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::standard(),
            rules: Vec::new(),
        }
    }

    // ========================================================================
    // Division Configuration
    // ========================================================================

    /// `/` keeps the dividend's width (default)
    pub fn lean_operator_division(mut self) -> Self {
        self.config.operator_division = DivisionPolicy::Lean;
        self
    }

    /// `/` behaves like `quotient`
    pub fn wide_operator_division(mut self) -> Self {
        self.config.operator_division = DivisionPolicy::Wide;
        self
    }

    /// Shape of `quotient`
    pub fn named_division(mut self, policy: DivisionPolicy) -> Self {
        self.config.named_division = policy;
        self
    }

    // ========================================================================
    // Mismatch Configuration
    // ========================================================================

    /// Fall back to plain arithmetic for simple tag mismatches (default)
    pub fn native_fallback(mut self) -> Self {
        self.config.mismatch = MismatchPolicy::NativeFallback;
        self
    }

    /// Reject every tag mismatch
    pub fn reject_mismatches(mut self) -> Self {
        self.config.mismatch = MismatchPolicy::Reject;
        self
    }

    // ========================================================================
    // Additional Configuration
    // ========================================================================

    /// Set resolution cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_cache_capacity(capacity);
        self
    }

    /// Resolve every combination afresh
    pub fn without_cache(mut self) -> Self {
        self.config = self.config.without_cache();
        self
    }

    /// Replace the built-in rule of `rule.family()`
    pub fn with_rule(mut self, rule: Box<dyn TagRule>) -> Self {
        self.rules.push(rule);
        self
    }

    // ========================================================================
    // Preset Configurations
    // ========================================================================

    pub fn strict() -> Self {
        Self {
            config: EngineConfig::strict(),
            rules: Vec::new(),
        }
    }

    pub fn precise() -> Self {
        Self {
            config: EngineConfig::precise(),
            rules: Vec::new(),
        }
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the operator engine
    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> Result<OperatorEngine, String> {
        self.config.validate()?;
        let dispatch = self
            .rules
            .into_iter()
            .fold(DispatchTable::standard(), |table, rule| table.with_rule(rule));
        Ok(OperatorEngine::new(self.config, dispatch, event_handler))
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for OperatorEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
