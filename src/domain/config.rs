// ============================================================================
// Engine Configuration
// Division shape, tag-mismatch handling and resolution caching
// ============================================================================

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Division Policy
// ============================================================================

/// Result shape of a division between two numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DivisionPolicy {
    /// Exponent `e_l - e_r`; result no wider than the dividend
    /// - Use case: `/` operator, integer-style division
    #[default]
    Lean,

    /// Dividend widened by the divisor's digits first, keeping the quotient's
    /// fractional precision
    /// - Use case: named `quotient`, fixed-point division
    Wide,
}

// ============================================================================
// Mismatch Policy
// ============================================================================

/// What to do when two operand tag stacks cannot be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MismatchPolicy {
    /// Single-tag mismatches fall back to Native arithmetic on the common
    /// representation; anything deeper is rejected
    #[default]
    NativeFallback,

    /// Every mismatch is rejected with `IncompatibleTags`
    Reject,
}

// ============================================================================
// Engine Configuration
// ============================================================================

/// Configuration for an [`OperatorEngine`](crate::engine::OperatorEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Division shape used by the `/` operator and `/=`
    pub operator_division: DivisionPolicy,

    /// Division shape used by the named `quotient` function
    pub named_division: DivisionPolicy,

    /// Handling of incompatible tag stacks
    pub mismatch: MismatchPolicy,

    /// Whether resolutions are memoized per type combination
    pub cache_resolutions: bool,

    /// Cache capacity; once reached, new combinations are resolved but not stored
    pub max_cached_resolutions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EngineConfig {
    /// Default capacity of the resolution cache.
    pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

    pub fn new(operator_division: DivisionPolicy, mismatch: MismatchPolicy) -> Self {
        Self {
            operator_division,
            named_division: DivisionPolicy::Wide,
            mismatch,
            cache_resolutions: true,
            max_cached_resolutions: Self::DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Builder method: Set the division shape of the `/` operator
    pub fn with_operator_division(mut self, policy: DivisionPolicy) -> Self {
        self.operator_division = policy;
        self
    }

    /// Builder method: Set the division shape of `quotient`
    pub fn with_named_division(mut self, policy: DivisionPolicy) -> Self {
        self.named_division = policy;
        self
    }

    /// Builder method: Set tag-mismatch handling
    pub fn with_mismatch(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch = policy;
        self
    }

    /// Builder method: Disable the resolution cache
    pub fn without_cache(mut self) -> Self {
        self.cache_resolutions = false;
        self
    }

    /// Builder method: Set cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_resolutions = true;
        self.max_cached_resolutions = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_resolutions && self.max_cached_resolutions == 0 {
            return Err("Cache capacity must be positive when caching is enabled".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl EngineConfig {
    /// Standard configuration
    /// - Lean `/`, wide `quotient`
    /// - Native fallback for simple tag mismatches
    pub fn standard() -> Self {
        Self::new(DivisionPolicy::Lean, MismatchPolicy::NativeFallback)
    }

    /// Strict configuration
    /// - Every tag mismatch is an error
    pub fn strict() -> Self {
        Self::new(DivisionPolicy::Lean, MismatchPolicy::Reject)
    }

    /// Precision-preserving configuration
    /// - `/` behaves like `quotient`
    pub fn precise() -> Self {
        Self::new(DivisionPolicy::Wide, MismatchPolicy::NativeFallback)
    }
}
