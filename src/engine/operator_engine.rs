// ============================================================================
// Operator Engine
// Cached operator resolution and value-level evaluation
// ============================================================================

use super::dispatch::DispatchTable;
use super::resolution::{self, Operands, Resolution, ResolutionKey};
use crate::domain::{DivisionPolicy, EngineConfig, NumberType, OperatorKind};
use crate::interfaces::{EngineEvent, EventHandler, LoggingEventHandler};
use crate::numeric::NumericResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static GLOBAL_ENGINE: OnceLock<OperatorEngine> = OnceLock::new();

/// Operator engine with pluggable tag rules
///
/// Resolutions are pure functions of the operand types, so each distinct
/// combination is resolved once and shared afterwards.
pub struct OperatorEngine {
    /// Division shape, mismatch handling and cache settings
    pub(crate) config: EngineConfig,

    /// Per-family tag rules
    pub(crate) dispatch: DispatchTable,

    /// Resolved type combinations
    cache: RwLock<HashMap<ResolutionKey, Arc<Resolution>>>,

    /// Event handler for processing events
    pub(crate) event_handler: Arc<dyn EventHandler>,
}

impl OperatorEngine {
    /// Create a new operator engine
    pub fn new(
        config: EngineConfig,
        dispatch: DispatchTable,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            config,
            dispatch,
            cache: RwLock::new(HashMap::new()),
            event_handler,
        }
    }

    /// Process-wide engine with the standard configuration, used by the
    /// `std::ops` implementations on `Number`.
    pub fn global() -> &'static OperatorEngine {
        GLOBAL_ENGINE.get_or_init(|| {
            OperatorEngine::new(
                EngineConfig::standard(),
                DispatchTable::standard(),
                Arc::new(LoggingEventHandler),
            )
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of cached resolutions
    pub fn cached_resolutions(&self) -> usize {
        self.cache.read().len()
    }

    /// Drop every cached resolution
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Result type of a binary operator (arithmetic, comparison or compound
    /// assignment). Division uses the configured operator shape.
    pub fn resolve(
        &self,
        op: OperatorKind,
        lhs: &NumberType,
        rhs: &NumberType,
    ) -> NumericResult<Arc<Resolution>> {
        self.resolve_key(ResolutionKey {
            op,
            operands: Operands::Binary(lhs.clone(), rhs.clone()),
            division: self.config.operator_division,
        })
    }

    /// Result type of a unary operator (including increment/decrement).
    pub fn resolve_unary(
        &self,
        op: OperatorKind,
        operand: &NumberType,
    ) -> NumericResult<Arc<Resolution>> {
        self.resolve_key(ResolutionKey {
            op,
            operands: Operands::Unary(operand.clone()),
            division: DivisionPolicy::Lean,
        })
    }

    /// Result type of a shift by an amount known up front.
    pub fn resolve_static_shift(
        &self,
        op: OperatorKind,
        lhs: &NumberType,
        amount: u32,
    ) -> NumericResult<Arc<Resolution>> {
        self.resolve_key(ResolutionKey {
            op,
            operands: Operands::StaticShift(lhs.clone(), amount),
            division: DivisionPolicy::Lean,
        })
    }

    /// Result type of a division with an explicit shape.
    pub fn resolve_division(
        &self,
        lhs: &NumberType,
        rhs: &NumberType,
        policy: DivisionPolicy,
    ) -> NumericResult<Arc<Resolution>> {
        self.resolve_key(ResolutionKey {
            op: OperatorKind::Divide,
            operands: Operands::Binary(lhs.clone(), rhs.clone()),
            division: policy,
        })
    }

    fn resolve_key(&self, key: ResolutionKey) -> NumericResult<Arc<Resolution>> {
        if self.config.cache_resolutions {
            if let Some(hit) = self.cache.read().get(&key) {
                return Ok(Arc::clone(hit));
            }
        }

        let resolution = Arc::new(resolution::resolve(
            &self.dispatch,
            &self.config,
            &key,
            self.event_handler.as_ref(),
        )?);

        let (lhs, rhs) = match &key.operands {
            Operands::Binary(lhs, rhs) => (lhs.clone(), Some(rhs.clone())),
            Operands::Unary(operand) | Operands::StaticShift(operand, _) => (operand.clone(), None),
        };
        self.event_handler.on_event(EngineEvent::ResolutionComputed {
            op: key.op,
            lhs,
            rhs,
            result: resolution.result_type().cloned(),
        });

        if self.config.cache_resolutions {
            let mut cache = self.cache.write();
            if cache.len() < self.config.max_cached_resolutions {
                cache.insert(key, Arc::clone(&resolution));
            }
        }

        Ok(resolution)
    }
}

impl Default for OperatorEngine {
    fn default() -> Self {
        Self::new(
            EngineConfig::standard(),
            DispatchTable::standard(),
            Arc::new(LoggingEventHandler),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Tag, TagStack};
    use crate::interfaces::NoOpEventHandler;
    use crate::numeric::{NumericError, RepType};
    use parking_lot::Mutex;

    fn engine(config: EngineConfig) -> OperatorEngine {
        OperatorEngine::new(config, DispatchTable::standard(), Arc::new(NoOpEventHandler))
    }

    fn elastic(digits: u32) -> NumberType {
        NumberType::new(
            RepType::for_digits(digits, true),
            TagStack::from_tags([Tag::elastic(digits)]).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_resolution_is_cached() {
        let engine = engine(EngineConfig::standard());
        let first = engine.resolve(OperatorKind::Add, &elastic(8), &elastic(8)).unwrap();
        let second = engine.resolve(OperatorKind::Add, &elastic(8), &elastic(8)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_resolutions(), 1);

        engine.clear_cache();
        assert_eq!(engine.cached_resolutions(), 0);
    }

    #[test]
    fn test_cache_capacity_respected() {
        let engine = engine(EngineConfig::standard().with_cache_capacity(1));
        engine.resolve(OperatorKind::Add, &elastic(8), &elastic(8)).unwrap();
        engine.resolve(OperatorKind::Add, &elastic(9), &elastic(8)).unwrap();
        assert_eq!(engine.cached_resolutions(), 1);
    }

    #[test]
    fn test_uncached_engine() {
        let engine = engine(EngineConfig::standard().without_cache());
        let first = engine.resolve(OperatorKind::Multiply, &elastic(3), &elastic(4)).unwrap();
        let second = engine.resolve(OperatorKind::Multiply, &elastic(3), &elastic(4)).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert_eq!(engine.cached_resolutions(), 0);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let engine = engine(EngineConfig::strict());
        let saturating = NumberType::native(RepType::I8)
            .with_tag(Tag::Overflow(crate::domain::OverflowPolicy::Saturating))
            .unwrap();
        assert_eq!(
            engine.resolve(OperatorKind::Add, &saturating, &elastic(7)).err(),
            Some(NumericError::IncompatibleTags)
        );
        assert_eq!(engine.cached_resolutions(), 0);
    }

    struct Recorder(Mutex<Vec<EngineEvent>>);

    impl EventHandler for Recorder {
        fn on_event(&self, event: EngineEvent) {
            self.0.lock().push(event);
        }
    }

    #[test]
    fn test_resolution_event_emitted_once() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let engine = OperatorEngine::new(
            EngineConfig::standard(),
            DispatchTable::standard(),
            recorder.clone(),
        );

        engine.resolve_unary(OperatorKind::Negate, &elastic(5)).unwrap();
        engine.resolve_unary(OperatorKind::Negate, &elastic(5)).unwrap();

        let events = recorder.0.lock();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            EngineEvent::ResolutionComputed { op: OperatorKind::Negate, .. }
        ));
    }

    #[test]
    fn test_global_engine_is_shared() {
        assert!(std::ptr::eq(OperatorEngine::global(), OperatorEngine::global()));
        assert_eq!(OperatorEngine::global().config(), &EngineConfig::standard());
    }
}
