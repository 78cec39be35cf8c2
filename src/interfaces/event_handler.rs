// ============================================================================
// Event Handler Interface
// Defines the contract for handling resolution and overflow events
// ============================================================================

use crate::domain::{NumberType, OperatorKind, OverflowPolicy};
use crate::numeric::OverflowDirection;

/// Events emitted by the operator engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A type combination was resolved for the first time
    ResolutionComputed {
        op: OperatorKind,
        lhs: NumberType,
        rhs: Option<NumberType>,
        result: Option<NumberType>,
    },

    /// Tag stacks did not merge; Native arithmetic was used instead
    NativeFallback {
        op: OperatorKind,
        lhs: NumberType,
        rhs: NumberType,
    },

    /// Tag stacks did not merge and the operation was rejected
    Rejected {
        op: OperatorKind,
        lhs: NumberType,
        rhs: NumberType,
    },

    /// An exact result fell outside the destination range
    OverflowDetected {
        policy: OverflowPolicy,
        direction: OverflowDirection,
    },
}

/// Event handler trait for processing operator engine events
/// Implementations can handle logging, metrics, diagnostics, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an engine event
    fn on_event(&self, event: EngineEvent);
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: EngineEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: EngineEvent) {
        match &event {
            EngineEvent::OverflowDetected { .. } => {
                tracing::trace!("Operator engine event: {:?}", event)
            },
            _ => tracing::debug!("Operator engine event: {:?}", event),
        }
    }
}
