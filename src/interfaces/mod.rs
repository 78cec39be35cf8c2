// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
mod tag_rule;

pub use event_handler::{EngineEvent, EventHandler, LoggingEventHandler, NoOpEventHandler};
pub use tag_rule::{RuleContext, Shape, TagRule};
