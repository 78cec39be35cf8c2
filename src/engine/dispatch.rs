// ============================================================================
// Dispatch Table
// Maps (operator, lhs tag kind, rhs tag kind) to the rule that resolves it
// ============================================================================

use crate::behavior::{ElasticRule, OverflowRule, RoundingRule, ScaledRule};
use crate::domain::{OperatorKind, TagFamily, TagKind};
use crate::interfaces::TagRule;
use std::collections::HashMap;

/// Outcome of a dispatch lookup for one layer.
pub enum Dispatch<'a> {
    /// Both sides are governed by this rule
    Rule(&'a dyn TagRule),
    /// The operator yields a boolean; no tag rule is involved
    Boolean,
    /// The kinds are not family-equivalent
    Mismatch,
}

/// Per-family rules, built once per engine.
pub struct DispatchTable {
    rules: HashMap<TagFamily, Box<dyn TagRule>>,
}

impl DispatchTable {
    /// Table with the built-in rule of every family.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(Box::new(ScaledRule))
            .with_rule(Box::new(ElasticRule))
            .with_rule(Box::new(OverflowRule))
            .with_rule(Box::new(RoundingRule))
    }

    pub fn empty() -> Self {
        Self { rules: HashMap::new() }
    }

    /// Install `rule`, replacing any rule of the same family.
    pub fn with_rule(mut self, rule: Box<dyn TagRule>) -> Self {
        self.rules.insert(rule.family(), rule);
        self
    }

    pub fn rule(&self, family: TagFamily) -> Option<&dyn TagRule> {
        self.rules.get(&family).map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule for one layer where `lhs` and `rhs` meet under `op`.
    pub fn lookup(&self, op: OperatorKind, lhs: TagKind, rhs: TagKind) -> Dispatch<'_> {
        if op.is_comparison() {
            return Dispatch::Boolean;
        }
        if !lhs.is_family_equivalent(&rhs) {
            return Dispatch::Mismatch;
        }
        match lhs.family().or(rhs.family()).and_then(|family| self.rule(family)) {
            Some(rule) => Dispatch::Rule(rule),
            None => Dispatch::Mismatch,
        }
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}
