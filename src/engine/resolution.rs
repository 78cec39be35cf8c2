// ============================================================================
// Operator Resolution
// Pure derivation of result types from operand types
// ============================================================================
//
// Resolution pairs the two tag stacks family by family. For each family the
// dispatch table decides whether the two kinds merge (same kind, or Native
// adopting the other side) and which rule governs the layer. A missing Scaled
// layer is exponent 0 and always merges. Rules then run family by family
// (Scaled, Elastic, Overflow, Rounding), threading one RuleContext, and the
// surviving layers form the result's tag stack.

use super::dispatch::{Dispatch, DispatchTable};
use crate::domain::{
    DivisionPolicy, EngineConfig, MismatchPolicy, NumberType, OperatorKind, Tag, TagFamily,
    TagKind, TagStack, MAX_TAG_DEPTH,
};
use crate::interfaces::{EngineEvent, EventHandler, RuleContext, Shape, TagRule};
use crate::numeric::{NumericError, NumericResult, RepType};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Resolution Types
// ============================================================================

/// What an operator produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResultType {
    Number(NumberType),
    Boolean,
}

impl ResultType {
    pub fn number_type(&self) -> Option<&NumberType> {
        match self {
            ResultType::Number(ty) => Some(ty),
            ResultType::Boolean => None,
        }
    }
}

/// How the result type was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResolutionPath {
    /// Tag rules produced the result
    Tagged,
    /// Tags did not merge; plain arithmetic on the common representation
    NativeFallback,
    /// Boolean comparison of exact values
    Comparison,
}

/// Operand types a resolution is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operands {
    Binary(NumberType, NumberType),
    Unary(NumberType),
    StaticShift(NumberType, u32),
}

/// Cache key: one distinct type combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub op: OperatorKind,
    pub operands: Operands,
    pub division: DivisionPolicy,
}

/// Result type of an operator plus the raw-value adjustments needed to
/// evaluate it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Resolution {
    pub op: OperatorKind,
    pub result: ResultType,
    pub path: ResolutionPath,

    /// Radix steps the left raw value is multiplied by before combining
    pub lhs_alignment: u32,

    /// Radix steps the right raw value is multiplied by before combining
    pub rhs_alignment: u32,

    /// Radix steps the dividend is multiplied by before dividing
    pub dividend_scale: u32,

    /// Static shift applied to the raw bits (`None` when absorbed by the exponent)
    pub raw_shift: Option<u32>,
}

impl Resolution {
    fn plain(op: OperatorKind, result: ResultType, path: ResolutionPath) -> Self {
        Self {
            op,
            result,
            path,
            lhs_alignment: 0,
            rhs_alignment: 0,
            dividend_scale: 0,
            raw_shift: None,
        }
    }

    fn boolean(op: OperatorKind) -> Self {
        Self::plain(op, ResultType::Boolean, ResolutionPath::Comparison)
    }

    /// Operators that write their result back into the left operand's type.
    fn rewrite(op: OperatorKind, ty: &NumberType) -> Self {
        Self::plain(op, ResultType::Number(ty.clone()), ResolutionPath::Tagged)
    }

    pub fn result_type(&self) -> Option<&NumberType> {
        self.result.number_type()
    }

    pub fn is_boolean(&self) -> bool {
        self.result == ResultType::Boolean
    }
}

// ============================================================================
// Layer Merge
// ============================================================================

struct Layer<'a> {
    rule: &'a dyn TagRule,
    lhs: Option<&'a Tag>,
    rhs: Option<&'a Tag>,
    output: Option<Tag>,
}

type Layers<'a> = SmallVec<[Layer<'a>; MAX_TAG_DEPTH + 1]>;

/// Whether `outer` carries every behavior family of `inner`.
///
/// Scaled is left out: an operand without it is a Scaled number at exponent 0.
fn covers(outer: &TagStack, inner: &TagStack) -> bool {
    inner
        .iter()
        .filter(|tag| tag.family() != TagFamily::Scaled)
        .all(|tag| outer.contains(tag.family()))
}

/// Pair up the two stacks family by family; `None` on a mismatch.
///
/// The operand with more behavior families sets the layer order, and the
/// other adopts whatever it lacks (Native is the base of every kind). Two
/// operands that each carry a family the other lacks do not merge, nor do
/// two tags of one family with different kinds.
fn merge<'a>(
    table: &'a DispatchTable,
    op: OperatorKind,
    lhs: &'a TagStack,
    rhs: &'a TagStack,
) -> Option<Layers<'a>> {
    let outer = if covers(lhs, rhs) {
        lhs
    } else if covers(rhs, lhs) {
        rhs
    } else {
        return None;
    };

    let mut layers = Layers::new();
    let mut push = |family: TagFamily| {
        let (l, r) = (lhs.get(family), rhs.get(family));
        let kind = |tag: Option<&Tag>| tag.map(Tag::kind).unwrap_or(TagKind::Native);
        match table.lookup(op, kind(l), kind(r)) {
            Dispatch::Rule(rule) => {
                layers.push(Layer {
                    rule,
                    lhs: l,
                    rhs: r,
                    output: None,
                });
                true
            },
            Dispatch::Boolean | Dispatch::Mismatch => false,
        }
    };

    // A Scaled layer only one side carries goes outermost.
    if !outer.contains(TagFamily::Scaled)
        && (lhs.contains(TagFamily::Scaled) || rhs.contains(TagFamily::Scaled))
        && !push(TagFamily::Scaled)
    {
        return None;
    }
    for tag in outer.iter() {
        if !push(tag.family()) {
            return None;
        }
    }
    Some(layers)
}

/// Layers of a single operand.
fn single<'a>(table: &'a DispatchTable, stack: &'a TagStack) -> NumericResult<Layers<'a>> {
    stack
        .iter()
        .map(|tag| {
            let rule = table
                .rule(tag.family())
                .ok_or(NumericError::IncompatibleTags)?;
            Ok(Layer {
                rule,
                lhs: Some(tag),
                rhs: None,
                output: None,
            })
        })
        .collect()
}

/// Representation of the result when no Elastic layer governs it.
pub fn baseline_rep(op: OperatorKind, lhs: RepType, rhs: Option<RepType>) -> RepType {
    match (op, rhs) {
        (OperatorKind::ShiftLeft | OperatorKind::ShiftRight, _) => lhs,
        (_, Some(rhs)) => RepType::common(lhs, rhs),
        (OperatorKind::Negate, None) => RepType::for_digits(lhs.digits(), true),
        _ => lhs,
    }
}

fn baseline_shape(rep: RepType, operand: &NumberType) -> Shape {
    Shape {
        digits: rep.digits(),
        signed: rep.is_signed(),
        exponent: operand.exponent(),
        radix: operand.radix(),
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve one type combination.
///
/// # Errors
/// - `IncompatibleTags` when the stacks do not merge and no fallback applies
/// - `UnsupportedOperator` when `op` does not match the operand form
pub fn resolve(
    table: &DispatchTable,
    config: &EngineConfig,
    key: &ResolutionKey,
    events: &dyn EventHandler,
) -> NumericResult<Resolution> {
    match &key.operands {
        Operands::Binary(lhs, rhs) => {
            resolve_binary(table, config, key.op, lhs, rhs, key.division, events)
        },
        Operands::Unary(operand) => resolve_unary(table, key.op, operand, None),
        Operands::StaticShift(operand, amount) => {
            resolve_unary(table, key.op, operand, Some(*amount))
        },
    }
}

fn resolve_binary(
    table: &DispatchTable,
    config: &EngineConfig,
    op: OperatorKind,
    lhs: &NumberType,
    rhs: &NumberType,
    division: DivisionPolicy,
    events: &dyn EventHandler,
) -> NumericResult<Resolution> {
    if op.is_comparison() {
        return Ok(Resolution::boolean(op));
    }
    if let OperatorKind::CompoundAssign(assign) = op {
        resolve_binary(table, config, assign.binary(), lhs, rhs, division, events)?;
        return Ok(Resolution::rewrite(op, lhs));
    }
    if !op.is_arithmetic() {
        return Err(NumericError::UnsupportedOperator);
    }

    let Some(mut layers) = merge(table, op, lhs.tags(), rhs.tags()) else {
        return mismatch(config, op, lhs, rhs, events);
    };

    if op == OperatorKind::Divide
        && division == DivisionPolicy::Wide
        && !layers.iter().any(|layer| layer.rule.family() == TagFamily::Scaled)
    {
        if let Some(rule) = table.rule(TagFamily::Scaled) {
            layers.insert(
                0,
                Layer {
                    rule,
                    lhs: None,
                    rhs: None,
                    output: None,
                },
            );
        }
    }

    let baseline = baseline_rep(op, lhs.rep(), Some(rhs.rep()));
    let ctx = RuleContext::new(
        op,
        division,
        Shape::of(lhs),
        Some(Shape::of(rhs)),
        baseline_shape(baseline, lhs),
    );
    finish(op, layers, ctx, baseline)
}

fn resolve_unary(
    table: &DispatchTable,
    op: OperatorKind,
    operand: &NumberType,
    static_shift: Option<u32>,
) -> NumericResult<Resolution> {
    if matches!(
        op,
        OperatorKind::PreIncrement
            | OperatorKind::PreDecrement
            | OperatorKind::PostIncrement
            | OperatorKind::PostDecrement
    ) {
        return Ok(Resolution::rewrite(op, operand));
    }

    let valid = match static_shift {
        Some(_) => op.is_shift(),
        None => op.is_unary(),
    };
    if !valid {
        return Err(NumericError::UnsupportedOperator);
    }

    let layers = single(table, operand.tags())?;
    let baseline = baseline_rep(op, operand.rep(), None);
    let mut ctx = RuleContext::new(
        op,
        DivisionPolicy::Lean,
        Shape::of(operand),
        None,
        baseline_shape(baseline, operand),
    );
    if let Some(amount) = static_shift {
        ctx = ctx.with_static_shift(amount);
    }
    finish(op, layers, ctx, baseline)
}

/// Run the rules family by family and assemble the result type.
fn finish(
    op: OperatorKind,
    mut layers: Layers<'_>,
    mut ctx: RuleContext,
    baseline: RepType,
) -> NumericResult<Resolution> {
    for family in TagFamily::ALL {
        for layer in layers.iter_mut().filter(|layer| layer.rule.family() == family) {
            layer.output = layer.rule.resolve(layer.lhs, layer.rhs, &mut ctx)?;
        }
    }

    let tags = TagStack::from_tags(layers.iter().filter_map(|layer| layer.output))?;
    let rep = if ctx.elastic {
        RepType::for_digits(ctx.result.digits, ctx.result.signed)
    } else if ctx.required_digits > baseline.digits() {
        RepType::for_digits(ctx.required_digits, baseline.is_signed())
    } else {
        baseline
    };

    Ok(Resolution {
        op,
        result: ResultType::Number(NumberType::new(rep, tags)?),
        path: ResolutionPath::Tagged,
        lhs_alignment: ctx.lhs_alignment,
        rhs_alignment: ctx.rhs_alignment,
        dividend_scale: ctx.dividend_scale,
        raw_shift: ctx.raw_shift,
    })
}

fn mismatch(
    config: &EngineConfig,
    op: OperatorKind,
    lhs: &NumberType,
    rhs: &NumberType,
    events: &dyn EventHandler,
) -> NumericResult<Resolution> {
    let simple =
        lhs.tags().len() <= 1 && rhs.tags().len() <= 1 && !lhs.is_scaled() && !rhs.is_scaled();

    if config.mismatch == MismatchPolicy::Reject || !simple {
        events.on_event(EngineEvent::Rejected {
            op,
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        });
        return Err(NumericError::IncompatibleTags);
    }

    events.on_event(EngineEvent::NativeFallback {
        op,
        lhs: lhs.clone(),
        rhs: rhs.clone(),
    });
    let rep = baseline_rep(op, lhs.rep(), Some(rhs.rep()));
    Ok(Resolution::plain(
        op,
        ResultType::Number(NumberType::native(rep)),
        ResolutionPath::NativeFallback,
    ))
}
