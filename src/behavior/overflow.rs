// ============================================================================
// Overflow-Checked Tag
// Applies the destination's overflow policy whenever an exact result narrows
// ============================================================================

use crate::domain::{NumberType, OverflowPolicy, Tag, TagFamily};
use crate::interfaces::{EngineEvent, EventHandler, RuleContext, TagRule};
use crate::numeric::{ExactInt, NumericError, NumericResult, OverflowDirection};

/// Overflow layers pass through every operator unchanged; the policy is
/// consulted when the exact result is narrowed into the result type.
pub struct OverflowRule;

impl TagRule for OverflowRule {
    fn family(&self) -> TagFamily {
        TagFamily::Overflow
    }

    fn resolve(
        &self,
        lhs: Option<&Tag>,
        rhs: Option<&Tag>,
        _ctx: &mut RuleContext,
    ) -> NumericResult<Option<Tag>> {
        Ok(lhs.or(rhs).copied())
    }

    fn name(&self) -> &str {
        "overflow"
    }
}

/// Which side of `ty`'s range `raw` falls off, if any.
pub fn detect(raw: &ExactInt, ty: &NumberType) -> Option<OverflowDirection> {
    if *raw > ty.max_raw() {
        Some(OverflowDirection::Positive)
    } else if *raw < ty.lowest_raw() {
        Some(OverflowDirection::Negative)
    } else {
        None
    }
}

/// Bring an exact raw value into `ty`'s range using its overflow policy.
///
/// # Errors
/// `Overflow(direction)` under the Throwing policy.
pub fn apply(raw: ExactInt, ty: &NumberType, events: &dyn EventHandler) -> NumericResult<ExactInt> {
    let Some(direction) = detect(&raw, ty) else {
        return Ok(raw);
    };

    let policy = ty.overflow_policy();
    events.on_event(EngineEvent::OverflowDetected { policy, direction });

    match policy {
        OverflowPolicy::Native | OverflowPolicy::Unchecked => wrap(&raw, ty),
        OverflowPolicy::Throwing => Err(NumericError::Overflow(direction)),
        OverflowPolicy::Saturating => Ok(match direction {
            OverflowDirection::Positive => ty.max_raw(),
            OverflowDirection::Negative => ty.lowest_raw(),
        }),
        OverflowPolicy::Trapping => trap(direction, ty),
    }
}

/// Reduce `raw` modulo the size of `ty`'s range into `[lowest, max]`.
///
/// For two's-complement ranges this is the usual wraparound; symmetric
/// Elastic ranges wrap with a modulus one smaller, so `-2^d` never appears.
fn wrap(raw: &ExactInt, ty: &NumberType) -> NumericResult<ExactInt> {
    let lowest = ty.lowest_raw();
    let modulus = ty.max_raw().sub(&lowest).add(&ExactInt::ONE);
    let (_, mut offset) = raw.sub(&lowest).div_rem(&modulus)?;
    if offset.is_negative() {
        offset = offset.add(&modulus);
    }
    Ok(lowest.add(&offset))
}

fn trap(direction: OverflowDirection, ty: &NumberType) -> ! {
    tracing::error!("{} overflow in {}; aborting", direction, ty);
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::NoOpEventHandler;
    use crate::domain::TagStack;
    use crate::numeric::RepType;
    use parking_lot::Mutex;

    fn int8(policy: OverflowPolicy) -> NumberType {
        NumberType::native(RepType::I8)
            .with_tag(Tag::Overflow(policy))
            .unwrap()
    }

    fn apply_i(value: i128, ty: &NumberType) -> NumericResult<i128> {
        apply(ExactInt::from_i128(value), ty, &NoOpEventHandler).map(|v| v.to_i128().unwrap())
    }

    #[test]
    fn test_in_range_untouched() {
        for policy in [
            OverflowPolicy::Native,
            OverflowPolicy::Throwing,
            OverflowPolicy::Saturating,
            OverflowPolicy::Trapping,
        ] {
            assert_eq!(apply_i(-128, &int8(policy)), Ok(-128));
            assert_eq!(apply_i(127, &int8(policy)), Ok(127));
        }
    }

    #[test]
    fn test_saturating() {
        let ty = int8(OverflowPolicy::Saturating);
        assert_eq!(apply_i(128, &ty), Ok(127));
        assert_eq!(apply_i(-129, &ty), Ok(-128));
    }

    #[test]
    fn test_throwing() {
        let ty = int8(OverflowPolicy::Throwing);
        assert_eq!(apply_i(128, &ty), Err(NumericError::positive_overflow()));
        assert_eq!(apply_i(-129, &ty), Err(NumericError::negative_overflow()));
    }

    #[test]
    fn test_native_and_unchecked_wrap() {
        assert_eq!(apply_i(128, &int8(OverflowPolicy::Native)), Ok(-128));
        assert_eq!(apply_i(300, &int8(OverflowPolicy::Unchecked)), Ok(44));
        assert_eq!(apply_i(-129, &int8(OverflowPolicy::Native)), Ok(127));
        assert_eq!(apply_i(-300, &int8(OverflowPolicy::Native)), Ok(-44));

        let unsigned = NumberType::native(RepType::U8);
        assert_eq!(apply_i(-1, &unsigned), Ok(255));
        assert_eq!(apply_i(256, &unsigned), Ok(0));
    }

    #[test]
    fn test_symmetric_elastic_wrap_stays_in_range() {
        // elastic<7> holds [-127, 127]: 255 distinct values
        let tags = TagStack::from_tags([Tag::elastic(7)]).unwrap();
        let ty = NumberType::new(RepType::I8, tags).unwrap();
        assert_eq!(apply_i(-128, &ty), Ok(127));
        assert_eq!(apply_i(128, &ty), Ok(-127));
        assert_eq!(apply_i(-127, &ty), Ok(-127));
        assert_eq!(apply_i(382, &ty), Ok(127));
    }

    #[test]
    fn test_trapping_detection() {
        let ty = int8(OverflowPolicy::Trapping);
        assert_eq!(detect(&ExactInt::from_i128(128), &ty), Some(OverflowDirection::Positive));
        assert_eq!(detect(&ExactInt::from_i128(-129), &ty), Some(OverflowDirection::Negative));
        assert_eq!(detect(&ExactInt::from_i128(0), &ty), None);
    }

    struct Recorder(Mutex<Vec<EngineEvent>>);

    impl EventHandler for Recorder {
        fn on_event(&self, event: EngineEvent) {
            self.0.lock().push(event);
        }
    }

    #[test]
    fn test_overflow_reported_to_handler() {
        let recorder = Recorder(Mutex::new(Vec::new()));
        let ty = int8(OverflowPolicy::Saturating);
        let _ = apply(ExactInt::from_i128(1000), &ty, &recorder);
        assert_eq!(
            recorder.0.lock().as_slice(),
            &[EngineEvent::OverflowDetected {
                policy: OverflowPolicy::Saturating,
                direction: OverflowDirection::Positive,
            }]
        );
    }
}
