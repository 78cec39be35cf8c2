// ============================================================================
// Basic Usage Example
// ============================================================================
//
// Run with `--features logging` to see resolution and overflow events.

use compositional_numeric::prelude::*;
use std::sync::Arc;

fn main() {
    #[cfg(feature = "logging")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("=== Compositional Numeric Example ===\n");

    let engine = OperatorEngineBuilder::new()
        .build(Arc::new(LoggingEventHandler))
        .expect("standard configuration is valid");

    // Elastic integers grow to hold every result
    println!("--- Elastic ---");
    let a = constant(250).unwrap();
    let b = constant(-1000).unwrap();
    let product = engine.apply(OperatorKind::Multiply, &a, &b).unwrap();
    println!("{} * {} = {}  as {}", a, b, product, product.number_type());

    // Overflow policies on an 8-bit representation
    println!("\n--- Overflow ---");
    for policy in [OverflowPolicy::Native, OverflowPolicy::Saturating, OverflowPolicy::Throwing] {
        let ty = overflow_integer(RepType::I8, policy).unwrap();
        let x = engine.from_i128(&ty, 100).unwrap();
        match engine.apply(OperatorKind::Add, &x, &x) {
            Ok(sum) => println!("{:>10}: 100 + 100 = {}", policy.name(), sum),
            Err(error) => println!("{:>10}: 100 + 100 failed: {}", policy.name(), error),
        }
    }

    // Rounding policies on division
    println!("\n--- Rounding ---");
    for policy in [
        RoundingPolicy::Native,
        RoundingPolicy::Nearest,
        RoundingPolicy::NegInf,
        RoundingPolicy::TieToPosInf,
    ] {
        let ty = rounding_integer(RepType::I32, policy).unwrap();
        let (n, d) = (engine.from_i128(&ty, -7).unwrap(), engine.from_i128(&ty, 2).unwrap());
        let q = engine.apply(OperatorKind::Divide, &n, &d).unwrap();
        println!("{:>14}: -7 / 2 = {}", policy.name(), q);
    }

    // Fixed-point arithmetic with exact alignment
    println!("\n--- Scaled ---");
    let q8 = scaled_integer(RepType::I32, -8).unwrap();
    let price = engine.convert(&parse("19.75").unwrap(), &q8).unwrap();
    let fee = engine.convert(&parse("0.125").unwrap(), &q8).unwrap();
    let total = engine.apply(OperatorKind::Add, &price, &fee).unwrap();
    println!("{} + {} = {}  as {}", price, fee, total, total.number_type());

    let (one, three) = (engine.from_i128(&q8, 1).unwrap(), engine.from_i128(&q8, 3).unwrap());
    let third = engine.quotient(&one, &three).unwrap();
    println!("quotient(1, 3) = {}  as {}", third, third.number_type());
    println!("as decimal: {}", engine.convert(&third, &q8).unwrap().to_decimal().unwrap());
    println!("sqrt({}) = {}", price, engine.sqrt(&price).unwrap());

    // Mismatched tags
    println!("\n--- Tag mismatch ---");
    let sat = overflow_integer(RepType::I8, OverflowPolicy::Saturating).unwrap();
    let x = engine.from_i128(&sat, 1).unwrap();
    let resolution = engine.resolve(OperatorKind::Add, x.number_type(), a.number_type()).unwrap();
    println!(
        "{} + {} resolves via {:?} to {:?}",
        x.number_type(),
        a.number_type(),
        resolution.path,
        resolution.result
    );

    let strict = OperatorEngineBuilder::strict()
        .build(Arc::new(NoOpEventHandler))
        .expect("strict configuration is valid");
    if let Err(error) = strict.apply(OperatorKind::Add, &x, &a) {
        println!("strict engine: {}", error);
    }

    println!("\nResolutions cached: {}", engine.cached_resolutions());
}
