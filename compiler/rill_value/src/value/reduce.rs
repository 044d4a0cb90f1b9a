//! Overflow-safe integer reductions.
//!
//! Integers accumulate with checked arithmetic. When a step would overflow,
//! the integer accumulator so far is flushed into a float accumulator and
//! integer accumulation restarts from the overflowing term. The two partial
//! results merge at the end. The order (flush the old accumulator first,
//! then restart from the new term) is fixed because it determines rounding
//! in the float result.

use super::Value;

/// Sum of `values`: integer unless some partial sum overflowed, float then.
pub fn checked_sum(values: &[i64]) -> Value {
    let mut sum: i64 = 0;
    let mut spilled: Option<f64> = None;

    for &term in values {
        match sum.checked_add(term) {
            Some(next) => sum = next,
            None => {
                tracing::trace!(partial = sum, term, "integer sum overflowed; continuing in float");
                *spilled.get_or_insert(0.0) += sum as f64;
                sum = term;
            }
        }
    }

    match spilled {
        None => Value::int(sum),
        Some(float_part) => Value::float(float_part + sum as f64),
    }
}

/// Product of `values`: integer unless some partial product overflowed.
pub fn checked_product(values: &[i64]) -> Value {
    let mut product: i64 = 1;
    let mut spilled: Option<f64> = None;

    for &term in values {
        match product.checked_mul(term) {
            Some(next) => product = next,
            None => {
                tracing::trace!(partial = product, term, "integer product overflowed; continuing in float");
                *spilled.get_or_insert(1.0) *= product as f64;
                product = term;
            }
        }
    }

    match spilled {
        None => Value::int(product),
        Some(float_part) => Value::float(float_part * product as f64),
    }
}
