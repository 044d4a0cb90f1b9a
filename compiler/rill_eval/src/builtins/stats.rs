//! Summary statistics.

use std::cmp::Ordering;

use rill_value::{CallSignature, EvalError, EvalResult, TypeMask, Value};

use crate::function_table::FunctionTable;
use crate::Interpreter;

pub(super) fn register(table: &mut FunctionTable) {
    let nullable_float = TypeMask::FLOAT.union(TypeMask::NULL).singleton();

    table.builtin(
        CallSignature::function("max", TypeMask::ANY_BASE.singleton()).arg("x", TypeMask::ANY_BASE),
        max,
    );
    table.builtin(
        CallSignature::function("mean", nullable_float).arg("x", TypeMask::NUMERIC),
        mean,
    );
    table.builtin(
        CallSignature::function("min", TypeMask::ANY_BASE.singleton()).arg("x", TypeMask::ANY_BASE),
        min,
    );
    table.builtin(
        CallSignature::function("range", TypeMask::NUMERIC.union(TypeMask::NULL))
            .arg("x", TypeMask::NUMERIC),
        range,
    );
    table.builtin(
        CallSignature::function("sd", nullable_float).arg("x", TypeMask::NUMERIC),
        sd,
    );
}

/// Index of the first element that no other element beats under `wanted`.
pub(super) fn extreme_index(x: &Value, wanted: Ordering) -> Option<usize> {
    (1..x.count()).fold((!x.is_empty()).then_some(0), |best, i| match best {
        Some(b) if x.element_cmp(i, b) == wanted => Some(i),
        other => other,
    })
}

fn max(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    match extreme_index(&args[0], Ordering::Greater) {
        Some(i) => args[0].element_value(i),
        None => Ok(Value::null()),
    }
}

fn min(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    match extreme_index(&args[0], Ordering::Less) {
        Some(i) => args[0].element_value(i),
        None => Ok(Value::null()),
    }
}

fn floats(x: &Value) -> Result<Vec<f64>, EvalError> {
    (0..x.count()).map(|i| x.float_at(i)).collect()
}

fn mean(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let values = floats(&args[0])?;
    if values.is_empty() {
        return Ok(Value::null());
    }
    Ok(Value::float(values.iter().sum::<f64>() / values.len() as f64))
}

/// `c(min(x), max(x))`, keeping the type of `x`.
fn range(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    match (extreme_index(x, Ordering::Less), extreme_index(x, Ordering::Greater)) {
        (Some(lo), Some(hi)) => x.subset(&[lo, hi]),
        _ => Ok(Value::null()),
    }
}

/// Sample standard deviation (n - 1 denominator).
fn sd(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let values = floats(&args[0])?;
    if values.len() < 2 {
        return Ok(Value::null());
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Ok(Value::float((squares / (n - 1.0)).sqrt()))
}
