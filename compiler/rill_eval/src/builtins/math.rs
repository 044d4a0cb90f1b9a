//! Math built-ins.

use rill_value::{checked_product, checked_sum, CallSignature, EvalError, EvalResult, TypeMask, Value};

use super::invalid;
use crate::function_table::FunctionTable;
use crate::Interpreter;

pub(super) fn register(table: &mut FunctionTable) {
    let numeric_to_float = |name| CallSignature::function(name, TypeMask::FLOAT).arg("x", TypeMask::NUMERIC);
    let float_to_float = |name| CallSignature::function(name, TypeMask::FLOAT).arg("x", TypeMask::FLOAT);
    let float_test = |name| CallSignature::function(name, TypeMask::LOGICAL).arg("x", TypeMask::FLOAT);

    table.builtin(
        CallSignature::function("abs", TypeMask::NUMERIC).arg("x", TypeMask::NUMERIC),
        abs,
    );
    table.builtin(numeric_to_float("acos"), acos);
    table.builtin(numeric_to_float("asin"), asin);
    table.builtin(numeric_to_float("atan"), atan);
    table.builtin(
        CallSignature::function("atan2", TypeMask::FLOAT)
            .arg("x", TypeMask::NUMERIC)
            .arg("y", TypeMask::NUMERIC),
        atan2,
    );
    table.builtin(float_to_float("ceil"), ceil);
    table.builtin(numeric_to_float("cos"), cos);
    table.builtin(numeric_to_float("exp"), exp);
    table.builtin(float_to_float("floor"), floor);
    table.builtin(float_test("isFinite"), is_finite);
    table.builtin(float_test("isInfinite"), is_infinite);
    table.builtin(float_test("isNAN"), is_nan);
    table.builtin(numeric_to_float("log"), log);
    table.builtin(numeric_to_float("log10"), log10);
    table.builtin(numeric_to_float("log2"), log2);
    table.builtin(
        CallSignature::function("product", TypeMask::NUMERIC.singleton()).arg("x", TypeMask::NUMERIC),
        product,
    );
    table.builtin(float_to_float("round"), round);
    table.builtin(numeric_to_float("sin"), sin);
    table.builtin(numeric_to_float("sqrt"), sqrt);
    table.builtin(
        CallSignature::function("sum", TypeMask::NUMERIC.singleton()).arg("x", TypeMask::LOGICAL_EQUIV),
        sum,
    );
    table.builtin(numeric_to_float("tan"), tan);
    table.builtin(float_to_float("trunc"), trunc);
}

/// Apply `f` to every element of `x` read as float.
fn map_float(x: &Value, f: impl Fn(f64) -> f64) -> EvalResult {
    let values = (0..x.count())
        .map(|i| x.float_at(i).map(&f))
        .collect::<Result<Vec<_>, EvalError>>()?;
    Ok(Value::float_vec(values))
}

fn map_test(x: &Value, f: impl Fn(f64) -> bool) -> EvalResult {
    let values = (0..x.count())
        .map(|i| x.float_at(i).map(&f))
        .collect::<Result<Vec<_>, EvalError>>()?;
    Ok(Value::logical_vec(values))
}

fn abs(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    match x.as_ints() {
        Some(ints) => {
            let values = ints
                .iter()
                .map(|v| {
                    v.checked_abs().ok_or_else(|| {
                        invalid("abs", "cannot take the absolute value of the most negative integer")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::int_vec(values))
        }
        None => map_float(x, f64::abs),
    }
}

fn acos(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::acos)
}

fn asin(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::asin)
}

fn atan(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::atan)
}

/// Element-wise `atan2(x[i], y[i])`.
fn atan2(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (x, y) = (&args[0], &args[1]);
    if x.count() != y.count() {
        return Err(invalid("atan2", "requires arguments of equal length"));
    }
    let values = (0..x.count())
        .map(|i| Ok(x.float_at(i)?.atan2(y.float_at(i)?)))
        .collect::<Result<Vec<_>, EvalError>>()?;
    Ok(Value::float_vec(values))
}

fn ceil(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::ceil)
}

fn cos(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::cos)
}

fn exp(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::exp)
}

fn floor(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::floor)
}

fn is_finite(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_test(&args[0], f64::is_finite)
}

fn is_infinite(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_test(&args[0], f64::is_infinite)
}

fn is_nan(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_test(&args[0], f64::is_nan)
}

fn log(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::ln)
}

fn log10(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::log10)
}

fn log2(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::log2)
}

/// Integer products fall back to float on overflow.
fn product(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    match x.as_ints() {
        Some(ints) => Ok(checked_product(ints)),
        None => {
            let mut total = 1.0;
            for i in 0..x.count() {
                total *= x.float_at(i)?;
            }
            Ok(Value::float(total))
        }
    }
}

/// Halves round away from zero.
fn round(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::round)
}

fn sin(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::sin)
}

fn sqrt(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::sqrt)
}

/// Logicals count their `T`s; integer sums fall back to float on overflow.
fn sum(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    if let Some(logicals) = x.as_logicals() {
        let trues = logicals.iter().filter(|&&v| v).count();
        return Ok(Value::int(i64::try_from(trues).unwrap_or(i64::MAX)));
    }
    match x.as_ints() {
        Some(ints) => Ok(checked_sum(ints)),
        None => {
            let mut total = 0.0;
            for i in 0..x.count() {
                total += x.float_at(i)?;
            }
            Ok(Value::float(total))
        }
    }
}

fn tan(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::tan)
}

fn trunc(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    map_float(&args[0], f64::trunc)
}
