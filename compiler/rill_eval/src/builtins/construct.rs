//! Vector construction: `c`, typed constructors, repetition and sequences.

use rill_value::{CallSignature, DefaultValue, EvalError, EvalResult, TypeMask, Value};

use super::{count_arg, filled, invalid, with_room};
use crate::function_table::FunctionTable;
use crate::Interpreter;

pub(super) fn register(table: &mut FunctionTable) {
    let int1 = TypeMask::INT.singleton();
    let num1 = TypeMask::NUMERIC.singleton();

    table.builtin(
        CallSignature::function("c", TypeMask::ANY).ellipsis(TypeMask::ANY),
        c,
    );
    table.builtin(
        CallSignature::function("float", TypeMask::FLOAT).arg("length", int1),
        float,
    );
    table.builtin(
        CallSignature::function("integer", TypeMask::INT).arg("length", int1),
        integer,
    );
    table.builtin(
        CallSignature::function("logical", TypeMask::LOGICAL).arg("length", int1),
        logical,
    );
    table.builtin(CallSignature::function("object", TypeMask::OBJECT), object);
    table.builtin(
        CallSignature::function("rep", TypeMask::ANY)
            .arg("x", TypeMask::ANY)
            .arg("count", int1),
        rep,
    );
    table.builtin(
        CallSignature::function("repEach", TypeMask::ANY)
            .arg("x", TypeMask::ANY)
            .arg("count", TypeMask::INT),
        rep_each,
    );
    table.builtin(
        CallSignature::function("seq", TypeMask::NUMERIC)
            .arg("from", num1)
            .arg("to", num1)
            .optional("by", TypeMask::NUMERIC.union(TypeMask::NULL).singleton(), DefaultValue::Null),
        seq,
    );
    table.builtin(
        CallSignature::function("seqAlong", TypeMask::INT).arg("x", TypeMask::ANY),
        seq_along,
    );
    table.builtin(
        CallSignature::function("string", TypeMask::STRING).arg("length", int1),
        string,
    );
}

fn c(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Value::concatenate(args)
}

fn float(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let length = count_arg("float", "length", &args[0])?;
    Ok(Value::float_vec(filled("float", length, 0.0)?))
}

fn integer(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let length = count_arg("integer", "length", &args[0])?;
    Ok(Value::int_vec(filled("integer", length, 0)?))
}

fn logical(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let length = count_arg("logical", "length", &args[0])?;
    Ok(Value::logical_vec(filled("logical", length, false)?))
}

fn string(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let length = count_arg("string", "length", &args[0])?;
    Ok(Value::string_vec(filled("string", length, String::new())?))
}

/// An empty object vector with no class.
fn object(_: &mut Interpreter, _: &[Value]) -> EvalResult {
    Ok(Value::empty_object(None))
}

/// `x` repeated `count` times end to end.
fn rep(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    let count = count_arg("rep", "count", &args[1])?;
    let n = x.count();
    let total = count.checked_mul(n).unwrap_or(usize::MAX);
    let mut indices = with_room("rep", total)?;
    for _ in 0..count.min(total) {
        indices.extend(0..n);
    }
    x.subset(&indices)
}

/// Each element of `x` repeated in place, by one shared count or one count
/// per element.
fn rep_each(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (x, counts) = (&args[0], &args[1]);
    if counts.count() != 1 && counts.count() != x.count() {
        return Err(invalid(
            "repEach",
            "requires that parameter count's size() either (1) be equal to 1, or (2) be equal to the size() of its first argument",
        ));
    }
    let mut repeats = Vec::with_capacity(x.count());
    let mut total = 0usize;
    for i in 0..x.count() {
        let raw = counts.int_at(if counts.count() == 1 { 0 } else { i })?;
        let count = usize::try_from(raw).map_err(|_| {
            invalid(
                "repEach",
                format!("requires count to be greater than or equal to 0 ({raw} supplied)"),
            )
        })?;
        total = total.saturating_add(count);
        repeats.push(count);
    }
    let mut indices = with_room("repEach", total)?;
    for (i, &count) in repeats.iter().enumerate() {
        indices.extend(std::iter::repeat(i).take(count));
    }
    x.subset(&indices)
}

/// `from` to `to` inclusive in steps of `by`.
///
/// The result is float if any argument is float. `by` defaults to 1 or -1
/// toward `to`.
fn seq(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (from, to, by) = (&args[0], &args[1], &args[2]);
    let any_float = [from, to, by].iter().any(|v| v.as_floats().is_some());

    if any_float {
        let (first, last) = (from.float_at(0)?, to.float_at(0)?);
        let step = if by.is_null() {
            if first <= last { 1.0 } else { -1.0 }
        } else {
            by.float_at(0)?
        };
        if !(first.is_finite() && last.is_finite() && step.is_finite()) {
            return Err(invalid("seq", "requires finite values"));
        }
        check_step("seq", step == 0.0, step > 0.0, first, last)?;

        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "saturating cast of a non-negative step count"
        )]
        let len = ((last - first) / step).floor() as usize;
        let mut values = with_room("seq", len.saturating_add(1))?;
        let mut k = 0.0;
        loop {
            let v = first + k * step;
            if (step > 0.0 && v > last) || (step < 0.0 && v < last) {
                break;
            }
            values.push(v);
            k += 1.0;
        }
        Ok(Value::float_vec(values))
    } else {
        let (first, last) = (from.int_at(0)?, to.int_at(0)?);
        let step = if by.is_null() {
            if first <= last { 1 } else { -1 }
        } else {
            by.int_at(0)?
        };
        check_step("seq", step == 0, step > 0, first, last)?;

        let len = (i128::from(last) - i128::from(first)) / i128::from(step) + 1;
        let mut values = with_room("seq", usize::try_from(len).unwrap_or(usize::MAX))?;
        let mut v = first;
        while (step > 0 && v <= last) || (step < 0 && v >= last) {
            values.push(v);
            match v.checked_add(step) {
                Some(next) => v = next,
                None => break,
            }
        }
        Ok(Value::int_vec(values))
    }
}

fn check_step<T: PartialOrd>(
    name: &str,
    is_zero: bool,
    ascending: bool,
    first: T,
    last: T,
) -> Result<(), EvalError> {
    if is_zero {
        return Err(invalid(name, "requires by != 0"));
    }
    if (ascending && first > last) || (!ascending && first < last) {
        return Err(invalid(name, "by has incorrect sign"));
    }
    Ok(())
}

/// Indices `0..size(x)`.
fn seq_along(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let count = i64::try_from(args[0].count()).unwrap_or(i64::MAX);
    Ok(Value::int_vec((0..count).collect()))
}
