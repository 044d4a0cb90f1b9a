//! Type conversion and type queries.

use rill_value::{CallContext, CallSignature, EvalError, EvalResult, TypeMask, Value, ValueType};

use crate::function_table::FunctionTable;
use crate::Interpreter;

pub(super) fn register(table: &mut FunctionTable) {
    let query = |name| CallSignature::function(name, TypeMask::LOGICAL.singleton()).arg("x", TypeMask::ANY);

    table.builtin(
        CallSignature::function("asFloat", TypeMask::FLOAT).arg("x", TypeMask::ANY_BASE),
        as_float,
    );
    table.builtin(
        CallSignature::function("asInteger", TypeMask::INT).arg("x", TypeMask::ANY_BASE),
        as_integer,
    );
    table.builtin(
        CallSignature::function("asLogical", TypeMask::LOGICAL).arg("x", TypeMask::ANY_BASE),
        as_logical,
    );
    table.builtin(
        CallSignature::function("asString", TypeMask::STRING).arg("x", TypeMask::ANY_BASE),
        as_string,
    );
    table.builtin(
        CallSignature::function("elementType", TypeMask::STRING.singleton()).arg("x", TypeMask::ANY),
        element_type,
    );
    table.builtin(query("isFloat"), is_float);
    table.builtin(query("isInteger"), is_integer);
    table.builtin(query("isLogical"), is_logical);
    table.builtin(query("isNULL"), is_null);
    table.builtin(query("isObject"), is_object);
    table.builtin(query("isString"), is_string);
    table.builtin(
        CallSignature::function("type", TypeMask::STRING.singleton()).arg("x", TypeMask::ANY),
        type_,
    );
}

fn convert<T>(x: &Value, at: impl Fn(&Value, usize) -> Result<T, EvalError>) -> Result<Vec<T>, EvalError> {
    (0..x.count()).map(|i| at(x, i)).collect()
}

fn as_float(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::float_vec(convert(&args[0], Value::float_at)?))
}

fn as_integer(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::int_vec(convert(&args[0], Value::int_at)?))
}

fn as_logical(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::logical_vec(convert(&args[0], Value::logical_at)?))
}

/// Floats render at the interpreter's display precision.
fn as_string(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let opts = interp.display_options();
    Ok(Value::string_vec(convert(&args[0], |x, i| x.string_at_with(i, opts))?))
}

/// Class name for objects, type name otherwise.
fn element_type(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::string(args[0].element_type_name()))
}

fn type_(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::string(args[0].type_name()))
}

fn is_type(x: &Value, ty: ValueType) -> EvalResult {
    Ok(Value::logical(x.value_type() == ty))
}

fn is_float(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    is_type(&args[0], ValueType::Float)
}

fn is_integer(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    is_type(&args[0], ValueType::Int)
}

fn is_logical(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    is_type(&args[0], ValueType::Logical)
}

fn is_null(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    is_type(&args[0], ValueType::Null)
}

fn is_object(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    is_type(&args[0], ValueType::Object)
}

fn is_string(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    is_type(&args[0], ValueType::String)
}
