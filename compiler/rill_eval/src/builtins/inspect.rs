//! Vector inspection, reordering, strings and printing.

use std::cmp::Ordering;
use std::hash::Hash;

use rill_value::{CallContext, CallSignature, DefaultValue, EvalError, EvalResult, TypeMask, Value};
use rustc_hash::{FxHashMap, FxHashSet};

use super::invalid;
use super::stats::extreme_index;
use crate::function_table::FunctionTable;
use crate::Interpreter;

pub(super) fn register(table: &mut FunctionTable) {
    let logical1 = TypeMask::LOGICAL.singleton();
    let string1 = TypeMask::STRING.singleton();
    let nullable_index = TypeMask::INT.union(TypeMask::NULL).singleton();

    table.builtin(
        CallSignature::function("all", logical1).arg("x", TypeMask::LOGICAL),
        all,
    );
    table.builtin(
        CallSignature::function("any", logical1).arg("x", TypeMask::LOGICAL),
        any,
    );
    table.builtin(
        CallSignature::function("cat", TypeMask::NULL)
            .arg("x", TypeMask::ANY)
            .optional("sep", string1, DefaultValue::String(" ")),
        cat,
    );
    table.builtin(
        CallSignature::function("identical", logical1)
            .arg("x", TypeMask::ANY)
            .arg("y", TypeMask::ANY),
        identical,
    );
    table.builtin(
        CallSignature::function("ifelse", TypeMask::ANY)
            .arg("test", TypeMask::LOGICAL)
            .arg("trueValues", TypeMask::ANY)
            .arg("falseValues", TypeMask::ANY),
        ifelse,
    );
    table.builtin(
        CallSignature::function("match", TypeMask::INT)
            .arg("x", TypeMask::ANY)
            .arg("table", TypeMask::ANY),
        match_,
    );
    table.builtin(
        CallSignature::function("nchar", TypeMask::INT).arg("x", TypeMask::STRING),
        nchar,
    );
    table.builtin(
        CallSignature::function("paste", string1)
            .arg("x", TypeMask::ANY)
            .optional("sep", string1, DefaultValue::String(" ")),
        paste,
    );
    table.builtin(
        CallSignature::function("print", TypeMask::NULL).arg("x", TypeMask::ANY),
        print,
    );
    table.builtin(
        CallSignature::function("rev", TypeMask::ANY).arg("x", TypeMask::ANY),
        rev,
    );
    table.builtin(
        CallSignature::function("size", TypeMask::INT.singleton()).arg("x", TypeMask::ANY),
        size,
    );
    table.builtin(
        CallSignature::function("sort", TypeMask::ANY_BASE)
            .arg("x", TypeMask::ANY_BASE)
            .optional("ascending", logical1, DefaultValue::Logical(true)),
        sort,
    );
    table.builtin(
        CallSignature::function("sortBy", TypeMask::OBJECT)
            .arg("x", TypeMask::OBJECT)
            .arg("property", string1)
            .optional("ascending", logical1, DefaultValue::Logical(true)),
        sort_by,
    );
    table.builtin(
        CallSignature::function("str", TypeMask::NULL).arg("x", TypeMask::ANY),
        str_,
    );
    table.builtin(
        CallSignature::function("strsplit", TypeMask::STRING)
            .arg("x", string1)
            .optional("sep", string1, DefaultValue::String(" ")),
        strsplit,
    );
    table.builtin(
        CallSignature::function("substr", TypeMask::STRING)
            .arg("x", TypeMask::STRING)
            .arg("first", TypeMask::INT)
            .optional("last", TypeMask::INT.union(TypeMask::NULL), DefaultValue::Null),
        substr,
    );
    table.builtin(
        CallSignature::function("unique", TypeMask::ANY).arg("x", TypeMask::ANY),
        unique,
    );
    table.builtin(
        CallSignature::function("which", TypeMask::INT).arg("x", TypeMask::LOGICAL),
        which,
    );
    table.builtin(
        CallSignature::function("whichMax", nullable_index).arg("x", TypeMask::ANY_BASE),
        which_max,
    );
    table.builtin(
        CallSignature::function("whichMin", nullable_index).arg("x", TypeMask::ANY_BASE),
        which_min,
    );
}

fn logicals(x: &Value) -> &[bool] {
    x.as_logicals().unwrap_or_default()
}

fn index_value(i: usize) -> Value {
    Value::int(i64::try_from(i).unwrap_or(i64::MAX))
}

/// `T` for an empty vector.
fn all(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::logical(logicals(&args[0]).iter().all(|&v| v)))
}

fn any(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::logical(logicals(&args[0]).iter().any(|&v| v)))
}

fn joined(interp: &Interpreter, x: &Value, sep: &str) -> Result<String, EvalError> {
    let opts = interp.display_options();
    let parts = (0..x.count())
        .map(|i| x.element_text(i, opts))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(sep))
}

/// Element text joined by `sep`, without a trailing newline.
fn cat(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let text = joined(interp, &args[0], &args[1].string_at(0)?)?;
    interp.output().write(&text);
    Ok(Value::invisible_null())
}

fn identical(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::logical(args[0] == args[1]))
}

/// Pick from `trueValues` or `falseValues` by `test`. A singleton branch is
/// recycled across the whole test.
fn ifelse(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (test, yes, no) = (&args[0], &args[1], &args[2]);
    let n = test.count();
    let fits = |v: &Value| v.count() == n || v.count() == 1;
    if !fits(yes) || !fits(no) {
        return Err(invalid("ifelse", "requires arguments of equal length"));
    }
    if yes.value_type() != no.value_type() {
        return Err(invalid("ifelse", "requires arguments 2 and 3 to be the same type"));
    }

    let mut result = yes.new_matching_type();
    for (i, &pick) in logicals(test).iter().enumerate() {
        let source = if pick { yes } else { no };
        let index = if source.count() == 1 { 0 } else { i };
        result.push_value_from_index_of(index, source)?;
    }
    Ok(result)
}

/// Position of each element of `x` in `table`, or -1.
fn match_(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (x, table) = (&args[0], &args[1]);
    if x.value_type() != table.value_type() {
        return Err(invalid("match", "requires arguments x and table to be the same type"));
    }
    let positions = match (x.as_ints(), table.as_ints(), x.as_strings(), table.as_strings()) {
        (Some(x), Some(table), ..) => hashed_positions(x, table),
        (.., Some(x), Some(table)) => hashed_positions(x, table),
        _ => (0..x.count())
            .map(|i| {
                (0..table.count())
                    .find(|&j| x.element_eq(i, table, j))
                    .map_or(-1, position)
            })
            .collect(),
    };
    Ok(Value::int_vec(positions))
}

/// First position in `table` of each element of `x`, or -1.
fn hashed_positions<T: Hash + Eq>(x: &[T], table: &[T]) -> Vec<i64> {
    let mut first = FxHashMap::default();
    for (j, item) in table.iter().enumerate() {
        first.entry(item).or_insert_with(|| position(j));
    }
    x.iter().map(|item| first.get(item).copied().unwrap_or(-1)).collect()
}

fn position(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

fn nchar(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let lengths = args[0]
        .as_strings()
        .unwrap_or_default()
        .iter()
        .map(|s| i64::try_from(s.chars().count()).unwrap_or(i64::MAX))
        .collect();
    Ok(Value::int_vec(lengths))
}

fn paste(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let text = joined(interp, &args[0], &args[1].string_at(0)?)?;
    Ok(Value::string(text))
}

fn print(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let text = args[0].print_form(interp.display_options());
    interp.output().write_line(&text);
    Ok(Value::invisible_null())
}

fn rev(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let indices: Vec<usize> = (0..args[0].count()).rev().collect();
    args[0].subset(&indices)
}

fn size(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(index_value(args[0].count()))
}

/// Stable order of `keys`, ascending or descending.
fn sorted_indices(keys: &Value, ascending: bool) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..keys.count()).collect();
    indices.sort_by(|&a, &b| {
        let order = keys.element_cmp(a, b);
        if ascending {
            order
        } else {
            order.reverse()
        }
    });
    indices
}

fn sort(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    if x.is_null() {
        return Ok(Value::null());
    }
    x.subset(&sorted_indices(x, args[1].logical_at(0)?))
}

/// Objects ordered by the value of one of their properties.
fn sort_by(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    if x.count() < 2 {
        return Ok(x.clone());
    }
    let property = args[1].string_at(0)?;
    let keys = interp.get_property(x, &property)?;
    if keys.count() != x.count() {
        return Err(invalid(
            "sortBy",
            format!("requires property {property} to have one value per element"),
        ));
    }
    x.subset(&sorted_indices(&keys, args[2].logical_at(0)?))
}

/// One-line structure summary: `(integer) 1 2 ... (10 values)`.
fn str_(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    let opts = interp.display_options();
    let body = if x.count() <= 2 {
        x.print_form(opts)
    } else {
        format!("{} ... ({} values)", x.subset(&[0, 1])?.print_form(opts), x.count())
    };
    let line = format!("({}) {body}", x.element_type_name());
    interp.output().write_line(&line);
    Ok(Value::invisible_null())
}

/// Split on `sep`; an empty separator splits into characters.
fn strsplit(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = args[0].string_at(0)?;
    let sep = args[1].string_at(0)?;
    let parts = if sep.is_empty() {
        x.chars().map(String::from).collect()
    } else {
        x.split(sep.as_str()).map(String::from).collect()
    };
    Ok(Value::string_vec(parts))
}

/// Character range `[first, last]` of each string, clamped to its bounds.
fn substr(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (x, first, last) = (&args[0], &args[1], &args[2]);
    let n = x.count();
    if first.count() != 1 && first.count() != n {
        return Err(invalid("substr", "requires the size of first to be 1, or equal to the size of x"));
    }
    if !last.is_null() && last.count() != 1 && last.count() != n {
        return Err(invalid("substr", "requires the size of last to be 1, or equal to the size of x"));
    }

    let mut parts = Vec::with_capacity(n);
    for (i, s) in x.as_strings().unwrap_or_default().iter().enumerate() {
        let chars: Vec<char> = s.chars().collect();
        let len = i64::try_from(chars.len()).unwrap_or(i64::MAX);
        let start = first.int_at(if first.count() == 1 { 0 } else { i })?.max(0);
        let end = if last.is_null() {
            len - 1
        } else {
            last.int_at(if last.count() == 1 { 0 } else { i })?.min(len - 1)
        };
        let piece = match (usize::try_from(start), usize::try_from(end)) {
            (Ok(a), Ok(b)) if a <= b => chars[a..=b].iter().collect(),
            _ => String::new(),
        };
        parts.push(piece);
    }
    Ok(Value::string_vec(parts))
}

/// Distinct elements in order of first occurrence.
fn unique(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let x = &args[0];
    let kept = if let Some(ints) = x.as_ints() {
        first_occurrences(ints)
    } else if let Some(strings) = x.as_strings() {
        first_occurrences(strings)
    } else {
        let mut kept: Vec<usize> = Vec::new();
        for i in 0..x.count() {
            if !kept.iter().any(|&k| x.element_eq(k, x, i)) {
                kept.push(i);
            }
        }
        kept
    };
    x.subset(&kept)
}

fn first_occurrences<T: Hash + Eq>(items: &[T]) -> Vec<usize> {
    let mut seen = FxHashSet::default();
    items
        .iter()
        .enumerate()
        .filter(|&(_, item)| seen.insert(item))
        .map(|(i, _)| i)
        .collect()
}

fn which(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let positions = logicals(&args[0])
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v)
        .map(|(i, _)| i64::try_from(i).unwrap_or(i64::MAX))
        .collect();
    Ok(Value::int_vec(positions))
}

fn which_extreme(x: &Value, wanted: Ordering) -> Value {
    extreme_index(x, wanted).map_or_else(Value::null, index_value)
}

fn which_max(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(which_extreme(&args[0], Ordering::Greater))
}

fn which_min(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(which_extreme(&args[0], Ordering::Less))
}
