//! Native implementations of the built-in functions.
//!
//! Each submodule registers its functions with full signatures. Bodies run
//! only after the dispatch engine has checked their arguments, so they index
//! `args` directly: every declared parameter is present (defaults filled in)
//! and already has an accepted type and cardinality.
//!
//! Script-level failures go through [`invalid`], which renders as
//! `function seq() requires by != 0`.

mod coerce;
mod construct;
mod files;
mod inspect;
mod math;
mod random;
mod stats;
mod system;


use rill_value::errors::invalid_argument;
use rill_value::{EvalError, Value};

use crate::function_table::FunctionTable;

/// Register every built-in into `table`.
pub(crate) fn register_all(table: &mut FunctionTable) {
    math::register(table);
    stats::register(table);
    construct::register(table);
    random::register(table);
    inspect::register(table);
    coerce::register(table);
    system::register(table);
    files::register(table);
}

/// A semantically invalid argument to the built-in `name`.
#[cold]
pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> EvalError {
    invalid_argument(&format!("function {name}()"), reason)
}

/// A non-negative count read from a singleton integer argument.
pub(crate) fn count_arg(name: &str, param: &str, value: &Value) -> Result<usize, EvalError> {
    let count = value.int_at(0)?;
    usize::try_from(count).map_err(|_| {
        invalid(
            name,
            format!("requires {param} to be greater than or equal to 0 ({count} supplied)"),
        )
    })
}

/// An empty vector with room for `len` elements.
///
/// Lengths the allocator cannot satisfy are script errors rather than aborts.
pub(crate) fn with_room<T>(name: &str, len: usize) -> Result<Vec<T>, EvalError> {
    let mut values = Vec::new();
    values.try_reserve_exact(len).map_err(|_| too_large(name, len))?;
    Ok(values)
}

/// `len` copies of `fill`.
pub(crate) fn filled<T: Clone>(name: &str, len: usize, fill: T) -> Result<Vec<T>, EvalError> {
    let mut values = with_room(name, len)?;
    values.resize(len, fill);
    Ok(values)
}

#[cold]
fn too_large(name: &str, len: usize) -> EvalError {
    invalid(name, format!("cannot build a result of length {len} (too large)"))
}

/// Require `value` to have one element or exactly `n`.
pub(crate) fn check_recycled(name: &str, param: &str, value: &Value, n: usize) -> Result<(), EvalError> {
    let count = value.count();
    if count == 1 || count == n {
        Ok(())
    } else {
        Err(invalid(name, format!("requires {param} to be of length 1 or n")))
    }
}

/// Position in a length-1-or-n parameter for draw `i`.
#[inline]
pub(crate) fn recycled(value: &Value, i: usize) -> usize {
    if value.count() == 1 {
        0
    } else {
        i
    }
}
