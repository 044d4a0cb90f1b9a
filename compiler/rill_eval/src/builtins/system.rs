//! System and session built-ins: clock, listings, symbol removal, `stop`.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rill_value::errors::stop_called;
use rill_value::{CallContext, CallSignature, DefaultValue, EvalResult, TypeMask, Value};

use crate::environment::Mutability;
use crate::function_table::FunctionTable;
use crate::test_element::{TestElement, TEST_ELEMENT_CLASS};
use crate::Interpreter;

const LICENSE: &str = "\
Rill is dual-licensed under the MIT license and the Apache License,
Version 2.0, at your option. It is distributed in the hope that it will
be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.";

pub(super) fn register(table: &mut FunctionTable) {
    let string1 = TypeMask::STRING.singleton();
    let nullable_string1 = TypeMask::STRING.union(TypeMask::NULL).singleton();

    table.builtin(
        CallSignature::function("_Test", TypeMask::OBJECT.singleton())
            .arg("yolk", TypeMask::INT.singleton())
            .returns_class(&TEST_ELEMENT_CLASS),
        test_element,
    );
    table.builtin(CallSignature::function("date", string1), date);
    table.builtin(
        CallSignature::function("function", TypeMask::NULL)
            .optional("functionName", nullable_string1, DefaultValue::Null),
        function,
    );
    table.builtin(CallSignature::function("license", TypeMask::NULL), license);
    table.builtin(CallSignature::function("ls", TypeMask::NULL), ls);
    table.builtin(
        CallSignature::function("rm", TypeMask::NULL).optional(
            "variableNames",
            TypeMask::STRING.union(TypeMask::NULL),
            DefaultValue::Null,
        ),
        rm,
    );
    table.builtin(
        CallSignature::function("stop", TypeMask::NULL)
            .optional("message", nullable_string1, DefaultValue::Null),
        stop,
    );
    table.builtin(CallSignature::function("time", string1), time);
    table.builtin(CallSignature::function("version", TypeMask::NULL), version);
}

/// Civil UTC date and time of day, from seconds since the epoch.
struct Clock {
    year: i64,
    month: u32,
    day: u32,
    seconds_of_day: i64,
}

impl Clock {
    fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX));
        Self::from_unix(secs)
    }

    /// Days-to-civil conversion over 400-year eras.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "month and day are bounded by construction"
    )]
    fn from_unix(secs: i64) -> Self {
        let days = secs.div_euclid(86_400);
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
        let year = yoe + era * 400 + i64::from(month <= 2);
        Clock {
            year,
            month,
            day,
            seconds_of_day: secs.rem_euclid(86_400),
        }
    }

    fn date(&self) -> String {
        format!("{:02}-{:02}-{}", self.day, self.month, self.year)
    }

    fn time(&self) -> String {
        let s = self.seconds_of_day;
        format!("{:02}:{:02}:{:02}", s / 3600, s / 60 % 60, s % 60)
    }
}

/// Today as `dd-mm-yyyy`, UTC.
fn date(_: &mut Interpreter, _: &[Value]) -> EvalResult {
    Ok(Value::string(Clock::now().date()))
}

/// Now as `hh:mm:ss`, UTC.
fn time(_: &mut Interpreter, _: &[Value]) -> EvalResult {
    Ok(Value::string(Clock::now().time()))
}

/// List signatures of every function, or of one named function.
///
/// Names starting with `_` are internal and only shown when asked for.
fn function(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let wanted = if args[0].is_null() {
        None
    } else {
        Some(args[0].string_at(0)?)
    };
    let mut lines = Vec::new();
    for signature in interp.function_signatures() {
        let shown = match &wanted {
            Some(name) => signature.name == name.as_str(),
            None => !signature.name.starts_with('_'),
        };
        if shown {
            lines.push(signature.to_string());
        }
    }
    if lines.is_empty() {
        if let Some(name) = wanted {
            lines.push(format!("No function signature found for \"{name}\"."));
        }
    }
    for line in lines {
        interp.output().write_line(&line);
    }
    Ok(Value::invisible_null())
}

fn license(interp: &mut Interpreter, _: &[Value]) -> EvalResult {
    interp.output().write_line(LICENSE);
    Ok(Value::invisible_null())
}

/// Every visible binding; constants print with `=>`.
fn ls(interp: &mut Interpreter, _: &[Value]) -> EvalResult {
    let opts = interp.display_options();
    for (name, value, mutability) in interp.env().visible_bindings() {
        let arrow = if mutability.is_constant() { "=>" } else { "->" };
        let line = format!("{name} {arrow} {}", value.print_form(opts));
        interp.output().write_line(&line);
    }
    Ok(Value::invisible_null())
}

/// Remove the named variables, or every variable when given NULL.
fn rm(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let names: Vec<String> = if args[0].is_null() {
        interp
            .env()
            .visible_bindings()
            .into_iter()
            .filter(|(_, _, mutability)| *mutability == Mutability::Variable)
            .map(|(name, _, _)| name)
            .collect()
    } else {
        args[0].as_strings().unwrap_or_default().to_vec()
    };
    for name in &names {
        interp.env_mut().remove(name)?;
    }
    Ok(Value::invisible_null())
}

/// Abort execution, printing `message` first if given.
fn stop(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    if !args[0].is_null() {
        let message = args[0].string_at(0)?;
        interp.output().write_line(&message);
    }
    Err(stop_called())
}

fn version(interp: &mut Interpreter, _: &[Value]) -> EvalResult {
    let line = format!("Rill version {}", env!("CARGO_PKG_VERSION"));
    interp.output().write_line(&line);
    Ok(Value::invisible_null())
}

fn test_element(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let yolk = args[0].int_at(0)?;
    Ok(Value::object(Arc::new(TestElement::new(yolk))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clock_converts_epoch_seconds() {
        let epoch = Clock::from_unix(0);
        assert_eq!(epoch.date(), "01-01-1970");
        assert_eq!(epoch.time(), "00:00:00");

        // 2024-02-29 13:45:30 UTC
        let leap = Clock::from_unix(1_709_214_330);
        assert_eq!(leap.date(), "29-02-2024");
        assert_eq!(leap.time(), "13:45:30");
    }
}
