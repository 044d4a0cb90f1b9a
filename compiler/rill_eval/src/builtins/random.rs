//! Sampling, random distributions and the generator seed.
//!
//! Distribution functions take a draw count `n` and parameters that are
//! either a single value or one value per draw.

use rill_value::{CallSignature, DefaultValue, EvalError, EvalResult, TypeMask, Value};

use super::{check_recycled, count_arg, invalid, recycled, with_room};
use crate::function_table::FunctionTable;
use crate::Interpreter;

pub(super) fn register(table: &mut FunctionTable) {
    let int1 = TypeMask::INT.singleton();

    table.builtin(
        CallSignature::function("getSeed", int1),
        get_seed,
    );
    table.builtin(
        CallSignature::function("rbinom", TypeMask::INT)
            .arg("n", int1)
            .arg("size", TypeMask::INT)
            .arg("prob", TypeMask::FLOAT),
        rbinom,
    );
    table.builtin(
        CallSignature::function("rexp", TypeMask::FLOAT)
            .arg("n", int1)
            .optional("rate", TypeMask::NUMERIC, DefaultValue::Float(1.0)),
        rexp,
    );
    table.builtin(
        CallSignature::function("rnorm", TypeMask::FLOAT)
            .arg("n", int1)
            .optional("mean", TypeMask::NUMERIC, DefaultValue::Float(0.0))
            .optional("sd", TypeMask::NUMERIC, DefaultValue::Float(1.0)),
        rnorm,
    );
    table.builtin(
        CallSignature::function("rpois", TypeMask::INT)
            .arg("n", int1)
            .arg("lambda", TypeMask::NUMERIC),
        rpois,
    );
    table.builtin(
        CallSignature::function("runif", TypeMask::FLOAT)
            .arg("n", int1)
            .optional("min", TypeMask::NUMERIC, DefaultValue::Float(0.0))
            .optional("max", TypeMask::NUMERIC, DefaultValue::Float(1.0)),
        runif,
    );
    table.builtin(
        CallSignature::function("sample", TypeMask::ANY)
            .arg("x", TypeMask::ANY)
            .arg("size", int1)
            .optional("replace", TypeMask::LOGICAL.singleton(), DefaultValue::Logical(false))
            .optional("weights", TypeMask::NUMERIC.union(TypeMask::NULL), DefaultValue::Null),
        sample,
    );
    table.builtin(
        CallSignature::function("setSeed", TypeMask::NULL).arg("seed", int1),
        set_seed,
    );
}

/// Draw `size` elements of `x`, optionally with replacement and weights.
fn sample(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (x, weights) = (&args[0], &args[3]);
    let size = count_arg("sample", "size", &args[1])?;
    let replace = args[2].logical_at(0)?;
    if size == 0 {
        return Ok(x.new_matching_type());
    }

    let n = x.count();
    if n == 0 {
        return Err(invalid("sample", "provided with insufficient elements (0 supplied)"));
    }
    if !replace && size > n {
        return Err(invalid(
            "sample",
            format!("provided with insufficient elements ({n} supplied, {size} needed)"),
        ));
    }

    let rng = interp.rng_mut();
    let mut pool: Vec<usize> = (0..n).collect();
    let mut picks = with_room("sample", size)?;

    if weights.is_null() {
        for _ in 0..size {
            let slot = rng.index_below(pool.len());
            if replace {
                picks.push(pool[slot]);
            } else {
                picks.push(pool.swap_remove(slot));
            }
        }
        return x.subset(&picks);
    }

    if weights.count() != n {
        return Err(invalid("sample", "requires x and weights to be the same length"));
    }
    let mut pool_weights = Vec::with_capacity(n);
    for i in 0..n {
        let w = weights.float_at(i)?;
        if w.is_nan() || w < 0.0 {
            return Err(invalid("sample", "requires all weights to be non-negative"));
        }
        pool_weights.push(w);
    }

    for _ in 0..size {
        let total: f64 = pool_weights.iter().sum();
        if total <= 0.0 {
            return Err(invalid("sample", "encountered weights summing to <= 0"));
        }
        let mut target = rng.uniform() * total;
        let mut slot = pool.len() - 1;
        for (i, w) in pool_weights.iter().enumerate() {
            if target < *w {
                slot = i;
                break;
            }
            target -= w;
        }
        if replace {
            picks.push(pool[slot]);
        } else {
            picks.push(pool.swap_remove(slot));
            pool_weights.swap_remove(slot);
        }
    }
    x.subset(&picks)
}

/// Draw `n` values once every parameter has length 1 or `n`.
fn draws<T>(
    name: &str,
    n_arg: &Value,
    params: &[(&str, &Value)],
    mut draw: impl FnMut(usize) -> Result<T, EvalError>,
) -> Result<Vec<T>, EvalError> {
    let n = count_arg(name, "n", n_arg)?;
    for (param, value) in params {
        check_recycled(name, param, value, n)?;
    }
    let mut values = with_room(name, n)?;
    for i in 0..n {
        values.push(draw(i)?);
    }
    Ok(values)
}

fn rbinom(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (size, prob) = (&args[1], &args[2]);
    let rng = interp.rng_mut();
    let values = draws("rbinom", &args[0], &[("size", size), ("prob", prob)], |i| {
        let trials = size.int_at(recycled(size, i))?;
        let p = prob.float_at(recycled(prob, i))?;
        if trials < 0 {
            return Err(invalid("rbinom", "requires size >= 0"));
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(invalid("rbinom", "requires probability in [0.0, 1.0]"));
        }
        Ok(rng.binomial(trials, p))
    })?;
    Ok(Value::int_vec(values))
}

fn rexp(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let rate = &args[1];
    let rng = interp.rng_mut();
    let values = draws("rexp", &args[0], &[("rate", rate)], |i| {
        let r = rate.float_at(recycled(rate, i))?;
        if r.is_nan() || r <= 0.0 {
            return Err(invalid("rexp", "requires rate > 0.0"));
        }
        Ok(rng.exponential(r))
    })?;
    Ok(Value::float_vec(values))
}

fn rnorm(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (mean, sd) = (&args[1], &args[2]);
    let rng = interp.rng_mut();
    let values = draws("rnorm", &args[0], &[("mean", mean), ("sd", sd)], |i| {
        let mu = mean.float_at(recycled(mean, i))?;
        let sigma = sd.float_at(recycled(sd, i))?;
        if sigma.is_nan() || sigma < 0.0 {
            return Err(invalid("rnorm", "requires sd >= 0.0"));
        }
        Ok(rng.normal(mu, sigma))
    })?;
    Ok(Value::float_vec(values))
}

fn rpois(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let lambda = &args[1];
    let rng = interp.rng_mut();
    let values = draws("rpois", &args[0], &[("lambda", lambda)], |i| {
        let l = lambda.float_at(recycled(lambda, i))?;
        if l.is_nan() || l <= 0.0 {
            return Err(invalid("rpois", "requires lambda > 0.0"));
        }
        Ok(rng.poisson(l))
    })?;
    Ok(Value::int_vec(values))
}

fn runif(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let (min, max) = (&args[1], &args[2]);
    let rng = interp.rng_mut();
    let values = draws("runif", &args[0], &[("min", min), ("max", max)], |i| {
        let lo = min.float_at(recycled(min, i))?;
        let hi = max.float_at(recycled(max, i))?;
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(invalid("runif", "requires min <= max"));
        }
        Ok(lo + (hi - lo) * rng.uniform())
    })?;
    Ok(Value::float_vec(values))
}

fn set_seed(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    #[allow(clippy::cast_sign_loss, reason = "seeds are bit patterns")]
    let seed = args[0].int_at(0)? as u64;
    interp.rng_mut().reseed(seed);
    Ok(Value::invisible_null())
}

fn get_seed(interp: &mut Interpreter, _: &[Value]) -> EvalResult {
    #[allow(clippy::cast_possible_wrap, reason = "seeds are bit patterns")]
    let seed = interp.rng_mut().seed() as i64;
    Ok(Value::int(seed))
}
