//! Text rendering of floats and display options.

/// Options controlling how values render as text.
///
/// Affects display only; stored numbers are never rounded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Significant digits for float output.
    pub float_precision: usize,
}

impl DisplayOptions {
    pub const DEFAULT_PRECISION: usize = 6;
    pub const MAX_PRECISION: usize = 17;

    /// Options with `precision` significant digits, clamped to `1..=17`.
    pub fn with_float_precision(precision: usize) -> Self {
        DisplayOptions {
            float_precision: precision.clamp(1, Self::MAX_PRECISION),
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            float_precision: Self::DEFAULT_PRECISION,
        }
    }
}

/// Render a float with `precision` significant digits in `%g` style.
///
/// Trailing zeros are dropped; exponents below -4 or at/above the
/// precision switch to scientific notation (`1e+06`). Non-finite values
/// render as `INF`, `-INF` and `NAN`.
pub fn format_float(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.clamp(1, DisplayOptions::MAX_PRECISION);
    let digits = precision.saturating_sub(1);
    let scientific = format!("{value:.digits$e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let max_exponent = i32::try_from(precision).unwrap_or(i32::MAX);

    if exponent < -4 || exponent >= max_exponent {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(max_exponent.saturating_sub(1).saturating_sub(exponent)).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
