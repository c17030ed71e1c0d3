//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use serde::Serialize;
use serde_json::json;
use std::num::FpCategory;

/// Significant digits of the default `ostream` float formatting.
const GENERAL_PRECISION: i32 = 6;

/// Result of a one-shot `get`, as printed with `--json`.
#[derive(Debug, Serialize)]
pub struct ReadingSummary<'a> {
    pub variable: &'a str,
    pub endpoint: String,
    pub value: f64,
}

/// Format a value the way a default-configured C++ `ostream` does (`%g`
/// with six significant digits): `250.5`, `123.457`, `1e+06`, `0.0001`.
pub fn format_general(value: f64) -> String {
    match value.classify() {
        FpCategory::Nan => return "nan".to_string(),
        FpCategory::Infinite if value.is_sign_negative() => return "-inf".to_string(),
        FpCategory::Infinite => return "inf".to_string(),
        FpCategory::Zero if value.is_sign_negative() => return "-0".to_string(),
        FpCategory::Zero => return "0".to_string(),
        FpCategory::Normal | FpCategory::Subnormal => {}
    }

    // The exponent after rounding to the target precision decides the style.
    let scientific = format!("{:.*e}", 5, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    if exponent < -4 || exponent >= GENERAL_PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            strip_trailing_zeros(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(GENERAL_PRECISION - 1 - exponent).unwrap_or(0);
        strip_trailing_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn strip_trailing_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Print a single reading in the requested format
pub fn print_reading(summary: &ReadingSummary<'_>, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "success": true,
                "reading": summary,
            }))?
        );
    } else {
        println!("{}: {}", summary.variable, format_general(summary.value));
    }
    Ok(())
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}
