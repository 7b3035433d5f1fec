use std::num::IntErrorKind;
use std::str::FromStr;

use crate::pick::ConvertErrorKind;
use crate::pick::convert::error::{Cast, Fault};

/// Significant digits used when rendering floats as text.
pub(crate) const FLOAT_TEXT_PRECISION: usize = 5;

/// Parse one of the canonical boolean tokens.
pub(crate) fn parse_bool(text: &str) -> Cast<bool> {
	match text {
		"1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
		"0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
		_ => Err(Fault::fatal(ConvertErrorKind::InvalidSyntax(format!("parsing {text:?} as bool")))),
	}
}

/// Float widths parsed from text.
pub(crate) trait Float: Copy + Default + FromStr {
	fn is_infinite(self) -> bool;
}

impl Float for f32 {
	fn is_infinite(self) -> bool {
		f32::is_infinite(self)
	}
}

impl Float for f64 {
	fn is_infinite(self) -> bool {
		f64::is_infinite(self)
	}
}

/// Parse base-10 float text at the target width.
///
/// A finite literal that rounds to infinity is an overflow carrying the infinity.
pub(crate) fn parse_float<F: Float>(text: &str) -> Cast<F> {
	match text.parse::<F>() {
		Ok(value) if value.is_infinite() && !spells_infinity(text) => Err(Fault::lossy(ConvertErrorKind::Overflow, value)),
		Ok(value) => Ok(value),
		Err(_) => Err(Fault::fatal(ConvertErrorKind::InvalidSyntax(format!("parsing {text:?} as float")))),
	}
}

fn spells_infinity(text: &str) -> bool {
	text.trim_start_matches(['+', '-']).to_ascii_lowercase().starts_with("inf")
}

/// Whether integer text should go through the float parser first.
pub(crate) fn looks_fractional(text: &str) -> bool {
	text.contains('.') || text.contains('e')
}

/// Parse signed decimal text; out-of-range text clamps and reports overflow.
pub(crate) fn parse_i64(text: &str) -> Cast<i64> {
	text.parse::<i64>().map_err(|err| match err.kind() {
		IntErrorKind::PosOverflow => Fault::lossy(ConvertErrorKind::Overflow, i64::MAX),
		IntErrorKind::NegOverflow => Fault::lossy(ConvertErrorKind::Overflow, i64::MIN),
		_ => Fault::fatal(ConvertErrorKind::InvalidSyntax(format!("parsing {text:?}: {err}"))),
	})
}

/// Parse unsigned decimal text; out-of-range text clamps and reports overflow.
pub(crate) fn parse_u64(text: &str) -> Cast<u64> {
	text.parse::<u64>().map_err(|err| match err.kind() {
		IntErrorKind::PosOverflow => Fault::lossy(ConvertErrorKind::Overflow, u64::MAX),
		_ => Fault::fatal(ConvertErrorKind::InvalidSyntax(format!("parsing {text:?}: {err}"))),
	})
}

/// Render a float like `%G`: `precision` significant digits, trailing zeros
/// dropped, exponent form outside `[1e-4, 1e precision)`.
pub(crate) fn format_float(value: f64, precision: usize) -> String {
	if value.is_nan() {
		return "NaN".to_owned();
	}
	if value.is_infinite() {
		return if value > 0.0 { "+Inf".to_owned() } else { "-Inf".to_owned() };
	}
	if value == 0.0 {
		return if value.is_sign_negative() { "-0".to_owned() } else { "0".to_owned() };
	}

	let precision = precision.max(1);
	let scientific = format!("{:.*e}", precision - 1, value);
	let Some((mantissa, exponent)) = scientific.split_once('e') else {
		return scientific;
	};
	let exponent: i32 = exponent.parse().unwrap_or(0);

	if exponent < -4 || exponent >= precision as i32 {
		let mantissa = trim_fraction(mantissa);
		let sign = if exponent < 0 { '-' } else { '+' };
		return format!("{mantissa}E{sign}{:02}", exponent.unsigned_abs());
	}

	let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
	trim_fraction(&format!("{value:.decimals$}")).to_owned()
}

fn trim_fraction(text: &str) -> &str {
	if !text.contains('.') {
		return text;
	}
	text.trim_end_matches('0').trim_end_matches('.')
}
