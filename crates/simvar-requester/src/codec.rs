//! Plain-text wire format of the SimVar UDP bridge.
//!
//! Requests are the raw UTF-8 bytes of the variable name. Replies are the
//! decimal text of the value. Neither side carries framing, length prefixes
//! or terminators.
//!
//! Replies are read the way a C `strtod` reads a NUL-terminated buffer:
//! leading whitespace is skipped and the longest numeric prefix wins, so
//! `"250.5\n"` and `"250.5 kts"` both decode to `250.5`. Hexadecimal
//! floats (`0x1A`, `0x1.8p3`) are accepted, and values that overflow or
//! underflow the normal `f64` range are rejected.

use crate::error::RequestError;
use std::num::FpCategory;

/// Size of the receive buffer, including one byte reserved for the terminator.
pub const RECEIVE_BUFFER_LEN: usize = 1024;

/// Largest reply payload considered, in bytes. Anything past it is dropped.
pub const MAX_RESPONSE_LEN: usize = RECEIVE_BUFFER_LEN - 1;

const SPECIAL_LITERALS: [&[u8]; 3] = [b"infinity", b"inf", b"nan"];

/// Encode a variable name as a request datagram.
pub fn encode_request(variable_name: &str) -> &[u8] {
    variable_name.as_bytes()
}

/// The part of a reply that is treated as text: capped at
/// [`MAX_RESPONSE_LEN`] bytes and cut at the first NUL.
pub fn response_text(payload: &[u8]) -> &[u8] {
    let capped = payload.get(..MAX_RESPONSE_LEN).unwrap_or(payload);
    capped.split(|&b| b == 0).next().unwrap_or(capped)
}

/// Decode a reply datagram into a value.
pub fn decode_response(payload: &[u8]) -> Result<f64, RequestError> {
    let text = response_text(payload);
    let trimmed = text.trim_ascii_start();
    let prefix = trimmed.get(..numeric_prefix_len(trimmed)).unwrap_or_default();

    let value = std::str::from_utf8(prefix)
        .ok()
        .filter(|prefix| !prefix.is_empty())
        .and_then(parse_prefix);

    value.ok_or_else(|| RequestError::parse(String::from_utf8_lossy(text)))
}

/// Parse a numeric prefix, rejecting results outside the normal `f64` range.
fn parse_prefix(prefix: &str) -> Option<f64> {
    let unsigned = prefix.trim_start_matches(['+', '-']);
    let lowered = unsigned.to_ascii_lowercase();
    if lowered.starts_with("inf") || lowered.starts_with("nan") {
        return prefix.parse::<f64>().ok();
    }

    let (value, significant) = match lowered.strip_prefix("0x") {
        Some(hex) => {
            let magnitude = parse_hex(hex)?;
            let mantissa = hex.split('p').next().unwrap_or(hex);
            let value = if prefix.starts_with('-') { -magnitude } else { magnitude };
            (value, mantissa.bytes().any(|b| b.is_ascii_hexdigit() && b != b'0'))
        }
        None => {
            let mantissa = lowered.split('e').next().unwrap_or(&lowered);
            (
                prefix.parse::<f64>().ok()?,
                mantissa.bytes().any(|b| matches!(b, b'1'..=b'9')),
            )
        }
    };

    match value.classify() {
        FpCategory::Infinite | FpCategory::Subnormal => None,
        FpCategory::Zero if significant => None,
        FpCategory::Zero | FpCategory::Normal | FpCategory::Nan => Some(value),
    }
}

/// Value of a hexadecimal float body (the part after `0x`): hex digits with
/// an optional fraction and an optional binary exponent `p[+-]digits`.
fn parse_hex(body: &str) -> Option<f64> {
    let (mantissa, exponent) = match body.split_once('p') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().ok()?),
        None => (body, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mut value = 0.0_f64;
    for digit in int_part.chars() {
        value = value * 16.0 + f64::from(digit.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for digit in frac_part.chars() {
        value += f64::from(digit.to_digit(16)?) * scale;
        scale /= 16.0;
    }

    if value.classify() == FpCategory::Zero {
        return Some(value);
    }
    Some(value * 2.0_f64.powi(exponent))
}

/// Length of the longest prefix of `bytes` that reads as a decimal or
/// hexadecimal number, `inf`, `infinity` or `nan`. Zero when there is none.
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let sign_len = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let unsigned = bytes.get(sign_len..).unwrap_or_default();

    if let Some(literal) = SPECIAL_LITERALS
        .iter()
        .find(|literal| starts_with_ignore_ascii_case(unsigned, literal))
    {
        return sign_len + literal.len();
    }

    if let Some(len) = hex_prefix_len(unsigned) {
        return sign_len + len;
    }

    let int_digits = count_digits(unsigned);
    let mut len = sign_len + int_digits;

    let mut frac_digits = 0;
    if bytes.get(len) == Some(&b'.') {
        frac_digits = count_digits(bytes.get(len + 1..).unwrap_or_default());
        if int_digits + frac_digits > 0 {
            len += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let mut exp_start = len + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_digits = count_digits(bytes.get(exp_start..).unwrap_or_default());
        if exp_digits > 0 {
            len = exp_start + exp_digits;
        }
    }

    len
}

/// Length of an unsigned hexadecimal float prefix (`0x1A`, `0x.8`,
/// `0x1.8p-3`). `None` unless at least one hex digit follows `0x`.
fn hex_prefix_len(bytes: &[u8]) -> Option<usize> {
    if !starts_with_ignore_ascii_case(bytes, b"0x") {
        return None;
    }

    let int_digits = count_hex_digits(bytes.get(2..).unwrap_or_default());
    let mut len = 2 + int_digits;

    let mut frac_digits = 0;
    if bytes.get(len) == Some(&b'.') {
        frac_digits = count_hex_digits(bytes.get(len + 1..).unwrap_or_default());
        if int_digits + frac_digits > 0 {
            len += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(len), Some(b'p' | b'P')) {
        let mut exp_start = len + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_digits = count_digits(bytes.get(exp_start..).unwrap_or_default());
        if exp_digits > 0 {
            len = exp_start + exp_digits;
        }
    }

    Some(len)
}

fn count_hex_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_hexdigit()).count()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn starts_with_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .get(..needle.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestErrorKind;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn assert_decodes(payload: &[u8], expected: f64) -> TestResult {
        let value = decode_response(payload)?;
        assert!(
            (value - expected).abs() < 1e-9,
            "{:?} decoded to {value}, expected {expected}",
            String::from_utf8_lossy(payload)
        );
        Ok(())
    }

    fn assert_rejects(payload: &[u8]) {
        let result = decode_response(payload);
        assert!(
            matches!(&result, Err(e) if e.kind() == RequestErrorKind::Parse),
            "{:?} should be rejected, got {result:?}",
            String::from_utf8_lossy(payload)
        );
    }

    #[test]
    fn test_request_is_raw_name_bytes() {
        assert_eq!(encode_request("AIRSPEED_INDICATED"), b"AIRSPEED_INDICATED");
        assert_eq!(encode_request(""), b"");
    }

    #[test]
    fn test_plain_decimals() -> TestResult {
        assert_decodes(b"250.5", 250.5)?;
        assert_decodes(b"0", 0.0)?;
        assert_decodes(b"-3.2", -3.2)?;
        assert_decodes(b"+7", 7.0)?;
        assert_decodes(b".5", 0.5)?;
        assert_decodes(b"5.", 5.0)?;
        assert_decodes(b"1.5e3", 1500.0)?;
        assert_decodes(b"2E-2", 0.02)?;
        Ok(())
    }

    #[test]
    fn test_whitespace_and_trailing_text() -> TestResult {
        assert_decodes(b"  \t250.5", 250.5)?;
        assert_decodes(b"250.5\n", 250.5)?;
        assert_decodes(b"250.5 knots", 250.5)?;
        assert_decodes(b"12e", 12.0)?;
        assert_decodes(b"12e+", 12.0)?;
        assert_decodes(b"1.0.0", 1.0)?;
        Ok(())
    }

    #[test]
    fn test_nul_terminates_payload() -> TestResult {
        assert_decodes(b"42\0garbage", 42.0)?;
        assert_rejects(b"\x0042");
        Ok(())
    }

    #[test]
    fn test_special_literals() -> TestResult {
        assert!(decode_response(b"inf")?.is_infinite());
        assert!(decode_response(b"-Infinity")?.is_sign_negative());
        assert!(decode_response(b"NaN")?.is_nan());
        Ok(())
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert_rejects(b"");
        assert_rejects(b"NOT_A_NUMBER");
        assert_rejects(b"-");
        assert_rejects(b".");
        assert_rejects(b"e5");
        assert_rejects(b"   ");
        assert_rejects(&[0xFF, 0xFE, 0xFD]);
    }

    #[test]
    fn test_overflow_rejected() -> TestResult {
        assert_rejects(b"1e999");
        assert_rejects(b"-1e999");
        assert_rejects(b"1e-400");
        assert_rejects(b"-2.5e-400");
        assert_rejects(b"4e-320");
        assert_rejects(b"0x1p-1080");
        assert_rejects(b"0x1p2000");

        // Zero written with a tiny exponent is still zero, not out of range.
        assert_decodes(b"0e-400", 0.0)?;
        assert_decodes(b"0.000e-999", 0.0)?;
        Ok(())
    }

    #[test]
    fn test_hex_floats() -> TestResult {
        assert_decodes(b"0x1A", 26.0)?;
        assert_decodes(b"0X1a", 26.0)?;
        assert_decodes(b"-0x1.8p1", -3.0)?;
        assert_decodes(b"0x.8", 0.5)?;
        assert_decodes(b"0x10p-4", 1.0)?;
        assert_decodes(b"0x1Ag", 26.0)?;
        assert_decodes(b"0x1p", 1.0)?;

        // No hex digit after the marker: only the leading zero is numeric.
        assert_decodes(b"0x", 0.0)?;
        assert_decodes(b"0xZZ", 0.0)?;
        Ok(())
    }

    #[test]
    fn test_payload_capped_at_max_len() -> TestResult {
        let mut payload = b"250.5".to_vec();
        payload.resize(MAX_RESPONSE_LEN - 1, b' ');
        payload.extend_from_slice(b"1e9");
        assert_eq!(response_text(&payload).len(), MAX_RESPONSE_LEN);
        assert_decodes(&payload, 250.5)?;

        // A run of digits long enough to overflow is rejected, not truncated.
        assert_rejects(&[b'9'; MAX_RESPONSE_LEN + 10]);
        Ok(())
    }

    #[test]
    fn test_parse_error_carries_payload_text() {
        let err = decode_response(b"NOT_A_NUMBER\0hidden");
        assert!(
            matches!(&err, Err(RequestError::Parse { payload }) if payload == "NOT_A_NUMBER"),
            "unexpected {err:?}"
        );
    }
}
