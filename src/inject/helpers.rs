//! Numeric literal parsing and mapping-span calculations.
//!
//! These are useful for front ends that host the command surface themselves,
//! or for custom [`PhysicalMemory`](crate::inject::PhysicalMemory) backends
//! that need to reason about the ranges this crate maps.

use crate::inject::{InjectError, types::REGISTER_WIDTH};

/// Parses an unsigned C-style numeric literal.
///
/// The radix is detected from the prefix: `0x`/`0X` is hexadecimal, a leading
/// `0` is octal, anything else is decimal. One leading `+` and one trailing
/// newline are accepted.
///
/// # Errors
/// * [`InjectError::InvalidInput`] - empty token, stray characters, digits
///   outside the radix, or a value that does not fit in `u64`
///
/// # Example
/// ```
/// use reg_inject::inject::helpers::parse_u64;
///
/// assert_eq!(parse_u64("0x3451008c"), Ok(0x3451_008c));
/// assert_eq!(parse_u64("10"), Ok(10));
/// assert_eq!(parse_u64("017"), Ok(0o17));
/// assert!(parse_u64("0xZZ").is_err());
/// ```
pub fn parse_u64(token: &str) -> Result<u64, InjectError> {
    let token = token.strip_suffix('\n').unwrap_or(token);
    let token = token.strip_prefix('+').unwrap_or(token);

    let (digits, radix) = if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        (hex, 16)
    } else if token.len() > 1 && token.starts_with('0') {
        (&token[1..], 8)
    } else {
        (token, 10)
    };

    // from_str_radix accepts its own sign prefix
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(InjectError::InvalidInput);
    }

    u64::from_str_radix(digits, radix).map_err(|_| InjectError::InvalidInput)
}

/// Byte length of the mapping needed to read `count` consecutive registers.
///
/// # Errors
/// * [`InjectError::MapFailed`] - if the length or the end address overflows
///
/// # Example
/// ```
/// use reg_inject::inject::helpers::read_span;
///
/// assert_eq!(read_span(0x1000, 10), Ok(40));
/// assert_eq!(read_span(0x1000, 0), Ok(0));
/// assert!(read_span(0x1000, u64::MAX).is_err());
/// ```
pub fn read_span(reg: u64, count: u64) -> Result<u64, InjectError> {
    let len = count
        .checked_mul(REGISTER_WIDTH)
        .ok_or(InjectError::MapFailed)?;
    reg.checked_add(len).ok_or(InjectError::MapFailed)?;
    Ok(len)
}

/// Byte length of the mapping needed for a single write with a given window.
///
/// # Errors
/// * [`InjectError::MapFailed`] - if the window is narrower than one register
///   or the end address overflows
pub fn write_span(reg: u64, window: u64) -> Result<u64, InjectError> {
    if window < REGISTER_WIDTH {
        return Err(InjectError::MapFailed);
    }
    reg.checked_add(window).ok_or(InjectError::MapFailed)?;
    Ok(window)
}

#[test]
fn parse_u64_radix_detection() {
    assert_eq!(parse_u64("0"), Ok(0));
    assert_eq!(parse_u64("42"), Ok(42));
    assert_eq!(parse_u64("0x2"), Ok(2));
    assert_eq!(parse_u64("0XfF"), Ok(0xff));
    assert_eq!(parse_u64("0777"), Ok(0o777));
    assert_eq!(parse_u64("+7"), Ok(7));
    assert_eq!(parse_u64("0x10\n"), Ok(0x10));
    assert_eq!(parse_u64("18446744073709551615"), Ok(u64::MAX));
}

#[test]
fn parse_u64_rejects_malformed() {
    for bad in ["", "0x", "08", "-1", "++1", "0x+1", "1 ", "12a", "abc", "18446744073709551616"] {
        assert_eq!(parse_u64(bad), Err(InjectError::InvalidInput), "{bad:?}");
    }
}

#[test]
fn span_edge_cases() {
    assert_eq!(read_span(0, 1), Ok(4));
    assert_eq!(read_span(u64::MAX - 3, 1), Err(InjectError::MapFailed));
    assert_eq!(read_span(0, u64::MAX / 2), Err(InjectError::MapFailed));

    assert_eq!(write_span(0x3451_008c, 0x100), Ok(0x100));
    assert_eq!(write_span(0, 2), Err(InjectError::MapFailed));
    assert_eq!(write_span(u64::MAX - 0x10, 0x100), Err(InjectError::MapFailed));
}
