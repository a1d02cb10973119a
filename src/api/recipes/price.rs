use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Maximum digits before the decimal point (numeric(5,2) column)
const MAX_INTEGER_DIGITS: usize = 3;
/// Maximum digits after the decimal point
const MAX_FRACTION_DIGITS: usize = 2;

/// Parse a submitted price string into a decimal.
///
/// Prices travel as strings on the wire to avoid float rounding. Accepted
/// values are non-negative with at most three integer and two fraction
/// digits, matching the numeric(5,2) column.
pub fn parse_price(raw: &str) -> Result<BigDecimal, String> {
    let raw = raw.trim();

    let (integer, fraction) = match raw.split_once('.') {
        Some((i, f)) => (i, f),
        None => (raw, ""),
    };

    if integer.is_empty()
        || !integer.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err("Price must be a non-negative decimal number".to_string());
    }

    if integer.trim_start_matches('0').len() > MAX_INTEGER_DIGITS {
        return Err("Price must be less than 1000".to_string());
    }

    if fraction.len() > MAX_FRACTION_DIGITS {
        return Err("Price can have at most two decimal places".to_string());
    }

    BigDecimal::from_str(raw).map_err(|_| "Price must be a valid decimal number".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_price() {
        assert_eq!(parse_price("5.99").unwrap(), BigDecimal::from_str("5.99").unwrap());
        assert_eq!(parse_price("22.5").unwrap(), BigDecimal::from_str("22.5").unwrap());
        assert_eq!(parse_price("100").unwrap(), BigDecimal::from_str("100").unwrap());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_price(" 10.00 ").is_ok());
    }

    #[test]
    fn test_rejects_negative() {
        assert!(parse_price("-1.00").is_err());
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(parse_price("abc").is_err());
        assert!(parse_price("1.2.3").is_err());
        assert!(parse_price("").is_err());
        assert!(parse_price(".50").is_err());
    }

    #[test]
    fn test_rejects_too_many_digits() {
        assert!(parse_price("1000").is_err());
        assert!(parse_price("999.99").is_ok());
        assert!(parse_price("0999.99").is_ok());
        assert!(parse_price("5.999").is_err());
    }
}
