//! Decimal amount conversion
//!
//! Values are stored in the smallest unit (wei, 18 decimals). Humans type
//! and read ether-style decimals such as `"0.2"`.

use thiserror::Error;

/// Decimal places of one ether
pub const ETHER_DECIMALS: u32 = 18;

/// Smallest units per whole ether
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid amount: {0}")]
    InvalidDigit(String),
    #[error("Too many decimal places: at most 18 allowed")]
    TooPrecise,
    #[error("Amount too large")]
    Overflow,
}

/// Parse a decimal ether amount into wei
pub fn parse_ether(input: &str) -> Result<u128, UnitsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, fraction) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitsError::InvalidDigit(input.to_string()));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::InvalidDigit(input.to_string()));
    }
    if fraction.len() > ETHER_DECIMALS as usize {
        return Err(UnitsError::TooPrecise);
    }

    let whole_wei = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .map_err(|_| UnitsError::Overflow)?
            .checked_mul(WEI_PER_ETHER)
            .ok_or(UnitsError::Overflow)?
    };

    let fraction_wei = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = ETHER_DECIMALS as usize);
        padded.parse::<u128>().map_err(|_| UnitsError::Overflow)?
    };

    whole_wei
        .checked_add(fraction_wei)
        .ok_or(UnitsError::Overflow)
}

/// Format wei as a decimal ether string without trailing zeros
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;

    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0>width$}", fraction, width = ETHER_DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ether() {
        assert_eq!(parse_ether("1").unwrap(), WEI_PER_ETHER);
        assert_eq!(parse_ether("1.0").unwrap(), WEI_PER_ETHER);
        assert_eq!(parse_ether("0.2").unwrap(), 200_000_000_000_000_000);
        assert_eq!(parse_ether(".5").unwrap(), WEI_PER_ETHER / 2);
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), 1);
        assert_eq!(parse_ether(" 3 ").unwrap(), 3 * WEI_PER_ETHER);
    }

    #[test]
    fn test_parse_ether_errors() {
        assert_eq!(parse_ether(""), Err(UnitsError::Empty));
        assert!(matches!(parse_ether("."), Err(UnitsError::InvalidDigit(_))));
        assert!(matches!(parse_ether("1.2.3"), Err(UnitsError::InvalidDigit(_))));
        assert!(matches!(parse_ether("-1"), Err(UnitsError::InvalidDigit(_))));
        assert_eq!(
            parse_ether("0.0000000000000000001"),
            Err(UnitsError::TooPrecise)
        );
        assert_eq!(
            parse_ether("999999999999999999999999"),
            Err(UnitsError::Overflow)
        );
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(0), "0");
        assert_eq!(format_ether(WEI_PER_ETHER), "1");
        assert_eq!(format_ether(200_000_000_000_000_000), "0.2");
        assert_eq!(format_ether(800_000_000_000_000_000), "0.8");
        assert_eq!(format_ether(1), "0.000000000000000001");
        assert_eq!(format_ether(parse_ether("12.34").unwrap()), "12.34");
    }
}
