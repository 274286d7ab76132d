//! Conversion between human decimal strings and integer base units.

use alloy::primitives::U256;
use thiserror::Error;

use crate::codec::asset::Asset;

/// Amount parsing failures. All of them surface as `InvalidAmount`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid amount '{0}': not a non-negative decimal literal")]
    Malformed(String),

    #[error("invalid amount '{input}': {symbol} supports at most {decimals} fractional digits")]
    TooPrecise {
        input: String,
        symbol: String,
        decimals: u8,
    },

    #[error("invalid amount '{0}': exceeds the 256-bit range")]
    Overflow(String),

    #[error("invalid amount '{0}': must be greater than zero")]
    Zero(String),
}

/// Parse a display amount into base units, rejecting over-precise input.
///
/// Trailing zeros beyond the asset's precision are accepted since they lose nothing.
pub fn to_base_units(display: &str, asset: &Asset) -> Result<U256, CodecError> {
    parse_scaled(display, asset, false)
}

/// Parse a display amount into base units, dropping excess fractional digits.
pub fn to_base_units_truncating(display: &str, asset: &Asset) -> Result<U256, CodecError> {
    parse_scaled(display, asset, true)
}

fn parse_scaled(display: &str, asset: &Asset, truncate: bool) -> Result<U256, CodecError> {
    let text = display.trim();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part)
    {
        return Err(CodecError::Malformed(display.to_string()));
    }

    let decimals = usize::from(asset.decimals);
    let frac = if frac_part.len() > decimals {
        let (kept, dropped) = frac_part.split_at(decimals);
        if !truncate && dropped.bytes().any(|b| b != b'0') {
            return Err(CodecError::TooPrecise {
                input: display.to_string(),
                symbol: asset.symbol.clone(),
                decimals: asset.decimals,
            });
        }
        kept
    } else {
        frac_part
    };

    let mut digits = String::with_capacity(int_part.len() + decimals);
    digits.push_str(int_part);
    digits.push_str(frac);
    digits.extend(std::iter::repeat('0').take(decimals - frac.len()));

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(significant, 10).map_err(|_| CodecError::Overflow(display.to_string()))
}

/// Render base units as an exact decimal string with trailing zeros trimmed.
pub fn to_display(value: U256, asset: &Asset) -> String {
    let digits = value.to_string();
    let decimals = usize::from(asset.decimals);
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::asset::AssetId;

    fn asset(decimals: u8) -> Asset {
        Asset {
            id: AssetId::Usdc,
            symbol: "USDC".to_string(),
            decimals,
        }
    }

    #[test]
    fn test_parse_basic() {
        let a = asset(18);
        assert_eq!(
            to_base_units("1", &a).unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(
            to_base_units("0.5", &a).unwrap(),
            U256::from(500_000_000_000_000_000u128)
        );
        assert_eq!(to_base_units(".5", &asset(1)).unwrap(), U256::from(5));
        assert_eq!(to_base_units("7.", &asset(2)).unwrap(), U256::from(700));
        assert_eq!(to_base_units(" 42 ", &asset(0)).unwrap(), U256::from(42));
        assert_eq!(to_base_units("000", &a).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_rejects_malformed() {
        let a = asset(6);
        for input in ["", ".", "-1", "+1", "1e5", "1.2.3", "abc", "1 000", "0x10"] {
            assert_eq!(
                to_base_units(input, &a),
                Err(CodecError::Malformed(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn test_over_precision() {
        let a = asset(6);
        assert!(matches!(
            to_base_units("1.0000001", &a),
            Err(CodecError::TooPrecise { decimals: 6, .. })
        ));
        assert_eq!(to_base_units("1.0000000", &a).unwrap(), U256::from(1_000_000));
        assert_eq!(
            to_base_units_truncating("1.0000009", &a).unwrap(),
            U256::from(1_000_000)
        );
    }

    #[test]
    fn test_overflow() {
        let huge = format!("1{}", "0".repeat(78));
        assert_eq!(
            to_base_units(&huge, &asset(0)),
            Err(CodecError::Overflow(huge.clone()))
        );
    }

    #[test]
    fn test_display() {
        let a = asset(18);
        assert_eq!(to_display(U256::ZERO, &a), "0");
        assert_eq!(to_display(U256::from(1u8), &a), "0.000000000000000001");
        assert_eq!(
            to_display(U256::from(1_500_000_000_000_000_000u128), &a),
            "1.5"
        );
        assert_eq!(to_display(U256::from(1_000_000), &asset(6)), "1");
        assert_eq!(to_display(U256::from(123), &asset(0)), "123");
    }

    #[test]
    fn test_round_trip_base_units() {
        let a = asset(18);
        for raw in [0u128, 1, 9, 10, 999_999, 10u128.pow(18), 123_456_789_012_345_678_901] {
            let x = U256::from(raw);
            assert_eq!(to_base_units(&to_display(x, &a), &a).unwrap(), x);
        }
        assert_eq!(to_base_units(&to_display(U256::MAX, &asset(0)), &asset(0)).unwrap(), U256::MAX);
    }

    #[test]
    fn test_round_trip_display() {
        let a = asset(6);
        for text in ["0", "1", "0.000001", "1000000.25", "42.123456"] {
            assert_eq!(to_display(to_base_units(text, &a).unwrap(), &a), text);
        }
        // Numerically equal, canonical form differs.
        assert_eq!(to_display(to_base_units("01.50", &a).unwrap(), &a), "1.5");
    }
}
