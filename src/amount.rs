//! Human-amount normalization
//!
//! Callers send decimal quantities ("1.5" SOL, 5 units of a token); the
//! ledger wants integers in the asset's base unit. The conversion here is
//! pure integer arithmetic on the decimal text - no floats anywhere, so two
//! recipients of 0.1 never drift the way accumulated f64 math does. An
//! amount that cannot be represented at the asset's declared precision is
//! rejected rather than rounded: silent rounding misroutes value.

use serde::Deserialize;

use crate::errors::TransferError;

/// A caller-supplied quantity, accepted as either a JSON number or a string.
///
/// The literal text is preserved (serde_json renders numbers with shortest
/// round-trip formatting) so scaling can work digit-by-digit.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    fn as_decimal_text(&self) -> String {
        match self {
            Amount::Number(n) => n.to_string(),
            Amount::Text(s) => s.clone(),
        }
    }

    /// Cheap positivity check, usable before the asset's precision is known.
    pub fn validate_positive(&self) -> Result<(), TransferError> {
        let (digits, _) = parse_decimal(&self.as_decimal_text())?;
        if digits == 0 {
            return Err(TransferError::invalid_input(
                "amount must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Convert to base units at the given precision.
    pub fn to_base_units(&self, decimals: u8) -> Result<u64, TransferError> {
        scale_to_base_units(&self.as_decimal_text(), decimals)
    }
}

/// u128 holds at most 38 significant decimal digits, so no exponent beyond
/// this magnitude can denote a representable amount.
const MAX_EXPONENT: i64 = 38;

/// Parse an unsigned decimal literal (optionally with an exponent, which
/// serde_json emits for small floats like `1e-7`) into its significant
/// digits and scale: the value is `digits * 10^-scale`.
fn parse_decimal(raw: &str) -> Result<(u128, i64), TransferError> {
    let s = raw.trim();
    let bad = || TransferError::invalid_input(format!("amount is not a valid quantity: {raw:?}"));

    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => {
            let exp: i64 = s[i + 1..].parse().map_err(|_| bad())?;
            // The exponent is caller-controlled; cap it before it reaches
            // any arithmetic.
            if exp.unsigned_abs() > MAX_EXPONENT as u64 {
                return Err(TransferError::invalid_input(format!(
                    "amount is out of range: {raw:?}"
                )));
            }
            (&s[..i], exp)
        }
        None => (s, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(bad());
    }
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(bad());
    }

    let mut digits = String::with_capacity(int_part.len() + frac_part.len());
    digits.push_str(int_part);
    digits.push_str(frac_part);
    let value: u128 = digits.parse().map_err(|_| {
        TransferError::invalid_input(format!("amount is out of range: {raw:?}"))
    })?;

    let scale = frac_part.len() as i64 - exponent;
    Ok((value, scale))
}

/// Scale a decimal literal to an integer count of base units.
///
/// Rejects zero, values with non-zero digits beyond `decimals` places, and
/// anything that overflows u64. Trailing zeros past the precision are fine.
pub fn scale_to_base_units(raw: &str, decimals: u8) -> Result<u64, TransferError> {
    let (value, scale) = parse_decimal(raw)?;
    if value == 0 {
        return Err(TransferError::invalid_input(
            "amount must be greater than zero",
        ));
    }

    let shift = i64::from(decimals) - scale;
    let base = if shift >= 0 {
        u32::try_from(shift)
            .ok()
            .and_then(|s| 10u128.checked_pow(s))
            .and_then(|m| value.checked_mul(m))
            .ok_or_else(|| {
                TransferError::invalid_input(format!("amount is out of range: {raw:?}"))
            })?
    } else {
        // More fractional digits than the asset supports: only acceptable
        // when the excess digits are all zero.
        let excess = u32::try_from(-shift).map_err(|_| {
            TransferError::invalid_input(format!("amount is not a valid quantity: {raw:?}"))
        })?;
        let divisor = 10u128.checked_pow(excess);
        match divisor {
            Some(d) if value % d == 0 => value / d,
            _ => {
                return Err(TransferError::invalid_input(format!(
                    "amount {raw} is not representable at {decimals} decimal places"
                )))
            }
        }
    };

    u64::try_from(base)
        .map_err(|_| TransferError::invalid_input(format!("amount is out of range: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_sol_scaling() {
        assert_eq!(scale_to_base_units("1.5", 9).unwrap(), 1_500_000_000);
        assert_eq!(scale_to_base_units("2.0", 9).unwrap(), 2_000_000_000);
        assert_eq!(scale_to_base_units("2", 9).unwrap(), 2_000_000_000);
        assert_eq!(scale_to_base_units("0.000000001", 9).unwrap(), 1);
    }

    #[test]
    fn test_token_scaling() {
        assert_eq!(scale_to_base_units("5", 6).unwrap(), 5_000_000);
        assert_eq!(scale_to_base_units("0.25", 2).unwrap(), 25);
        assert_eq!(scale_to_base_units("7", 0).unwrap(), 7);
    }

    #[test]
    fn test_exponent_forms() {
        // serde_json renders 0.0000001 as 1e-7
        assert_eq!(scale_to_base_units("1e-7", 9).unwrap(), 100);
        assert_eq!(scale_to_base_units("1E3", 0).unwrap(), 1000);
        assert_eq!(scale_to_base_units("2.5e1", 0).unwrap(), 25);
    }

    #[test]
    fn test_trailing_zeros_past_precision_accepted() {
        assert_eq!(scale_to_base_units("1.50", 1).unwrap(), 15);
        assert_eq!(scale_to_base_units("3.000", 0).unwrap(), 3);
    }

    #[test]
    fn test_unrepresentable_rejected() {
        let err = scale_to_base_units("1.5", 0).unwrap_err();
        assert!(matches!(err, TransferError::InvalidInput(_)));
        assert!(err.to_string().contains("not representable"));

        assert!(scale_to_base_units("0.0000000001", 9).is_err());
        assert!(scale_to_base_units("1.000000001", 6).is_err());
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        for raw in ["0", "0.0", "0e5", "-1", "-0.5"] {
            assert!(
                matches!(
                    scale_to_base_units(raw, 9),
                    Err(TransferError::InvalidInput(_))
                ),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_hostile_exponents_rejected() {
        // Extreme caller-controlled exponents must come back as errors,
        // never panic in overflow-checked builds.
        for raw in [
            "1e2147483647",
            "1e-2147483648",
            "1e9223372036854775807",
            "1e-9223372036854775808",
            "1e300",
            "1e-300",
            "1e39",
            "1e-39",
        ] {
            assert!(
                matches!(
                    scale_to_base_units(raw, 9),
                    Err(TransferError::InvalidInput(_))
                ),
                "{raw:?}"
            );
        }
        // The bound leaves legitimate scientific notation untouched
        assert_eq!(scale_to_base_units("1e-7", 9).unwrap(), 100);
    }

    #[test]
    fn test_garbage_rejected() {
        for raw in ["", ".", "abc", "1.2.3", "1,5", "1e", "NaN", "Infinity", "+1"] {
            assert!(scale_to_base_units(raw, 9).is_err(), "{raw:?}");
        }
    }

    #[test]
    fn test_overflow_rejected() {
        // 20 * 10^18 > u64::MAX
        assert!(scale_to_base_units("20000000000000000000", 0).is_err());
        assert!(scale_to_base_units("99999999999", 9).is_err());
        // Just under the limit still works
        assert_eq!(
            scale_to_base_units("18446744073709551615", 0).unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn test_amount_from_json_number_and_string() {
        let n: Amount = serde_json::from_str("1.5").unwrap();
        assert_eq!(n.to_base_units(9).unwrap(), 1_500_000_000);

        let s: Amount = serde_json::from_str("\"1.5\"").unwrap();
        assert_eq!(s.to_base_units(9).unwrap(), 1_500_000_000);

        let tiny: Amount = serde_json::from_str("0.0000001").unwrap();
        assert_eq!(tiny.to_base_units(9).unwrap(), 100);
    }

    #[test]
    fn test_validate_positive() {
        let good: Amount = serde_json::from_str("0.5").unwrap();
        assert!(good.validate_positive().is_ok());

        let zero: Amount = serde_json::from_str("0").unwrap();
        assert!(zero.validate_positive().is_err());

        let negative: Amount = serde_json::from_str("-2").unwrap();
        assert!(negative.validate_positive().is_err());
    }

    proptest! {
        // Any base-unit count survives a round trip through its decimal
        // rendering at the same precision.
        #[test]
        fn prop_base_units_round_trip(value in 1u64..=u64::MAX / 1_000_000_000, decimals in 0u8..=9) {
            let scale = 10u64.pow(u32::from(decimals));
            let whole = value / scale;
            let frac = value % scale;
            let text = if decimals == 0 {
                whole.to_string()
            } else {
                format!("{whole}.{frac:0width$}", width = decimals as usize)
            };
            prop_assert_eq!(scale_to_base_units(&text, decimals).unwrap(), value);
        }
    }
}
