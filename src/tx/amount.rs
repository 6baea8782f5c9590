//! Strict parsing of user-entered SOL amounts and exact quote arithmetic

use crate::error::{SwapError, SwapResult};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use std::fmt;
use std::str::FromStr;

/// Lamports are 9 decimal places below one SOL
const LAMPORT_SCALE: u32 = 9;

/// A validated, strictly positive SOL amount representable in whole lamports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SolAmount {
    sol: Decimal,
    lamports: u64,
}

impl SolAmount {
    /// Parse amount text as typed by the user
    pub fn parse(input: &str) -> SwapResult<Self> {
        let invalid = |reason: &str| SwapError::InvalidAmount {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid("amount is empty"));
        }

        let sol = Decimal::from_str(trimmed)
            .map_err(|_| invalid("not a decimal number"))?
            .normalize();

        if sol.is_sign_negative() || sol.is_zero() {
            return Err(invalid("amount must be greater than zero"));
        }
        if sol.scale() > LAMPORT_SCALE {
            return Err(invalid("more than 9 decimal places"));
        }

        let lamports = sol
            .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
            .and_then(|l| l.to_u64())
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Self { sol, lamports })
    }

    pub fn from_lamports(lamports: u64) -> Self {
        Self {
            sol: Decimal::from_i128_with_scale(lamports as i128, LAMPORT_SCALE).normalize(),
            lamports,
        }
    }

    /// Amount in display units
    pub fn sol(&self) -> Decimal {
        self.sol
    }

    /// Amount in the smallest ledger unit
    pub fn lamports(&self) -> u64 {
        self.lamports
    }

    /// Tokens credited for this amount at `rate`, `None` if the product overflows
    pub fn quote(&self, rate: Decimal) -> Option<Decimal> {
        self.sol.checked_mul(rate).map(|tokens| tokens.normalize())
    }
}

impl fmt::Display for SolAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SOL", self.sol)
    }
}

/// Quote shown in the output field: two decimals rounded half up, empty for
/// unparsable input or a quote that does not fit
pub fn format_quote(input: &str, rate: Decimal) -> String {
    SolAmount::parse(input)
        .ok()
        .and_then(|amount| amount.quote(rate))
        .map(|tokens| {
            format!(
                "{:.2}",
                tokens.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            )
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_converts_to_lamports() {
        let amount = SolAmount::parse(" 1.5 ").unwrap();
        assert_eq!(amount.lamports(), 1_500_000_000);
        assert_eq!(amount.sol(), dec!(1.5));

        let one_lamport = SolAmount::parse("0.000000001").unwrap();
        assert_eq!(one_lamport.lamports(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "   ", "abc", "1.2.3", "0", "0.000", "-1", "-0.5"] {
            let err = SolAmount::parse(input).unwrap_err();
            assert!(
                matches!(err, SwapError::InvalidAmount { .. }),
                "{input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_sub_lamport_precision() {
        assert!(SolAmount::parse("0.0000000001").is_err());
        // Trailing zeros do not count towards precision
        assert!(SolAmount::parse("1.0000000000").is_ok());
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(SolAmount::parse("100000000000").is_err());
    }

    #[test]
    fn test_quote_is_exact() {
        let amount = SolAmount::parse("0.1").unwrap();
        assert_eq!(amount.quote(dec!(100)), Some(dec!(10)));

        let amount = SolAmount::parse("0.123456789").unwrap();
        assert_eq!(amount.quote(dec!(100)), Some(dec!(12.3456789)));
    }

    #[test]
    fn test_format_quote() {
        assert_eq!(format_quote("1", dec!(100)), "100.00");
        assert_eq!(format_quote("0.123", dec!(100)), "12.30");
        assert_eq!(format_quote("", dec!(100)), "");
        assert_eq!(format_quote("nope", dec!(100)), "");
    }

    #[test]
    fn test_quote_overflow_is_not_a_panic() {
        let amount = SolAmount::parse("18000000000").unwrap();
        let rate = Decimal::from_str("10000000000000000000").unwrap();
        assert_eq!(amount.quote(rate), None);
        assert_eq!(format_quote("18000000000", rate), "");
        assert_eq!(format_quote("1", rate), "10000000000000000000.00");
    }

    #[test]
    fn test_format_quote_rounds_half_up() {
        assert_eq!(format_quote("0.00005", dec!(100)), "0.01");
        assert_eq!(format_quote("0.00025", dec!(100)), "0.03");
        assert_eq!(format_quote("0.00004", dec!(100)), "0.00");
    }

    #[test]
    fn test_from_lamports() {
        let amount = SolAmount::from_lamports(2_000_000_000);
        assert_eq!(amount.sol(), dec!(2));
        assert_eq!(amount.to_string(), "2 SOL");
    }
}
