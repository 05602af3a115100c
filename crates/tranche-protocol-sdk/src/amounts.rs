/*!
Human-friendly token and base-currency amount parsing.

18-decimal figures are unreadable as raw integers, so configuration
files write them in scientific notation (`"1500e18"`, `"1.5e21"`) or
with underscore grouping (`"100_000_000"`). Everything resolves to an
exact integer [`Amount`]; fractional results are rejected rather than
rounded.
*/

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use tranche_protocol::Amount;

#[derive(Debug, Error)]
pub enum ParseAmountError {
    #[error("empty amount")]
    Empty,

    #[error("cannot parse {input:?} as a decimal number: {source}")]
    Decimal {
        input: String,
        source: rust_decimal::Error,
    },

    #[error("amount {input:?} is negative")]
    Negative { input: String },

    #[error("amount {input:?} does not resolve to a whole number of base units")]
    Fractional { input: String },

    #[error("amount {input:?} does not fit in 128 bits")]
    TooLarge { input: String },
}

/// Parse an amount string into exact base units.
///
/// Accepts plain integers (`"5000"`), underscore grouping
/// (`"100_000_000"`), and scientific notation (`"1500e18"`,
/// `"1.5e18"`). The result must be a non-negative whole number.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let cleaned = input.trim().replace('_', "");
    if cleaned.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let decimal = if cleaned.contains(['e', 'E']) {
        Decimal::from_scientific(&cleaned)
    } else {
        Decimal::from_str(&cleaned)
    }
    .map_err(|source| ParseAmountError::Decimal {
        input: input.to_string(),
        source,
    })?;

    if decimal.is_sign_negative() && !decimal.is_zero() {
        return Err(ParseAmountError::Negative {
            input: input.to_string(),
        });
    }
    if !decimal.fract().is_zero() {
        return Err(ParseAmountError::Fractional {
            input: input.to_string(),
        });
    }
    decimal.to_u128().ok_or_else(|| ParseAmountError::TooLarge {
        input: input.to_string(),
    })
}
