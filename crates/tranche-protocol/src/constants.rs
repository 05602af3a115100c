use crate::types::{Amount, Timestamp};

/// Decimal places carried by token amounts.
pub const TOKEN_DECIMALS: u8 = 18;

/// Tokens credited per base-currency unit invested.
pub const DEFAULT_EXCHANGE_RATIO: Amount = 5_000;

/// Seconds in one week, the default bonus tier width.
pub const SECONDS_PER_WEEK: Timestamp = 7 * 24 * 60 * 60;

/// Default early-investor bonus tiers as `(offset from start, percent)`.
///
/// 15% in the first week, decaying by five points per week, zero from
/// week four onward.
pub const DEFAULT_BONUS_TIERS: &[(Timestamp, u8)] = &[
    (0, 15),
    (SECONDS_PER_WEEK, 10),
    (2 * SECONDS_PER_WEEK, 5),
    (3 * SECONDS_PER_WEEK, 0),
];
