/*!
# Tranche Protocol Testing

Scenario-test support for the sale components: a deployed in-memory
fixture with a forward-only clock, plus the constants most scenarios
share. The scenarios themselves live in this crate's `tests/`
directory, one flow per file.
*/

pub mod fixture;

pub use fixture::{
    demand_error_kind, test_account, SaleFixture, DEFAULT_SALE_YAML, GENESIS, RAW_SALE_YAML, UNIT,
    WEEK,
};
