/*!
# Tranche Protocol Core

Core logic for a fixed-supply token sale: a fungible-token **ledger**
with reservation buckets and a transfer lock, and a staged **campaign
controller** that sells the ledger's unallocated supply during a
time-bounded window at a bonus rate that decays over time.

## Components

- [`ledger::TokenLedger`]: balances, allowances, four reservation
  buckets, and the conservation law
  `total_supply == unallocated + Σ reserved + Σ balances`.
- [`campaign::Campaign`]: the lifecycle state machine
  (`Inactive → Active ⇄ Suspended`, terminal `Terminated` /
  `Completed` / `NotCompleted`) and the investment-acceptance
  algorithm.

The two are linked by a single capability: the ledger owner wires in
one campaign address, and only that address may call
[`ledger::TokenLedger::credit_from_campaign`].

## Execution model

Everything here is pure sequential logic. There is no clock, no
ambient caller, and no I/O: each call takes a [`types::CallContext`]
carrying caller identity and the current time, runs to completion, and
either commits fully or returns an error leaving all state untouched.
Hosts (CLI, test harness, service) own scheduling and settlement.

## Usage

```rust
use tranche_protocol::{
    AccountId, CallContext, Campaign, CampaignParams, ReservedPools, TokenConfig, TokenLedger,
};

fn example() -> tranche_protocol::ProtocolResult<()> {
    let owner = AccountId::new([0x01; 20]);
    let ledger_addr = AccountId::new([0xAA; 20]);
    let campaign_addr = AccountId::new([0xC0; 20]);
    let investor = AccountId::new([0x20; 20]);

    let mut ledger = TokenLedger::new(
        ledger_addr,
        owner,
        TokenConfig {
            name: "Otcrit token".into(),
            symbol: "OTC".into(),
            decimals: 18,
            total_supply: 100_000_000,
            reserved: ReservedPools {
                team: 10_000_000,
                bounty: 10_000_000,
                partners: 5_000_000,
                others: 5_000_000,
            },
        },
    )?;
    let mut campaign = Campaign::new(
        campaign_addr,
        owner,
        ledger_addr,
        CampaignParams::with_caps(AccountId::new([0x77; 20]), 2_000, 10_000, 0, 0),
    )?;

    ledger.change_campaign(CallContext::new(owner, 1_000), campaign_addr)?;
    campaign.start(CallContext::new(owner, 1_000), 2_000)?;

    let receipt =
        campaign.on_investment(CallContext::new(investor, 1_100), &mut ledger, investor, 200)?;
    assert_eq!(receipt.bonus_pct, 15);
    assert_eq!(receipt.tokens, 230 * 5_000);
    assert_eq!(ledger.balance_of(investor), receipt.tokens);
    Ok(())
}
# example().unwrap();
```
*/

pub mod campaign;
pub mod constants;
pub mod error;
pub mod events;
pub mod ledger;
pub mod schedule;
pub mod types;

// Re-export main types for convenience
pub use campaign::{Campaign, CampaignParams, CampaignState, InvestmentReceipt};
pub use error::{ErrorKind, ProtocolError, ProtocolResult};
pub use events::{CampaignEvent, LedgerEvent};
pub use ledger::{ReservedGroup, ReservedPools, TokenConfig, TokenLedger};
pub use schedule::{BonusSchedule, BonusTier};
pub use types::{AccountId, Amount, CallContext, Timestamp};
