/*!
Events recorded by the ledger and campaign components.

Each component appends to an internal log as part of the mutation that
caused the event, after its state change lands. Hosts drain the log
(`drain_events`) and forward entries to whatever transport they use;
nothing here assumes one.
*/

use serde::Serialize;

use crate::campaign::CampaignState;
use crate::ledger::ReservedGroup;
use crate::types::{AccountId, Amount, Timestamp};

/// Events emitted by [`crate::ledger::TokenLedger`].
///
/// Balance credits out of the unallocated and reserved pools surface as
/// [`LedgerEvent::Transfer`] from [`AccountId::ZERO`], matching the
/// convention token explorers expect for distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    Transfer {
        from: AccountId,
        to: AccountId,
        value: Amount,
    },
    Approval {
        owner: AccountId,
        spender: AccountId,
        value: Amount,
    },
    ReservedTokensDistributed {
        to: AccountId,
        group: ReservedGroup,
        amount: Amount,
    },
    CampaignChanged {
        campaign: AccountId,
    },
    OwnershipTransferred {
        previous_owner: AccountId,
        new_owner: AccountId,
    },
    Locked,
    Unlocked,
}

/// Events emitted by [`crate::campaign::Campaign`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CampaignEvent {
    /// Lifecycle state changed, for any reason. Carries the new state.
    StateChanged {
        state: CampaignState,
    },
    Tuned {
        end_at: Timestamp,
        low_cap_total: Amount,
        hard_cap_total: Amount,
        low_cap_per_tx: Amount,
        hard_cap_per_tx: Amount,
    },
    Investment {
        investor: AccountId,
        invested: Amount,
        tokens: Amount,
        bonus_pct: u8,
    },
    /// The campaign reached a terminal outcome state.
    Completed {
        final_state: CampaignState,
        collected_total: Amount,
    },
    Whitelisted {
        investor: AccountId,
    },
    Blacklisted {
        investor: AccountId,
    },
    WhitelistEnabled,
    WhitelistDisabled,
    OwnershipTransferred {
        previous_owner: AccountId,
        new_owner: AccountId,
    },
}
