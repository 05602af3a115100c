/*!
Fixed-supply fungible-token ledger.

The ledger owns balances, four reservation buckets, and a lock flag
gating public transfers. Its conservation law holds after every call:

```text
total_supply == unallocated_supply + Σ(reserved buckets) + Σ(balances)
```

Every mutating operation is all-or-nothing: checks and arithmetic run
first, state is written only once nothing can fail. A rejected call
leaves the ledger byte-for-byte unchanged.

Exactly one campaign controller may be wired in at a time; it holds the
sole capability to move tokens out of the unallocated pool
([`TokenLedger::credit_from_campaign`]). Everything else privileged is
owner-only.
*/

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{ProtocolError, ProtocolResult};
use crate::events::LedgerEvent;
use crate::types::{AccountId, Amount, CallContext};

/// Reservation group tags. The discriminants are the wire tags used by
/// deployment tooling and match the issuer's published allocation plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ReservedGroup {
    Team = 0x1,
    Bounty = 0x2,
    Partners = 0x4,
    Others = 0x8,
}

impl ReservedGroup {
    pub const ALL: [ReservedGroup; 4] = [
        ReservedGroup::Team,
        ReservedGroup::Bounty,
        ReservedGroup::Partners,
        ReservedGroup::Others,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<ReservedGroup> {
        match tag {
            0x1 => Some(ReservedGroup::Team),
            0x2 => Some(ReservedGroup::Bounty),
            0x4 => Some(ReservedGroup::Partners),
            0x8 => Some(ReservedGroup::Others),
            _ => None,
        }
    }
}

/// Per-group token amounts, used both for the caps fixed at creation
/// and for the live remaining balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReservedPools {
    pub team: Amount,
    pub bounty: Amount,
    pub partners: Amount,
    pub others: Amount,
}

impl ReservedPools {
    pub fn get(&self, group: ReservedGroup) -> Amount {
        match group {
            ReservedGroup::Team => self.team,
            ReservedGroup::Bounty => self.bounty,
            ReservedGroup::Partners => self.partners,
            ReservedGroup::Others => self.others,
        }
    }

    fn set(&mut self, group: ReservedGroup, value: Amount) {
        match group {
            ReservedGroup::Team => self.team = value,
            ReservedGroup::Bounty => self.bounty = value,
            ReservedGroup::Partners => self.partners = value,
            ReservedGroup::Others => self.others = value,
        }
    }

    pub fn checked_total(&self) -> Option<Amount> {
        self.team
            .checked_add(self.bounty)?
            .checked_add(self.partners)?
            .checked_add(self.others)
    }
}

/// Construction parameters for [`TokenLedger`]. Supply and reservation
/// caps are fixed for the life of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    pub reserved: ReservedPools,
}

#[derive(Debug, Clone)]
pub struct TokenLedger {
    address: AccountId,
    owner: AccountId,
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: Amount,
    unallocated_supply: Amount,
    reserved: ReservedPools,
    balances: BTreeMap<AccountId, Amount>,
    allowances: BTreeMap<(AccountId, AccountId), Amount>,
    locked: bool,
    campaign: Option<AccountId>,
    events: Vec<LedgerEvent>,
}

impl TokenLedger {
    /// Create a ledger with the full supply split between the
    /// reservation buckets and the unallocated pool. Starts locked,
    /// with no campaign wired.
    pub fn new(address: AccountId, owner: AccountId, config: TokenConfig) -> ProtocolResult<Self> {
        if owner.is_zero() {
            return Err(ProtocolError::ZeroAccount { what: "owner" });
        }
        let reserved_total = config
            .reserved
            .checked_total()
            .ok_or(ProtocolError::Overflow)?;
        if reserved_total > config.total_supply {
            return Err(ProtocolError::ReservedExceedsSupply {
                reserved: reserved_total,
                total_supply: config.total_supply,
            });
        }
        Ok(TokenLedger {
            address,
            owner,
            name: config.name,
            symbol: config.symbol,
            decimals: config.decimals,
            total_supply: config.total_supply,
            unallocated_supply: config.total_supply - reserved_total,
            reserved: config.reserved,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            locked: true,
            campaign: None,
            events: Vec::new(),
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Supply still available for campaign-driven investor credit.
    pub fn available_supply(&self) -> Amount {
        self.unallocated_supply
    }

    /// Remaining (undistributed) tokens in one reservation bucket.
    pub fn reserved_tokens(&self, group: ReservedGroup) -> Amount {
        self.reserved.get(group)
    }

    pub fn balance_of(&self, account: AccountId) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn campaign(&self) -> Option<AccountId> {
        self.campaign
    }

    /// True iff the conservation law holds. Exposed so harnesses can
    /// assert it after every call.
    pub fn conservation_holds(&self) -> bool {
        let Some(reserved) = self.reserved.checked_total() else {
            return false;
        };
        let balances = self
            .balances
            .values()
            .try_fold(0, |acc: Amount, v| acc.checked_add(*v));
        let Some(balances) = balances else {
            return false;
        };
        self.unallocated_supply
            .checked_add(reserved)
            .and_then(|sum| sum.checked_add(balances))
            == Some(self.total_supply)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Owner operations
    // ========================================================================

    /// Distribute `amount` tokens from a reservation bucket to `to`.
    ///
    /// Works regardless of the lock; reservation distribution is a
    /// privileged path, not a public transfer.
    pub fn assign_reserved(
        &mut self,
        ctx: CallContext,
        to: AccountId,
        group: ReservedGroup,
        amount: Amount,
    ) -> ProtocolResult<()> {
        self.require_owner(ctx.caller)?;

        let remaining = self.reserved.get(group);
        let new_remaining =
            remaining
                .checked_sub(amount)
                .ok_or(ProtocolError::ReservedBucketExceeded {
                    group,
                    requested: amount,
                    remaining,
                })?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(ProtocolError::Overflow)?;

        self.reserved.set(group, new_remaining);
        self.balances.insert(to, new_balance);
        self.events.push(LedgerEvent::ReservedTokensDistributed {
            to,
            group,
            amount,
        });
        self.events.push(LedgerEvent::Transfer {
            from: AccountId::ZERO,
            to,
            value: amount,
        });
        debug!(%to, ?group, amount, "distributed reserved tokens");
        Ok(())
    }

    /// Wire in (or replace) the campaign controller allowed to draw
    /// from the unallocated pool. The zero account un-wires.
    pub fn change_campaign(&mut self, ctx: CallContext, campaign: AccountId) -> ProtocolResult<()> {
        self.require_owner(ctx.caller)?;
        self.campaign = if campaign.is_zero() {
            None
        } else {
            Some(campaign)
        };
        self.events.push(LedgerEvent::CampaignChanged { campaign });
        debug!(%campaign, "campaign controller changed");
        Ok(())
    }

    /// Freeze public transfers. No-op if already locked.
    pub fn lock(&mut self, ctx: CallContext) -> ProtocolResult<()> {
        self.require_owner(ctx.caller)?;
        if !self.locked {
            self.locked = true;
            self.events.push(LedgerEvent::Locked);
        }
        Ok(())
    }

    /// Open public transfers. No-op if already unlocked.
    pub fn unlock(&mut self, ctx: CallContext) -> ProtocolResult<()> {
        self.require_owner(ctx.caller)?;
        if self.locked {
            self.locked = false;
            self.events.push(LedgerEvent::Unlocked);
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        ctx: CallContext,
        new_owner: AccountId,
    ) -> ProtocolResult<()> {
        self.require_owner(ctx.caller)?;
        if new_owner.is_zero() {
            return Err(ProtocolError::ZeroAccount { what: "new owner" });
        }
        let previous_owner = self.owner;
        self.owner = new_owner;
        self.events.push(LedgerEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    // ========================================================================
    // Campaign operation
    // ========================================================================

    /// Credit `to` out of the unallocated pool. Only the wired
    /// campaign controller may call this; it is how investor purchases
    /// become balances.
    pub fn credit_from_campaign(
        &mut self,
        ctx: CallContext,
        to: AccountId,
        amount: Amount,
    ) -> ProtocolResult<()> {
        if self.campaign != Some(ctx.caller) {
            return Err(ProtocolError::NotCampaign { caller: ctx.caller });
        }

        let new_unallocated = self.unallocated_supply.checked_sub(amount).ok_or(
            ProtocolError::UnallocatedSupplyExceeded {
                requested: amount,
                remaining: self.unallocated_supply,
            },
        )?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(ProtocolError::Overflow)?;

        self.unallocated_supply = new_unallocated;
        self.balances.insert(to, new_balance);
        self.events.push(LedgerEvent::Transfer {
            from: AccountId::ZERO,
            to,
            value: amount,
        });
        debug!(%to, amount, "credited from campaign");
        Ok(())
    }

    // ========================================================================
    // Holder operations
    // ========================================================================

    /// Move `value` tokens from the caller to `to`.
    pub fn transfer(&mut self, ctx: CallContext, to: AccountId, value: Amount) -> ProtocolResult<()> {
        self.require_transfers_open(ctx.caller)?;
        let from = ctx.caller;

        let from_balance = self.balance_of(from);
        let new_from =
            from_balance
                .checked_sub(value)
                .ok_or(ProtocolError::InsufficientBalance {
                    account: from,
                    have: from_balance,
                    need: value,
                })?;

        if from != to {
            let new_to = self
                .balance_of(to)
                .checked_add(value)
                .ok_or(ProtocolError::Overflow)?;
            self.set_balance(from, new_from);
            self.balances.insert(to, new_to);
        }
        self.events.push(LedgerEvent::Transfer { from, to, value });
        Ok(())
    }

    /// Move `value` tokens from `from` to `to` on the strength of an
    /// allowance granted to the caller.
    pub fn transfer_from(
        &mut self,
        ctx: CallContext,
        from: AccountId,
        to: AccountId,
        value: Amount,
    ) -> ProtocolResult<()> {
        self.require_transfers_open(ctx.caller)?;
        let spender = ctx.caller;

        let allowed = self.allowance(from, spender);
        let new_allowed =
            allowed
                .checked_sub(value)
                .ok_or(ProtocolError::InsufficientAllowance {
                    owner: from,
                    spender,
                    have: allowed,
                    need: value,
                })?;
        let from_balance = self.balance_of(from);
        let new_from =
            from_balance
                .checked_sub(value)
                .ok_or(ProtocolError::InsufficientBalance {
                    account: from,
                    have: from_balance,
                    need: value,
                })?;

        if new_allowed == 0 {
            self.allowances.remove(&(from, spender));
        } else {
            self.allowances.insert((from, spender), new_allowed);
        }
        if from != to {
            let new_to = self
                .balance_of(to)
                .checked_add(value)
                .ok_or(ProtocolError::Overflow)?;
            self.set_balance(from, new_from);
            self.balances.insert(to, new_to);
        }
        self.events.push(LedgerEvent::Transfer { from, to, value });
        Ok(())
    }

    /// Set the caller's allowance for `spender` to exactly `value`.
    ///
    /// Overwrites rather than adds. Callers changing a non-zero
    /// allowance should zero it first; racing a spend against a
    /// re-approval can otherwise double-spend the grant.
    pub fn approve(
        &mut self,
        ctx: CallContext,
        spender: AccountId,
        value: Amount,
    ) -> ProtocolResult<()> {
        self.require_transfers_open(ctx.caller)?;
        let owner = ctx.caller;
        if value == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), value);
        }
        self.events.push(LedgerEvent::Approval {
            owner,
            spender,
            value,
        });
        Ok(())
    }

    // ========================================================================
    // Gates
    // ========================================================================

    fn require_owner(&self, caller: AccountId) -> ProtocolResult<()> {
        if caller != self.owner {
            return Err(ProtocolError::NotOwner { caller });
        }
        Ok(())
    }

    /// Public token movement is frozen while locked; the owner keeps
    /// access throughout.
    fn require_transfers_open(&self, caller: AccountId) -> ProtocolResult<()> {
        if self.locked && caller != self.owner {
            return Err(ProtocolError::LedgerLocked);
        }
        Ok(())
    }

    fn set_balance(&mut self, account: AccountId, value: Amount) {
        if value == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, value);
        }
    }
}
