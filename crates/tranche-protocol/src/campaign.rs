/*!
Staged, time-bounded fundraising campaign controller.

The controller runs the lifecycle below and, while `Active`, converts
base-currency investments into ledger credits at a bonus-adjusted rate:

```text
Inactive ──start──▶ Active ◀──resume/suspend──▶ Suspended
                      │                             │
                      ├──────── terminate ──────────┤─▶ Terminated
                      │
                      ├─ touch/invest ─▶ Completed | NotCompleted
```

`Terminated`, `Completed` and `NotCompleted` are terminal: once there,
every mutating call is refused. Terminal-state checks run before
anything else, including authorization, so an inert campaign answers
all writers the same way.

Time and caller identity arrive through [`CallContext`] on every call;
the controller holds no clock of its own.
*/

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ProtocolError, ProtocolResult};
use crate::events::CampaignEvent;
use crate::ledger::TokenLedger;
use crate::schedule::BonusSchedule;
use crate::types::{AccountId, Amount, CallContext, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CampaignState {
    Inactive,
    Active,
    Suspended,
    Terminated,
    NotCompleted,
    Completed,
}

impl CampaignState {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CampaignState::Terminated | CampaignState::NotCompleted | CampaignState::Completed
        )
    }
}

/// Construction parameters for [`Campaign`].
///
/// Zero per-investment caps disable the corresponding bound. The
/// exchange ratio and bonus schedule default to the protocol constants
/// via [`CampaignParams::with_caps`].
#[derive(Debug, Clone)]
pub struct CampaignParams {
    pub team_wallet: AccountId,
    pub low_cap_total: Amount,
    pub hard_cap_total: Amount,
    pub low_cap_per_tx: Amount,
    pub hard_cap_per_tx: Amount,
    pub exchange_ratio: Amount,
    pub bonus_schedule: BonusSchedule,
}

impl CampaignParams {
    /// Params with the stock exchange ratio and bonus schedule.
    pub fn with_caps(
        team_wallet: AccountId,
        low_cap_total: Amount,
        hard_cap_total: Amount,
        low_cap_per_tx: Amount,
        hard_cap_per_tx: Amount,
    ) -> Self {
        CampaignParams {
            team_wallet,
            low_cap_total,
            hard_cap_total,
            low_cap_per_tx,
            hard_cap_per_tx,
            exchange_ratio: crate::constants::DEFAULT_EXCHANGE_RATIO,
            bonus_schedule: BonusSchedule::default(),
        }
    }
}

/// Outcome of one accepted investment.
///
/// `invested` and `refund` are bonus-adjusted base-currency figures:
/// `invested` is what entered `collected_total` after the hard-cap
/// clamp, `refund` is the clamped-off remainder (zero in the common
/// case). Settlement of the base currency against `team_wallet` is the
/// host's job; the receipt carries everything it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvestmentReceipt {
    pub investor: AccountId,
    pub requested: Amount,
    pub invested: Amount,
    pub refund: Amount,
    pub tokens: Amount,
    pub bonus_pct: u8,
    pub team_wallet: AccountId,
}

#[derive(Debug, Clone)]
pub struct Campaign {
    address: AccountId,
    owner: AccountId,
    ledger: AccountId,
    team_wallet: AccountId,
    state: CampaignState,
    // zero while Inactive, set once by start()
    start_at: Timestamp,
    end_at: Timestamp,
    low_cap_total: Amount,
    hard_cap_total: Amount,
    low_cap_per_tx: Amount,
    hard_cap_per_tx: Amount,
    collected_total: Amount,
    allow_list_enabled: bool,
    allow_list: BTreeSet<AccountId>,
    exchange_ratio: Amount,
    bonus_schedule: BonusSchedule,
    events: Vec<CampaignEvent>,
}

impl Campaign {
    pub fn new(
        address: AccountId,
        owner: AccountId,
        ledger: AccountId,
        params: CampaignParams,
    ) -> ProtocolResult<Self> {
        if owner.is_zero() {
            return Err(ProtocolError::ZeroAccount { what: "owner" });
        }
        if params.team_wallet.is_zero() {
            return Err(ProtocolError::ZeroAccount { what: "team wallet" });
        }
        if params.exchange_ratio == 0 {
            return Err(ProtocolError::InvalidParams(
                "exchange ratio must be non-zero".into(),
            ));
        }
        Self::validate_caps(
            params.low_cap_total,
            params.hard_cap_total,
            params.low_cap_per_tx,
            params.hard_cap_per_tx,
        )?;
        Ok(Campaign {
            address,
            owner,
            ledger,
            team_wallet: params.team_wallet,
            state: CampaignState::Inactive,
            start_at: 0,
            end_at: 0,
            low_cap_total: params.low_cap_total,
            hard_cap_total: params.hard_cap_total,
            low_cap_per_tx: params.low_cap_per_tx,
            hard_cap_per_tx: params.hard_cap_per_tx,
            collected_total: 0,
            allow_list_enabled: false,
            allow_list: BTreeSet::new(),
            exchange_ratio: params.exchange_ratio,
            bonus_schedule: params.bonus_schedule,
            events: Vec::new(),
        })
    }

    fn validate_caps(
        low_cap_total: Amount,
        hard_cap_total: Amount,
        low_cap_per_tx: Amount,
        hard_cap_per_tx: Amount,
    ) -> ProtocolResult<()> {
        if hard_cap_total == 0 {
            return Err(ProtocolError::InvalidParams(
                "hard cap must be non-zero".into(),
            ));
        }
        if low_cap_total > hard_cap_total {
            return Err(ProtocolError::InvalidParams(format!(
                "low cap {low_cap_total} exceeds hard cap {hard_cap_total}"
            )));
        }
        if low_cap_per_tx != 0 && hard_cap_per_tx != 0 && low_cap_per_tx > hard_cap_per_tx {
            return Err(ProtocolError::InvalidParams(format!(
                "per-investment floor {low_cap_per_tx} exceeds ceiling {hard_cap_per_tx}"
            )));
        }
        Ok(())
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

    pub fn ledger(&self) -> AccountId {
        self.ledger
    }

    pub fn team_wallet(&self) -> AccountId {
        self.team_wallet
    }

    pub fn state(&self) -> CampaignState {
        self.state
    }

    /// Campaign start time; defined once the campaign has started.
    pub fn start_at(&self) -> Option<Timestamp> {
        (self.state != CampaignState::Inactive).then_some(self.start_at)
    }

    /// Campaign deadline; defined once the campaign has started.
    pub fn end_at(&self) -> Option<Timestamp> {
        (self.state != CampaignState::Inactive).then_some(self.end_at)
    }

    pub fn low_cap_total(&self) -> Amount {
        self.low_cap_total
    }

    pub fn hard_cap_total(&self) -> Amount {
        self.hard_cap_total
    }

    pub fn low_cap_per_tx(&self) -> Amount {
        self.low_cap_per_tx
    }

    pub fn hard_cap_per_tx(&self) -> Amount {
        self.hard_cap_per_tx
    }

    pub fn collected_total(&self) -> Amount {
        self.collected_total
    }

    pub fn allow_list_enabled(&self) -> bool {
        self.allow_list_enabled
    }

    pub fn is_allow_listed(&self, investor: AccountId) -> bool {
        self.allow_list.contains(&investor)
    }

    pub fn exchange_ratio(&self) -> Amount {
        self.exchange_ratio
    }

    pub fn bonus_schedule(&self) -> &BonusSchedule {
        &self.bonus_schedule
    }

    pub fn events(&self) -> &[CampaignEvent] {
        &self.events
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<CampaignEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Inactive → Active. Records `now` as the bonus-schedule anchor.
    pub fn start(&mut self, ctx: CallContext, end_at: Timestamp) -> ProtocolResult<()> {
        self.require_not_terminal("start")?;
        self.require_owner(ctx.caller)?;
        if self.state != CampaignState::Inactive {
            return Err(ProtocolError::InvalidStateTransition {
                from: self.state,
                op: "start",
            });
        }
        if end_at <= ctx.now {
            return Err(ProtocolError::EndDateNotInFuture {
                end_at,
                now: ctx.now,
            });
        }
        self.start_at = ctx.now;
        self.end_at = end_at;
        self.set_state(CampaignState::Active);
        info!(start_at = self.start_at, end_at, "campaign started");
        Ok(())
    }

    /// Active → Suspended.
    pub fn suspend(&mut self, ctx: CallContext) -> ProtocolResult<()> {
        self.require_not_terminal("suspend")?;
        self.require_owner(ctx.caller)?;
        if self.state != CampaignState::Active {
            return Err(ProtocolError::InvalidStateTransition {
                from: self.state,
                op: "suspend",
            });
        }
        self.set_state(CampaignState::Suspended);
        info!("campaign suspended");
        Ok(())
    }

    /// Suspended → Active.
    pub fn resume(&mut self, ctx: CallContext) -> ProtocolResult<()> {
        self.require_not_terminal("resume")?;
        self.require_owner(ctx.caller)?;
        if self.state != CampaignState::Suspended {
            return Err(ProtocolError::InvalidStateTransition {
                from: self.state,
                op: "resume",
            });
        }
        self.set_state(CampaignState::Active);
        info!("campaign resumed");
        Ok(())
    }

    /// Adjust deadline and caps while Suspended. A zero argument
    /// leaves the corresponding field unchanged; the merged result
    /// must still be coherent.
    pub fn tune(
        &mut self,
        ctx: CallContext,
        end_at: Timestamp,
        low_cap_total: Amount,
        hard_cap_total: Amount,
        low_cap_per_tx: Amount,
        hard_cap_per_tx: Amount,
    ) -> ProtocolResult<()> {
        self.require_not_terminal("tune")?;
        self.require_owner(ctx.caller)?;
        if self.state != CampaignState::Suspended {
            return Err(ProtocolError::InvalidStateTransition {
                from: self.state,
                op: "tune",
            });
        }

        let new_end = if end_at != 0 { end_at } else { self.end_at };
        let new_low = if low_cap_total != 0 {
            low_cap_total
        } else {
            self.low_cap_total
        };
        let new_hard = if hard_cap_total != 0 {
            hard_cap_total
        } else {
            self.hard_cap_total
        };
        let new_low_tx = if low_cap_per_tx != 0 {
            low_cap_per_tx
        } else {
            self.low_cap_per_tx
        };
        let new_hard_tx = if hard_cap_per_tx != 0 {
            hard_cap_per_tx
        } else {
            self.hard_cap_per_tx
        };

        if end_at != 0 && new_end <= ctx.now {
            return Err(ProtocolError::EndDateNotInFuture {
                end_at: new_end,
                now: ctx.now,
            });
        }
        Self::validate_caps(new_low, new_hard, new_low_tx, new_hard_tx)?;
        if new_hard < self.collected_total {
            return Err(ProtocolError::InvalidParams(format!(
                "hard cap {new_hard} below collected total {}",
                self.collected_total
            )));
        }

        self.end_at = new_end;
        self.low_cap_total = new_low;
        self.hard_cap_total = new_hard;
        self.low_cap_per_tx = new_low_tx;
        self.hard_cap_per_tx = new_hard_tx;
        self.events.push(CampaignEvent::Tuned {
            end_at: new_end,
            low_cap_total: new_low,
            hard_cap_total: new_hard,
            low_cap_per_tx: new_low_tx,
            hard_cap_per_tx: new_hard_tx,
        });
        debug!(
            end_at = new_end,
            low_cap_total = new_low,
            hard_cap_total = new_hard,
            "campaign tuned"
        );
        Ok(())
    }

    /// Active or Suspended → Terminated. Irreversible.
    pub fn terminate(&mut self, ctx: CallContext) -> ProtocolResult<()> {
        self.require_not_terminal("terminate")?;
        self.require_owner(ctx.caller)?;
        if !matches!(self.state, CampaignState::Active | CampaignState::Suspended) {
            return Err(ProtocolError::InvalidStateTransition {
                from: self.state,
                op: "terminate",
            });
        }
        self.set_state(CampaignState::Terminated);
        info!(collected = self.collected_total, "campaign terminated");
        Ok(())
    }

    /// Re-evaluate time-driven completion. Callable by anyone in any
    /// non-terminal state; past the deadline an Active campaign flips
    /// to `Completed` when the low cap was met, `NotCompleted`
    /// otherwise. Returns the new state when a flip happened.
    pub fn touch(&mut self, ctx: CallContext) -> ProtocolResult<Option<CampaignState>> {
        self.require_not_terminal("touch")?;
        if self.state == CampaignState::Active && ctx.now > self.end_at {
            let outcome = if self.collected_total >= self.low_cap_total {
                CampaignState::Completed
            } else {
                CampaignState::NotCompleted
            };
            self.set_state(outcome);
            self.events.push(CampaignEvent::Completed {
                final_state: outcome,
                collected_total: self.collected_total,
            });
            info!(
                ?outcome,
                collected = self.collected_total,
                "campaign window closed"
            );
            return Ok(Some(outcome));
        }
        Ok(None)
    }

    // ========================================================================
    // Allow-list
    // ========================================================================

    pub fn whitelist(&mut self, ctx: CallContext, investor: AccountId) -> ProtocolResult<()> {
        self.require_not_terminal("update the allow-list of")?;
        self.require_owner(ctx.caller)?;
        if self.allow_list.insert(investor) {
            self.events.push(CampaignEvent::Whitelisted { investor });
        }
        Ok(())
    }

    pub fn blacklist(&mut self, ctx: CallContext, investor: AccountId) -> ProtocolResult<()> {
        self.require_not_terminal("update the allow-list of")?;
        self.require_owner(ctx.caller)?;
        if self.allow_list.remove(&investor) {
            self.events.push(CampaignEvent::Blacklisted { investor });
        }
        Ok(())
    }

    pub fn enable_whitelist(&mut self, ctx: CallContext) -> ProtocolResult<()> {
        self.require_not_terminal("update the allow-list of")?;
        self.require_owner(ctx.caller)?;
        if !self.allow_list_enabled {
            self.allow_list_enabled = true;
            self.events.push(CampaignEvent::WhitelistEnabled);
        }
        Ok(())
    }

    pub fn disable_whitelist(&mut self, ctx: CallContext) -> ProtocolResult<()> {
        self.require_not_terminal("update the allow-list of")?;
        self.require_owner(ctx.caller)?;
        if self.allow_list_enabled {
            self.allow_list_enabled = false;
            self.events.push(CampaignEvent::WhitelistDisabled);
        }
        Ok(())
    }

    // ========================================================================
    // Ownership
    // ========================================================================

    pub fn transfer_ownership(
        &mut self,
        ctx: CallContext,
        new_owner: AccountId,
    ) -> ProtocolResult<()> {
        self.require_not_terminal("transfer ownership of")?;
        self.require_owner(ctx.caller)?;
        if new_owner.is_zero() {
            return Err(ProtocolError::ZeroAccount { what: "new owner" });
        }
        let previous_owner = self.owner;
        self.owner = new_owner;
        self.events.push(CampaignEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    // ========================================================================
    // Investment
    // ========================================================================

    /// Accept an investment of `amount` base-currency units from
    /// `from`, crediting the bought tokens on `ledger`.
    ///
    /// All checks run before any mutation; the ledger credit is the
    /// single fallible step, so a refusal anywhere leaves both
    /// components exactly as they were.
    pub fn on_investment(
        &mut self,
        ctx: CallContext,
        ledger: &mut TokenLedger,
        from: AccountId,
        amount: Amount,
    ) -> ProtocolResult<InvestmentReceipt> {
        // 1. Funds are only accepted from a running, unexpired window.
        if self.state != CampaignState::Active {
            return Err(ProtocolError::NotAcceptingFunds { state: self.state });
        }
        if ctx.now > self.end_at {
            return Err(ProtocolError::WindowClosed {
                end_at: self.end_at,
                now: ctx.now,
            });
        }

        // 2. The host must hand over the ledger this campaign is
        //    bound to, not some other instance.
        if ledger.address() != self.ledger {
            return Err(ProtocolError::LedgerMismatch {
                expected: self.ledger,
                got: ledger.address(),
            });
        }

        // 3. Allow-list gate, when enabled.
        if self.allow_list_enabled && !self.allow_list.contains(&from) {
            return Err(ProtocolError::NotAllowListed { investor: from });
        }

        // 4. Per-investment bounds. Zero caps disable a bound.
        if amount == 0 {
            return Err(ProtocolError::ZeroInvestment);
        }
        if self.low_cap_per_tx != 0 && amount < self.low_cap_per_tx {
            return Err(ProtocolError::BelowInvestmentFloor {
                amount,
                floor: self.low_cap_per_tx,
            });
        }
        if self.hard_cap_per_tx != 0 && amount > self.hard_cap_per_tx {
            return Err(ProtocolError::AboveInvestmentCeiling {
                amount,
                ceiling: self.hard_cap_per_tx,
            });
        }

        // 5. Bonus tier for the elapsed campaign time.
        let elapsed = ctx.now.saturating_sub(self.start_at);
        let bonus_pct = self.bonus_schedule.bonus_pct_at(elapsed);

        // 6. Bonus-adjusted value, truncating division.
        let adjusted = amount
            .checked_mul(100 + bonus_pct as Amount)
            .ok_or(ProtocolError::Overflow)?
            / 100;

        // 7. Clamp to the aggregate hard cap; the remainder is refused
        //    rather than the whole investment.
        let headroom = self
            .hard_cap_total
            .checked_sub(self.collected_total)
            .ok_or(ProtocolError::Overflow)?;
        let invested = adjusted.min(headroom);
        let refund = adjusted - invested;

        // 8. Token conversion at the fixed exchange ratio.
        let tokens = invested
            .checked_mul(self.exchange_ratio)
            .ok_or(ProtocolError::Overflow)?;

        // 9. The ledger credit is the only fallible mutation; if the
        //    ledger refuses, this controller is untouched.
        let ledger_ctx = CallContext::new(self.address, ctx.now);
        ledger.credit_from_campaign(ledger_ctx, from, tokens)?;

        // 10. Commit, publish, and complete on exact hard-cap fill.
        self.collected_total += invested;
        self.events.push(CampaignEvent::Investment {
            investor: from,
            invested,
            tokens,
            bonus_pct,
        });
        debug!(investor = %from, invested, tokens, bonus_pct, "investment accepted");
        if self.collected_total == self.hard_cap_total {
            self.set_state(CampaignState::Completed);
            self.events.push(CampaignEvent::Completed {
                final_state: CampaignState::Completed,
                collected_total: self.collected_total,
            });
            info!(collected = self.collected_total, "hard cap reached");
        }

        Ok(InvestmentReceipt {
            investor: from,
            requested: amount,
            invested,
            refund,
            tokens,
            bonus_pct,
            team_wallet: self.team_wallet,
        })
    }

    // ========================================================================
    // Gates
    // ========================================================================

    /// Terminal campaigns refuse every write, whoever calls. Runs
    /// before authorization so the answer does not depend on caller.
    fn require_not_terminal(&self, op: &'static str) -> ProtocolResult<()> {
        if self.state.is_terminal() {
            return Err(ProtocolError::InvalidStateTransition {
                from: self.state,
                op,
            });
        }
        Ok(())
    }

    fn require_owner(&self, caller: AccountId) -> ProtocolResult<()> {
        if caller != self.owner {
            return Err(ProtocolError::NotOwner { caller });
        }
        Ok(())
    }

    fn set_state(&mut self, next: CampaignState) {
        self.state = next;
        self.events.push(CampaignEvent::StateChanged { state: next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_WEEK;
    use crate::error::ErrorKind;
    use crate::ledger::{ReservedPools, TokenConfig};

    const T0: Timestamp = 1_700_000_000;
    const WEEK: Timestamp = SECONDS_PER_WEEK;
    const LOW_CAP: Amount = 100_000_000_000_000_000_000; // 100e18
    const HARD_CAP: Amount = 1_500_000_000_000_000_000_000; // 1500e18

    fn addr(byte: u8) -> AccountId {
        AccountId::new([byte; 20])
    }

    fn owner() -> AccountId {
        addr(1)
    }

    fn ctx(caller: AccountId, now: Timestamp) -> CallContext {
        CallContext::new(caller, now)
    }

    fn big_config() -> TokenConfig {
        TokenConfig {
            name: "Otcrit token".to_string(),
            symbol: "OTC".to_string(),
            decimals: 18,
            total_supply: u128::MAX / 2,
            reserved: ReservedPools::default(),
        }
    }

    /// Ledger with a huge unallocated pool plus a wired campaign.
    fn setup() -> (TokenLedger, Campaign) {
        let mut ledger = TokenLedger::new(addr(0xAA), owner(), big_config()).unwrap();
        let campaign = Campaign::new(
            addr(0xC0),
            owner(),
            ledger.address(),
            CampaignParams::with_caps(addr(0x77), LOW_CAP, HARD_CAP, 0, 0),
        )
        .unwrap();
        ledger
            .change_campaign(ctx(owner(), T0), campaign.address())
            .unwrap();
        (ledger, campaign)
    }

    fn started() -> (TokenLedger, Campaign) {
        let (ledger, mut campaign) = setup();
        campaign.start(ctx(owner(), T0), T0 + 4 * WEEK).unwrap();
        (ledger, campaign)
    }

    #[test]
    fn starts_only_from_inactive_with_future_deadline() {
        let (_, mut campaign) = setup();
        assert_eq!(campaign.state(), CampaignState::Inactive);
        assert_eq!(campaign.start_at(), None);

        let err = campaign.start(ctx(owner(), T0), T0).unwrap_err();
        assert!(matches!(err, ProtocolError::EndDateNotInFuture { .. }));

        campaign.start(ctx(owner(), T0), T0 + WEEK).unwrap();
        assert_eq!(campaign.state(), CampaignState::Active);
        assert_eq!(campaign.start_at(), Some(T0));
        assert_eq!(campaign.end_at(), Some(T0 + WEEK));

        let err = campaign.start(ctx(owner(), T0), T0 + WEEK).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CampaignNotAcceptingFunds);
    }

    #[test]
    fn start_rejects_non_owner() {
        let (_, mut campaign) = setup();
        let err = campaign.start(ctx(addr(9), T0), T0 + WEEK).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(campaign.state(), CampaignState::Inactive);
    }

    #[test]
    fn suspend_resume_cycle() {
        let (_, mut campaign) = started();
        campaign.suspend(ctx(owner(), T0 + 10)).unwrap();
        assert_eq!(campaign.state(), CampaignState::Suspended);
        campaign.resume(ctx(owner(), T0 + 20)).unwrap();
        assert_eq!(campaign.state(), CampaignState::Active);

        let err = campaign.resume(ctx(owner(), T0 + 30)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CampaignNotAcceptingFunds);
    }

    #[test]
    fn tier_one_investment_math() {
        let (mut ledger, mut campaign) = started();
        let investor = addr(0x20);

        let receipt = campaign
            .on_investment(ctx(investor, T0 + 100), &mut ledger, investor, 5_000)
            .unwrap();
        assert_eq!(receipt.bonus_pct, 15);
        assert_eq!(receipt.invested, 5_000 * 115 / 100);
        assert_eq!(receipt.tokens, receipt.invested * 5_000);
        assert_eq!(receipt.refund, 0);
        assert_eq!(campaign.collected_total(), 5_750);
        assert_eq!(ledger.balance_of(investor), 28_750_000);
        assert!(ledger.conservation_holds());
    }

    #[test]
    fn bonus_decays_with_elapsed_time() {
        let (mut ledger, mut campaign) = started();
        let investor = addr(0x20);

        let r1 = campaign
            .on_investment(ctx(investor, T0 + WEEK + 1), &mut ledger, investor, 1_000)
            .unwrap();
        assert_eq!(r1.bonus_pct, 10);
        assert_eq!(r1.invested, 1_100);

        let r2 = campaign
            .on_investment(
                ctx(investor, T0 + 3 * WEEK + 1),
                &mut ledger,
                investor,
                1_000,
            )
            .unwrap();
        assert_eq!(r2.bonus_pct, 0);
        assert_eq!(r2.invested, 1_000);
    }

    #[test]
    fn bonus_value_truncates() {
        let (mut ledger, mut campaign) = started();
        let investor = addr(0x20);
        // 33 * 115 / 100 = 37.95, truncated to 37
        let receipt = campaign
            .on_investment(ctx(investor, T0 + 1), &mut ledger, investor, 33)
            .unwrap();
        assert_eq!(receipt.invested, 37);
    }

    #[test]
    fn rejects_investment_outside_active_state() {
        let (mut ledger, mut campaign) = started();
        campaign.suspend(ctx(owner(), T0 + 10)).unwrap();
        let err = campaign
            .on_investment(ctx(addr(0x20), T0 + 20), &mut ledger, addr(0x20), 100)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CampaignNotAcceptingFunds);
        assert_eq!(campaign.collected_total(), 0);
    }

    #[test]
    fn rejects_investment_past_deadline() {
        let (mut ledger, mut campaign) = started();
        let late = T0 + 4 * WEEK + 1;
        let err = campaign
            .on_investment(ctx(addr(0x20), late), &mut ledger, addr(0x20), 100)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::WindowClosed { .. }));
        assert_eq!(err.kind(), ErrorKind::CampaignNotAcceptingFunds);
    }

    #[test]
    fn per_tx_caps_bound_each_investment() {
        let (mut ledger, mut campaign) = setup();
        campaign
            .tune(ctx(owner(), T0), 0, 0, 0, 0, 0)
            .unwrap_err(); // not suspended yet, sanity
        campaign.start(ctx(owner(), T0), T0 + WEEK).unwrap();
        campaign.suspend(ctx(owner(), T0)).unwrap();
        campaign
            .tune(ctx(owner(), T0), 0, 0, 0, 100, 10_000)
            .unwrap();
        campaign.resume(ctx(owner(), T0)).unwrap();

        let err = campaign
            .on_investment(ctx(addr(0x20), T0 + 1), &mut ledger, addr(0x20), 99)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        let err = campaign
            .on_investment(ctx(addr(0x20), T0 + 1), &mut ledger, addr(0x20), 10_001)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        campaign
            .on_investment(ctx(addr(0x20), T0 + 1), &mut ledger, addr(0x20), 100)
            .unwrap();
        assert_eq!(campaign.collected_total(), 115);
    }

    #[test]
    fn zero_investment_is_rejected() {
        let (mut ledger, mut campaign) = started();
        let err = campaign
            .on_investment(ctx(addr(0x20), T0 + 1), &mut ledger, addr(0x20), 0)
            .unwrap_err();
        assert_eq!(err, ProtocolError::ZeroInvestment);
    }

    #[test]
    fn hard_cap_clamps_and_completes() {
        let (mut ledger, mut campaign) = setup();
        campaign.start(ctx(owner(), T0), T0 + 10 * WEEK).unwrap();
        // past every bonus tier so figures stay round
        let now = T0 + 4 * WEEK;
        let investor = addr(0x20);

        campaign
            .on_investment(ctx(investor, now), &mut ledger, investor, HARD_CAP - 100)
            .unwrap();
        assert_eq!(campaign.state(), CampaignState::Active);

        let receipt = campaign
            .on_investment(ctx(investor, now), &mut ledger, investor, 500)
            .unwrap();
        assert_eq!(receipt.invested, 100);
        assert_eq!(receipt.refund, 400);
        assert_eq!(receipt.tokens, 100 * 5_000);
        assert_eq!(campaign.collected_total(), HARD_CAP);
        assert_eq!(campaign.state(), CampaignState::Completed);
        assert!(campaign
            .events()
            .iter()
            .any(|e| matches!(e, CampaignEvent::Completed { final_state: CampaignState::Completed, .. })));
        assert!(ledger.conservation_holds());

        // terminal now; further investments bounce
        let err = campaign
            .on_investment(ctx(investor, now), &mut ledger, investor, 1)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CampaignNotAcceptingFunds);
    }

    #[test]
    fn allow_list_gates_investment() {
        let (mut ledger, mut campaign) = started();
        let insider = addr(0x20);
        let outsider = addr(0x21);
        campaign.whitelist(ctx(owner(), T0), insider).unwrap();
        campaign.enable_whitelist(ctx(owner(), T0)).unwrap();

        let err = campaign
            .on_investment(ctx(outsider, T0 + 1), &mut ledger, outsider, 100)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(campaign.collected_total(), 0);
        assert_eq!(ledger.balance_of(outsider), 0);

        campaign
            .on_investment(ctx(insider, T0 + 1), &mut ledger, insider, 100)
            .unwrap();

        // removal takes effect immediately
        campaign.blacklist(ctx(owner(), T0), insider).unwrap();
        let err = campaign
            .on_investment(ctx(insider, T0 + 2), &mut ledger, insider, 100)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        // disabling the list reopens the gate
        campaign.disable_whitelist(ctx(owner(), T0)).unwrap();
        campaign
            .on_investment(ctx(outsider, T0 + 3), &mut ledger, outsider, 100)
            .unwrap();
    }

    #[test]
    fn touch_completes_when_low_cap_met() {
        let (mut ledger, mut campaign) = started();
        let investor = addr(0x20);
        campaign
            .on_investment(ctx(investor, T0 + 4 * WEEK - 10), &mut ledger, investor, LOW_CAP)
            .unwrap();
        assert!(campaign.collected_total() >= campaign.low_cap_total());

        let flipped = campaign.touch(ctx(addr(0x99), T0 + 4 * WEEK + 1)).unwrap();
        assert_eq!(flipped, Some(CampaignState::Completed));
        assert_eq!(campaign.state(), CampaignState::Completed);
    }

    #[test]
    fn touch_fails_short_campaigns() {
        let (_, mut campaign) = started();
        let flipped = campaign.touch(ctx(addr(0x99), T0 + 4 * WEEK + 1)).unwrap();
        assert_eq!(flipped, Some(CampaignState::NotCompleted));
        assert_eq!(campaign.state(), CampaignState::NotCompleted);
    }

    #[test]
    fn touch_before_deadline_is_a_no_op() {
        let (_, mut campaign) = started();
        let flipped = campaign.touch(ctx(addr(0x99), T0 + 10)).unwrap();
        assert_eq!(flipped, None);
        assert_eq!(campaign.state(), CampaignState::Active);
    }

    #[test]
    fn touch_ignores_suspended_campaigns_past_deadline() {
        let (_, mut campaign) = started();
        campaign.suspend(ctx(owner(), T0 + 10)).unwrap();
        let flipped = campaign.touch(ctx(addr(0x99), T0 + 4 * WEEK + 1)).unwrap();
        assert_eq!(flipped, None);
        assert_eq!(campaign.state(), CampaignState::Suspended);
    }

    #[test]
    fn terminate_is_irreversible() {
        let (_, mut campaign) = started();
        campaign.terminate(ctx(owner(), T0 + 10)).unwrap();
        assert_eq!(campaign.state(), CampaignState::Terminated);
        let err = campaign.resume(ctx(owner(), T0 + 20)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CampaignNotAcceptingFunds);
    }

    #[test]
    fn terminal_states_refuse_every_mutation() {
        let (mut ledger, mut campaign) = started();
        campaign.terminate(ctx(owner(), T0 + 10)).unwrap();

        let now = T0 + 20;
        let calls: Vec<ProtocolError> = vec![
            campaign.start(ctx(owner(), now), now + WEEK).unwrap_err(),
            campaign.suspend(ctx(owner(), now)).unwrap_err(),
            campaign.resume(ctx(owner(), now)).unwrap_err(),
            campaign.tune(ctx(owner(), now), 0, 0, 0, 0, 0).unwrap_err(),
            campaign.terminate(ctx(owner(), now)).unwrap_err(),
            campaign.touch(ctx(owner(), now)).unwrap_err(),
            campaign.whitelist(ctx(owner(), now), addr(5)).unwrap_err(),
            campaign.blacklist(ctx(owner(), now), addr(5)).unwrap_err(),
            campaign.enable_whitelist(ctx(owner(), now)).unwrap_err(),
            campaign.disable_whitelist(ctx(owner(), now)).unwrap_err(),
            campaign.transfer_ownership(ctx(owner(), now), addr(5)).unwrap_err(),
            campaign
                .on_investment(ctx(addr(0x20), now), &mut ledger, addr(0x20), 1)
                .unwrap_err(),
        ];
        for err in calls {
            assert_eq!(err.kind(), ErrorKind::CampaignNotAcceptingFunds, "{err}");
        }

        // even a non-owner gets the lifecycle answer, not Unauthorized
        let err = campaign.suspend(ctx(addr(9), now)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CampaignNotAcceptingFunds);
    }

    #[test]
    fn tune_merges_only_nonzero_fields() {
        let (_, mut campaign) = started();
        campaign.suspend(ctx(owner(), T0 + 10)).unwrap();
        campaign
            .tune(ctx(owner(), T0 + 10), T0 + 8 * WEEK, 0, 0, 0, 0)
            .unwrap();
        assert_eq!(campaign.end_at(), Some(T0 + 8 * WEEK));
        assert_eq!(campaign.low_cap_total(), LOW_CAP);
        assert_eq!(campaign.hard_cap_total(), HARD_CAP);
    }

    #[test]
    fn tune_rejects_incoherent_caps() {
        let (_, mut campaign) = started();
        campaign.suspend(ctx(owner(), T0 + 10)).unwrap();
        // low above hard
        let err = campaign
            .tune(ctx(owner(), T0 + 10), 0, HARD_CAP, LOW_CAP, 0, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        // deadline in the past
        let err = campaign
            .tune(ctx(owner(), T0 + 10), T0 + 5, 0, 0, 0, 0)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::EndDateNotInFuture { .. }));
        assert_eq!(campaign.end_at(), Some(T0 + 4 * WEEK));
    }

    #[test]
    fn tune_cannot_drop_hard_cap_below_collected() {
        let (mut ledger, mut campaign) = started();
        let investor = addr(0x20);
        campaign
            .on_investment(ctx(investor, T0 + 4 * WEEK - 10), &mut ledger, investor, 1_000)
            .unwrap();
        campaign.suspend(ctx(owner(), T0 + 4 * WEEK - 5)).unwrap();
        let err = campaign
            .tune(ctx(owner(), T0 + 4 * WEEK - 5), 0, 0, 500, 0, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    }

    #[test]
    fn failed_investment_leaves_both_components_unchanged() {
        // a ledger too small to honor the token conversion
        let tiny = TokenConfig {
            name: "Tiny".to_string(),
            symbol: "TNY".to_string(),
            decimals: 18,
            total_supply: 10,
            reserved: ReservedPools::default(),
        };
        let mut ledger = TokenLedger::new(addr(0xAB), owner(), tiny).unwrap();
        let mut campaign = Campaign::new(
            addr(0xC0),
            owner(),
            ledger.address(),
            CampaignParams::with_caps(addr(0x77), LOW_CAP, HARD_CAP, 0, 0),
        )
        .unwrap();
        ledger
            .change_campaign(ctx(owner(), T0), campaign.address())
            .unwrap();
        campaign.start(ctx(owner(), T0), T0 + WEEK).unwrap();

        let err = campaign
            .on_investment(ctx(addr(0x20), T0 + 1), &mut ledger, addr(0x20), 5_000)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(campaign.collected_total(), 0);
        assert_eq!(campaign.state(), CampaignState::Active);
        assert_eq!(ledger.available_supply(), 10);
        assert_eq!(ledger.balance_of(addr(0x20)), 0);
        assert!(ledger.conservation_holds());
    }

    #[test]
    fn rejects_a_foreign_ledger() {
        let (_ledger, mut campaign) = started();
        let mut foreign = TokenLedger::new(addr(0xAB), owner(), big_config()).unwrap();
        foreign
            .change_campaign(ctx(owner(), T0), campaign.address())
            .unwrap();
        let err = campaign
            .on_investment(ctx(addr(0x20), T0 + 1), &mut foreign, addr(0x20), 100)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::LedgerMismatch { .. }));
        assert_eq!(campaign.collected_total(), 0);
    }

    #[test]
    fn constructor_rejects_bad_params() {
        let err = Campaign::new(
            addr(0xC0),
            owner(),
            addr(0xAA),
            CampaignParams::with_caps(AccountId::ZERO, LOW_CAP, HARD_CAP, 0, 0),
        )
        .unwrap_err();
        assert!(matches!(err, ProtocolError::ZeroAccount { .. }));

        let err = Campaign::new(
            addr(0xC0),
            owner(),
            addr(0xAA),
            CampaignParams::with_caps(addr(0x77), HARD_CAP, LOW_CAP, 0, 0),
        )
        .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidParams(_)));

        let err = Campaign::new(
            addr(0xC0),
            owner(),
            addr(0xAA),
            CampaignParams::with_caps(addr(0x77), LOW_CAP, HARD_CAP, 200, 100),
        )
        .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidParams(_)));
    }
}
