/*!
In-memory sale fixture for scenario tests.

Wraps a deployed ledger/campaign pair with a controllable clock and
thin `try_*` wrappers over every operation, so scenarios read as a
sequence of calls and assertions rather than context plumbing. Time
only moves forward, matching the host model the components assume.
*/

use tranche_protocol::{
    AccountId, Amount, CallContext, Campaign, CampaignState, ErrorKind, InvestmentReceipt,
    ProtocolResult, ReservedGroup, Timestamp, TokenLedger,
};
use tranche_protocol_sdk::{deploy_sale, SaleConfig};

/// Assert that a call failed with the expected coarse error kind.
///
/// Panics with the context string and the actual outcome otherwise.
pub fn demand_error_kind<T: std::fmt::Debug>(
    result: ProtocolResult<T>,
    expected: ErrorKind,
    context: &str,
) {
    match result {
        Ok(value) => panic!("{context}: expected {expected:?}, got Ok({value:?})"),
        Err(err) => assert_eq!(err.kind(), expected, "{context}: got {err}"),
    }
}

/// Default fixture clock start.
pub const GENESIS: Timestamp = 1_700_000_000;

/// One week in seconds, the default bonus tier width.
pub const WEEK: Timestamp = 7 * 24 * 60 * 60;

/// 10^18, the base-unit scale of an 18-decimal token.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// The stock sale configuration used by most scenarios: 100M-token
/// supply at 18 decimals, the four reservation buckets, a 100/1500
/// base-currency cap window, and the default bonus schedule.
pub const DEFAULT_SALE_YAML: &str = r#"
owner: "0x0101010101010101010101010101010101010101"

token:
  name: Otcrit token
  symbol: OTC
  decimals: 18
  total_supply: "100_000_000e18"
  reserved:
    team: "10_000_000e18"
    bounty: "10_000_000e18"
    partners: "5_000_000e18"
    others: "5_000_000e18"

campaign:
  team_wallet: "0x7777777777777777777777777777777777777777"
  low_cap_total: "100e18"
  hard_cap_total: "1500e18"
"#;

/// Raw-integer variant of the stock sale. Same supply partition in
/// undivided units, with caps small enough that a fully subscribed
/// campaign still fits the unallocated pool.
pub const RAW_SALE_YAML: &str = r#"
owner: "0x0101010101010101010101010101010101010101"

token:
  name: Otcrit token
  symbol: OTC
  decimals: 0
  total_supply: "100_000_000"
  reserved:
    team: "10_000_000"
    bounty: "10_000_000"
    partners: "5_000_000"
    others: "5_000_000"

campaign:
  team_wallet: "0x7777777777777777777777777777777777777777"
  low_cap_total: "200"
  hard_cap_total: "1400"
"#;

/// Deterministic throwaway account.
pub fn test_account(byte: u8) -> AccountId {
    AccountId::new([byte; 20])
}

pub struct SaleFixture {
    pub ledger: TokenLedger,
    pub campaign: Campaign,
    owner: AccountId,
    now: Timestamp,
}

impl SaleFixture {
    /// Deploy the stock sale at [`GENESIS`].
    pub fn default_sale() -> Self {
        Self::from_yaml(DEFAULT_SALE_YAML)
    }

    /// Deploy the raw-integer sale at [`GENESIS`].
    pub fn raw_sale() -> Self {
        Self::from_yaml(RAW_SALE_YAML)
    }

    /// Deploy an arbitrary configuration at [`GENESIS`].
    pub fn from_yaml(yaml: &str) -> Self {
        let config = SaleConfig::from_yaml_str(yaml).expect("fixture config parses");
        let deployment = deploy_sale(&config, GENESIS).expect("fixture config deploys");
        SaleFixture {
            ledger: deployment.ledger,
            campaign: deployment.campaign,
            owner: config.owner,
            now: GENESIS,
        }
    }

    // ========================================================================
    // Clock and identity
    // ========================================================================

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Move the clock forward by `secs`.
    pub fn advance(&mut self, secs: u64) {
        self.now += secs;
    }

    /// Jump the clock to an absolute time, forward only.
    pub fn warp_to(&mut self, when: Timestamp) {
        assert!(when >= self.now, "time only moves forward in the fixture");
        self.now = when;
    }

    pub fn ctx(&self, caller: AccountId) -> CallContext {
        CallContext::new(caller, self.now)
    }

    pub fn owner_ctx(&self) -> CallContext {
        self.ctx(self.owner)
    }

    // ========================================================================
    // Campaign operations
    // ========================================================================

    pub fn try_start(&mut self, end_at: Timestamp) -> ProtocolResult<()> {
        self.campaign.start(self.owner_ctx(), end_at)
    }

    /// Start a four-week campaign ending at `GENESIS + 4 * WEEK`.
    pub fn start_default_window(&mut self) {
        self.try_start(self.now + 4 * WEEK).expect("campaign starts");
    }

    pub fn try_suspend(&mut self) -> ProtocolResult<()> {
        self.campaign.suspend(self.owner_ctx())
    }

    pub fn try_resume(&mut self) -> ProtocolResult<()> {
        self.campaign.resume(self.owner_ctx())
    }

    pub fn try_terminate(&mut self) -> ProtocolResult<()> {
        self.campaign.terminate(self.owner_ctx())
    }

    pub fn try_tune(
        &mut self,
        end_at: Timestamp,
        low_cap_total: Amount,
        hard_cap_total: Amount,
        low_cap_per_tx: Amount,
        hard_cap_per_tx: Amount,
    ) -> ProtocolResult<()> {
        self.campaign.tune(
            self.owner_ctx(),
            end_at,
            low_cap_total,
            hard_cap_total,
            low_cap_per_tx,
            hard_cap_per_tx,
        )
    }

    pub fn try_touch(&mut self) -> ProtocolResult<Option<CampaignState>> {
        // anyone may poke the campaign clock
        self.campaign.touch(self.ctx(test_account(0xFE)))
    }

    pub fn try_invest(
        &mut self,
        investor: AccountId,
        amount: Amount,
    ) -> ProtocolResult<InvestmentReceipt> {
        self.campaign
            .on_investment(self.ctx(investor), &mut self.ledger, investor, amount)
    }

    pub fn try_whitelist(&mut self, investor: AccountId) -> ProtocolResult<()> {
        self.campaign.whitelist(self.owner_ctx(), investor)
    }

    pub fn try_blacklist(&mut self, investor: AccountId) -> ProtocolResult<()> {
        self.campaign.blacklist(self.owner_ctx(), investor)
    }

    pub fn try_enable_whitelist(&mut self) -> ProtocolResult<()> {
        self.campaign.enable_whitelist(self.owner_ctx())
    }

    pub fn try_disable_whitelist(&mut self) -> ProtocolResult<()> {
        self.campaign.disable_whitelist(self.owner_ctx())
    }

    // ========================================================================
    // Ledger operations
    // ========================================================================

    pub fn try_assign_reserved(
        &mut self,
        to: AccountId,
        group: ReservedGroup,
        amount: Amount,
    ) -> ProtocolResult<()> {
        self.ledger
            .assign_reserved(self.owner_ctx(), to, group, amount)
    }

    pub fn try_lock(&mut self) -> ProtocolResult<()> {
        self.ledger.lock(self.owner_ctx())
    }

    pub fn try_unlock(&mut self) -> ProtocolResult<()> {
        self.ledger.unlock(self.owner_ctx())
    }

    pub fn try_transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        value: Amount,
    ) -> ProtocolResult<()> {
        self.ledger.transfer(self.ctx(from), to, value)
    }

    pub fn try_approve(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        value: Amount,
    ) -> ProtocolResult<()> {
        self.ledger.approve(self.ctx(owner), spender, value)
    }

    pub fn try_transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        value: Amount,
    ) -> ProtocolResult<()> {
        self.ledger.transfer_from(self.ctx(spender), from, to, value)
    }

    // ========================================================================
    // Assertions
    // ========================================================================

    /// Panic unless the ledger's conservation law holds.
    pub fn assert_conserved(&self) {
        assert!(
            self.ledger.conservation_holds(),
            "conservation law violated: total {} != unallocated {} + reserved + balances",
            self.ledger.total_supply(),
            self.ledger.available_supply(),
        );
    }
}
