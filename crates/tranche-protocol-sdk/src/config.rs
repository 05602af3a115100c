/*!
Sale configuration: one YAML document describing the token ledger and
the campaign that sells it.

```yaml
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
  low_cap_per_tx: "0"
  hard_cap_per_tx: "0"
  exchange_ratio: 5000
  bonus_tiers:
    - { starts_at_secs: 0, bonus_pct: 15 }
    - { starts_at_secs: 604800, bonus_pct: 10 }
  allow_list:
    enabled: true
    investors:
      - "0x2020202020202020202020202020202020202020"
```

Amounts are strings in the notation of [`crate::amounts::parse_amount`].
[`SaleConfig::resolve`] turns the document into core construction
parameters, rejecting incoherent figures before anything is built.
*/

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tranche_protocol::constants::{DEFAULT_EXCHANGE_RATIO, TOKEN_DECIMALS};
use tranche_protocol::{
    AccountId, Amount, BonusSchedule, BonusTier, CampaignParams, ReservedPools, TokenConfig,
};

use crate::amounts::parse_amount;
use crate::errors::{SdkError, SdkResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaleConfig {
    pub owner: AccountId,
    pub token: TokenSection,
    pub campaign: CampaignSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenSection {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    pub total_supply: String,
    #[serde(default)]
    pub reserved: ReservedSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ReservedSection {
    pub team: String,
    pub bounty: String,
    pub partners: String,
    pub others: String,
}

impl Default for ReservedSection {
    fn default() -> Self {
        ReservedSection {
            team: "0".to_string(),
            bounty: "0".to_string(),
            partners: "0".to_string(),
            others: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignSection {
    pub team_wallet: AccountId,
    pub low_cap_total: String,
    pub hard_cap_total: String,
    #[serde(default = "zero_amount")]
    pub low_cap_per_tx: String,
    #[serde(default = "zero_amount")]
    pub hard_cap_per_tx: String,
    #[serde(default = "default_exchange_ratio")]
    pub exchange_ratio: Amount,
    /// Overrides the stock weekly-decay schedule when present.
    #[serde(default)]
    pub bonus_tiers: Option<Vec<TierSection>>,
    #[serde(default)]
    pub allow_list: AllowListSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierSection {
    pub starts_at_secs: u64,
    pub bonus_pct: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AllowListSection {
    pub enabled: bool,
    pub investors: Vec<AccountId>,
}

fn default_decimals() -> u8 {
    TOKEN_DECIMALS
}

fn default_exchange_ratio() -> Amount {
    DEFAULT_EXCHANGE_RATIO
}

fn zero_amount() -> String {
    "0".to_string()
}

/// A [`SaleConfig`] with every amount parsed and every cross-field
/// check passed, ready to construct the components.
#[derive(Debug, Clone)]
pub struct ResolvedSale {
    pub owner: AccountId,
    pub token: TokenConfig,
    pub campaign: CampaignParams,
    pub allow_list_enabled: bool,
    pub investors: Vec<AccountId>,
}

impl SaleConfig {
    pub fn from_yaml_str(text: &str) -> SdkResult<SaleConfig> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_yaml_path(path: impl AsRef<Path>) -> SdkResult<SaleConfig> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse all amounts and run the cross-field checks the core
    /// constructors cannot see, most importantly solvency: the hard
    /// cap, fully converted to tokens, must fit in the unallocated
    /// supply, or late investments would start bouncing off the
    /// ledger mid-sale.
    pub fn resolve(&self) -> SdkResult<ResolvedSale> {
        let total_supply = amount_field("token.total_supply", &self.token.total_supply)?;
        let reserved = ReservedPools {
            team: amount_field("token.reserved.team", &self.token.reserved.team)?,
            bounty: amount_field("token.reserved.bounty", &self.token.reserved.bounty)?,
            partners: amount_field("token.reserved.partners", &self.token.reserved.partners)?,
            others: amount_field("token.reserved.others", &self.token.reserved.others)?,
        };
        let token = TokenConfig {
            name: self.token.name.clone(),
            symbol: self.token.symbol.clone(),
            decimals: self.token.decimals,
            total_supply,
            reserved,
        };

        let low_cap_total = amount_field("campaign.low_cap_total", &self.campaign.low_cap_total)?;
        let hard_cap_total =
            amount_field("campaign.hard_cap_total", &self.campaign.hard_cap_total)?;
        let low_cap_per_tx =
            amount_field("campaign.low_cap_per_tx", &self.campaign.low_cap_per_tx)?;
        let hard_cap_per_tx =
            amount_field("campaign.hard_cap_per_tx", &self.campaign.hard_cap_per_tx)?;

        let bonus_schedule = match &self.campaign.bonus_tiers {
            Some(tiers) => BonusSchedule::new(
                tiers
                    .iter()
                    .map(|t| BonusTier {
                        starts_at: t.starts_at_secs,
                        bonus_pct: t.bonus_pct,
                    })
                    .collect(),
            )?,
            None => BonusSchedule::default(),
        };

        let campaign = CampaignParams {
            team_wallet: self.campaign.team_wallet,
            low_cap_total,
            hard_cap_total,
            low_cap_per_tx,
            hard_cap_per_tx,
            exchange_ratio: self.campaign.exchange_ratio,
            bonus_schedule,
        };

        let reserved_total = token
            .reserved
            .checked_total()
            .ok_or_else(|| SdkError::InvalidConfig("reserved buckets overflow".to_string()))?;
        let unallocated = total_supply.checked_sub(reserved_total).ok_or_else(|| {
            SdkError::InvalidConfig(format!(
                "reserved buckets total {reserved_total} exceeds total supply {total_supply}"
            ))
        })?;
        let max_tokens_sold = hard_cap_total
            .checked_mul(self.campaign.exchange_ratio)
            .ok_or_else(|| {
                SdkError::InvalidConfig(
                    "hard cap times exchange ratio overflows 128 bits".to_string(),
                )
            })?;
        if max_tokens_sold > unallocated {
            return Err(SdkError::InvalidConfig(format!(
                "a fully subscribed campaign would sell {max_tokens_sold} tokens \
                 but only {unallocated} are unallocated"
            )));
        }

        debug!(
            total_supply,
            unallocated, hard_cap_total, "sale configuration resolved"
        );
        Ok(ResolvedSale {
            owner: self.owner,
            token,
            campaign,
            allow_list_enabled: self.campaign.allow_list.enabled,
            investors: self.campaign.allow_list.investors.clone(),
        })
    }
}

fn amount_field(field: &str, raw: &str) -> SdkResult<Amount> {
    parse_amount(raw).map_err(|e| SdkError::InvalidConfig(format!("{field}: {e}")))
}
