/*!
Deterministic construction and wiring of a complete sale.

Component addresses are derived from the configuration rather than
chosen by the caller, so the same document always lands on the same
ledger and campaign identities. Wiring order matters: the ledger
exists first, the campaign is bound to it, then the ledger grants the
campaign its credit capability.
*/

use sha2::{Digest, Sha256};
use tracing::info;

use tranche_protocol::{AccountId, CallContext, Campaign, Timestamp, TokenLedger};

use crate::config::SaleConfig;
use crate::errors::SdkResult;

pub const LEDGER_NAMESPACE: &str = "tranche:ledger";
pub const CAMPAIGN_NAMESPACE: &str = "tranche:campaign";

/// Derive a component address from a namespace and seed bytes.
///
/// First 20 bytes of `SHA-256(namespace || 0x00 || seed)`.
pub fn derive_address(namespace: &str, seed: &[u8]) -> AccountId {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0u8]);
    hasher.update(seed);
    let digest = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[..20]);
    AccountId::new(bytes)
}

/// Address of the ledger a configuration deploys to.
pub fn ledger_address(config: &SaleConfig) -> AccountId {
    let mut seed = config.owner.as_bytes().to_vec();
    seed.extend_from_slice(config.token.symbol.as_bytes());
    derive_address(LEDGER_NAMESPACE, &seed)
}

/// Address of the campaign controller bound to that ledger.
pub fn campaign_address(config: &SaleConfig) -> AccountId {
    derive_address(CAMPAIGN_NAMESPACE, ledger_address(config).as_bytes())
}

/// A fully wired sale: ledger plus campaign, capability granted,
/// allow-list applied. The campaign is still `Inactive`; starting it
/// is the owner's call.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub ledger: TokenLedger,
    pub campaign: Campaign,
}

pub fn deploy_sale(config: &SaleConfig, now: Timestamp) -> SdkResult<Deployment> {
    let resolved = config.resolve()?;
    let owner = resolved.owner;
    let ledger_addr = ledger_address(config);
    let campaign_addr = campaign_address(config);

    let mut ledger = TokenLedger::new(ledger_addr, owner, resolved.token)?;
    let mut campaign = Campaign::new(campaign_addr, owner, ledger_addr, resolved.campaign)?;

    let ctx = CallContext::new(owner, now);
    ledger.change_campaign(ctx, campaign_addr)?;
    for investor in &resolved.investors {
        campaign.whitelist(ctx, *investor)?;
    }
    if resolved.allow_list_enabled {
        campaign.enable_whitelist(ctx)?;
    }

    info!(ledger = %ledger_addr, campaign = %campaign_addr, "sale deployed");
    Ok(Deployment { ledger, campaign })
}
