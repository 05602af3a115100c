use crate::error::CliResult;
use std::path::PathBuf;
use tranche_protocol::ReservedGroup;
use tranche_protocol_sdk::{campaign_address, ledger_address, SaleConfig};

/// Validate a sale configuration and print the deployment summary
pub fn execute(config_path: PathBuf) -> CliResult<()> {
    println!("🔍 Validating sale configuration...");
    println!("Config file: {}", config_path.display());

    let config = SaleConfig::from_yaml_path(&config_path)?;
    let resolved = config.resolve()?;
    println!("✅ Configuration is valid");

    let reserved_total = [
        resolved.token.reserved.team,
        resolved.token.reserved.bounty,
        resolved.token.reserved.partners,
        resolved.token.reserved.others,
    ]
    .iter()
    .sum::<u128>();
    let unallocated = resolved.token.total_supply - reserved_total;

    println!("\n📊 Token: {} ({})", resolved.token.name, resolved.token.symbol);
    println!("  Decimals:        {}", resolved.token.decimals);
    println!("  Total supply:    {}", resolved.token.total_supply);
    println!(
        "  Reserved {:?}:    {}",
        ReservedGroup::Team,
        resolved.token.reserved.team
    );
    println!(
        "  Reserved {:?}:  {}",
        ReservedGroup::Bounty,
        resolved.token.reserved.bounty
    );
    println!(
        "  Reserved {:?}: {}",
        ReservedGroup::Partners,
        resolved.token.reserved.partners
    );
    println!(
        "  Reserved {:?}:  {}",
        ReservedGroup::Others,
        resolved.token.reserved.others
    );
    println!("  Unallocated:     {}", unallocated);

    let max_tokens_sold = resolved.campaign.hard_cap_total * resolved.campaign.exchange_ratio;
    println!("\n📊 Campaign");
    println!("  Team wallet:     {}", resolved.campaign.team_wallet);
    println!("  Low cap total:   {}", resolved.campaign.low_cap_total);
    println!("  Hard cap total:  {}", resolved.campaign.hard_cap_total);
    println!("  Low cap per tx:  {}", cap_or_unbounded(resolved.campaign.low_cap_per_tx));
    println!("  Hard cap per tx: {}", cap_or_unbounded(resolved.campaign.hard_cap_per_tx));
    println!("  Exchange ratio:  {} tokens per base unit", resolved.campaign.exchange_ratio);
    println!("  Max tokens sold: {} ({} unallocated)", max_tokens_sold, unallocated);
    println!("  Bonus tiers:     {}", resolved.campaign.bonus_schedule.tiers().len());
    if resolved.allow_list_enabled {
        println!("  Allow-list:      enabled, {} investors", resolved.investors.len());
    } else {
        println!("  Allow-list:      disabled");
    }

    println!("\n📊 Derived addresses");
    println!("  Owner:    {}", resolved.owner);
    println!("  Ledger:   {}", ledger_address(&config));
    println!("  Campaign: {}", campaign_address(&config));

    Ok(())
}

fn cap_or_unbounded(cap: u128) -> String {
    if cap == 0 {
        "unbounded".to_string()
    } else {
        cap.to_string()
    }
}
