use crate::error::{CliError, CliResult};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tranche_protocol_sdk::SaleConfig;

/// Print the bonus tier table for a hypothetical campaign start
pub fn execute(config_path: PathBuf, start: Option<String>) -> CliResult<()> {
    let config = SaleConfig::from_yaml_path(&config_path)?;
    let resolved = config.resolve()?;

    let start_at = match start {
        Some(raw) => parse_start(&raw)?,
        None => Utc::now().timestamp() as u64,
    };
    let start_dt = to_datetime(start_at)?;

    println!("📋 Bonus schedule for {}", config_path.display());
    println!("Campaign start: {} ({})", start_dt.to_rfc3339(), start_at);
    println!();
    println!("{:<12} {:<28} {:>6}", "offset", "takes effect", "bonus");

    for tier in resolved.campaign.bonus_schedule.tiers() {
        let at = to_datetime(start_at + tier.starts_at)?;
        println!(
            "{:<12} {:<28} {:>5}%",
            format_offset(tier.starts_at),
            at.to_rfc3339(),
            tier.bonus_pct
        );
    }

    println!();
    println!(
        "Exchange ratio: {} tokens per base unit before bonus",
        resolved.campaign.exchange_ratio
    );
    Ok(())
}

/// Accept either epoch seconds or an RFC3339 datetime.
fn parse_start(raw: &str) -> CliResult<u64> {
    if let Ok(epoch) = raw.parse::<u64>() {
        return Ok(epoch);
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| CliError::InvalidScript(format!("bad start time {raw:?}: {e}")))?;
    u64::try_from(parsed.timestamp())
        .map_err(|_| CliError::InvalidScript(format!("start time {raw:?} is before the epoch")))
}

fn to_datetime(epoch: u64) -> CliResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(epoch as i64, 0)
        .ok_or_else(|| CliError::InvalidScript(format!("timestamp {epoch} is out of range")))
}

fn format_offset(secs: u64) -> String {
    const DAY: u64 = 24 * 60 * 60;
    if secs == 0 {
        "start".to_string()
    } else if secs % DAY == 0 {
        format!("+{}d", secs / DAY)
    } else {
        format!("+{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_accepts_both_notations() {
        assert_eq!(parse_start("1700000000").unwrap(), 1_700_000_000);
        assert_eq!(
            parse_start("2023-11-14T22:13:20+00:00").unwrap(),
            1_700_000_000
        );
        assert!(parse_start("next tuesday").is_err());
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(0), "start");
        assert_eq!(format_offset(7 * 24 * 60 * 60), "+7d");
        assert_eq!(format_offset(90), "+90s");
    }
}
