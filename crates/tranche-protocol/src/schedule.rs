/*!
Time-tiered early-investor bonus schedule.

A schedule is a list of `(offset, percent)` tiers anchored at the
campaign start. The tier whose offset is the largest one not exceeding
the elapsed time decides the bonus. Offsets must start at zero and
strictly increase; percentages must never increase, so early investors
always do at least as well as late ones.
*/

use crate::constants::DEFAULT_BONUS_TIERS;
use crate::error::{ProtocolError, ProtocolResult};
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusTier {
    /// Seconds after campaign start at which this tier takes effect.
    pub starts_at: Timestamp,
    /// Bonus applied to investments landing in this tier, in percent.
    pub bonus_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusSchedule {
    tiers: Vec<BonusTier>,
}

impl BonusSchedule {
    pub fn new(tiers: Vec<BonusTier>) -> ProtocolResult<Self> {
        if tiers.is_empty() {
            return Err(ProtocolError::InvalidSchedule(
                "schedule must hold at least one tier".into(),
            ));
        }
        if tiers[0].starts_at != 0 {
            return Err(ProtocolError::InvalidSchedule(
                "first tier must start at offset zero".into(),
            ));
        }
        for pair in tiers.windows(2) {
            if pair[1].starts_at <= pair[0].starts_at {
                return Err(ProtocolError::InvalidSchedule(format!(
                    "tier offsets must strictly increase, got {} then {}",
                    pair[0].starts_at, pair[1].starts_at
                )));
            }
            if pair[1].bonus_pct > pair[0].bonus_pct {
                return Err(ProtocolError::InvalidSchedule(format!(
                    "bonus must not increase over time, got {}% then {}%",
                    pair[0].bonus_pct, pair[1].bonus_pct
                )));
            }
        }
        if let Some(tier) = tiers.iter().find(|t| t.bonus_pct > 100) {
            return Err(ProtocolError::InvalidSchedule(format!(
                "bonus of {}% exceeds 100%",
                tier.bonus_pct
            )));
        }
        Ok(BonusSchedule { tiers })
    }

    /// Bonus percent for an investment `elapsed` seconds after start.
    pub fn bonus_pct_at(&self, elapsed: Timestamp) -> u8 {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.starts_at <= elapsed)
            .map(|t| t.bonus_pct)
            // first tier starts at zero, so some tier always matches
            .unwrap_or(0)
    }

    pub fn tiers(&self) -> &[BonusTier] {
        &self.tiers
    }
}

impl Default for BonusSchedule {
    /// The stock four-week decay: 15%, 10%, 5%, then no bonus.
    fn default() -> Self {
        let tiers = DEFAULT_BONUS_TIERS
            .iter()
            .map(|&(starts_at, bonus_pct)| BonusTier {
                starts_at,
                bonus_pct,
            })
            .collect();
        // the built-in tiers satisfy every constructor rule
        BonusSchedule { tiers }
    }
}
