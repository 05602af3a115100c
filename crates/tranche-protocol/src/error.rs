/*!
Error types shared by the ledger and campaign components.

Variants carry the figures a caller needs to act on the failure.
[`ProtocolError::kind`] folds them into the four coarse classes the
public surface promises, so integrators can branch without matching
every variant.
*/

use thiserror::Error;

use crate::campaign::CampaignState;
use crate::ledger::ReservedGroup;
use crate::types::{AccountId, Amount, Timestamp};

pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("caller {caller} is not the owner")]
    NotOwner { caller: AccountId },

    #[error("caller {caller} is not the wired campaign controller")]
    NotCampaign { caller: AccountId },

    #[error("investor {investor} is not on the allow-list")]
    NotAllowListed { investor: AccountId },

    #[error("ledger is locked")]
    LedgerLocked,

    #[error("campaign is not accepting funds in state {state:?}")]
    NotAcceptingFunds { state: CampaignState },

    #[error("campaign window closed at {end_at}, now is {now}")]
    WindowClosed { end_at: Timestamp, now: Timestamp },

    #[error("cannot {op} a campaign in state {from:?}")]
    InvalidStateTransition {
        from: CampaignState,
        op: &'static str,
    },

    #[error("end date {end_at} is not in the future (now {now})")]
    EndDateNotInFuture { end_at: Timestamp, now: Timestamp },

    #[error("reserved bucket {group:?} holds {remaining}, cannot distribute {requested}")]
    ReservedBucketExceeded {
        group: ReservedGroup,
        requested: Amount,
        remaining: Amount,
    },

    #[error("unallocated supply {remaining} cannot cover {requested}")]
    UnallocatedSupplyExceeded { requested: Amount, remaining: Amount },

    #[error("account {account} holds {have}, needs {need}")]
    InsufficientBalance {
        account: AccountId,
        have: Amount,
        need: Amount,
    },

    #[error("allowance from {owner} to {spender} is {have}, needs {need}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        have: Amount,
        need: Amount,
    },

    #[error("investment of {amount} is below the per-investment floor {floor}")]
    BelowInvestmentFloor { amount: Amount, floor: Amount },

    #[error("investment of {amount} is above the per-investment ceiling {ceiling}")]
    AboveInvestmentCeiling { amount: Amount, ceiling: Amount },

    #[error("zero-amount investment")]
    ZeroInvestment,

    #[error("reserved buckets total {reserved} exceeds total supply {total_supply}")]
    ReservedExceedsSupply {
        reserved: Amount,
        total_supply: Amount,
    },

    #[error("campaign is bound to ledger {expected}, got {got}")]
    LedgerMismatch { expected: AccountId, got: AccountId },

    #[error("{what} must not be the zero account")]
    ZeroAccount { what: &'static str },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("invalid bonus schedule: {0}")]
    InvalidSchedule(String),

    #[error("arithmetic overflow")]
    Overflow,
}

/// Coarse failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller identity failed a gate (owner, campaign, allow-list).
    Unauthorized,
    /// The ledger is locked and the caller is not privileged.
    LedgerLocked,
    /// The call is valid in principle but the campaign lifecycle
    /// state disallows it right now.
    CampaignNotAcceptingFunds,
    /// Accepting the call would corrupt a ledger or campaign invariant.
    InvariantViolation,
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        use ProtocolError::*;
        match self {
            NotOwner { .. } | NotCampaign { .. } | NotAllowListed { .. } => ErrorKind::Unauthorized,
            LedgerLocked => ErrorKind::LedgerLocked,
            NotAcceptingFunds { .. } | WindowClosed { .. } | InvalidStateTransition { .. } => {
                ErrorKind::CampaignNotAcceptingFunds
            }
            EndDateNotInFuture { .. }
            | ReservedBucketExceeded { .. }
            | UnallocatedSupplyExceeded { .. }
            | InsufficientBalance { .. }
            | InsufficientAllowance { .. }
            | BelowInvestmentFloor { .. }
            | AboveInvestmentCeiling { .. }
            | ZeroInvestment
            | ReservedExceedsSupply { .. }
            | LedgerMismatch { .. }
            | ZeroAccount { .. }
            | InvalidParams(_)
            | InvalidSchedule(_)
            | Overflow => ErrorKind::InvariantViolation,
        }
    }
}
