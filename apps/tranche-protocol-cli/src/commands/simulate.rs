use crate::error::{CliError, CliResult};
use chrono::DateTime;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tranche_protocol::{
    AccountId, Amount, CallContext, Campaign, CampaignState, ReservedGroup, Timestamp, TokenLedger,
};
use tranche_protocol_sdk::{deploy_sale, parse_amount, Deployment, SaleConfig};

/// A scripted sale timeline: a deploy time plus ordered steps, each
/// with a time, a caller, an operation and an expectation.
#[derive(Debug, Deserialize)]
struct Script {
    genesis: String,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    at: String,

    /// "owner" or a 0x-hex account id; defaults to the owner.
    #[serde(default)]
    caller: Option<String>,

    /// When set, the step passing is the failure.
    #[serde(default)]
    must_fail: bool,

    #[serde(flatten)]
    op: ScriptOp,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum ScriptOp {
    Start {
        end_at: String,
    },
    Suspend,
    Resume,
    Terminate,
    Tune {
        #[serde(default)]
        end_at: Option<String>,
        #[serde(default)]
        low_cap_total: Option<String>,
        #[serde(default)]
        hard_cap_total: Option<String>,
        #[serde(default)]
        low_cap_per_tx: Option<String>,
        #[serde(default)]
        hard_cap_per_tx: Option<String>,
    },
    Touch,
    Invest {
        amount: String,
    },
    Whitelist {
        investor: String,
    },
    Blacklist {
        investor: String,
    },
    EnableWhitelist,
    DisableWhitelist,
    AssignReserved {
        to: String,
        group: String,
        amount: String,
    },
    Lock,
    Unlock,
    Transfer {
        to: String,
        value: String,
    },
    /// Assertion step: the campaign must be in this state right now.
    ExpectState {
        state: String,
    },
}

/// Run a scripted sale timeline against an in-memory deployment
pub fn execute(config_path: PathBuf, script_path: PathBuf, json_events: bool) -> CliResult<()> {
    println!("🚀 Simulating sale timeline...");
    println!("Config file: {}", config_path.display());
    println!("Script file: {}", script_path.display());

    let config = SaleConfig::from_yaml_path(&config_path)?;
    let script: Script = serde_yaml::from_str(&fs::read_to_string(&script_path)?)?;
    run_script(&config, &script, json_events)
}

fn run_script(config: &SaleConfig, script: &Script, json_events: bool) -> CliResult<()> {
    let genesis = parse_when(&script.genesis)?;
    let Deployment {
        mut ledger,
        mut campaign,
    } = deploy_sale(config, genesis)?;
    let owner = config.owner;

    println!("\n📋 Deployed at {}", genesis);
    println!("  Ledger:   {}", ledger.address());
    println!("  Campaign: {}", campaign.address());
    print_events(&mut ledger, &mut campaign, json_events)?;

    let mut now = genesis;
    for (index, step) in script.steps.iter().enumerate() {
        let step_no = index + 1;
        let at = parse_when(&step.at)?;
        if at < now {
            return Err(CliError::InvalidScript(format!(
                "step {step_no} happens at {at}, before {now}; time only moves forward"
            )));
        }
        now = at;

        // assertion steps are about the script, not the protocol
        if let ScriptOp::ExpectState { state } = &step.op {
            let expected = parse_state(state)?;
            if campaign.state() != expected {
                return Err(CliError::Simulation(format!(
                    "step {step_no}: expected state {expected:?}, found {:?}",
                    campaign.state()
                )));
            }
            println!("✅ step {step_no} at {now}: state is {expected:?}");
            continue;
        }

        let caller = match &step.caller {
            Some(raw) => resolve_account(raw, owner)?,
            None => owner,
        };
        let ctx = CallContext::new(caller, now);

        match (apply_op(&step.op, ctx, &mut ledger, &mut campaign)?, step.must_fail) {
            (Ok(summary), false) => println!("✅ step {step_no} at {now}: {summary}"),
            (Ok(summary), true) => {
                return Err(CliError::Simulation(format!(
                    "step {step_no} was expected to fail, but: {summary}"
                )));
            }
            (Err(err), true) => println!("⚠️  step {step_no} at {now}: failed as expected: {err}"),
            (Err(err), false) => {
                return Err(CliError::Simulation(format!("step {step_no} failed: {err}")));
            }
        }
        print_events(&mut ledger, &mut campaign, json_events)?;
    }

    println!("\n📊 Final state");
    println!("  Campaign state:  {:?}", campaign.state());
    println!("  Collected total: {}", campaign.collected_total());
    println!("  Unallocated:     {}", ledger.available_supply());
    if !ledger.conservation_holds() {
        return Err(CliError::Simulation(
            "conservation law violated after the final step".to_string(),
        ));
    }
    println!("✅ Conservation law holds");
    Ok(())
}

type OpOutcome = Result<String, tranche_protocol::ProtocolError>;

fn apply_op(
    op: &ScriptOp,
    ctx: CallContext,
    ledger: &mut TokenLedger,
    campaign: &mut Campaign,
) -> CliResult<OpOutcome> {
    let owner = ledger.owner();
    let outcome = match op {
        ScriptOp::Start { end_at } => {
            let end = parse_when(end_at)?;
            campaign
                .start(ctx, end)
                .map(|()| format!("started, window closes at {end}"))
        }
        ScriptOp::Suspend => campaign.suspend(ctx).map(|()| "suspended".to_string()),
        ScriptOp::Resume => campaign.resume(ctx).map(|()| "resumed".to_string()),
        ScriptOp::Terminate => campaign.terminate(ctx).map(|()| "terminated".to_string()),
        ScriptOp::Tune {
            end_at,
            low_cap_total,
            hard_cap_total,
            low_cap_per_tx,
            hard_cap_per_tx,
        } => {
            let end = match end_at {
                Some(raw) => parse_when(raw)?,
                None => 0,
            };
            campaign
                .tune(
                    ctx,
                    end,
                    opt_amount(low_cap_total)?,
                    opt_amount(hard_cap_total)?,
                    opt_amount(low_cap_per_tx)?,
                    opt_amount(hard_cap_per_tx)?,
                )
                .map(|()| "tuned".to_string())
        }
        ScriptOp::Touch => campaign.touch(ctx).map(|flip| match flip {
            Some(state) => format!("touched, state now {state:?}"),
            None => "touched, no change".to_string(),
        }),
        ScriptOp::Invest { amount } => {
            let amount = script_amount(amount)?;
            campaign
                .on_investment(ctx, ledger, ctx.caller, amount)
                .map(|r| {
                    format!(
                        "invested {} (+{}% bonus), {} tokens granted, refund {}",
                        r.invested, r.bonus_pct, r.tokens, r.refund
                    )
                })
        }
        ScriptOp::Whitelist { investor } => {
            let investor = resolve_account(investor, owner)?;
            campaign
                .whitelist(ctx, investor)
                .map(|()| format!("whitelisted {investor}"))
        }
        ScriptOp::Blacklist { investor } => {
            let investor = resolve_account(investor, owner)?;
            campaign
                .blacklist(ctx, investor)
                .map(|()| format!("blacklisted {investor}"))
        }
        ScriptOp::EnableWhitelist => campaign
            .enable_whitelist(ctx)
            .map(|()| "allow-list enabled".to_string()),
        ScriptOp::DisableWhitelist => campaign
            .disable_whitelist(ctx)
            .map(|()| "allow-list disabled".to_string()),
        ScriptOp::AssignReserved { to, group, amount } => {
            let to = resolve_account(to, owner)?;
            let group = parse_group(group)?;
            let amount = script_amount(amount)?;
            ledger
                .assign_reserved(ctx, to, group, amount)
                .map(|()| format!("distributed {amount} from {group:?} to {to}"))
        }
        ScriptOp::Lock => ledger.lock(ctx).map(|()| "ledger locked".to_string()),
        ScriptOp::Unlock => ledger.unlock(ctx).map(|()| "ledger unlocked".to_string()),
        ScriptOp::Transfer { to, value } => {
            let to = resolve_account(to, owner)?;
            let value = script_amount(value)?;
            ledger
                .transfer(ctx, to, value)
                .map(|()| format!("transferred {value} to {to}"))
        }
        ScriptOp::ExpectState { .. } => unreachable!("handled by the caller"),
    };
    Ok(outcome)
}

fn print_events(
    ledger: &mut TokenLedger,
    campaign: &mut Campaign,
    json: bool,
) -> CliResult<()> {
    for event in ledger.drain_events() {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("   ledger event:   {:?}", event);
        }
    }
    for event in campaign.drain_events() {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("   campaign event: {:?}", event);
        }
    }
    Ok(())
}

/// Accept either epoch seconds or an RFC3339 datetime.
fn parse_when(raw: &str) -> CliResult<Timestamp> {
    if let Ok(epoch) = raw.parse::<u64>() {
        return Ok(epoch);
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| CliError::InvalidScript(format!("bad time {raw:?}: {e}")))?;
    u64::try_from(parsed.timestamp())
        .map_err(|_| CliError::InvalidScript(format!("time {raw:?} is before the epoch")))
}

fn resolve_account(raw: &str, owner: AccountId) -> CliResult<AccountId> {
    if raw == "owner" {
        return Ok(owner);
    }
    raw.parse()
        .map_err(|e| CliError::InvalidScript(format!("bad account {raw:?}: {e}")))
}

fn script_amount(raw: &str) -> CliResult<Amount> {
    parse_amount(raw).map_err(|e| CliError::InvalidScript(format!("bad amount {raw:?}: {e}")))
}

/// Omitted tune fields become zero, which the campaign reads as
/// "leave unchanged".
fn opt_amount(raw: &Option<String>) -> CliResult<Amount> {
    match raw {
        Some(raw) => script_amount(raw),
        None => Ok(0),
    }
}

fn parse_group(raw: &str) -> CliResult<ReservedGroup> {
    match raw.to_ascii_lowercase().as_str() {
        "team" => Ok(ReservedGroup::Team),
        "bounty" => Ok(ReservedGroup::Bounty),
        "partners" => Ok(ReservedGroup::Partners),
        "others" => Ok(ReservedGroup::Others),
        _ => Err(CliError::InvalidScript(format!(
            "unknown reserved group {raw:?}; valid: team, bounty, partners, others"
        ))),
    }
}

fn parse_state(raw: &str) -> CliResult<CampaignState> {
    match raw.to_ascii_lowercase().as_str() {
        "inactive" => Ok(CampaignState::Inactive),
        "active" => Ok(CampaignState::Active),
        "suspended" => Ok(CampaignState::Suspended),
        "terminated" => Ok(CampaignState::Terminated),
        "not_completed" => Ok(CampaignState::NotCompleted),
        "completed" => Ok(CampaignState::Completed),
        _ => Err(CliError::InvalidScript(format!(
            "unknown campaign state {raw:?}"
        ))),
    }
}
