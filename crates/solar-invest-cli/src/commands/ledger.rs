use clap::Args;
use serde_json::Value;

use solar_invest_core::scenarios::evaluate;
use solar_invest_core::solar::params::GlobalToggles;

use super::{to_value, ScenarioFlags, ToggleFlags};

/// Arguments for printing the annual ledger
#[derive(Args)]
pub struct LedgerArgs {
    #[command(flatten)]
    pub scenario: ScenarioFlags,

    #[command(flatten)]
    pub toggles: ToggleFlags,
}

pub fn run_ledger(args: LedgerArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.scenario.load()?;
    let toggles = args.toggles.apply(GlobalToggles::default());
    to_value(evaluate::run_ledger(&params, &toggles))
}
