use clap::Args;
use serde_json::Value;

use solar_invest_core::scenarios::evaluate::run_scenario;
use solar_invest_core::solar::params::GlobalToggles;

use super::{to_value, ScenarioFlags, ToggleFlags};

/// Arguments for a single-scenario evaluation
#[derive(Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub scenario: ScenarioFlags,

    #[command(flatten)]
    pub toggles: ToggleFlags,

    /// Reject out-of-range inputs instead of clamping them
    #[arg(long)]
    pub strict: bool,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.scenario.load()?;
    if args.strict {
        params.validate_strict()?;
    }
    let toggles = args.toggles.apply(GlobalToggles::default());
    to_value(run_scenario(&params, &toggles))
}
