use clap::Args;
use serde_json::Value;

use solar_invest_core::scenarios::evaluate::run_tariff_path;
use solar_invest_core::solar::params::GlobalToggles;

use super::{to_value, ScenarioFlags};

/// Arguments for the tariff projection
#[derive(Args)]
pub struct TariffArgs {
    #[command(flatten)]
    pub scenario: ScenarioFlags,

    /// Apply reproducible price jitter
    #[arg(long)]
    pub volatility: bool,
}

pub fn run_tariff(args: TariffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.scenario.load()?;
    let toggles = GlobalToggles {
        use_volatility: args.volatility,
        ..Default::default()
    };
    to_value(run_tariff_path(&params, &toggles))
}
