use clap::Args;
use serde_json::Value;

use solar_invest_core::scenarios::sensitivity;
use solar_invest_core::solar::params::GlobalToggles;

use super::{to_value, ScenarioFlags, ToggleFlags};

/// Arguments for toggle sensitivity
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub scenario: ScenarioFlags,

    #[command(flatten)]
    pub toggles: ToggleFlags,

    /// Only report the export revenue swing
    #[arg(long)]
    pub exports_only: bool,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.scenario.load()?;
    let base = args.toggles.apply(GlobalToggles::default());

    if args.exports_only {
        let delta = sensitivity::export_sensitivity(&params, &base);
        let narrative = sensitivity::sensitivity_narrative(&delta);
        let mut value = to_value(delta)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("narrative".to_string(), Value::String(narrative));
        }
        return Ok(value);
    }

    to_value(sensitivity::run_sensitivity(&params, &base))
}
