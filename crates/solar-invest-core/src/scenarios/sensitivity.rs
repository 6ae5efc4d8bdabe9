use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::evaluate::evaluate;
use crate::numeric::format_compact;
use crate::solar::params::{GlobalToggles, ScenarioParameters, Toggle};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

const ALL_TOGGLES: [Toggle; 3] = [
    Toggle::IncludeExports,
    Toggle::IncludeTaxBenefit,
    Toggle::UseVolatility,
];

/// One scenario run twice, differing only in `toggle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleSensitivity {
    pub toggle: Toggle,
    pub npv_with: Money,
    pub npv_without: Money,
    /// `npv_with - npv_without`
    pub npv_delta: Money,
    pub irr_with: Option<Rate>,
    pub irr_without: Option<Rate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub scenario: String,
    pub deltas: Vec<ToggleSensitivity>,
    pub narrative: Vec<String>,
}

pub fn toggle_sensitivity(
    params: &ScenarioParameters,
    base: &GlobalToggles,
    toggle: Toggle,
) -> ToggleSensitivity {
    let with = evaluate(params, &base.with(toggle, true));
    let without = evaluate(params, &base.with(toggle, false));
    ToggleSensitivity {
        toggle,
        npv_with: with.npv,
        npv_without: without.npv,
        npv_delta: with.npv - without.npv,
        irr_with: with.irr,
        irr_without: without.irr,
    }
}

/// NPV contributed by counting export revenue.
pub fn export_sensitivity(params: &ScenarioParameters, base: &GlobalToggles) -> ToggleSensitivity {
    toggle_sensitivity(params, base, Toggle::IncludeExports)
}

fn toggle_label(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::IncludeExports => "Counting export revenue",
        Toggle::IncludeTaxBenefit => "Counting the income tax deduction",
        Toggle::UseVolatility => "Applying price jitter",
    }
}

pub fn sensitivity_narrative(s: &ToggleSensitivity) -> String {
    let label = toggle_label(s.toggle);
    if s.npv_delta.is_zero() {
        return format!("{label} has no effect on NPV.");
    }
    let direction = if s.npv_delta > Decimal::ZERO { "raises" } else { "lowers" };
    format!(
        "{label} {direction} NPV by {} ({} with, {} without).",
        format_compact(s.npv_delta.abs()),
        format_compact(s.npv_with),
        format_compact(s.npv_without)
    )
}

/// Flip each global toggle in turn and report the NPV swing.
pub fn run_sensitivity(
    params: &ScenarioParameters,
    base: &GlobalToggles,
) -> ComputationOutput<SensitivityOutput> {
    let start = Instant::now();

    let deltas: Vec<ToggleSensitivity> = ALL_TOGGLES
        .iter()
        .map(|t| toggle_sensitivity(params, base, *t))
        .collect();
    let narrative = deltas.iter().map(sensitivity_narrative).collect();

    let output = SensitivityOutput {
        scenario: params.name.clone(),
        deltas,
        narrative,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Global toggle sensitivity (paired re-runs)",
        &serde_json::json!({
            "scenario": params.name,
            "base_toggles": base,
        }),
        Vec::new(),
        elapsed,
        output,
    )
}
