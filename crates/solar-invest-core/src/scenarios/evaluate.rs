use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

use super::comparison::{best_by_npv, comparison_series, headline_rows, ComparisonPoint, Headline};
use super::conclusions::conclusions;
use crate::error::SolarInvestError;
use crate::numeric::safe_div;
use crate::solar::incentives::{resolve_incentives, IncentiveResolution};
use crate::solar::ledger::{build_ledger, cumulative_cash_flows, net_cash_flows, AnnualLedgerRow};
use crate::solar::jitter::JitterSeed;
use crate::solar::params::{ClampAdjustment, GlobalToggles, ScenarioParameters};
use crate::solar::tariff::tariff_path;
use crate::time_value::{
    discounted_payback_year, first_year_return, irr, npv, payback_year,
    present_value_from_year_one,
};
use crate::types::{with_metadata, ComputationOutput, Kwh, Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Slot a scenario occupies in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScenarioKey {
    A,
    B,
    C,
}

impl ScenarioKey {
    pub const ALL: [ScenarioKey; 3] = [ScenarioKey::A, ScenarioKey::B, ScenarioKey::C];

    pub fn label(self) -> &'static str {
        match self {
            ScenarioKey::A => "A",
            ScenarioKey::B => "B",
            ScenarioKey::C => "C",
        }
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScenarioKey {
    type Err = SolarInvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(ScenarioKey::A),
            "B" => Ok(ScenarioKey::B),
            "C" => Ok(ScenarioKey::C),
            other => Err(SolarInvestError::InvalidInput {
                field: "scenario_key".into(),
                reason: format!("expected A, B or C, got '{other}'"),
            }),
        }
    }
}

/// Everything derived from one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    /// Capital cost after VAT/duty relief
    pub net_capex: Money,
    pub incentives: IncentiveResolution,
    /// Years 0..=lifetime
    pub ledger: Vec<AnnualLedgerRow>,
    pub npv: Money,
    pub irr: Option<Rate>,
    pub payback_year: Option<u32>,
    pub first_year_return: Option<Rate>,
    pub discounted_payback_year: Option<u32>,
    pub lifetime_energy_kwh: Kwh,
    /// Levelized cost of energy: (net capex + PV of opex) / PV of energy
    pub lcoe: Option<Money>,
    /// (NPV + net capex) / net capex
    pub profitability_index: Option<Rate>,
    pub total_net_cash_flow: Money,
    pub conclusions: Vec<String>,
    /// Inputs that were clamped before the run
    pub adjustments: Vec<ClampAdjustment>,
}

impl ScenarioResult {
    pub fn lifetime_years(&self) -> u32 {
        self.ledger.len().saturating_sub(1) as u32
    }

    pub fn final_cumulative(&self) -> Money {
        self.ledger
            .last()
            .map(|r| r.cumulative_cash_flow)
            .unwrap_or(Decimal::ZERO)
    }
}

/// One entry of a projected tariff path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffPoint {
    pub year: u32,
    pub tariff: Money,
}

/// Output of [`evaluate_all`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub results: BTreeMap<ScenarioKey, ScenarioResult>,
    /// Cumulative cash flow per scenario for years 0..=longest lifetime
    pub comparison_series: Vec<ComparisonPoint>,
    pub headlines: Vec<Headline>,
    pub best_by_npv: Option<ScenarioKey>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Run one scenario end to end.
///
/// Never fails: inputs are clamped first and undefined metrics come back as
/// `None`.
pub fn evaluate(params: &ScenarioParameters, toggles: &GlobalToggles) -> ScenarioResult {
    let (params, adjustments) = params.sanitize();

    let incentives = resolve_incentives(
        params.capex,
        params.incentive_scheme,
        &params.incentive_rates(),
    );
    let ledger = build_ledger(&params, &incentives, toggles);

    let flows = net_cash_flows(&ledger);
    let cumulative = cumulative_cash_flows(&ledger);
    let rate = params.discount_rate;
    let net_capex = incentives.net_capex;

    // Sanitized rates keep 1 + r above one and money is bounded.
    let npv_value = npv(rate, &flows).unwrap_or_default();
    let irr_value = irr(&flows);

    let energies: Vec<Kwh> = ledger.iter().skip(1).map(|r| r.energy_kwh).collect();
    let opex: Vec<Money> = ledger.iter().skip(1).map(|r| r.opex).collect();
    let discounted_cost =
        present_value_from_year_one(rate, &opex).map(|pv| net_capex + pv);
    let discounted_energy = present_value_from_year_one(rate, &energies);

    let mut result = ScenarioResult {
        name: params.name.clone(),
        net_capex,
        npv: npv_value,
        irr: irr_value,
        payback_year: payback_year(&cumulative),
        first_year_return: first_year_return(&flows, net_capex),
        discounted_payback_year: discounted_payback_year(rate, &flows),
        lifetime_energy_kwh: energies.iter().sum(),
        lcoe: discounted_cost
            .zip(discounted_energy)
            .and_then(|(cost, energy)| safe_div(cost, energy)),
        profitability_index: safe_div(npv_value + net_capex, net_capex),
        total_net_cash_flow: flows.iter().sum(),
        incentives,
        ledger,
        conclusions: Vec::new(),
        adjustments,
    };
    result.conclusions = conclusions(&params, toggles, &result);

    debug!(
        scenario = %result.name,
        net_capex = %result.net_capex,
        npv = %result.npv,
        irr = ?result.irr,
        payback = ?result.payback_year,
        "scenario evaluated"
    );

    result
}

/// [`evaluate`] wrapped in the standard output envelope, with warnings for
/// clamped inputs and undefined metrics.
pub fn run_scenario(
    params: &ScenarioParameters,
    toggles: &GlobalToggles,
) -> ComputationOutput<ScenarioResult> {
    let start = Instant::now();
    let result = evaluate(params, toggles);
    let warnings = scenario_warnings(&result);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Solar investment projection (annual ledger, NPV, IRR by bisection)",
        &serde_json::json!({
            "scenario": result.name,
            "lifetime_years": result.lifetime_years(),
            "incentive_scheme": params.incentive_scheme,
            "tariff_mode": params.tariff_mode,
            "toggles": toggles,
        }),
        warnings,
        elapsed,
        result,
    )
}

/// The annual ledger alone, in the standard envelope.
pub fn run_ledger(
    params: &ScenarioParameters,
    toggles: &GlobalToggles,
) -> ComputationOutput<Vec<AnnualLedgerRow>> {
    let start = Instant::now();
    let result = evaluate(params, toggles);
    let warnings = scenario_warnings(&result);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Solar investment annual ledger",
        &serde_json::json!({
            "scenario": result.name,
            "lifetime_years": result.lifetime_years(),
            "net_capex": result.net_capex,
            "toggles": toggles,
        }),
        warnings,
        elapsed,
        result.ledger,
    )
}

/// Unit prices for years `0..=lifetime` as the ledger would apply them.
pub fn run_tariff_path(
    params: &ScenarioParameters,
    toggles: &GlobalToggles,
) -> ComputationOutput<Vec<TariffPoint>> {
    let start = Instant::now();
    let (params, adjustments) = params.sanitize();
    let tariff_params = params.tariff_params();
    let jitter = toggles
        .use_volatility
        .then(|| JitterSeed::new(&params.name, &tariff_params));

    let points = tariff_path(&tariff_params, params.lifetime_years, jitter.as_ref())
        .into_iter()
        .enumerate()
        .map(|(year, tariff)| TariffPoint {
            year: year as u32,
            tariff,
        })
        .collect();

    let warnings = adjustments
        .iter()
        .map(clamp_warning)
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Tariff projection",
        &serde_json::json!({
            "scenario": params.name,
            "tariff_mode": params.tariff_mode,
            "escalation": params.tariff_escalation,
            "jitter_seed": jitter.map(|j| j.value()),
        }),
        warnings,
        elapsed,
        points,
    )
}

/// Run every scenario independently and build the comparison surface.
///
/// An empty map yields empty results, an empty series and no best scenario.
pub fn evaluate_all(
    scenarios: &BTreeMap<ScenarioKey, ScenarioParameters>,
    toggles: &GlobalToggles,
) -> ComputationOutput<ComparisonOutput> {
    let start = Instant::now();

    let results: BTreeMap<ScenarioKey, ScenarioResult> = scenarios
        .iter()
        .map(|(key, params)| (*key, evaluate(params, toggles)))
        .collect();

    let mut warnings = Vec::new();
    for (key, result) in &results {
        warnings.extend(
            scenario_warnings(result)
                .into_iter()
                .map(|w| format!("[{key}] {w}")),
        );
    }

    let lifetimes: Vec<u32> = results.values().map(|r| r.lifetime_years()).collect();
    if lifetimes.windows(2).any(|w| w[0] != w[1]) {
        warnings.push(
            "Lifetimes differ; shorter scenarios hold their final cumulative value in the comparison series"
                .to_string(),
        );
    }

    let output = ComparisonOutput {
        comparison_series: comparison_series(&results),
        headlines: headline_rows(&results),
        best_by_npv: best_by_npv(&results),
        results,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Side-by-side solar investment scenarios",
        &serde_json::json!({
            "num_scenarios": scenarios.len(),
            "toggles": toggles,
        }),
        warnings,
        elapsed,
        output,
    )
}

fn clamp_warning(a: &ClampAdjustment) -> String {
    format!(
        "{} = {} was outside [{}, {}]; used {}",
        a.field, a.original, a.min, a.max, a.applied
    )
}

fn scenario_warnings(result: &ScenarioResult) -> Vec<String> {
    let mut warnings: Vec<String> = result.adjustments.iter().map(clamp_warning).collect();

    if result.irr.is_none() {
        warnings.push("IRR is undefined: cash flows never change sign across the search range".into());
    }
    if result.payback_year.is_none() {
        warnings.push(format!(
            "Capital is not recovered within {} years",
            result.lifetime_years()
        ));
    }
    if result.first_year_return.is_none() {
        warnings.push("First-year return is undefined: net capital cost is zero".into());
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solar::incentives::IncentiveScheme;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_scenario_metrics_defined() {
        let result = evaluate(&ScenarioParameters::default(), &GlobalToggles::default());
        assert_eq!(result.ledger.len(), 26);
        assert_eq!(result.net_capex, dec!(22_000_000));
        assert!(result.irr.is_some());
        assert!(result.payback_year.is_some());
        assert!(result.first_year_return.is_some());
        assert!(result.lcoe.is_some());
        assert!(!result.conclusions.is_empty());
        assert!(result.adjustments.is_empty());
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let params = ScenarioParameters {
            incentive_scheme: IncentiveScheme::Full,
            volatility: dec!(0.2),
            ..Default::default()
        };
        let toggles = GlobalToggles {
            use_volatility: true,
            ..Default::default()
        };
        let first = evaluate(&params, &toggles);
        let second = evaluate(&params, &toggles);
        assert_eq!(first, second);
        assert_eq!(first.npv.serialize(), second.npv.serialize());
    }

    #[test]
    fn test_zero_capex_guards_ratios() {
        let params = ScenarioParameters {
            capex: Decimal::ZERO,
            ..Default::default()
        };
        let result = evaluate(&params, &GlobalToggles::default());
        assert_eq!(result.first_year_return, None);
        assert_eq!(result.profitability_index, None);
        assert_eq!(result.payback_year, Some(0));
    }

    #[test]
    fn test_zero_generation_has_no_irr_or_payback() {
        let params = ScenarioParameters {
            power_kw: Decimal::ZERO,
            ..Default::default()
        };
        let result = evaluate(&params, &GlobalToggles::default());
        assert_eq!(result.irr, None);
        assert_eq!(result.payback_year, None);
        assert_eq!(result.lcoe, None);
        assert!(result.npv < Decimal::ZERO);
    }

    #[test]
    fn test_npv_is_exact_sum_of_discounted_flows() {
        let params = ScenarioParameters {
            lifetime_years: 2,
            ..Default::default()
        };
        let result = evaluate(&params, &GlobalToggles::default());
        let one_plus_r = dec!(1.13);
        let expected = result.ledger[0].net_cash_flow
            + result.ledger[1].net_cash_flow / one_plus_r
            + result.ledger[2].net_cash_flow / (one_plus_r * one_plus_r);
        assert!((result.npv - expected).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_run_scenario_warns_on_clamp() {
        let params = ScenarioParameters {
            lifetime_years: 50,
            ..Default::default()
        };
        let out = run_scenario(&params, &GlobalToggles::default());
        assert_eq!(out.result.ledger.len(), 31);
        assert!(out.warnings.iter().any(|w| w.starts_with("lifetime_years")));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_run_ledger_matches_evaluate() {
        let params = ScenarioParameters::default();
        let out = run_ledger(&params, &GlobalToggles::default());
        assert_eq!(out.result, evaluate(&params, &GlobalToggles::default()).ledger);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_tariff_path_matches_ledger_prices() {
        let params = ScenarioParameters {
            tariff_mode: crate::solar::tariff::TariffMode::Cyclical,
            volatility: dec!(0.2),
            ..Default::default()
        };
        let toggles = GlobalToggles {
            use_volatility: true,
            ..Default::default()
        };
        let path = run_tariff_path(&params, &toggles).result;
        let ledger = evaluate(&params, &toggles).ledger;
        assert_eq!(path.len(), ledger.len());
        assert_eq!(path[0].tariff, dec!(850));
        for (point, row) in path.iter().zip(&ledger).skip(1) {
            assert_eq!(point.year, row.year);
            assert_eq!(point.tariff, row.tariff);
        }
    }

    #[test]
    fn test_evaluate_all_empty_is_empty() {
        let out = evaluate_all(&BTreeMap::new(), &GlobalToggles::default());
        assert!(out.result.results.is_empty());
        assert!(out.result.comparison_series.is_empty());
        assert!(out.result.headlines.is_empty());
        assert_eq!(out.result.best_by_npv, None);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_scenario_key_parse() {
        assert_eq!("b".parse::<ScenarioKey>().unwrap(), ScenarioKey::B);
        assert!("D".parse::<ScenarioKey>().is_err());
        assert_eq!(ScenarioKey::C.to_string(), "C");
    }
}
