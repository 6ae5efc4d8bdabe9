use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use solar_invest_core::scenarios::evaluate::{evaluate, evaluate_all, run_scenario, ScenarioKey};
use solar_invest_core::scenarios::sensitivity::run_sensitivity;
use solar_invest_core::solar::incentives::IncentiveScheme;
use solar_invest_core::solar::params::{GlobalToggles, ScenarioParameters, Toggle};
use solar_invest_core::solar::tariff::TariffMode;
use solar_invest_core::time_value::npv;

fn three_scenarios() -> BTreeMap<ScenarioKey, ScenarioParameters> {
    let mut m = BTreeMap::new();
    m.insert(
        ScenarioKey::A,
        ScenarioParameters {
            name: "Baseline".into(),
            ..Default::default()
        },
    );
    m.insert(
        ScenarioKey::B,
        ScenarioParameters {
            name: "Full incentives".into(),
            incentive_scheme: IncentiveScheme::Full,
            ..Default::default()
        },
    );
    m.insert(
        ScenarioKey::C,
        ScenarioParameters {
            name: "Short life, exports".into(),
            lifetime_years: 15,
            self_consumption: dec!(0.6),
            tariff_mode: TariffMode::Cyclical,
            volatility: dec!(0.15),
            ..Default::default()
        },
    );
    m
}

// ===========================================================================
// Single scenario
// ===========================================================================

#[test]
fn test_reference_scenario_ledger_shape() {
    let r = evaluate(&ScenarioParameters::default(), &GlobalToggles::default());
    assert_eq!(r.ledger.len(), 26);
    for (idx, row) in r.ledger.iter().enumerate() {
        assert_eq!(row.year as usize, idx);
    }
    for y in 1..r.ledger.len() {
        assert_eq!(
            r.ledger[y].cumulative_cash_flow,
            r.ledger[y - 1].cumulative_cash_flow + r.ledger[y].net_cash_flow
        );
    }
    assert_eq!(r.final_cumulative(), r.ledger[25].cumulative_cash_flow);
    assert_eq!(r.total_net_cash_flow, r.final_cumulative());
}

#[test]
fn test_reference_scenario_metrics() {
    let r = evaluate(&ScenarioParameters::default(), &GlobalToggles::default());
    assert!(r.npv > Decimal::ZERO);
    let irr = r.irr.unwrap();
    assert!(irr > dec!(0.13), "IRR {irr} should beat the discount rate");
    let flows: Vec<Decimal> = r.ledger.iter().map(|row| row.net_cash_flow).collect();
    assert!(npv(irr, &flows).unwrap().abs() < dec!(1));
    assert_eq!(r.payback_year, Some(4));
    assert!(r.discounted_payback_year.unwrap() >= r.payback_year.unwrap());
    assert!(r.profitability_index.unwrap() > Decimal::ONE);
}

#[test]
fn test_reference_scenario_is_bit_identical_across_runs() {
    let params = ScenarioParameters {
        tariff_mode: TariffMode::Cyclical,
        volatility: dec!(0.2),
        ..Default::default()
    };
    let toggles = GlobalToggles {
        use_volatility: true,
        ..Default::default()
    };
    let a = evaluate(&params, &toggles);
    let b = evaluate(&params, &toggles);
    for (x, y) in a.ledger.iter().zip(&b.ledger) {
        assert_eq!(x.tariff.serialize(), y.tariff.serialize());
        assert_eq!(x.net_cash_flow.serialize(), y.net_cash_flow.serialize());
    }
    assert_eq!(a.npv.serialize(), b.npv.serialize());
}

#[test]
fn test_jitter_depends_on_scenario_name() {
    let toggles = GlobalToggles {
        use_volatility: true,
        ..Default::default()
    };
    let base = ScenarioParameters {
        volatility: dec!(0.2),
        ..Default::default()
    };
    let renamed = ScenarioParameters {
        name: "Other".into(),
        ..base.clone()
    };
    assert_ne!(evaluate(&base, &toggles).npv, evaluate(&renamed, &toggles).npv);
}

#[test]
fn test_out_of_range_inputs_are_clamped_not_rejected() {
    let params = ScenarioParameters {
        lifetime_years: 0,
        discount_rate: dec!(2),
        self_consumption: dec!(1.4),
        ..Default::default()
    };
    let out = run_scenario(&params, &GlobalToggles::default());
    assert_eq!(out.result.ledger.len(), 2);
    assert_eq!(out.result.adjustments.len(), 3);
    assert!(params.validate_strict().is_err());
}

#[test]
fn test_parameters_from_partial_json() {
    let params: ScenarioParameters =
        serde_json::from_str(r#"{"name":"Roof","power_kw":10,"incentive_scheme":"vat_and_duty"}"#)
            .unwrap();
    assert_eq!(params.power_kw, dec!(10));
    assert_eq!(params.incentive_scheme, IncentiveScheme::VatAndDuty);
    assert_eq!(params.lifetime_years, 25);

    let unknown = serde_json::from_str::<ScenarioParameters>(r#"{"powr_kw":10}"#);
    assert!(unknown.is_err());
}

#[test]
fn test_short_life_deduction_matches_ledger() {
    let params = ScenarioParameters {
        incentive_scheme: IncentiveScheme::IncomeTaxDeduction,
        lifetime_years: 5,
        deduction_years: 15,
        ..Default::default()
    };
    let r = evaluate(&params, &GlobalToggles::default());
    let claimed: Decimal = r.ledger.iter().map(|row| row.tax_benefit).sum();
    assert_eq!(r.incentives.deduction_schedule.len(), 5);
    assert_eq!(claimed, r.incentives.total_tax_benefit);
    assert!(r.conclusions.iter().any(|c| c.contains("over 5 years")));
}

// ===========================================================================
// Comparison
// ===========================================================================

#[test]
fn test_evaluate_all_builds_comparison_surface() {
    let out = evaluate_all(&three_scenarios(), &GlobalToggles::default());
    let cmp = &out.result;
    assert_eq!(cmp.results.len(), 3);
    assert_eq!(cmp.headlines.len(), 3);
    assert_eq!(cmp.comparison_series.len(), 26);

    let c_final = cmp.results[&ScenarioKey::C].final_cumulative();
    assert_eq!(cmp.comparison_series[20].cumulative[&ScenarioKey::C], c_final);
    assert!(out.warnings.iter().any(|w| w.contains("Lifetimes differ")));

    // Full incentives lower capex and add a tax benefit on the same physics.
    assert_eq!(cmp.best_by_npv, Some(ScenarioKey::B));
}

#[test]
fn test_scenarios_are_evaluated_independently() {
    let all = evaluate_all(&three_scenarios(), &GlobalToggles::default());
    let solo = evaluate(&three_scenarios()[&ScenarioKey::B], &GlobalToggles::default());
    assert_eq!(all.result.results[&ScenarioKey::B], solo);
}

#[test]
fn test_toggles_apply_to_every_scenario() {
    let off = GlobalToggles {
        include_tax_benefit: false,
        include_exports: false,
        use_volatility: false,
    };
    let out = evaluate_all(&three_scenarios(), &off);
    for r in out.result.results.values() {
        assert!(r.ledger.iter().all(|row| row.tax_benefit.is_zero()));
        assert!(r.ledger.iter().all(|row| row.export_revenue.is_zero()));
    }
}

#[test]
fn test_empty_comparison_is_not_an_error() {
    let out = evaluate_all(&BTreeMap::new(), &GlobalToggles::default());
    assert!(out.result.results.is_empty());
    assert!(out.result.comparison_series.is_empty());
    assert_eq!(out.result.best_by_npv, None);

    let json = serde_json::to_value(&out.result).unwrap();
    assert_eq!(json["best_by_npv"], serde_json::Value::Null);
}

// ===========================================================================
// Sensitivity
// ===========================================================================

#[test]
fn test_sensitivity_reports_each_toggle() {
    let params = ScenarioParameters {
        self_consumption: dec!(0.5),
        incentive_scheme: IncentiveScheme::Full,
        ..Default::default()
    };
    let out = run_sensitivity(&params, &GlobalToggles::default());
    let toggles: Vec<Toggle> = out.result.deltas.iter().map(|d| d.toggle).collect();
    assert_eq!(
        toggles,
        vec![Toggle::IncludeExports, Toggle::IncludeTaxBenefit, Toggle::UseVolatility]
    );
    for d in &out.result.deltas[..2] {
        assert!(d.npv_delta > Decimal::ZERO);
    }
}
