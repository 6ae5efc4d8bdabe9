//! Plain-language findings for a scenario.
//!
//! Everything here classifies numbers the engine already produced; nothing is
//! recomputed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::evaluate::ScenarioResult;
use crate::numeric::{format_compact, format_pct, safe_div};
use crate::solar::params::{GlobalToggles, ScenarioParameters};
use crate::solar::tariff::TariffMode;
use crate::types::Rate;

/// Year-1 export share at or above which results are flagged as export-driven.
const EXPORT_SHARE_MATERIAL: Rate = dec!(0.15);

pub fn conclusions(
    params: &ScenarioParameters,
    toggles: &GlobalToggles,
    result: &ScenarioResult,
) -> Vec<String> {
    let mut out = Vec::new();
    incentive_findings(toggles, result, &mut out);
    tariff_findings(params, toggles, &mut out);
    value_findings(params, result, &mut out);
    export_findings(toggles, result, &mut out);
    out
}

fn incentive_findings(toggles: &GlobalToggles, result: &ScenarioResult, out: &mut Vec<String>) {
    let inc = &result.incentives;
    let caps = inc.scheme.capabilities();

    if !caps.removes_vat && !caps.removes_duty && !caps.grants_deduction {
        out.push(format!(
            "No tax incentives applied; the full capital cost of {} is paid upfront.",
            format_compact(inc.gross_capex)
        ));
        return;
    }

    if caps.removes_vat {
        out.push(format!(
            "VAT exclusion lowers the capital cost by {}.",
            format_compact(inc.vat_relief)
        ));
    }
    if caps.removes_duty {
        out.push(format!(
            "Import duty exemption lowers the capital cost by {}.",
            format_compact(inc.duty_relief)
        ));
    }
    if caps.grants_deduction {
        let years = inc.deduction_schedule.len();
        let line = if !toggles.include_tax_benefit {
            "An income tax deduction is available but excluded from the cash flows.".to_string()
        } else if years == 0 {
            "The income tax deduction yields no benefit under the taxable income cap.".to_string()
        } else {
            format!(
                "The income tax deduction returns {} over {} year{}.",
                format_compact(inc.total_tax_benefit),
                years,
                if years == 1 { "" } else { "s" }
            )
        };
        out.push(line);
    }
}

fn tariff_findings(params: &ScenarioParameters, toggles: &GlobalToggles, out: &mut Vec<String>) {
    let escalation = format_pct(params.tariff_escalation, 1);
    let line = match params.tariff_mode {
        TariffMode::Escalated => format!(
            "The tariff starts at {} and escalates {} per year.",
            format_compact(params.tariff),
            escalation
        ),
        TariffMode::Manual if params.manual_prices.is_empty() => format!(
            "No manual prices were given; the tariff escalates {escalation} per year from {}.",
            format_compact(params.tariff)
        ),
        TariffMode::Manual => format!(
            "The tariff follows a {}-year manual schedule, then escalates {} per year.",
            params.manual_prices.len(),
            escalation
        ),
        TariffMode::Cyclical => format!(
            "The tariff swings ±{} around a {} trend on a {}-year cycle.",
            format_pct(params.volatility, 0),
            escalation,
            params.cycle_years
        ),
    };
    out.push(line);

    if toggles.use_volatility && params.volatility > Decimal::ZERO {
        out.push(format!(
            "Reproducible price jitter of up to ±{} is applied to modelled prices.",
            format_pct(params.volatility, 0)
        ));
    }
}

fn value_findings(params: &ScenarioParameters, result: &ScenarioResult, out: &mut Vec<String>) {
    let rate = format_pct(params.discount_rate, 1);

    out.push(if result.npv > Decimal::ZERO {
        format!(
            "The investment creates value: NPV of {} at a {rate} discount rate.",
            format_compact(result.npv)
        )
    } else if result.npv < Decimal::ZERO {
        format!(
            "The investment destroys value: NPV of {} at a {rate} discount rate.",
            format_compact(result.npv)
        )
    } else {
        format!("The investment breaks even at a {rate} discount rate.")
    });

    out.push(match result.irr {
        None => "IRR is undefined for this cash-flow profile.".to_string(),
        Some(irr) if irr > params.discount_rate => {
            format!("IRR of {} exceeds the {rate} discount rate.", format_pct(irr, 1))
        }
        Some(irr) => format!(
            "IRR of {} does not reach the {rate} discount rate.",
            format_pct(irr, 1)
        ),
    });

    let lifetime = result.lifetime_years();
    out.push(match result.payback_year {
        Some(0) => "There is no net outlay to recover.".to_string(),
        Some(y) if y * 2 <= lifetime => format!(
            "Capital is recovered in year {y}, within the first half of the {lifetime}-year life."
        ),
        Some(y) => format!("Capital is recovered late, in year {y} of {lifetime}."),
        None => format!("Capital is not recovered within the {lifetime}-year lifetime."),
    });

    if result.first_year_return.is_none() {
        out.push(
            "First-year return is undefined because the net capital cost is zero.".to_string(),
        );
    }
}

fn export_findings(toggles: &GlobalToggles, result: &ScenarioResult, out: &mut Vec<String>) {
    let Some(year_one) = result.ledger.get(1) else {
        return;
    };

    if year_one.exported_kwh <= Decimal::ZERO {
        out.push("All generation is self-consumed; nothing is exported.".to_string());
        return;
    }
    if !toggles.include_exports {
        out.push("Exported energy is not credited in this projection.".to_string());
        return;
    }

    match safe_div(year_one.export_revenue, year_one.gross_income()) {
        Some(share) if share >= EXPORT_SHARE_MATERIAL => out.push(format!(
            "Exports provide {} of year-1 income; results depend on the export price.",
            format_pct(share, 0)
        )),
        Some(share) if share > Decimal::ZERO => out.push(format!(
            "Exports provide a minor {} of year-1 income.",
            format_pct(share, 0)
        )),
        _ => out.push("Exported energy earns nothing at the current export price.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use crate::scenarios::evaluate::evaluate;
    use crate::solar::incentives::IncentiveScheme;
    use crate::solar::params::{GlobalToggles, ScenarioParameters};
    use crate::solar::tariff::TariffMode;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn has(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|l| l.contains(needle))
    }

    #[test]
    fn test_reference_scenario_findings() {
        let r = evaluate(&ScenarioParameters::default(), &GlobalToggles::default());
        let c = &r.conclusions;
        assert!(has(c, "No tax incentives applied"));
        assert!(has(c, "22.0M"));
        assert!(has(c, "escalates 3.0% per year"));
        assert!(has(c, "creates value"));
        assert!(has(c, "exceeds the 13.0% discount rate"));
        assert!(has(c, "first half"));
        assert!(has(c, "self-consumed"));
    }

    #[test]
    fn test_incentive_findings() {
        let params = ScenarioParameters {
            incentive_scheme: IncentiveScheme::Full,
            ..Default::default()
        };
        let with = evaluate(&params, &GlobalToggles::default());
        assert!(has(&with.conclusions, "VAT exclusion lowers"));
        assert!(has(&with.conclusions, "duty exemption lowers"));
        assert!(has(&with.conclusions, "over 15 years"));

        let without = evaluate(
            &params,
            &GlobalToggles {
                include_tax_benefit: false,
                ..Default::default()
            },
        );
        assert!(has(&without.conclusions, "excluded from the cash flows"));
    }

    #[test]
    fn test_deduction_finding_counts_only_operating_years() {
        let params = ScenarioParameters {
            incentive_scheme: IncentiveScheme::IncomeTaxDeduction,
            lifetime_years: 5,
            ..Default::default()
        };
        let r = evaluate(&params, &GlobalToggles::default());
        assert!(has(&r.conclusions, "over 5 years"));
        assert!(!has(&r.conclusions, "over 15 years"));
    }

    #[test]
    fn test_losing_scenario_findings() {
        let params = ScenarioParameters {
            tariff: dec!(30),
            tariff_mode: TariffMode::Cyclical,
            volatility: dec!(0.2),
            ..Default::default()
        };
        let r = evaluate(&params, &GlobalToggles::default());
        assert!(has(&r.conclusions, "destroys value"));
        assert!(has(&r.conclusions, "IRR is undefined"));
        assert!(has(&r.conclusions, "not recovered"));
        assert!(has(&r.conclusions, "swings ±20%"));
    }

    #[test]
    fn test_export_share_classification() {
        let heavy = ScenarioParameters {
            self_consumption: dec!(0.3),
            export_price_factor: dec!(0.8),
            ..Default::default()
        };
        let r = evaluate(&heavy, &GlobalToggles::default());
        assert!(has(&r.conclusions, "results depend on the export price"));

        let light = ScenarioParameters {
            self_consumption: dec!(0.95),
            export_price_factor: dec!(0.5),
            ..Default::default()
        };
        let r = evaluate(&light, &GlobalToggles::default());
        assert!(has(&r.conclusions, "minor"));

        let off = evaluate(
            &heavy,
            &GlobalToggles {
                include_exports: false,
                ..Default::default()
            },
        );
        assert!(has(&off.conclusions, "not credited"));
    }

    #[test]
    fn test_zero_capex_finding() {
        let params = ScenarioParameters {
            capex: Decimal::ZERO,
            ..Default::default()
        };
        let r = evaluate(&params, &GlobalToggles::default());
        assert!(has(&r.conclusions, "no net outlay"));
        assert!(has(&r.conclusions, "First-year return is undefined"));
    }
}
