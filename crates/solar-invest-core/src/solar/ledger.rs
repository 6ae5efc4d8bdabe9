use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::incentives::IncentiveResolution;
use super::jitter::JitterSeed;
use super::params::{GlobalToggles, ScenarioParameters};
use super::tariff::tariff_for_year;
use crate::numeric::powi;
use crate::types::{Kwh, Money};

/// One year of the projection. Row 0 is the initial outlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualLedgerRow {
    pub year: u32,
    /// Unit energy price applied this year
    pub tariff: Money,
    pub energy_kwh: Kwh,
    pub self_consumed_kwh: Kwh,
    pub exported_kwh: Kwh,
    /// Avoided purchases: self-consumed energy at the tariff
    pub savings: Money,
    /// Exported energy at `tariff × export_price_factor`
    pub export_revenue: Money,
    pub opex: Money,
    pub tax_benefit: Money,
    pub net_cash_flow: Money,
    pub cumulative_cash_flow: Money,
}

impl AnnualLedgerRow {
    /// Operating income before costs: savings plus export revenue.
    pub fn gross_income(&self) -> Money {
        self.savings + self.export_revenue
    }
}

/// Project one scenario year by year.
///
/// Expects sanitised parameters. Returns exactly `lifetime_years + 1` rows;
/// row 0 carries only the negative net capex.
pub fn build_ledger(
    params: &ScenarioParameters,
    incentives: &IncentiveResolution,
    toggles: &GlobalToggles,
) -> Vec<AnnualLedgerRow> {
    let lifetime = params.lifetime_years;
    let tariff_params = params.tariff_params();
    let jitter = toggles
        .use_volatility
        .then(|| JitterSeed::new(&params.name, &tariff_params));

    let export_factor = if toggles.include_exports {
        params.export_price_factor
    } else {
        Decimal::ZERO
    };
    let opex_escalation = params.tariff_escalation.max(Decimal::ZERO);
    let base_energy = params.base_annual_energy();

    let mut rows = Vec::with_capacity(lifetime as usize + 1);
    let outlay = -incentives.net_capex;
    rows.push(AnnualLedgerRow {
        net_cash_flow: outlay,
        cumulative_cash_flow: outlay,
        ..Default::default()
    });

    let mut cumulative = outlay;
    for year in 1..=lifetime {
        let age = year - 1;
        let tariff = tariff_for_year(year, &tariff_params, jitter.as_ref());

        let energy_kwh = base_energy * powi(Decimal::ONE - params.degradation_rate, age);
        let self_consumed_kwh = energy_kwh * params.self_consumption;
        let exported_kwh = energy_kwh - self_consumed_kwh;

        let savings = self_consumed_kwh * tariff;
        let export_revenue = exported_kwh * tariff * export_factor;
        let opex = params.opex * powi(Decimal::ONE + opex_escalation, age);
        let tax_benefit = if toggles.include_tax_benefit {
            incentives.tax_benefit_for_year(year)
        } else {
            Decimal::ZERO
        };

        let net_cash_flow = savings + export_revenue - opex + tax_benefit;
        cumulative += net_cash_flow;

        trace!(
            year,
            %tariff,
            %energy_kwh,
            %net_cash_flow,
            %cumulative,
            "ledger year"
        );

        rows.push(AnnualLedgerRow {
            year,
            tariff,
            energy_kwh,
            self_consumed_kwh,
            exported_kwh,
            savings,
            export_revenue,
            opex,
            tax_benefit,
            net_cash_flow,
            cumulative_cash_flow: cumulative,
        });
    }

    rows
}

/// Net cash flow column of a ledger.
pub fn net_cash_flows(ledger: &[AnnualLedgerRow]) -> Vec<Money> {
    ledger.iter().map(|r| r.net_cash_flow).collect()
}

/// Cumulative cash flow column of a ledger.
pub fn cumulative_cash_flows(ledger: &[AnnualLedgerRow]) -> Vec<Money> {
    ledger.iter().map(|r| r.cumulative_cash_flow).collect()
}
