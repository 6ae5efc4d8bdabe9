use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::params::MONEY_MAX;
use crate::numeric::{clamp, clamp_int, safe_div};
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Policy bounds
// ---------------------------------------------------------------------------

pub const VAT_RATE_MAX: Rate = dec!(0.30);
pub const DUTY_RATE_MAX: Rate = dec!(0.30);
pub const INCOME_TAX_RATE_MAX: Rate = dec!(0.50);
pub const DEDUCTION_YEARS_MAX: u32 = 15;

/// Share of net capex that may be deducted from taxable income.
const DEDUCTIBLE_SHARE: Rate = dec!(0.5);
/// Share of annual taxable income a single year's deduction may absorb.
const INCOME_CAP_SHARE: Rate = dec!(0.5);

// ---------------------------------------------------------------------------
// Scheme catalog
// ---------------------------------------------------------------------------

/// What an incentive scheme does to the investment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveCapabilities {
    pub removes_vat: bool,
    pub removes_duty: bool,
    pub grants_deduction: bool,
}

/// Available incentive schemes. `None` is the only one without capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveScheme {
    #[default]
    None,
    VatExclusion,
    DutyExemption,
    IncomeTaxDeduction,
    VatAndDuty,
    VatAndDeduction,
    Full,
}

impl IncentiveScheme {
    pub const ALL: [IncentiveScheme; 7] = [
        IncentiveScheme::None,
        IncentiveScheme::VatExclusion,
        IncentiveScheme::DutyExemption,
        IncentiveScheme::IncomeTaxDeduction,
        IncentiveScheme::VatAndDuty,
        IncentiveScheme::VatAndDeduction,
        IncentiveScheme::Full,
    ];

    pub fn capabilities(self) -> IncentiveCapabilities {
        let (removes_vat, removes_duty, grants_deduction) = match self {
            IncentiveScheme::None => (false, false, false),
            IncentiveScheme::VatExclusion => (true, false, false),
            IncentiveScheme::DutyExemption => (false, true, false),
            IncentiveScheme::IncomeTaxDeduction => (false, false, true),
            IncentiveScheme::VatAndDuty => (true, true, false),
            IncentiveScheme::VatAndDeduction => (true, false, true),
            IncentiveScheme::Full => (true, true, true),
        };
        IncentiveCapabilities {
            removes_vat,
            removes_duty,
            grants_deduction,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncentiveScheme::None => "no incentives",
            IncentiveScheme::VatExclusion => "VAT exclusion",
            IncentiveScheme::DutyExemption => "import duty exemption",
            IncentiveScheme::IncomeTaxDeduction => "income tax deduction",
            IncentiveScheme::VatAndDuty => "VAT exclusion + duty exemption",
            IncentiveScheme::VatAndDeduction => "VAT exclusion + income tax deduction",
            IncentiveScheme::Full => "VAT, duty and income tax relief",
        }
    }
}

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Tax rates and limits the resolver works with. Clamped before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncentiveRates {
    pub vat_rate: Rate,
    pub duty_rate: Rate,
    pub income_tax_rate: Rate,
    pub deduction_years: u32,
    /// Annual taxable income; `None` means the deduction is not income-capped.
    pub annual_taxable_income: Option<Money>,
    /// Operating life of the asset; deductions after it are never claimed.
    /// `None` leaves the window at `deduction_years`.
    pub lifetime_years: Option<u32>,
}

impl IncentiveRates {
    pub fn clamped(&self) -> Self {
        Self {
            vat_rate: clamp(self.vat_rate, Decimal::ZERO, VAT_RATE_MAX),
            duty_rate: clamp(self.duty_rate, Decimal::ZERO, DUTY_RATE_MAX),
            income_tax_rate: clamp(self.income_tax_rate, Decimal::ZERO, INCOME_TAX_RATE_MAX),
            deduction_years: clamp_int(self.deduction_years, 1, DEDUCTION_YEARS_MAX),
            annual_taxable_income: self
                .annual_taxable_income
                .map(|v| clamp(v, Decimal::ZERO, MONEY_MAX)),
            lifetime_years: self.lifetime_years,
        }
    }

    /// Years in which a deduction may be taken.
    pub fn deduction_window(&self) -> u32 {
        match self.lifetime_years {
            Some(lifetime) => self.deduction_years.min(lifetime),
            None => self.deduction_years,
        }
    }
}

/// One year of the income tax deduction stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeductionYear {
    /// Operating year (1-based)
    pub year: u32,
    /// Amount deducted from taxable income this year
    pub deduction: Money,
    /// Cash value of the deduction: `deduction × income_tax_rate`
    pub tax_benefit: Money,
    /// Deduction base still available after this year
    pub remaining_base: Money,
}

/// Net capital cost and tax benefit stream for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveResolution {
    pub scheme: IncentiveScheme,
    pub gross_capex: Money,
    pub net_capex: Money,
    /// Capex removed by the VAT exclusion
    pub vat_relief: Money,
    /// Capex removed by the duty exemption
    pub duty_relief: Money,
    /// Total amount deductible from taxable income
    pub deduction_base: Money,
    /// Years with a non-zero deduction, in order
    pub deduction_schedule: Vec<DeductionYear>,
    pub total_tax_benefit: Money,
}

impl IncentiveResolution {
    /// Cash tax benefit in operating year `year`; zero outside the schedule.
    pub fn tax_benefit_for_year(&self, year: u32) -> Money {
        self.deduction_schedule
            .iter()
            .find(|d| d.year == year)
            .map(|d| d.tax_benefit)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Apply an incentive scheme to a gross capital cost.
///
/// The gross quote is treated as VAT- and duty-inclusive: VAT comes off first
/// as `capex / (1 + vat)`, then duty as `capex / (1 + duty)`. The income tax
/// deduction is sized on what remains after both, and is only claimed in
/// years the asset is still operating.
pub fn resolve_incentives(
    gross_capex: Money,
    scheme: IncentiveScheme,
    rates: &IncentiveRates,
) -> IncentiveResolution {
    let gross_capex = clamp(gross_capex, Decimal::ZERO, MONEY_MAX);
    let rates = rates.clamped();
    let caps = scheme.capabilities();

    let mut net_capex = gross_capex;

    let mut vat_relief = Decimal::ZERO;
    if caps.removes_vat {
        let reduced = net_capex / (Decimal::ONE + rates.vat_rate);
        vat_relief = net_capex - reduced;
        net_capex = reduced;
    }

    let mut duty_relief = Decimal::ZERO;
    if caps.removes_duty {
        let reduced = net_capex / (Decimal::ONE + rates.duty_rate);
        duty_relief = net_capex - reduced;
        net_capex = reduced;
    }

    let (deduction_base, deduction_schedule) = if caps.grants_deduction {
        let base = net_capex * DEDUCTIBLE_SHARE;
        (base, deduction_schedule(base, &rates))
    } else {
        (Decimal::ZERO, Vec::new())
    };

    let total_tax_benefit = deduction_schedule.iter().map(|d| d.tax_benefit).sum();

    IncentiveResolution {
        scheme,
        gross_capex,
        net_capex,
        vat_relief,
        duty_relief,
        deduction_base,
        deduction_schedule,
        total_tax_benefit,
    }
}

/// Spread `base` evenly over `deduction_years`, capping each year at half
/// the taxable income and stopping once the base is used up or the asset
/// reaches the end of its life.
fn deduction_schedule(base: Money, rates: &IncentiveRates) -> Vec<DeductionYear> {
    let even_share =
        safe_div(base, Decimal::from(rates.deduction_years)).unwrap_or(Decimal::ZERO);
    let income_cap = rates
        .annual_taxable_income
        .map(|income| income * INCOME_CAP_SHARE);

    let window = rates.deduction_window();
    let mut schedule = Vec::with_capacity(window as usize);
    let mut remaining = base;

    for year in 1..=window {
        if remaining <= Decimal::ZERO {
            break;
        }
        let mut deduction = even_share.min(remaining);
        if let Some(cap) = income_cap {
            deduction = deduction.min(cap);
        }
        if deduction <= Decimal::ZERO {
            break;
        }
        remaining = (remaining - deduction).max(Decimal::ZERO);
        schedule.push(DeductionYear {
            year,
            deduction,
            tax_benefit: deduction * rates.income_tax_rate,
            remaining_base: remaining,
        });
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rates() -> IncentiveRates {
        IncentiveRates {
            vat_rate: dec!(0.19),
            duty_rate: dec!(0.05),
            income_tax_rate: dec!(0.35),
            deduction_years: 15,
            annual_taxable_income: None,
            lifetime_years: None,
        }
    }

    #[test]
    fn test_none_scheme_is_identity() {
        let res = resolve_incentives(dec!(22_000_000), IncentiveScheme::None, &rates());
        assert_eq!(res.net_capex, dec!(22_000_000));
        assert_eq!(res.total_tax_benefit, Decimal::ZERO);
        assert!(res.deduction_schedule.is_empty());
        for year in 0..=30 {
            assert_eq!(res.tax_benefit_for_year(year), Decimal::ZERO);
        }
    }

    #[test]
    fn test_only_none_has_no_capabilities() {
        for scheme in IncentiveScheme::ALL {
            let caps = scheme.capabilities();
            let empty = !caps.removes_vat && !caps.removes_duty && !caps.grants_deduction;
            assert_eq!(empty, scheme == IncentiveScheme::None, "{scheme:?}");
        }
    }

    #[test]
    fn test_vat_then_duty_divide() {
        let res = resolve_incentives(dec!(1_190_000), IncentiveScheme::VatAndDuty, &rates());
        // 1_190_000 / 1.19 = 1_000_000; / 1.05 = 952_380.95
        assert_eq!(res.vat_relief, dec!(190_000));
        assert_eq!(res.net_capex, dec!(1_000_000) / dec!(1.05));
        assert_eq!(res.duty_relief, dec!(1_000_000) - res.net_capex);
        assert_eq!(
            res.gross_capex - res.vat_relief - res.duty_relief,
            res.net_capex
        );
    }

    #[test]
    fn test_deduction_spread_evenly() {
        let res = resolve_incentives(
            dec!(3_000_000),
            IncentiveScheme::IncomeTaxDeduction,
            &rates(),
        );
        assert_eq!(res.deduction_base, dec!(1_500_000));
        assert_eq!(res.deduction_schedule.len(), 15);
        for d in &res.deduction_schedule {
            assert_eq!(d.deduction, dec!(100_000));
            assert_eq!(d.tax_benefit, dec!(35_000));
        }
        assert_eq!(res.total_tax_benefit, dec!(525_000));
        assert_eq!(
            res.deduction_schedule.last().unwrap().remaining_base,
            Decimal::ZERO
        );
        assert_eq!(res.tax_benefit_for_year(16), Decimal::ZERO);
    }

    #[test]
    fn test_deduction_stops_at_end_of_life() {
        let r = IncentiveRates {
            lifetime_years: Some(5),
            ..rates()
        };
        let res = resolve_incentives(dec!(3_000_000), IncentiveScheme::IncomeTaxDeduction, &r);
        // Still 1/15 of the base per year, but only five years are claimed.
        assert_eq!(res.deduction_schedule.len(), 5);
        assert_eq!(res.deduction_schedule.last().unwrap().year, 5);
        assert_eq!(res.total_tax_benefit, dec!(175_000));
        assert_eq!(
            res.deduction_schedule.last().unwrap().remaining_base,
            dec!(1_000_000)
        );
        assert_eq!(res.tax_benefit_for_year(6), Decimal::ZERO);
    }

    #[test]
    fn test_deduction_window() {
        assert_eq!(rates().deduction_window(), 15);
        let short = IncentiveRates {
            lifetime_years: Some(5),
            ..rates()
        };
        assert_eq!(short.deduction_window(), 5);
        let long = IncentiveRates {
            lifetime_years: Some(25),
            ..rates()
        };
        assert_eq!(long.deduction_window(), 15);
    }

    #[test]
    fn test_deduction_capped_by_income() {
        let r = IncentiveRates {
            annual_taxable_income: Some(dec!(100_000)),
            deduction_years: 5,
            ..rates()
        };
        let res = resolve_incentives(dec!(2_000_000), IncentiveScheme::IncomeTaxDeduction, &r);
        // Base 1M over 5 years = 200k/yr, capped at 50k/yr by income.
        assert_eq!(res.deduction_schedule.len(), 5);
        assert!(res
            .deduction_schedule
            .iter()
            .all(|d| d.deduction == dec!(50_000)));
        let last = res.deduction_schedule.last().unwrap();
        assert_eq!(last.remaining_base, dec!(750_000));
    }

    #[test]
    fn test_zero_income_yields_no_benefit() {
        let r = IncentiveRates {
            annual_taxable_income: Some(Decimal::ZERO),
            ..rates()
        };
        let res = resolve_incentives(dec!(2_000_000), IncentiveScheme::Full, &r);
        assert!(res.deduction_schedule.is_empty());
        assert_eq!(res.total_tax_benefit, Decimal::ZERO);
        assert!(res.deduction_base > Decimal::ZERO);
    }

    #[test]
    fn test_rates_are_clamped() {
        let r = IncentiveRates {
            vat_rate: dec!(3),
            duty_rate: dec!(-1),
            income_tax_rate: dec!(0.9),
            deduction_years: 40,
            annual_taxable_income: Some(dec!(-10)),
            lifetime_years: Some(5),
        };
        let c = r.clamped();
        assert_eq!(c.vat_rate, VAT_RATE_MAX);
        assert_eq!(c.duty_rate, Decimal::ZERO);
        assert_eq!(c.income_tax_rate, INCOME_TAX_RATE_MAX);
        assert_eq!(c.deduction_years, DEDUCTION_YEARS_MAX);
        assert_eq!(c.annual_taxable_income, Some(Decimal::ZERO));
        assert_eq!(c.lifetime_years, Some(5));

        let zero_years = IncentiveRates {
            deduction_years: 0,
            ..rates()
        };
        assert_eq!(zero_years.clamped().deduction_years, 1);
    }

    #[test]
    fn test_negative_capex_treated_as_zero() {
        let res = resolve_incentives(dec!(-5), IncentiveScheme::Full, &rates());
        assert_eq!(res.net_capex, Decimal::ZERO);
        assert!(res.deduction_schedule.is_empty());
    }
}
