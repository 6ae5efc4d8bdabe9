use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::numeric::{safe_div, to_f64};
use crate::solver::{bisect, BisectionConfig, BisectionOutcome, Bracket};
use crate::types::{Money, Rate};

/// Rate interval searched for the IRR.
pub const IRR_BRACKET: Bracket = Bracket { lo: -0.99, hi: 5.0 };

const IRR_SOLVER: BisectionConfig = BisectionConfig {
    tolerance: 1e-7,
    max_iterations: 140,
};

/// Net Present Value of a series of annual cash flows, `cash_flows[0]` at t = 0.
///
/// `None` when `1 + rate` is not positive or the sum overflows.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> Option<Money> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        result = result.checked_add(safe_div(*cf, discount)?)?;
    }

    Some(result)
}

/// NPV over `f64` for the bisection search only.
fn npv_f64(rate: f64, cash_flows: &[f64]) -> f64 {
    let one_plus_r = 1.0 + rate;
    let mut discount = 1.0;
    let mut result = 0.0;
    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        result += cf / discount;
    }
    result
}

/// Run the IRR bisection and report how it ended.
///
/// Returns [`BisectionOutcome::NoSignChange`] without searching when the
/// flows do not contain both a negative and a positive value.
pub fn irr_outcome(cash_flows: &[Money]) -> BisectionOutcome {
    let has_negative = cash_flows.iter().any(|cf| cf.is_sign_negative() && !cf.is_zero());
    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    if !has_negative || !has_positive {
        return BisectionOutcome::NoSignChange;
    }

    // Discount factors near -99% underflow a 28-digit decimal, so the
    // search runs over f64.
    let flows: Vec<f64> = cash_flows.iter().map(|cf| to_f64(*cf)).collect();
    bisect(|r| npv_f64(r, &flows), IRR_BRACKET, IRR_SOLVER)
}

/// Internal Rate of Return by bisection over [`IRR_BRACKET`].
///
/// `None` when the flows never change sign, NPV does not change sign across
/// the bracket, or NPV goes non-finite. An exhausted iteration budget still
/// yields the final bracket midpoint.
pub fn irr(cash_flows: &[Money]) -> Option<Rate> {
    let outcome = irr_outcome(cash_flows);
    if let BisectionOutcome::NotConverged {
        estimate,
        iterations,
        residual,
    } = outcome
    {
        debug!(estimate, iterations, residual, "IRR bisection did not converge; using midpoint");
    }
    outcome.value().and_then(Decimal::from_f64)
}

/// First year index whose cumulative cash flow is non-negative.
pub fn payback_year(cumulative: &[Money]) -> Option<u32> {
    cumulative
        .iter()
        .position(|c| *c >= Decimal::ZERO)
        .map(|idx| idx as u32)
}

/// First year index whose discounted cumulative cash flow is non-negative.
pub fn discounted_payback_year(rate: Rate, cash_flows: &[Money]) -> Option<u32> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }
    let mut discount = Decimal::ONE;
    let mut running = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        running = running.checked_add(safe_div(*cf, discount)?)?;
        if running >= Decimal::ZERO {
            return Some(t as u32);
        }
    }
    None
}

/// Year-1 net cash flow relative to the net capital cost.
pub fn first_year_return(cash_flows: &[Money], net_capex: Money) -> Option<Rate> {
    let year_one = cash_flows.get(1)?;
    safe_div(*year_one, net_capex)
}

/// Present value of a per-year series where `values[0]` sits at t = 1.
pub fn present_value_from_year_one(rate: Rate, values: &[Decimal]) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }
    let mut discount = Decimal::ONE;
    let mut pv = Decimal::ZERO;
    for v in values {
        discount = discount.checked_mul(one_plus_r)?;
        pv = pv.checked_add(safe_div(*v, discount)?)?;
    }
    Some(pv)
}
