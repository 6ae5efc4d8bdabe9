//! Bounded bisection root finder.

use serde::{Deserialize, Serialize};

/// Closed search interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub lo: f64,
    pub hi: f64,
}

impl Bracket {
    pub fn new(lo: f64, hi: f64) -> Self {
        if lo <= hi {
            Self { lo, hi }
        } else {
            Self { lo: hi, hi: lo }
        }
    }

    pub fn midpoint(&self) -> f64 {
        self.lo + (self.hi - self.lo) / 2.0
    }
}

/// Stopping rules for [`bisect`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BisectionConfig {
    /// Converged once `|f(mid)|` drops below this.
    pub tolerance: f64,
    pub max_iterations: u32,
}

/// What a bisection run ended with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BisectionOutcome {
    Converged {
        root: f64,
        iterations: u32,
    },
    /// Budget exhausted (or the bracket stopped shrinking) before the
    /// residual met the tolerance. `estimate` is the final bracket midpoint.
    NotConverged {
        estimate: f64,
        iterations: u32,
        residual: f64,
    },
    /// `f(lo)` and `f(hi)` share a sign.
    NoSignChange,
    /// `f` produced NaN or an infinity during the search.
    NonFinite,
}

impl BisectionOutcome {
    /// Best available root: the converged value or the best-effort estimate.
    pub fn value(&self) -> Option<f64> {
        match self {
            BisectionOutcome::Converged { root, .. } => Some(*root),
            BisectionOutcome::NotConverged { estimate, .. } => Some(*estimate),
            BisectionOutcome::NoSignChange | BisectionOutcome::NonFinite => None,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, BisectionOutcome::Converged { .. })
    }
}

/// Find `x` in `bracket` with `f(x) ≈ 0`.
///
/// Requires `f` to change sign across the bracket. An exact zero at either
/// end is returned immediately as converged.
pub fn bisect<F>(f: F, bracket: Bracket, config: BisectionConfig) -> BisectionOutcome
where
    F: Fn(f64) -> f64,
{
    let Bracket { mut lo, mut hi } = bracket;

    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if !f_lo.is_finite() || !f_hi.is_finite() {
        return BisectionOutcome::NonFinite;
    }
    if f_lo == 0.0 {
        return BisectionOutcome::Converged {
            root: lo,
            iterations: 0,
        };
    }
    if f_hi == 0.0 {
        return BisectionOutcome::Converged {
            root: hi,
            iterations: 0,
        };
    }
    if f_lo.signum() == f_hi.signum() {
        return BisectionOutcome::NoSignChange;
    }

    let mut residual = f_lo.abs();
    for iter in 1..=config.max_iterations {
        let mid = lo + (hi - lo) / 2.0;
        let f_mid = f(mid);
        if !f_mid.is_finite() {
            return BisectionOutcome::NonFinite;
        }
        residual = f_mid.abs();

        if residual < config.tolerance {
            return BisectionOutcome::Converged {
                root: mid,
                iterations: iter,
            };
        }

        // Bracket collapsed to adjacent floats; further halving is a no-op.
        if mid <= lo || mid >= hi {
            return BisectionOutcome::NotConverged {
                estimate: mid,
                iterations: iter,
                residual,
            };
        }

        if f_lo.signum() == f_mid.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    BisectionOutcome::NotConverged {
        estimate: lo + (hi - lo) / 2.0,
        iterations: config.max_iterations,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFG: BisectionConfig = BisectionConfig {
        tolerance: 1e-10,
        max_iterations: 200,
    };

    #[test]
    fn test_square_root_of_two() {
        let out = bisect(|x| x * x - 2.0, Bracket::new(0.0, 2.0), CFG);
        let root = out.value().unwrap();
        assert!(out.is_converged());
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_reversed_bracket_is_normalised() {
        let b = Bracket::new(3.0, -1.0);
        assert_eq!(b.lo, -1.0);
        assert_eq!(b.hi, 3.0);
        assert_eq!(b.midpoint(), 1.0);
    }

    #[test]
    fn test_no_sign_change() {
        let out = bisect(|x| x * x + 1.0, Bracket::new(-1.0, 1.0), CFG);
        assert_eq!(out, BisectionOutcome::NoSignChange);
        assert_eq!(out.value(), None);
    }

    #[test]
    fn test_non_finite_endpoint() {
        let out = bisect(|x| 1.0 / x, Bracket::new(0.0, 1.0), CFG);
        assert_eq!(out, BisectionOutcome::NonFinite);
    }

    #[test]
    fn test_exact_zero_at_endpoint() {
        let out = bisect(|x| x - 1.0, Bracket::new(1.0, 4.0), CFG);
        assert_eq!(
            out,
            BisectionOutcome::Converged {
                root: 1.0,
                iterations: 0
            }
        );
    }

    #[test]
    fn test_budget_exhaustion_returns_midpoint_estimate() {
        let cfg = BisectionConfig {
            tolerance: 1e-12,
            max_iterations: 3,
        };
        let out = bisect(|x| x - 0.3, Bracket::new(0.0, 1.0), cfg);
        match out {
            BisectionOutcome::NotConverged {
                estimate,
                iterations,
                ..
            } => {
                assert_eq!(iterations, 3);
                // [0,1] -> [0,0.5] -> [0.25,0.5] -> [0.25,0.375]
                assert!((estimate - 0.3125).abs() < 1e-12);
            }
            other => panic!("expected NotConverged, got {other:?}"),
        }
    }
}
