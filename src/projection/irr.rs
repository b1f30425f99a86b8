//! Internal Rate of Return (IRR) calculation
//!
//! Used to compute investor IRR from annual equity cash flows (index 0 is the
//! initial equity outlay). The solver is best-effort: it never reports a
//! failure, it returns whatever rate it reached within the iteration budget.

use serde::{Deserialize, Serialize};

/// Default Newton-Raphson starting rate (10%)
pub const DEFAULT_INITIAL_GUESS: f64 = 0.10;

/// Default tolerance on |NPV|
pub const DEFAULT_TOLERANCE: f64 = 0.0001;

/// Default iteration budget
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Iterates outside [DIVERGENCE_FLOOR, DIVERGENCE_CEILING] are pulled back
const DIVERGENCE_FLOOR: f64 = -0.99;
const DIVERGENCE_CEILING: f64 = 10.0;
const RESET_LOW: f64 = -0.5;
const RESET_HIGH: f64 = 5.0;

const MIN_DERIVATIVE: f64 = 1e-10;

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSettings {
    pub max_iterations: u32,
    pub tolerance: f64,
    pub initial_guess: f64,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            initial_guess: DEFAULT_INITIAL_GUESS,
        }
    }
}

/// Solver output with a convergence-quality signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Best rate found (annual, decimal)
    pub rate: f64,

    /// NPV at `rate`; near zero when the solver converged
    pub npv_residual: f64,

    /// Newton steps taken
    pub iterations: u32,

    /// Whether |NPV| fell below the tolerance
    pub converged: bool,
}

impl IrrSolution {
    fn unsolved() -> Self {
        Self {
            rate: 0.0,
            npv_residual: 0.0,
            iterations: 0,
            converged: false,
        }
    }
}

/// Calculate the IRR of an annual cash-flow stream with default settings
pub fn irr(cashflows: &[f64]) -> f64 {
    solve_irr(cashflows, &IrrSettings::default()).rate
}

/// Newton-Raphson IRR with bounded divergence handling
pub fn solve_irr(cashflows: &[f64], settings: &IrrSettings) -> IrrSolution {
    if cashflows.len() < 2 {
        return IrrSolution::unsolved();
    }

    let mut rate = settings.initial_guess;
    let mut iterations = 0;

    for _ in 0..settings.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if npv.abs() < settings.tolerance {
            return IrrSolution {
                rate,
                npv_residual: npv,
                iterations,
                converged: true,
            };
        }

        if dnpv.abs() < MIN_DERIVATIVE {
            // Flat NPV curve; stepping would blow up
            break;
        }

        let mut next = rate - npv / dnpv;
        if next < DIVERGENCE_FLOOR {
            next = RESET_LOW;
        } else if next > DIVERGENCE_CEILING {
            next = RESET_HIGH;
        }

        rate = next;
        iterations += 1;
    }

    let npv = npv_at_rate(cashflows, rate);
    let converged = npv.abs() < settings.tolerance;
    if !converged {
        log::debug!(
            "IRR did not converge after {} iterations (rate {:.6}, |NPV| {:.6})",
            iterations,
            rate,
            npv.abs()
        );
    }

    IrrSolution {
        rate,
        npv_residual: npv,
        iterations,
        converged,
    }
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / ((1.0 + rate).powi(t as i32 + 1));
        }
    }

    (npv, dnpv)
}

/// Calculate NPV at a given annual rate (cash flow 0 undiscounted)
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}
