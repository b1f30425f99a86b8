//! Projection state tracking for a single deal

use crate::deal::DealAssumptions;

/// Per-run constants and the current year of a projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current hold year (1-indexed, 0 before the first advance)
    pub year: u32,

    /// Year in which pro forma NOI is reached
    pub stabilization_year: u32,

    /// Operating expenses as a fraction of gross revenue
    pub expense_ratio: f64,

    /// Post-stabilization NOI growth: rent growth net of expense drag
    pub net_growth_rate: f64,

    pub current_noi: f64,

    pub pro_forma_noi: f64,
}

impl ProjectionState {
    /// Initialize state from a deal at closing
    pub fn from_deal(deal: &DealAssumptions, expense_ratio: f64) -> Self {
        Self {
            year: 0,
            stabilization_year: deal.stabilization_year(),
            expense_ratio,
            net_growth_rate: deal.rent_growth_rate - deal.expense_growth_rate * expense_ratio,
            current_noi: deal.current_noi,
            pro_forma_noi: deal.pro_forma_noi,
        }
    }

    /// Advance to next year
    pub fn advance_year(&mut self) {
        self.year += 1;
    }

    pub fn is_stabilized(&self) -> bool {
        self.year >= self.stabilization_year
    }

    /// NOI for the current year.
    ///
    /// Before stabilization NOI moves linearly from in-place toward pro forma;
    /// afterwards it compounds from pro forma at the net growth rate.
    pub fn noi(&self) -> f64 {
        if self.year < self.stabilization_year {
            let progress = self.year as f64 / self.stabilization_year as f64;
            self.current_noi + (self.pro_forma_noi - self.current_noi) * progress
        } else if self.year == self.stabilization_year {
            self.pro_forma_noi
        } else {
            let years_past = (self.year - self.stabilization_year) as i32;
            self.pro_forma_noi * (1.0 + self.net_growth_rate).powi(years_past)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_value_add_ramp() {
        let deal = DealAssumptions {
            renovation_budget: 500_000.0,
            current_noi: 400_000.0,
            pro_forma_noi: 600_000.0,
            rent_growth_rate: 0.03,
            expense_growth_rate: 0.02,
            ..Default::default()
        };
        let mut state = ProjectionState::from_deal(&deal, 0.40);
        assert_abs_diff_eq!(state.net_growth_rate, 0.022, epsilon = 1e-12);

        state.advance_year();
        assert!(!state.is_stabilized());
        assert_abs_diff_eq!(state.noi(), 500_000.0, epsilon = 1e-9);

        state.advance_year();
        assert!(state.is_stabilized());
        assert_eq!(state.noi(), 600_000.0);

        state.advance_year();
        assert_abs_diff_eq!(state.noi(), 600_000.0 * 1.022, epsilon = 1e-6);
    }

    #[test]
    fn test_stabilized_deal_starts_at_pro_forma() {
        let deal = DealAssumptions {
            current_noi: 400_000.0,
            pro_forma_noi: 450_000.0,
            ..Default::default()
        };
        let mut state = ProjectionState::from_deal(&deal, 0.40);
        state.advance_year();
        assert_eq!(state.stabilization_year, 1);
        assert_eq!(state.noi(), 450_000.0);
    }
}
