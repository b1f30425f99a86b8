//! Core projection engine for annual pro forma projections

use serde::{Deserialize, Serialize};

use super::amortization::LoanTerms;
use super::cashflows::{ProjectionResult, YearProjection};
use super::irr::IrrSettings;
use super::state::ProjectionState;
use super::waterfall::DefaultSplit;
use crate::benchmarks::Benchmarks;
use crate::deal::DealAssumptions;

/// Exit cap rate perturbations swept by the sensitivity table (absolute)
pub const DEFAULT_EXIT_CAP_DELTAS: [f64; 7] = [-0.010, -0.005, 0.0, 0.005, 0.010, 0.015, 0.020];

/// Configuration for a projection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// IRR solver settings
    pub irr: IrrSettings,

    /// Split applied when a period has no governing waterfall tier
    pub default_split: DefaultSplit,

    /// Exit cap rate deltas for the sensitivity table
    pub exit_cap_deltas: Vec<f64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            irr: IrrSettings::default(),
            default_split: DefaultSplit::default(),
            exit_cap_deltas: DEFAULT_EXIT_CAP_DELTAS.to_vec(),
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    benchmarks: Benchmarks,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given benchmarks and config
    pub fn new(benchmarks: Benchmarks, config: ProjectionConfig) -> Self {
        Self { benchmarks, config }
    }

    pub fn benchmarks(&self) -> &Benchmarks {
        &self.benchmarks
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Expense ratio benchmark for the deal's property type
    pub fn expense_ratio(&self, deal: &DealAssumptions) -> f64 {
        self.benchmarks.expense_ratios.ratio(deal.property_type)
    }

    /// Run the annual projection over the hold period
    pub fn project(&self, deal: &DealAssumptions) -> ProjectionResult {
        let mut result = ProjectionResult::new(deal.deal_name.clone());
        let expense_ratio = self.expense_ratio(deal);
        let mut state = ProjectionState::from_deal(deal, expense_ratio);
        let loan = LoanTerms::from_deal(deal);

        if 1.0 - deal.vacancy_rate - expense_ratio <= 0.0 {
            log::warn!(
                "{}: vacancy {:.2} plus expense ratio {:.2} leaves no margin; revenue decomposition skipped",
                deal.deal_name,
                deal.vacancy_rate,
                expense_ratio
            );
        }

        log::debug!(
            "Projecting {} over {} years (stabilizes in year {}, net growth {:.4})",
            deal.deal_name,
            deal.hold_period_years,
            state.stabilization_year,
            state.net_growth_rate
        );

        for _year in 1..=deal.hold_period_years {
            state.advance_year();
            let row = self.calculate_year(deal, &loan, &state);
            result.add_year(row);
        }

        result
    }

    /// Calculate one hold year
    fn calculate_year(&self, deal: &DealAssumptions, loan: &LoanTerms, state: &ProjectionState) -> YearProjection {
        let noi = state.noi();

        // Decomposition is for display only; `noi` above drives cash flow
        let margin = 1.0 - deal.vacancy_rate - state.expense_ratio;
        let (gross_revenue, vacancy_loss, operating_expenses) = if margin > 0.0 {
            let gross = noi / margin;
            (gross, gross * deal.vacancy_rate, gross * state.expense_ratio)
        } else {
            (noi, 0.0, 0.0)
        };

        let debt_service = loan.annual_debt_service(state.year);
        let cash_flow_after_debt = noi - debt_service;

        let cash_on_cash = if deal.total_equity_raise > 0.0 {
            cash_flow_after_debt / deal.total_equity_raise
        } else {
            0.0
        };

        let dscr = if debt_service > 0.0 { noi / debt_service } else { 0.0 };

        YearProjection {
            year: state.year,
            gross_revenue,
            vacancy_loss,
            effective_gross_income: gross_revenue - vacancy_loss,
            operating_expenses,
            noi,
            debt_service,
            loan_balance: loan.balance_at(state.year),
            cash_flow_after_debt,
            cash_on_cash,
            dscr,
        }
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(Benchmarks::default_underwriting(), ProjectionConfig::default())
    }
}

/// Project a deal with the standard benchmarks
pub fn project(deal: &DealAssumptions) -> Vec<YearProjection> {
    ProjectionEngine::default().project(deal).years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{sample_deal, PropertyType};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_projection_runs() {
        let deal = sample_deal();
        let years = project(&deal);

        assert_eq!(years.len(), 5);
        for (i, row) in years.iter().enumerate() {
            assert_eq!(row.year, i as u32 + 1);
        }
    }

    #[test]
    fn test_value_add_noi_path() {
        let deal = sample_deal();
        let years = project(&deal);

        // Renovation budget => stabilizes in year 2
        assert_abs_diff_eq!(years[0].noi, 625_000.0, epsilon = 1e-9);
        assert_eq!(years[1].noi, 700_000.0);

        // Multifamily: 3% rent growth less 2.5% expense growth x 0.40
        let growth = 0.03 - 0.025 * 0.40;
        assert_abs_diff_eq!(years[2].noi, 700_000.0 * (1.0 + growth), epsilon = 1e-6);
        assert_abs_diff_eq!(years[4].noi, 700_000.0 * (1.0 + growth).powi(3), epsilon = 1e-6);
    }

    #[test]
    fn test_revenue_decomposition_reconciles_to_noi() {
        let deal = sample_deal();
        for row in project(&deal) {
            let rebuilt = row.gross_revenue - row.vacancy_loss - row.operating_expenses;
            assert_abs_diff_eq!(rebuilt, row.noi, epsilon = 1e-6);
            assert_abs_diff_eq!(row.effective_gross_income, row.gross_revenue - row.vacancy_loss, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_debt_metrics_follow_amortization() {
        let deal = sample_deal();
        let years = project(&deal);
        let loan = LoanTerms::from_deal(&deal);

        // 24-month IO on $7M at 6%
        assert_abs_diff_eq!(years[0].debt_service, 420_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(years[1].debt_service, 420_000.0, epsilon = 1e-6);
        assert_eq!(years[1].loan_balance, 7_000_000.0);
        assert_abs_diff_eq!(years[2].debt_service, loan.monthly_payment() * 12.0, epsilon = 1e-9);
        assert!(years[2].loan_balance < 7_000_000.0);

        let year1 = &years[0];
        assert_abs_diff_eq!(year1.cash_flow_after_debt, 205_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(year1.cash_on_cash, 205_000.0 / 4_200_000.0, epsilon = 1e-12);
        assert_abs_diff_eq!(year1.dscr, 625_000.0 / 420_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unlevered_deal_has_zero_dscr() {
        let deal = DealAssumptions {
            loan_amount: 0.0,
            total_equity_raise: 0.0,
            pro_forma_noi: 300_000.0,
            ..sample_deal()
        };
        let years = project(&deal);
        assert!(years.iter().all(|r| r.debt_service == 0.0 && r.dscr == 0.0));
        assert!(years.iter().all(|r| r.cash_on_cash == 0.0));
    }

    #[test]
    fn test_property_type_changes_growth() {
        let hotel = DealAssumptions {
            property_type: PropertyType::Hotel,
            ..sample_deal()
        };
        let industrial = DealAssumptions {
            property_type: PropertyType::Industrial,
            ..sample_deal()
        };

        // Heavier expense load drags post-stabilization growth harder
        let hotel_years = project(&hotel);
        let industrial_years = project(&industrial);
        assert!(hotel_years[4].noi < industrial_years[4].noi);
        assert!(hotel_years[0].gross_revenue > industrial_years[0].gross_revenue);
    }

    #[test]
    fn test_degenerate_margin_skips_decomposition() {
        let deal = DealAssumptions {
            property_type: PropertyType::Hotel,
            vacancy_rate: 0.40,
            ..sample_deal()
        };
        let years = project(&deal);
        assert_eq!(years[0].gross_revenue, years[0].noi);
        assert_eq!(years[0].operating_expenses, 0.0);
    }

    #[test]
    fn test_custom_benchmarks_flow_through() {
        use crate::benchmarks::ExpenseRatioTable;

        let benchmarks = Benchmarks {
            expense_ratios: ExpenseRatioTable::with_overrides(&[(PropertyType::Multifamily, 0.50)]),
            ..Benchmarks::default_underwriting()
        };
        let engine = ProjectionEngine::new(benchmarks, ProjectionConfig::default());
        let deal = sample_deal();

        assert_eq!(engine.expense_ratio(&deal), 0.50);
        let years = engine.project(&deal).years;
        assert_abs_diff_eq!(years[0].operating_expenses, years[0].gross_revenue * 0.50, epsilon = 1e-9);
    }
}
