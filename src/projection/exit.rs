//! Exit (reversion) analysis and total investor return

use serde::{Deserialize, Serialize};

use super::amortization::LoanTerms;
use super::cashflows::{ProjectionResult, YearProjection};
use super::irr::{solve_irr, IrrSettings, IrrSolution};
use crate::deal::DealAssumptions;

/// Terminal sale at the end of the hold period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitResult {
    pub exit_year: u32,
    pub exit_noi: f64,
    pub exit_cap_rate: f64,
    /// Direct capitalization value: exit NOI / exit cap rate
    pub exit_value: f64,
    pub loan_payoff: f64,
    pub disposition_fee: f64,
    /// Exit value less loan payoff and disposition fee
    pub net_proceeds: f64,
}

/// Investor-level returns across the hold and exit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorReturns {
    /// Sum of positive annual cash flow after debt
    pub operating_distributions: f64,
    pub net_proceeds: f64,
    pub total_return: f64,
    pub equity_multiple: f64,
    pub irr: IrrSolution,
    /// Stream fed to the IRR solver: equity outlay, then annual flows with sale proceeds in the final year
    pub equity_cash_flows: Vec<f64>,
}

/// Value the exit at the deal's exit cap rate
pub fn analyze_exit(deal: &DealAssumptions, final_year: &YearProjection) -> ExitResult {
    exit_at_cap_rate(deal, final_year, deal.exit_cap_rate)
}

/// Value the exit at an arbitrary cap rate (sensitivity scenarios)
pub fn exit_at_cap_rate(deal: &DealAssumptions, final_year: &YearProjection, exit_cap_rate: f64) -> ExitResult {
    let exit_noi = final_year.noi;
    let exit_value = if exit_cap_rate > 0.0 {
        exit_noi / exit_cap_rate
    } else {
        0.0
    };

    let loan_payoff = LoanTerms::from_deal(deal).balance_at(deal.hold_period_years);
    let disposition_fee = exit_value * deal.disposition_fee_rate;

    ExitResult {
        exit_year: deal.hold_period_years,
        exit_noi,
        exit_cap_rate,
        exit_value,
        loan_payoff,
        disposition_fee,
        net_proceeds: exit_value - loan_payoff - disposition_fee,
    }
}

/// Equity multiple and IRR for a projection and its exit
pub fn investor_returns(
    deal: &DealAssumptions,
    projection: &ProjectionResult,
    exit: &ExitResult,
    settings: &IrrSettings,
) -> InvestorReturns {
    let operating_distributions = projection.summary().positive_cash_flow;
    let total_return = operating_distributions + exit.net_proceeds;
    let equity_multiple = if deal.total_equity_raise > 0.0 {
        total_return / deal.total_equity_raise
    } else {
        0.0
    };

    let equity_cash_flows = equity_cash_flows(deal.total_equity_raise, &projection.cash_flows(), exit.net_proceeds);
    let irr = solve_irr(&equity_cash_flows, settings);

    InvestorReturns {
        operating_distributions,
        net_proceeds: exit.net_proceeds,
        total_return,
        equity_multiple,
        irr,
        equity_cash_flows,
    }
}

/// `[-equity, cf_1, ..., cf_n + net_proceeds]`
pub fn equity_cash_flows(total_equity: f64, annual_cash_flows: &[f64], net_proceeds: f64) -> Vec<f64> {
    let mut flows = Vec::with_capacity(annual_cash_flows.len() + 1);
    flows.push(-total_equity);
    flows.extend_from_slice(annual_cash_flows);
    match flows.len() {
        1 => flows.push(net_proceeds),
        n => flows[n - 1] += net_proceeds,
    }
    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::sample_deal;
    use crate::projection::ProjectionEngine;
    use approx::assert_abs_diff_eq;

    fn final_year_with_noi(noi: f64) -> YearProjection {
        YearProjection {
            year: 5,
            gross_revenue: 0.0,
            vacancy_loss: 0.0,
            effective_gross_income: 0.0,
            operating_expenses: 0.0,
            noi,
            debt_service: 0.0,
            loan_balance: 0.0,
            cash_flow_after_debt: noi,
            cash_on_cash: 0.0,
            dscr: 0.0,
        }
    }

    #[test]
    fn test_direct_capitalization() {
        let deal = DealAssumptions {
            exit_cap_rate: 0.06,
            ..Default::default()
        };
        let exit = analyze_exit(&deal, &final_year_with_noi(500_000.0));
        assert_abs_diff_eq!(exit.exit_value, 8_333_333.33, epsilon = 0.01);
        assert_eq!(exit.loan_payoff, 0.0);
        assert_abs_diff_eq!(exit.net_proceeds, exit.exit_value, epsilon = 1e-9);
    }

    #[test]
    fn test_non_positive_cap_rate_yields_zero_value() {
        let deal = DealAssumptions::default();
        let exit = analyze_exit(&deal, &final_year_with_noi(500_000.0));
        assert_eq!(exit.exit_value, 0.0);
    }

    #[test]
    fn test_net_proceeds_deduct_payoff_and_fee() {
        let deal = sample_deal();
        let projection = ProjectionEngine::default().project(&deal);
        let final_year = projection.final_year().unwrap();
        let exit = analyze_exit(&deal, final_year);

        assert_eq!(exit.exit_year, 5);
        assert_eq!(exit.exit_noi, final_year.noi);
        assert_abs_diff_eq!(exit.loan_payoff, final_year.loan_balance, epsilon = 1e-9);
        assert_abs_diff_eq!(exit.disposition_fee, exit.exit_value * 0.01, epsilon = 1e-9);
        assert_abs_diff_eq!(
            exit.net_proceeds,
            exit.exit_value - exit.loan_payoff - exit.disposition_fee,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_investor_returns() {
        let deal = sample_deal();
        let projection = ProjectionEngine::default().project(&deal);
        let exit = analyze_exit(&deal, projection.final_year().unwrap());
        let returns = investor_returns(&deal, &projection, &exit, &IrrSettings::default());

        let positive: f64 = projection.years.iter().map(|r| r.cash_flow_after_debt.max(0.0)).sum();
        assert_abs_diff_eq!(returns.total_return, positive + exit.net_proceeds, epsilon = 1e-6);
        assert_abs_diff_eq!(returns.equity_multiple, returns.total_return / 4_200_000.0, epsilon = 1e-12);

        assert_eq!(returns.equity_cash_flows.len(), 6);
        assert_eq!(returns.equity_cash_flows[0], -4_200_000.0);
        assert!(returns.irr.converged);
        assert!(returns.irr.rate > 0.0 && returns.irr.rate < 1.0);
    }

    #[test]
    fn test_equity_cash_flows_shape() {
        assert_eq!(equity_cash_flows(100.0, &[10.0, 12.0], 150.0), vec![-100.0, 10.0, 162.0]);
        assert_eq!(equity_cash_flows(100.0, &[], 150.0), vec![-100.0, 150.0]);
    }
}
