//! End-to-end deal analysis
//!
//! Runs the projection, exit, investor returns, per-period distributions,
//! sensitivity table and compliance checks for one deal and bundles them
//! into a `DealReport` for the document layer.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::compliance::{ComplianceCheckResult, ComplianceRuleEngine};
use crate::deal::{DealAssumptions, PropertyType};
use crate::error::{ProformaError, ProformaResult};
use crate::projection::{
    analyze_exit, investor_returns, ExitResult, InvestorReturns, ProjectionEngine, ProjectionResult,
    ProjectionSummary, TierAllocation, WaterfallCumulativeState, WaterfallEngine, YearProjection,
};
use crate::scenario::{SensitivityAnalyzer, SensitivityScenario};

/// Headline acquisition metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealMetrics {
    pub going_in_cap_rate: f64,
    pub stabilized_cap_rate: f64,
    pub loan_to_value: f64,
    pub total_project_cost: f64,
    pub total_sources: f64,
    /// Year-1 (opex + debt service) / gross revenue
    pub breakeven_occupancy: f64,
    /// Year-1 NOI / loan amount
    pub debt_yield: f64,
}

impl DealMetrics {
    pub fn calculate(deal: &DealAssumptions, first_year: Option<&YearProjection>) -> Self {
        let breakeven_occupancy = first_year.map_or(0.0, YearProjection::breakeven_occupancy);
        let debt_yield = match first_year {
            Some(year) if deal.loan_amount > 0.0 => year.noi / deal.loan_amount,
            _ => 0.0,
        };

        Self {
            going_in_cap_rate: deal.going_in_cap_rate(),
            stabilized_cap_rate: deal.stabilized_cap_rate(),
            loan_to_value: deal.loan_to_value(),
            total_project_cost: deal.total_project_cost(),
            total_sources: deal.total_sources(),
            breakeven_occupancy,
            debt_yield,
        }
    }
}

/// Waterfall output for one operating year or the sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodDistribution {
    pub year: u32,
    /// True for the reversion distribution at the end of the hold
    pub is_exit: bool,
    /// Cash fed to the waterfall (negative periods distribute nothing)
    pub distributable: f64,
    pub allocations: Vec<TierAllocation>,
    pub lp_total: f64,
    pub gp_total: f64,
    /// Lifetime LP distributions after this period
    pub cumulative_lp: f64,
    pub cumulative_gp: f64,
    /// Accrued preferred return not yet paid after this period
    pub preferred_return_shortfall: f64,
}

/// Everything the document layer renders for one deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealReport {
    pub deal_name: String,
    pub property_type: PropertyType,
    pub acquisition_date: Option<NaiveDate>,
    pub exit_date: Option<NaiveDate>,
    pub metrics: DealMetrics,
    pub projection: ProjectionResult,
    pub summary: ProjectionSummary,
    pub exit: ExitResult,
    pub returns: InvestorReturns,
    pub distributions: Vec<PeriodDistribution>,
    pub sensitivity: Vec<SensitivityScenario>,
    pub compliance: Vec<ComplianceCheckResult>,
}

impl DealReport {
    pub fn irr(&self) -> f64 {
        self.returns.irr.rate
    }

    pub fn equity_multiple(&self) -> f64 {
        self.returns.equity_multiple
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &ComplianceCheckResult> {
        self.compliance.iter().filter(|check| !check.passed)
    }

    pub fn total_lp_distributions(&self) -> f64 {
        self.distributions.last().map_or(0.0, |d| d.cumulative_lp)
    }

    pub fn total_gp_distributions(&self) -> f64 {
        self.distributions.last().map_or(0.0, |d| d.cumulative_gp)
    }
}

/// Runs every analysis stage for a deal against one projection engine
#[derive(Debug, Clone, Default)]
pub struct DealAnalyzer {
    engine: ProjectionEngine,
}

impl DealAnalyzer {
    pub fn new(engine: ProjectionEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    /// Analyze a deal. Only structural validation can fail; economic
    /// problems surface as failed compliance checks.
    pub fn analyze(&self, deal: &DealAssumptions) -> ProformaResult<DealReport> {
        deal.validate()?;

        let projection = self.engine.project(deal);
        let final_year = projection
            .final_year()
            .ok_or_else(|| ProformaError::invalid("holdPeriodYears", "projection produced no years"))?;

        let exit = analyze_exit(deal, final_year);
        let returns = investor_returns(deal, &projection, &exit, &self.engine.config().irr);
        let distributions = self.distributions(deal, &projection, &exit);

        let sensitivity = SensitivityAnalyzer::from_config(self.engine.config()).run(deal, &projection);
        let compliance = ComplianceRuleEngine::new(self.engine.benchmarks().compliance).evaluate(
            deal,
            &projection,
            returns.irr.rate,
        );

        let exit_date = deal
            .acquisition_date
            .and_then(|date| date.checked_add_months(Months::new(deal.hold_period_years.saturating_mul(12))));

        log::debug!(
            "{}: IRR {:.4} ({} iterations, converged: {}), multiple {:.2}x, {} of {} checks passed",
            deal.deal_name,
            returns.irr.rate,
            returns.irr.iterations,
            returns.irr.converged,
            returns.equity_multiple,
            compliance.iter().filter(|c| c.passed).count(),
            compliance.len()
        );

        Ok(DealReport {
            deal_name: deal.deal_name.clone(),
            property_type: deal.property_type,
            acquisition_date: deal.acquisition_date,
            exit_date,
            metrics: DealMetrics::calculate(deal, projection.first_year()),
            summary: projection.summary(),
            projection,
            exit,
            returns,
            distributions,
            sensitivity,
            compliance,
        })
    }

    /// Run the waterfall year by year, then on the sale proceeds, threading
    /// one cumulative state through in ascending order
    fn distributions(
        &self,
        deal: &DealAssumptions,
        projection: &ProjectionResult,
        exit: &ExitResult,
    ) -> Vec<PeriodDistribution> {
        let waterfall = WaterfallEngine::new(&deal.waterfall_tiers, deal.preferred_return, deal.total_equity_raise)
            .with_default_split(self.engine.config().default_split);
        let mut state = WaterfallCumulativeState::new();

        let operating = projection
            .years
            .iter()
            .map(|row| (row.year, false, row.cash_flow_after_debt.max(0.0)));
        let reversion = std::iter::once((exit.exit_year, true, exit.net_proceeds.max(0.0)));

        operating
            .chain(reversion)
            .map(|(year, is_exit, distributable)| {
                let allocations = waterfall.apply(distributable, Some(&mut state));
                PeriodDistribution {
                    year,
                    is_exit,
                    distributable,
                    lp_total: allocations.iter().map(|a| a.lp_amount).sum(),
                    gp_total: allocations.iter().map(|a| a.gp_amount).sum(),
                    allocations,
                    cumulative_lp: state.cumulative_lp,
                    cumulative_gp: state.cumulative_gp,
                    preferred_return_shortfall: waterfall.preferred_return_shortfall(&state, year),
                }
            })
            .collect()
    }
}

/// Analyze a deal with the standard benchmarks and configuration
pub fn analyze_deal(deal: &DealAssumptions) -> ProformaResult<DealReport> {
    DealAnalyzer::default().analyze(deal)
}
