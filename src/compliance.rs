//! Advisory underwriting and disclosure checks
//!
//! Rules never gate document generation. Each one reports pass/fail with a
//! note carrying the computed values so the document layer can render it.

use serde::{Deserialize, Serialize};

use crate::deal::{DealAssumptions, WaterfallTier};
use crate::projection::{ProjectionResult, YearProjection};

/// Numeric thresholds applied by the rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplianceThresholds {
    /// Year-1 debt service coverage floor
    pub min_dscr: f64,
    /// Coverage floor for every levered year of the hold
    pub min_hold_dscr: f64,
    pub max_ltv: f64,
    /// Breakeven occupancy below this is favorable
    pub breakeven_favorable: f64,
    /// Breakeven occupancy below this is still acceptable
    pub breakeven_acceptable: f64,
    /// Largest tolerated |sources - uses| / uses
    pub max_capital_stack_gap: f64,
    pub irr_floor: f64,
    pub irr_ceiling: f64,
    /// Sponsor equity as a share of total equity
    pub min_sponsor_coinvest: f64,
    /// Allowed deviation of LP + GP split from 1.0
    pub split_tolerance: f64,
}

impl Default for ComplianceThresholds {
    fn default() -> Self {
        Self {
            min_dscr: 1.25,
            min_hold_dscr: 1.0,
            max_ltv: 0.75,
            breakeven_favorable: 0.85,
            breakeven_acceptable: 0.90,
            max_capital_stack_gap: 0.05,
            irr_floor: -0.20,
            irr_ceiling: 1.00,
            min_sponsor_coinvest: 0.01,
            split_tolerance: 1e-6,
        }
    }
}

/// Outcome of a single rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheckResult {
    pub name: String,
    /// Regulation or underwriting standard the rule is drawn from
    pub regulation: String,
    pub passed: bool,
    pub note: String,
}

impl ComplianceCheckResult {
    fn new(name: &str, regulation: &str, passed: bool, note: String) -> Self {
        Self {
            name: name.to_string(),
            regulation: regulation.to_string(),
            passed,
            note,
        }
    }
}

const DSCR_STANDARD: &str = "Agency multifamily underwriting guidelines (minimum DSCR)";
const LTV_STANDARD: &str = "Interagency real estate lending standards, 12 CFR Part 34 Subpart D";
const BREAKEVEN_STANDARD: &str = "Lender underwriting practice (breakeven occupancy)";
const CAPITAL_STACK_STANDARD: &str = "Regulation D Rule 502(b) use-of-proceeds disclosure";
const IRR_STANDARD: &str = "SEC Marketing Rule, 17 CFR 275.206(4)-1 (hypothetical performance)";
const MATURITY_STANDARD: &str = "Lender underwriting practice (maturity and refinance risk)";
const WATERFALL_STANDARD: &str = "Operating agreement distribution provisions";
const SPONSOR_STANDARD: &str = "Sponsor alignment of interest (GP co-investment)";

/// Stateless rule set evaluated against a deal and its projection
#[derive(Debug, Clone, Default)]
pub struct ComplianceRuleEngine {
    thresholds: ComplianceThresholds,
}

impl ComplianceRuleEngine {
    pub fn new(thresholds: ComplianceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ComplianceThresholds {
        &self.thresholds
    }

    /// Run every rule; results come back in a fixed order
    pub fn evaluate(&self, deal: &DealAssumptions, projection: &ProjectionResult, irr: f64) -> Vec<ComplianceCheckResult> {
        let first_year = projection.first_year();
        vec![
            self.check_dscr(first_year),
            self.check_hold_dscr(projection),
            self.check_ltv(deal),
            self.check_breakeven_occupancy(first_year),
            self.check_capital_stack(deal),
            self.check_irr_plausibility(irr),
            self.check_loan_maturity(deal),
            self.check_waterfall_splits(deal),
            self.check_sponsor_coinvest(deal),
        ]
    }

    pub fn check_dscr(&self, first_year: Option<&YearProjection>) -> ComplianceCheckResult {
        const NAME: &str = "Debt Service Coverage";
        let min = self.thresholds.min_dscr;

        let Some(year) = first_year else {
            return ComplianceCheckResult::new(NAME, DSCR_STANDARD, false, "No projection years to evaluate".to_string());
        };

        if year.debt_service <= 0.0 {
            return ComplianceCheckResult::new(
                NAME,
                DSCR_STANDARD,
                true,
                "No year-1 debt service; coverage requirement not applicable".to_string(),
            );
        }

        let passed = year.dscr >= min;
        let note = format!(
            "Year-1 DSCR {:.2}x (NOI ${:.0} / debt service ${:.0}) {} the {:.2}x minimum",
            year.dscr,
            year.noi,
            year.debt_service,
            if passed { "meets" } else { "is below" },
            min
        );
        ComplianceCheckResult::new(NAME, DSCR_STANDARD, passed, note)
    }

    pub fn check_hold_dscr(&self, projection: &ProjectionResult) -> ComplianceCheckResult {
        const NAME: &str = "Hold-Period Minimum Coverage";
        let floor = self.thresholds.min_hold_dscr;

        let weakest = projection
            .years
            .iter()
            .filter(|r| r.debt_service > 0.0)
            .min_by(|a, b| a.dscr.total_cmp(&b.dscr));

        match weakest {
            None => ComplianceCheckResult::new(
                NAME,
                DSCR_STANDARD,
                true,
                "No levered years in the hold period".to_string(),
            ),
            Some(year) => {
                let passed = year.dscr >= floor;
                let note = format!(
                    "Lowest DSCR {:.2}x in year {} ({} {:.2}x)",
                    year.dscr,
                    year.year,
                    if passed { "at or above" } else { "below" },
                    floor
                );
                ComplianceCheckResult::new(NAME, DSCR_STANDARD, passed, note)
            }
        }
    }

    pub fn check_ltv(&self, deal: &DealAssumptions) -> ComplianceCheckResult {
        let ltv = deal.loan_to_value();
        let max = self.thresholds.max_ltv;
        let passed = ltv <= max;
        let note = if passed {
            format!("LTV {:.1}% is within the {:.0}% guideline", ltv * 100.0, max * 100.0)
        } else {
            format!(
                "LTV {:.1}% exceeds the {:.0}% guideline; flag for lender and investor disclosure",
                ltv * 100.0,
                max * 100.0
            )
        };
        ComplianceCheckResult::new("Loan-to-Value", LTV_STANDARD, passed, note)
    }

    pub fn check_breakeven_occupancy(&self, first_year: Option<&YearProjection>) -> ComplianceCheckResult {
        const NAME: &str = "Breakeven Occupancy";

        let Some(year) = first_year.filter(|y| y.gross_revenue > 0.0) else {
            return ComplianceCheckResult::new(
                NAME,
                BREAKEVEN_STANDARD,
                false,
                "No year-1 gross revenue; breakeven occupancy undefined".to_string(),
            );
        };

        let breakeven = year.breakeven_occupancy();
        let (passed, assessment) = if breakeven < self.thresholds.breakeven_favorable {
            (true, "favorable")
        } else if breakeven < self.thresholds.breakeven_acceptable {
            (true, "acceptable")
        } else {
            (false, "elevated")
        };

        let note = format!(
            "Breakeven occupancy {:.1}% is {} (opex ${:.0} + debt service ${:.0} over gross revenue ${:.0})",
            breakeven * 100.0,
            assessment,
            year.operating_expenses,
            year.debt_service,
            year.gross_revenue
        );
        ComplianceCheckResult::new(NAME, BREAKEVEN_STANDARD, passed, note)
    }

    pub fn check_capital_stack(&self, deal: &DealAssumptions) -> ComplianceCheckResult {
        let sources = deal.total_sources();
        let uses = deal.total_project_cost();
        let gap = if uses > 0.0 { (sources - uses).abs() / uses } else { 0.0 };
        let passed = uses > 0.0 && gap < self.thresholds.max_capital_stack_gap;

        let note = if uses <= 0.0 {
            "No uses of funds recorded; sources and uses cannot be reconciled".to_string()
        } else {
            format!(
                "Sources ${:.0} (equity ${:.0} + debt ${:.0}) vs uses ${:.0}: gap {:.1}%",
                sources,
                deal.total_equity_raise,
                deal.loan_amount,
                uses,
                gap * 100.0
            )
        };
        ComplianceCheckResult::new("Capital Stack Balance", CAPITAL_STACK_STANDARD, passed, note)
    }

    pub fn check_irr_plausibility(&self, irr: f64) -> ComplianceCheckResult {
        let floor = self.thresholds.irr_floor;
        let ceiling = self.thresholds.irr_ceiling;
        let passed = irr.is_finite() && irr >= floor && irr <= ceiling;
        let note = if passed {
            format!("Projected IRR {:.1}% is within the plausible range", irr * 100.0)
        } else {
            format!(
                "Projected IRR {:.1}% is outside [{:.0}%, {:.0}%]; review assumptions before presenting",
                irr * 100.0,
                floor * 100.0,
                ceiling * 100.0
            )
        };
        ComplianceCheckResult::new("IRR Plausibility", IRR_STANDARD, passed, note)
    }

    pub fn check_loan_maturity(&self, deal: &DealAssumptions) -> ComplianceCheckResult {
        const NAME: &str = "Loan Maturity";
        if deal.loan_amount <= 0.0 {
            return ComplianceCheckResult::new(NAME, MATURITY_STANDARD, true, "All-equity acquisition".to_string());
        }

        let passed = deal.loan_term_years >= deal.hold_period_years;
        let note = if passed {
            format!(
                "{}-year loan term covers the {}-year hold",
                deal.loan_term_years, deal.hold_period_years
            )
        } else {
            format!(
                "{}-year loan matures before the {}-year hold ends; refinance required",
                deal.loan_term_years, deal.hold_period_years
            )
        };
        ComplianceCheckResult::new(NAME, MATURITY_STANDARD, passed, note)
    }

    pub fn check_waterfall_splits(&self, deal: &DealAssumptions) -> ComplianceCheckResult {
        const NAME: &str = "Waterfall Split Integrity";
        if deal.waterfall_tiers.is_empty() {
            return ComplianceCheckResult::new(
                NAME,
                WATERFALL_STANDARD,
                true,
                "No tiers defined; default 70/30 LP/GP split applies".to_string(),
            );
        }

        let hurdle_tiers: Vec<&WaterfallTier> =
            deal.waterfall_tiers.iter().filter(|tier| !tier.is_residual()).collect();
        let unbalanced: Vec<String> = hurdle_tiers
            .iter()
            .filter(|tier| (tier.split_total() - 1.0).abs() > self.thresholds.split_tolerance)
            .map(|tier| format!("{} ({:.2}%)", tier.name, tier.split_total() * 100.0))
            .collect();

        if unbalanced.is_empty() {
            ComplianceCheckResult::new(
                NAME,
                WATERFALL_STANDARD,
                true,
                format!("All {} hurdle tiers split 100% of their cash", hurdle_tiers.len()),
            )
        } else {
            ComplianceCheckResult::new(
                NAME,
                WATERFALL_STANDARD,
                false,
                format!("Tier splits do not total 100%: {}", unbalanced.join(", ")),
            )
        }
    }

    pub fn check_sponsor_coinvest(&self, deal: &DealAssumptions) -> ComplianceCheckResult {
        const NAME: &str = "Sponsor Co-Investment";
        let min = self.thresholds.min_sponsor_coinvest;

        if deal.total_equity_raise <= 0.0 {
            return ComplianceCheckResult::new(NAME, SPONSOR_STANDARD, false, "No equity raise recorded".to_string());
        }

        let share = deal.sponsor_equity / deal.total_equity_raise;
        let passed = share >= min;
        let note = format!(
            "Sponsor equity ${:.0} is {:.1}% of the raise ({} the {:.0}% minimum)",
            deal.sponsor_equity,
            share * 100.0,
            if passed { "meets" } else { "below" },
            min * 100.0
        );
        ComplianceCheckResult::new(NAME, SPONSOR_STANDARD, passed, note)
    }
}
