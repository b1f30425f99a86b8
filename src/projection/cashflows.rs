//! Annual projection output structures

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::ProformaResult;

/// A single row of projection output for one hold year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,

    // Revenue decomposition (display only)
    pub gross_revenue: f64,
    pub vacancy_loss: f64,
    pub effective_gross_income: f64,
    pub operating_expenses: f64,

    /// NOI driving every downstream number
    pub noi: f64,

    // Debt
    pub debt_service: f64,
    pub loan_balance: f64,

    // Returns
    pub cash_flow_after_debt: f64,
    pub cash_on_cash: f64,
    pub dscr: f64,
}

impl YearProjection {
    /// Share of gross revenue needed to cover opex and debt service
    pub fn breakeven_occupancy(&self) -> f64 {
        if self.gross_revenue > 0.0 {
            (self.operating_expenses + self.debt_service) / self.gross_revenue
        } else {
            0.0
        }
    }
}

/// Complete projection result for one deal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub deal_name: String,

    /// Annual rows in ascending year order
    pub years: Vec<YearProjection>,
}

impl ProjectionResult {
    pub fn new(deal_name: impl Into<String>) -> Self {
        Self {
            deal_name: deal_name.into(),
            years: Vec::new(),
        }
    }

    pub fn add_year(&mut self, row: YearProjection) {
        self.years.push(row);
    }

    pub fn first_year(&self) -> Option<&YearProjection> {
        self.years.first()
    }

    pub fn final_year(&self) -> Option<&YearProjection> {
        self.years.last()
    }

    /// Annual cash flow after debt, in year order
    pub fn cash_flows(&self) -> Vec<f64> {
        self.years.iter().map(|r| r.cash_flow_after_debt).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_noi: f64 = self.years.iter().map(|r| r.noi).sum();
        let total_debt_service: f64 = self.years.iter().map(|r| r.debt_service).sum();
        let total_cash_flow: f64 = self.years.iter().map(|r| r.cash_flow_after_debt).sum();
        let positive_cash_flow: f64 = self
            .years
            .iter()
            .map(|r| r.cash_flow_after_debt.max(0.0))
            .sum();

        let average_cash_on_cash = if self.years.is_empty() {
            0.0
        } else {
            self.years.iter().map(|r| r.cash_on_cash).sum::<f64>() / self.years.len() as f64
        };

        // Years without debt service have no meaningful coverage ratio
        let min_dscr = self
            .years
            .iter()
            .filter(|r| r.debt_service > 0.0)
            .map(|r| r.dscr)
            .reduce(f64::min);

        ProjectionSummary {
            total_years: self.years.len() as u32,
            total_noi,
            total_debt_service,
            total_cash_flow,
            positive_cash_flow,
            average_cash_on_cash,
            min_dscr,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_noi: f64,
    pub total_debt_service: f64,
    pub total_cash_flow: f64,
    /// Sum of the positive annual cash flows only
    pub positive_cash_flow: f64,
    pub average_cash_on_cash: f64,
    /// Lowest DSCR among years carrying debt service
    pub min_dscr: Option<f64>,
}

/// Write the annual table as CSV
pub fn write_projection_csv<W: Write>(writer: W, result: &ProjectionResult) -> ProformaResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in &result.years {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
