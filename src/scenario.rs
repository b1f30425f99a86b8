//! Exit cap rate sensitivity analysis
//!
//! Re-values the exit and re-solves investor returns under a grid of exit
//! cap rate perturbations. The hold-period projection is shared; each
//! scenario only touches the reversion, so scenarios run in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::deal::DealAssumptions;
use crate::projection::{
    exit_at_cap_rate, investor_returns, IrrSettings, ProjectionConfig, ProjectionResult, DEFAULT_EXIT_CAP_DELTAS,
};

/// One row of the sensitivity table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityScenario {
    /// Absolute change applied to the base exit cap rate
    pub cap_rate_delta: f64,
    pub exit_cap_rate: f64,
    pub exit_value: f64,
    pub net_proceeds: f64,
    pub equity_multiple: f64,
    pub irr: f64,
    pub irr_converged: bool,
}

/// Sweeps exit cap rates around the deal's base assumption
#[derive(Debug, Clone)]
pub struct SensitivityAnalyzer {
    deltas: Vec<f64>,
    irr_settings: IrrSettings,
}

impl SensitivityAnalyzer {
    /// Standard grid: -1.0% to +2.0% in 50bp steps
    pub fn new() -> Self {
        Self {
            deltas: DEFAULT_EXIT_CAP_DELTAS.to_vec(),
            irr_settings: IrrSettings::default(),
        }
    }

    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self {
            deltas: config.exit_cap_deltas.clone(),
            irr_settings: config.irr,
        }
    }

    /// Use a custom grid of cap rate deltas
    pub fn with_deltas(mut self, deltas: Vec<f64>) -> Self {
        self.deltas = deltas;
        self
    }

    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    /// Build the sensitivity table, in grid order.
    ///
    /// Scenarios whose perturbed cap rate is not positive are dropped.
    pub fn run(&self, deal: &DealAssumptions, projection: &ProjectionResult) -> Vec<SensitivityScenario> {
        let Some(final_year) = projection.final_year() else {
            return Vec::new();
        };

        self.deltas
            .par_iter()
            .filter_map(|&delta| {
                let exit_cap_rate = deal.exit_cap_rate + delta;
                if exit_cap_rate <= 0.0 {
                    return None;
                }

                let exit = exit_at_cap_rate(deal, final_year, exit_cap_rate);
                let returns = investor_returns(deal, projection, &exit, &self.irr_settings);

                Some(SensitivityScenario {
                    cap_rate_delta: delta,
                    exit_cap_rate,
                    exit_value: exit.exit_value,
                    net_proceeds: exit.net_proceeds,
                    equity_multiple: returns.equity_multiple,
                    irr: returns.irr.rate,
                    irr_converged: returns.irr.converged,
                })
            })
            .collect()
    }
}

impl Default for SensitivityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
