//! Underwriting benchmarks: expense ratios and compliance thresholds
//!
//! `Benchmarks` is an explicit context object owned by the caller and passed
//! into the engines. There is no process-wide cache.

mod expense_ratio;
pub mod loader;

pub use expense_ratio::{ExpenseRatioTable, DEFAULT_EXPENSE_RATIO};

use std::path::Path;

use crate::compliance::ComplianceThresholds;
use crate::error::ProformaResult;

/// Container for all underwriting benchmarks
#[derive(Debug, Clone, Default)]
pub struct Benchmarks {
    pub expense_ratios: ExpenseRatioTable,
    pub compliance: ComplianceThresholds,
}

impl Benchmarks {
    /// Built-in benchmark table and lender thresholds
    pub fn default_underwriting() -> Self {
        Self {
            expense_ratios: ExpenseRatioTable::standard(),
            compliance: ComplianceThresholds::default(),
        }
    }

    /// Load overrides from CSV files in the default location (data/benchmarks/)
    pub fn from_csv() -> ProformaResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_BENCHMARKS_PATH))
    }

    /// Load overrides from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> ProformaResult<Self> {
        let overrides = loader::load_expense_ratios(path)?;
        log::debug!("Loaded {} expense ratio overrides from {}", overrides.len(), path.display());

        Ok(Self {
            expense_ratios: ExpenseRatioTable::with_overrides(&overrides),
            compliance: ComplianceThresholds::default(),
        })
    }
}
