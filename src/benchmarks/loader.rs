//! CSV-based benchmark loader
//!
//! Loads benchmark overrides from CSV files in data/benchmarks/

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::deal::PropertyType;
use crate::error::{ProformaError, ProformaResult};

/// Default path to benchmarks directory
pub const DEFAULT_BENCHMARKS_PATH: &str = "data/benchmarks";

/// Expense ratio file name inside a benchmarks directory
pub const EXPENSE_RATIOS_FILE: &str = "expense_ratios.csv";

/// Load expense ratio overrides from `expense_ratios.csv`
/// Returns Vec<(property_type, ratio)>
pub fn load_expense_ratios(path: &Path) -> ProformaResult<Vec<(PropertyType, f64)>> {
    let file = File::open(path.join(EXPENSE_RATIOS_FILE))?;
    load_expense_ratios_from_reader(file)
}

pub fn load_expense_ratios_from_reader<R: Read>(reader: R) -> ProformaResult<Vec<(PropertyType, f64)>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut ratios = Vec::new();

    for result in reader.records() {
        let record = result?;
        let (Some(label), Some(raw_ratio)) = (record.get(0), record.get(1)) else {
            return Err(ProformaError::invalid("expense_ratio", "expected property_type,expense_ratio columns"));
        };
        // Unknown labels are an error here, never the multifamily fallback
        let property_type = PropertyType::from_code(label)
            .ok_or_else(|| ProformaError::invalid("property_type", format!("unknown property type '{}'", label)))?;
        let ratio: f64 = raw_ratio
            .trim()
            .parse()
            .map_err(|_| ProformaError::invalid("expense_ratio", format!("'{}' is not a number", raw_ratio)))?;

        if !(0.0..1.0).contains(&ratio) {
            return Err(ProformaError::invalid(
                "expense_ratio",
                format!("{} ratio {} must be in [0, 1)", property_type, ratio),
            ));
        }

        ratios.push((property_type, ratio));
    }

    Ok(ratios)
}
