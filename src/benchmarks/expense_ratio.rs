//! Operating expense ratio benchmarks by property type

use std::collections::HashMap;

use crate::deal::PropertyType;

/// Fallback ratio for property types missing from a table (multifamily benchmark)
pub const DEFAULT_EXPENSE_RATIO: f64 = 0.40;

/// Operating expenses as a fraction of gross revenue, per property type
#[derive(Debug, Clone)]
pub struct ExpenseRatioTable {
    ratios: HashMap<PropertyType, f64>,
}

impl ExpenseRatioTable {
    /// Industry benchmark ratios used for underwriting
    pub fn standard() -> Self {
        let ratios = PropertyType::ALL
            .iter()
            .map(|&property_type| (property_type, Self::standard_ratio(property_type)))
            .collect();
        Self { ratios }
    }

    fn standard_ratio(property_type: PropertyType) -> f64 {
        match property_type {
            PropertyType::Multifamily => 0.40,
            PropertyType::Office => 0.45,
            PropertyType::MedicalOffice => 0.42,
            PropertyType::Retail => 0.35,
            PropertyType::NnnRetail => 0.15,
            PropertyType::Industrial => 0.30,
            PropertyType::Hotel => 0.65,
            PropertyType::SelfStorage => 0.35,
            PropertyType::SeniorHousing => 0.60,
            PropertyType::StudentHousing => 0.45,
            PropertyType::ManufacturedHousing => 0.35,
            PropertyType::MixedUse => 0.40,
            PropertyType::Land => 0.10,
        }
    }

    /// Start from the standard table and replace the given entries
    pub fn with_overrides(overrides: &[(PropertyType, f64)]) -> Self {
        let mut table = Self::standard();
        for &(property_type, ratio) in overrides {
            table.ratios.insert(property_type, ratio);
        }
        table
    }

    /// Expense ratio for a property type
    pub fn ratio(&self, property_type: PropertyType) -> f64 {
        self.ratios
            .get(&property_type)
            .copied()
            .unwrap_or(DEFAULT_EXPENSE_RATIO)
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
}

impl Default for ExpenseRatioTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotel_ratio() {
        let table = ExpenseRatioTable::standard();
        assert_eq!(table.ratio(PropertyType::parse("HOTEL")), 0.65);
    }

    #[test]
    fn test_unknown_type_falls_back_to_multifamily() {
        let table = ExpenseRatioTable::standard();
        assert_eq!(table.ratio(PropertyType::parse("TREEHOUSE")), DEFAULT_EXPENSE_RATIO);
        assert_eq!(table.ratio(PropertyType::Multifamily), 0.40);
    }

    #[test]
    fn test_table_covers_every_property_type() {
        let table = ExpenseRatioTable::standard();
        assert_eq!(table.len(), 13);
        assert_eq!(table.ratio(PropertyType::Industrial), 0.30);
        assert_eq!(table.ratio(PropertyType::NnnRetail), 0.15);
        assert_eq!(table.ratio(PropertyType::Office), 0.45);
    }

    #[test]
    fn test_overrides_replace_only_named_entries() {
        let table = ExpenseRatioTable::with_overrides(&[(PropertyType::Hotel, 0.70)]);
        assert_eq!(table.ratio(PropertyType::Hotel), 0.70);
        assert_eq!(table.ratio(PropertyType::Office), 0.45);
    }
}
