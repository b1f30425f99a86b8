//! Deal data structures and loading

mod data;
pub mod loader;

pub use data::{DealAssumptions, PropertyType, WaterfallTier};
pub use loader::{load_deal, load_deal_from_reader, load_deals_from_dir, load_waterfall_tiers};

/// Value-add multifamily deal shared by the unit tests
#[cfg(test)]
pub(crate) fn sample_deal() -> DealAssumptions {
    DealAssumptions {
        deal_name: "Sample Value-Add".to_string(),
        property_type: PropertyType::Multifamily,
        acquisition_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 15),
        purchase_price: 10_000_000.0,
        renovation_budget: 1_000_000.0,
        closing_costs: 200_000.0,
        total_equity_raise: 4_200_000.0,
        sponsor_equity: 210_000.0,
        loan_amount: 7_000_000.0,
        interest_rate: 0.06,
        loan_term_years: 30,
        interest_only: true,
        io_term_months: 24,
        hold_period_years: 5,
        current_noi: 550_000.0,
        pro_forma_noi: 700_000.0,
        vacancy_rate: 0.05,
        rent_growth_rate: 0.03,
        expense_growth_rate: 0.025,
        exit_cap_rate: 0.06,
        preferred_return: 0.08,
        disposition_fee_rate: 0.01,
        waterfall_tiers: vec![
            WaterfallTier::hurdle(1, "Preferred Return", 0.08, 1.0, 0.0),
            WaterfallTier::hurdle(2, "First Promote", 0.15, 0.8, 0.2),
            WaterfallTier::residual(3, "Residual Split", 0.7, 0.3),
        ],
    }
}
