//! Deal data structures matching the document layer's deal record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ProformaError, ProformaResult};

/// Property type used to select an expense-ratio benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    #[default]
    Multifamily,
    Office,
    MedicalOffice,
    Retail,
    /// Triple-net leased retail (tenant pays taxes, insurance, maintenance)
    NnnRetail,
    Industrial,
    Hotel,
    SelfStorage,
    SeniorHousing,
    StudentHousing,
    ManufacturedHousing,
    MixedUse,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 13] = [
        PropertyType::Multifamily,
        PropertyType::Office,
        PropertyType::MedicalOffice,
        PropertyType::Retail,
        PropertyType::NnnRetail,
        PropertyType::Industrial,
        PropertyType::Hotel,
        PropertyType::SelfStorage,
        PropertyType::SeniorHousing,
        PropertyType::StudentHousing,
        PropertyType::ManufacturedHousing,
        PropertyType::MixedUse,
        PropertyType::Land,
    ];

    /// Canonical code as stored on deal records
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Multifamily => "MULTIFAMILY",
            PropertyType::Office => "OFFICE",
            PropertyType::MedicalOffice => "MEDICAL_OFFICE",
            PropertyType::Retail => "RETAIL",
            PropertyType::NnnRetail => "NNN_RETAIL",
            PropertyType::Industrial => "INDUSTRIAL",
            PropertyType::Hotel => "HOTEL",
            PropertyType::SelfStorage => "SELF_STORAGE",
            PropertyType::SeniorHousing => "SENIOR_HOUSING",
            PropertyType::StudentHousing => "STUDENT_HOUSING",
            PropertyType::ManufacturedHousing => "MANUFACTURED_HOUSING",
            PropertyType::MixedUse => "MIXED_USE",
            PropertyType::Land => "LAND",
        }
    }

    /// Parse a free-form property type label.
    ///
    /// Anything unrecognised falls back to `Multifamily`.
    pub fn parse(label: &str) -> Self {
        Self::from_code(label).unwrap_or_else(|| {
            log::debug!("Unknown property type '{}', using MULTIFAMILY benchmarks", label);
            PropertyType::Multifamily
        })
    }

    /// Strict lookup of a code or known alias.
    ///
    /// Matching ignores case and treats spaces, dashes and underscores alike.
    pub fn from_code(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        let property_type = match normalized.as_str() {
            "MULTIFAMILY" | "MULTI_FAMILY" | "APARTMENT" | "APARTMENTS" => PropertyType::Multifamily,
            "OFFICE" => PropertyType::Office,
            "MEDICAL_OFFICE" | "MOB" => PropertyType::MedicalOffice,
            "RETAIL" => PropertyType::Retail,
            "NNN_RETAIL" | "NNN" | "NET_LEASE" | "TRIPLE_NET" => PropertyType::NnnRetail,
            "INDUSTRIAL" | "WAREHOUSE" => PropertyType::Industrial,
            "HOTEL" | "HOSPITALITY" => PropertyType::Hotel,
            "SELF_STORAGE" | "STORAGE" => PropertyType::SelfStorage,
            "SENIOR_HOUSING" | "SENIOR_LIVING" => PropertyType::SeniorHousing,
            "STUDENT_HOUSING" => PropertyType::StudentHousing,
            "MANUFACTURED_HOUSING" | "MOBILE_HOME_PARK" => PropertyType::ManufacturedHousing,
            "MIXED_USE" => PropertyType::MixedUse,
            "LAND" => PropertyType::Land,
            _ => return None,
        };
        Some(property_type)
    }
}

impl From<String> for PropertyType {
    fn from(label: String) -> Self {
        PropertyType::parse(&label)
    }
}

impl From<&str> for PropertyType {
    fn from(label: &str) -> Self {
        PropertyType::parse(label)
    }
}

impl From<PropertyType> for String {
    fn from(property_type: PropertyType) -> Self {
        property_type.as_str().to_string()
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longest hold or loan term accepted, in years
pub const MAX_TERM_YEARS: u32 = 100;

/// A single rung of the distribution waterfall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallTier {
    /// Evaluation sequence (unique within a deal)
    pub order: u32,

    pub name: String,

    /// Cumulative LP-return threshold as a fraction of total equity.
    /// `None` marks the residual tier, which absorbs all remaining cash.
    #[serde(default)]
    pub hurdle_rate: Option<f64>,

    pub lp_split: f64,

    pub gp_split: f64,
}

impl WaterfallTier {
    pub fn hurdle(order: u32, name: impl Into<String>, hurdle_rate: f64, lp_split: f64, gp_split: f64) -> Self {
        Self {
            order,
            name: name.into(),
            hurdle_rate: Some(hurdle_rate),
            lp_split,
            gp_split,
        }
    }

    pub fn residual(order: u32, name: impl Into<String>, lp_split: f64, gp_split: f64) -> Self {
        Self {
            order,
            name: name.into(),
            hurdle_rate: None,
            lp_split,
            gp_split,
        }
    }

    pub fn is_residual(&self) -> bool {
        self.hurdle_rate.is_none()
    }

    /// LP + GP split, which should be 1.0 for the tier to conserve cash
    pub fn split_total(&self) -> f64 {
        self.lp_split + self.gp_split
    }
}

/// Immutable underwriting inputs for one deal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealAssumptions {
    /// Display name for reports
    pub deal_name: String,

    pub property_type: PropertyType,

    /// Closing date, used only to label the exit date in reports
    pub acquisition_date: Option<NaiveDate>,

    // Uses of funds
    pub purchase_price: f64,
    pub renovation_budget: f64,
    pub closing_costs: f64,

    // Sources of funds
    pub total_equity_raise: f64,
    pub sponsor_equity: f64,
    pub loan_amount: f64,

    // Debt terms
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub interest_only: bool,
    pub io_term_months: u32,

    // Operations
    pub hold_period_years: u32,
    pub current_noi: f64,
    pub pro_forma_noi: f64,
    pub vacancy_rate: f64,
    pub rent_growth_rate: f64,
    pub expense_growth_rate: f64,

    // Exit and distributions
    pub exit_cap_rate: f64,
    pub preferred_return: f64,
    pub disposition_fee_rate: f64,
    pub waterfall_tiers: Vec<WaterfallTier>,
}

impl Default for DealAssumptions {
    fn default() -> Self {
        Self {
            deal_name: String::new(),
            property_type: PropertyType::default(),
            acquisition_date: None,
            purchase_price: 0.0,
            renovation_budget: 0.0,
            closing_costs: 0.0,
            total_equity_raise: 0.0,
            sponsor_equity: 0.0,
            loan_amount: 0.0,
            interest_rate: 0.0,
            loan_term_years: 30,
            interest_only: false,
            io_term_months: 0,
            hold_period_years: 5,
            current_noi: 0.0,
            pro_forma_noi: 0.0,
            vacancy_rate: 0.0,
            rent_growth_rate: 0.0,
            expense_growth_rate: 0.0,
            exit_cap_rate: 0.0,
            preferred_return: 0.0,
            disposition_fee_rate: 0.0,
            waterfall_tiers: Vec::new(),
        }
    }
}

impl DealAssumptions {
    /// Year in which the business plan reaches pro forma NOI
    pub fn stabilization_year(&self) -> u32 {
        if self.renovation_budget > 0.0 {
            2
        } else {
            1
        }
    }

    /// Purchase + renovation + closing costs
    pub fn total_project_cost(&self) -> f64 {
        self.purchase_price + self.renovation_budget + self.closing_costs
    }

    /// Equity + debt
    pub fn total_sources(&self) -> f64 {
        self.total_equity_raise + self.loan_amount
    }

    pub fn loan_to_value(&self) -> f64 {
        if self.purchase_price > 0.0 {
            self.loan_amount / self.purchase_price
        } else {
            0.0
        }
    }

    pub fn going_in_cap_rate(&self) -> f64 {
        if self.purchase_price > 0.0 {
            self.current_noi / self.purchase_price
        } else {
            0.0
        }
    }

    pub fn stabilized_cap_rate(&self) -> f64 {
        if self.purchase_price > 0.0 {
            self.pro_forma_noi / self.purchase_price
        } else {
            0.0
        }
    }

    /// Structural validation ahead of a full report run.
    ///
    /// Economic plausibility (leverage, coverage) is left to the compliance rules.
    pub fn validate(&self) -> ProformaResult<()> {
        if self.hold_period_years < 1 {
            return Err(ProformaError::invalid(
                "holdPeriodYears",
                "hold period must be at least one year",
            ));
        }

        let period_fields = [
            ("holdPeriodYears", self.hold_period_years, MAX_TERM_YEARS),
            ("loanTermYears", self.loan_term_years, MAX_TERM_YEARS),
            ("ioTermMonths", self.io_term_months, MAX_TERM_YEARS * 12),
        ];
        for (field, value, max) in period_fields {
            if value > max {
                return Err(ProformaError::invalid(field, format!("{} exceeds the maximum of {}", value, max)));
            }
        }

        let numeric_fields = [
            ("purchasePrice", self.purchase_price),
            ("renovationBudget", self.renovation_budget),
            ("closingCosts", self.closing_costs),
            ("totalEquityRaise", self.total_equity_raise),
            ("sponsorEquity", self.sponsor_equity),
            ("loanAmount", self.loan_amount),
            ("interestRate", self.interest_rate),
            ("currentNoi", self.current_noi),
            ("proFormaNoi", self.pro_forma_noi),
            ("vacancyRate", self.vacancy_rate),
            ("rentGrowthRate", self.rent_growth_rate),
            ("expenseGrowthRate", self.expense_growth_rate),
            ("exitCapRate", self.exit_cap_rate),
            ("preferredReturn", self.preferred_return),
            ("dispositionFeeRate", self.disposition_fee_rate),
        ];
        for (field, value) in numeric_fields {
            if !value.is_finite() {
                return Err(ProformaError::invalid(field, format!("value must be finite, got {}", value)));
            }
        }

        let mut orders: Vec<u32> = self.waterfall_tiers.iter().map(|t| t.order).collect();
        orders.sort_unstable();
        if let Some(pair) = orders.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ProformaError::invalid(
                "waterfallTiers",
                format!("duplicate tier order {}", pair[0]),
            ));
        }

        for tier in &self.waterfall_tiers {
            let values = [tier.lp_split, tier.gp_split, tier.hurdle_rate.unwrap_or(0.0)];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ProformaError::invalid(
                    "waterfallTiers",
                    format!("tier '{}' has a non-finite split or hurdle", tier.name),
                ));
            }
        }

        Ok(())
    }
}
