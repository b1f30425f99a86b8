//! Pro Forma Engine - deterministic real-estate projection engine for syndication documents
//!
//! This library provides:
//! - Year-by-year NOI projections with value-add stabilization
//! - Fixed-rate debt amortization with interest-only periods
//! - LP/GP distribution waterfalls with cumulative hurdle tracking
//! - Exit valuation, equity multiple and IRR
//! - Exit cap rate sensitivity and advisory compliance checks

pub mod benchmarks;
pub mod compliance;
pub mod deal;
pub mod error;
pub mod projection;
pub mod report;
pub mod scenario;

// Re-export commonly used types
pub use benchmarks::{Benchmarks, ExpenseRatioTable};
pub use compliance::{ComplianceCheckResult, ComplianceRuleEngine, ComplianceThresholds};
pub use deal::{DealAssumptions, PropertyType, WaterfallTier};
pub use error::{ProformaError, ProformaResult};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, YearProjection};
pub use report::{analyze_deal, DealAnalyzer, DealReport};
pub use scenario::{SensitivityAnalyzer, SensitivityScenario};
