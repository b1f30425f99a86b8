//! Annual pro forma projection: debt, NOI, waterfall, exit and IRR

mod state;
mod engine;
mod cashflows;
pub mod amortization;
pub mod exit;
pub mod irr;
pub mod waterfall;

pub use state::ProjectionState;
pub use engine::{project, ProjectionConfig, ProjectionEngine, DEFAULT_EXIT_CAP_DELTAS};
pub use cashflows::{write_projection_csv, ProjectionResult, ProjectionSummary, YearProjection};
pub use amortization::{annual_debt_service, loan_balance, AmortizationYear, LoanTerms};
pub use exit::{analyze_exit, exit_at_cap_rate, investor_returns, ExitResult, InvestorReturns};
pub use irr::{irr, solve_irr, IrrSettings, IrrSolution};
pub use waterfall::{
    apply_waterfall, DefaultSplit, TierAllocation, WaterfallCumulativeState, WaterfallEngine,
};
