//! LP/GP distribution waterfall with cumulative hurdle tracking
//!
//! Hurdles are tested against lifetime-to-date LP distributions, so a
//! `WaterfallCumulativeState` must be threaded through successive periods in
//! ascending order. The caller owns it; the engine only updates it in place.

use serde::{Deserialize, Serialize};

use crate::deal::WaterfallTier;

/// Tier label for the implicit residual appended after the
/// defined tiers when no residual tier absorbed the remaining cash
const IMPLICIT_RESIDUAL_NAME: &str = "Residual";

/// Tier label used when the fallback split is applied to a whole period
const DEFAULT_SPLIT_NAME: &str = "Default Split";

const CASH_EPSILON: f64 = 1e-9;

/// Fallback LP/GP split used when no tier governs the cash
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultSplit {
    pub lp: f64,
    pub gp: f64,
}

impl Default for DefaultSplit {
    fn default() -> Self {
        Self { lp: 0.70, gp: 0.30 }
    }
}

/// Running lifetime distributions, carried across periods of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterfallCumulativeState {
    pub cumulative_lp: f64,
    pub cumulative_gp: f64,
}

impl WaterfallCumulativeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> f64 {
        self.cumulative_lp + self.cumulative_gp
    }

    fn record(&mut self, lp: f64, gp: f64) {
        self.cumulative_lp += lp;
        self.cumulative_gp += gp;
    }
}

/// Cash allocated by one tier in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAllocation {
    pub tier_order: u32,
    pub tier_name: String,
    pub lp_amount: f64,
    pub gp_amount: f64,
}

impl TierAllocation {
    pub fn total(&self) -> f64 {
        self.lp_amount + self.gp_amount
    }
}

/// Distribution waterfall for one deal
#[derive(Debug, Clone)]
pub struct WaterfallEngine {
    /// Tiers sorted ascending by order
    tiers: Vec<WaterfallTier>,
    preferred_return: f64,
    total_equity: f64,
    default_split: DefaultSplit,
}

impl WaterfallEngine {
    pub fn new(tiers: &[WaterfallTier], preferred_return: f64, total_equity: f64) -> Self {
        let mut tiers = tiers.to_vec();
        tiers.sort_by_key(|tier| tier.order);
        Self {
            tiers,
            preferred_return,
            total_equity,
            default_split: DefaultSplit::default(),
        }
    }

    pub fn with_default_split(mut self, default_split: DefaultSplit) -> Self {
        self.default_split = default_split;
        self
    }

    pub fn tiers(&self) -> &[WaterfallTier] {
        &self.tiers
    }

    /// Split one period's distributable cash across the tiers.
    ///
    /// When `state` is supplied, hurdles are measured against its lifetime LP
    /// total and this period's LP/GP amounts are added to it on return.
    pub fn apply(&self, cash_flow: f64, state: Option<&mut WaterfallCumulativeState>) -> Vec<TierAllocation> {
        let allocations = if self.tiers.is_empty() || cash_flow <= 0.0 {
            vec![self.default_allocation(0, DEFAULT_SPLIT_NAME, cash_flow)]
        } else {
            let seed = state.as_deref().map_or(0.0, |s| s.cumulative_lp);
            self.walk_tiers(cash_flow, seed)
        };

        if let Some(state) = state {
            let lp: f64 = allocations.iter().map(|a| a.lp_amount).sum();
            let gp: f64 = allocations.iter().map(|a| a.gp_amount).sum();
            state.record(lp, gp);
        }

        allocations
    }

    fn walk_tiers(&self, cash_flow: f64, cumulative_lp_seed: f64) -> Vec<TierAllocation> {
        let mut allocations = Vec::with_capacity(self.tiers.len() + 1);
        let mut remaining = cash_flow;
        let mut cum_lp_running = cumulative_lp_seed;

        for tier in &self.tiers {
            if remaining <= CASH_EPSILON {
                break;
            }

            let tier_cash = match tier.hurdle_rate {
                Some(hurdle_rate) => {
                    let target = self.total_equity * hurdle_rate;
                    if cum_lp_running >= target {
                        // Hurdle already met in an earlier period
                        continue;
                    }
                    let shortfall = target - cum_lp_running;
                    if tier.lp_split > 0.0 {
                        remaining.min(shortfall / tier.lp_split)
                    } else {
                        remaining
                    }
                }
                None => remaining,
            };

            let lp_amount = tier_cash * tier.lp_split;
            let gp_amount = tier_cash * tier.gp_split;
            remaining -= tier_cash;
            cum_lp_running += lp_amount;

            allocations.push(TierAllocation {
                tier_order: tier.order,
                tier_name: tier.name.clone(),
                lp_amount,
                gp_amount,
            });
        }

        if remaining > CASH_EPSILON {
            let order = self.tiers.last().map_or(0, |tier| tier.order.saturating_add(1));
            allocations.push(self.default_allocation(order, IMPLICIT_RESIDUAL_NAME, remaining));
        }

        allocations
    }

    fn default_allocation(&self, order: u32, name: &str, cash: f64) -> TierAllocation {
        TierAllocation {
            tier_order: order,
            tier_name: name.to_string(),
            lp_amount: cash * self.default_split.lp,
            gp_amount: cash * self.default_split.gp,
        }
    }

    /// Accrued (simple, non-compounding) preferred return still owed to LPs
    /// after `periods` years, given lifetime distributions in `state`
    pub fn preferred_return_shortfall(&self, state: &WaterfallCumulativeState, periods: u32) -> f64 {
        let accrued = self.total_equity * self.preferred_return * periods as f64;
        (accrued - state.cumulative_lp).max(0.0)
    }
}

/// Split `cash_flow` across `tiers`, updating `cumulative_state` when given
pub fn apply_waterfall(
    cash_flow: f64,
    tiers: &[WaterfallTier],
    preferred_return: f64,
    total_equity: f64,
    cumulative_state: Option<&mut WaterfallCumulativeState>,
) -> Vec<TierAllocation> {
    WaterfallEngine::new(tiers, preferred_return, total_equity).apply(cash_flow, cumulative_state)
}
