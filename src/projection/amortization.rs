//! Fixed-rate loan amortization with an optional interest-only period
//!
//! After the IO window the loan amortizes over its full original term, so the
//! level payment is the same whether or not an IO period was granted.

use serde::{Deserialize, Serialize};

use crate::deal::DealAssumptions;

/// Terms of a fixed-rate acquisition loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_amount: f64,
    pub annual_rate: f64,
    pub term_years: u32,
    pub interest_only: bool,
    pub io_term_months: u32,
}

/// One row of an annual amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub beginning_balance: f64,
    pub debt_service: f64,
    pub interest: f64,
    pub principal: f64,
    pub ending_balance: f64,
}

impl LoanTerms {
    pub fn new(loan_amount: f64, annual_rate: f64, term_years: u32, interest_only: bool, io_term_months: u32) -> Self {
        Self {
            loan_amount,
            annual_rate,
            term_years,
            interest_only,
            io_term_months,
        }
    }

    pub fn from_deal(deal: &DealAssumptions) -> Self {
        Self::new(
            deal.loan_amount,
            deal.interest_rate,
            deal.loan_term_years,
            deal.interest_only,
            deal.io_term_months,
        )
    }

    fn io_months(&self) -> u32 {
        if self.interest_only {
            self.io_term_months
        } else {
            0
        }
    }

    fn term_months(&self) -> u32 {
        self.term_years.saturating_mul(12)
    }

    fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }

    /// Level monthly payment over the full original term
    pub fn monthly_payment(&self) -> f64 {
        let n = self.term_months();
        if self.loan_amount <= 0.0 || n == 0 {
            return 0.0;
        }

        let r = self.monthly_rate();
        if r <= 0.0 {
            return self.loan_amount / n as f64;
        }

        let growth = compound(r, n);
        if !growth.is_finite() {
            // Term so long the payment converges to interest only
            return self.loan_amount * r;
        }
        self.loan_amount * r * growth / (growth - 1.0)
    }

    /// Whether `year` (1-indexed) falls entirely inside the IO window
    pub fn in_interest_only_period(&self, year: u32) -> bool {
        let io_months = self.io_months();
        io_months > 0 && year as f64 <= io_months as f64 / 12.0
    }

    /// Total debt service paid during `year` (1-indexed)
    pub fn annual_debt_service(&self, year: u32) -> f64 {
        if self.loan_amount <= 0.0 || self.annual_rate <= 0.0 {
            return 0.0;
        }

        if self.in_interest_only_period(year) {
            return self.loan_amount * self.annual_rate;
        }

        // Months of amortization already paid before this year starts
        let elapsed = year.saturating_sub(1).saturating_mul(12).saturating_sub(self.io_months());
        if elapsed >= self.term_months() {
            return 0.0;
        }

        self.monthly_payment() * 12.0
    }

    /// Remaining principal at the end of `at_year` (0 = closing)
    pub fn balance_at(&self, at_year: u32) -> f64 {
        if self.loan_amount <= 0.0 {
            return 0.0;
        }

        let io_months = self.io_months();
        let elapsed_months = at_year.saturating_mul(12);
        if elapsed_months <= io_months {
            return self.loan_amount;
        }

        let n = self.term_months();
        if n == 0 {
            return 0.0;
        }

        let amortizing_months = (elapsed_months - io_months).min(n);
        let r = self.monthly_rate();

        if r <= 0.0 {
            let straight_line = self.loan_amount / n as f64;
            return (self.loan_amount - straight_line * amortizing_months as f64).max(0.0);
        }

        let growth = compound(r, amortizing_months);
        if !growth.is_finite() {
            return self.loan_amount;
        }
        let balance = self.loan_amount * growth - self.monthly_payment() * (growth - 1.0) / r;
        balance.max(0.0)
    }

    /// Annual schedule for years 1..=years
    pub fn schedule(&self, years: u32) -> Vec<AmortizationYear> {
        (1..=years)
            .map(|year| {
                let beginning_balance = self.balance_at(year - 1);
                let ending_balance = self.balance_at(year);
                let debt_service = self.annual_debt_service(year);
                let principal = beginning_balance - ending_balance;
                AmortizationYear {
                    year,
                    beginning_balance,
                    debt_service,
                    interest: (debt_service - principal).max(0.0),
                    principal,
                    ending_balance,
                }
            })
            .collect()
    }
}

/// `(1 + r)^months`, with the exponent clamped to the `powi` range
fn compound(monthly_rate: f64, months: u32) -> f64 {
    (1.0 + monthly_rate).powi(i32::try_from(months).unwrap_or(i32::MAX))
}

/// Annual debt service for `year` of a fixed-rate loan
pub fn annual_debt_service(
    loan_amount: f64,
    annual_rate: f64,
    term_years: u32,
    interest_only: bool,
    io_term_months: u32,
    year: u32,
) -> f64 {
    LoanTerms::new(loan_amount, annual_rate, term_years, interest_only, io_term_months).annual_debt_service(year)
}

/// Remaining loan balance at the end of `at_year`
pub fn loan_balance(
    loan_amount: f64,
    annual_rate: f64,
    term_years: u32,
    interest_only: bool,
    io_term_months: u32,
    at_year: u32,
) -> f64 {
    LoanTerms::new(loan_amount, annual_rate, term_years, interest_only, io_term_months).balance_at(at_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_no_debt_no_debt_service() {
        assert_eq!(annual_debt_service(0.0, 0.06, 30, false, 0, 1), 0.0);
        assert_eq!(annual_debt_service(1_000_000.0, 0.0, 30, false, 0, 1), 0.0);
        assert_eq!(loan_balance(0.0, 0.06, 30, false, 0, 5), 0.0);
    }

    #[test]
    fn test_level_payment_matches_formula() {
        // $1M at 6% over 30 years: standard mortgage payment of ~$5,995.51/month
        let loan = LoanTerms::new(1_000_000.0, 0.06, 30, false, 0);
        assert_abs_diff_eq!(loan.monthly_payment(), 5995.505, epsilon = 0.01);
        assert_abs_diff_eq!(loan.annual_debt_service(1), 5995.505 * 12.0, epsilon = 0.1);
    }

    #[test]
    fn test_interest_only_window() {
        let loan = LoanTerms::new(5_000_000.0, 0.05, 30, true, 24);

        assert_abs_diff_eq!(loan.annual_debt_service(1), 250_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(loan.annual_debt_service(2), 250_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(loan.annual_debt_service(3), loan.monthly_payment() * 12.0, epsilon = 1e-9);

        // Balance is untouched for every year inside the window
        for year in 0..=2 {
            assert_eq!(loan.balance_at(year), 5_000_000.0);
        }
        assert!(loan.balance_at(3) < 5_000_000.0);
    }

    #[test]
    fn test_partial_io_year_amortizes() {
        // 18-month IO: year 1 is IO, year 2 already pays the amortizing payment
        let loan = LoanTerms::new(1_000_000.0, 0.06, 30, true, 18);
        assert!(loan.in_interest_only_period(1));
        assert!(!loan.in_interest_only_period(2));
        assert_abs_diff_eq!(loan.annual_debt_service(2), loan.monthly_payment() * 12.0, epsilon = 1e-9);
        // Only 6 amortizing months have elapsed at the end of year 2
        assert!(loan.balance_at(2) > loan.balance_at(3));
        assert!(1_000_000.0 - loan.balance_at(2) < loan.balance_at(2) - loan.balance_at(3));
    }

    #[test]
    fn test_io_flag_off_ignores_io_term() {
        let loan = LoanTerms::new(1_000_000.0, 0.06, 30, false, 36);
        assert_abs_diff_eq!(loan.annual_debt_service(1), loan.monthly_payment() * 12.0, epsilon = 1e-9);
        assert!(loan.balance_at(1) < 1_000_000.0);
    }

    #[test]
    fn test_fully_amortizing_loan_reaches_zero() {
        let loan = LoanTerms::new(2_000_000.0, 0.055, 10, false, 0);

        assert_abs_diff_eq!(loan.balance_at(10), 0.0, epsilon = 1e-4);

        // Principal repaid each year sums to the original loan
        let principal: f64 = loan.schedule(10).iter().map(|row| row.principal).sum();
        assert_abs_diff_eq!(principal, 2_000_000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_debt_service_stops_after_term() {
        let loan = LoanTerms::new(500_000.0, 0.07, 5, false, 0);
        assert!(loan.annual_debt_service(5) > 0.0);
        assert_eq!(loan.annual_debt_service(6), 0.0);
        assert_eq!(loan.balance_at(8), 0.0);
    }

    #[test]
    fn test_io_extends_maturity() {
        // Term is measured in amortizing months, so IO pushes the payoff out
        let loan = LoanTerms::new(500_000.0, 0.07, 5, true, 12);
        assert!(loan.annual_debt_service(6) > 0.0);
        assert_eq!(loan.annual_debt_service(7), 0.0);
    }

    #[test]
    fn test_zero_rate_balance_is_straight_line() {
        let loan = LoanTerms::new(120_000.0, 0.0, 10, false, 0);
        assert_abs_diff_eq!(loan.balance_at(1), 108_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(loan.balance_at(5), 60_000.0, epsilon = 1e-9);
        assert_eq!(loan.balance_at(10), 0.0);
    }

    #[test]
    fn test_schedule_splits_interest_and_principal() {
        let loan = LoanTerms::new(1_000_000.0, 0.06, 30, true, 12);
        let schedule = loan.schedule(3);

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[0].principal, 0.0);
        assert_abs_diff_eq!(schedule[0].interest, 60_000.0, epsilon = 1e-9);
        assert!(schedule[1].principal > 0.0);
        assert_abs_diff_eq!(
            schedule[1].interest + schedule[1].principal,
            schedule[1].debt_service,
            epsilon = 1e-6
        );
        assert_eq!(schedule[2].beginning_balance, schedule[1].ending_balance);
    }

    #[test]
    fn test_extreme_terms_do_not_overflow() {
        let loan = LoanTerms::new(1_000_000.0, 0.06, u32::MAX, true, 24);
        assert_abs_diff_eq!(loan.annual_debt_service(u32::MAX), 60_000.0, epsilon = 1e-6);
        assert_eq!(loan.balance_at(u32::MAX), 1_000_000.0);
        assert_eq!(annual_debt_service(1_000_000.0, 0.06, 30, false, 0, u32::MAX), 0.0);
    }
}
