//! Pro Forma Engine CLI
//!
//! Analyzes a single deal and prints the projection, exit, returns,
//! sensitivity table and compliance checks

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use proforma_engine::deal::{load_deal, load_waterfall_tiers};
use proforma_engine::projection::write_projection_csv;
use proforma_engine::{Benchmarks, DealAnalyzer, DealReport, ProjectionConfig, ProjectionEngine};

/// Deterministic real-estate pro forma projection
#[derive(Parser)]
#[command(name = "proforma", version, about)]
struct Cli {
    /// Deal assumptions (JSON)
    deal: PathBuf,

    /// Waterfall tiers (CSV), replacing any tiers in the deal file
    #[arg(long)]
    tiers: Option<PathBuf>,

    /// Directory holding expense_ratios.csv overrides
    #[arg(long)]
    benchmarks: Option<PathBuf>,

    /// Write the annual projection table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the full report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut deal = load_deal(&cli.deal).with_context(|| format!("loading deal {}", cli.deal.display()))?;
    if let Some(path) = &cli.tiers {
        deal.waterfall_tiers =
            load_waterfall_tiers(path).with_context(|| format!("loading tiers {}", path.display()))?;
    }

    let benchmarks = match &cli.benchmarks {
        Some(dir) => Benchmarks::from_csv_path(dir).with_context(|| format!("loading benchmarks from {}", dir.display()))?,
        None => Benchmarks::default_underwriting(),
    };

    let analyzer = DealAnalyzer::new(ProjectionEngine::new(benchmarks, ProjectionConfig::default()));
    let report = analyzer.analyze(&deal).context("analyzing deal")?;

    if let Some(path) = &cli.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_projection_csv(file, &report.projection)?;
        log::info!("Projection written to {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &DealReport) {
    println!("Pro Forma: {} ({})", report.deal_name, report.property_type);
    println!("{}\n", "=".repeat(12 + report.deal_name.len()));

    let m = &report.metrics;
    println!("Acquisition:");
    println!("  Project cost:      ${:.0}", m.total_project_cost);
    println!("  Sources:           ${:.0}", m.total_sources);
    println!("  Going-in cap:      {:.2}%", m.going_in_cap_rate * 100.0);
    println!("  Stabilized cap:    {:.2}%", m.stabilized_cap_rate * 100.0);
    println!("  LTV:               {:.1}%", m.loan_to_value * 100.0);
    println!("  Debt yield:        {:.2}%", m.debt_yield * 100.0);
    println!("  Breakeven occ.:    {:.1}%", m.breakeven_occupancy * 100.0);
    println!();

    println!(
        "{:>4} {:>14} {:>12} {:>14} {:>12} {:>12} {:>14} {:>8} {:>6}",
        "Year", "Gross Rev", "Vacancy", "OpEx", "NOI", "Debt Svc", "Cash Flow", "CoC", "DSCR"
    );
    println!("{}", "-".repeat(106));
    for row in &report.projection.years {
        println!(
            "{:>4} {:>14.0} {:>12.0} {:>14.0} {:>12.0} {:>12.0} {:>14.0} {:>7.2}% {:>6.2}",
            row.year,
            row.gross_revenue,
            row.vacancy_loss,
            row.operating_expenses,
            row.noi,
            row.debt_service,
            row.cash_flow_after_debt,
            row.cash_on_cash * 100.0,
            row.dscr
        );
    }
    println!();

    let exit = &report.exit;
    println!("Exit (year {}):", exit.exit_year);
    if let Some(date) = report.exit_date {
        println!("  Date:              {}", date);
    }
    println!("  Exit NOI:          ${:.0}", exit.exit_noi);
    println!("  Exit value:        ${:.0} @ {:.2}% cap", exit.exit_value, exit.exit_cap_rate * 100.0);
    println!("  Loan payoff:       ${:.0}", exit.loan_payoff);
    println!("  Disposition fee:   ${:.0}", exit.disposition_fee);
    println!("  Net proceeds:      ${:.0}", exit.net_proceeds);
    println!();

    let returns = &report.returns;
    println!("Returns:");
    println!("  Total return:      ${:.0}", returns.total_return);
    println!("  Equity multiple:   {:.2}x", returns.equity_multiple);
    println!(
        "  IRR:               {:.2}%{}",
        returns.irr.rate * 100.0,
        if returns.irr.converged { "" } else { " (not converged)" }
    );
    println!("  LP distributions:  ${:.0}", report.total_lp_distributions());
    println!("  GP distributions:  ${:.0}", report.total_gp_distributions());
    println!();

    println!("Exit Cap Sensitivity:");
    println!("{:>8} {:>16} {:>16} {:>8} {:>8}", "Cap", "Exit Value", "Net Proceeds", "Multiple", "IRR");
    for s in &report.sensitivity {
        println!(
            "{:>7.2}% {:>16.0} {:>16.0} {:>7.2}x {:>7.2}%",
            s.exit_cap_rate * 100.0,
            s.exit_value,
            s.net_proceeds,
            s.equity_multiple,
            s.irr * 100.0
        );
    }
    println!();

    println!("Compliance:");
    for check in &report.compliance {
        println!("  [{}] {}: {}", if check.passed { "PASS" } else { "FAIL" }, check.name, check.note);
    }
}
