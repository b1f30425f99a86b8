//! Run the full analysis for every deal file in a directory
//!
//! Outputs one summary row per deal for pipeline review

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;

use proforma_engine::deal::load_deals_from_dir;
use proforma_engine::{Benchmarks, DealAnalyzer, DealReport, ProjectionConfig, ProjectionEngine};

#[derive(Parser)]
#[command(name = "run_portfolio", version, about = "Analyze every *.json deal in a directory")]
struct Cli {
    /// Directory of deal files
    dir: PathBuf,

    /// Directory holding expense_ratios.csv overrides
    #[arg(long)]
    benchmarks: Option<PathBuf>,

    /// Summary CSV path
    #[arg(long, default_value = "portfolio_summary.csv")]
    output: PathBuf,
}

/// One row of the portfolio summary
#[derive(Debug, Serialize)]
struct PortfolioRow {
    file: String,
    deal_name: String,
    property_type: String,
    hold_years: u32,
    total_equity: f64,
    going_in_cap_rate: f64,
    loan_to_value: f64,
    year1_dscr: f64,
    min_dscr: f64,
    exit_value: f64,
    net_proceeds: f64,
    equity_multiple: f64,
    irr: f64,
    irr_converged: bool,
    checks_failed: usize,
    error: String,
}

impl PortfolioRow {
    fn from_report(file: String, total_equity: f64, report: &DealReport) -> Self {
        Self {
            file,
            deal_name: report.deal_name.clone(),
            property_type: report.property_type.to_string(),
            hold_years: report.summary.total_years,
            total_equity,
            going_in_cap_rate: report.metrics.going_in_cap_rate,
            loan_to_value: report.metrics.loan_to_value,
            year1_dscr: report.projection.first_year().map_or(0.0, |y| y.dscr),
            min_dscr: report.summary.min_dscr.unwrap_or(0.0),
            exit_value: report.exit.exit_value,
            net_proceeds: report.exit.net_proceeds,
            equity_multiple: report.equity_multiple(),
            irr: report.irr(),
            irr_converged: report.returns.irr.converged,
            checks_failed: report.failed_checks().count(),
            error: String::new(),
        }
    }

    fn from_error(file: String, deal_name: String, error: String) -> Self {
        Self {
            file,
            deal_name,
            property_type: String::new(),
            hold_years: 0,
            total_equity: 0.0,
            going_in_cap_rate: 0.0,
            loan_to_value: 0.0,
            year1_dscr: 0.0,
            min_dscr: 0.0,
            exit_value: 0.0,
            net_proceeds: 0.0,
            equity_multiple: 0.0,
            irr: 0.0,
            irr_converged: false,
            checks_failed: 0,
            error,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let deals = load_deals_from_dir(&cli.dir).with_context(|| format!("loading deals from {}", cli.dir.display()))?;
    println!(
        "Loaded {} of {} deal files in {:?}",
        deals.iter().filter(|(_, deal)| deal.is_ok()).count(),
        deals.len(),
        start.elapsed()
    );

    let benchmarks = match &cli.benchmarks {
        Some(dir) => Benchmarks::from_csv_path(dir).with_context(|| format!("loading benchmarks from {}", dir.display()))?,
        None => Benchmarks::default_underwriting(),
    };
    let analyzer = DealAnalyzer::new(ProjectionEngine::new(benchmarks, ProjectionConfig::default()));

    let run_start = Instant::now();
    let rows: Vec<PortfolioRow> = deals
        .par_iter()
        .map(|(path, loaded)| {
            let file = path.display().to_string();
            let deal = match loaded {
                Ok(deal) => deal,
                Err(e) => return PortfolioRow::from_error(file, String::new(), e.to_string()),
            };
            match analyzer.analyze(deal) {
                Ok(report) => PortfolioRow::from_report(file, deal.total_equity_raise, &report),
                Err(e) => {
                    log::warn!("{}: {}", file, e);
                    PortfolioRow::from_error(file, deal.deal_name.clone(), e.to_string())
                }
            }
        })
        .collect();
    println!("Analysis complete in {:?}", run_start.elapsed());

    let file = File::create(&cli.output).with_context(|| format!("creating {}", cli.output.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", cli.output.display());

    let analyzed: Vec<&PortfolioRow> = rows.iter().filter(|r| r.error.is_empty()).collect();
    let total_equity: f64 = analyzed.iter().map(|r| r.total_equity).sum();
    println!("\nPortfolio Summary:");
    println!("  Deals analyzed:    {} of {}", analyzed.len(), rows.len());
    println!("  Total equity:      ${:.0}", total_equity);
    if total_equity > 0.0 {
        let weighted_multiple: f64 =
            analyzed.iter().map(|r| r.equity_multiple * r.total_equity).sum::<f64>() / total_equity;
        println!("  Weighted multiple: {:.2}x", weighted_multiple);
    }
    println!(
        "  With failed checks: {}",
        analyzed.iter().filter(|r| r.checks_failed > 0).count()
    );
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
