//! Describes a credit list: status, asset class and originator mix, and the
//! order depth (money falling due over time, interest included).

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use autoinvest::credit;
use autoinvest::report::{self, Distribution};

#[derive(Parser, Debug)]
#[command(name = "credit_stats", version)]
struct Args {
    /// JSON credit list as returned by the portfolio API
    #[arg(value_name = "CREDITS_JSON")]
    credits: PathBuf,

    /// Reference date for the order-depth table (YYYY-MM-DD); defaults to today
    #[arg(long)]
    today: Option<NaiveDate>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.credits)
        .with_context(|| format!("cannot open {}", args.credits.display()))?;
    let credits = credit::load_credits(BufReader::new(file))
        .with_context(|| format!("cannot parse {}", args.credits.display()))?;
    let today = args.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    print_distribution("Statuses", &report::status_distribution(&credits), 20);
    print_distribution("Asset classes", &report::asset_class_distribution(&credits), 20);
    print_distribution("Originators", &report::originator_distribution(&credits), 30);

    print_header("Order depth (cumulative, interest included)");
    for row in report::order_depth(&credits, today) {
        println!(
            "{:>10}% {:>18} days {:>12.2} SEK",
            row.percentile * 100.0,
            row.days_until_end,
            row.cumulative
        );
    }
    println!();
    Ok(())
}

fn print_header(title: &str) {
    println!("{title}");
    println!("{}", "-".repeat(title.chars().count()));
}

fn print_distribution(title: &str, dist: &Distribution, width: usize) {
    print_header(title);
    for (key, count) in &dist.counts {
        println!("{key:>width$}: {:.2}% ({count})", dist.share(key));
    }
    println!();
}
