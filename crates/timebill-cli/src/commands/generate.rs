//! Generate command - turn a rendered time table into a PDF invoice.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use timebill_core::numeric::positive_finite;
use timebill_core::{InvoiceGenerator, InvoiceOptions};

use super::config::load_config;
use crate::output::write_invoice;

/// Arguments for the generate command.
#[derive(Args)]
pub struct GenerateArgs {
    /// Input file containing the rendered table (HTML)
    #[arg(required = true)]
    input: PathBuf,

    /// Bill this fixed amount instead of hours × rate
    #[arg(long, value_name = "AMOUNT")]
    flat_rate: Option<String>,

    /// Base directory the configured output template is resolved against
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Issue date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
}

pub async fn run(args: GenerateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let options = parse_options(args.flat_rate.as_deref());
    debug!("Invoice options: {:?}", options);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading time table...");
    let html = fs::read_to_string(&args.input)?;

    pb.set_message("Rendering invoice...");
    let mut generator = InvoiceGenerator::new(config);
    if let Some(date) = args.date {
        generator = generator.with_issue_date(date);
    }

    let generated = match generator.generate_from_html(&html, &options) {
        Ok(Some(generated)) => generated,
        Ok(None) => {
            pb.finish_and_clear();
            println!("{} No time entries found", style("ℹ").blue());
            return Ok(());
        }
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    info!(
        "Billed {} line items, total {}",
        generated.invoice.line_items.len(),
        generated.invoice.summary.total
    );

    pb.set_message("Saving invoice...");
    let path = write_invoice(
        &args.output_dir,
        &generated.directory,
        &generated.file_name,
        &generated.document,
    )
    .await;
    pb.finish_and_clear();
    let path = path?;

    println!(
        "{} Invoice {} saved to {}",
        style("✓").green(),
        generated.invoice.header.invoice_number,
        path.display()
    );
    debug!("Generation took {}ms", generated.processing_time_ms);

    Ok(())
}

/// Read the flat-rate override the way the options form does: anything
/// that is not a positive, finite number means hourly billing.
fn parse_options(flat_rate: Option<&str>) -> InvoiceOptions {
    let amount = flat_rate
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .and_then(positive_finite);

    InvoiceOptions {
        flat_rate_amount: amount,
    }
}
