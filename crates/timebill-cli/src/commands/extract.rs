//! Extract command - read time entries out of a rendered table.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use timebill_core::numeric::clamp_duration;
use timebill_core::{Envelope, extract_from_html};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file containing the rendered table (HTML)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Entry envelope as JSON
    Json,
    /// Flattened entries as CSV
    Csv,
}

pub async fn run(args: ExtractArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting entries from {}", args.input.display());
    let html = fs::read_to_string(&args.input)?;

    let Some(envelope) = extract_from_html(&html) else {
        eprintln!("{} No time entries found", style("ℹ").blue());
        return Ok(());
    };

    let output = match args.format {
        OutputFormat::Json => envelope.to_json()?,
        OutputFormat::Csv => format_csv(&envelope)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_csv(envelope: &Envelope) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["name", "level", "start", "end", "hours"])?;

    for entry in envelope.flatten_indented() {
        let level = entry.level.to_string();
        let hours = format!("{:.2}", clamp_duration(entry.duration));
        wtr.write_record([
            entry.label(),
            level.as_str(),
            entry.start_time.as_deref().unwrap_or_default(),
            entry.end_time.as_deref().unwrap_or_default(),
            hours.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
