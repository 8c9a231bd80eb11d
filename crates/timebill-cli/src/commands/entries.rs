//! Entries command - list the flattened entries of an envelope.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use timebill_core::numeric::clamp_duration;
use timebill_core::timestamp::display;
use timebill_core::{Envelope, TimeEntry};

/// Arguments for the entries command.
#[derive(Args)]
pub struct EntriesArgs {
    /// Envelope file (JSON, as produced by `extract`)
    #[arg(required = true)]
    input: PathBuf,
}

pub async fn run(args: EntriesArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let json = fs::read_to_string(&args.input)?;
    let envelope = Envelope::from_json(&json)?;
    let entries = envelope.flatten();
    info!("Flattened {} entries", entries.len());

    if entries.is_empty() {
        println!("{} No time entries found", style("ℹ").blue());
        return Ok(());
    }

    print!("{}", format_text(&entries));

    Ok(())
}

fn format_text(entries: &[TimeEntry]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<40} {:>5}  {:<18} {:<18} {:>8}\n",
        "Task", "Level", "Start", "End", "Hours"
    ));

    let mut total = 0.0;
    for entry in entries {
        let hours = clamp_duration(entry.duration);
        total += hours;

        let label = format!("{}{}", "  ".repeat(entry.level), entry.label());
        output.push_str(&format!(
            "{:<40} {:>5}  {:<18} {:<18} {:>8.2}\n",
            label,
            entry.level,
            display(entry.start_time.as_deref()),
            display(entry.end_time.as_deref()),
            hours
        ));
    }

    output.push_str(&format!("\n{} entries, {:.2} hours\n", entries.len(), total));
    output
}
