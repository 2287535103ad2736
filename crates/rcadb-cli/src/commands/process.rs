//! Process command - extract one policy document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rcadb_core::extractor::rules::format_short;
use rcadb_core::{FileOpener, Pipeline, Record, RecordStatus};

use super::config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
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
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !FileOpener::accepts(&args.input) {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pipeline = Pipeline::from_config(&config)?;
    let input = args.input.clone();
    let record = tokio::task::spawn_blocking(move || pipeline.process_path(&input)).await?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Text => format_record_text(&record),
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

    match record.status {
        RecordStatus::Processed => {}
        RecordStatus::Unprocessed => eprintln!(
            "{} No template recognized {}",
            style("!").yellow(),
            args.input.display()
        ),
        RecordStatus::Unreadable => eprintln!(
            "{} Could not read {}: {}",
            style("✗").red(),
            args.input.display(),
            record.error.as_deref().unwrap_or("unknown error")
        ),
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_record_text(record: &Record) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let date = |value: Option<chrono::NaiveDate>| value.map(format_short).unwrap_or_else(|| "-".to_string());

    let mut output = String::new();
    output.push_str(&format!("Insurer:        {}\n", text(&record.insurer_short_name)));
    output.push_str(&format!("Policy number:  {}\n", text(&record.insurance_number)));
    output.push_str(&format!("Bonus-Malus:    {}\n", text(&record.insurance_class)));
    output.push_str(&format!("Issued:         {}\n", date(record.contract_date)));
    output.push_str(&format!("Valid from:     {}\n", date(record.start_date)));
    output.push_str(&format!("Valid until:    {}\n", date(record.expiration_date)));
    output.push_str(&format!(
        "Coverage:       {}\n",
        record
            .coverage_months
            .map(|m| format!("{} months", m))
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!("Client:         {}\n", text(&record.person_name)));
    output.push_str(&format!("Plate:          {}\n", text(&record.car_number)));
    output.push_str(&format!("Premium:        {}\n", text(&record.premium_amount)));
    output.push_str(&format!("Type:           {}\n", text(&record.record_type)));
    output.push_str(&format!("Source:         {}\n", record.source().display()));
    output
}
