//! Batch command - build the CSV policy database for a directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::future::join_all;
use glob::{glob, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tokio::task::JoinError;
use tracing::{debug, error, info};

use rcadb_core::extractor::rules::format_short;
use rcadb_core::{partition, sort_by_client_name, FileOpener, Pipeline, Record};

use super::config;

/// Column headers of the exported database, in order.
pub const CSV_HEADERS: [&str; 13] = [
    "NR.CRT",
    "ASIGURATOR",
    "NUMAR POLITA",
    "CLASA B/M",
    "DATA EMITERE",
    "DATA EXPIRARE",
    "NUME CLIENT",
    "NUMAR DE TELEFON",
    "TIP ASIGURARE",
    "NUMAR INMATRICULARE",
    "PERIODA DE ASIGURARE",
    "VALOARE POLITA",
    "POLITA PDF",
];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory searched recursively for policy documents
    #[arg(required = true)]
    input_dir: PathBuf,

    /// Directory receiving the CSV (default: the input directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of parallel workers (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Process every document in a single worker
    #[arg(long)]
    serial: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = config::load(config_path)?;

    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input_dir.display());
    }

    let files = find_documents(&args.input_dir)?;
    if files.is_empty() {
        anyhow::bail!("No documents found under {}", args.input_dir.display());
    }

    println!(
        "{} Found {} documents to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_dir = args.output_dir.clone().unwrap_or_else(|| args.input_dir.clone());
    fs::create_dir_all(&output_dir)?;

    let workers = if args.serial {
        1
    } else {
        args.jobs.unwrap_or_else(|| config.worker_count()).max(1)
    };
    info!("Processing {} documents with {} workers", files.len(), workers);

    let pipeline = Pipeline::from_config(&config)?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")?
            .progress_chars("=>-"),
    );

    let groups = partition(&files, workers);
    let handles = groups.iter().cloned().map(|group| {
        let pipeline = pipeline.clone();
        let progress = progress.clone();
        tokio::task::spawn_blocking(move || {
            group
                .iter()
                .map(|path| {
                    let record = pipeline.process_path(path);
                    progress.inc(1);
                    record
                })
                .collect::<Vec<Record>>()
        })
    });

    let mut records = gather(&groups, join_all(handles).await);
    progress.finish_with_message("Complete");

    sort_by_client_name(&mut records);

    let csv_path = output_dir.join(&config.batch.output_file);
    write_csv(&csv_path, &records)?;
    debug!("Wrote {} rows to {}", records.len(), csv_path.display());

    let processed = records.iter().filter(|r| r.is_processed()).count();
    let total_premium: Decimal = records.iter().filter_map(Record::premium_value).sum();

    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        records.len(),
        start.elapsed()
    );
    println!(
        "   {} recognized, {} unprocessed",
        style(processed).green(),
        style(records.len() - processed).yellow()
    );
    println!("   Total premium: {}", total_premium);
    println!(
        "{} Database written to {}",
        style("✓").green(),
        csv_path.display()
    );

    Ok(())
}

/// Concatenate worker results in group order. A worker that died keeps its
/// documents in the database as unreadable rows.
fn gather(groups: &[Vec<PathBuf>], results: Vec<Result<Vec<Record>, JoinError>>) -> Vec<Record> {
    let mut records = Vec::with_capacity(groups.iter().map(Vec::len).sum());
    for (group, result) in groups.iter().zip(results) {
        match result {
            Ok(batch) => records.extend(batch),
            Err(e) => {
                error!("Worker for {} documents failed: {}", group.len(), e);
                records.extend(group.iter().map(|path| Record::unreadable(path, e.to_string())));
            }
        }
    }
    records
}

/// Every supported document below `dir`, sorted by path.
fn find_documents(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let root = dir
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Directory path is not valid UTF-8: {}", dir.display()))?;
    let pattern = format!("{}/**/*", Pattern::escape(root.trim_end_matches('/')));

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file() && FileOpener::accepts(path))
        .collect();
    files.sort();
    Ok(files)
}

fn write_csv(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(CSV_HEADERS)?;
    for (index, record) in records.iter().enumerate() {
        wtr.write_record(csv_row(index, record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// One database row. Rows no template claimed keep only the file name.
fn csv_row(index: usize, record: &Record) -> [String; 13] {
    let source = record.source();

    if !record.is_processed() {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut row: [String; 13] = Default::default();
        row[0] = index.to_string();
        row[1] = format!("Unprocessed {}", source.display());
        row[12] = file_name;
        return row;
    }

    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let date = |value: Option<chrono::NaiveDate>| value.map(format_short).unwrap_or_default();

    [
        index.to_string(),
        text(&record.insurer_short_name),
        text(&record.insurance_number),
        text(&record.insurance_class),
        date(record.contract_date),
        date(record.expiration_date),
        text(&record.person_name),
        text(&record.phone),
        text(&record.record_type),
        text(&record.car_number),
        record.coverage_months.map(|m| m.to_string()).unwrap_or_default(),
        text(&record.premium_amount),
        source.display().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rcadb_core::RecordStatus;

    #[test]
    fn test_processed_row_column_order() {
        let mut record = Record::new("in/euroins.pdf");
        record.insurer_short_name = Some("EUROINS".to_string());
        record.insurance_number = Some("123456789".to_string());
        record.insurance_class = Some("B8".to_string());
        record.contract_date = NaiveDate::from_ymd_opt(2022, 2, 25);
        record.start_date = NaiveDate::from_ymd_opt(2022, 3, 1);
        record.expiration_date = NaiveDate::from_ymd_opt(2023, 2, 28);
        record.person_name = Some("POPESCU ION".to_string());
        record.record_type = Some("RCA".to_string());
        record.car_number = Some("CJ07ABC".to_string());
        record.coverage_months = Some(11);
        record.premium_amount = Some("1.234,56".to_string());

        assert_eq!(
            csv_row(3, &record).to_vec(),
            vec![
                "3", "EUROINS", "123456789", "B8", "25.02.22", "28.02.23", "POPESCU ION", "", "RCA",
                "CJ07ABC", "11", "1.234,56", "in/euroins.pdf",
            ]
        );
    }

    #[test]
    fn test_unprocessed_row_keeps_file_name() {
        let row = csv_row(0, &Record::unprocessed("in/sub/scan.pdf"));

        assert_eq!(row[0], "0");
        assert_eq!(row[1], "Unprocessed in/sub/scan.pdf");
        assert!(row[2..12].iter().all(String::is_empty));
        assert_eq!(row[12], "scan.pdf");
    }

    #[tokio::test]
    async fn test_failed_worker_keeps_its_documents() {
        let groups = vec![
            vec![PathBuf::from("a.pdf")],
            vec![PathBuf::from("b.pdf"), PathBuf::from("c.pdf")],
        ];
        let ok = tokio::task::spawn_blocking(|| vec![Record::unprocessed("a.pdf")]);
        let crashed = tokio::task::spawn_blocking(|| -> Vec<Record> { panic!("worker crashed") });
        let results = join_all([ok, crashed]).await;

        let records = gather(&groups, results);

        let paths: Vec<_> = records.iter().map(|r| r.source_path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf"), PathBuf::from("c.pdf")]
        );
        assert_eq!(records[0], Record::unprocessed("a.pdf"));
        assert!(records[1..].iter().all(|r| r.status == RecordStatus::Unreadable));
    }

    #[test]
    fn test_find_documents_recurses_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        fs::write(dir.path().join("nested/b.PNG"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let files = find_documents(dir.path()).unwrap();

        assert_eq!(
            files,
            vec![dir.path().join("a.pdf"), dir.path().join("nested/b.PNG")]
        );
    }
}
