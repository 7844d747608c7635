//! JSONL import and export of index records.
//!
//! Import reads one record per line, sends the records in batches with a
//! progress bar, and can wait until every batch is published. Export walks
//! the index with the browse cursor and writes one record per line.

use crate::api::SearchIndex;
use crate::batch;
use crate::error::{AlgoliaError, Result};
use crate::models::search::SearchParams;
use crate::task::IndexingStep;
use crate::tracker::StatsSnapshot;
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info};

/// How records are imported.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Let the engine generate objectIDs for records without one.
    pub auto_generate_object_ids: bool,
    /// Attribute copied into `objectID` before sending.
    pub object_id_key: Option<String>,
    /// Replace every record of the index atomically.
    pub replace: bool,
    /// Wait until every task is published.
    pub wait: bool,
    /// Draw a progress bar.
    pub show_progress: bool,
}

/// Imports and exports the records of one index.
#[derive(Debug, Clone)]
pub struct Importer {
    index: SearchIndex,
    batch_size: usize,
}

impl Importer {
    /// Create an importer sending batches of `batch_size` records.
    pub fn new(index: SearchIndex, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(AlgoliaError::InvalidParameter {
                param: "batch_size",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(Self { index, batch_size })
    }

    /// Import the records of a JSONL file.
    pub async fn import_file(&self, path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        if options.replace && options.auto_generate_object_ids {
            return Err(AlgoliaError::InvalidParameter {
                param: "replace",
                reason: "replacing all records needs explicit objectIDs".to_string(),
            });
        }

        let start = Instant::now();
        let mut records = read_records(path).await?;
        let total = records.len();
        info!(index = %self.index.name(), records = total, "Loaded records from file");

        if let Some(key) = &options.object_id_key {
            batch::map_object_ids(&mut records, key);
        }
        if !options.auto_generate_object_ids {
            batch::ensure_object_ids(&records)?;
        }

        let progress = options.show_progress.then(|| progress_bar(total as u64));

        let task_ids = if options.replace {
            if let Some(pb) = &progress {
                pb.set_message("Replacing all records...");
            }
            let response = self.index.replace_all_objects(&records, options.wait).await?;
            if let Some(pb) = &progress {
                pb.inc(total as u64);
            }
            response
                .steps()
                .iter()
                .flat_map(|step| match step {
                    IndexingStep::Single(r) => vec![r.task_id()],
                    IndexingStep::Batch(r) => r.task_ids(),
                })
                .collect()
        } else {
            self.send_batches(records, options, progress.as_ref()).await?
        };

        if let Some(pb) = &progress {
            pb.finish_with_message("Complete!");
        }

        let stats = self.index.stats();
        debug!(summary = %stats.summary(), "Import transport stats");

        Ok(ImportResult {
            records: total,
            task_ids,
            waited: options.wait,
            elapsed: start.elapsed(),
            stats,
        })
    }

    async fn send_batches(
        &self,
        records: Vec<Value>,
        options: &ImportOptions,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<i64>> {
        let chunks = batch::chunked(records, self.batch_size)?;
        let mut responses = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            let response = if options.auto_generate_object_ids {
                self.index.save_objects_auto_id(chunk).await?
            } else {
                self.index.save_objects(chunk).await?
            };

            if let Some(pb) = progress {
                let snapshot = self.index.stats();
                pb.set_message(format!(
                    "RPS: {:.0} | Success: {} | Retries: {} | Latency: {:.0}ms",
                    snapshot.current_rps,
                    snapshot.success_count,
                    snapshot.retry_count,
                    snapshot.avg_latency_ms
                ));
                pb.inc(chunk.len() as u64);
            }
            responses.push(response);
        }

        if options.wait {
            if let Some(pb) = progress {
                pb.set_message("Waiting for tasks...");
            }
            for response in &responses {
                response.wait().await?;
            }
            debug!(batches = responses.len(), "All batches published");
        }

        Ok(responses.iter().flat_map(|r| r.task_ids()).collect())
    }

    /// Write every record of the index to a JSONL file.
    pub async fn export_file(&self, path: &Path, show_progress: bool) -> Result<ExportResult> {
        let start = Instant::now();
        let file = File::create(path)
            .await
            .map_err(|e| output_error(path, e))?;
        let mut writer = BufWriter::new(file);

        let progress = show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let mut records = 0usize;
        let mut stream = std::pin::pin!(self.index.browse_objects::<Value>(SearchParams::new()));
        while let Some(record) = stream.try_next().await? {
            let line = serde_json::to_string(&record)?;
            writer
                .write_all(line.as_bytes())
                .await
                .map_err(|e| output_error(path, e))?;
            writer
                .write_all(b"\n")
                .await
                .map_err(|e| output_error(path, e))?;

            records += 1;
            if let Some(pb) = &progress {
                pb.set_message(format!("{records} records"));
            }
        }

        writer.flush().await.map_err(|e| output_error(path, e))?;
        if let Some(pb) = &progress {
            pb.finish_with_message(format!("Exported {records} records"));
        }
        info!(index = %self.index.name(), records, "Export complete");

        Ok(ExportResult {
            records,
            elapsed: start.elapsed(),
        })
    }
}

fn output_error(path: &Path, source: std::io::Error) -> AlgoliaError {
    AlgoliaError::OutputFileWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Read records from a JSONL file, skipping blank lines.
///
/// Every line must hold a JSON object.
pub async fn read_records(path: &Path) -> Result<Vec<Value>> {
    let input_error = |source| AlgoliaError::InputFileRead {
        path: PathBuf::from(path),
        source,
    };

    let file = File::open(path).await.map_err(input_error)?;
    let mut lines = BufReader::new(file).lines();
    let mut records = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await.map_err(input_error)? {
        line_number += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: Value = serde_json::from_str(trimmed).map_err(|e| AlgoliaError::JsonParse {
            line: line_number,
            source: e,
        })?;
        if !record.is_object() {
            return Err(AlgoliaError::InvalidParameter {
                param: "input",
                reason: format!("line {line_number} is not a JSON object"),
            });
        }
        records.push(record);
    }

    Ok(records)
}

/// Outcome of an import.
#[derive(Debug)]
pub struct ImportResult {
    /// Records sent.
    pub records: usize,
    /// Tasks created, in submission order.
    pub task_ids: Vec<i64>,
    /// Whether the tasks were awaited.
    pub waited: bool,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Transport statistics at the end of the import.
    pub stats: StatsSnapshot,
}

impl ImportResult {
    /// Print a summary of the import.
    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(60));
        println!("                    IMPORT COMPLETE");
        println!("{}", "═".repeat(60));
        println!("  Records:          {}", self.records);
        println!("  Tasks:            {}", self.task_ids.len());
        println!(
            "  Published:        {}",
            if self.waited { "yes" } else { "not awaited" }
        );
        println!("  Requests:         {}", self.stats.total_processed);
        println!("  Retries:          {}", self.stats.retry_count);
        println!("  Elapsed Time:     {:.2}s", self.elapsed.as_secs_f64());
        println!("  Avg Latency:      {:.1}ms", self.stats.avg_latency_ms);
        println!("{}", "═".repeat(60));
    }

    /// Summary for machine consumption.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "status": "complete",
            "records": self.records,
            "task_ids": self.task_ids,
            "waited": self.waited,
            "requests": self.stats.total_processed,
            "retries": self.stats.retry_count,
            "elapsed_seconds": self.elapsed.as_secs_f64(),
            "avg_latency_ms": self.stats.avg_latency_ms,
        })
    }
}

/// Outcome of an export.
#[derive(Debug, Clone, Copy)]
pub struct ExportResult {
    /// Records written.
    pub records: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}
