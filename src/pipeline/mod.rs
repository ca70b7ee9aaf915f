//! Concurrent ingestion-and-aggregation pipeline.
//!
//! A fixed pool of workers pulls filenames from one shared backlog, so
//! skewed file sizes balance naturally. Workers never talk to each other:
//! every `FileResult` flows through a bounded channel into a single
//! consuming loop that performs all folds, which is the only code with
//! write access to the aggregate. `run` returns only after every worker
//! has been joined and the channel fully drained, so the caller always
//! observes a complete aggregate.

pub mod scanner;
pub mod worker;

use crate::config::PipelineConfig;
use crate::constants::RESULT_CHANNEL_CAPACITY;
use crate::error::{Error, Result};
use crate::models::{AggregateState, FileResult, PipelineReport, ProcessingStats};
use crate::parser::RecordParser;
use crate::weights::WeightTable;

use indicatif::ProgressBar;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Per-worker file counters, returned from each worker task and summed
/// when the pool is joined
#[derive(Debug, Default)]
struct WorkerCounters {
    files_processed: usize,
    files_failed: usize,
}

impl WorkerCounters {
    fn absorb(&mut self, other: WorkerCounters) {
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
    }
}

/// Pipeline driver owning the configuration and weight table for one run
#[derive(Debug)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    weights: Arc<WeightTable>,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, weights: Arc<WeightTable>) -> Self {
        Self { config, weights }
    }

    /// Run the full scan → dispatch → aggregate sequence.
    ///
    /// Blocks (asynchronously) until every worker has exhausted the backlog
    /// and every emitted result has been folded. Per-file errors are logged
    /// and skipped; only an unreadable input root or cancellation surface
    /// as errors here.
    pub async fn run(
        &self,
        token: CancellationToken,
        progress: Option<ProgressBar>,
    ) -> Result<PipelineReport> {
        let start = Instant::now();

        let files = scanner::scan_csv_files(&self.config.input_dir)?;
        info!(
            "Processing {} files with {} workers",
            files.len(),
            self.config.workers
        );
        if let Some(pb) = &progress {
            pb.set_length(files.len() as u64);
        }

        let outcome = self.dispatch(files, token.clone(), progress).await?;

        if token.is_cancelled() {
            return Err(Error::interrupted("pipeline cancelled"));
        }

        let stats = ProcessingStats {
            files_processed: outcome.counters.files_processed,
            files_failed: outcome.counters.files_failed,
            rows_malformed: outcome.rows_malformed,
            processing_time: start.elapsed(),
        };

        info!(
            "Aggregation complete: {} records from {} rows across {} files ({:.1} files/sec)",
            outcome.aggregate.len(),
            outcome.aggregate.rows_read,
            stats.files_processed,
            stats.files_per_second()
        );

        Ok(PipelineReport {
            aggregate: outcome.aggregate,
            stats,
        })
    }

    /// Spawn the worker pool over a shared backlog and drain every result
    /// into the aggregate.
    async fn dispatch(
        &self,
        files: Vec<PathBuf>,
        token: CancellationToken,
        progress: Option<ProgressBar>,
    ) -> Result<DispatchOutcome> {
        let workers = self.config.workers.max(1);
        let backlog = Arc::new(Mutex::new(files.into_iter().collect::<VecDeque<_>>()));
        let (tx, mut rx) = mpsc::channel::<FileResult>(RESULT_CHANNEL_CAPACITY);
        let parser = RecordParser::new(self.config.clone(), self.weights.clone());

        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            pool.spawn(worker_loop(
                worker_id,
                backlog.clone(),
                parser.clone(),
                tx.clone(),
                token.clone(),
                progress.clone(),
            ));
        }
        // the workers hold the only remaining senders; the channel closes
        // once they are all done
        drop(tx);

        // Single-writer funnel: this loop is the only place folds happen,
        // so no two folds can ever interleave.
        let mut aggregate = AggregateState::default();
        let mut rows_malformed = 0usize;
        while let Some(result) = rx.recv().await {
            rows_malformed += result.rows_malformed;
            aggregate.fold(result);
        }

        // channel closed, now observe worker exits (and any panics),
        // summing each worker's counters into the run totals
        let mut counters = WorkerCounters::default();
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(worker_counters) => {
                    debug!(
                        "Worker finished after {} files",
                        worker_counters.files_processed
                    );
                    counters.absorb(worker_counters);
                }
                Err(e) => error!("Worker task failed: {}", e),
            }
        }

        if let Some(pb) = &progress {
            pb.finish_with_message("All input files processed");
        }

        Ok(DispatchOutcome {
            aggregate,
            rows_malformed,
            counters,
        })
    }
}

/// Everything the dispatch stage hands back to the driver
#[derive(Debug)]
struct DispatchOutcome {
    aggregate: AggregateState,
    rows_malformed: usize,
    counters: WorkerCounters,
}

/// One worker: pull the next filename from the shared backlog, read the
/// file on the blocking pool, and deliver its result to the aggregator.
/// Returns the worker's file counters for the dispatcher to sum.
async fn worker_loop(
    worker_id: usize,
    backlog: Arc<Mutex<VecDeque<PathBuf>>>,
    parser: RecordParser,
    tx: mpsc::Sender<FileResult>,
    token: CancellationToken,
    progress: Option<ProgressBar>,
) -> WorkerCounters {
    let mut counters = WorkerCounters::default();
    debug!("Worker {} started", worker_id);

    loop {
        if token.is_cancelled() {
            debug!("Worker {} cancelled", worker_id);
            break;
        }

        let path = {
            let mut queue = backlog.lock().await;
            match queue.pop_front() {
                Some(path) => path,
                None => break, // backlog exhausted
            }
        };

        let read = tokio::task::spawn_blocking({
            let parser = parser.clone();
            let token = token.clone();
            let path = path.clone();
            move || worker::read_incident_file(&path, &parser, &token)
        })
        .await;

        match read {
            Ok(Ok(result)) => {
                counters.files_processed += 1;
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                if tx.send(result).await.is_err() {
                    // aggregator gone; nothing left to deliver to
                    warn!("Worker {} stopping: result channel closed", worker_id);
                    break;
                }
            }
            Ok(Err(Error::Interrupted { .. })) => {
                debug!("Worker {} interrupted mid-file", worker_id);
                break;
            }
            Ok(Err(e)) => {
                // a file that cannot be opened or read is skipped, the
                // pool keeps going
                error!("Worker {} skipping {}: {}", worker_id, path.display(), e);
                counters.files_failed += 1;
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            }
            Err(join_err) => {
                error!(
                    "Worker {} file task panicked on {}: {}",
                    worker_id,
                    path.display(),
                    join_err
                );
                counters.files_failed += 1;
            }
        }
    }

    counters
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "ts,a,cat,code,b,c,d,e,f,x,y,g,h,i,gang,j,k,l";

    fn data_row(timestamp: &str, category: &str, x: &str, y: &str, gang: &str) -> String {
        format!("{timestamp},,{category},0310,,,,,,{x},{y},,,,{gang},,,")
    }

    fn write_file(dir: &std::path::Path, name: &str, rows: &[String]) {
        let mut contents = String::from(HEADER);
        for row in rows {
            contents.push('\n');
            contents.push_str(row);
        }
        contents.push('\n');
        fs::write(dir.join(name), contents).unwrap();
    }

    fn test_pipeline(input: &std::path::Path, workers: usize) -> Pipeline {
        let config = PipelineConfig::new(input, "unused", "unused").with_workers(workers);
        let weights = WeightTable::from_map(HashMap::from([("BURG".to_string(), 4)]));
        Pipeline::new(Arc::new(config), Arc::new(weights))
    }

    #[tokio::test]
    async fn test_empty_input_directory() {
        let temp = TempDir::new().unwrap();
        let pipeline = test_pipeline(temp.path(), 2);

        let report = pipeline
            .run(CancellationToken::new(), None)
            .await
            .unwrap();

        assert!(report.aggregate.is_empty());
        assert_eq!(report.aggregate.rows_read, 0);
        assert_eq!(report.stats.files_processed, 0);
    }

    #[tokio::test]
    async fn test_missing_input_directory_is_fatal() {
        let temp = TempDir::new().unwrap();
        let pipeline = test_pipeline(&temp.path().join("absent"), 2);

        let result = pipeline.run(CancellationToken::new(), None).await;
        assert!(matches!(result, Err(Error::Scan { .. })));
    }

    #[tokio::test]
    async fn test_two_file_scenario() {
        // one file with 5 valid rows and 1 empty-timestamp row, another
        // with 3 valid BURG rows: aggregate of 8 records from 9 raw rows
        let temp = TempDir::new().unwrap();

        let mut rows_a: Vec<String> = (0..5)
            .map(|i| {
                data_row(
                    &format!("0{}-Jan-14 12:00:00", i + 1),
                    "BURG",
                    "6480464.8",
                    "1830021.8",
                    "",
                )
            })
            .collect();
        rows_a.push(data_row("", "BURG", "6480464.8", "1830021.8", ""));
        write_file(temp.path(), "a.csv", &rows_a);

        let rows_b: Vec<String> = (0..3)
            .map(|i| {
                data_row(
                    &format!("1/{}/2014 3:00:00 PM", i + 10),
                    "BURG",
                    "6480464.8",
                    "1830021.8",
                    "",
                )
            })
            .collect();
        write_file(temp.path(), "b.csv", &rows_b);

        let pipeline = test_pipeline(temp.path(), 3);
        let report = pipeline
            .run(CancellationToken::new(), None)
            .await
            .unwrap();

        assert_eq!(report.aggregate.len(), 8);
        assert_eq!(report.aggregate.rows_read, 9);
        assert!(report.aggregate.records.iter().all(|r| r.weight == 4));
        assert_eq!(report.stats.files_processed, 2);
        assert_eq!(report.stats.files_failed, 0);
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_aggregate() {
        let temp = TempDir::new().unwrap();

        for f in 0..6 {
            let rows: Vec<String> = (0..20)
                .map(|i| {
                    data_row(
                        &format!("{:02}-Jan-14 {:02}:30:00", (i % 27) + 1, i % 24),
                        "BURG",
                        &format!("{}", 6_000_000 + i * 1000 + f),
                        "1830021.8",
                        if i % 3 == 0 { "YES" } else { "no" },
                    )
                })
                .collect();
            write_file(temp.path(), &format!("file_{f}.csv"), &rows);
        }

        let serial = test_pipeline(temp.path(), 1)
            .run(CancellationToken::new(), None)
            .await
            .unwrap();
        let parallel = test_pipeline(temp.path(), 8)
            .run(CancellationToken::new(), None)
            .await
            .unwrap();

        assert_eq!(serial.aggregate.rows_read, parallel.aggregate.rows_read);
        assert_eq!(serial.aggregate.len(), parallel.aggregate.len());

        // order-independent equality of the record multisets
        let key = |r: &crate::models::IncidentRecord| {
            (
                r.hour,
                r.weekday,
                r.weight,
                r.gang_related,
                r.location.x.to_bits(),
                r.location.y.to_bits(),
            )
        };
        let mut left: Vec<_> = serial.aggregate.records.iter().map(key).collect();
        let mut right: Vec<_> = parallel.aggregate.records.iter().map(key).collect();
        left.sort_unstable();
        right.sort_unstable();
        assert_eq!(left, right);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_worker_counters_survive_pool_join() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        for name in ["a.csv", "b.csv", "c.csv"] {
            write_file(
                temp.path(),
                name,
                &[data_row("05-Jan-14 22:30:00", "BURG", "6480464.8", "1830021.8", "")],
            );
        }
        let broken = temp.path().join("broken.csv");
        write_file(
            temp.path(),
            "broken.csv",
            &[data_row("05-Jan-14 23:00:00", "BURG", "6480464.8", "1830021.8", "")],
        );
        fs::set_permissions(&broken, fs::Permissions::from_mode(0o000)).unwrap();

        // privileged users bypass file permissions, so there is nothing to
        // observe in that case
        if fs::File::open(&broken).is_ok() {
            return;
        }

        let report = test_pipeline(temp.path(), 4)
            .run(CancellationToken::new(), None)
            .await
            .unwrap();

        // every worker's counters must reach the final stats intact
        assert_eq!(report.stats.files_processed, 3);
        assert_eq!(report.stats.files_failed, 1);
        assert_eq!(report.aggregate.len(), 3);
    }

    #[tokio::test]
    async fn test_completeness_accounting() {
        let temp = TempDir::new().unwrap();
        write_file(
            temp.path(),
            "mixed.csv",
            &[
                data_row("05-Jan-14 22:30:00", "BURG", "6480464.8", "1830021.8", ""),
                data_row("", "BURG", "6480464.8", "1830021.8", ""),
                data_row("06-Jan-14 08:00:00", "BURG", "0", "0", ""),
                "bad,row".to_string(),
            ],
        );

        let report = test_pipeline(temp.path(), 2)
            .run(CancellationToken::new(), None)
            .await
            .unwrap();

        let agg = &report.aggregate;
        assert_eq!(agg.rows_read, 4);
        assert_eq!(agg.len() + agg.rows_rejected(), agg.rows_read);
        assert_eq!(report.stats.rows_malformed, 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_reports_interruption() {
        let temp = TempDir::new().unwrap();
        write_file(
            temp.path(),
            "a.csv",
            &[data_row("05-Jan-14 22:30:00", "BURG", "6480464.8", "1830021.8", "")],
        );

        let token = CancellationToken::new();
        token.cancel();

        let result = test_pipeline(temp.path(), 2).run(token, None).await;
        assert!(matches!(result, Err(Error::Interrupted { .. })));
    }
}
