//! Scan engine: bounded fan-out of probes across targets

pub mod classify;
pub mod probe;
pub mod tables;

pub use classify::classify;
pub use probe::{HttpProber, Probe, ProbeResponse};

use crate::error::Result;
use crate::models::{JsonSink, OutputMode, RecStatus, ScanRequest, ScanResult};
use crate::report::{console, json, ConsoleOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Totals for a finished batch
#[derive(Debug, Default, Clone)]
pub struct ScanSummary {
    /// Number of targets dispatched
    pub targets: usize,
    /// Targets that were probed and emitted
    pub scanned: usize,
    /// Targets that failed and produced no output
    pub failed: usize,
    /// Recommended headers missing, summed over scanned targets
    pub missing: usize,
    /// Recommended headers present with a non-recommended value
    pub different: usize,
    /// Collected results, only populated in aggregated JSON mode
    pub results: Vec<ScanResult>,
}

impl ScanSummary {
    fn record(&mut self, outcome: std::result::Result<Result<TargetOutcome>, JoinError>) {
        match outcome {
            Ok(Ok(outcome)) => {
                self.scanned += 1;
                self.missing += outcome.missing;
                self.different += outcome.different;
                if let Some(result) = outcome.collected {
                    self.results.push(result);
                }
            }
            Ok(Err(e)) => {
                error!("{e}");
                self.failed += 1;
            }
            Err(e) => {
                error!("Scan task panicked: {e}");
                self.failed += 1;
            }
        }
    }
}

/// What happens to each classified result
enum Emitter {
    Console(ConsoleOptions),
    PerTarget(JsonSink),
    Aggregate,
}

impl Emitter {
    fn from_output(output: &OutputMode) -> Self {
        match output {
            OutputMode::Console {
                show_recommended,
                color,
            } => Emitter::Console(ConsoleOptions::detect(*show_recommended, *color)),
            OutputMode::JsonPerTarget(sink) => Emitter::PerTarget(sink.clone()),
            OutputMode::Json(_) => Emitter::Aggregate,
        }
    }

    /// Emits a result immediately, or hands it back for aggregation
    fn emit(&self, index: usize, result: ScanResult) -> Result<Option<ScanResult>> {
        match self {
            Emitter::Console(opts) => {
                let block = console::render(&result, opts);
                // one locked write per target keeps blocks from interleaving
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = stdout.write_all(block.as_bytes()).and_then(|()| stdout.flush()) {
                    warn!("Failed to write output for {}: {e}", result.url);
                }
                Ok(None)
            }
            Emitter::PerTarget(sink) => {
                json::export_target(sink, index, &result)?;
                Ok(None)
            }
            Emitter::Aggregate => Ok(Some(result)),
        }
    }
}

/// Per-target tallies plus the result when it is held for aggregation
struct TargetOutcome {
    missing: usize,
    different: usize,
    collected: Option<ScanResult>,
}

/// Probes, classifies, and emits a single target
async fn scan_target(
    prober: Arc<dyn Probe>,
    request: Arc<ScanRequest>,
    emitter: Arc<Emitter>,
    index: usize,
    target: String,
) -> Result<TargetOutcome> {
    let response = prober.probe(&target, &request).await?;
    debug!(
        "{} answered {} (final URL {})",
        response.url, response.status, response.effective_url
    );
    let result = classify(&response.url, &response.headers, request.checks);
    let missing = result.count_by_status(RecStatus::Missing);
    let different = result.count_by_status(RecStatus::Different);
    Ok(TargetOutcome {
        missing,
        different,
        collected: emitter.emit(index, result)?,
    })
}

/// Orchestrates probing of every target under a concurrency limit
pub struct ScanEngine {
    prober: Arc<dyn Probe>,
    concurrency: usize,
}

impl ScanEngine {
    /// Creates a new engine allowing at most `concurrency` probes in flight
    pub fn new(prober: Arc<dyn Probe>, concurrency: usize) -> Self {
        Self {
            prober,
            concurrency,
        }
    }

    /// Scans every target and waits for all of them to finish.
    /// Per-target failures are logged and counted, never propagated.
    pub async fn run(&self, request: Arc<ScanRequest>, targets: &[String]) -> ScanSummary {
        let emitter = Arc::new(Emitter::from_output(&request.output));

        let mut summary = if targets.len() <= 1 || self.concurrency <= 1 {
            self.run_sequential(&request, &emitter, targets).await
        } else {
            self.run_concurrent(&request, &emitter, targets).await
        };
        summary.targets = targets.len();

        if let OutputMode::Json(sink) = &request.output {
            if let Err(e) = json::export_all(sink, &summary.results) {
                error!("Failed to write JSON results to {sink}: {e}");
            }
        }

        info!(
            "Scan finished: {} scanned, {} failed",
            summary.scanned, summary.failed
        );
        summary
    }

    fn progress_bar(emitter: &Emitter, len: usize) -> ProgressBar {
        if !matches!(emitter, Emitter::Aggregate) {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    }

    /// One target at a time, in input order
    async fn run_sequential(
        &self,
        request: &Arc<ScanRequest>,
        emitter: &Arc<Emitter>,
        targets: &[String],
    ) -> ScanSummary {
        let mut summary = ScanSummary::default();
        let pb = Self::progress_bar(emitter, targets.len());

        for (index, target) in targets.iter().enumerate() {
            pb.set_message(target.clone());
            let handle = tokio::spawn(scan_target(
                Arc::clone(&self.prober),
                Arc::clone(request),
                Arc::clone(emitter),
                index,
                target.clone(),
            ));
            summary.record(handle.await);
            pb.inc(1);
        }

        pb.finish_and_clear();
        summary
    }

    /// Every target spawned at once; a semaphore admits `concurrency` of them
    async fn run_concurrent(
        &self,
        request: &Arc<ScanRequest>,
        emitter: &Arc<Emitter>,
        targets: &[String],
    ) -> ScanSummary {
        let mut summary = ScanSummary::default();
        let pb = Self::progress_bar(emitter, targets.len());
        pb.set_message("Scanning targets...");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();

        for (index, target) in targets.iter().enumerate() {
            let sem = Arc::clone(&semaphore);
            let prober = Arc::clone(&self.prober);
            let request = Arc::clone(request);
            let emitter = Arc::clone(emitter);
            let target = target.clone();

            set.spawn(async move {
                let _permit = sem.acquire().await;
                scan_target(prober, request, emitter, index, target).await
            });
        }

        while let Some(outcome) = set.join_next().await {
            summary.record(outcome);
            pb.inc(1);
        }

        pb.finish_and_clear();
        summary
    }
}
