use crate::application::use_cases::ScanDeviceUseCase;
use crate::ports::outbound::{CveRepository, KnowledgeService, ProgressReporter, WebSearchService};
use crate::vulnerability_scanning::domain::{ScanReport, ScanTarget};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tuning knobs for batch scans
#[derive(Debug, Clone, PartialEq)]
pub struct BatchScanConfig {
    /// Devices scanned concurrently within one batch
    pub batch_size: usize,
    /// Pause between batches
    pub rate_limit_delay: Duration,
    /// Upper bound for a single device scan attempt
    pub timeout: Duration,
    /// Extra attempts after the first one fails or times out
    pub retry_count: u32,
    /// Base delay before a retry; attempt `n` waits `n * retry_backoff`
    pub retry_backoff: Duration,
}

impl Default for BatchScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            rate_limit_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(30),
            retry_count: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Result of scanning one device in a batch
#[derive(Debug, Clone)]
pub struct DeviceScanOutcome {
    pub target: ScanTarget,
    /// The report, or the last error message
    pub result: Result<ScanReport, String>,
    pub attempts: u32,
}

impl DeviceScanOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// BatchScanUseCase - Scans many devices with bounded concurrency
///
/// Devices are processed in batches of `batch_size`, with `rate_limit_delay`
/// between batches. A device that fails or exceeds `timeout` is retried up to
/// `retry_count` times; its failure is recorded in its outcome and never
/// aborts the batch. Outcomes are returned in input order.
pub struct BatchScanUseCase<C: ?Sized, W: ?Sized, K: ?Sized, P: ?Sized> {
    scanner: ScanDeviceUseCase<C, W, K>,
    progress_reporter: Arc<P>,
    config: BatchScanConfig,
}

impl<C, W, K, P> BatchScanUseCase<C, W, K, P>
where
    C: CveRepository + ?Sized,
    W: WebSearchService + ?Sized,
    K: KnowledgeService + ?Sized,
    P: ProgressReporter + ?Sized,
{
    pub fn new(
        scanner: ScanDeviceUseCase<C, W, K>,
        progress_reporter: Arc<P>,
        config: BatchScanConfig,
    ) -> Self {
        Self {
            scanner,
            progress_reporter,
            config,
        }
    }

    pub async fn execute(&self, targets: Vec<ScanTarget>) -> Vec<DeviceScanOutcome> {
        let total = targets.len();
        if total == 0 {
            self.progress_reporter.report_completion("No devices to scan");
            return Vec::new();
        }

        let batch_size = self.config.batch_size.max(1);
        self.progress_reporter.report(&format!(
            "Scanning {} devices in batches of {}",
            total, batch_size
        ));

        let completed = AtomicUsize::new(0);
        let mut outcomes: Vec<(usize, DeviceScanOutcome)> = Vec::with_capacity(total);
        let indexed: Vec<(usize, ScanTarget)> = targets.into_iter().enumerate().collect();

        for (batch_index, chunk) in indexed.chunks(batch_size).enumerate() {
            if batch_index > 0 && !self.config.rate_limit_delay.is_zero() {
                tokio::time::sleep(self.config.rate_limit_delay).await;
            }

            let batch: Vec<(usize, DeviceScanOutcome)> = stream::iter(chunk.iter().cloned())
                .map(|(index, target)| {
                    let completed = &completed;
                    async move {
                        let outcome = self.scan_one(target).await;
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        let label = outcome.target.label();
                        if let Err(e) = &outcome.result {
                            self.progress_reporter
                                .report_error(&format!("{}: {}", label, e));
                        }
                        self.progress_reporter.report_progress(done, total, Some(&label));
                        (index, outcome)
                    }
                })
                .buffer_unordered(batch_size)
                .collect()
                .await;
            outcomes.extend(batch);
        }

        outcomes.sort_by_key(|(index, _)| *index);
        let outcomes: Vec<DeviceScanOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        self.progress_reporter.report_completion(&format!(
            "Scanned {} devices ({} succeeded, {} failed)",
            total,
            total - failed,
            failed
        ));
        outcomes
    }

    /// Scans one device with the configured timeout and retries
    pub async fn scan_one(&self, target: ScanTarget) -> DeviceScanOutcome {
        let max_attempts = self.config.retry_count + 1;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match tokio::time::timeout(self.config.timeout, self.scanner.execute(&target)).await {
                Ok(Ok(report)) => {
                    return DeviceScanOutcome {
                        target,
                        result: Ok(report),
                        attempts: attempt,
                    }
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => {
                    last_error = format!("scan timed out after {:?}", self.config.timeout)
                }
            }

            tracing::warn!(
                device = %target.label(),
                attempt,
                max_attempts,
                error = %last_error,
                "Device scan attempt failed"
            );
            if attempt < max_attempts {
                tokio::time::sleep(self.config.retry_backoff * attempt).await;
            }
        }

        DeviceScanOutcome {
            target,
            result: Err(last_error),
            attempts: max_attempts,
        }
    }
}
