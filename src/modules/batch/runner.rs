use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use uuid::Uuid;

use super::summary::{RecordOutcome, RunSummary};
use crate::modules::catalog::domain::{VenueFilter, VenueRecord, VenueRepository};
use crate::shared::errors::EngineResult;
use crate::shared::utils::logger::LogContext;
use crate::{log_error, log_info, log_warn};

const DEFAULT_PAGE_SIZE: i64 = 100;

/// One batch operation (audit, enrich, verify) applied record by record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordProcessor: Send + Sync {
    /// Short name used in progress lines and the summary.
    fn label(&self) -> &'static str;

    async fn process(&self, record: &VenueRecord) -> EngineResult<RecordOutcome>;
}

/// Drives a processor over an id-ordered slice of the catalog.
///
/// Records are paged in, processed one at a time, and failures are isolated:
/// a record that errors is counted and the run moves on. The stop flag is
/// checked between records, and the summary always carries the offset of the
/// first unprocessed record so an interrupted run can resume where it left
/// off.
pub struct BatchRunner {
    repository: Arc<dyn VenueRepository>,
    stop: Arc<AtomicBool>,
    page_size: i64,
}

impl BatchRunner {
    pub fn new(repository: Arc<dyn VenueRepository>) -> Self {
        Self {
            repository,
            stop: Arc::new(AtomicBool::new(false)),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set this (e.g. from a Ctrl-C handler) to stop after the in-flight
    /// record.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub async fn run(
        &self,
        processor: &dyn RecordProcessor,
        filter: &VenueFilter,
    ) -> EngineResult<RunSummary> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let label = processor.label();

        let matching = self.repository.count(filter).await?;
        let remaining = (matching - filter.offset).max(0);
        let planned_total = filter
            .limit
            .map(|limit| limit.min(remaining))
            .unwrap_or(remaining)
            .max(0) as usize;

        log_info!(
            "{} run {} starting: {} records (offset {})",
            label,
            run_id,
            planned_total,
            filter.offset
        );

        let mut summary = RunSummary::new(run_id, label);
        summary.next_offset = filter.offset;

        'pages: while summary.processed < planned_total {
            let page_limit = self
                .page_size
                .min((planned_total - summary.processed) as i64);
            let page = filter
                .clone()
                .with_offset(summary.next_offset)
                .with_limit(page_limit);
            let records = self.repository.query(&page).await?;
            if records.is_empty() {
                // The slice shrank under us; the planned total was an
                // estimate taken before the run started.
                break;
            }

            for record in records {
                if self.stop.load(Ordering::SeqCst) {
                    summary.interrupted = true;
                    log_warn!(
                        "{} run {} interrupted after {} records",
                        label,
                        run_id,
                        summary.processed
                    );
                    break 'pages;
                }

                LogContext::batch_progress(summary.processed + 1, planned_total, &record.name);
                match processor.process(&record).await {
                    Ok(outcome) => summary.absorb(&record.id, outcome),
                    Err(e) => {
                        log_error!("{}: {} failed: {}", record.id, label, e);
                        summary.record_error(&record.id, e.to_string());
                    }
                }
                summary.processed += 1;
                summary.next_offset += 1;
            }
        }

        summary.elapsed = started.elapsed();
        LogContext::performance_metric(
            label,
            summary.elapsed.as_millis() as u64,
            Some(&format!("{} records", summary.processed)),
        );
        Ok(summary)
    }
}
