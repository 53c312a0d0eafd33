// Coordinator - owns the position store and runs the maintenance cycle
//
// Each cycle: ingest the log -> mark it consumed -> evict stale entries ->
// render -> rewrite the POI file. Eviction runs before rendering so an entry
// that just expired never shows up in that cycle's output.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::Result;
use crate::ingest::{CsvLog, IngestReport};
use crate::output::{self, PoiFile, PoiStyle};
use crate::staleness::{Activity, Thresholds};
use crate::store::PositionStore;

/// Summary of one maintenance cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// `None` when there was no log to read
    pub ingest: Option<IngestReport>,
    /// True once the consumed hook ran cleanly on this cycle's rows
    pub log_consumed: bool,
    pub evicted: usize,
    pub active: usize,
    pub inactive: usize,
}

impl CycleReport {
    pub fn stations(&self) -> usize {
        self.active + self.inactive
    }
}

/// Sole owner of the position store.
///
/// Nothing else holds a reference to the store; the GPS task runs
/// independently and never reads it.
pub struct Coordinator {
    store: PositionStore,
    log: CsvLog,
    poi: PoiFile,
    thresholds: Thresholds,
    style: PoiStyle,
}

impl Coordinator {
    pub fn new(log: CsvLog, poi: PoiFile, thresholds: Thresholds, style: PoiStyle) -> Self {
        Coordinator {
            store: PositionStore::new(),
            log,
            poi,
            thresholds,
            style,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CsvLog::new(&config.log_file, config.clear_log_after_reading),
            PoiFile::new(&config.poi_file),
            config.thresholds(),
            config.poi_style(),
        )
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    /// Run one cycle against `now` (UTC).
    pub fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        report.ingest = self.log.ingest_into(&mut self.store)?;
        report.log_consumed = report.ingest.map_or(false, |ingest| ingest.consumed);

        report.evicted = self.thresholds.evict(&mut self.store, now);

        for entry in self.store.iter() {
            match self.thresholds.classify(entry, now) {
                Activity::Active => report.active += 1,
                Activity::Inactive => report.inactive += 1,
            }
        }

        let text = output::render(&self.store, now, &self.thresholds, &self.style);
        self.poi.write(&text)?;

        Ok(report)
    }

    /// Run a cycle every `period`, forever.
    ///
    /// A failed cycle is logged and the next one proceeds with whatever is
    /// already in the store.
    pub async fn run(mut self, period: Duration) {
        info!(
            "Maintenance every {:?}: {} -> {}",
            period,
            self.log.path().display(),
            self.poi.path().display()
        );
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut last_stations = 0usize;
        loop {
            ticker.tick().await;
            match self.run_cycle(Utc::now()) {
                Ok(report) => {
                    log_cycle(&report);
                    if report.stations() != last_stations {
                        info!(
                            "Status: {} stations ({} active, {} inactive)",
                            report.stations(),
                            report.active,
                            report.inactive
                        );
                        last_stations = report.stations();
                    }
                }
                Err(e) => error!("Maintenance cycle failed: {}", e),
            }
        }
    }
}

fn log_cycle(report: &CycleReport) {
    match report.ingest {
        Some(ingest) => debug!(
            "Cycle: {} rows, {} admitted, {} rejected, {} evicted, {} stations written",
            ingest.rows,
            ingest.admitted,
            ingest.rejected(),
            report.evicted,
            report.stations()
        ),
        None => debug!(
            "Cycle: no log, {} evicted, {} stations written",
            report.evicted,
            report.stations()
        ),
    }
}
