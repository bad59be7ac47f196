//! Scan orchestration: one pipeline per symbol, failures isolated per symbol, results
//! ranked once everything has come back.

use std::time::Instant;

use chrono::NaiveDate;
use rayon::{prelude::*, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    aggregate::weekly_bars,
    config::ScanConfig,
    criteria::Criteria,
    error::{ScanFailure, ScreenError},
    indicator::IndicatorSnapshot,
    loader::MarketDataSupplier,
    macro_gate::MacroGate,
    model::BarSeries,
    score::{Label, Score},
};

/// One symbol's outcome for a scan pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRecord {
    pub symbol: String,
    pub week: NaiveDate,
    pub pass_count: u8,
    pub composite: f64,
    pub last_close: f64,
    pub adx: f64,
    /// percent distance of close from EMA20
    pub distance: f64,
    pub mfi: f64,
    /// latest volume over its 20-week average
    pub volume_ratio: f64,
    pub label: Option<Label>,
    pub criteria: Criteria,
}

impl ScanRecord {
    pub fn is_radar_lock(&self) -> bool {
        self.pass_count == 6
    }
}

/// Daily bars in, scored record out.
pub fn analyze(
    symbol: &str,
    daily: &BarSeries,
    min_weekly_bars: usize,
) -> Result<ScanRecord, ScreenError> {
    let weekly = weekly_bars(symbol, daily, min_weekly_bars)?;
    let reading = IndicatorSnapshot::compute(&weekly).latest()?;
    let criteria = Criteria::evaluate(&reading);
    let score = Score::of(&reading, &criteria);

    Ok(ScanRecord {
        symbol: symbol.to_owned(),
        week: reading.date,
        pass_count: criteria.pass_count(),
        composite: score.composite,
        last_close: reading.close,
        adx: reading.adx,
        distance: score.distance,
        mfi: reading.mfi,
        volume_ratio: reading.volume / reading.volume_avg,
        label: score.label,
        criteria,
    })
}

/// Radar locks first by composite score, then partial passes. Symbol breaks ties so the
/// order never depends on completion order.
pub fn rank(records: &mut [ScanRecord]) {
    records.sort_by(|a, b| {
        b.pass_count
            .cmp(&a.pass_count)
            .then(b.composite.total_cmp(&a.composite))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub as_of: NaiveDate,
    pub risk_on: bool,
    pub gate: MacroGate,
    pub scanned: usize,
    pub skipped: usize,
    pub records: Vec<ScanRecord>,
}

impl ScanReport {
    pub fn radar_locks(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter().filter(|r| r.is_radar_lock())
    }

    pub fn accumulation_count(&self) -> usize {
        self.radar_locks()
            .filter(|r| r.label == Some(Label::Accumulation))
            .count()
    }

    pub fn summary(&self) -> String {
        format!(
            "week of {}: scanned {}, processed {}, radar lock {}, accumulation {}, macro {}",
            self.as_of,
            self.scanned,
            self.records.len(),
            self.radar_locks().count(),
            self.accumulation_count(),
            if self.risk_on { "risk-on" } else { "risk-off" },
        )
    }
}

#[derive(Debug, Clone, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Running,
    Complete(ScanReport),
    Failed(ScanFailure),
}

pub struct Scanner {
    config: ScanConfig,
    state: ScanState,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            state: ScanState::Idle,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Runs one pass and parks the outcome in the terminal state. Can be called again from
    /// any terminal state.
    pub fn trigger<S: MarketDataSupplier>(
        &mut self,
        supplier: &S,
        universe: &[String],
    ) -> &ScanState {
        self.state = ScanState::Running;
        self.state = match self.run(supplier, universe) {
            Ok(report) => ScanState::Complete(report),
            Err(failure) => ScanState::Failed(failure),
        };
        &self.state
    }

    pub fn run<S: MarketDataSupplier>(
        &self,
        supplier: &S,
        universe: &[String],
    ) -> Result<ScanReport, ScanFailure> {
        let gate = self.config.gate;
        if !gate.risk_on() {
            warn!(?gate, "macro gate is risk-off, scan blocked");
            return Err(ScanFailure::RiskOff);
        }

        let (from, to) = self.config.range();
        let workers = self.config.workers();
        let started = Instant::now();
        info!(symbols = universe.len(), workers, %from, %to, "scan started");

        let scan = |symbol: &String| {
            let result = supplier
                .fetch_daily(symbol, from, to)
                .and_then(|daily| analyze(symbol, &daily, self.config.min_weekly_bars));
            (symbol.clone(), result)
        };

        let results: Vec<_> = if workers == 1 {
            universe.iter().map(scan).collect()
        } else {
            let pool = ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| ScanFailure::WorkerPool(e.to_string()))?;
            pool.install(|| universe.par_iter().map(scan).collect())
        };

        let mut records = Vec::with_capacity(results.len());
        for (symbol, result) in results {
            match result {
                Ok(record) => {
                    debug!(
                        %symbol,
                        pass_count = record.pass_count,
                        composite = record.composite,
                        "symbol scored"
                    );
                    records.push(record);
                }
                Err(ScreenError::SupplierBlocked(_)) => {
                    warn!(%symbol, "supplier blocked request, skipping symbol");
                }
                Err(e) => {
                    warn!(%symbol, error = %e, "skipping symbol");
                }
            }
        }

        if records.is_empty() {
            warn!(symbols = universe.len(), "no symbol could be processed");
            return Err(ScanFailure::NoProcessableSymbols(universe.len()));
        }

        rank(&mut records);

        let report = ScanReport {
            as_of: to,
            risk_on: true,
            gate,
            scanned: universe.len(),
            skipped: universe.len() - records.len(),
            records,
        };
        info!(elapsed = ?started.elapsed(), "{}", report.summary());

        Ok(report)
    }
}
