use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{aggregate::MIN_WEEKLY_BARS, macro_gate::MacroGate};

pub const MIN_LOOKBACK_DAYS: u64 = 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// calendar days of daily history to request
    pub lookback_days: u64,
    pub min_weekly_bars: usize,
    /// 1 runs symbols one at a time
    pub workers: usize,
    /// last day of the requested range, today when unset
    pub as_of: Option<NaiveDate>,
    pub data_dir: PathBuf,
    pub universe: PathBuf,
    pub gate: MacroGate,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_days: 730,
            min_weekly_bars: MIN_WEEKLY_BARS,
            workers: 10,
            as_of: None,
            data_dir: PathBuf::from("./data"),
            universe: PathBuf::from("./data/universe.txt"),
            gate: MacroGate::default(),
        }
    }
}

impl ScanConfig {
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn with_lookback_days(mut self, value: u64) -> Self {
        self.lookback_days = value;
        self
    }

    pub fn with_min_weekly_bars(mut self, value: usize) -> Self {
        self.min_weekly_bars = value;
        self
    }

    pub fn with_workers(mut self, value: usize) -> Self {
        self.workers = value;
        self
    }

    pub fn with_as_of(mut self, value: NaiveDate) -> Self {
        self.as_of = Some(value);
        self
    }

    pub fn with_data_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.data_dir = value.into();
        self
    }

    pub fn with_gate(mut self, value: MacroGate) -> Self {
        self.gate = value;
        self
    }

    /// Inclusive daily range to request. Lookback never drops below one year.
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        let to = self.as_of.unwrap_or_else(|| Local::now().date_naive());
        let days = self.lookback_days.max(MIN_LOOKBACK_DAYS);
        let from = to.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        (from, to)
    }

    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }
}
