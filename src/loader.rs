use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::{
    error::ScreenError,
    model::{Bar, BarSeries, Stock},
};

/// Source of daily bars for one symbol over an inclusive date range.
pub trait MarketDataSupplier: Sync {
    fn fetch_daily(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BarSeries, ScreenError>;
}

/// Reads `<root>/<SYMBOL>.csv` files with a `Date,Open,High,Low,Close,Volume` header.
pub struct CsvSupplier {
    root: PathBuf,
}

impl CsvSupplier {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MarketDataSupplier for CsvSupplier {
    fn fetch_daily(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BarSeries, ScreenError> {
        let path = self.root.join(format!("{symbol}.csv"));
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScreenError::DataUnavailable(symbol.to_owned()))
            }
            Err(e) => return Err(e.into()),
        };

        let trades = load_daily_bars(BufReader::new(file))?
            .into_iter()
            .filter(|(date, _)| (from..=to).contains(date))
            .collect::<BarSeries>();

        if trades.is_empty() {
            return Err(ScreenError::DataUnavailable(symbol.to_owned()));
        }

        Ok(trades)
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, line: &str) -> Result<T, ScreenError> {
    field
        .trim()
        .parse()
        .map_err(|_| ScreenError::Parse(format!("bad field {field:?} in line {line:?}")))
}

fn load_daily_bars(reader: impl BufRead) -> Result<BarSeries, ScreenError> {
    let mut trades = BarSeries::new();

    for line in reader.lines().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let splits = line.split(',').collect_vec();
        if splits.len() < 6 {
            return Err(ScreenError::Parse(format!("truncated line {line:?}")));
        }

        // halted sessions come through with empty prices
        if splits[1].trim().is_empty() {
            continue;
        }

        let date = NaiveDate::parse_from_str(splits[0].trim(), "%Y-%m-%d")
            .map_err(|e| ScreenError::Parse(format!("bad date in line {line:?}: {e}")))?;

        trades.insert(
            date,
            Bar {
                open: parse_field(splits[1], &line)?,
                high: parse_field(splits[2], &line)?,
                low: parse_field(splits[3], &line)?,
                close: parse_field(splits[4], &line)?,
                volume: parse_field(splits[5], &line)?,
            },
        );
    }

    Ok(trades
        .into_iter()
        .filter(|(_, d)| d.open > 0.0 && d.close > 0.0 && d.volume >= 0.0)
        .collect())
}

/// Symbol list, one per line after a header; the first column is the symbol.
pub fn load_universe(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut symbols = vec![];

    for line in reader.lines().skip(1) {
        let line = line?;
        let Some(symbol) = line.split(',').next().map(str::trim) else {
            continue;
        };
        if !symbol.is_empty() {
            symbols.push(symbol.to_owned());
        }
    }

    Ok(symbols.into_iter().unique().collect())
}

/// Serves preloaded series. Symbols listed in `blocked` answer as rate-limited.
#[derive(Default)]
pub struct MemorySupplier {
    stocks: HashMap<String, BarSeries>,
    blocked: HashSet<String>,
}

impl MemorySupplier {
    pub fn new(stocks: impl IntoIterator<Item = Stock>) -> Self {
        Self {
            stocks: stocks.into_iter().map(|s| (s.symbol, s.trades)).collect(),
            blocked: HashSet::new(),
        }
    }

    pub fn with_blocked(mut self, symbol: impl Into<String>) -> Self {
        self.blocked.insert(symbol.into());
        self
    }
}

impl MarketDataSupplier for MemorySupplier {
    fn fetch_daily(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BarSeries, ScreenError> {
        if self.blocked.contains(symbol) {
            return Err(ScreenError::SupplierBlocked(symbol.to_owned()));
        }

        let trades: BarSeries = self
            .stocks
            .get(symbol)
            .map(|trades| trades.range(from..=to).map(|(d, b)| (*d, *b)).collect())
            .unwrap_or_default();

        Ok(trades)
    }
}
