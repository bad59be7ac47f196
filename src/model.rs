use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type Price = f64;

/// One OHLCV period. The period-end date is the key it is stored under in a [`BarSeries`].
#[derive(Default, Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f64,
}

/// Bars keyed by period-end date. The map keeps dates strictly increasing and unique.
pub type BarSeries = BTreeMap<NaiveDate, Bar>;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub trades: BarSeries,
}

/// Column-wise view of a bar series, which is what the indicator math wants.
#[derive(Default, Debug, Clone)]
pub struct Columns {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<Price>,
    pub high: Vec<Price>,
    pub low: Vec<Price>,
    pub close: Vec<Price>,
    pub volume: Vec<f64>,
}

impl Columns {
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

impl From<&BarSeries> for Columns {
    fn from(series: &BarSeries) -> Self {
        let mut columns = Columns::default();

        for (date, bar) in series {
            columns.dates.push(*date);
            columns.open.push(bar.open);
            columns.high.push(bar.high);
            columns.low.push(bar.low);
            columns.close.push(bar.close);
            columns.volume.push(bar.volume);
        }

        columns
    }
}
