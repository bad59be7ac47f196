use std::collections::btree_map::Entry;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::{
    error::ScreenError,
    model::{Bar, BarSeries},
};

pub const MIN_WEEKLY_BARS: usize = 50;

/// Friday closing the week `date` belongs to. Weekend rows roll into the next week.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let from_monday = date.weekday().num_days_from_monday();
    let friday = Weekday::Fri.num_days_from_monday();
    let ahead = (friday + 7 - from_monday) % 7;

    date.checked_add_days(Days::new(ahead as u64)).unwrap_or(date)
}

/// Resamples daily bars into Friday-anchored weekly bars.
pub fn to_weekly(daily: &BarSeries) -> BarSeries {
    let mut weekly = BarSeries::new();

    for (date, bar) in daily {
        match weekly.entry(week_ending(*date)) {
            Entry::Vacant(slot) => {
                slot.insert(*bar);
            }
            Entry::Occupied(mut slot) => {
                let week = slot.get_mut();
                week.high = week.high.max(bar.high);
                week.low = week.low.min(bar.low);
                week.close = bar.close;
                week.volume += bar.volume;
            }
        }
    }

    weekly
}

/// Aggregates and rejects series too short to analyze.
pub fn weekly_bars(
    symbol: &str,
    daily: &BarSeries,
    min_bars: usize,
) -> Result<BarSeries, ScreenError> {
    if daily.is_empty() {
        return Err(ScreenError::DataUnavailable(symbol.to_owned()));
    }

    let weekly = to_weekly(daily);
    if weekly.len() < min_bars {
        return Err(ScreenError::InsufficientHistory {
            got: weekly.len(),
            need: min_bars,
        });
    }

    Ok(weekly)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Days, NaiveDate, Weekday};
    use itertools::Itertools;

    use super::{to_weekly, week_ending, weekly_bars, MIN_WEEKLY_BARS};
    use crate::{
        error::ScreenError,
        model::{Bar, BarSeries},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn trading_days(start: NaiveDate, count: usize) -> BarSeries {
        start
            .iter_days()
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .take(count)
            .enumerate()
            .map(|(ix, d)| {
                let base = 100.0 + ix as f64;
                (
                    d,
                    Bar {
                        open: base,
                        high: base + 2.0,
                        low: base - 2.0,
                        close: base + 1.0,
                        volume: 1000.0 + ix as f64,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn unittest_week_ending_rolls_to_friday() {
        // 2024-01-01 is a Monday
        assert_eq!(week_ending(date(2024, 1, 1)), date(2024, 1, 5));
        assert_eq!(week_ending(date(2024, 1, 5)), date(2024, 1, 5));
        assert_eq!(week_ending(date(2024, 1, 6)), date(2024, 1, 12));
        assert_eq!(week_ending(date(2024, 1, 7)), date(2024, 1, 12));
    }

    #[test]
    fn unittest_weekly_bucket_aggregates_ohlcv() {
        let daily = trading_days(date(2024, 1, 1), 10);
        let weekly = to_weekly(&daily);

        assert_eq!(weekly.len(), 2);
        let first = weekly[&date(2024, 1, 5)];
        assert_eq!(first.open, 100.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.high, 106.0);
        assert_eq!(first.low, 98.0);
        assert_eq!(first.volume, 1000.0 + 1001.0 + 1002.0 + 1003.0 + 1004.0);
    }

    #[test]
    fn unittest_holiday_gap_is_not_filled() {
        let mut daily = trading_days(date(2024, 1, 1), 15);
        // drop the whole middle week
        for d in date(2024, 1, 8).iter_days().take(5) {
            daily.remove(&d);
        }
        let weekly = to_weekly(&daily);

        assert_eq!(
            weekly.keys().copied().collect_vec(),
            vec![date(2024, 1, 5), date(2024, 1, 19)]
        );
    }

    #[test]
    fn unittest_weekly_dates_strictly_increase() {
        let daily = trading_days(date(2022, 3, 9), 400);
        let weekly = to_weekly(&daily);

        assert!(weekly.len() <= daily.len() / 5 + 2);
        assert!(weekly
            .keys()
            .tuple_windows()
            .all(|(a, b)| *b == a.checked_add_days(Days::new(7)).unwrap()));
    }

    #[test]
    fn unittest_empty_series_is_unavailable() {
        let result = weekly_bars("EMPTY", &BarSeries::new(), MIN_WEEKLY_BARS);
        assert!(matches!(result, Err(ScreenError::DataUnavailable(s)) if s == "EMPTY"));
    }

    #[test]
    fn unittest_short_series_is_rejected() {
        let daily = trading_days(date(2024, 1, 1), 49 * 5);
        let result = weekly_bars("SHORT", &daily, MIN_WEEKLY_BARS);
        assert!(matches!(
            result,
            Err(ScreenError::InsufficientHistory { got: 49, need: 50 })
        ));
    }

    #[test]
    fn unittest_fifty_weeks_is_enough() -> eyre::Result<()> {
        let daily = trading_days(date(2024, 1, 1), 50 * 5);
        let weekly = weekly_bars("OK", &daily, MIN_WEEKLY_BARS)?;
        assert_eq!(weekly.len(), 50);
        Ok(())
    }
}
