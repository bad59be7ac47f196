//! Weekly indicator pipeline.
//!
//! Every series is computed over the whole weekly history and stays aligned with it by
//! index. Values are `None` until their window fills, or where the input is degenerate
//! (flat RSI window, zero true range, no money flow).

use chrono::NaiveDate;
use moving_min_max::{MovingMax, MovingMin};
use serde::Serialize;

use crate::{
    error::ScreenError,
    model::{BarSeries, Columns},
    utils::sma,
};

pub const EMA_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const STOCH_PERIOD: usize = 14;
pub const STOCH_SMOOTH: usize = 3;
pub const ADX_PERIOD: usize = 14;
pub const MFI_PERIOD: usize = 14;
pub const VOLUME_PERIOD: usize = 20;

pub const SAR_START: f64 = 0.02;
pub const SAR_STEP: f64 = 0.02;
pub const SAR_MAX: f64 = 0.2;

/// Exponential moving average seeded with the simple average of the first `period` values.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(prev);

    for (ix, value) in values.iter().enumerate().skip(period) {
        prev += alpha * (value - prev);
        out[ix] = Some(prev);
    }

    out
}

/// Wilder smoothing (RMA). Seeds with the mean of the first `period` consecutive defined
/// values; a hole restarts the seed.
pub fn wilder(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let mut seed = Vec::with_capacity(period);
    let mut prev: Option<f64> = None;

    for (ix, value) in values.iter().enumerate() {
        let Some(value) = *value else {
            seed.clear();
            prev = None;
            continue;
        };

        prev = match prev {
            Some(p) => Some((p * (period as f64 - 1.0) + value) / period as f64),
            None => {
                seed.push(value);
                (seed.len() == period).then(|| seed.iter().sum::<f64>() / period as f64)
            }
        };
        out[ix] = prev;
    }

    out
}

/// Wilder RSI of `close`.
pub fn rsi(close: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = vec![None; close.len()];
    let mut losses = vec![None; close.len()];
    for ix in 1..close.len() {
        let change = close[ix] - close[ix - 1];
        gains[ix] = Some(change.max(0.0));
        losses[ix] = Some((-change).max(0.0));
    }

    wilder(&gains, period)
        .into_iter()
        .zip(wilder(&losses, period))
        .map(|(gain, loss)| match (gain?, loss?) {
            (g, l) if l == 0.0 && g == 0.0 => None,
            (_, l) if l == 0.0 => Some(100.0),
            (g, l) => Some(100.0 - 100.0 / (1.0 + g / l)),
        })
        .collect()
}

/// Stochastic RSI: raw %K over a `period` RSI window, then `smooth`-period SMAs for %K
/// and %D.
pub fn stoch_rsi(
    close: &[f64],
    rsi_period: usize,
    period: usize,
    smooth: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut slide_min = MovingMin::<f64>::new();
    let mut slide_max = MovingMax::<f64>::new();

    let raw = rsi(close, rsi_period)
        .into_iter()
        .map(|value| {
            let Some(value) = value else {
                slide_min = MovingMin::new();
                slide_max = MovingMax::new();
                return None;
            };

            slide_min.push(value);
            slide_max.push(value);
            if slide_min.len() > period {
                slide_min.pop();
                slide_max.pop();
            }
            if slide_min.len() < period {
                return None;
            }

            let (low, high) = (*slide_min.min()?, *slide_max.max()?);
            (high > low).then(|| 100.0 * (value - low) / (high - low))
        })
        .collect::<Vec<_>>();

    let k = sma(&raw, smooth);
    let d = sma(&k, smooth);
    (k, d)
}

/// ADX with its directional components.
pub struct Directional {
    pub adx: Vec<Option<f64>>,
    pub di_plus: Vec<Option<f64>>,
    pub di_minus: Vec<Option<f64>>,
}

pub fn directional(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Directional {
    let len = close.len();
    let mut tr = vec![None; len];
    let mut plus_dm = vec![None; len];
    let mut minus_dm = vec![None; len];

    for ix in 1..len {
        let up = high[ix] - high[ix - 1];
        let down = low[ix - 1] - low[ix];
        plus_dm[ix] = Some(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm[ix] = Some(if down > up && down > 0.0 { down } else { 0.0 });
        tr[ix] = Some(
            (high[ix] - low[ix])
                .max((high[ix] - close[ix - 1]).abs())
                .max((low[ix] - close[ix - 1]).abs()),
        );
    }

    let atr = wilder(&tr, period);
    let ratio = |dm: Vec<Option<f64>>| -> Vec<Option<f64>> {
        dm.into_iter()
            .zip(&atr)
            .map(|(dm, atr)| match (dm, *atr) {
                (Some(dm), Some(atr)) if atr > 0.0 => Some(100.0 * dm / atr),
                _ => None,
            })
            .collect()
    };
    let di_plus = ratio(wilder(&plus_dm, period));
    let di_minus = ratio(wilder(&minus_dm, period));

    let dx = di_plus
        .iter()
        .zip(&di_minus)
        .map(|(p, m)| match (*p, *m) {
            (Some(p), Some(m)) if p + m > 0.0 => Some(100.0 * (p - m).abs() / (p + m)),
            _ => None,
        })
        .collect::<Vec<_>>();

    Directional {
        adx: wilder(&dx, period),
        di_plus,
        di_minus,
    }
}

/// Money-flow index on typical price times volume.
pub fn mfi(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
    period: usize,
) -> Vec<Option<f64>> {
    let len = close.len();
    let typical = (0..len)
        .map(|ix| (high[ix] + low[ix] + close[ix]) / 3.0)
        .collect::<Vec<_>>();

    // (positive, negative) flow per row; row 0 has no previous typical price
    let flows = (1..len)
        .map(|ix| {
            let raw = typical[ix] * volume[ix];
            if typical[ix] > typical[ix - 1] {
                (raw, 0.0)
            } else if typical[ix] < typical[ix - 1] {
                (0.0, raw)
            } else {
                (0.0, 0.0)
            }
        })
        .collect::<Vec<_>>();

    let mut out = vec![None; len];
    if period == 0 {
        return out;
    }
    for (end, window) in flows.windows(period).enumerate() {
        let (pos, neg) = window
            .iter()
            .fold((0.0, 0.0), |(p, n), (up, down)| (p + up, n + down));
        out[end + period] = (pos + neg > 0.0).then(|| 100.0 * pos / (pos + neg));
    }

    out
}

/// Parabolic stop-and-reverse with explicit long/short phase tracking.
pub fn parabolic_sar(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    start: f64,
    step: f64,
    max: f64,
) -> Vec<Option<f64>> {
    let len = close.len();
    let mut out = vec![None; len];
    if len < 2 {
        return out;
    }

    let mut long = close[1] >= close[0];
    let mut sar = if long { low[0] } else { high[0] };
    let mut extreme = if long { high[0] } else { low[0] };
    let mut af = start;

    for ix in 1..len {
        let mut next = sar + af * (extreme - sar);

        if long {
            next = next.min(low[ix - 1]);
            if ix >= 2 {
                next = next.min(low[ix - 2]);
            }

            if low[ix] < next {
                long = false;
                next = extreme.max(high[ix]);
                extreme = low[ix];
                af = start;
            } else if high[ix] > extreme {
                extreme = high[ix];
                af = (af + step).min(max);
            }
        } else {
            next = next.max(high[ix - 1]);
            if ix >= 2 {
                next = next.max(high[ix - 2]);
            }

            if high[ix] > next {
                long = true;
                next = extreme.min(low[ix]);
                extreme = high[ix];
                af = start;
            } else if low[ix] < extreme {
                extreme = low[ix];
                af = (af + step).min(max);
            }
        }

        sar = next;
        out[ix] = Some(sar);
    }

    out
}

/// All indicator series for one weekly bar series.
#[derive(Debug, Clone)]
pub struct IndicatorSnapshot {
    pub columns: Columns,
    pub ema: Vec<Option<f64>>,
    pub stoch_k: Vec<Option<f64>>,
    pub stoch_d: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
    pub di_plus: Vec<Option<f64>>,
    pub di_minus: Vec<Option<f64>>,
    pub mfi: Vec<Option<f64>>,
    pub sar: Vec<Option<f64>>,
    pub volume_avg: Vec<Option<f64>>,
}

/// The fully defined latest row of a snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub volume_avg: f64,
    pub ema: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub adx: f64,
    pub di_plus: f64,
    pub di_minus: f64,
    pub mfi: f64,
    pub sar: f64,
}

impl IndicatorSnapshot {
    pub fn compute(weekly: &BarSeries) -> Self {
        let columns = Columns::from(weekly);
        let Columns {
            high,
            low,
            close,
            volume,
            ..
        } = &columns;

        let (stoch_k, stoch_d) = stoch_rsi(close, RSI_PERIOD, STOCH_PERIOD, STOCH_SMOOTH);
        let Directional {
            adx,
            di_plus,
            di_minus,
        } = directional(high, low, close, ADX_PERIOD);
        let volumes = volume.iter().copied().map(Some).collect::<Vec<_>>();

        Self {
            ema: ema(close, EMA_PERIOD),
            stoch_k,
            stoch_d,
            adx,
            di_plus,
            di_minus,
            mfi: mfi(high, low, close, volume, MFI_PERIOD),
            sar: parabolic_sar(high, low, close, SAR_START, SAR_STEP, SAR_MAX),
            volume_avg: sma(&volumes, VOLUME_PERIOD),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reads the last row; any undefined value rejects the whole snapshot.
    pub fn latest(&self) -> Result<Reading, ScreenError> {
        let last = self
            .len()
            .checked_sub(1)
            .ok_or(ScreenError::IndicatorUndefined("close"))?;
        let at = |series: &[Option<f64>], name: &'static str| {
            series
                .get(last)
                .copied()
                .flatten()
                .filter(|v| v.is_finite())
                .ok_or(ScreenError::IndicatorUndefined(name))
        };

        Ok(Reading {
            date: self.columns.dates[last],
            close: self.columns.close[last],
            volume: self.columns.volume[last],
            volume_avg: at(&self.volume_avg, "volume_avg")?,
            ema: at(&self.ema, "ema")?,
            stoch_k: at(&self.stoch_k, "stoch_k")?,
            stoch_d: at(&self.stoch_d, "stoch_d")?,
            adx: at(&self.adx, "adx")?,
            di_plus: at(&self.di_plus, "di_plus")?,
            di_minus: at(&self.di_minus, "di_minus")?,
            mfi: at(&self.mfi, "mfi")?,
            sar: at(&self.sar, "sar")?,
        })
    }
}
