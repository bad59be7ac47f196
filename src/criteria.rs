use serde::Serialize;

use crate::indicator::Reading;

pub const ADX_MIN: f64 = 28.0;
pub const VOLUME_FACTOR: f64 = 1.2;
pub const DISTANCE_MIN: f64 = -2.0;
pub const DISTANCE_MAX: f64 = 30.0;
pub const MFI_MIN: f64 = 50.0;

/// Percent distance of close from the moving average.
pub fn distance_pct(close: f64, ema: f64) -> f64 {
    100.0 * (close - ema) / ema
}

/// The six weekly gates, evaluated on the latest bar only.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Criteria {
    /// close above EMA20 and %K above %D
    pub trend: bool,
    /// ADX at least 28 with DI+ leading
    pub strength: bool,
    pub volume: bool,
    /// close above the parabolic stop
    pub stop: bool,
    pub distance: bool,
    pub money_flow: bool,
}

impl Criteria {
    pub fn evaluate(reading: &Reading) -> Self {
        let distance = distance_pct(reading.close, reading.ema);

        Self {
            trend: reading.close > reading.ema && reading.stoch_k > reading.stoch_d,
            strength: reading.adx >= ADX_MIN && reading.di_plus > reading.di_minus,
            volume: reading.volume >= VOLUME_FACTOR * reading.volume_avg,
            stop: reading.close > reading.sar,
            distance: (DISTANCE_MIN..=DISTANCE_MAX).contains(&distance),
            money_flow: reading.mfi > MFI_MIN,
        }
    }

    pub fn checks(&self) -> [bool; 6] {
        [
            self.trend,
            self.strength,
            self.volume,
            self.stop,
            self.distance,
            self.money_flow,
        ]
    }

    pub fn pass_count(&self) -> u8 {
        self.checks().into_iter().filter(|c| *c).count() as u8
    }

    /// All six gates hold.
    pub fn is_radar_lock(&self) -> bool {
        self.pass_count() == 6
    }
}
