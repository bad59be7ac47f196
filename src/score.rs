use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::criteria::{distance_pct, Criteria};
use crate::indicator::Reading;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Label {
    #[display(fmt = "accumulation")]
    Accumulation,
    #[display(fmt = "extended")]
    Extended,
    #[display(fmt = "trend-confirmed")]
    TrendConfirmed,
}

/// Ranking heuristic (RKP). Rewards trend strength and inflow, penalises hugging the
/// average. Goes negative for a name sitting on its EMA with weak ADX/MFI.
pub fn composite(adx: f64, mfi: f64, distance: f64) -> f64 {
    0.5 * (adx / 50.0).min(1.0) + 0.3 * (mfi / 100.0)
        - 0.2 * (1.0 - (distance.abs() / 20.0).min(1.0))
}

/// Only radar locks get a label.
pub fn label(criteria: &Criteria, mfi: f64, distance: f64) -> Option<Label> {
    if !criteria.is_radar_lock() {
        return None;
    }

    Some(if mfi > 60.0 && distance < 10.0 {
        Label::Accumulation
    } else if distance > 15.0 {
        Label::Extended
    } else {
        Label::TrendConfirmed
    })
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Score {
    pub composite: f64,
    pub distance: f64,
    pub label: Option<Label>,
}

impl Score {
    pub fn of(reading: &Reading, criteria: &Criteria) -> Self {
        let distance = distance_pct(reading.close, reading.ema);

        Self {
            composite: composite(reading.adx, reading.mfi, distance),
            distance,
            label: label(criteria, reading.mfi, distance),
        }
    }
}
