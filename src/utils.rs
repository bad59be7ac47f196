use std::collections::VecDeque;

use crate::model::Price;

/// Simple moving average over the last `window` fed values.
pub struct MovingAverage {
    values: VecDeque<Price>,
    sum: Price,
    window: usize,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window + 1),
            sum: Price::default(),
            window,
        }
    }

    pub fn feed(&mut self, value: Price) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.sum = Price::default();
    }

    /// `None` until the window has filled.
    pub fn avg(&self) -> Option<Price> {
        (self.window > 0 && self.values.len() == self.window)
            .then(|| self.sum / self.window as Price)
    }
}

/// Rolling mean over a series with holes. A hole restarts the window.
pub fn sma(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut slide = MovingAverage::new(window);

    values
        .iter()
        .map(|value| match value {
            Some(v) => {
                slide.feed(*v);
                slide.avg()
            }
            None => {
                slide.clear();
                None
            }
        })
        .collect()
}
