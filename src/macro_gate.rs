use serde::{Deserialize, Serialize};

pub const CURRENCY_VOLATILITY_MAX: f64 = 3.0;
pub const CDS_MAX: f64 = 450.0;
pub const VIX_MAX: f64 = 30.0;

/// Macro risk inputs (MFS). Scans only run while these read risk-on.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroGate {
    /// weekly currency move, percent
    pub currency_volatility: f64,
    /// 5Y credit default swap spread
    pub cds: f64,
    pub vix: f64,
    /// benchmark index above its 50-period average
    pub benchmark_above_ma: bool,
}

impl Default for MacroGate {
    fn default() -> Self {
        Self {
            currency_volatility: 1.2,
            cds: 280.0,
            vix: 18.0,
            benchmark_above_ma: true,
        }
    }
}

impl MacroGate {
    pub fn risk_on(&self) -> bool {
        self.currency_volatility < CURRENCY_VOLATILITY_MAX
            && self.cds < CDS_MAX
            && self.vix < VIX_MAX
            && self.benchmark_above_ma
    }
}

#[cfg(test)]
mod tests {
    use super::MacroGate;

    #[test]
    fn unittest_default_inputs_are_risk_on() {
        assert!(MacroGate::default().risk_on());
    }

    #[test]
    fn unittest_currency_spike_turns_risk_off() {
        let gate = MacroGate {
            currency_volatility: 4.0,
            ..Default::default()
        };
        assert!(!gate.risk_on());
    }

    #[test]
    fn unittest_every_input_can_close_the_gate() {
        let base = MacroGate::default();
        let closed = [
            MacroGate { currency_volatility: 3.0, ..base },
            MacroGate { cds: 450.0, ..base },
            MacroGate { vix: 30.0, ..base },
            MacroGate { benchmark_above_ma: false, ..base },
        ];
        assert!(closed.iter().all(|gate| !gate.risk_on()));
    }
}
