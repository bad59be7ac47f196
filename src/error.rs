use thiserror::Error;

/// Why a single symbol dropped out of a scan. Never aborts the batch.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// The supplier had nothing for the symbol in the requested range.
    #[error("no data for {0}")]
    DataUnavailable(String),

    /// Fewer weekly bars than the analysis needs.
    #[error("insufficient history: {got} weekly bars, need {need}")]
    InsufficientHistory { got: usize, need: usize },

    /// An indicator has no defined value at the latest row.
    #[error("indicator {0} undefined at latest bar")]
    IndicatorUndefined(&'static str),

    /// The supplier refused the request (rate limit, block).
    #[error("supplier blocked request for {0}")]
    SupplierBlocked(String),

    #[error("failed to read market data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed market data: {0}")]
    Parse(String),
}

/// Run-level outcomes that leave the scanner without a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanFailure {
    #[error("macro gate is risk-off, scan blocked")]
    RiskOff,

    #[error("none of the {0} symbols could be processed")]
    NoProcessableSymbols(usize),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}
