pub mod aggregate;
pub mod config;
pub mod criteria;
pub mod error;
pub mod indicator;
pub mod loader;
pub mod macro_gate;
pub mod model;
pub mod scanner;
pub mod score;
pub mod utils;

pub use config::ScanConfig;
pub use error::{ScanFailure, ScreenError};
pub use loader::{CsvSupplier, MarketDataSupplier, MemorySupplier};
pub use macro_gate::MacroGate;
pub use scanner::{ScanRecord, ScanReport, ScanState, Scanner};
