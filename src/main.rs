use std::env;

use tracing_subscriber::EnvFilter;
use weekly_radar::{loader::load_universe, CsvSupplier, ScanConfig, ScanState, Scanner};

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "weekly_radar=info".into()),
        )
        .init();

    let config = match env::args().nth(1) {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };

    let universe = load_universe(&config.universe)?;
    let supplier = CsvSupplier::new(&config.data_dir);
    let mut scanner = Scanner::new(config);

    match scanner.trigger(&supplier, &universe) {
        ScanState::Complete(report) => {
            println!("{}", serde_json::to_string_pretty(report)?);
            println!("{}", report.summary());
            Ok(())
        }
        ScanState::Failed(failure) => Err(failure.clone().into()),
        ScanState::Idle | ScanState::Running => Err(eyre::eyre!("scan did not finish")),
    }
}
