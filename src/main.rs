use anyhow::{Context, Result};
use clap::Parser;
use forecast_trade::{run_interactive, run_pipeline, Session};
use std::io::{self, Write};
use stock_forecaster::Cli;

const WORKSPACE_CRATES: [&str; 4] = [
    "stock_forecaster",
    "forecast_trade",
    "market_data",
    "trade_math",
];

fn init_log() {
    let mut builder = env_logger::Builder::new();
    builder.filter(None, log::LevelFilter::Warn);
    for name in WORKSPACE_CRATES {
        builder.filter(Some(name), log::LevelFilter::Info);
    }
    // RUST_LOG, when set, wins over the defaults above
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.init();
}

fn main() -> Result<()> {
    init_log();

    let cli = Cli::parse();
    let params = cli.params()?;
    let provider = cli.provider()?;
    let presenter = cli.presenter();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.interactive {
        let mut session = Session::new(params);
        let stdin = io::stdin();
        let input = stdin.lock();
        run_interactive(&mut session, input, &mut out, provider.as_ref(), &presenter)
            .context("interactive session ended with an I/O error")?;
        return Ok(());
    }

    let report = run_pipeline(&params, provider.as_ref())
        .with_context(|| format!("pipeline run for {} failed", params.ticker))?;
    presenter
        .present(&report, &mut out)
        .context("failed to write the report")?;
    out.flush()?;

    if !report.is_complete() {
        log::warn!("Some analysis stages failed; see the report above");
    }
    Ok(())
}
