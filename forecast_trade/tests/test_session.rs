use chrono::NaiveDate;
use forecast_trade::{run_interactive, PipelineParams, Presenter, Session};
use market_data::{MarketDataProvider, Observation};
use std::cell::Cell;
use std::io::Cursor;

/// Provider with no data that counts how often it is asked
#[derive(Default)]
struct CountingProvider {
    calls: Cell<usize>,
}

impl MarketDataProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn fetch_daily(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> market_data::Result<Vec<Observation>> {
        self.calls.set(self.calls.get() + 1);
        Ok(Vec::new())
    }
}

fn run(script: &str, provider: &CountingProvider) -> (PipelineParams, String) {
    let mut session = Session::default();
    let mut output = Vec::new();
    let params = run_interactive(
        &mut session,
        Cursor::new(script.as_bytes()),
        &mut output,
        provider,
        &Presenter::terminal(),
    )
    .unwrap();
    (params, String::from_utf8(output).unwrap())
}

#[test]
fn test_each_accepted_change_reruns_the_pipeline() {
    let provider = CountingProvider::default();
    let (params, output) = run("set ticker msft\nset horizon 60\nrun\nquit\n", &provider);

    assert_eq!(params.ticker, "MSFT");
    assert_eq!(params.horizon, 60);
    // initial run, two changes, explicit run
    assert_eq!(provider.calls.get(), 4);
    assert!(output.contains("Data unavailable"));
}

#[test]
fn test_invalid_value_keeps_previous_params() {
    let provider = CountingProvider::default();
    let script = "set horizon 60\nset horizon 999\nset ticker ZZZZ99\nquit\n";
    let (params, output) = run(script, &provider);

    assert_eq!(params.horizon, 60);
    assert_eq!(params.ticker, "AAPL");
    assert_eq!(provider.calls.get(), 2);
    assert!(output.contains("Horizon must be between 1 and 365"));
    assert!(output.contains("Ticker 'ZZZZ99' is not supported"));
}

#[test]
fn test_session_survives_bad_commands() {
    let provider = CountingProvider::default();
    let (_, output) = run("bogus\nset\n\nhelp\nshow\nexit\nshow\n", &provider);

    assert!(output.contains("Unknown command 'bogus'"));
    assert!(output.contains("usage: set <key> <value>"));
    assert!(output.contains("Commands:"));
    assert!(output.contains("ticker:          AAPL"));
    // nothing after exit is read
    assert_eq!(output.matches("ticker:          AAPL").count(), 1);
}

#[test]
fn test_end_of_input_ends_the_session() {
    let provider = CountingProvider::default();
    let (params, _) = run("set d 2\n", &provider);

    assert_eq!(params.order.d, 2);
    assert_eq!(provider.calls.get(), 2);
}
