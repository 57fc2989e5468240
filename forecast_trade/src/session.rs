//! Line-oriented interactive session.
//!
//! Every accepted parameter change produces a fresh [`PipelineParams`] and
//! re-runs the whole pipeline; nothing is cached between runs.

use crate::error::{ForecastError, Result};
use crate::params::{PipelineParams, PARAM_KEYS};
use crate::pipeline::run_pipeline;
use crate::presenter::Presenter;
use market_data::MarketDataProvider;
use std::io::{BufRead, Write};
use std::str::FromStr;

pub const PROMPT: &str = "forecast> ";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Show,
    Run,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = ForecastError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next().map(str::to_lowercase);

        match verb.as_deref() {
            Some("set") => {
                let key = words.next();
                let value = words.collect::<Vec<_>>().join(" ");
                match key {
                    Some(key) if !value.is_empty() => Ok(Command::Set {
                        key: key.to_string(),
                        value,
                    }),
                    _ => Err(ForecastError::InvalidParameter(
                        "usage: set <key> <value>".to_string(),
                    )),
                }
            }
            Some("show") => Ok(Command::Show),
            Some("run") => Ok(Command::Run),
            Some("help") | Some("?") => Ok(Command::Help),
            Some("quit") | Some("exit") => Ok(Command::Quit),
            Some(other) => Err(ForecastError::InvalidParameter(format!(
                "Unknown command '{}', type 'help' for a list",
                other
            ))),
            None => Err(ForecastError::InvalidParameter("Empty command".to_string())),
        }
    }
}

/// Parameters currently in effect
#[derive(Debug, Clone, Default)]
pub struct Session {
    params: PipelineParams,
}

impl Session {
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Parameters after setting `key` to `value`; the session is unchanged
    pub fn apply(&self, key: &str, value: &str) -> Result<PipelineParams> {
        self.params.with_value(key, value)
    }

    /// Make `params` the parameters in effect
    pub fn replace(&mut self, params: PipelineParams) {
        self.params = params;
    }
}

fn write_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  set <key> <value>   change one parameter and re-run")?;
    writeln!(out, "  show                print the current parameters")?;
    writeln!(out, "  run                 re-run with the current parameters")?;
    writeln!(out, "  help                this list")?;
    writeln!(out, "  quit | exit         leave")?;
    writeln!(out, "Keys: {}", PARAM_KEYS.join(", "))?;
    Ok(())
}

fn run_and_present<W: Write>(
    params: &PipelineParams,
    provider: &dyn MarketDataProvider,
    presenter: &Presenter,
    out: &mut W,
) -> Result<()> {
    match run_pipeline(params, provider) {
        Ok(report) => presenter.present(&report, out),
        Err(e) => {
            writeln!(out, "Error: {}", e)?;
            Ok(())
        }
    }
}

/// Read commands from `input` until `quit` or end of input.
///
/// The pipeline runs once up front and again after every accepted change.
/// Errors are printed and the session carries on; only I/O failures on
/// `input` or `output` end it early. Returns the final parameters.
pub fn run_interactive<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    output: &mut W,
    provider: &dyn MarketDataProvider,
    presenter: &Presenter,
) -> Result<PipelineParams> {
    writeln!(output, "Type 'help' for commands.")?;
    run_and_present(session.params(), provider, presenter, output)?;

    let mut lines = input.lines();
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "Error: {}", e)?;
                continue;
            }
        };
        log::debug!("Session command: {:?}", command);

        match command {
            Command::Set { key, value } => match session.apply(&key, &value) {
                Ok(params) => {
                    session.replace(params);
                    run_and_present(session.params(), provider, presenter, output)?;
                }
                Err(e) => writeln!(output, "Error: {}", e)?,
            },
            Command::Show => writeln!(output, "{}", session.params())?,
            Command::Run => run_and_present(session.params(), provider, presenter, output)?,
            Command::Help => write_help(output)?,
            Command::Quit => break,
        }
    }

    writeln!(output)?;
    Ok(session.params().clone())
}
