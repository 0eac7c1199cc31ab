//! Command-line parsing. Hand-rolled over `std::env::args`.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::config::OutputMode;
use crate::model::PredictionFeatures;

pub const USAGE: &str = "\
usage: neodash [--json|--text] [--input <neos.json>] <command> [args]

commands:
  dashboard [--refresh]                        stat cards, charts, recent NEOs
  analytics                                    histograms, scatters, comparison table
  neos [--page N] [--size N] [--danger true|false] [--name TEXT]
  neo <id>                                     details of one NEO
  train [<start> <end>]                        train on a date range (YYYY-MM-DD)
  train-all                                    train on every available file
  reload                                       reload the latest model
  predict <min_diam_m> <max_diam_m> <velocity_km_s> [<abs_magnitude>]
";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dashboard { refresh: bool },
    Analytics,
    Neos {
        page: u32,
        size: Option<u32>,
        danger: Option<bool>,
        name: Option<String>,
    },
    Neo { id: i64 },
    Train { range: Option<(NaiveDate, NaiveDate)> },
    TrainAll,
    Reload,
    Predict(PredictionFeatures),
    Help,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Dashboard { .. } => "dashboard",
            Command::Analytics => "analytics",
            Command::Neos { .. } => "neos",
            Command::Neo { .. } => "neo",
            Command::Train { .. } => "train",
            Command::TrainAll => "train-all",
            Command::Reload => "reload",
            Command::Predict(_) => "predict",
            Command::Help => "help",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub output: Option<OutputMode>,
    pub input: Option<PathBuf>,
}

fn parse_num<T: std::str::FromStr>(what: &str, raw: Option<&String>) -> Result<T> {
    let raw = raw.ok_or_else(|| anyhow!("missing value for {}", what))?;
    raw.parse::<T>()
        .map_err(|_| anyhow!("invalid {}: {}", what, raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date (YYYY-MM-DD): {}", raw))
}

fn parse_bool(raw: Option<&String>) -> Result<bool> {
    match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("true") | Some("yes") | Some("1") => Ok(true),
        Some("false") | Some("no") | Some("0") => Ok(false),
        Some(other) => bail!("invalid --danger value: {}", other),
        None => bail!("missing value for --danger"),
    }
}

/// `args` excludes the program name.
pub fn parse(args: &[String]) -> Result<Invocation> {
    let mut output = None;
    let mut input = None;
    let mut rest: Vec<String> = Vec::new();

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--json" => output = Some(OutputMode::Json),
            "--text" => output = Some(OutputMode::Text),
            "--input" => {
                let path = it.next().ok_or_else(|| anyhow!("missing value for --input"))?;
                input = Some(PathBuf::from(path));
            }
            _ => rest.push(arg.clone()),
        }
    }

    let Some((cmd, args)) = rest.split_first() else {
        return Ok(Invocation {
            command: Command::Help,
            output,
            input,
        });
    };

    let command = match cmd.as_str() {
        "dashboard" => Command::Dashboard {
            refresh: args.iter().any(|a| a == "--refresh"),
        },
        "analytics" => Command::Analytics,
        "neos" => {
            let mut page = 0;
            let mut size = None;
            let mut danger = None;
            let mut name = None;
            let mut it = args.iter();
            while let Some(flag) = it.next() {
                match flag.as_str() {
                    "--page" => page = parse_num::<u32>("--page", it.next())?.saturating_sub(1),
                    "--size" => size = Some(parse_num::<u32>("--size", it.next())?),
                    "--danger" => danger = Some(parse_bool(it.next())?),
                    "--name" => {
                        name = Some(
                            it.next()
                                .cloned()
                                .ok_or_else(|| anyhow!("missing value for --name"))?,
                        )
                    }
                    other => bail!("unknown flag for neos: {}", other),
                }
            }
            Command::Neos {
                page,
                size,
                danger,
                name,
            }
        }
        "neo" => Command::Neo {
            id: parse_num("id", args.first())?,
        },
        "train" => match args {
            [] => Command::Train { range: None },
            [start, end] => Command::Train {
                range: Some((parse_date(start)?, parse_date(end)?)),
            },
            _ => bail!("train takes either no arguments or <start> <end>"),
        },
        "train-all" => Command::TrainAll,
        "reload" => Command::Reload,
        "predict" => {
            if args.len() < 3 || args.len() > 4 {
                bail!("predict takes <min_diam_m> <max_diam_m> <velocity_km_s> [<abs_magnitude>]");
            }
            Command::Predict(PredictionFeatures {
                min_diameter_m: parse_num("min diameter", args.first())?,
                max_diameter_m: parse_num("max diameter", args.get(1))?,
                velocity_km_s: parse_num("velocity", args.get(2))?,
                absolute_magnitude: match args.get(3) {
                    Some(raw) => Some(parse_num("absolute magnitude", Some(raw))?),
                    None => None,
                },
            })
        }
        "help" | "--help" | "-h" => Command::Help,
        other => bail!("unknown command: {}", other),
    };

    Ok(Invocation {
        command,
        output,
        input,
    })
}
