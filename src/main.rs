use anyhow::Result;
use chrono::Utc;
use std::time::Instant;

use neodash::cli::{self, Command, Invocation, USAGE};
use neodash::client::http::HttpMlClient;
use neodash::client::NeoSourceKind;
use neodash::config::{Config, OutputMode};
use neodash::logging::{log, log_session_summary, obj, run_id, v_str, Domain, Level};
use neodash::pages::dashboard::DashboardSettings;
use neodash::pages::ml::default_training_range;
use neodash::pages::{AnalyticsPage, DashboardPage, MlPage, NeoListPage, PageOutcome};
use neodash::render::{JsonRenderer, Renderer, TextRenderer};
use neodash::view::ViewState;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match cli::parse(&args) {
        Ok(inv) => inv,
        Err(err) => {
            eprintln!("error: {:#}\n\n{}", err, USAGE);
            std::process::exit(2);
        }
    };
    if invocation.command == Command::Help {
        print!("{}", USAGE);
        return Ok(());
    }

    let mut cfg = Config::from_env();
    if let Some(mode) = invocation.output {
        cfg.output = mode;
    }
    log(
        Level::Info,
        Domain::System,
        "session.start",
        obj(&[
            ("run_id", v_str(run_id())),
            ("command", v_str(invocation.command.name())),
            ("neo_core_url", v_str(&cfg.neo_core_url)),
            ("ml_service_url", v_str(&cfg.ml_service_url)),
        ]),
    );

    let renderer: Box<dyn Renderer> = match cfg.output {
        OutputMode::Text => Box::new(TextRenderer),
        OutputMode::Json => Box::new(JsonRenderer),
    };

    let started = Instant::now();
    let command = invocation.command.name();
    let outcome = run(&cfg, invocation, renderer.as_ref()).await?;
    if !outcome.is_ok() {
        log(
            Level::Warn,
            Domain::System,
            "session.partial",
            obj(&[("failed", serde_json::json!(outcome.failed))]),
        );
    }
    log_session_summary(command, started.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

/// Section failures are rendered and logged, not returned; only setup
/// errors (bad base URL, unreadable snapshot) surface as `Err`.
async fn run(cfg: &Config, invocation: Invocation, renderer: &dyn Renderer) -> Result<PageOutcome> {
    let neo_kind = match invocation.input {
        Some(path) => NeoSourceKind::File(path),
        None => NeoSourceKind::Http,
    };

    let outcome = match invocation.command {
        Command::Dashboard { refresh } => {
            let neos = neo_kind.build(cfg)?;
            let page = DashboardPage::new(neos.as_ref(), renderer, DashboardSettings::from(cfg));
            if refresh {
                page.refresh().await
            } else {
                page.load().await
            }
        }
        Command::Analytics => {
            let neos = neo_kind.build(cfg)?;
            AnalyticsPage::new(neos.as_ref(), renderer, cfg.analytics_batch)
                .load()
                .await
        }
        Command::Neos {
            page,
            size,
            danger,
            name,
        } => {
            let neos = neo_kind.build(cfg)?;
            let mut view = ViewState::new(cfg.page_size);
            view.apply_filters(danger, name, size.unwrap_or(cfg.page_size));
            view.current_page = page;
            NeoListPage::new(neos.as_ref(), renderer, view).load().await
        }
        Command::Neo { id } => {
            let neos = neo_kind.build(cfg)?;
            NeoListPage::new(neos.as_ref(), renderer, ViewState::new(cfg.page_size))
                .show_details(id)
                .await
        }
        Command::Train { range } => {
            let ml = HttpMlClient::new(cfg)?;
            let (start, end) = range.unwrap_or_else(|| default_training_range(Utc::now().date_naive()));
            MlPage::new(&ml, renderer).train(Some(start), Some(end)).await
        }
        Command::TrainAll => {
            let ml = HttpMlClient::new(cfg)?;
            MlPage::new(&ml, renderer).train_all().await
        }
        Command::Reload => {
            let ml = HttpMlClient::new(cfg)?;
            MlPage::new(&ml, renderer).reload().await
        }
        Command::Predict(features) => {
            let ml = HttpMlClient::new(cfg)?;
            MlPage::new(&ml, renderer).predict(features).await
        }
        Command::Help => PageOutcome::ok(),
    };
    Ok(outcome)
}
