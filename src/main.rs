use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;
use tracing_subscriber::EnvFilter;
use vibefeed::aggregator::{Aggregator, CycleOutcome};
use vibefeed::config::{Config, DEFAULT_CONFIG_PATH};
use vibefeed::controller::{CycleRequest, FeedController};
use vibefeed::feed::{build_client, build_sources};
use vibefeed::tui::{self, state::AppState, TuiCommand};

struct Args {
    config_path: PathBuf,
    once: bool,
}

fn parse_args() -> Result<Args> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut once = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--once" => once = true,
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config_path = PathBuf::from(path);
            }
            other => anyhow::bail!("unknown argument: {} (usage: vibefeed [--config PATH] [--once])", other),
        }
    }

    Ok(Args { config_path, once })
}

fn init_tracing(config: &Config) -> Result<()> {
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("Failed to create log file: {}", config.logging.file))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the request on its own task so a panic inside the cycle surfaces as a
/// `JoinError` instead of taking the engine down.
fn dispatch(
    aggregator: &Arc<Aggregator>,
    req: CycleRequest,
    done_tx: &mpsc::Sender<Result<Option<CycleOutcome>, JoinError>>,
) {
    tracing::info!(page = req.params.page, "dispatching aggregation cycle");
    let aggregator = aggregator.clone();
    let handle = tokio::spawn(async move { aggregator.run_cycle(req.enabled, &req.params).await });
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let _ = done_tx.send(handle.await).await;
    });
}

async fn run_once(aggregator: &Aggregator, ctl: &mut FeedController) -> Result<()> {
    let Some(req) = ctl.begin_cycle() else {
        return Ok(());
    };
    let outcome = aggregator
        .run_cycle(req.enabled, &req.params)
        .await
        .context("aggregation already in flight")?;
    ctl.finish_cycle(outcome);

    let now_ms = chrono::Utc::now().timestamp_millis();
    let visible = ctl.visible_items();
    if visible.is_empty() {
        println!("{}", tui::render::EMPTY_FEED_TEXT);
    }
    for item in visible {
        println!("{}\n", tui::format::plain_card(item, now_ms));
    }
    if let Some(warning) = ctl.warning() {
        eprintln!("{}", warning);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load_or_default(&args.config_path)?;
    init_tracing(&config)?;
    tracing::info!(config = %args.config_path.display(), once = args.once, "starting vibefeed");

    let client = build_client(&config.http)?;
    let aggregator = Arc::new(Aggregator::new(build_sources(&client, &config.endpoints)));
    let mut ctl = FeedController::new(
        config.sources.enabled_sources()?,
        config.sources.rss_url().map(str::to_string),
        config.pagination.near_bottom_threshold,
    );

    if args.once {
        return run_once(&aggregator, &mut ctl).await;
    }

    // Channels
    let (state_tx, state_rx) = watch::channel(AppState::new());
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<TuiCommand>(16);
    let (done_tx, mut done_rx) = mpsc::channel(4);

    // --- Engine: owns the controller, applies commands, runs cycles ---
    tokio::spawn(async move {
        if let Some(req) = ctl.begin_cycle() {
            dispatch(&aggregator, req, &done_tx);
        }
        state_tx.send_modify(|s| {
            s.sync(&ctl);
            s.push_log("INFO", "Loading feed...".to_string());
        });

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { return };
                    let mut log: Option<(&str, String)> = None;
                    let req = match cmd {
                        TuiCommand::Quit => return,
                        TuiCommand::Refresh => {
                            log = Some(("INFO", "Refreshing from page 0".to_string()));
                            ctl.refresh()
                        }
                        TuiCommand::ToggleSource(source) => {
                            let req = ctl.toggle_source(source);
                            let on = if ctl.enabled().contains(source) { "on" } else { "off" };
                            log = Some(("INFO", format!("{} {}", source.label(), on)));
                            req
                        }
                        TuiCommand::SetQuery(query) => {
                            ctl.set_query(&query);
                            None
                        }
                        TuiCommand::SetRssUrl(url) => match ctl.set_rss_url(&url) {
                            Ok(req) => {
                                let shown = ctl.rss_url().unwrap_or("(none)").to_string();
                                log = Some(("INFO", format!("RSS feed: {}", shown)));
                                req
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "rejected feed URL");
                                log = Some(("WARN", format!("Invalid RSS URL: {:#}", e)));
                                None
                            }
                        },
                        TuiCommand::Scroll { delta, viewport_rows } => ctl.scroll(delta, viewport_rows),
                    };
                    if let Some(req) = req {
                        dispatch(&aggregator, req, &done_tx);
                    }
                    state_tx.send_modify(|s| {
                        s.sync(&ctl);
                        if let Some((level, msg)) = log {
                            s.push_log(level, msg);
                        }
                    });
                }
                done = done_rx.recv() => {
                    let Some(done) = done else { return };
                    let (level, msg) = match done {
                        Ok(Some(outcome)) => {
                            let msg = format!(
                                "Loaded {} items (page {}){}",
                                outcome.items.len(),
                                outcome.page,
                                match outcome.failed_sources.len() {
                                    0 => String::new(),
                                    n => format!(", {} source(s) failed", n),
                                }
                            );
                            let level = if outcome.warning.is_some() { "WARN" } else { "INFO" };
                            ctl.finish_cycle(outcome);
                            (level, msg)
                        }
                        Ok(None) => {
                            ctl.skip_cycle();
                            ("INFO", "Cycle skipped: another is in flight".to_string())
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "aggregation task failed");
                            ctl.abort_cycle();
                            ("ERROR", format!("Aggregation failed: {}", e))
                        }
                    };
                    state_tx.send_modify(|s| {
                        s.sync(&ctl);
                        s.push_log(level, msg);
                    });
                }
            }
        }
    });

    // --- Run TUI (blocks until quit) ---
    tui::run_tui(state_rx, cmd_tx).await?;

    tracing::debug!("shutting down");
    Ok(())
}
