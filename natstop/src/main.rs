//! Entry point for the natstop TUI. Parses args, checks the server answers, and runs the App.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use natstop::app::App;
use natstop::config::{Cli, Config};
use natstop::fetch::StatsFetcher;
use natstop::logging;
use natstop::poll::PollLoop;
use natstop::profiles::{load_profiles, remember, save_profiles, ProfileEntry, ProfileUpdate};

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // the terminal is already restored by the time we get here
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.version {
        println!("natstop v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut profiles = load_profiles();
    let base = cli
        .profile
        .as_deref()
        .and_then(|name| profiles.profiles.get(name))
        .cloned();
    let cfg = Config::resolve(&cli, base.as_ref())?;

    if let Some(name) = cli.profile.as_deref() {
        let update = remember(&mut profiles, name, ProfileEntry::from(&cfg), cli.save);
        if update != ProfileUpdate::Unchanged {
            save_profiles(&profiles)
                .with_context(|| format!("could not save profile '{name}'"))?;
        }
    }

    let _log_guard =
        logging::init(cfg.log_file.as_deref()).context("could not set up logging")?;
    info!(server = %cfg.target(), sort = %cfg.sort, ui = %cfg.view, "starting natstop");

    let fetcher = StatsFetcher::new(&cfg.host, cfg.port, cfg.conn_limit)?;

    // Smoke test the server once before taking over the terminal
    fetcher.server_stats().await?;

    let (sort_tx, sort_rx) = watch::channel(cfg.sort);
    let (poller, samples) = PollLoop::new(fetcher, cfg.interval, sort_rx);
    let mut app = App::new(&cfg);
    let res = app
        .run(poller, samples, sort_tx)
        .await
        .map_err(anyhow::Error::from);
    match &res {
        Ok(()) => info!("quit"),
        Err(e) => error!("stopping on fatal error: {e:#}"),
    }
    res
}
