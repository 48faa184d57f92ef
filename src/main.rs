//! Binary entrypoint for the feed slideshow.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use feed_slideshow::config::Configuration;
use feed_slideshow::controller::SlideshowController;
use feed_slideshow::events::{ControlCommand, FeedDelivery, ImageLoaded, LoadImage};
use feed_slideshow::headless::HeadlessContainer;
use feed_slideshow::schedule::TimerQueue;
use feed_slideshow::tasks::poller::{HttpFeed, http_client};
use feed_slideshow::tasks::{loader, slideshow};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

#[derive(Debug, Parser)]
#[command(
    name = "feed-slideshow",
    version,
    about = "Rotates the images of a post feed"
)]
struct Cli {
    /// Path to YAML config file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the server base URL
    #[arg(long, value_name = "URL")]
    server_url: Option<String>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("feed_slideshow={level}").parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper_util=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(url) = cli.server_url {
        cfg.server_url = url;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    info!(
        server = %cfg.server_url,
        feed = %cfg.feed_url(),
        "loaded configuration"
    );

    let client = http_client(cfg.request_timeout).context("failed to build HTTP client")?;

    let (feed_tx, feed_rx) = mpsc::channel::<FeedDelivery>(16); // Poller -> Driver
    let (command_tx, command_rx) = mpsc::channel::<ControlCommand>(16); // Signals -> Driver
    let (load_tx, load_rx) = mpsc::channel::<LoadImage>(cfg.loader_max_concurrent_fetches * 2); // Container -> Loader
    let (loaded_tx, mut loaded_rx) = mpsc::channel::<ImageLoaded>(16); // Loader -> log

    let cancel = CancellationToken::new();
    spawn_signal_handlers(cancel.clone(), command_tx);

    let mut tasks = JoinSet::new();
    let mut container = HeadlessContainer::new(cfg.fullscreen_apis.clone());
    if cfg.prefetch_images {
        container = container.with_loader(load_tx);
        tasks.spawn({
            let client = client.clone();
            let server_url = cfg.server_url.clone();
            let cancel = cancel.clone();
            let max_in_flight = cfg.loader_max_concurrent_fetches;
            let remember = cfg.loader_remembered_images;
            async move {
                loader::run(
                    load_rx,
                    loaded_tx,
                    client,
                    server_url,
                    cancel,
                    max_in_flight,
                    remember,
                )
                .await
                .context("loader task failed")
            }
        });
        tasks.spawn(async move {
            while let Some(ImageLoaded { url, width, height }) = loaded_rx.recv().await {
                info!(url, width, height, "slide image ready");
            }
            anyhow::Ok(())
        });
    }

    let feed = HttpFeed::new(client, cfg.feed_url(), feed_tx);
    let controller = SlideshowController::new(cfg.timings(), TimerQueue::new(), container, feed);
    if let Err(err) = slideshow::run(controller, feed_rx, command_rx, cancel.clone())
        .await
        .context("slideshow failed")
    {
        tracing::error!("{err:?}");
    }
    cancel.cancel();

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}

/// Ctrl-C and SIGTERM shut down; SIGUSR1 clicks the container; SIGHUP reloads.
fn spawn_signal_handlers(cancel: CancellationToken, commands: mpsc::Sender<ControlCommand>) {
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        tokio::select! {
                            _ = cancel.cancelled() => {}
                            _ = sigterm.recv() => {
                                tracing::info!("SIGTERM received; initiating shutdown");
                                cancel.cancel();
                            }
                        }
                    }
                    Err(err) => tracing::warn!("failed to register SIGTERM handler: {err}"),
                }
            });
        }

        for (kind, command, name) in [
            (SignalKind::user_defined1(), ControlCommand::Click, "SIGUSR1"),
            (SignalKind::hangup(), ControlCommand::Reload, "SIGHUP"),
        ] {
            let cancel = cancel.clone();
            let commands = commands.clone();
            tokio::spawn(async move {
                match signal(kind) {
                    Ok(mut stream) => loop {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            received = stream.recv() => {
                                if received.is_none() {
                                    break;
                                }
                                tracing::info!(signal = name, ?command, "forwarding control command");
                                if let Err(err) = commands.send(command).await {
                                    tracing::warn!("failed to forward {name}: {err}");
                                    break;
                                }
                            }
                        }
                    },
                    Err(err) => tracing::warn!("failed to register {name} handler: {err}"),
                }
            });
        }
    }

    #[cfg(not(unix))]
    drop(commands);
}
