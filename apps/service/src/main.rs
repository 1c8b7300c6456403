//! downtrack - checks subscribed HTTPS endpoints on an interval and mails
//! subscribers when one goes down or comes back.

mod cli;
mod config;
mod database;
mod mail;
mod pool;
mod status_store;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use downtrack::{
    CancellationToken, CheckDispatcher, CheckerSettings, HttpChecker, MonitoringExecutor,
    MonitoringScheduler, Prober, StatusTracker,
};
use tracing::{error, info, warn};

use cli::{Cli, Command};
use config::Config;
use database::{AddTargetOutcome, SubscriberRepository, initialize_database};
use mail::SmtpNotifier;
use status_store::RedisStatusStore;

const REGISTRY_POOL_SIZE: usize = 4;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref())?;

    match cli.selected() {
        Command::Run => run(&config).await,
        Command::Check => check(&config).await,
        Command::Add { email, url } => {
            let repo = open_registry(&config).await?;
            match repo.add_target(&email, &url).await? {
                AddTargetOutcome::Added => println!("Now watching {url} for {email}"),
                AddTargetOutcome::PendingVerification => {
                    println!("Added {url} for {email}; checks start once the subscriber is verified")
                }
                AddTargetOutcome::AlreadyExists => println!("{url} is already watched for {email}"),
            }
            Ok(())
        }
        Command::Remove { email, url } => {
            let repo = open_registry(&config).await?;
            if repo.remove_target(&email, &url).await? {
                println!("Stopped watching {url} for {email}");
            } else {
                println!("{url} was not watched for {email}");
            }
            Ok(())
        }
        Command::Verify { email } => {
            let repo = open_registry(&config).await?;
            if repo.verify_subscriber(&email).await? {
                println!("{email} verified");
            } else {
                println!("No subscriber named {email}");
            }
            Ok(())
        }
        Command::List { email } => {
            let repo = open_registry(&config).await?;
            let verified = repo.is_verified(&email).await?;
            let targets = repo.list_targets(&email).await?;
            println!("{email} ({})", if verified { "verified" } else { "unverified" });
            for url in targets {
                println!("  {url}");
            }
            Ok(())
        }
    }
}

/// Open the registry database and bring its schema up to date
async fn open_registry(config: &Config) -> Result<SubscriberRepository> {
    let pool = pool::open_pool(&config.database.path, REGISTRY_POOL_SIZE)
        .await
        .with_context(|| format!("failed to open database {}", config.database.path))?;
    {
        let conn = pool.get().await?;
        initialize_database(&conn).await?;
    }
    Ok(SubscriberRepository::new_from_pool(pool))
}

/// Wire the concrete collaborators into a dispatcher
async fn build_dispatcher(config: &Config, settings: &CheckerSettings) -> Result<Arc<CheckDispatcher>> {
    let registry = open_registry(config).await?;
    let store = RedisStatusStore::connect(&config.redis.url)
        .await
        .context("failed to connect to redis")?;
    let notifier = SmtpNotifier::new(&config.smtp);
    let checker = HttpChecker::new(settings.probe_timeout).context("failed to build HTTP client")?;

    let executor = MonitoringExecutor::new(
        Prober::new(Arc::new(checker)),
        StatusTracker::new(Arc::new(store), Arc::new(notifier)),
    );

    Ok(Arc::new(CheckDispatcher::new(Arc::new(registry), Arc::new(executor), settings)))
}

async fn run(config: &Config) -> Result<()> {
    let settings = CheckerSettings::from_env();
    info!("Starting downtrack\n{}\n{}", config, settings);

    let dispatcher = build_dispatcher(config, &settings).await?;
    let cancel = CancellationToken::new();
    let scheduler = MonitoringScheduler::new(dispatcher, settings.interval).spawn(cancel.clone());

    shutdown_signal().await;
    info!("Shutdown requested, stopping checks");
    cancel.cancel();

    if let Err(e) = scheduler.await {
        error!("Scheduler task failed: {}", e);
    }
    info!("Shutdown complete");
    Ok(())
}

async fn check(config: &Config) -> Result<()> {
    let settings = CheckerSettings::from_env();
    let dispatcher = build_dispatcher(config, &settings).await?;

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            cancel.cancel();
        })
    };

    let result = dispatcher.run_cycle(&cancel).await;
    watcher.abort();

    let summary = result?;
    println!(
        "checked {} of {} targets in {:.1?}: {} up, {} down, {} invalid, {} alerts sent",
        summary.completed,
        summary.enqueued,
        summary.elapsed,
        summary.up,
        summary.down,
        summary.invalid,
        summary.alerts_sent
    );
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
