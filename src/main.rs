#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use classpulse::cli::{Cli, Commands};
use classpulse::config::Config;
use classpulse::gateway::FeedbackGateway;
use classpulse::notify::ChangeNotifier;
use classpulse::service::FeedbackService;
use classpulse::store::HistoryStore;
use classpulse::sync::SyncScheduler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::load_or_init()?;

    let store = Arc::new(
        HistoryStore::open(
            &config.history_db_path(),
            config.max_history_items,
            config.eviction_policy,
        )
        .await?,
    );

    match cli.command {
        Commands::Send { kind, text } => {
            let service = FeedbackService::new(Arc::clone(&store), ChangeNotifier::default());
            let item = service
                .submit(kind, &text, Some(user_agent()))
                .await?;
            println!("{} feedback saved, will sync in the background", item.emoji);
        }

        Commands::History => {
            let service = FeedbackService::new(Arc::clone(&store), ChangeNotifier::default());
            let history = service.history().await?;
            if history.is_empty() {
                println!("no feedback yet");
            }
            for item in history {
                let marker = if item.pending { " (saved)" } else { "" };
                let time = item.timestamp.format("%H:%M:%S");
                if item.text.is_empty() {
                    println!("{} {}{}", item.emoji, time, marker);
                } else {
                    println!("{} {} {}{}", item.emoji, time, item.text, marker);
                }
            }
        }

        Commands::Sync => {
            let scheduler = scheduler(&config, Arc::clone(&store));
            let report = scheduler.run_cycle().await?;
            println!(
                "delivered {}, still pending {}",
                report.delivered, report.failed
            );
        }

        Commands::Daemon => {
            let scheduler = Arc::new(scheduler(&config, Arc::clone(&store)));
            let handle = scheduler.spawn();
            tracing::info!(
                interval_ms = config.sync_interval_ms,
                "background sync running, ctrl-c to stop"
            );

            tokio::signal::ctrl_c().await?;
            scheduler.stop();
            handle.await?;
        }
    }

    Ok(())
}

fn scheduler(config: &Config, store: Arc<HistoryStore>) -> SyncScheduler {
    let gateway = FeedbackGateway::new(config.feedback_url(), config.request_timeout_secs);
    SyncScheduler::new(store, gateway, config.sync_interval_ms)
}

fn user_agent() -> String {
    format!("classpulse/{}", env!("CARGO_PKG_VERSION"))
}
