use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use orderbot::engine::{spawn_worker, OrderCommand, OrderEngine};
use orderbot::gateway::SandboxGateway;
use orderbot::ledger::Ledger;
use orderbot::notify::TelegramNotifier;
use orderbot::settings::Settings;
use orderbot::stats::StatsWriter;

#[derive(Parser)]
#[command(about = "Order bookkeeping core: tracks orders, closes them on price ticks")]
struct Args {
    /// Path to the TOML settings file (defaults to ./orderbot.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Place orders with the broker sandbox account
    #[arg(long)]
    open_orders: bool,

    /// Post open/close events to Telegram
    #[arg(long)]
    notify: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if args.open_orders {
        settings.open_orders = true;
    }
    if args.notify {
        settings.notify = true;
    }

    tracing::info!("orderbot starting");
    tracing::info!("  ledger: {}", settings.ledger_path);
    tracing::info!("  stats dir: {}", settings.stats_dir);
    tracing::info!("  instruments: {}", settings.instruments.len());
    tracing::info!("  open orders: {}", settings.open_orders);
    tracing::info!("  notifications: {}", settings.notify);

    let mut engine: OrderEngine<SandboxGateway, TelegramNotifier> = OrderEngine::new(
        Ledger::new(&settings.ledger_path),
        StatsWriter::new(&settings.stats_dir),
        settings.duplicate_guard(),
        settings.session_window()?,
        settings.registry(),
        settings.account_id.clone(),
    );

    if settings.open_orders {
        engine = engine.with_gateway(
            SandboxGateway::new(&settings.broker.base_url, &settings.broker.token),
            settings.gateway_timeout(),
        );
    }

    if settings.notify {
        match &settings.telegram {
            Some(telegram) => {
                engine = engine
                    .with_notifier(TelegramNotifier::new(&telegram.bot_token, &telegram.chat_id));
            }
            None => {
                tracing::warn!("notifications enabled but no telegram settings, disabling");
            }
        }
    }

    // Signal detection and the market-data feed attach as producers on
    // this channel; the worker is the only consumer.
    let (commands, worker) = spawn_worker(engine, 256);

    // Periodic statistics pass.
    let stats_task = {
        let commands = commands.clone();
        let interval = Duration::from_secs(settings.stats_interval_minutes * 60);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await; // first tick fires immediately, skip it

            loop {
                ticker.tick().await;
                if commands.send(OrderCommand::WriteStats).await.is_err() {
                    break;
                }
            }
        })
    };

    tracing::info!("worker running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    stats_task.abort();
    let _ = commands.send(OrderCommand::Shutdown).await;

    // Final statistics pass over whatever the run produced.
    let engine = worker.await?;
    engine.write_statistics();

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("orderbot=info")
        .init();
}
