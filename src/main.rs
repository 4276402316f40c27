use anyhow::Context;
use clap::Parser;
use scalpbot::api::IgClient;
use scalpbot::config::{load_settings, BrokerCredentials, Settings};
use scalpbot::dashboard::{self, DashboardState};
use scalpbot::execution::{Ledger, LoopConfig, PollOutcome, TradingLoop};
use scalpbot::strategy::CrossoverStrategy;
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(name = "scalpbot", about = "SMA crossover scalper with simulated fills")]
struct Cli {
    /// Settings file (TOML); defaults to config/scalper.toml if present
    #[arg(short, long)]
    config: Option<String>,

    /// Do not start the web dashboard
    #[arg(long)]
    no_dashboard: bool,

    /// Run a single poll and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;
    log_settings(&settings);

    let credentials = BrokerCredentials::from_env().context("Missing broker credentials")?;
    let client = IgClient::connect(settings.broker.base_url.clone(), &credentials)
        .await
        .context("Could not authenticate with IG")?;
    tracing::info!("🚀 Bot authenticated and running...");

    let ledger = Ledger::from_capacity(settings.ledger_capacity).into_shared();
    let trading = TradingLoop::new(
        client,
        CrossoverStrategy::new(settings.strategy),
        ledger.clone(),
        LoopConfig::from_settings(&settings),
    );

    if cli.once {
        match trading.poll_once().await? {
            PollOutcome::Traded { trade, .. } => {
                tracing::info!("Placed {} at {:.2}, PnL {:.2}", trade.action, trade.entry_price, trade.pnl)
            }
            PollOutcome::Held(evaluation) => tracing::info!("Holding: {:?}", evaluation),
            PollOutcome::Blocked { trip, .. } => tracing::warn!("Blocked by daily loss limit: {:?}", trip),
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let dashboard_task = if settings.dashboard.enabled && !cli.no_dashboard {
        let state = DashboardState::new(ledger.clone(), settings.instrument.clone());
        let addr = settings.dashboard.bind_address;
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = dashboard::serve(addr, state, wait_for_shutdown(rx)).await {
                tracing::error!("{}", e);
            }
        }))
    } else {
        None
    };

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("⚠️  Received Ctrl+C, shutting down...");
        let _ = shutdown_tx.send(true);
    });

    let summary = trading.run(wait_for_shutdown(shutdown_rx)).await;

    if let Some(task) = dashboard_task {
        if let Err(e) = task.await {
            tracing::error!("Dashboard task failed: {}", e);
        }
    }

    let ledger = ledger.read().await;
    tracing::info!(
        polls = summary.polls,
        failed_polls = summary.failed_polls,
        trades = ledger.len(),
        total_pnl = ledger.total_pnl(),
        "👋 Bot stopped."
    );

    Ok(())
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scalpbot=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_settings(settings: &Settings) {
    tracing::info!("📊 Configuration:");
    tracing::info!("  Instrument: {}", settings.instrument);
    tracing::info!(
        "  SMA windows: {} / {}",
        settings.strategy.short_window,
        settings.strategy.long_window
    );
    tracing::info!(
        "  Take profit: {} pts, Stop loss: {} pts",
        settings.risk.take_profit_points,
        settings.risk.stop_loss_points
    );
    tracing::info!(
        "  Trade size: {} (risk per trade {}% not used for sizing)",
        settings.risk.trade_size,
        settings.risk.risk_percentage
    );
    tracing::info!(
        "  Daily loss limit: {} ({})",
        settings.risk.daily_loss_limit,
        if settings.risk.enforce_daily_loss_limit {
            "enforced"
        } else {
            "not enforced"
        }
    );
    tracing::info!("  Poll interval: {}s", settings.polling_interval_secs);
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    // A dropped sender also means shutdown
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}
