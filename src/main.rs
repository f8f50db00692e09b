use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use orderdesk::models::open_symbols;
use orderdesk::snapshot::{load_orders, load_positions, load_stop_loss};
use orderdesk::stoploss::{spawn_reconciler, spawn_refresher, TokioClock, TracingObserver};
use orderdesk::synthetic::SyntheticDeskGenerator;
use orderdesk::{DeskConfig, PendingOrdersView, StopLossReconciler};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

/// Pending order consolidation and adaptive stop-loss desk
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); ORDERDESK_* env vars override it
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render saved API snapshots
    View {
        /// Pending orders JSON (array)
        #[arg(long)]
        orders: PathBuf,
        /// Adaptive stop-loss JSON ({exists, records} or array)
        #[arg(long)]
        stop_loss: Option<PathBuf>,
        /// Positions JSON (array); OPEN positions drive stop-loss filtering
        #[arg(long)]
        positions: Option<PathBuf>,
        /// Print the view model as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run a synthetic session through the grouper and the debounced reconciler
    Demo {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of generated orders
        #[arg(long, default_value_t = 24)]
        orders: usize,
        /// Number of symbols the orders are spread over
        #[arg(long, default_value_t = 5)]
        symbols: usize,
        /// Position changes to fire in a burst, 100ms apart
        #[arg(long, default_value_t = 4)]
        changes: usize,
        /// Stop-loss refreshes to wait for afterwards (refresh_interval_secs apart)
        #[arg(long, default_value_t = 0)]
        refreshes: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = DeskConfig::load(cli.config.as_deref()).context("loading configuration")?;
    setup_logging(&cfg.log_filter);

    match cli.command {
        Commands::View {
            orders,
            stop_loss,
            positions,
            json,
        } => run_view(&cfg, orders, stop_loss, positions, json),
        Commands::Demo {
            seed,
            orders,
            symbols,
            changes,
            refreshes,
        } => run_demo(&cfg, seed, orders, symbols, changes, refreshes).await,
    }
}

fn setup_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_view(
    cfg: &DeskConfig,
    orders_path: PathBuf,
    stop_loss_path: Option<PathBuf>,
    positions_path: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let orders = load_orders(&orders_path)
        .with_context(|| format!("loading orders from {}", orders_path.display()))?;

    let records = match &stop_loss_path {
        Some(path) => load_stop_loss(path)
            .with_context(|| format!("loading stop-loss state from {}", path.display()))?,
        None => Vec::new(),
    };

    let symbols = match &positions_path {
        Some(path) => open_symbols(
            &load_positions(path)
                .with_context(|| format!("loading positions from {}", path.display()))?,
        ),
        None => HashSet::new(),
    };

    let mut reconciler = StopLossReconciler::with_parts(
        cfg.trader_id.clone(),
        cfg.debounce(),
        TokioClock,
        TracingObserver::new(cfg.trader_id.clone()),
    );
    let visible = reconciler.reconcile(&records, &symbols);

    let view = PendingOrdersView::build(&orders, &visible, Utc::now());

    tracing::info!(
        trader_id = %cfg.trader_id,
        orders = orders.len(),
        symbols = view.symbol_count,
        duplicates = view.duplicate_symbols,
        stop_loss = visible.len(),
        "Built pending orders view"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.render_table());
    }

    Ok(())
}

async fn run_demo(
    cfg: &DeskConfig,
    seed: u64,
    order_count: usize,
    symbol_count: usize,
    changes: usize,
    refreshes: usize,
) -> anyhow::Result<()> {
    tracing::info!("🚀 Synthetic desk session (seed {})", seed);

    let now = Utc::now();
    let mut generator = SyntheticDeskGenerator::new(seed, cfg.trader_id.clone());
    let universe: Vec<&'static str> = SyntheticDeskGenerator::universe()
        .take(symbol_count.max(1))
        .collect();

    let orders = generator.orders(order_count, universe.len(), now);
    let records = generator.stop_loss_records(&universe);
    let positions = generator.positions(&universe);

    let (symbols_tx, symbols_rx) = watch::channel(open_symbols(&positions));
    let (records_tx, records_rx) = watch::channel(records);

    let reconciler = StopLossReconciler::with_parts(
        cfg.trader_id.clone(),
        cfg.debounce(),
        TokioClock,
        TracingObserver::new(cfg.trader_id.clone()),
    );
    let handle = spawn_reconciler(reconciler, symbols_rx, records_rx);
    let mut output = handle.output();

    // Periodic re-fetch of the adaptive stop-loss state
    let mut refresh_source =
        SyntheticDeskGenerator::new(seed.wrapping_add(1), cfg.trader_id.clone());
    let refresh_universe = universe.clone();
    let refresher = spawn_refresher(cfg.refresh_interval(), records_tx, move || {
        refresh_source.stop_loss_records(&refresh_universe)
    });

    let view = PendingOrdersView::build(&orders, &output.borrow_and_update(), now);
    print!("{}", view.render_table());

    // Burst of position changes; only the last one should be reconciled
    for i in 0..changes {
        let positions = generator.positions(&universe);
        let symbols = open_symbols(&positions);
        tracing::info!(change = i + 1, open = symbols.len(), "Positions changed");
        symbols_tx.send(symbols)?;
        sleep(Duration::from_millis(100)).await;
    }

    let settle = cfg.debounce() + Duration::from_millis(100);
    match tokio::time::timeout(settle, output.changed()).await {
        Ok(Ok(())) => {
            let visible = output.borrow_and_update().clone();
            let mut shown: Vec<&str> = visible.iter().map(|r| r.symbol.as_str()).collect();
            shown.sort_unstable();
            println!();
            println!("Stop-loss after debounce: {}", shown.join(", "));
        }
        Ok(Err(_)) => anyhow::bail!("reconciler stopped unexpectedly"),
        Err(_) => println!("\nNo stop-loss recompute needed (open symbols unchanged)"),
    }

    for n in 1..=refreshes {
        output
            .changed()
            .await
            .context("reconciler stopped while waiting for a refresh")?;
        let visible = output.borrow_and_update().clone();
        let view = PendingOrdersView::build(&orders, &visible, Utc::now());
        println!();
        println!("Refresh {} ({}s interval)", n, cfg.refresh_interval().as_secs());
        print!("{}", view.render_table());
    }

    refresher.abort();
    handle.shutdown().await;
    Ok(())
}
