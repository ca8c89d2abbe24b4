// Clipper CLI - operations tool for the Clipper payment service

use clap::{Parser, Subcommand};
use colored::Colorize;
use uuid::Uuid;

use clipper_midtrans::GatewayClient;
use clipper_server::models::PaymentStatus;
use clipper_server::pricing::PriceTable;
use clipper_server::reconcile::{normalize_raw_status, sync_user_payments};
use clipper_server::{create_router, db, AppConfig, AppState};

/// Clipper - billing server and payment reconciliation tool
#[derive(Parser)]
#[command(name = "clipper")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server (applies pending migrations first)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Reconcile a user's open payments against the gateway
    Sync {
        /// User whose payments to reconcile
        user_id: Uuid,
    },
    /// Query the gateway for an order's status
    Status {
        /// Order identifier to look up
        order_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve => handle_serve().await,
        Commands::Migrate => handle_migrate().await,
        Commands::Sync { user_id } => handle_sync(user_id).await,
        Commands::Status { order_id } => handle_status(&order_id).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn handle_serve() -> anyhow::Result<()> {
    clipper_server::init_tracing();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let gateway = GatewayClient::new(config.gateway.clone())?;
    let state = AppState::new(
        pool,
        gateway,
        PriceTable::default(),
        config.public_base_url.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}

async fn handle_migrate() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    println!("Migrations applied");
    Ok(())
}

async fn handle_sync(user_id: Uuid) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let gateway = GatewayClient::new(config.gateway)?;

    let report = sync_user_payments(&pool, &gateway, user_id).await?;
    println!(
        "Examined {} payment(s): {} updated, {} credited, {} unchanged, {} failed",
        report.examined, report.updated, report.credited, report.unchanged, report.failed
    );

    Ok(())
}

async fn handle_status(order_id: &str) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let gateway = GatewayClient::new(config.gateway)?;

    let response = gateway.transaction_status(order_id).await?;
    let normalized =
        normalize_raw_status(&response.transaction_status, response.fraud_status.as_deref())?;

    println!("Order:      {}", order_id);
    match &response.fraud_status {
        Some(fraud) => println!(
            "Gateway:    {} (fraud: {})",
            response.transaction_status, fraud
        ),
        None => println!("Gateway:    {}", response.transaction_status),
    }
    println!("Normalized: {}", colorize_status(normalized));

    Ok(())
}

fn colorize_status(status: PaymentStatus) -> colored::ColoredString {
    match status {
        PaymentStatus::Paid => status.as_str().green(),
        PaymentStatus::Pending => status.as_str().yellow(),
        PaymentStatus::Failed => status.as_str().red(),
        PaymentStatus::Expired => status.as_str().dimmed(),
    }
}
