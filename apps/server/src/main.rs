use anyhow::Context;
use chatvault_backend_runtime::{telemetry, BackendServices};
use chatvault_config::load as load_config;
use chatvault_gateway::{build_router, GatewayState};
use clap::{Parser, Subcommand};
use sqlx::Row;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "chatvault-backend")]
#[command(about = "Chatvault message service (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Dump stored messages from the database
    DumpData,
    /// Delete all stored messages from the database
    ClearData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::DumpData => dump_data().await,
        Commands::ClearData => clear_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Chatvault backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = GatewayState::new(services.db_pool.clone());
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(chatvault_backend_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let messages = sqlx::query(
        r#"
        SELECT message_id, chat_id, content, rating, sent_at, role
        FROM messages
        ORDER BY sent_at, message_id
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch messages")?;

    println!("=== MESSAGES ===");
    if messages.is_empty() {
        println!("No messages found in database");
        return Ok(());
    }

    println!("Found {} messages:", messages.len());
    println!(
        "{:<38} {:<38} {:<50} {:<8} {:<27} {:<6}",
        "Message ID", "Chat ID", "Content (truncated)", "Rating", "Sent At", "Role"
    );
    println!("{}", "-".repeat(170));

    for message in messages {
        let message_id: String = message.get("message_id");
        let chat_id: String = message.get("chat_id");
        let content: String = message.get("content");
        let rating: bool = message.get("rating");
        let sent_at: String = message.get("sent_at");
        let role: String = message.get("role");

        let content_display = if content.chars().count() > 47 {
            let truncated: String = content.chars().take(44).collect();
            format!("{truncated}...")
        } else {
            content
        };

        println!(
            "{:<38} {:<38} {:<50} {:<8} {:<27} {:<6}",
            message_id, chat_id, content_display, rating, sent_at, role
        );
    }

    Ok(())
}

async fn clear_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("clearing all messages from database");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let deleted = sqlx::query("DELETE FROM messages")
        .execute(&services.db_pool)
        .await
        .context("failed to delete messages")?;

    println!("Database cleared: {} messages deleted", deleted.rows_affected());

    Ok(())
}
