use std::sync::Arc;

use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use outreach::{
    config::{AppConfig, SmsMode},
    db::Database,
    routes,
    sender::{ChannelSender, LogSender, TwilioSender},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_path = %config.database_path,
        sms_mode = ?config.sms_mode,
        "loaded outreach configuration"
    );

    let db = Database::open(&config.database_path)?;
    let sender: Arc<dyn ChannelSender> = match config.sms_mode {
        SmsMode::Log => Arc::new(LogSender),
        SmsMode::Live => Arc::new(TwilioSender::new(
            config.twilio_account_sid.clone().unwrap_or_default(),
            config.twilio_auth_token.clone().unwrap_or_default(),
            config.twilio_from_number.clone().unwrap_or_default(),
        )),
    };

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = AppState::new(db, config, sender);
    let dispatcher = state.dispatcher.clone();
    let router = routes::create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "outreach API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight delivery pipelines finish before the process exits so
    // every accepted recipient still gets its attempt record.
    tracing::info!("draining outstanding deliveries");
    dispatcher.drain().await;

    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        tracing::info!("received shutdown signal");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
