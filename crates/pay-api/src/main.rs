//! # sanctuary-pay
//!
//! Payment initiation and return handling for church sites.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export PAYMENT_API_BASE_URL=https://api.church.example
//! export PAYMENT_API_TOKEN=...
//! export BASE_URL=https://church.example
//!
//! # Run the server
//! sanctuary-pay
//! ```

use pay_api::{routes, AppConfig, AppState, LogFormat};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let (text, json) = match config.log_format {
        LogFormat::Json => (None, Some(fmt::layer().json())),
        LogFormat::Text => (Some(fmt::layer()), None),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();

    print_banner();

    let state = AppState::new(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();
    let payments_path = state.payments_path().to_string();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.gateway.provider_name());
    info!(
        "Defaults: currency={}, purpose={}, method={}, minimum={}",
        state.settings.currency,
        state.settings.purpose,
        state.settings.method,
        state.settings.minimum_amount
    );

    let app = routes::create_router(state);

    info!("⛪ sanctuary-pay starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("💳 Payments page: http://{}{}", addr, payments_path);
        info!("🔎 Status: GET http://{}/api/v1/payments/{{reference}}", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ⛪ sanctuary-pay ⛪
  ━━━━━━━━━━━━━━━━━━━━━━━
  Giving, tithes and offerings
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
