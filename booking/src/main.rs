//! Booking demo.
//!
//! Opens one session against the configured backend, lists the catalog, and
//! exits. Configure with `BOOKING_*` variables or a `.env` file.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use universal_booking::{Filters, SessionManager, WidgetConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "universal_booking=info,booking_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WidgetConfig::from_env().with_auto_show(true);
    info!(
        business_type = %config.business_type,
        api_base_url = %config.api_base_url,
        "Configuration loaded"
    );

    let sessions = SessionManager::with_http_backend(&config).context("building HTTP backend")?;
    info!(supported = ?sessions.supported_business_types(), "Adapters registered");

    let session = sessions.init(config).await.context("creating booking session")?;
    let labels = session.labels().await;

    session.load_catalog(Filters::new()).await?.wait().await;
    let state = session.snapshot().await;

    if let Some(error) = &state.error {
        tracing::warn!(%error, "Catalog could not be loaded");
    } else if state.items.is_empty() {
        println!("{}", labels.empty_list);
    } else {
        println!("{} ({} available)", labels.title, state.items.len());
        if !state.categories.is_empty() {
            let names: Vec<&str> = state.categories.iter().map(|c| c.name.as_str()).collect();
            println!("Categories: {}", names.join(", "));
        }
        for item in &state.items {
            println!("  [{}] {} - {} {}", item.id, item.name, item.price, state.config.currency);
        }
    }

    println!("Current step: {}", session.current_component().await?.as_str());

    session.close().await?;
    sessions.destroy_all().await;
    Ok(())
}
