//! Mini POS - storefront cart and simulated checkout service

use anyhow::Result;
use minipos::{http, CartStore, Config, FilePersistence, InMemoryCatalog, TracingInspector};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let persistence = FilePersistence::in_dir(&config.cart_storage_dir);
    tracing::info!(path = %persistence.path().display(), "cart storage");
    let mut cart = CartStore::open(persistence);
    if config.inspect_cart {
        cart = cart.with_inspector(TracingInspector);
    }

    let catalog = match &config.catalog_path {
        Some(path) => InMemoryCatalog::from_json_file(path)?,
        None => InMemoryCatalog::new(),
    };

    let app = http::router(http::AppState::new(cart, catalog));
    let addr = config.socket_addr();
    tracing::info!("Mini POS listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
