use std::error::Error;

use resty::resty_data_sqlx::{SqlxStore, StoreConfig};
use resty::{init_tracing, RestConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_tracing();

    let config = RestConfig::load("dev")?;
    let store = SqlxStore::connect(&StoreConfig::from_config(&config)?).await?;
    zoo::migrate(&store).await?;

    let port: u16 = config.get_or("server.port", 8080)?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, profile = config.profile(), "zoo listening");

    resty::http::serve(listener, zoo::app(store)?).await?;
    Ok(())
}
