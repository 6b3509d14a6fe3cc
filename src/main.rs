use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use portstore::{Config, Error, JsonFileStore, PortService, Server, api};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store = JsonFileStore::new(&config.data_file);
    store.ensure_exists()?;
    info!(data_file = %config.data_file.display(), "using port store");

    let app = api::routes(Arc::new(PortService::new(Arc::new(store))));

    Server::bind(config.listen_addr()).serve(app).await
}
