use domain::oauth_token_storage::DbTokenStorage;
use domain::{MemoryStorage, OAuthRelay, Storage};
use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use service::config::{Config, TokenStoreKind};
use service::logging::Logger;
use std::sync::Arc;
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!("Starting up OAuth relay [{}]...", config.runtime_env());

    let store: Arc<dyn Storage> = match config.token_store {
        TokenStoreKind::Postgres => {
            let db = match service::init_database(&config).await {
                Ok(db) => Arc::new(db),
                Err(e) => {
                    error!("Failed to establish database connection: {e}");
                    std::process::exit(1);
                }
            };

            if let Err(e) = Migrator::up(db.as_ref(), None).await {
                error!("Failed to run database migrations: {e}");
                std::process::exit(1);
            }

            match DbTokenStorage::from_config(&config, db) {
                Ok(storage) => Arc::new(storage),
                Err(e) => {
                    error!("Invalid token storage configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
        TokenStoreKind::Memory => {
            warn!("Using in-memory token store; tokens will not survive a restart");
            Arc::new(MemoryStorage::new())
        }
    };

    let relay = match OAuthRelay::from_config(&config, store) {
        Ok(relay) => Arc::new(relay),
        Err(e) => {
            error!("Invalid OAuth configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(AppState::new(config, relay)).await {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}
