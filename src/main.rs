use domain::connection::RoutingEndpoint;
use domain::gateway::{ManagementApiClient, Transport};
use domain::registry::{DatabaseRegistry, MemoryRegistry, Registry};
use domain::relay::{Relay, RelayOptions};
use log::*;
use migration::{Migrator, MigratorTrait};
use service::config::{Config, DeliveryMode, RegistryBackend};
use service::logging::Logger;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting ws_relay: registry_backend={}, delivery_mode={}",
        config.registry_backend, config.delivery_mode
    );

    let registry = init_registry(&config).await;
    let sockets = Arc::new(socket::Manager::new(
        RoutingEndpoint::new(config.instance_address(), config.stage()),
        config.session_send_queue,
    ));

    if config.registry_backend == RegistryBackend::Postgres
        && config.delivery_mode == DeliveryMode::Local
    {
        warn!(
            "Local delivery only reaches sockets held by {}; connections held by other instances sharing the registry are skipped",
            sockets.endpoint().domain_name
        );
    }

    let transport: Arc<dyn Transport> = match config.delivery_mode {
        DeliveryMode::Local => sockets.clone(),
        DeliveryMode::ManagementApi => {
            match ManagementApiClient::new(config.management_api_scheme(), config.delivery_timeout())
            {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    error!("Failed to build management API client: {e}");
                    std::process::exit(1);
                }
            }
        }
    };

    let relay = Relay::new(registry, transport, RelayOptions::from_config(&config));
    let app_state = web::AppState::new(config, Arc::new(relay), sockets);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}

async fn init_registry(config: &Config) -> Arc<dyn Registry> {
    match config.registry_backend {
        RegistryBackend::Memory => Arc::new(MemoryRegistry::new()),
        RegistryBackend::Postgres => {
            let db = match service::init_database(config).await {
                Ok(db) => db,
                Err(e) => {
                    error!("Failed to establish database connection: {e}");
                    std::process::exit(1);
                }
            };

            if let Err(e) = Migrator::up(&db, None).await {
                error!("Failed to apply migrations: {e}");
                std::process::exit(1);
            }

            Arc::new(DatabaseRegistry::new(Arc::new(db)))
        }
    }
}
