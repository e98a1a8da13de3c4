use domain::relay::Relay;
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;

pub mod controller;
pub(crate) mod params;
mod router;
pub mod ws;

pub use router::define_routes;

/// Shared handles for every request and socket.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay: Arc<Relay>,
    pub sockets: Arc<socket::Manager>,
}

impl AppState {
    pub fn new(config: Config, relay: Arc<Relay>, sockets: Arc<socket::Manager>) -> Self {
        Self {
            config,
            relay,
            sockets,
        }
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state.config.interface.as_deref().unwrap_or("127.0.0.1");
    let host = format!("{interface}:{}", app_state.config.port);

    let listener = TcpListener::bind(&host).await?;
    info!("Server starting... listening for connections on http://{host}");

    let router = define_routes(app_state);
    axum::serve(listener, router).await
}

#[cfg(test)]
mod testing;
