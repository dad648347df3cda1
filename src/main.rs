use mimalloc::MiMalloc;
use phonebank::{
    HeaderIdentityProvider, IdentityProvider, Phonebank,
    config::CONFIG,
    server::router::{PhonebankState, phonebank_router},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = &*CONFIG;
    cfg.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        identity_header = %cfg.identity.header,
        admins = cfg.identity.admin_emails.len(),
        atomic_claim = cfg.dispatch.atomic_claim
    );
    if cfg.identity.admin_emails.is_empty() {
        tracing::warn!("identity.admin_emails is empty; nobody can reach the admin pages");
    }

    let db = phonebank::db::spawn(&cfg.basic.database_url).await;
    let identity: Arc<dyn IdentityProvider> = Arc::new(HeaderIdentityProvider::new(&cfg.identity)?);
    let phonebank = Phonebank::new(db, identity.clone(), cfg);

    let state = PhonebankState::new(phonebank, identity);
    let app = phonebank_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
