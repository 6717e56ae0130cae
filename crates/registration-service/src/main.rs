//! Registration Service - Entry point.

use anyhow::{bail, Context, Result};
use identity_client::HttpIdentityClient;
use registration_service::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::Config,
    RegistrationCoordinator, SessionTable,
};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use user_store::{Store, UserStore};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn open_store(config: &Config) -> Result<Store> {
    if !config.store.persist {
        info!("Persistence disabled, using in-memory user store");
        return Ok(Store::memory());
    }

    let Some(passphrase) = config.store.passphrase.as_ref() else {
        bail!("STORE__PASSPHRASE is required when persistence is enabled");
    };

    let store = Store::encrypted(config.store.path.clone(), passphrase)
        .await
        .with_context(|| format!("Failed to open user store at {}", config.store.path.display()))?;

    info!(
        "Loaded user store with {} records from {}",
        store.count().await,
        config.store.path.display()
    );
    Ok(store)
}

async fn run(config: Config) -> Result<()> {
    info!("Starting Registration Service");

    let store: Arc<dyn UserStore> = Arc::new(open_store(&config).await?);

    let provider = HttpIdentityClient::new(
        config.identity.base_url.clone(),
        config.identity.api_key.expose_secret().clone(),
        config.identity.timeout,
    )
    .context("Failed to create identity client")?;

    let coordinator = RegistrationCoordinator::new(
        Arc::new(provider),
        store.clone(),
        config.registration.country_code.clone(),
        config.registration.request_timeout,
    );
    let sessions = SessionTable::new(config.registration.session_ttl);

    let state = AppState::new(coordinator, sessions, store);
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);
    let app = create_router_with_rate_limit(state, rate_limit);

    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server error")
}
