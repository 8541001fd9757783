//! CampusSphere entry-point: loads settings, prepares the database, and
//! serves the REST API.

mod server;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campussphere::inbound::http::health::HealthState;
use campussphere::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_args(std::env::args_os())
        .and_then(AppSettings::validate)
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    if settings.run_migrations {
        run_pending_migrations(&settings.database_url)
            .await
            .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    }

    let pool_config =
        PoolConfig::new(settings.database_url.as_str()).with_max_size(settings.db_max_connections);
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;

    let config = ServerConfig::new(
        settings.bind_addr,
        pool,
        settings.jwt_secret,
        settings.token_ttl,
    );
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(make_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting http server");
    let server = create_server(health_state, config)?;
    server.await
}

#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<actix_web_prom::PrometheusMetrics> {
    PrometheusMetricsBuilder::new("campussphere")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("configure Prometheus metrics: {err}")))
}
