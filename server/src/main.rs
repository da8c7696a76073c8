//! Pharmacy backend HTTP server.
//!
//! Wires PostgreSQL, Redis, and the mail relay into the auth service and
//! serves its router.

mod config;
mod mailer;

use anyhow::Context;
use axum::{Router, routing::get};
use config::Config;
use mailer::Mailer;
use pharmacy_auth::providers::{
    BcryptPasswordHasher, ConsoleEmailProvider, SmtpEmailProvider, SystemClock,
};
use pharmacy_auth::stores::{PostgresMemberRepository, RedisTokenStore};
use pharmacy_auth::{AuthConfig, AuthEnvironment, AuthService, auth_router};
use pharmacy_web::handlers::health_check;
use pharmacy_web::middleware::correlation_id_layers;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pharmacy_server=info,pharmacy_auth=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pharmacy server");

    let config = Config::from_env()?;
    info!(?config, "Configuration loaded");

    // PostgreSQL
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let members = PostgresMemberRepository::new(pool);
    members.migrate().await?;
    info!("Database ready");

    // Redis
    info!("Connecting to Redis...");
    let tokens = RedisTokenStore::new(&config.redis_url).await?;

    // Mail
    let email = match &config.smtp {
        Some(smtp) => Mailer::Smtp(SmtpEmailProvider::new(
            smtp.host.clone(),
            smtp.port,
            smtp.user.clone(),
            smtp.password.clone(),
            smtp.user.clone(),
            smtp.from_name.clone(),
        )),
        None => {
            warn!("SMTP_HOST not set; emails will be logged to the console");
            Mailer::Console(ConsoleEmailProvider::new())
        }
    };

    let env = AuthEnvironment::new(
        members,
        tokens,
        email,
        BcryptPasswordHasher::new(config.auth.bcrypt_cost),
        Arc::new(SystemClock),
    );
    let auth_config = AuthConfig::new(
        config.auth.base_url.clone(),
        config.auth.jwt_secret.clone(),
    );
    let service = AuthService::new(env, auth_config);

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(auth_router(service))
        .layer(correlation_id_layers());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
