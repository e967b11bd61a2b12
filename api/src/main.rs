use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use folio_api::{
    AbstractApiVerifier, AppState, Config, HealthCheck, MessageIntake, SmtpNotifier, SqlxStore,
    config::DatabaseConfig, router,
};
use folio_smtp::{Credentials, SmtpRelay};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio::signal;
use tracing_subscriber::EnvFilter;

const NOTIFICATION_GRACE: Duration = Duration::from_secs(10);

async fn connect(database: &DatabaseConfig) -> Result<sqlx::Pool<sqlx::Postgres>, sqlx::Error> {
    let options = PgConnectOptions::from_str(&database.uri)?.database(&database.name);
    PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let resume_pool = connect(&config.personal_resume_db).await?;
    tracing::info!(database = %config.personal_resume_db.name, "Connected to the resume database");
    let scholars_pool = connect(&config.slot_scholars_db).await?;
    tracing::info!(database = %config.slot_scholars_db.name, "Connected to the slot scholars database");

    sqlx::migrate!("./migrations").run(&resume_pool).await?;

    let store = Arc::new(SqlxStore::new(resume_pool.clone()));
    let verifier = AbstractApiVerifier::new(
        &config.abstract_api_url,
        &config.abstract_api_key,
        config.verifier_timeout,
    )?;
    let mailer = SmtpRelay::new(&config.smtp.host, config.smtp.port)
        .with_tls(config.smtp.tls)
        .with_credentials(Credentials {
            username: config.smtp.user.clone(),
            password: config.smtp.password.clone(),
        })
        .build()?;
    let notifier = SmtpNotifier::new(mailer, &config.smtp.user);
    let intake = Arc::new(MessageIntake::new(
        store.clone(),
        Arc::new(verifier),
        Arc::new(notifier),
        config.cipher.clone(),
    ));

    let databases: Vec<(&'static str, Arc<dyn HealthCheck>)> = vec![
        ("personal_resume", Arc::new(resume_pool.clone())),
        ("slot_scholars", Arc::new(scholars_pool.clone())),
    ];
    let state = AppState {
        store,
        intake: intake.clone(),
        cipher: config.cipher,
        owner_name: config.owner_name,
        port: config.port,
        assets_dir: config.assets_dir,
        databases,
    };

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            tracing::info!("Shutting down server...");
        })
        .await?;

    intake.shutdown(NOTIFICATION_GRACE).await;
    resume_pool.close().await;
    scholars_pool.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}
