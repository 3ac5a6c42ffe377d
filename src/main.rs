//! Rental Assistance Intake Backend
//!
//! Serves the intake API: application submission with email notifications,
//! the contact form relay, and IP geolocation lookups.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intake_backend::config::Config;
use intake_backend::geo::GeoClient;
use intake_backend::notify::{MailTransport, NotificationDispatcher, SmtpMailer};
use intake_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rental Assistance Intake Backend");
    tracing::info!("Geolocation provider: {}", config.geo_base_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.staff_email.is_none() {
        tracing::warn!(
            "No staff notification address configured (INTAKE_STAFF_EMAIL). Staff copies will be skipped!"
        );
    }

    // Set up mail delivery; an incomplete SMTP configuration disables it
    // without preventing the server from handling requests.
    let transport: Option<Arc<dyn MailTransport>> = match config.smtp() {
        Some(settings) => {
            tracing::info!("SMTP relay: {}:{}", settings.host, settings.port);
            Some(Arc::new(SmtpMailer::new(&settings)?))
        }
        None => {
            tracing::warn!(
                "SMTP not fully configured (INTAKE_SMTP_HOST/USER/PASSWORD). Notification delivery is disabled!"
            );
            None
        }
    };

    let notifier = Arc::new(NotificationDispatcher::new(
        transport,
        config.staff_email.clone(),
    ));
    let geo = Arc::new(GeoClient::new(config.geo_base_url.clone()));

    // Create application state
    let state = AppState { geo, notifier };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
