use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::publication::NotifyOnPublish;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::notifier::TracingNotificationSender;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url).await?;
    run_migrations(&pool).await?;

    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));
    let publication_hook = Arc::new(NotifyOnPublish::new(
        TracingNotificationSender,
        settings.notify_email.clone(),
    ));
    if settings.notify_email.is_none() {
        info!("NOTIFY_EMAIL not set, publish notifications disabled");
    }

    let state = AppState::new(
        pool,
        jwt,
        settings.staff_usernames.clone(),
        publication_hook,
    );

    server::run_http(&settings, state).await
}
