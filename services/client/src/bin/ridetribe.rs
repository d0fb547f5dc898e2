//! services/client/src/bin/ridetribe.rs

use client_lib::{
    adapters::FileTokenStore,
    app::{
        AppState, DestinationsController, MatchesController, NotificationCenter,
        NotificationPoller, SchedulesController, SessionStatus, SessionStore, TribesController,
    },
    config::Config,
    error::ClientError,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(api = %config.api_base_url, "Configuration loaded. Starting client...");
    if config.google_maps_api_key.is_none() {
        warn!("GOOGLE_MAPS_API_KEY is not set; address autocomplete is disabled");
    }

    // --- 2. Build the Shared AppState & Session ---
    let tokens = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let state = Arc::new(AppState::from_config(&config, tokens));
    let session = Arc::new(SessionStore::from_state(&state));

    // --- 3. Start Notification Polling ---
    let notifications = Arc::new(NotificationCenter::new(state.clone(), session.clone()));
    let poller = NotificationPoller::spawn(
        notifications.clone(),
        &session,
        config.notification_poll_interval,
    );

    // --- 4. Restore or Establish a Session ---
    if session.restore().await == SessionStatus::Unauthenticated {
        let phone = std::env::var("RIDETRIBE_PHONE").ok();
        let password = std::env::var("RIDETRIBE_PASSWORD").ok();
        match (phone, password) {
            (Some(phone), Some(password)) => {
                session.login(&phone, &password).await?;
            }
            _ => info!("No saved session; set RIDETRIBE_PHONE and RIDETRIBE_PASSWORD to log in"),
        }
    }

    // --- 5. Mount Every Page Once & Summarize ---
    if let Some(user) = session.current_user() {
        let tribes = TribesController::new(state.clone(), session.clone());
        let destinations = DestinationsController::new(state.clone(), session.clone());
        let schedules = SchedulesController::new(state.clone(), session.clone());
        let matches = MatchesController::new(state.clone(), session.clone());

        let (t, d, s, m) = tokio::join!(
            tribes.mount(),
            destinations.mount(),
            schedules.mount(),
            matches.mount(),
        );
        for result in [t, d, s, m] {
            if let Err(e) = result {
                warn!("Failed to load a page: {}", e);
            }
        }
        notifications.poll().await;

        let orphaned = schedules.rows().await.iter().filter(|r| r.orphaned).count();
        info!(
            user = %user.name,
            tribes = tribes.tribes().await.len(),
            destinations = destinations.items().await.len(),
            trips = schedules.items().await.len(),
            orphaned_trips = orphaned,
            matches = matches.items().await.len(),
            unread_notifications = notifications.unread_count().await,
            "Dashboard ready"
        );
    }

    // --- 6. Run Until Interrupted ---
    info!("Press Ctrl-C to exit");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    poller.shutdown().await;

    Ok(())
}
