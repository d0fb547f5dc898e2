//! services/client/src/app/state.rs
//!
//! Defines the application's shared state: every port the view-state layer
//! talks to, created once at startup and handed to each controller.

use ridetribe_core::ports::{
    AuthService, Confirmer, DestinationService, MatchService, Navigator, NotificationService,
    PlacesService, ScheduleService, Toaster, TokenStore, TribeService,
};
use std::sync::Arc;

use crate::adapters::{
    FixedConfirmer, GooglePlacesAdapter, HttpAuthAdapter, HttpClient, HttpDestinationAdapter,
    HttpMatchAdapter, HttpNotificationAdapter, HttpScheduleAdapter, HttpTribeAdapter, NoPlaces,
    TracingNavigator, TracingToaster,
};
use crate::config::Config;

//=========================================================================================
// AppState (Shared Across All Controllers)
//=========================================================================================

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub tribes: Arc<dyn TribeService>,
    pub destinations: Arc<dyn DestinationService>,
    pub schedules: Arc<dyn ScheduleService>,
    pub matches: Arc<dyn MatchService>,
    pub notifications: Arc<dyn NotificationService>,
    pub places: Arc<dyn PlacesService>,
    pub tokens: Arc<dyn TokenStore>,
    pub toaster: Arc<dyn Toaster>,
    pub navigator: Arc<dyn Navigator>,
    pub confirmer: Arc<dyn Confirmer>,
}

impl AppState {
    /// Wires the REST adapters and headless shell ports from the configuration.
    pub fn from_config(config: &Config, tokens: Arc<dyn TokenStore>) -> Self {
        let http = HttpClient::new(config.api_base_url.clone(), tokens.clone());

        let places: Arc<dyn PlacesService> = match &config.google_maps_api_key {
            Some(key) => Arc::new(GooglePlacesAdapter::new(key.clone())),
            None => Arc::new(NoPlaces),
        };

        Self {
            auth: Arc::new(HttpAuthAdapter::new(http.clone())),
            tribes: Arc::new(HttpTribeAdapter::new(http.clone())),
            destinations: Arc::new(HttpDestinationAdapter::new(http.clone())),
            schedules: Arc::new(HttpScheduleAdapter::new(http.clone())),
            matches: Arc::new(HttpMatchAdapter::new(http.clone())),
            notifications: Arc::new(HttpNotificationAdapter::new(http)),
            places,
            tokens,
            toaster: Arc::new(TracingToaster),
            navigator: Arc::new(TracingNavigator::new()),
            confirmer: Arc::new(FixedConfirmer::new(false)),
        }
    }
}
