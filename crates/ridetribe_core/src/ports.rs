//! crates/ridetribe_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the client's core logic.
//! These traits form the boundary of the hexagonal architecture: the view-state
//! layer talks only to them, and the adapters supply the REST backend, token
//! storage, the places provider, and the UI shell behind them.

use async_trait::async_trait;

use crate::domain::{
    AuthGrant, Destination, DestinationDraft, Geo, InviteResponse, MatchStatus, Notification,
    ProfileUpdate, RideMatch, Route, ScheduleDraft, ScheduleEntry, SignupRequest, Tribe,
    TribeMember, TrustLevel, UnknownVariant, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, storage).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Rejected client-side before any request was issued.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// The same action is already running.
    #[error("Action already in progress: {0}")]
    InProgress(String),
}

impl PortError {
    /// True when the failure means the session's token is no longer valid.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, PortError::Unauthorized(_))
    }

    /// The text a toast should show for this error.
    pub fn user_message(&self) -> String {
        match self {
            PortError::NotFound(m)
            | PortError::Unexpected(m)
            | PortError::Unauthorized(m)
            | PortError::Validation(m) => m.clone(),
            PortError::Api { message, .. } => message.clone(),
            PortError::Network(_) => "Could not reach the server. Please try again.".to_string(),
            PortError::InProgress(_) => "Please wait for the current action to finish.".to_string(),
        }
    }
}

impl From<UnknownVariant> for PortError {
    fn from(e: UnknownVariant) -> Self {
        PortError::Unexpected(e.to_string())
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Backend Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, phone: &str, password: &str) -> PortResult<AuthGrant>;

    async fn signup(&self, request: &SignupRequest) -> PortResult<User>;

    /// Resolves the user behind the current bearer token.
    async fn current_user(&self) -> PortResult<User>;

    async fn update_profile(&self, update: &ProfileUpdate) -> PortResult<User>;

    async fn delete_account(&self) -> PortResult<()>;
}

#[async_trait]
pub trait TribeService: Send + Sync {
    async fn list_tribes(&self) -> PortResult<Vec<Tribe>>;

    async fn create_tribe(&self, name: &str) -> PortResult<Tribe>;

    async fn list_members(&self, tribe_id: &str) -> PortResult<Vec<TribeMember>>;

    async fn invite_member(
        &self,
        tribe_id: &str,
        phone: &str,
        trust_level: TrustLevel,
    ) -> PortResult<TribeMember>;

    async fn remove_member(&self, tribe_id: &str, user_id: &str) -> PortResult<()>;

    async fn update_member_trust(
        &self,
        tribe_id: &str,
        user_id: &str,
        trust_level: TrustLevel,
    ) -> PortResult<Option<TribeMember>>;

    async fn respond_to_invite(&self, tribe_id: &str, response: InviteResponse) -> PortResult<()>;
}

#[async_trait]
pub trait DestinationService: Send + Sync {
    async fn list_destinations(&self) -> PortResult<Vec<Destination>>;

    async fn create_destination(&self, draft: &DestinationDraft) -> PortResult<Destination>;

    async fn update_destination(&self, id: &str, draft: &DestinationDraft)
        -> PortResult<Destination>;

    async fn delete_destination(&self, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait ScheduleService: Send + Sync {
    async fn list_schedules(&self) -> PortResult<Vec<ScheduleEntry>>;

    async fn create_schedule(&self, draft: &ScheduleDraft) -> PortResult<ScheduleEntry>;

    async fn update_schedule(&self, id: &str, draft: &ScheduleDraft) -> PortResult<ScheduleEntry>;

    async fn delete_schedule(&self, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait MatchService: Send + Sync {
    async fn list_matches(&self) -> PortResult<Vec<RideMatch>>;

    async fn update_match_status(&self, id: &str, status: MatchStatus) -> PortResult<RideMatch>;

    /// Asks the backend to re-run matching for the user's active trips.
    /// Returns how many trips were queued.
    async fn generate_matches(&self) -> PortResult<u32>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list_notifications(&self) -> PortResult<Vec<Notification>>;

    async fn mark_read(&self, id: &str) -> PortResult<Notification>;
}

//=========================================================================================
// Places Port
//=========================================================================================

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceCandidate {
    pub id: String,
    pub description: String,
}

/// A suggestion resolved into a concrete address and coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub place_id: String,
    pub name: Option<String>,
    pub address: String,
    pub geo: Option<Geo>,
}

#[async_trait]
pub trait PlacesService: Send + Sync {
    async fn search(&self, query: &str) -> PortResult<Vec<PlaceCandidate>>;

    async fn resolve(&self, candidate_id: &str) -> PortResult<ResolvedPlace>;
}

//=========================================================================================
// Local Ports (storage and UI shell)
//=========================================================================================

/// Persistent home of the bearer token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;

    fn save(&self, token: &str) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient, dismissable message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}

pub trait Toaster: Send + Sync {
    fn show(&self, toast: Toast);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Asks the user to confirm a destructive action.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}
