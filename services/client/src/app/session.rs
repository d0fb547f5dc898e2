//! services/client/src/app/session.rs
//!
//! The session store: who is signed in, published on a watch channel so the
//! notification poller and route guards can react to changes.

use ridetribe_core::domain::{ProfileUpdate, Route, SignupRequest, User};
use ridetribe_core::ports::{
    AuthService, Navigator, PortError, PortResult, Toast, Toaster, TokenStore,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::forms::{normalize_phone, required, MIN_PASSWORD_LEN};
use super::state::AppState;

const LOGIN_FALLBACK: &str = "Invalid phone number or password.";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// A persisted token is being checked.
    Loading,
    Unauthenticated,
    Authenticated(User),
}

impl SessionStatus {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// What the shell should do with a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session is still resolving; show a loading indicator.
    Wait,
    Redirect(Route),
    Render,
}

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    toaster: Arc<dyn Toaster>,
    status: watch::Sender<SessionStatus>,
}

impl SessionStore {
    pub fn new(
        auth: Arc<dyn AuthService>,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        toaster: Arc<dyn Toaster>,
    ) -> Self {
        let (status, _) = watch::channel(SessionStatus::Loading);
        Self {
            auth,
            tokens,
            navigator,
            toaster,
            status,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.auth.clone(),
            state.tokens.clone(),
            state.navigator.clone(),
            state.toaster.clone(),
        )
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.status.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.status.borrow(), SessionStatus::Authenticated(_))
    }

    fn publish(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }

    //=====================================================================================
    // Session Lifecycle
    //=====================================================================================

    /// Checks a persisted token against the backend on start-up.
    pub async fn restore(&self) -> SessionStatus {
        self.publish(SessionStatus::Loading);

        if self.tokens.load().is_none() {
            self.publish(SessionStatus::Unauthenticated);
            return self.status();
        }

        match self.auth.current_user().await {
            Ok(user) => {
                info!(user_id = %user.id, "Restored session");
                self.publish(SessionStatus::Authenticated(user));
            }
            Err(e) => {
                warn!("Discarding persisted token: {:?}", e);
                self.clear_token();
                self.publish(SessionStatus::Unauthenticated);
            }
        }
        self.status()
    }

    pub async fn login(&self, phone: &str, password: &str) -> PortResult<User> {
        let phone = match normalize_phone(phone).and_then(|p| {
            required(password, "Password")?;
            Ok(p)
        }) {
            Ok(phone) => phone,
            Err(e) => {
                self.toaster.show(Toast::error(e.user_message()));
                return Err(e);
            }
        };

        match self.auth.login(&phone, password).await {
            Ok(grant) => {
                self.tokens.save(&grant.access_token)?;
                info!(user_id = %grant.user.id, "Logged in");
                self.publish(SessionStatus::Authenticated(grant.user.clone()));
                self.toaster.show(Toast::success("Logged in successfully."));
                self.navigator.navigate(Route::Dashboard);
                Ok(grant.user)
            }
            Err(e) => {
                error!("Login failed: {:?}", e);
                if !self.is_authenticated() {
                    self.publish(SessionStatus::Unauthenticated);
                }
                let message = match &e {
                    PortError::Network(_) => e.user_message(),
                    _ => Some(e.user_message())
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| LOGIN_FALLBACK.to_string()),
                };
                self.toaster.show(Toast::error(message));
                Err(e)
            }
        }
    }

    /// Creates an account. The user still has to log in afterwards.
    pub async fn signup(&self, name: &str, phone: &str, password: &str) -> PortResult<User> {
        let request = match validate_signup(name, phone, password) {
            Ok(request) => request,
            Err(e) => {
                self.toaster.show(Toast::error(e.user_message()));
                return Err(e);
            }
        };

        match self.auth.signup(&request).await {
            Ok(user) => {
                info!(user_id = %user.id, "Account created");
                self.toaster.show(Toast::success("Account created. Please log in."));
                self.navigator.navigate(Route::Login);
                Ok(user)
            }
            Err(e) => {
                error!("Signup failed: {:?}", e);
                self.toaster.show(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.end_session("Logged out successfully.");
    }

    fn end_session(&self, message: &str) {
        self.clear_token();
        self.publish(SessionStatus::Unauthenticated);
        self.toaster.show(Toast::success(message));
        self.navigator.navigate(Route::Login);
    }

    fn clear_token(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!("Failed to clear persisted token: {:?}", e);
        }
    }

    //=====================================================================================
    // Account Management
    //=====================================================================================

    pub async fn update_profile(&self, mut update: ProfileUpdate) -> PortResult<User> {
        if !self.is_authenticated() {
            return Err(PortError::Unauthorized("Not logged in".to_string()));
        }
        if let Some(phone) = update.phone.as_deref() {
            match normalize_phone(phone) {
                Ok(phone) => update.phone = Some(phone),
                Err(e) => {
                    self.toaster.show(Toast::error(e.user_message()));
                    return Err(e);
                }
            }
        }

        match self.auth.update_profile(&update).await {
            Ok(user) => {
                self.publish(SessionStatus::Authenticated(user.clone()));
                self.toaster.show(Toast::success("Profile updated."));
                Ok(user)
            }
            Err(e) => {
                error!("Failed to update profile: {:?}", e);
                self.intercept(&e);
                self.toaster.show(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn delete_account(&self) -> PortResult<()> {
        match self.auth.delete_account().await {
            Ok(()) => {
                info!("Account deleted");
                self.end_session("Your account has been deleted.");
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete account: {:?}", e);
                self.intercept(&e);
                self.toaster.show(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    //=====================================================================================
    // Cross-cutting Handling
    //=====================================================================================

    /// Forces a logout when any request reports the token as no longer valid.
    pub fn intercept(&self, err: &PortError) {
        if !err.is_auth_failure() {
            return;
        }
        if matches!(*self.status.borrow(), SessionStatus::Unauthenticated) {
            return;
        }
        warn!("Session rejected by the backend, logging out");
        self.end_session("Your session has expired. Please log in again.");
    }

    pub fn guard(&self, route: Route) -> RouteDecision {
        let status = self.status.borrow();
        match (&*status, route.is_protected()) {
            (SessionStatus::Authenticated(_), false) => RouteDecision::Redirect(Route::Dashboard),
            (_, false) => RouteDecision::Render,
            (SessionStatus::Loading, true) => RouteDecision::Wait,
            (SessionStatus::Unauthenticated, true) => RouteDecision::Redirect(Route::Login),
            (SessionStatus::Authenticated(_), true) => RouteDecision::Render,
        }
    }
}

fn validate_signup(name: &str, phone: &str, password: &str) -> PortResult<SignupRequest> {
    let name = required(name, "Name")?.to_string();
    let phone = normalize_phone(phone)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PortError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(SignupRequest {
        name,
        phone,
        password: password.to_string(),
    })
}
