//! services/client/src/app/notifications.rs
//!
//! The notification feed and the background task that keeps it fresh while
//! a user is signed in.

use ridetribe_core::domain::{InviteResponse, Notification};
use ridetribe_core::ports::{PortError, PortResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::resource_list::{ActionKey, ResourceList};
use super::session::{SessionStatus, SessionStore};
use super::state::AppState;

//=========================================================================================
// Notification Center
//=========================================================================================

pub struct NotificationCenter {
    state: Arc<AppState>,
    session: Arc<SessionStore>,
    list: ResourceList<Notification>,
}

impl NotificationCenter {
    pub fn new(state: Arc<AppState>, session: Arc<SessionStore>) -> Self {
        let api = state.notifications.clone();
        let toaster = state.toaster.clone();
        let list = ResourceList::new("notifications", session.clone(), toaster, move || {
            let api = api.clone();
            async move { api.list_notifications().await }
        });
        Self {
            state,
            session,
            list,
        }
    }

    pub async fn items(&self) -> Vec<Notification> {
        self.list.items().await
    }

    pub async fn unread_count(&self) -> usize {
        self.list.items().await.iter().filter(|n| !n.is_read).count()
    }

    pub async fn load(&self) -> PortResult<()> {
        self.list.load().await
    }

    /// One background refresh. Failures are logged, never toasted.
    pub async fn poll(&self) {
        if let Err(e) = self.list.refresh().await {
            warn!("Notification poll failed: {:?}", e);
            self.session.intercept(&e);
        }
    }

    pub async fn clear(&self) {
        self.list.clear().await;
    }

    pub async fn mark_read(&self, id: &str) -> PortResult<()> {
        let Some(notification) = self.list.get(id).await else {
            return Err(PortError::NotFound(format!("Notification {}", id)));
        };
        if notification.is_read {
            return Ok(());
        }
        let api = self.state.notifications.clone();
        self.list
            .optimistic(
                ActionKey::new("mark-read", id),
                id,
                |n| n.is_read = true,
                async { api.mark_read(id).await },
                None,
            )
            .await?;
        Ok(())
    }

    /// Answers the tribe invite a notification points at, then marks it read.
    pub async fn respond_to_invite(&self, id: &str, response: InviteResponse) -> PortResult<()> {
        let notification = self
            .list
            .get(id)
            .await
            .ok_or_else(|| PortError::NotFound(format!("Notification {}", id)))?;
        let tribe_id = match (&notification.related_id, notification.has_invite_action()) {
            (Some(tribe_id), true) => tribe_id.clone(),
            _ => {
                return Err(PortError::Validation(
                    "This notification is not an invite".to_string(),
                ))
            }
        };

        let api = self.state.tribes.clone();
        let message = match response {
            InviteResponse::Accept => "Invite accepted.",
            InviteResponse::Decline => "Invite declined.",
        };
        self.list
            .run(
                ActionKey::new("invite-response", id),
                async { api.respond_to_invite(&tribe_id, response).await },
                Some(message),
            )
            .await?;
        self.mark_read(id).await
    }
}

//=========================================================================================
// Background Poller
//=========================================================================================

pub struct NotificationPoller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl NotificationPoller {
    /// Starts polling whenever the session is authenticated.
    pub fn spawn(
        center: Arc<NotificationCenter>,
        session: &SessionStore,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_poller(center, session.subscribe(), period, cancel.clone()));
        Self { cancel, handle }
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            error!("Notification poller ended abnormally: {:?}", e);
        }
    }
}

fn is_authenticated(status: &SessionStatus) -> bool {
    matches!(status, SessionStatus::Authenticated(_))
}

async fn run_poller(
    center: Arc<NotificationCenter>,
    mut status: watch::Receiver<SessionStatus>,
    period: Duration,
    cancel: CancellationToken,
) {
    loop {
        // Idle until someone signs in.
        loop {
            let signed_in = is_authenticated(&status.borrow_and_update());
            if signed_in {
                break;
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = status.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        info!(period_secs = period.as_secs(), "Notification polling started");
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                changed = status.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let signed_in = is_authenticated(&status.borrow_and_update());
                    if !signed_in {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    debug!("Polling notifications");
                    center.poll().await;
                }
            }
        }

        center.clear().await;
        info!("Notification polling stopped");
    }
}
