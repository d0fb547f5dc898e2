//! services/client/src/app/matches.rs
//!
//! State behind the Matches page: suggested pairings and the user's answers.

use ridetribe_core::domain::{MatchDecision, RideMatch};
use ridetribe_core::ports::{PortError, PortResult, Toast};
use std::sync::Arc;
use tracing::info;

use super::resource_list::{ActionKey, ResourceList};
use super::session::SessionStore;
use super::state::AppState;
use super::viewport::Viewport;

pub struct MatchesController {
    state: Arc<AppState>,
    list: ResourceList<RideMatch>,
}

impl MatchesController {
    pub fn new(state: Arc<AppState>, session: Arc<SessionStore>) -> Self {
        let api = state.matches.clone();
        let list = ResourceList::new("matches", session, state.toaster.clone(), move || {
            let api = api.clone();
            async move { api.list_matches().await }
        });
        Self { state, list }
    }

    pub async fn mount(&self) -> PortResult<()> {
        self.list.load().await
    }

    pub async fn items(&self) -> Vec<RideMatch> {
        self.list.items().await
    }

    /// Accept and decline are only offered for suggestions.
    pub async fn available_actions(&self, id: &str) -> Vec<MatchDecision> {
        match self.list.get(id).await {
            Some(m) if m.status.can_respond() => {
                vec![MatchDecision::Accept, MatchDecision::Decline]
            }
            _ => Vec::new(),
        }
    }

    pub async fn respond(&self, id: &str, decision: MatchDecision) -> PortResult<RideMatch> {
        let current = self
            .list
            .get(id)
            .await
            .ok_or_else(|| PortError::NotFound(format!("Match {}", id)))?;
        if !current.status.can_respond() {
            let e = PortError::Validation(format!("This match is already {}", current.status));
            self.state.toaster.show(Toast::error(e.user_message()));
            return Err(e);
        }

        let target = decision.target_status();
        let api = self.state.matches.clone();
        let message = match decision {
            MatchDecision::Accept => "Ride accepted.",
            MatchDecision::Decline => "Ride declined.",
        };
        let updated = self
            .list
            .optimistic(
                ActionKey::new("respond", id),
                id,
                |m| m.status = target,
                async { api.update_match_status(id, target).await },
                Some(message),
            )
            .await?;
        self.list.upsert(updated.clone()).await;
        Ok(updated)
    }

    /// Asks the backend to re-run matching, then reloads the list.
    pub async fn generate(&self) -> PortResult<u32> {
        let api = self.state.matches.clone();
        let queued = self
            .list
            .refetch(
                ActionKey::global("generate-matches"),
                async { api.generate_matches().await },
                "Looking for new matches.",
            )
            .await?;
        info!(queued, "Match generation requested");
        Ok(queued)
    }

    /// Frames the destinations of every match that has one.
    pub async fn viewport(&self) -> Option<Viewport> {
        Viewport::fit(self.list.items().await.into_iter().filter_map(|m| {
            m.schedule
                .and_then(|s| s.destination)
                .and_then(|d| d.geo)
        }))
    }
}
