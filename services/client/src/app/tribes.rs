//! services/client/src/app/tribes.rs
//!
//! State behind the Tribe page: the user's tribes and, per tribe, its members.

use ridetribe_core::domain::{InviteResponse, Tribe, TribeMember, TrustLevel};
use ridetribe_core::ports::{PortError, PortResult, Toast, TribeService};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use super::forms::{normalize_phone, required};
use super::resource_list::{ActionKey, ResourceList};
use super::session::SessionStore;
use super::state::AppState;

type MemberList = Arc<ResourceList<TribeMember>>;

pub struct TribesController {
    state: Arc<AppState>,
    session: Arc<SessionStore>,
    tribes: ResourceList<Tribe>,
    members: RwLock<HashMap<String, MemberList>>,
}

impl TribesController {
    pub fn new(state: Arc<AppState>, session: Arc<SessionStore>) -> Self {
        let api = state.tribes.clone();
        let tribes = ResourceList::new("tribes", session.clone(), state.toaster.clone(), move || {
            let api = api.clone();
            async move { api.list_tribes().await }
        });
        Self {
            state,
            session,
            tribes,
            members: RwLock::new(HashMap::new()),
        }
    }

    fn member_list(&self, tribe_id: &str) -> MemberList {
        let api: Arc<dyn TribeService> = self.state.tribes.clone();
        let tribe_id = tribe_id.to_string();
        Arc::new(ResourceList::new(
            "tribe members",
            self.session.clone(),
            self.state.toaster.clone(),
            move || {
                let api = api.clone();
                let tribe_id = tribe_id.clone();
                async move { api.list_members(&tribe_id).await }
            },
        ))
    }

    /// Loads the tribes, then each tribe's members one after another.
    pub async fn mount(&self) -> PortResult<()> {
        self.tribes.load().await?;
        self.load_members().await;
        Ok(())
    }

    async fn load_members(&self) {
        let mut loaded = HashMap::new();
        for tribe in self.tribes.items().await {
            let list = self.member_list(&tribe.id);
            if let Err(e) = list.refresh().await {
                warn!("Failed to load members of tribe {}: {:?}", tribe.id, e);
                self.session.intercept(&e);
            }
            loaded.insert(tribe.id, list);
        }
        *self.members.write().await = loaded;
    }

    pub async fn tribes(&self) -> Vec<Tribe> {
        self.tribes.items().await
    }

    pub async fn members(&self, tribe_id: &str) -> Vec<TribeMember> {
        match self.members_of(tribe_id).await {
            Some(list) => list.items().await,
            None => Vec::new(),
        }
    }

    async fn members_of(&self, tribe_id: &str) -> Option<MemberList> {
        self.members.read().await.get(tribe_id).cloned()
    }

    async fn require_members(&self, tribe_id: &str) -> PortResult<MemberList> {
        self.members_of(tribe_id)
            .await
            .ok_or_else(|| PortError::NotFound(format!("Tribe {}", tribe_id)))
    }

    /// True when the signed-in user owns the tribe and may manage its members.
    pub async fn can_manage(&self, tribe_id: &str) -> bool {
        let Some(user) = self.session.current_user() else {
            return false;
        };
        self.tribes
            .get(tribe_id)
            .await
            .is_some_and(|t| t.is_owned_by(&user.id))
    }

    //=====================================================================================
    // Writes
    //=====================================================================================

    pub async fn create_tribe(&self, name: &str) -> PortResult<Tribe> {
        let name = match required(name, "Tribe name") {
            Ok(name) => name.to_string(),
            Err(e) => {
                self.state.toaster.show(Toast::error(e.user_message()));
                return Err(e);
            }
        };
        let api = self.state.tribes.clone();
        let tribe = self
            .tribes
            .refetch(
                ActionKey::global("create-tribe"),
                async { api.create_tribe(&name).await },
                "Tribe created.",
            )
            .await?;
        self.load_members().await;
        Ok(tribe)
    }

    pub async fn invite(
        &self,
        tribe_id: &str,
        phone: &str,
        trust_level: TrustLevel,
    ) -> PortResult<TribeMember> {
        let phone = match normalize_phone(phone) {
            Ok(phone) => phone,
            Err(e) => {
                self.state.toaster.show(Toast::error(e.user_message()));
                return Err(e);
            }
        };
        let members = self.require_members(tribe_id).await?;
        let api = self.state.tribes.clone();
        let member = members
            .run(
                ActionKey::new("invite", tribe_id),
                async { api.invite_member(tribe_id, &phone, trust_level).await },
                Some("Invite sent."),
            )
            .await?;
        members.upsert(member.clone()).await;
        Ok(member)
    }

    pub async fn remove_member(&self, tribe_id: &str, user_id: &str) -> PortResult<bool> {
        if !self
            .state
            .confirmer
            .confirm("Are you sure you want to remove this member from the tribe?")
        {
            return Ok(false);
        }
        let members = self.require_members(tribe_id).await?;
        let api = self.state.tribes.clone();
        members
            .optimistic_remove(
                ActionKey::new("remove-member", &format!("{}/{}", tribe_id, user_id)),
                user_id,
                async { api.remove_member(tribe_id, user_id).await },
                Some("Member removed."),
            )
            .await?;
        Ok(true)
    }

    pub async fn change_trust(
        &self,
        tribe_id: &str,
        user_id: &str,
        trust_level: TrustLevel,
    ) -> PortResult<()> {
        let members = self.require_members(tribe_id).await?;
        let api = self.state.tribes.clone();
        let echoed = members
            .optimistic(
                ActionKey::new("trust", &format!("{}/{}", tribe_id, user_id)),
                user_id,
                |m| m.trust_level = trust_level,
                async { api.update_member_trust(tribe_id, user_id, trust_level).await },
                Some("Trust level updated."),
            )
            .await?;
        if let Some(member) = echoed {
            members.upsert(member).await;
        }
        Ok(())
    }

    /// Accepts or declines an invite to `tribe_id`.
    pub async fn respond_to_invite(
        &self,
        tribe_id: &str,
        response: InviteResponse,
    ) -> PortResult<()> {
        let api = self.state.tribes.clone();
        let message = match response {
            InviteResponse::Accept => "Invite accepted.",
            InviteResponse::Decline => "Invite declined.",
        };
        self.tribes
            .refetch(
                ActionKey::new("respond", tribe_id),
                async { api.respond_to_invite(tribe_id, response).await },
                message,
            )
            .await?;
        self.load_members().await;
        Ok(())
    }
}
