//! services/client/src/app/fakes.rs
//!
//! In-memory implementations of every port, for controller tests.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use ridetribe_core::domain::{
    AuthGrant, Destination, DestinationCategory, DestinationDraft, Geo, InviteResponse,
    MatchStatus, MembershipStatus, Notification, NotificationKind, ProfileUpdate, Recurrence,
    RideMatch, Route, ScheduleDraft, ScheduleEntry, ScheduleStatus, SignupRequest, Tribe,
    TribeMember, TrustLevel, User,
};
use ridetribe_core::ports::{
    AuthService, Confirmer, DestinationService, MatchService, Navigator, NotificationService,
    PlaceCandidate, PlacesService, PortError, PortResult, ResolvedPlace, ScheduleService, Toast,
    Toaster, TokenStore, TribeService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::session::SessionStore;
use super::state::AppState;
use crate::adapters::MemoryTokenStore;

//=========================================================================================
// Fixtures
//=========================================================================================

pub fn user(id: &str, name: &str, phone: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        email: None,
        created_at: None,
    }
}

pub fn destination(id: &str, name: &str) -> Destination {
    Destination {
        id: id.to_string(),
        name: name.to_string(),
        address: format!("{} Main St", id),
        google_place_id: None,
        geo: None,
        category: Some(DestinationCategory::School),
        created_by: Some("u1".to_string()),
    }
}

pub fn schedule(id: &str, child: &str, destination_id: &str) -> ScheduleEntry {
    let pickup = FixedOffset::east_opt(0)
        .and_then(|tz| tz.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).single());
    ScheduleEntry {
        id: id.to_string(),
        user_id: "u1".to_string(),
        child_name: child.to_string(),
        destination_id: destination_id.to_string(),
        destination: None,
        pickup_time: pickup,
        dropoff_time: pickup,
        recurrence: Recurrence::Weekly,
        status: ScheduleStatus::Active,
    }
}

pub fn tribe(id: &str, name: &str, owner_id: &str) -> Tribe {
    Tribe {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: name.to_string(),
        member_count: 0,
        created_at: None,
        membership_status: None,
    }
}

pub fn member(user_id: &str, name: &str) -> TribeMember {
    TribeMember {
        user: user(user_id, name, "5550000000"),
        trust_level: TrustLevel::Direct,
        status: MembershipStatus::Accepted,
        joined_at: None,
    }
}

pub fn ride_match(id: &str, status: MatchStatus) -> RideMatch {
    RideMatch {
        id: id.to_string(),
        requester_id: "u1".to_string(),
        provider_id: "u2".to_string(),
        schedule_entry_id: "s1".to_string(),
        provider_schedule_id: None,
        match_score: 80,
        status,
        requester: None,
        provider: None,
        schedule: None,
    }
}

pub fn notification(id: &str, kind: NotificationKind, related_id: Option<&str>) -> Notification {
    Notification {
        id: id.to_string(),
        user_id: "u1".to_string(),
        kind,
        message: format!("{} happened", kind),
        related_id: related_id.map(str::to_string),
        is_read: false,
        created_at: Utc::now(),
    }
}

//=========================================================================================
// Fake Backend
//=========================================================================================

#[derive(Default)]
struct Data {
    users: Vec<(User, String)>,
    tribes: Vec<Tribe>,
    members: HashMap<String, Vec<TribeMember>>,
    destinations: Vec<Destination>,
    schedules: Vec<ScheduleEntry>,
    matches: Vec<RideMatch>,
    notifications: Vec<Notification>,
    invite_responses: Vec<(String, InviteResponse)>,
    next_id: u32,
}

impl Data {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

/// Every backend service over one in-memory data set. Tokens are checked
/// against the shared token store, the way the HTTP adapters send them.
pub struct FakeBackend {
    tokens: Arc<dyn TokenStore>,
    data: Mutex<Data>,
    failures: Mutex<HashMap<&'static str, PortError>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeBackend {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            tokens,
            data: Mutex::new(Data::default()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Makes the next call to `op` fail with `err`.
    pub fn fail_next(&self, op: &'static str, err: PortError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    fn enter(&self, op: &'static str) -> PortResult<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        match self.failures.lock().unwrap().remove(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn authed(&self, op: &'static str) -> PortResult<User> {
        self.enter(op)?;
        let token = self.tokens.load();
        self.data
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|(u, _)| token.as_deref() == Some(format!("token-{}", u.id).as_str()))
            .map(|(u, _)| u.clone())
            .ok_or_else(|| PortError::Unauthorized("Could not validate credentials".to_string()))
    }

    pub fn add_user(&self, id: &str, name: &str, phone: &str, password: &str) {
        self.data
            .lock()
            .unwrap()
            .users
            .push((user(id, name, phone), password.to_string()));
    }

    pub fn seed_tribes(&self, tribes: Vec<Tribe>) {
        self.data.lock().unwrap().tribes = tribes;
    }

    pub fn seed_members(&self, tribe_id: &str, members: Vec<TribeMember>) {
        self.data
            .lock()
            .unwrap()
            .members
            .insert(tribe_id.to_string(), members);
    }

    pub fn seed_destinations(&self, destinations: Vec<Destination>) {
        self.data.lock().unwrap().destinations = destinations;
    }

    pub fn seed_schedules(&self, schedules: Vec<ScheduleEntry>) {
        self.data.lock().unwrap().schedules = schedules;
    }

    pub fn seed_matches(&self, matches: Vec<RideMatch>) {
        self.data.lock().unwrap().matches = matches;
    }

    pub fn seed_notifications(&self, notifications: Vec<Notification>) {
        self.data.lock().unwrap().notifications = notifications;
    }

    pub fn invite_responses(&self) -> Vec<(String, InviteResponse)> {
        self.data.lock().unwrap().invite_responses.clone()
    }
}

fn not_found(what: &str, id: &str) -> PortError {
    PortError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn login(&self, phone: &str, password: &str) -> PortResult<AuthGrant> {
        self.enter("login")?;
        let data = self.data.lock().unwrap();
        let (user, _) = data
            .users
            .iter()
            .find(|(u, p)| u.phone == phone && p == password)
            .ok_or_else(|| {
                PortError::Unauthorized("Invalid phone number or password".to_string())
            })?;
        Ok(AuthGrant {
            access_token: format!("token-{}", user.id),
            token_type: "bearer".to_string(),
            user: user.clone(),
        })
    }

    async fn signup(&self, request: &SignupRequest) -> PortResult<User> {
        self.enter("signup")?;
        let mut data = self.data.lock().unwrap();
        if data.users.iter().any(|(u, _)| u.phone == request.phone) {
            return Err(PortError::Api {
                status: 400,
                message: "Phone number already registered".to_string(),
            });
        }
        let id = data.next_id("u");
        let created = user(&id, &request.name, &request.phone);
        data.users.push((created.clone(), request.password.clone()));
        Ok(created)
    }

    async fn current_user(&self) -> PortResult<User> {
        self.authed("current_user")
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> PortResult<User> {
        let me = self.authed("update_profile")?;
        let mut data = self.data.lock().unwrap();
        let (stored, _) = data
            .users
            .iter_mut()
            .find(|(u, _)| u.id == me.id)
            .ok_or_else(|| not_found("User", &me.id))?;
        if let Some(name) = &update.name {
            stored.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            stored.phone = phone.clone();
        }
        if update.email.is_some() {
            stored.email = update.email.clone();
        }
        Ok(stored.clone())
    }

    async fn delete_account(&self) -> PortResult<()> {
        let me = self.authed("delete_account")?;
        self.data.lock().unwrap().users.retain(|(u, _)| u.id != me.id);
        Ok(())
    }
}

#[async_trait]
impl TribeService for FakeBackend {
    async fn list_tribes(&self) -> PortResult<Vec<Tribe>> {
        self.enter("list_tribes")?;
        Ok(self.data.lock().unwrap().tribes.clone())
    }

    async fn create_tribe(&self, name: &str) -> PortResult<Tribe> {
        self.enter("create_tribe")?;
        let mut data = self.data.lock().unwrap();
        let id = data.next_id("t");
        let created = tribe(&id, name, "u1");
        data.tribes.push(created.clone());
        Ok(created)
    }

    async fn list_members(&self, tribe_id: &str) -> PortResult<Vec<TribeMember>> {
        self.enter("list_members")?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .members
            .get(tribe_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn invite_member(
        &self,
        tribe_id: &str,
        phone: &str,
        trust_level: TrustLevel,
    ) -> PortResult<TribeMember> {
        self.enter("invite_member")?;
        let mut data = self.data.lock().unwrap();
        let id = data.next_id("u");
        let invited = TribeMember {
            user: user(&id, "Invited", phone),
            trust_level,
            status: MembershipStatus::Pending,
            joined_at: None,
        };
        data.members
            .entry(tribe_id.to_string())
            .or_default()
            .push(invited.clone());
        Ok(invited)
    }

    async fn remove_member(&self, tribe_id: &str, user_id: &str) -> PortResult<()> {
        self.enter("remove_member")?;
        let mut data = self.data.lock().unwrap();
        let members = data
            .members
            .get_mut(tribe_id)
            .ok_or_else(|| not_found("Tribe", tribe_id))?;
        members.retain(|m| m.user.id != user_id);
        Ok(())
    }

    async fn update_member_trust(
        &self,
        tribe_id: &str,
        user_id: &str,
        trust_level: TrustLevel,
    ) -> PortResult<Option<TribeMember>> {
        self.enter("update_member_trust")?;
        let mut data = self.data.lock().unwrap();
        let member = data
            .members
            .get_mut(tribe_id)
            .and_then(|ms| ms.iter_mut().find(|m| m.user.id == user_id))
            .ok_or_else(|| not_found("Member", user_id))?;
        member.trust_level = trust_level;
        Ok(Some(member.clone()))
    }

    async fn respond_to_invite(&self, tribe_id: &str, response: InviteResponse) -> PortResult<()> {
        self.enter("respond_to_invite")?;
        self.data
            .lock()
            .unwrap()
            .invite_responses
            .push((tribe_id.to_string(), response));
        Ok(())
    }
}

fn draft_to_destination(id: String, draft: &DestinationDraft) -> Destination {
    Destination {
        id,
        name: draft.name.clone(),
        address: draft.address.clone(),
        google_place_id: draft.google_place_id.clone(),
        geo: draft.geo,
        category: Some(draft.category),
        created_by: Some("u1".to_string()),
    }
}

#[async_trait]
impl DestinationService for FakeBackend {
    async fn list_destinations(&self) -> PortResult<Vec<Destination>> {
        self.enter("list_destinations")?;
        Ok(self.data.lock().unwrap().destinations.clone())
    }

    async fn create_destination(&self, draft: &DestinationDraft) -> PortResult<Destination> {
        self.enter("create_destination")?;
        let mut data = self.data.lock().unwrap();
        let id = data.next_id("d");
        let created = draft_to_destination(id, draft);
        data.destinations.push(created.clone());
        Ok(created)
    }

    async fn update_destination(
        &self,
        id: &str,
        draft: &DestinationDraft,
    ) -> PortResult<Destination> {
        self.enter("update_destination")?;
        let mut data = self.data.lock().unwrap();
        let stored = data
            .destinations
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found("Destination", id))?;
        *stored = draft_to_destination(id.to_string(), draft);
        Ok(stored.clone())
    }

    async fn delete_destination(&self, id: &str) -> PortResult<()> {
        self.enter("delete_destination")?;
        self.data.lock().unwrap().destinations.retain(|d| d.id != id);
        Ok(())
    }
}

/// Instants come back as UTC, the way the backend stores them.
fn draft_to_schedule(id: String, draft: &ScheduleDraft) -> ScheduleEntry {
    let utc = |t: DateTime<FixedOffset>| t.with_timezone(&Utc).fixed_offset();
    ScheduleEntry {
        id,
        user_id: "u1".to_string(),
        child_name: draft.child_name.clone(),
        destination_id: draft.destination_id.clone(),
        destination: None,
        pickup_time: Some(utc(draft.pickup_time)),
        dropoff_time: draft.dropoff_time.map(utc),
        recurrence: draft.recurrence,
        status: draft.status,
    }
}

#[async_trait]
impl ScheduleService for FakeBackend {
    async fn list_schedules(&self) -> PortResult<Vec<ScheduleEntry>> {
        self.enter("list_schedules")?;
        Ok(self.data.lock().unwrap().schedules.clone())
    }

    async fn create_schedule(&self, draft: &ScheduleDraft) -> PortResult<ScheduleEntry> {
        self.enter("create_schedule")?;
        let mut data = self.data.lock().unwrap();
        let id = data.next_id("s");
        let created = draft_to_schedule(id, draft);
        data.schedules.push(created.clone());
        Ok(created)
    }

    async fn update_schedule(&self, id: &str, draft: &ScheduleDraft) -> PortResult<ScheduleEntry> {
        self.enter("update_schedule")?;
        let mut data = self.data.lock().unwrap();
        let stored = data
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Schedule", id))?;
        *stored = draft_to_schedule(id.to_string(), draft);
        Ok(stored.clone())
    }

    async fn delete_schedule(&self, id: &str) -> PortResult<()> {
        self.enter("delete_schedule")?;
        self.data.lock().unwrap().schedules.retain(|s| s.id != id);
        Ok(())
    }
}

#[async_trait]
impl MatchService for FakeBackend {
    async fn list_matches(&self) -> PortResult<Vec<RideMatch>> {
        self.enter("list_matches")?;
        Ok(self.data.lock().unwrap().matches.clone())
    }

    async fn update_match_status(&self, id: &str, status: MatchStatus) -> PortResult<RideMatch> {
        self.enter("update_match_status")?;
        let mut data = self.data.lock().unwrap();
        let stored = data
            .matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| not_found("Match", id))?;
        stored.status = status;
        Ok(stored.clone())
    }

    async fn generate_matches(&self) -> PortResult<u32> {
        self.enter("generate_matches")?;
        Ok(self.data.lock().unwrap().matches.len() as u32)
    }
}

#[async_trait]
impl NotificationService for FakeBackend {
    async fn list_notifications(&self) -> PortResult<Vec<Notification>> {
        self.enter("list_notifications")?;
        Ok(self.data.lock().unwrap().notifications.clone())
    }

    async fn mark_read(&self, id: &str) -> PortResult<Notification> {
        self.enter("mark_read")?;
        let mut data = self.data.lock().unwrap();
        let stored = data
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| not_found("Notification", id))?;
        stored.is_read = true;
        Ok(stored.clone())
    }
}

//=========================================================================================
// Places and Shell Fakes
//=========================================================================================

#[derive(Default)]
pub struct FakePlaces {
    places: Vec<ResolvedPlace>,
    searches: AtomicUsize,
}

impl FakePlaces {
    pub fn with_place(id: &str, address: &str, geo: Geo) -> Self {
        Self {
            places: vec![ResolvedPlace {
                place_id: id.to_string(),
                name: None,
                address: address.to_string(),
                geo: Some(geo),
            }],
            searches: AtomicUsize::new(0),
        }
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesService for FakePlaces {
    async fn search(&self, query: &str) -> PortResult<Vec<PlaceCandidate>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let query = query.to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|p| p.address.to_lowercase().contains(&query))
            .map(|p| PlaceCandidate {
                id: p.place_id.clone(),
                description: p.address.clone(),
            })
            .collect())
    }

    async fn resolve(&self, candidate_id: &str) -> PortResult<ResolvedPlace> {
        self.places
            .iter()
            .find(|p| p.place_id == candidate_id)
            .cloned()
            .ok_or_else(|| not_found("Place", candidate_id))
    }
}

#[derive(Default)]
pub struct RecordingToaster {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToaster {
    pub fn last(&self) -> Option<Toast> {
        self.toasts.lock().unwrap().last().cloned()
    }

    pub fn all(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

impl Toaster for RecordingToaster {
    fn show(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn last(&self) -> Option<Route> {
        self.routes.lock().unwrap().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub struct ScriptedConfirmer {
    answer: AtomicBool,
}

impl ScriptedConfirmer {
    pub fn answer(&self, yes: bool) {
        self.answer.store(yes, Ordering::SeqCst);
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.answer.load(Ordering::SeqCst)
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub tokens: Arc<MemoryTokenStore>,
    pub toaster: Arc<RecordingToaster>,
    pub navigator: Arc<RecordingNavigator>,
    pub confirmer: Arc<ScriptedConfirmer>,
    pub state: Arc<AppState>,
    pub session: Arc<SessionStore>,
}

impl Harness {
    /// Fresh state; the session is still `Loading`.
    pub fn new() -> Self {
        let tokens = Arc::new(MemoryTokenStore::new());
        let backend = Arc::new(FakeBackend::new(tokens.clone()));
        let toaster = Arc::new(RecordingToaster::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let confirmer = Arc::new(ScriptedConfirmer {
            answer: AtomicBool::new(true),
        });
        let state = Arc::new(AppState {
            auth: backend.clone(),
            tribes: backend.clone(),
            destinations: backend.clone(),
            schedules: backend.clone(),
            matches: backend.clone(),
            notifications: backend.clone(),
            places: Arc::new(FakePlaces::default()),
            tokens: tokens.clone(),
            toaster: toaster.clone(),
            navigator: navigator.clone(),
            confirmer: confirmer.clone(),
        });
        let session = Arc::new(SessionStore::from_state(&state));
        Self {
            backend,
            tokens,
            toaster,
            navigator,
            confirmer,
            state,
            session,
        }
    }

    /// Signed in as `u1`.
    pub async fn signed_in() -> Self {
        let h = Self::new();
        h.backend.add_user("u1", "Dana", "5551234567", "hunter22");
        h.session
            .login("5551234567", "hunter22")
            .await
            .expect("fixture login");
        h
    }
}
