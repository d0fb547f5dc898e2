//! crates/ridetribe_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format;
//! the adapters translate backend payloads into them at the boundary.

use chrono::{DateTime, FixedOffset, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Identifiers
//=========================================================================================

/// Anything the client keeps in a list and addresses by its backend identifier.
///
/// The identifier is already canonical: adapters resolve the `id` / `_id`
/// aliases once, so every caller asking for "the identifier" sees one value.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Picks the canonical identifier out of the two aliases the backend may send.
///
/// `id` wins when both are present and non-empty; `_id` is the fallback.
pub fn resolve_id(id: Option<&str>, raw_id: Option<&str>) -> Option<String> {
    id.filter(|s| !s.is_empty())
        .or_else(|| raw_id.filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// Returned when a backend string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Implements `as_str`, `Display`, and `FromStr` for a string-backed enum.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant::new($kind, other)),
                }
            }
        }
    };
}

//=========================================================================================
// Users and Sessions
//=========================================================================================

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Primary login credential.
    pub phone: String,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// What a successful login hands back: the bearer token and who it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub name: String,
    pub phone: String,
    pub password: String,
}

/// Partial profile edit; `None` fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

//=========================================================================================
// Tribes
//=========================================================================================

/// Per-member scope of trust, ordered from full to minimal.
///
/// `Ord` follows trust: `Direct > ActivitySpecific > EmergencyOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrustLevel {
    #[default]
    Direct,
    ActivitySpecific,
    EmergencyOnly,
}

string_enum!(TrustLevel, "trust level", {
    Direct => "direct",
    ActivitySpecific => "activity-specific",
    EmergencyOnly => "emergency-only",
});

impl TrustLevel {
    pub const ALL: [TrustLevel; 3] = [
        TrustLevel::Direct,
        TrustLevel::ActivitySpecific,
        TrustLevel::EmergencyOnly,
    ];

    fn rank(self) -> u8 {
        match self {
            TrustLevel::Direct => 2,
            TrustLevel::ActivitySpecific => 1,
            TrustLevel::EmergencyOnly => 0,
        }
    }
}

impl PartialOrd for TrustLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TrustLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipStatus {
    Pending,
    Accepted,
    Declined,
    /// The invitee's own view of a pending invite.
    Invited,
}

string_enum!(MembershipStatus, "membership status", {
    Pending => "pending",
    Accepted => "accepted",
    Declined => "declined",
    Invited => "invited",
});

impl MembershipStatus {
    /// True while the invite still awaits the invitee's answer.
    pub fn awaiting_response(&self) -> bool {
        matches!(self, Self::Pending | Self::Invited)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tribe {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub member_count: u32,
    pub created_at: Option<DateTime<Utc>>,
    /// The viewer's relationship to the tribe, when the backend reports it.
    pub membership_status: Option<MembershipStatus>,
}

impl Tribe {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TribeMember {
    pub user: User,
    pub trust_level: TrustLevel,
    pub status: MembershipStatus,
    pub joined_at: Option<DateTime<Utc>>,
}

/// The invitee's answer to a tribe invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteResponse {
    Accept,
    Decline,
}

impl InviteResponse {
    pub fn status(&self) -> MembershipStatus {
        match self {
            Self::Accept => MembershipStatus::Accepted,
            Self::Decline => MembershipStatus::Declined,
        }
    }
}

//=========================================================================================
// Destinations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geo {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DestinationCategory {
    School,
    Sports,
    #[default]
    Activity,
    Home,
    Other,
}

string_enum!(DestinationCategory, "destination category", {
    School => "School",
    Sports => "Sports",
    Activity => "Activity",
    Home => "Home",
    Other => "Other",
});

/// A named, addressed place that schedule entries point at.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub address: String,
    pub google_place_id: Option<String>,
    pub geo: Option<Geo>,
    pub category: Option<DestinationCategory>,
    pub created_by: Option<String>,
}

/// Payload for creating or replacing a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationDraft {
    pub name: String,
    pub address: String,
    pub google_place_id: Option<String>,
    pub geo: Option<Geo>,
    pub category: DestinationCategory,
}

//=========================================================================================
// Schedules
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Recurrence {
    #[default]
    Once,
    Daily,
    Weekly,
}

string_enum!(Recurrence, "recurrence", {
    Once => "once",
    Daily => "daily",
    Weekly => "weekly",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScheduleStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

string_enum!(ScheduleStatus, "schedule status", {
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

/// One child's trip to a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub id: String,
    pub user_id: String,
    pub child_name: String,
    pub destination_id: String,
    /// Populated by the backend when it embeds the referenced destination.
    pub destination: Option<Destination>,
    pub pickup_time: Option<DateTime<FixedOffset>>,
    pub dropoff_time: Option<DateTime<FixedOffset>>,
    pub recurrence: Recurrence,
    pub status: ScheduleStatus,
}

/// Payload for creating or replacing a schedule entry.
///
/// Times carry their offset so the wall-clock value the user picked is what
/// goes over the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDraft {
    pub child_name: String,
    pub destination_id: String,
    pub pickup_time: DateTime<FixedOffset>,
    pub dropoff_time: Option<DateTime<FixedOffset>>,
    pub recurrence: Recurrence,
    pub status: ScheduleStatus,
}

//=========================================================================================
// Ride Matches
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Suggested,
    Accepted,
    Declined,
    Completed,
    Cancelled,
}

string_enum!(MatchStatus, "match status", {
    Suggested => "suggested",
    Accepted => "accepted",
    Declined => "declined",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl MatchStatus {
    /// Only a suggestion can still be accepted or declined.
    pub fn can_respond(&self) -> bool {
        matches!(self, Self::Suggested)
    }
}

/// The user's answer to a suggested match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchDecision {
    Accept,
    Decline,
}

impl MatchDecision {
    pub fn target_status(&self) -> MatchStatus {
        match self {
            Self::Accept => MatchStatus::Accepted,
            Self::Decline => MatchStatus::Declined,
        }
    }
}

/// A server-computed pairing of a requester's trip with a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RideMatch {
    pub id: String,
    pub requester_id: String,
    pub provider_id: String,
    pub schedule_entry_id: String,
    pub provider_schedule_id: Option<String>,
    /// Opaque score from the matching service.
    pub match_score: i64,
    pub status: MatchStatus,
    pub requester: Option<User>,
    pub provider: Option<User>,
    pub schedule: Option<ScheduleEntry>,
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    MatchFound,
    InviteReceived,
    InviteAccepted,
    RideAccepted,
}

string_enum!(NotificationKind, "notification type", {
    MatchFound => "match_found",
    InviteReceived => "invite_received",
    InviteAccepted => "invite_accepted",
    RideAccepted => "ride_accepted",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    /// Links back to the originating entity, e.g. the tribe of an invite.
    pub related_id: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// True for an invite the user can still answer from the feed.
    pub fn has_invite_action(&self) -> bool {
        self.kind == NotificationKind::InviteReceived && self.related_id.is_some()
    }
}

//=========================================================================================
// Navigation
//=========================================================================================

/// Every screen of the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Tribe,
    Schedule,
    Destinations,
    Matches,
    Settings,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Dashboard => "/",
            Route::Tribe => "/tribe",
            Route::Schedule => "/schedule",
            Route::Destinations => "/destinations",
            Route::Matches => "/matches",
            Route::Settings => "/settings",
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Signup)
    }
}

//=========================================================================================
// `Identified` Implementations
//=========================================================================================

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Tribe {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for TribeMember {
    fn id(&self) -> &str {
        &self.user.id
    }
}

impl Identified for Destination {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for ScheduleEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for RideMatch {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}
