//! services/client/src/adapters/records.rs
//!
//! "Impure" wire records for the backend's JSON payloads and their conversion
//! into core domain values. This is the edge where the `id` / `_id` aliases
//! are collapsed into a single canonical identifier.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use ridetribe_core::domain::{
    resolve_id, AuthGrant, Destination, Geo, Notification, RideMatch, ScheduleEntry, Tribe,
    TribeMember, User,
};
use ridetribe_core::ports::{PortError, PortResult};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Helpers
//=========================================================================================

fn require_id(kind: &str, id: Option<&str>, raw_id: Option<&str>) -> PortResult<String> {
    resolve_id(id, raw_id)
        .ok_or_else(|| PortError::Unexpected(format!("{} record is missing an identifier", kind)))
}

/// Parses a backend timestamp. Naive values are UTC.
pub fn parse_timestamp(raw: &str) -> PortResult<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| PortError::Unexpected(format!("Invalid timestamp '{}': {}", raw, e)))
}

fn parse_optional_timestamp(raw: Option<&str>) -> PortResult<Option<DateTime<FixedOffset>>> {
    raw.filter(|s| !s.is_empty()).map(parse_timestamp).transpose()
}

fn parse_optional_utc(raw: Option<&str>) -> PortResult<Option<DateTime<Utc>>> {
    Ok(parse_optional_timestamp(raw)?.map(|dt| dt.with_timezone(&Utc)))
}

//=========================================================================================
// Users and Auth
//=========================================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub raw_id: Option<String>,
    pub name: String,
    #[serde(alias = "phoneNumber")]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserRecord {
    pub fn into_domain(self) -> PortResult<User> {
        Ok(User {
            id: require_id("user", self.id.as_deref(), self.raw_id.as_deref())?,
            name: self.name,
            phone: self.phone,
            email: self.email,
            created_at: parse_optional_utc(self.created_at.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponseRecord {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: UserRecord,
}

fn bearer() -> String {
    "bearer".to_string()
}

impl AuthResponseRecord {
    pub fn into_domain(self) -> PortResult<AuthGrant> {
        Ok(AuthGrant {
            access_token: self.access_token,
            token_type: self.token_type,
            user: self.user.into_domain()?,
        })
    }
}

//=========================================================================================
// Tribes
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct TribeRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub raw_id: Option<String>,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub membership_status: Option<String>,
}

impl TribeRecord {
    pub fn into_domain(self) -> PortResult<Tribe> {
        Ok(Tribe {
            id: require_id("tribe", self.id.as_deref(), self.raw_id.as_deref())?,
            owner_id: self.owner_id,
            name: self.name,
            member_count: self.member_count,
            created_at: parse_optional_utc(self.created_at.as_deref())?,
            membership_status: self.membership_status.map(|s| s.parse()).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TribeMemberRecord {
    pub user: UserRecord,
    pub trust_level: String,
    pub status: String,
    #[serde(default)]
    pub joined_at: Option<String>,
}

impl TribeMemberRecord {
    pub fn into_domain(self) -> PortResult<TribeMember> {
        Ok(TribeMember {
            user: self.user.into_domain()?,
            trust_level: self.trust_level.parse()?,
            status: self.status.parse()?,
            joined_at: parse_optional_utc(self.joined_at.as_deref())?,
        })
    }
}

//=========================================================================================
// Destinations
//=========================================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoRecord {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeoRecord> for Geo {
    fn from(g: GeoRecord) -> Self {
        Geo { lat: g.lat, lng: g.lng }
    }
}

impl From<Geo> for GeoRecord {
    fn from(g: Geo) -> Self {
        GeoRecord { lat: g.lat, lng: g.lng }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub raw_id: Option<String>,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub google_place_id: Option<String>,
    #[serde(default)]
    pub geo: Option<GeoRecord>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    // Legacy coordinate pair, only consulted when `geo` is absent.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl DestinationRecord {
    pub fn into_domain(self) -> PortResult<Destination> {
        let geo = match (self.geo, self.latitude, self.longitude) {
            (Some(geo), _, _) => Some(geo.into()),
            (None, Some(lat), Some(lng)) => Some(Geo { lat, lng }),
            _ => None,
        };
        Ok(Destination {
            id: require_id("destination", self.id.as_deref(), self.raw_id.as_deref())?,
            name: self.name,
            address: self.address,
            google_place_id: self.google_place_id,
            geo,
            category: self
                .category
                .filter(|c| !c.is_empty())
                .map(|c| c.parse())
                .transpose()?,
            created_by: self.created_by,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DestinationPayload<'a> {
    pub name: &'a str,
    pub address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_place_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoRecord>,
    pub category: &'static str,
}

//=========================================================================================
// Schedules
//=========================================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub raw_id: Option<String>,
    pub user_id: String,
    pub child_name: String,
    pub destination_id: String,
    #[serde(default)]
    pub destination: Option<DestinationRecord>,
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub dropoff_time: Option<String>,
    #[serde(default = "once")]
    pub recurrence: String,
    #[serde(default = "active")]
    pub status: String,
}

fn once() -> String {
    "once".to_string()
}

fn active() -> String {
    "active".to_string()
}

impl ScheduleRecord {
    pub fn into_domain(self) -> PortResult<ScheduleEntry> {
        Ok(ScheduleEntry {
            id: require_id("schedule", self.id.as_deref(), self.raw_id.as_deref())?,
            user_id: self.user_id,
            child_name: self.child_name,
            destination_id: self.destination_id,
            destination: self.destination.map(DestinationRecord::into_domain).transpose()?,
            pickup_time: parse_optional_timestamp(self.pickup_time.as_deref())?,
            dropoff_time: parse_optional_timestamp(self.dropoff_time.as_deref())?,
            recurrence: self.recurrence.parse()?,
            status: self.status.parse()?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SchedulePayload<'a> {
    pub child_name: &'a str,
    pub destination_id: &'a str,
    /// RFC 3339 with the user's offset, so the picked wall-clock time survives.
    pub pickup_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_time: Option<String>,
    pub recurrence: &'static str,
    pub status: &'static str,
}

//=========================================================================================
// Ride Matches
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct RideMatchRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub raw_id: Option<String>,
    pub requester_id: String,
    pub provider_id: String,
    pub schedule_entry_id: String,
    #[serde(default)]
    pub provider_schedule_id: Option<String>,
    #[serde(default)]
    pub match_score: i64,
    pub status: String,
    #[serde(default)]
    pub requester: Option<UserRecord>,
    #[serde(default)]
    pub provider: Option<UserRecord>,
    #[serde(default)]
    pub schedule: Option<ScheduleRecord>,
}

impl RideMatchRecord {
    pub fn into_domain(self) -> PortResult<RideMatch> {
        Ok(RideMatch {
            id: require_id("match", self.id.as_deref(), self.raw_id.as_deref())?,
            requester_id: self.requester_id,
            provider_id: self.provider_id,
            schedule_entry_id: self.schedule_entry_id,
            provider_schedule_id: self.provider_schedule_id,
            match_score: self.match_score,
            status: self.status.parse()?,
            requester: self.requester.map(UserRecord::into_domain).transpose()?,
            provider: self.provider.map(UserRecord::into_domain).transpose()?,
            schedule: self.schedule.map(ScheduleRecord::into_domain).transpose()?,
        })
    }
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct NotificationRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub raw_id: Option<String>,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub related_id: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: String,
}

impl NotificationRecord {
    pub fn into_domain(self) -> PortResult<Notification> {
        Ok(Notification {
            id: require_id("notification", self.id.as_deref(), self.raw_id.as_deref())?,
            user_id: self.user_id,
            kind: self.kind.parse()?,
            message: self.message,
            related_id: self.related_id,
            is_read: self.is_read,
            created_at: parse_timestamp(&self.created_at)?.with_timezone(&Utc),
        })
    }
}

/// Converts a list of records, failing on the first malformed one.
pub fn into_domain_list<R, T>(
    records: Vec<R>,
    convert: impl Fn(R) -> PortResult<T>,
) -> PortResult<Vec<T>> {
    records.into_iter().map(convert).collect()
}
