pub mod domain;
pub mod ports;

pub use domain::{
    resolve_id, AuthGrant, Destination, DestinationCategory, DestinationDraft, Geo, Identified,
    InviteResponse, MatchDecision, MatchStatus, MembershipStatus, Notification, NotificationKind,
    ProfileUpdate, Recurrence, RideMatch, Route, ScheduleDraft, ScheduleEntry, ScheduleStatus,
    SignupRequest, Tribe, TribeMember, TrustLevel, UnknownVariant, User,
};
pub use ports::{
    AuthService, Confirmer, DestinationService, MatchService, Navigator, NotificationService,
    PlaceCandidate, PlacesService, PortError, PortResult, ResolvedPlace, ScheduleService, Toast,
    ToastLevel, Toaster, TokenStore, TribeService,
};
