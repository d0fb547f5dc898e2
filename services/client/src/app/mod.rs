//! services/client/src/app/mod.rs
//!
//! The view-state layer: the session store, one controller per page, and the
//! background notification poller. Everything here talks to the backend only
//! through the ports held in `AppState`.

pub mod address;
pub mod destinations;
pub mod forms;
pub mod matches;
pub mod notifications;
pub mod resource_list;
pub mod schedules;
pub mod session;
pub mod state;
pub mod tribes;
pub mod viewport;

#[cfg(test)]
pub mod fakes;

pub use address::{AddressField, AddressValue, Key, KeyOutcome};
pub use destinations::DestinationsController;
pub use matches::MatchesController;
pub use notifications::{NotificationCenter, NotificationPoller};
pub use resource_list::{ActionKey, ResourceList};
pub use schedules::{ScheduleRow, SchedulesController};
pub use session::{RouteDecision, SessionStatus, SessionStore};
pub use state::AppState;
pub use tribes::TribesController;
pub use viewport::Viewport;
