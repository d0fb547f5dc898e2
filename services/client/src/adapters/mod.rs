pub mod auth;
pub mod destinations;
pub mod http;
pub mod matches;
pub mod notifications;
pub mod places;
pub mod records;
pub mod schedules;
pub mod shell;
pub mod token_store;
pub mod tribes;

pub use auth::HttpAuthAdapter;
pub use destinations::HttpDestinationAdapter;
pub use http::HttpClient;
pub use matches::HttpMatchAdapter;
pub use notifications::HttpNotificationAdapter;
pub use places::{GooglePlacesAdapter, NoPlaces};
pub use schedules::HttpScheduleAdapter;
pub use shell::{FixedConfirmer, TracingNavigator, TracingToaster};
pub use token_store::{FileTokenStore, MemoryTokenStore};
pub use tribes::HttpTribeAdapter;
