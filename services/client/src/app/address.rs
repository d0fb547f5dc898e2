//! services/client/src/app/address.rs
//!
//! An address input backed by place autocomplete. The field owns the text the
//! user typed, the suggestions for it, and once a suggestion is picked, the
//! resolved place id and coordinates.

use ridetribe_core::domain::Geo;
use ridetribe_core::ports::{PlaceCandidate, PlacesService, PortResult, ResolvedPlace};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

/// Queries shorter than this are not sent to the places provider.
pub const MIN_QUERY_LEN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressValue {
    pub text: String,
    pub place_id: Option<String>,
    pub geo: Option<Geo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key is consumed by the field and must not reach the form.
    Suppressed,
    Passed,
}

#[derive(Default)]
struct FieldState {
    value: AddressValue,
    suggestions: Vec<PlaceCandidate>,
}

pub struct AddressField {
    places: Arc<dyn PlacesService>,
    state: Mutex<FieldState>,
}

impl AddressField {
    pub fn new(places: Arc<dyn PlacesService>) -> Self {
        Self {
            places,
            state: Mutex::new(FieldState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FieldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn value(&self) -> AddressValue {
        self.lock().value.clone()
    }

    pub fn suggestions(&self) -> Vec<PlaceCandidate> {
        self.lock().suggestions.clone()
    }

    /// Seeds the field, e.g. from a destination being edited.
    pub fn reset(&self, value: AddressValue) {
        let mut state = self.lock();
        state.value = value;
        state.suggestions.clear();
    }

    /// Records typed text and refreshes suggestions for it.
    ///
    /// Editing the text detaches any previously resolved place.
    pub async fn input(&self, text: &str) -> PortResult<Vec<PlaceCandidate>> {
        {
            let mut state = self.lock();
            state.value = AddressValue {
                text: text.to_string(),
                place_id: None,
                geo: None,
            };
            state.suggestions.clear();
        }

        let query = text.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let found = self.places.search(query).await.map_err(|e| {
            error!("Address search failed: {:?}", e);
            e
        })?;

        let mut state = self.lock();
        if state.value.text == text {
            state.suggestions = found.clone();
        } else {
            debug!("Dropping suggestions for stale input");
        }
        Ok(found)
    }

    /// Resolves a suggestion and makes it the field's value in one step.
    pub async fn select(&self, candidate: &PlaceCandidate) -> PortResult<ResolvedPlace> {
        let place = self.places.resolve(&candidate.id).await.map_err(|e| {
            error!("Failed to resolve place {}: {:?}", candidate.id, e);
            e
        })?;

        let mut state = self.lock();
        state.value = AddressValue {
            text: place.address.clone(),
            place_id: Some(place.place_id.clone()),
            geo: place.geo,
        };
        state.suggestions.clear();
        Ok(place)
    }

    pub fn key(&self, key: Key) -> KeyOutcome {
        match key {
            Key::Enter => KeyOutcome::Suppressed,
            Key::Escape => {
                self.lock().suggestions.clear();
                KeyOutcome::Passed
            }
            Key::Other => KeyOutcome::Passed,
        }
    }
}
