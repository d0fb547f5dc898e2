//! services/client/src/adapters/places.rs
//!
//! This module contains the adapter for the Google Places web service.
//! It implements the `PlacesService` port from the `core` crate, so the
//! address field never depends on a concrete mapping provider.

use async_trait::async_trait;
use ridetribe_core::domain::Geo;
use ridetribe_core::ports::{PlaceCandidate, PlacesService, PortError, PortResult, ResolvedPlace};
use serde::Deserialize;
use tracing::error;

const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place";

//=========================================================================================
// Google Places Response Records
//=========================================================================================

#[derive(Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `PlacesService` port using Google Places.
#[derive(Clone)]
pub struct GooglePlacesAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GooglePlacesAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(reqwest::Client::new(), api_key, DEFAULT_PLACES_URL)
    }

    /// Points the adapter at a different Places-compatible host.
    pub fn with_base_url(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> PortResult<T> {
        let url = format!("{}/{}/json", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!("Places request to {} failed: {:?}", endpoint, e);
                PortError::Network(e.to_string())
            })?;
        if !response.status().is_success() {
            return Err(PortError::Api {
                status: response.status().as_u16(),
                message: format!("Places {} request failed", endpoint),
            });
        }
        response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

fn check_status(status: &str, error_message: Option<String>) -> PortResult<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "NOT_FOUND" | "INVALID_REQUEST" => Err(PortError::NotFound(
            error_message.unwrap_or_else(|| "Place not found".to_string()),
        )),
        other => {
            error!("Google Places API error: {} - {:?}", other, error_message);
            Err(PortError::Unexpected(format!(
                "Places service returned {}",
                other
            )))
        }
    }
}

//=========================================================================================
// `PlacesService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PlacesService for GooglePlacesAdapter {
    async fn search(&self, query: &str) -> PortResult<Vec<PlaceCandidate>> {
        let response: AutocompleteResponse =
            self.fetch("autocomplete", &[("input", query)]).await?;
        check_status(&response.status, response.error_message)?;
        Ok(response
            .predictions
            .into_iter()
            .map(|p| PlaceCandidate {
                id: p.place_id,
                description: p.description,
            })
            .collect())
    }

    async fn resolve(&self, candidate_id: &str) -> PortResult<ResolvedPlace> {
        let response: DetailsResponse = self
            .fetch(
                "details",
                &[
                    ("place_id", candidate_id),
                    ("fields", "name,formatted_address,geometry"),
                ],
            )
            .await?;
        check_status(&response.status, response.error_message)?;
        let details = response
            .result
            .ok_or_else(|| PortError::NotFound(format!("No details for place {}", candidate_id)))?;
        let address = details
            .formatted_address
            .or_else(|| details.name.clone())
            .ok_or_else(|| PortError::Unexpected("Place has no address".to_string()))?;
        Ok(ResolvedPlace {
            place_id: candidate_id.to_string(),
            name: details.name,
            address,
            geo: details.geometry.map(|g| Geo {
                lat: g.location.lat,
                lng: g.location.lng,
            }),
        })
    }
}

/// Used when no Places key is configured: no suggestions, nothing resolves.
#[derive(Clone, Copy, Default)]
pub struct NoPlaces;

#[async_trait]
impl PlacesService for NoPlaces {
    async fn search(&self, _query: &str) -> PortResult<Vec<PlaceCandidate>> {
        Ok(Vec::new())
    }

    async fn resolve(&self, candidate_id: &str) -> PortResult<ResolvedPlace> {
        Err(PortError::NotFound(format!(
            "Places lookup is not configured (place {})",
            candidate_id
        )))
    }
}
