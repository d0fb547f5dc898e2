//! services/client/src/adapters/destinations.rs
//!
//! Adapter for the `/destinations` endpoints. It implements the
//! `DestinationService` port.

use async_trait::async_trait;
use ridetribe_core::domain::{Destination, DestinationDraft};
use ridetribe_core::ports::{DestinationService, PortResult};

use crate::adapters::http::{segment, HttpClient};
use crate::adapters::records::{into_domain_list, DestinationPayload, DestinationRecord};

#[derive(Clone)]
pub struct HttpDestinationAdapter {
    http: HttpClient,
}

impl HttpDestinationAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

fn payload(draft: &DestinationDraft) -> DestinationPayload<'_> {
    DestinationPayload {
        name: &draft.name,
        address: &draft.address,
        google_place_id: draft.google_place_id.as_deref(),
        geo: draft.geo.map(Into::into),
        category: draft.category.as_str(),
    }
}

#[async_trait]
impl DestinationService for HttpDestinationAdapter {
    async fn list_destinations(&self) -> PortResult<Vec<Destination>> {
        let records: Vec<DestinationRecord> = self.http.get("/destinations").await?;
        into_domain_list(records, DestinationRecord::into_domain)
    }

    async fn create_destination(&self, draft: &DestinationDraft) -> PortResult<Destination> {
        let record: DestinationRecord = self.http.post("/destinations", &payload(draft)).await?;
        record.into_domain()
    }

    async fn update_destination(
        &self,
        id: &str,
        draft: &DestinationDraft,
    ) -> PortResult<Destination> {
        let record: DestinationRecord = self
            .http
            .put(&format!("/destinations/{}", segment(id)), &payload(draft))
            .await?;
        record.into_domain()
    }

    async fn delete_destination(&self, id: &str) -> PortResult<()> {
        self.http
            .delete(&format!("/destinations/{}", segment(id)))
            .await
    }
}
