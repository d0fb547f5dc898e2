//! services/client/src/adapters/schedules.rs
//!
//! Adapter for the `/schedules` endpoints. It implements the `ScheduleService` port.

use async_trait::async_trait;
use ridetribe_core::domain::{ScheduleDraft, ScheduleEntry};
use ridetribe_core::ports::{PortResult, ScheduleService};

use crate::adapters::http::{segment, HttpClient};
use crate::adapters::records::{into_domain_list, SchedulePayload, ScheduleRecord};

#[derive(Clone)]
pub struct HttpScheduleAdapter {
    http: HttpClient,
}

impl HttpScheduleAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

fn payload(draft: &ScheduleDraft) -> SchedulePayload<'_> {
    SchedulePayload {
        child_name: &draft.child_name,
        destination_id: &draft.destination_id,
        pickup_time: draft.pickup_time.to_rfc3339(),
        dropoff_time: draft.dropoff_time.map(|t| t.to_rfc3339()),
        recurrence: draft.recurrence.as_str(),
        status: draft.status.as_str(),
    }
}

#[async_trait]
impl ScheduleService for HttpScheduleAdapter {
    async fn list_schedules(&self) -> PortResult<Vec<ScheduleEntry>> {
        let records: Vec<ScheduleRecord> = self.http.get("/schedules").await?;
        into_domain_list(records, ScheduleRecord::into_domain)
    }

    async fn create_schedule(&self, draft: &ScheduleDraft) -> PortResult<ScheduleEntry> {
        let record: ScheduleRecord = self.http.post("/schedules", &payload(draft)).await?;
        record.into_domain()
    }

    async fn update_schedule(&self, id: &str, draft: &ScheduleDraft) -> PortResult<ScheduleEntry> {
        let record: ScheduleRecord = self
            .http
            .put(&format!("/schedules/{}", segment(id)), &payload(draft))
            .await?;
        record.into_domain()
    }

    async fn delete_schedule(&self, id: &str) -> PortResult<()> {
        self.http.delete(&format!("/schedules/{}", segment(id))).await
    }
}
