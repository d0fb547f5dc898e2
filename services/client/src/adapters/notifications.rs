//! services/client/src/adapters/notifications.rs
//!
//! Adapter for the `/notifications` endpoints. It implements the
//! `NotificationService` port.

use async_trait::async_trait;
use ridetribe_core::domain::Notification;
use ridetribe_core::ports::{NotificationService, PortResult};

use crate::adapters::http::{expect_body, segment, HttpClient};
use crate::adapters::records::{into_domain_list, NotificationRecord};

#[derive(Clone)]
pub struct HttpNotificationAdapter {
    http: HttpClient,
}

impl HttpNotificationAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotificationService for HttpNotificationAdapter {
    async fn list_notifications(&self) -> PortResult<Vec<Notification>> {
        let records: Vec<NotificationRecord> = self.http.get("/notifications").await?;
        into_domain_list(records, NotificationRecord::into_domain)
    }

    async fn mark_read(&self, id: &str) -> PortResult<Notification> {
        let path = format!("/notifications/{}/read", segment(id));
        // The endpoint takes no fields but still expects a JSON body.
        let record: Option<NotificationRecord> =
            self.http.patch(&path, &serde_json::json!({})).await?;
        expect_body(&path, record)?.into_domain()
    }
}
