//! services/client/src/adapters/tribes.rs
//!
//! Adapter for the `/tribes` endpoints, including membership management and
//! invite responses. It implements the `TribeService` port.

use async_trait::async_trait;
use ridetribe_core::domain::{InviteResponse, Tribe, TribeMember, TrustLevel};
use ridetribe_core::ports::{PortResult, TribeService};
use serde::Serialize;

use crate::adapters::http::{segment, HttpClient};
use crate::adapters::records::{into_domain_list, TribeMemberRecord, TribeRecord};

#[derive(Serialize)]
struct CreateTribeBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct InviteBody<'a> {
    phone_number: &'a str,
    trust_level: &'static str,
}

#[derive(Serialize)]
struct TrustBody {
    trust_level: &'static str,
}

#[derive(Serialize)]
struct RespondBody {
    status: &'static str,
}

#[derive(Clone)]
pub struct HttpTribeAdapter {
    http: HttpClient,
}

impl HttpTribeAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

fn member_path(tribe_id: &str, user_id: &str) -> String {
    format!("/tribes/{}/members/{}", segment(tribe_id), segment(user_id))
}

#[async_trait]
impl TribeService for HttpTribeAdapter {
    async fn list_tribes(&self) -> PortResult<Vec<Tribe>> {
        let records: Vec<TribeRecord> = self.http.get("/tribes").await?;
        into_domain_list(records, TribeRecord::into_domain)
    }

    async fn create_tribe(&self, name: &str) -> PortResult<Tribe> {
        let record: TribeRecord = self.http.post("/tribes", &CreateTribeBody { name }).await?;
        record.into_domain()
    }

    async fn list_members(&self, tribe_id: &str) -> PortResult<Vec<TribeMember>> {
        let records: Vec<TribeMemberRecord> = self
            .http
            .get(&format!("/tribes/{}/members", segment(tribe_id)))
            .await?;
        into_domain_list(records, TribeMemberRecord::into_domain)
    }

    async fn invite_member(
        &self,
        tribe_id: &str,
        phone: &str,
        trust_level: TrustLevel,
    ) -> PortResult<TribeMember> {
        let body = InviteBody {
            phone_number: phone,
            trust_level: trust_level.as_str(),
        };
        let record: TribeMemberRecord = self
            .http
            .post(&format!("/tribes/{}/invite", segment(tribe_id)), &body)
            .await?;
        record.into_domain()
    }

    async fn remove_member(&self, tribe_id: &str, user_id: &str) -> PortResult<()> {
        self.http.delete(&member_path(tribe_id, user_id)).await
    }

    async fn update_member_trust(
        &self,
        tribe_id: &str,
        user_id: &str,
        trust_level: TrustLevel,
    ) -> PortResult<Option<TribeMember>> {
        let body = TrustBody {
            trust_level: trust_level.as_str(),
        };
        let record: Option<TribeMemberRecord> =
            self.http.patch(&member_path(tribe_id, user_id), &body).await?;
        record.map(TribeMemberRecord::into_domain).transpose()
    }

    async fn respond_to_invite(&self, tribe_id: &str, response: InviteResponse) -> PortResult<()> {
        let body = RespondBody {
            status: response.status().as_str(),
        };
        self.http
            .post_unit(&format!("/tribes/{}/respond", segment(tribe_id)), &body)
            .await
    }
}
