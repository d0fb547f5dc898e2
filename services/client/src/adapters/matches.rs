//! services/client/src/adapters/matches.rs
//!
//! Adapter for the `/matches` endpoints. It implements the `MatchService` port.
//! Matching itself runs server-side; the client only reads results and moves
//! a match out of `suggested`.

use async_trait::async_trait;
use ridetribe_core::domain::{MatchStatus, RideMatch};
use ridetribe_core::ports::{MatchService, PortResult};
use serde::{Deserialize, Serialize};

use crate::adapters::http::{expect_body, segment, HttpClient};
use crate::adapters::records::{into_domain_list, RideMatchRecord};

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    count: u32,
}

#[derive(Clone)]
pub struct HttpMatchAdapter {
    http: HttpClient,
}

impl HttpMatchAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MatchService for HttpMatchAdapter {
    async fn list_matches(&self) -> PortResult<Vec<RideMatch>> {
        let records: Vec<RideMatchRecord> = self.http.get("/matches").await?;
        into_domain_list(records, RideMatchRecord::into_domain)
    }

    async fn update_match_status(&self, id: &str, status: MatchStatus) -> PortResult<RideMatch> {
        let path = format!("/matches/{}", segment(id));
        let record: Option<RideMatchRecord> = self
            .http
            .patch(
                &path,
                &StatusBody {
                    status: status.as_str(),
                },
            )
            .await?;
        expect_body(&path, record)?.into_domain()
    }

    async fn generate_matches(&self) -> PortResult<u32> {
        let response: GenerateResponse = self
            .http
            .post("/matches/generate", &serde_json::json!({}))
            .await?;
        Ok(response.count)
    }
}
