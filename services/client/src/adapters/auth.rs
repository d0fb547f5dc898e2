//! services/client/src/adapters/auth.rs
//!
//! Adapter for the `/auth` endpoints. It implements the `AuthService` port
//! from the `core` crate on top of the shared `HttpClient`.

use async_trait::async_trait;
use ridetribe_core::domain::{AuthGrant, ProfileUpdate, SignupRequest, User};
use ridetribe_core::ports::{AuthService, PortResult};
use serde::Serialize;

use crate::adapters::http::HttpClient;
use crate::adapters::records::{AuthResponseRecord, UserRecord};

#[derive(Serialize)]
struct LoginBody<'a> {
    phone: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupBody<'a> {
    name: &'a str,
    phone: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ProfileBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

/// An adapter that implements the `AuthService` port over REST.
#[derive(Clone)]
pub struct HttpAuthAdapter {
    http: HttpClient,
}

impl HttpAuthAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AuthService for HttpAuthAdapter {
    async fn login(&self, phone: &str, password: &str) -> PortResult<AuthGrant> {
        let record: AuthResponseRecord = self
            .http
            .post("/auth/login", &LoginBody { phone, password })
            .await?;
        record.into_domain()
    }

    async fn signup(&self, request: &SignupRequest) -> PortResult<User> {
        // The backend answers with a full auth response; the token is ignored
        // because signing up never authenticates the client.
        let record: AuthResponseRecord = self
            .http
            .post(
                "/auth/signup",
                &SignupBody {
                    name: &request.name,
                    phone: &request.phone,
                    password: &request.password,
                },
            )
            .await?;
        record.user.into_domain()
    }

    async fn current_user(&self) -> PortResult<User> {
        let record: UserRecord = self.http.get("/auth/me").await?;
        record.into_domain()
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> PortResult<User> {
        let body = ProfileBody {
            name: update.name.as_deref(),
            phone: update.phone.as_deref(),
            email: update.email.as_deref(),
        };
        let record: UserRecord = self.http.put("/auth/me", &body).await?;
        record.into_domain()
    }

    async fn delete_account(&self) -> PortResult<()> {
        self.http.delete("/auth/me").await
    }
}
