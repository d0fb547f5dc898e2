//! services/client/src/adapters/http.rs
//!
//! The one place the client speaks HTTP. Every resource adapter goes through
//! [`HttpClient`], which attaches the bearer token, serializes JSON bodies, and
//! normalizes backend failures into [`PortError`]s.

use reqwest::{Method, StatusCode};
use ridetribe_core::ports::{PortError, PortResult, TokenStore};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

const FALLBACK_ERROR_MESSAGE: &str = "API request failed";

//=========================================================================================
// The Main Client Struct
//=========================================================================================

/// Authenticated JSON client for the RideTribe REST backend.
///
/// No retries, no timeout, no cancellation: each call resolves or rejects once.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpClient {
    /// Creates a new `HttpClient`.
    ///
    /// * `base_url` - e.g. `http://localhost:8000/api/v1`, without a trailing slash.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, tokens)
    }

    /// Creates a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a request and parses the JSON response.
    ///
    /// Resolves to `None` on `204 No Content`.
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> PortResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Making request");

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        // The token is read at request time; the session store owns writes.
        if let Some(token) = self.tokens.load() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|e| PortError::Unexpected(format!("Failed to encode request: {}", e)))?;
            builder = builder.body(payload);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Network error fetching {}: {:?}", url, e);
            PortError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(|e| {
            error!("Failed to read response body from {}: {:?}", url, e);
            PortError::Network(e.to_string())
        })?;
        if bytes.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            error!("Unexpected response shape from {}: {:?}", url, e);
            PortError::Unexpected(format!("Failed to decode response: {}", e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> PortResult<T> {
        let value = self.request::<(), T>(Method::GET, path, None).await?;
        expect_body(path, value)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> PortResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.request(Method::POST, path, Some(body)).await?;
        expect_body(path, value)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> PortResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.request(Method::PUT, path, Some(body)).await?;
        expect_body(path, value)
    }

    /// PATCH where the backend may or may not echo the updated resource.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> PortResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE, discarding whatever body comes back.
    pub async fn delete(&self, path: &str) -> PortResult<()> {
        self.request::<(), serde_json::Value>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    /// POST where the response body is irrelevant.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> PortResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.request::<B, serde_json::Value>(Method::POST, path, Some(body))
            .await
            .map(|_| ())
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Turns an absent body into an error for calls that must return one.
pub fn expect_body<T>(path: &str, value: Option<T>) -> PortResult<T> {
    value.ok_or_else(|| PortError::Unexpected(format!("Empty response from {}", path)))
}

/// Percent-encodes one path segment so identifiers cannot alter the route.
pub fn segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

/// Builds the error for a non-2xx response.
///
/// The message is the body's `detail` field (stringified when it is not a
/// string), then the status text, then a generic fallback.
pub fn error_from_response(status: StatusCode, body: &[u8]) -> PortError {
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .filter(|d| !d.is_null())
        .map(|d| match d {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .filter(|d| !d.is_empty());

    let message = detail
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());

    match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized(message),
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        _ => PortError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn detail_string_becomes_the_message() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            br#"{"detail":"Phone number already registered"}"#,
        );
        assert_eq!(
            err,
            PortError::Api {
                status: 400,
                message: "Phone number already registered".to_string()
            }
        );
    }

    #[test]
    fn structured_detail_is_stringified() {
        let err = error_from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"detail":[{"loc":["body","phone"],"msg":"field required"}]}"#,
        );
        assert_matches!(
            err,
            PortError::Api { status: 422, message } if message.contains("field required")
        );
    }

    #[test]
    fn status_text_is_the_fallback() {
        let err = error_from_response(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(
            err,
            PortError::Api {
                status: 500,
                message: "Internal Server Error".to_string()
            }
        );
    }

    #[test]
    fn empty_detail_falls_back_to_status_text() {
        let err = error_from_response(StatusCode::BAD_REQUEST, br#"{"detail":""}"#);
        assert_eq!(
            err,
            PortError::Api {
                status: 400,
                message: "Bad Request".to_string()
            }
        );
    }

    #[test]
    fn unauthorized_keeps_server_detail() {
        let err = error_from_response(
            StatusCode::UNAUTHORIZED,
            br#"{"detail":"Incorrect phone number or password"}"#,
        );
        assert_eq!(
            err,
            PortError::Unauthorized("Incorrect phone number or password".to_string())
        );
        assert!(err.is_auth_failure());
    }

    #[test]
    fn missing_resources_map_to_not_found() {
        let err = error_from_response(StatusCode::NOT_FOUND, br#"{"detail":"Match not found"}"#);
        assert_eq!(err, PortError::NotFound("Match not found".to_string()));
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(segment("65f0c1"), "65f0c1");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
