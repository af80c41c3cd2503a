//! HTTP client for the Bodo2 backend.
//!
//! Uses reqwest against the configured base URL. Every request carries the
//! session's `space_id` when one is set. Responses are checked for status
//! before decoding so backend error bodies surface as `ApiError::Status`.

pub mod accounts;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::ApiError;
use crate::session::SessionContext;

/// Cloneable handle: the inner reqwest client is reference-counted.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: url::Url,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionContext) -> Result<Self, ApiError> {
        let base_url = config.base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Resolve an endpoint path (no leading slash) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<url::Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let mut builder = self.http.request(method, url).query(query);
        if let Some(space) = self.session.space_id() {
            builder = builder.query(&[("space_id", space)]);
        }
        Ok(builder)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        log::debug!("GET {} {:?}", path, query);
        let resp = self.request(reqwest::Method::GET, path, query)?.send().await?;
        decode(resp).await
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        log::debug!("{} {}", method, path);
        let resp = self
            .request(method, path, &[])?
            .json(body)
            .send()
            .await?;
        decode(resp).await
    }

    pub(crate) async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<(), ApiError> {
        log::debug!("DELETE {}", path);
        let resp = self
            .request(reqwest::Method::DELETE, path, query)?
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        check_status(status, &text)
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    parse_body(status, &text)
}

/// Status check, then JSON decode of the body.
fn parse_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    check_status(status, body)?;
    Ok(serde_json::from_str(body)?)
}

fn check_status(status: u16, body: &str) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    Err(ApiError::Status {
        status,
        message: error_message(body),
    })
}

/// Pull the human-readable part out of an error body. The backend uses
/// `toast` on mutations and `message` elsewhere; fall back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["toast", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}
