//! # API Client
//!
//! The single HTTP gateway to the shop backend.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Flow                                    │
//! │                                                                         │
//! │  service call                                                           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ApiClient::get/post/put/delete                                         │
//! │      │                                                                  │
//! │      ├── session.valid_token()? ── None ──► NotAuthenticated           │
//! │      │                                      (no request sent)           │
//! │      ▼                                                                  │
//! │  base_url.join(path) + Authorization: Bearer <token>                   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  2xx ──► JSON body → T                                                  │
//! │  401 ──► Unauthorized(detail)                                           │
//! │  4xx/5xx ──► Backend { status, detail }                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no retry and no timeout beyond reqwest's defaults.

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionHandle;

/// Query parameters as `(name, value)` pairs.
pub type Query = Vec<(&'static str, String)>;

/// FastAPI error body: `detail` is a string, or a list of field errors for
/// request validation failures (422).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Deserialize)]
struct FieldError {
    msg: String,
    #[serde(default)]
    loc: Vec<serde_json::Value>,
}

impl Detail {
    fn into_message(self) -> String {
        match self {
            Detail::Message(m) => m,
            Detail::Fields(fields) => fields
                .into_iter()
                .map(|f| match f.loc.last().and_then(|v| v.as_str()) {
                    Some(field) => format!("{}: {}", field, f.msg),
                    None => f.msg,
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

// =============================================================================
// API Client
// =============================================================================

/// Thin wrapper around one shared `reqwest::Client`.
///
/// Cloning is cheap: the connection pool and the session are shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionHandle,
}

impl ApiClient {
    /// Creates a client rooted at `base_url`.
    pub fn new(base_url: Url, session: SessionHandle) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    pub fn from_config(config: &ClientConfig, session: SessionHandle) -> ClientResult<Self> {
        Ok(Self::new(config.api_base_url()?, session))
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn bearer_token(&self) -> ClientResult<String> {
        self.session
            .read()
            .await
            .valid_token()
            .map(str::to_owned)
            .ok_or(ClientError::NotAuthenticated)
    }

    async fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.bearer_token().await?;
        let url = self.url(path)?;
        debug!(%method, %url, "Backend request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> ClientResult<T> {
        let request = self.authed(Method::GET, path).await?.query(query);
        decode_json(send(request).await?).await
    }

    /// GET returning the raw body (server-rendered PDFs).
    pub async fn get_bytes(&self, path: &str, query: &Query) -> ClientResult<Vec<u8>> {
        let request = self.authed(Method::GET, path).await?.query(query);
        let response = send(request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authed(Method::POST, path).await?.json(body);
        decode_json(send(request).await?).await
    }

    /// POST without a body (e.g. `invoices/{id}/finalize`).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authed(Method::POST, path).await?;
        decode_json(send(request).await?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authed(Method::PUT, path).await?.json(body);
        decode_json(send(request).await?).await
    }

    /// DELETE; the (usually empty, 204) body is ignored.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let request = self.authed(Method::DELETE, path).await?;
        send(request).await?;
        Ok(())
    }

    /// POST without the bearer token, for `auth/login`.
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!(%url, "Backend request (public)");
        let request = self.http.post(url).json(body);
        decode_json(send(request).await?).await
    }
}

// =============================================================================
// Response Handling
// =============================================================================

async fn send(request: RequestBuilder) -> ClientResult<Response> {
    let response = request.send().await.map_err(|e| {
        error!(error = %e, "Backend unreachable");
        ClientError::from(e)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.detail.into_message(),
        Err(_) => body.trim().chars().take(200).collect(),
    };
    error!(%url, status = status.as_u16(), %message, "Backend returned an error");

    Err(ClientError::from_status(status, message))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Adds `name=value` to `query` when `value` is present.
pub(crate) fn push_opt<V: ToString>(query: &mut Query, name: &'static str, value: Option<V>) {
    if let Some(value) = value {
        query.push((name, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"فاکتور یافت نشد"}"#).unwrap();
        assert_eq!(body.detail.into_message(), "فاکتور یافت نشد");
    }

    #[test]
    fn test_detail_validation_list() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"detail":[
                {"loc":["body","customer_name"],"msg":"field required","type":"missing"},
                {"loc":["body"],"msg":"bad body","type":"x"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            body.detail.into_message(),
            "customer_name: field required; body: bad body"
        );
    }

    #[test]
    fn test_push_opt() {
        let mut q: Query = Vec::new();
        push_opt(&mut q, "size", None::<String>);
        push_opt(&mut q, "limit", Some(50));
        assert_eq!(q, vec![("limit", "50".to_string())]);
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        // Port 9 (discard) is never contacted: the token check comes first.
        let api = ApiClient::new(
            Url::parse("http://127.0.0.1:9/api/").unwrap(),
            crate::session::Session::empty_handle(),
        );
        let result: ClientResult<serde_json::Value> = api.get("carpets", &Vec::new()).await;
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    }
}
