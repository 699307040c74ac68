//! Authenticated Redfish traversal client.
//!
//! The client authenticates once per session: a successful
//! `POST /SessionService/Sessions` yields an `X-Auth-Token` attached to
//! every subsequent request; anything else drops the session to Basic
//! auth. The fallback is soft - feature-reduced BMCs without a Session
//! Service are a valid configuration, not a connection failure.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BmcConfig;
use crate::redfish::model::SessionRequest;

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const SESSIONS_PATH: &str = "/SessionService/Sessions";

#[derive(Debug, Error)]
pub enum RedfishError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} for {path}")]
    UnexpectedStatus { path: String, status: StatusCode },

    #[error("invalid JSON from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// How requests in this session are authenticated, decided once at
/// session bootstrap and carried explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    Session { token: String },
    Basic,
}

pub struct RedfishClient {
    http: reqwest::Client,
    origin: String,
    root: String,
    username: String,
    password: String,
    auth: AuthStrategy,
}

impl RedfishClient {
    /// Builds the HTTP client and performs session bootstrap.
    pub async fn connect(cfg: &BmcConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("OData-Version", HeaderValue::from_static("4.0"));

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(cfg.http_timeout())
            .default_headers(headers)
            .build()
            .context("failed to build Redfish HTTP client")?;

        let mut client = Self {
            http,
            origin: cfg.base_url.trim_end_matches('/').to_string(),
            root: cfg.redfish_root(),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            auth: AuthStrategy::Basic,
        };
        client.auth = client.bootstrap_session().await;
        Ok(client)
    }

    pub fn auth(&self) -> &AuthStrategy {
        &self.auth
    }

    async fn bootstrap_session(&self) -> AuthStrategy {
        match self.session_probe().await {
            Ok(resp) if resp.status() == StatusCode::CREATED => {
                let token = resp
                    .headers()
                    .get(AUTH_TOKEN_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                if token.is_empty() {
                    warn!("session created without {AUTH_TOKEN_HEADER} header, using Basic auth");
                    AuthStrategy::Basic
                } else {
                    info!("Redfish session established");
                    AuthStrategy::Session {
                        token: token.to_string(),
                    }
                }
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "Session Service unavailable, using Basic auth");
                AuthStrategy::Basic
            }
            Err(err) => {
                warn!(error = %err, "session authentication failed, using Basic auth");
                AuthStrategy::Basic
            }
        }
    }

    /// Raw session-creation POST with the configured credentials in the
    /// body and no authentication header attached.
    pub async fn session_probe(&self) -> Result<Response, RedfishError> {
        let url = format!("{}{}", self.root, SESSIONS_PATH);
        let body = SessionRequest {
            user_name: &self.username,
            password: &self.password,
        };
        self.http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| RedfishError::Transport {
                path: SESSIONS_PATH.to_string(),
                source,
            })
    }

    /// Joins a path onto the service root, or onto the origin when it is
    /// an absolute `@odata.id` link.
    fn url_for(&self, path: &str) -> String {
        if path.starts_with("/redfish/") {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}{}", self.root, path)
        }
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            AuthStrategy::Session { token } => builder.header(AUTH_TOKEN_HEADER, token),
            AuthStrategy::Basic => builder.basic_auth(&self.username, Some(&self.password)),
        }
    }

    /// Single GET with the session's auth attached. No retries.
    pub async fn get(&self, path: &str) -> Result<Response, RedfishError> {
        let url = self.url_for(path);
        let resp = self
            .with_auth(self.http.get(&url))
            .send()
            .await
            .map_err(|source| RedfishError::Transport {
                path: path.to_string(),
                source,
            })?;
        info!(method = "GET", %url, status = %resp.status(), "redfish request");
        Ok(resp)
    }

    /// GET expecting HTTP 200 with a JSON body of the given shape.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RedfishError> {
        let resp = self.get(path).await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(RedfishError::UnexpectedStatus {
                path: path.to_string(),
                status,
            });
        }
        let body = resp
            .text()
            .await
            .map_err(|source| RedfishError::Transport {
                path: path.to_string(),
                source,
            })?;
        debug!(path, bytes = body.len(), "redfish response body");
        serde_json::from_str(&body).map_err(|source| RedfishError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// Single POST with a JSON body. Returns the raw response; callers
    /// decide which statuses are acceptable.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Response, RedfishError> {
        let url = self.url_for(path);
        let resp = self
            .with_auth(self.http.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|source| RedfishError::Transport {
                path: path.to_string(),
                source,
            })?;
        info!(method = "POST", %url, status = %resp.status(), "redfish request");
        Ok(resp)
    }
}
