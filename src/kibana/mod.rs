pub mod ready;
pub mod schema;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::model::KibanaSettings;

const NO_CONTENT: u16 = 204;

/// Method, target and transport options for one call. Credentials may be
/// embedded in the URL; they are sent as basic auth, never as part of the URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    /// Sent after the defaults; a header with the same name replaces them.
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Status code and decoded JSON body of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: Value,
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid request to {url}: {reason}")]
    Invalid { url: String, reason: String },
    #[error("request to {url} timed out{}", .timeout.map(|t| format!(" after {:?}", t)).unwrap_or_default())]
    Timeout {
        url: String,
        timeout: Option<Duration>,
    },
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response from {url} (status {status}) is not JSON: {source}")]
    Decode {
        url: String,
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// Failures that may clear up on their own once the server finishes
    /// starting. An invalid request never will.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RequestError::Invalid { .. })
    }
}

/// Issue one request and collect the whole JSON response.
///
/// `Content-Type: application/json` and `kbn-xsrf: true` are always sent
/// unless `spec.headers` overrides them. A `204 No Content` response decodes
/// to `null`; any other non-JSON body, empty included, is a
/// [`RequestError::Decode`].
pub async fn request(
    client: &reqwest::Client,
    spec: &RequestSpec,
    body: Option<&Value>,
) -> Result<ResponseEnvelope, RequestError> {
    let invalid = |reason: String| RequestError::Invalid {
        url: redact(&spec.url),
        reason,
    };

    let mut url = Url::parse(&spec.url).map_err(|e| invalid(e.to_string()))?;
    let username = url.username().to_string();
    let password = url.password().map(str::to_string);
    let has_credentials = !username.is_empty() || password.is_some();
    if has_credentials {
        url.set_username("")
            .and_then(|_| url.set_password(None))
            .map_err(|_| invalid("cannot strip credentials from URL".to_string()))?;
    }
    let target = url.to_string();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("kbn-xsrf"),
        HeaderValue::from_static("true"),
    );
    for (name, value) in &spec.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(name, value);
    }

    let mut builder = client.request(spec.method.clone(), url).headers(headers);
    if has_credentials {
        builder = builder.basic_auth(username, password);
    }
    if let Some(timeout) = spec.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(body) = body {
        let bytes = serde_json::to_vec(body).map_err(|e| invalid(e.to_string()))?;
        builder = builder.body(bytes);
    }

    debug!(method = %spec.method, url = %target, "sending request");
    let transport = |source: reqwest::Error| {
        if source.is_timeout() {
            RequestError::Timeout {
                url: target.clone(),
                timeout: spec.timeout,
            }
        } else {
            RequestError::Network {
                url: target.clone(),
                source,
            }
        }
    };

    let response = builder.send().await.map_err(transport)?;
    let status = response.status().as_u16();
    let bytes = response.bytes().await.map_err(transport)?;

    let body = if status == NO_CONTENT {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).map_err(|source| RequestError::Decode {
            url: target.clone(),
            status,
            source,
        })?
    };
    debug!(url = %target, status, "response received");

    Ok(ResponseEnvelope { status, body })
}

/// Drop any `user:password@` part before a URL lands in an error or a log.
fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// The dashboard endpoints the migration talks to.
#[derive(Debug, Clone)]
pub struct KibanaClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
    status_timeout: Duration,
}

impl KibanaClient {
    pub fn new(settings: &KibanaSettings) -> Result<Self, RequestError> {
        let invalid = |reason: String| RequestError::Invalid {
            url: redact(&settings.url),
            reason,
        };
        let mut base_url = Url::parse(&settings.url).map_err(|e| invalid(e.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let status_timeout = settings.poll_timeout().map_err(|e| invalid(format!("{:#}", e)))?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            username: settings.username.clone(),
            password: settings.password.clone(),
            status_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base_url
            .join(path)
            .map_err(|e| RequestError::Invalid {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }

    /// Endpoint URL carrying the dashboard credentials as userinfo.
    fn authenticated(&self, path: &str) -> Result<String, RequestError> {
        let mut url = self.endpoint(path)?;
        url.set_username(&self.username)
            .and_then(|_| url.set_password(Some(&self.password)))
            .map_err(|_| RequestError::Invalid {
                url: redact(url.as_str()),
                reason: "URL cannot carry credentials".to_string(),
            })?;
        Ok(url.to_string())
    }

    /// `GET /api/status`, unauthenticated, bounded by the poll timeout.
    pub async fn status(&self) -> Result<ResponseEnvelope, RequestError> {
        let spec = RequestSpec::get(self.endpoint("api/status")?.to_string()).timeout(self.status_timeout);
        request(&self.http, &spec, None).await
    }

    /// `PUT /api/fleet/settings` with the Fleet Server host list.
    pub async fn update_fleet_server_hosts(
        &self,
        hosts: &[String],
    ) -> Result<ResponseEnvelope, RequestError> {
        let spec = RequestSpec::new(Method::PUT, self.authenticated("api/fleet/settings")?);
        let body = serde_json::json!({ "fleet_server_hosts": hosts });
        request(&self.http, &spec, Some(&body)).await
    }

    /// `POST /api/apm/fleet/apm_server_schema` with [`schema::apm_server_schema`].
    pub async fn save_apm_server_schema(&self) -> Result<ResponseEnvelope, RequestError> {
        let spec = RequestSpec::new(
            Method::POST,
            self.authenticated("api/apm/fleet/apm_server_schema")?,
        );
        let body = serde_json::json!({ "schema": schema::apm_server_schema() });
        request(&self.http, &spec, Some(&body)).await
    }
}

impl ready::StatusProbe for KibanaClient {
    async fn probe(&self) -> Result<u16, RequestError> {
        Ok(self.status().await?.status)
    }
}
