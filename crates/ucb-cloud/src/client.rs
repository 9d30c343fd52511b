//! HTTP plumbing shared by every remote call.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{RemoteError, RemoteResult};
use crate::model::RemoteProject;
use crate::session::SessionContext;

/// Production endpoint of the build service.
pub const DEFAULT_ENDPOINT: &str = "https://build-api.cloud.unity3d.com/api/v1";
/// Header carrying the per-invocation trace id.
pub const HEADER_REQUEST_ID: &str = "x-request-id";
/// Page size used by search queries; later pages are never fetched.
pub const SEARCH_PAGE_SIZE: u32 = 500;

const MAX_ERROR_BODY: usize = 512;

/// Organisation credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key placed in the `Authorization` header.
    pub api_key: String,
    /// Organisation identifier used in request paths.
    pub org_id: String,
}

impl Credentials {
    /// Bundle an API key and organisation id.
    #[must_use]
    pub fn new(api_key: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            org_id: org_id.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("org_id", &self.org_id)
            .finish()
    }
}

/// Authenticated client for one organisation of the build service.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: Client,
    endpoint: Url,
    credentials: Credentials,
}

impl CloudClient {
    /// Wrap an HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidEndpoint`] when `endpoint` cannot carry path segments.
    pub fn new(http: Client, endpoint: Url, credentials: Credentials) -> RemoteResult<Self> {
        if endpoint.cannot_be_a_base() {
            return Err(RemoteError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
            });
        }
        Ok(Self {
            http,
            endpoint,
            credentials,
        })
    }

    /// Build the HTTP client used for a CLI invocation.
    ///
    /// # Errors
    ///
    /// Returns an error when the request id is not a valid header value or the
    /// client cannot be constructed.
    pub fn build_http_client(timeout: Duration, request_id: &str) -> RemoteResult<Client> {
        let mut default_headers = HeaderMap::new();
        let request_id =
            HeaderValue::from_str(request_id).map_err(|_| RemoteError::InvalidHeader {
                header: HEADER_REQUEST_ID,
            })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| RemoteError::Client { source })
    }

    /// Base endpoint requests are resolved against.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Organisation the client is scoped to.
    #[must_use]
    pub fn org_id(&self) -> &str {
        &self.credentials.org_id
    }

    /// Session bound to one remote project.
    #[must_use]
    pub fn for_project(&self, project_id: impl Into<String>) -> SessionContext {
        SessionContext::new(self.clone(), project_id)
    }

    /// Raw project records of the organisation.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub async fn list_project_records(&self) -> RemoteResult<Vec<Value>> {
        let url = self.url(&["orgs", self.org_id(), "projects"], &[])?;
        self.get_records(url).await
    }

    /// Projects of the organisation; records without an id are skipped.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode failures.
    pub async fn list_projects(&self) -> RemoteResult<Vec<RemoteProject>> {
        let records = self.list_project_records().await?;
        Ok(records.iter().filter_map(RemoteProject::from_record).collect())
    }

    pub(crate) fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> RemoteResult<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| RemoteError::InvalidEndpoint {
                    endpoint: self.endpoint.to_string(),
                })?;
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request and decode the body as JSON; an empty body decodes as `null`.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> RemoteResult<Value> {
        debug!(%method, %url, "sending request");
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, format!("Basic {}", self.credentials.api_key));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| RemoteError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;
        debug!(%method, %url, %status, bytes = text.len(), "response received");

        if !status.is_success() {
            return Err(RemoteError::Status {
                method,
                url,
                status,
                body: truncate(text.trim(), MAX_ERROR_BODY),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| RemoteError::Decode {
            method,
            url,
            detail: err.to_string(),
        })
    }

    /// `GET` a resource whose body must be a JSON array.
    pub(crate) async fn get_records(&self, url: Url) -> RemoteResult<Vec<Value>> {
        match self.send(Method::GET, url.clone(), None).await? {
            Value::Array(records) => Ok(records),
            Value::Null => Ok(Vec::new()),
            other => Err(RemoteError::Decode {
                method: Method::GET,
                url,
                detail: format!("expected an array of records, found {}", kind(&other)),
            }),
        }
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
