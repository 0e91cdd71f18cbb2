//! Admin API client.
//!
//! A thin wrapper over `reqwest` that owns the session credential and the
//! base URL. The client is constructed once from explicit connection
//! parameters and passed down the call chain; there is no shared mutable
//! instance. Every creation endpoint wraps its resource as `{"data": ...}`;
//! the singleton update endpoint is the one documented exception.

use crate::error::{Error, Result};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default Admin API base URL.
pub const DEFAULT_ADMIN_API_URL: &str = "https://admin.starlightcms.io/v2/";

/// Standard `{"data": ...}` envelope of Admin API responses.
#[derive(Debug, Deserialize)]
pub struct ApiResource<T> {
    pub data: T,
}

/// An organization visible to the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// A workspace inside an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// Identity fields of a resource returned by a creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    pub id: i64,
    pub slug: String,
}

/// Identity fields of an uploaded media object, which is keyed by title.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedMedia {
    pub id: i64,
    pub title: String,
}

/// Authenticated client for the Starlight Admin API.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    /// Creates a client from a base URL and a bearer token.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::InvalidApiUrlError {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::InvalidTokenError {
                reason: "the token contains characters that cannot be sent in a header".to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| Error::InvalidApiUrlError {
            url: format!("{}{path}", self.base_url),
            reason: e.to_string(),
        })
    }

    async fn execute(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.endpoint(path)?;
        debug!("{method} {url}");

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let request_body = body.map(Value::to_string).unwrap_or_default();
        Self::into_json(method, url, response, request_body).await
    }

    async fn into_json(
        method: Method,
        url: Url,
        response: reqwest::Response,
        request_body: String,
    ) -> Result<Value> {
        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            return Err(Error::ApiError {
                status: status.as_u16(),
                method: method.to_string(),
                url: url.to_string(),
                request_body,
                response_body,
            });
        }

        if status == StatusCode::NO_CONTENT || response_body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response_body)?)
    }

    /// Issues a GET request and returns the parsed response body.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        self.execute(Method::GET, path, None).await
    }

    /// Issues a POST request with a JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(Method::POST, path, Some(body)).await
    }

    /// Issues a PATCH request with a JSON body.
    pub async fn patch_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(Method::PATCH, path, Some(body)).await
    }

    /// Issues a multipart POST request. `body_description` stands in for the
    /// request body in failure diagnostics, since a multipart stream cannot
    /// be replayed into an error message.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        body_description: String,
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        debug!("POST (multipart) {url}");

        let response = self.http.post(url.clone()).multipart(form).send().await?;
        Self::into_json(Method::POST, url, response, body_description).await
    }

    /// Looks up an organization by slug among those visible to the user.
    pub async fn organization(&self, slug: &str) -> Result<Organization> {
        let response = self.get_json("organizations?limit=100").await?;
        let organizations: ApiResource<Vec<Organization>> = serde_json::from_value(response)?;

        organizations
            .data
            .into_iter()
            .find(|organization| organization.slug == slug)
            .ok_or_else(|| Error::UnknownOrganizationError { slug: slug.to_string() })
    }

    /// Looks up a workspace by slug inside an organization.
    pub async fn workspace(&self, organization: &Organization, slug: &str) -> Result<Workspace> {
        let response = self
            .get_json(&format!("organizations/{}/workspaces", organization.slug))
            .await?;
        let workspaces: ApiResource<Vec<Workspace>> = serde_json::from_value(response)?;

        workspaces
            .data
            .into_iter()
            .find(|workspace| workspace.slug == slug)
            .ok_or_else(|| Error::UnknownWorkspaceError {
                slug: slug.to_string(),
                organization: organization.slug.clone(),
            })
    }
}
