//! Thin request wrapper around `reqwest`.
//!
//! One call, one request: no retry, no timeout, no cancellation. Every
//! failure comes back as a reported [`AppError`] whose status tells the
//! failure class apart:
//! - `600` the request never completed (transport error)
//! - `601` a `200` response whose body is not the expected JSON
//! - `4xx` invalid input, anything else an API error

use std::collections::BTreeMap;

use common::utils::url_to_resource;
use common::{AppError, BoxError};
use configs::ApiConfig;
use models::Entity;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

pub const STATUS_NETWORK_ERROR: u16 = 600;
pub const STATUS_PARSE_ERROR: u16 = 601;

/// Serializable description of an outgoing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { url: url.into(), method: method.into(), headers: BTreeMap::new(), body: None }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new("POST", url).with_body(body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// What is kept of a raw response when attaching it to an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSummary {
    pub status: u16,
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl From<&Response> for ResponseSummary {
    fn from(resp: &Response) -> Self {
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self { status: resp.status().as_u16(), url: resp.url().to_string(), headers }
    }
}

/// User message for a failed request to `url` that ended with `status`.
pub fn error_message(url: &str, status: u16) -> String {
    let resource = url_to_resource(url);
    if status == 404 {
        return format!("{resource} not found");
    }
    let reason = if (400..500).contains(&status) { "Invalid input" } else { "API error" };
    format!("Requesting {resource} failed: {reason}")
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    label: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn from_config(cfg: &ApiConfig) -> Self {
        Self::new(cfg.url.clone())
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url, label: None }
    }

    /// Label attached to the errors this client reports.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Client sharing the connection pool, reporting errors as `entity`.
    pub fn for_entity(&self, entity: &Entity) -> Self {
        self.clone().with_label(entity.label())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Absolute URL of `path` below the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Result<Value, AppError> {
        self.request(RequestDescriptor::get(self.url(path))).await
    }

    /// Issue the request and return the JSON body of a `200` response.
    pub async fn request(&self, req: RequestDescriptor) -> Result<Value, AppError> {
        let method = Method::from_bytes(req.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| self.fail(&req, STATUS_NETWORK_ERROR, Some(e.into()), empty_body(), None))?;
        debug!(method = %method, url = %req.url, "sending request");

        let mut builder = self.http.request(method, &req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                return Err(self.fail(&req, STATUS_NETWORK_ERROR, Some(e.into()), empty_body(), None))
            }
        };
        let summary = ResponseSummary::from(&resp);
        let status = summary.status;
        debug!(status, url = %req.url, "response received");

        let body = resp.text().await;
        if status == 200 {
            let parent: BoxError = match body {
                Ok(text) => match serde_json::from_str::<Value>(&text) {
                    Ok(value) => return Ok(value),
                    Err(e) => e.into(),
                },
                Err(e) => e.into(),
            };
            return Err(self.fail(&req, STATUS_PARSE_ERROR, Some(parent), empty_body(), Some(summary)));
        }

        let err_body = body
            .ok()
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .unwrap_or_else(empty_body);
        Err(self.fail(&req, status, None, err_body, Some(summary)))
    }

    /// Like [`ApiClient::request`], deserializing the body into `T`. A body
    /// that does not fit `T` is reported with status `601`.
    pub async fn request_as<T: DeserializeOwned>(&self, req: RequestDescriptor) -> Result<T, AppError> {
        let value = self.request(req.clone()).await?;
        serde_json::from_value(value)
            .map_err(|e| self.fail(&req, STATUS_PARSE_ERROR, Some(e.into()), empty_body(), None))
    }

    fn fail(
        &self,
        req: &RequestDescriptor,
        status: u16,
        parent: Option<BoxError>,
        err_body: Value,
        response: Option<ResponseSummary>,
    ) -> AppError {
        let mut err = AppError::new(error_message(&req.url, status))
            .with_status(status)
            .with_extra("err", err_body)
            .with_extra("request", req);
        if let Some(response) = response {
            err = err.with_extra("response", response);
        }
        if let Some(parent) = parent {
            err = err.with_parent(parent);
        }
        if let Some(label) = &self.label {
            err = err.with_label(label.clone());
        }
        err.report()
    }
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}
