//! Authenticated access to a host's REST API.
//!
//! [`ApiGateway`] binds one [`HostConfig`] to a [`Transport`] and enforces the
//! response-code contract: every call names the status range it expects, and
//! anything outside that range comes back as [`MoverError::Api`] carrying the
//! status and body, so callers can branch on e.g. 404 or 422.
//!
//! # Example
//!
//! ```rust,no_run
//! use git_mover::api::{ApiCall, ApiGateway};
//! use git_mover::config::{Credentials, HostConfig};
//!
//! let host = HostConfig::new("https://github.com", Credentials::new("me", "ghp_token"))?;
//! let api = ApiGateway::connect(host)?;
//! let response = api.send(ApiCall::get("repos/acme/widgets"))?;
//! println!("{}", response.body);
//! # Ok::<(), git_mover::error::MoverError>(())
//! ```

mod http;

pub use http::HttpTransport;

use crate::config::{Credentials, HostConfig};
use crate::error::{MoverError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Default `Accept` header for GitHub REST calls.
pub const DEFAULT_ACCEPT: &str = "application/vnd.github.v3+json";

/// Delay applied before calls that request it, to stay under host rate limits.
pub const DEFAULT_PRE_DELAY: Duration = Duration::from_secs(1);

/// Page size used for list endpoints.
pub const PAGE_SIZE: usize = 100;

/// HTTP methods used against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request handed to a [`Transport`].
#[derive(Debug)]
pub struct ApiRequest<'a> {
    pub method: Method,
    /// Path relative to the API root.
    pub path: &'a str,
    /// Absolute URL.
    pub url: String,
    pub credentials: &'a Credentials,
    pub accept: &'a str,
    pub body: Option<&'a Value>,
}

/// Status and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Raw request execution against a host.
///
/// Implementations only move bytes; status validation happens in
/// [`ApiGateway::send`].
pub trait Transport {
    fn execute(&self, request: &ApiRequest<'_>) -> Result<ApiResponse>;
}

/// One call to send through an [`ApiGateway`].
#[derive(Debug, Clone)]
pub struct ApiCall {
    method: Method,
    path: String,
    body: Option<Value>,
    accept: Option<String>,
    expected: RangeInclusive<u16>,
    pre_delay: bool,
}

impl ApiCall {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            accept: None,
            expected: 200..=299,
            pre_delay: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the `Accept` header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Set the accepted status range (default `200..=299`).
    pub fn expect(mut self, range: RangeInclusive<u16>) -> Self {
        self.expected = range;
        self
    }

    /// Wait before dispatching this call.
    pub fn pre_delay(mut self) -> Self {
        self.pre_delay = true;
        self
    }
}

/// Authenticated API access to one host.
pub struct ApiGateway {
    host: HostConfig,
    transport: Box<dyn Transport>,
    pre_delay: Duration,
}

impl ApiGateway {
    /// Create a gateway over an arbitrary transport.
    pub fn new(host: HostConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            host,
            transport,
            pre_delay: DEFAULT_PRE_DELAY,
        }
    }

    /// Create a gateway speaking HTTPS to the host.
    pub fn connect(host: HostConfig) -> Result<Self> {
        let transport = HttpTransport::for_host(&host)?;
        Ok(Self::new(host, Box::new(transport)))
    }

    /// Change the delay used by calls marked with [`ApiCall::pre_delay`].
    pub fn with_pre_delay(mut self, delay: Duration) -> Self {
        self.pre_delay = delay;
        self
    }

    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    /// Send a call and validate the response status.
    pub fn send(&self, call: ApiCall) -> Result<ApiResponse> {
        if call.pre_delay && !self.pre_delay.is_zero() {
            thread::sleep(self.pre_delay);
        }

        let request = ApiRequest {
            method: call.method,
            path: &call.path,
            url: self.host.url_for(&call.path),
            credentials: self.host.credentials(),
            accept: call.accept.as_deref().unwrap_or(DEFAULT_ACCEPT),
            body: call.body.as_ref(),
        };
        debug!(method = %request.method, url = %request.url, "sending API request");
        if let Some(body) = request.body {
            debug!(%body, "request body");
        }

        let response = self.transport.execute(&request)?;
        debug!(status = response.status, body = %response.body, "API response");

        if !call.expected.contains(&response.status) {
            return Err(MoverError::Api {
                method: call.method.to_string(),
                path: call.path,
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    /// GET a resource and decode it.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiCall::get(path))?.json()
    }

    /// GET every page of a list endpoint.
    pub fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let endpoint = format!("{}{}per_page={}&page={}", path, separator, PAGE_SIZE, page);
            let batch: Vec<T> = self.get_json(&endpoint)?;
            let done = batch.len() < PAGE_SIZE;
            items.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Scripted {
        responses: Rc<RefCell<VecDeque<ApiResponse>>>,
        seen: Rc<RefCell<Vec<(Method, String, String, Option<Value>)>>>,
    }

    impl Transport for Scripted {
        fn execute(&self, request: &ApiRequest<'_>) -> Result<ApiResponse> {
            self.seen.borrow_mut().push((
                request.method,
                request.url.clone(),
                request.accept.to_string(),
                request.body.cloned(),
            ));
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| ApiResponse::new(404, "{}")))
        }
    }

    fn gateway(responses: Vec<ApiResponse>) -> (ApiGateway, Scripted) {
        let transport = Scripted::default();
        transport.responses.borrow_mut().extend(responses);
        let host = HostConfig::new("https://github.com", Credentials::new("u", "t")).unwrap();
        let api = ApiGateway::new(host, Box::new(transport.clone())).with_pre_delay(Duration::ZERO);
        (api, transport)
    }

    #[test]
    fn test_send_in_range() {
        let (api, seen) = gateway(vec![ApiResponse::new(201, "{\"id\":1}")]);
        let response = api
            .send(ApiCall::post("orgs/acme/repos").json(json!({"name": "x"})))
            .unwrap();
        assert_eq!(response.status, 201);

        let seen = seen.seen.borrow();
        assert_eq!(seen[0].0, Method::Post);
        assert_eq!(seen[0].1, "https://api.github.com/orgs/acme/repos");
        assert_eq!(seen[0].2, DEFAULT_ACCEPT);
        assert_eq!(seen[0].3, Some(json!({"name": "x"})));
    }

    #[test]
    fn test_out_of_range_status_is_api_error() {
        let (api, _) = gateway(vec![ApiResponse::new(422, "{\"message\":\"Validation Failed\"}")]);
        let err = api.send(ApiCall::post("repos/a/b/keys")).unwrap_err();
        assert!(err.is_status(422));
        match err {
            MoverError::Api { path, body, .. } => {
                assert_eq!(path, "repos/a/b/keys");
                assert!(body.contains("Validation Failed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_expected_range_and_accept() {
        let (api, seen) = gateway(vec![ApiResponse::new(404, "")]);
        let response = api
            .send(
                ApiCall::get("repos/a/b")
                    .expect(200..=404)
                    .accept("application/vnd.github.luke-cage-preview+json"),
            )
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(
            seen.seen.borrow()[0].2,
            "application/vnd.github.luke-cage-preview+json"
        );
    }

    #[test]
    fn test_pagination_stops_on_short_page() {
        let full: Vec<u32> = (0..PAGE_SIZE as u32).collect();
        let (api, seen) = gateway(vec![
            ApiResponse::new(200, serde_json::to_string(&full).unwrap()),
            ApiResponse::new(200, "[1000, 1001]"),
        ]);
        let items: Vec<u32> = api.get_paginated("repos/a/b/releases").unwrap();
        assert_eq!(items.len(), PAGE_SIZE + 2);

        let seen = seen.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].1.ends_with("repos/a/b/releases?per_page=100&page=1"));
        assert!(seen[1].1.ends_with("repos/a/b/releases?per_page=100&page=2"));
    }
}
