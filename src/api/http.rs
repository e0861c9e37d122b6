//! HTTPS transport over `reqwest`.

use crate::api::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::HostConfig;
use crate::error::Result;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::warn;

/// Blocking HTTPS client for one host.
///
/// Certificates are verified only for the public GitHub API; self-hosted
/// enterprise hosts commonly run with internal CAs and are accepted as-is.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client with the TLS policy for `host`.
    pub fn for_host(host: &HostConfig) -> Result<Self> {
        let verify = host.is_public_github();
        if !verify {
            warn!(host = host.base_url(), "TLS certificate verification disabled for enterprise host");
        }

        let client = Client::builder()
            .default_headers(Self::headers())
            .danger_accept_invalid_certs(!verify)
            .build()?;
        Ok(Self { client })
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("git-mover/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest<'_>) -> Result<ApiResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        let mut builder = builder
            .header(ACCEPT, request.accept)
            .basic_auth(
                &request.credentials.username,
                Some(&request.credentials.token),
            );
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(ApiResponse { status, body })
    }
}
