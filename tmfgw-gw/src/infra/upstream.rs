//! Upstream forwarding over HTTP.
//!
//! Forwards one translated operation to the backend with a bounded
//! per-attempt timeout, bounded retry, incremental backoff, and static
//! credential injection. A response with any status code, including 4xx/5xx,
//! is a successful forward outcome; only exhausting every attempt without any
//! response is a transport failure.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use tmfgw_sdk::{GatewayError, HttpMethod, RetryPolicy, UpstreamHealth, UpstreamResponse};

use crate::config::GatewayConfig;

/// Forwards translated operations to the configured backend.
///
/// Stateless per call after construction; needs no locking.
pub struct UpstreamGateway {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    bearer_token: Option<String>,
    api_key: Option<String>,
    api_key_header: String,
}

impl UpstreamGateway {
    /// Create a gateway from the configuration.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created (should never happen with
    /// valid config).
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        #[allow(clippy::expect_used)]
        // Safe: reqwest client creation only fails with invalid TLS config
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.upstream_timeout_ms))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.backend_base_url.trim_end_matches('/').to_owned(),
            retry: RetryPolicy::from_retry_count(
                config.upstream_retry_count,
                config.upstream_backoff_base_ms,
            ),
            bearer_token: config.upstream_bearer_token.clone(),
            api_key: config.upstream_api_key.clone(),
            api_key_header: config.api_key_header.clone(),
        }
    }

    /// Forward a request to the backend and decode its response.
    ///
    /// # Errors
    /// Returns [`GatewayError::UpstreamUnavailable`] when no response could
    /// be obtained from the backend after exhausting all attempts.
    #[instrument(skip_all, fields(method = %method, path = %path, target_url))]
    pub async fn forward(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&BTreeMap<String, String>>,
        body: Option<&Value>,
        headers: &BTreeMap<String, String>,
    ) -> Result<UpstreamResponse, GatewayError> {
        let start = std::time::Instant::now();
        let url = self.build_url(path, query);
        tracing::Span::current().record("target_url", url.as_str());

        let header_map = self.build_headers(headers);
        let mut last_error = String::new();

        for attempt in 0..self.retry.max_attempts {
            let mut builder = self
                .client
                .request(to_reqwest_method(method), &url)
                .headers(header_map.clone());
            if let Some(json_body) = body {
                builder = builder.json(json_body);
            }

            match builder.send().await {
                Ok(response) => {
                    let status_code = response.status().as_u16();
                    let decoded = decode_body(response).await?;

                    // Duration in ms is always small enough for u64 in practice
                    #[allow(clippy::cast_possible_truncation)]
                    let duration_ms = start.elapsed().as_millis() as u64;

                    tracing::info!(
                        status_code,
                        duration_ms,
                        attempt = attempt + 1,
                        "forward completed"
                    );

                    return Ok(UpstreamResponse {
                        body: decoded,
                        status_code,
                        attempt: attempt + 1,
                        duration_ms,
                    });
                }
                Err(error) => {
                    last_error = transport_error_message(&error);
                    if attempt + 1 < self.retry.max_attempts {
                        let delay = self.retry.delay_after_attempt(attempt);
                        warn!(
                            attempt = attempt + 1,
                            delay_ms = delay,
                            error = %last_error,
                            "transport failure, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        Err(GatewayError::upstream_unavailable(format!(
            "failed to reach upstream {}: {last_error}",
            self.base_url
        )))
    }

    /// Probe the backend base URL once, best-effort.
    ///
    /// Any response, regardless of status, means the backend is reachable.
    #[instrument(skip(self))]
    pub async fn health(&self) -> UpstreamHealth {
        let header_map = self.build_headers(&BTreeMap::new());
        let probe = self
            .client
            .get(format!("{}/", self.base_url))
            .headers(header_map)
            .send()
            .await;

        match probe {
            Ok(response) => UpstreamHealth {
                reachable: true,
                status_code: Some(response.status().as_u16()),
            },
            Err(error) => {
                debug!(error = %error, "upstream health probe failed");
                UpstreamHealth {
                    reachable: false,
                    status_code: None,
                }
            }
        }
    }

    /// Build the absolute target URL from the base URL, path, and query.
    fn build_url(&self, path: &str, query: Option<&BTreeMap<String, String>>) -> String {
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };

        let mut url = format!("{}{path}", self.base_url);

        if let Some(params) = query {
            if !params.is_empty() {
                let query_str: String = params
                    .iter()
                    .map(|(k, v)| {
                        format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
                    })
                    .collect::<Vec<_>>()
                    .join("&");
                url = format!("{url}?{query_str}");
            }
        }

        url
    }

    /// Build request headers: static credentials first, then caller headers,
    /// so a per-request `Authorization` overrides the static default.
    fn build_headers(&self, caller: &BTreeMap<String, String>) -> HeaderMap {
        let mut map = HeaderMap::new();

        if let Some(token) = &self.bearer_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                map.insert(AUTHORIZATION, value);
            }
        }
        if let Some(key) = &self.api_key {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(self.api_key_header.as_bytes()),
                HeaderValue::from_str(key),
            ) {
                map.insert(name, value);
            }
        }

        for (name, value) in caller {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!(header = %name, "dropping unrepresentable forwarded header"),
            }
        }

        map
    }
}

/// Decode a backend response: JSON content-type parses to a structure,
/// anything else (or a parse failure) wraps the raw text.
async fn decode_body(response: reqwest::Response) -> Result<Value, GatewayError> {
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));

    let text = response.text().await.map_err(|e| {
        GatewayError::upstream_unavailable(format!("failed to read response body: {e}"))
    })?;

    if is_json {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return Ok(value);
        }
    }
    Ok(json!({ "raw": text }))
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn transport_error_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("timeout: {error}")
    } else if error.is_connect() {
        format!("connection error: {error}")
    } else {
        format!("request error: {error}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway_with_base(base: &str) -> UpstreamGateway {
        UpstreamGateway::new(&GatewayConfig {
            backend_base_url: base.to_owned(),
            ..GatewayConfig::default()
        })
    }

    #[test]
    fn build_url_joins_base_and_path() {
        let gateway = gateway_with_base("http://backend:8000/api/");
        assert_eq!(
            gateway.build_url("product", None),
            "http://backend:8000/api/product"
        );
        assert_eq!(
            gateway.build_url("/product/42", None),
            "http://backend:8000/api/product/42"
        );
    }

    #[test]
    fn build_url_encodes_query_params() {
        let gateway = gateway_with_base("http://backend:8000");
        let mut query = BTreeMap::new();
        query.insert("name".to_owned(), "a widget".to_owned());
        query.insert("offset".to_owned(), "0".to_owned());

        let url = gateway.build_url("/items", Some(&query));
        assert_eq!(url, "http://backend:8000/items?name=a%20widget&offset=0");
    }

    #[test]
    fn caller_authorization_overrides_static_bearer() {
        let gateway = UpstreamGateway::new(&GatewayConfig {
            backend_base_url: "http://backend:8000".to_owned(),
            upstream_bearer_token: Some("static-token".to_owned()),
            ..GatewayConfig::default()
        });

        let empty = BTreeMap::new();
        let headers = gateway.build_headers(&empty);
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap(),
            "Bearer static-token"
        );

        let mut caller = BTreeMap::new();
        caller.insert("Authorization".to_owned(), "Bearer inbound".to_owned());
        let headers = gateway.build_headers(&caller);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer inbound");
    }

    #[test]
    fn api_key_header_name_is_configurable() {
        let gateway = UpstreamGateway::new(&GatewayConfig {
            backend_base_url: "http://backend:8000".to_owned(),
            upstream_api_key: Some("s3cret".to_owned()),
            api_key_header: "X-Inventory-Key".to_owned(),
            ..GatewayConfig::default()
        });

        let headers = gateway.build_headers(&BTreeMap::new());
        assert_eq!(headers.get("x-inventory-key").unwrap(), "s3cret");
    }
}
