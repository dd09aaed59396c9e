//! Schema acquisition, caching, and reload.
//!
//! The store resolves the backend's OpenAPI document from a remote URL
//! (with conditional-caching headers) or a local file and always lands on a
//! structurally valid snapshot. Acquisition never fails outward: every step
//! that goes wrong silently advances to the next fallback, ending at the
//! empty document.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use tmfgw_sdk::{SchemaInfo, SchemaSnapshot, SchemaSource};

use crate::config::GatewayConfig;

/// Outcome of one remote fetch attempt.
enum RemoteFetch {
    /// A fresh document with its cache validators.
    Fresh {
        document: Value,
        etag: Option<String>,
        last_modified: Option<String>,
    },
    /// The server answered 304; the cached document is still current.
    NotModified,
}

/// Acquires, caches, and reloads the backend schema document.
///
/// All operations serialize on one mutex so concurrent callers never observe
/// a half-updated snapshot; a reload computes the new snapshot fully before
/// replacing the old one.
pub struct SchemaStore {
    url: Option<String>,
    local_path: Option<PathBuf>,
    client: reqwest::Client,
    state: Mutex<Option<Arc<SchemaSnapshot>>>,
}

impl SchemaStore {
    /// Create a store from the gateway configuration.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created (should never happen with
    /// valid config).
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        #[allow(clippy::expect_used)]
        // Safe: reqwest client creation only fails with invalid TLS config
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.schema_fetch_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: config
                .schema_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(ToOwned::to_owned),
            local_path: config.schema_path.clone(),
            client,
            state: Mutex::new(None),
        }
    }

    /// Load the schema, walking the fallback chain. Never fails.
    ///
    /// Priority: explicit local file (only when no URL is configured), then
    /// the remote URL with conditional headers, then the local file as
    /// fallback, then the empty document.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Arc<SchemaSnapshot> {
        let mut state = self.state.lock().await;
        let snapshot = self.resolve(state.as_deref()).await;
        *state = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Return the cached snapshot, loading lazily if none exists yet.
    pub async fn get(&self) -> Arc<SchemaSnapshot> {
        let mut state = self.state.lock().await;
        if let Some(snapshot) = state.as_ref() {
            return Arc::clone(snapshot);
        }
        let snapshot = self.resolve(None).await;
        *state = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Re-run the load, reusing stored conditional-cache headers.
    pub async fn reload(&self) -> Arc<SchemaSnapshot> {
        self.load().await
    }

    /// Describe the currently active source and cache metadata.
    pub async fn source_info(&self) -> SchemaInfo {
        let snapshot = self.get().await;
        let components = snapshot
            .component_schemas()
            .map(|schemas| schemas.keys().cloned().collect())
            .unwrap_or_default();
        SchemaInfo {
            source: snapshot.source.to_string(),
            openapi: snapshot.openapi_version().map(ToOwned::to_owned),
            components,
            etag: snapshot.etag.clone(),
            last_modified: snapshot.last_modified.clone(),
            loaded_at: snapshot.loaded_at,
        }
    }

    /// Walk the fallback chain and produce the next snapshot.
    ///
    /// `previous` supplies the cache validators for a conditional fetch; the
    /// first-ever load is always unconditional.
    async fn resolve(&self, previous: Option<&SchemaSnapshot>) -> Arc<SchemaSnapshot> {
        // 1) Explicit local path wins only when no remote URL is configured.
        if self.url.is_none() {
            if let Some(path) = &self.local_path {
                match read_document(path) {
                    Ok(document) => {
                        return Arc::new(make_snapshot(
                            document,
                            SchemaSource::File(path.clone()),
                            None,
                            None,
                        ));
                    }
                    Err(error) => {
                        debug!(path = %path.display(), %error, "local schema unavailable");
                    }
                }
            }
        }

        // 2) Remote URL, with conditional headers when we have validators.
        if let Some(url) = &self.url {
            match self.fetch_remote(url, previous).await {
                Ok(RemoteFetch::Fresh {
                    document,
                    etag,
                    last_modified,
                }) => {
                    return Arc::new(make_snapshot(
                        document,
                        SchemaSource::Url(url.clone()),
                        etag,
                        last_modified,
                    ));
                }
                Ok(RemoteFetch::NotModified) => {
                    if let Some(prev) = previous {
                        debug!(%url, "schema not modified, keeping cached document");
                        let mut snapshot = prev.clone();
                        snapshot.loaded_at = Utc::now();
                        return Arc::new(snapshot);
                    }
                    // A 304 without a cached document means the server
                    // answered a request we never sent validators for.
                    warn!(%url, "304 with no cached snapshot, falling back");
                }
                Err(error) => {
                    warn!(%url, %error, "schema fetch failed, falling back");
                }
            }
        }

        // 3) Local file fallback (bundled or provided path).
        if let Some(path) = &self.local_path {
            match read_document(path) {
                Ok(document) => {
                    return Arc::new(make_snapshot(
                        document,
                        SchemaSource::File(path.clone()),
                        None,
                        None,
                    ));
                }
                Err(error) => {
                    debug!(path = %path.display(), %error, "fallback schema unavailable");
                }
            }
        }

        // 4) Keep the prior good snapshot over downgrading to the empty
        // document; the empty fallback is for when there is nothing at all.
        if let Some(prev) = previous {
            warn!("all schema sources failed, keeping prior snapshot");
            return Arc::new(prev.clone());
        }
        Arc::new(make_snapshot(
            empty_document(),
            SchemaSource::Empty,
            None,
            None,
        ))
    }

    async fn fetch_remote(
        &self,
        url: &str,
        previous: Option<&SchemaSnapshot>,
    ) -> anyhow::Result<RemoteFetch> {
        let mut request = self.client.get(url);
        if let Some(prev) = previous {
            if let Some(etag) = &prev.etag {
                request = request.header(reqwest::header::IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = &prev.last_modified {
                request = request.header(reqwest::header::IF_MODIFIED_SINCE, last_modified);
            }
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(RemoteFetch::NotModified);
        }
        let response = response.error_for_status()?;

        let etag = header_value(&response, reqwest::header::ETAG);
        let last_modified = header_value(&response, reqwest::header::LAST_MODIFIED);
        let document: Value = response.json().await?;
        Ok(RemoteFetch::Fresh {
            document,
            etag,
            last_modified,
        })
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn make_snapshot(
    document: Value,
    source: SchemaSource,
    etag: Option<String>,
    last_modified: Option<String>,
) -> SchemaSnapshot {
    SchemaSnapshot {
        document,
        source,
        etag,
        last_modified,
        loaded_at: Utc::now(),
    }
}

/// The empty-document fallback every failure path lands on.
fn empty_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "paths": {},
        "components": {}
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn config_with_path(path: PathBuf) -> GatewayConfig {
        GatewayConfig {
            schema_path: Some(path),
            ..GatewayConfig::default()
        }
    }

    #[tokio::test]
    async fn loads_explicit_local_file_when_no_url_configured() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"openapi": "3.0.3", "paths": {{}}, "components": {{"schemas": {{"Item": {{"type": "object"}}}}}}}}"#
        )
        .unwrap();

        let store = SchemaStore::new(&config_with_path(file.path().to_path_buf()));
        let snapshot = store.load().await;

        assert!(matches!(snapshot.source, SchemaSource::File(_)));
        assert_eq!(snapshot.openapi_version(), Some("3.0.3"));
        assert!(snapshot.component_schemas().unwrap().contains_key("Item"));
    }

    #[tokio::test]
    async fn malformed_local_file_falls_back_to_empty_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        let store = SchemaStore::new(&config_with_path(file.path().to_path_buf()));
        let snapshot = store.load().await;

        assert_eq!(snapshot.source, SchemaSource::Empty);
        assert_eq!(snapshot.openapi_version(), Some("3.0.0"));
        assert!(snapshot.paths().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_everything_yields_empty_document() {
        let store = SchemaStore::new(&GatewayConfig::default());
        let snapshot = store.load().await;
        assert_eq!(snapshot.source, SchemaSource::Empty);
    }

    #[tokio::test]
    async fn get_loads_lazily_and_caches() {
        let store = SchemaStore::new(&GatewayConfig::default());
        let first = store.get().await;
        let second = store.get().await;
        // Same cached snapshot, not a re-resolution.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn source_info_reflects_empty_fallback() {
        let store = SchemaStore::new(&GatewayConfig::default());
        let info = store.source_info().await;
        assert_eq!(info.source, "empty");
        assert_eq!(info.openapi.as_deref(), Some("3.0.0"));
        assert!(info.components.is_empty());
    }
}
