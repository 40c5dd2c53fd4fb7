//! Firestore REST API client.
//!
//! Client with:
//! - Service-account authentication via gcp_auth
//! - Token caching with refresh margin and invalidate-on-401 retry
//! - HTTP client tuning (pooling, timeouts)
//! - Operation counters via `metrics`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use metrics::counter;
use reqwest::{Client, StatusCode};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{FirestoreError, FirestoreResult};
use crate::value::{Document, Value};

/// OAuth scope for Firestore access through the datastore API surface.
const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Refresh tokens 60 seconds before expiry so in-flight requests never race it.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Conservative TTL when the provider reports no usable expiry.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

// =============================================================================
// Configuration
// =============================================================================

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| {
                FirestoreError::auth_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set to access Firestore",
                )
            })?;

        if project_id.is_empty() {
            return Err(FirestoreError::auth_error(
                "GCP_PROJECT_ID or FIREBASE_PROJECT_ID cannot be empty",
            ));
        }

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        })
    }
}

// =============================================================================
// Token cache
// =============================================================================

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Thread-safe token cache with double-checked refresh.
struct TokenCache {
    auth: Arc<dyn TokenProvider>,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    fn new(auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            auth,
            cache: RwLock::new(None),
        }
    }

    async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn get_token(&self) -> FirestoreResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;

        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(cached.access_token.clone());
            }
        }

        let token = self
            .auth
            .token(&[FIRESTORE_SCOPE])
            .await
            .map_err(|e| FirestoreError::auth_error(format!("Failed to obtain auth token: {}", e)))?;

        let access_token = token.as_str().to_string();
        let expires_at = {
            let now = chrono::Utc::now();
            let exp = token.expires_at();
            if exp > now {
                match (exp - now).to_std() {
                    Ok(ttl) => Instant::now() + ttl,
                    Err(_) => Instant::now() + TOKEN_DEFAULT_TTL,
                }
            } else {
                Instant::now()
            }
        };

        *cache = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at,
        });

        debug!("Refreshed Firestore auth token");
        Ok(access_token)
    }
}

// =============================================================================
// Client
// =============================================================================

/// Firestore REST API client.
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    token_cache: Arc<TokenCache>,
}

impl Clone for FirestoreClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token_cache: Arc::clone(&self.token_cache),
        }
    }
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub async fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        let auth = Self::create_auth_provider()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("cpilot-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        let base_url = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );

        Ok(Self {
            http,
            base_url,
            token_cache: Arc::new(TokenCache::new(auth)),
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> FirestoreResult<Self> {
        Self::new(FirestoreConfig::from_env()?).await
    }

    fn create_auth_provider() -> FirestoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            FirestoreError::auth_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(FirestoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, doc_id)
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    /// Send a request, retrying once with a fresh token on auth expiry.
    async fn send_with_auth_retry(
        &self,
        build: impl Fn(&str) -> reqwest::RequestBuilder,
    ) -> FirestoreResult<reqwest::Response> {
        let token = self.token_cache.get_token().await?;
        let response = build(&token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            if Self::is_access_token_expired(&body) {
                self.token_cache.invalidate().await;
                let token = self.token_cache.get_token().await?;
                return Ok(build(&token).send().await?);
            }
            return Err(FirestoreError::from_http_status(401, body));
        }

        Ok(response)
    }

    // =========================================================================
    // CRUD Operations
    // =========================================================================

    /// Get a document, returning `None` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        counter!("firestore_requests_total", "op" => "get").increment(1);
        let url = self.document_url(collection, doc_id);

        let response = self
            .send_with_auth_retry(|token| self.http.get(&url).bearer_auth(token))
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(Self::error_from_response(status, &url, response).await),
        }
    }

    /// Create a document with an explicit ID.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        counter!("firestore_requests_total", "op" => "create").increment(1);
        let url = format!(
            "{}/{}?documentId={}",
            self.base_url,
            collection,
            urlencoding::encode(doc_id)
        );
        let body = Document::new(fields);

        let response = self
            .send_with_auth_retry(|token| self.http.post(&url).bearer_auth(token).json(&body))
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
            StatusCode::CONFLICT => Err(FirestoreError::AlreadyExists(format!(
                "{}/{}",
                collection, doc_id
            ))),
            status => Err(Self::error_from_response(status, &url, response).await),
        }
    }

    /// Patch a document, merging the given fields.
    ///
    /// With an update mask only the named fields change; without one the
    /// write replaces the whole document. Creates the document when absent.
    pub async fn patch_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: Option<Vec<String>>,
    ) -> FirestoreResult<Document> {
        counter!("firestore_requests_total", "op" => "patch").increment(1);
        let mut url = self.document_url(collection, doc_id);
        if let Some(mask) = update_mask {
            let params: Vec<String> = mask
                .iter()
                .map(|f| format!("updateMask.fieldPaths={}", urlencoding::encode(f)))
                .collect();
            url = format!("{}?{}", url, params.join("&"));
        }
        let body = Document::new(fields);

        let response = self
            .send_with_auth_retry(|token| self.http.patch(&url).bearer_auth(token).json(&body))
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(Self::error_from_response(status, &url, response).await),
        }
    }

    /// Add a document with an auto-generated ID.
    pub async fn add_document(
        &self,
        collection: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        counter!("firestore_requests_total", "op" => "add").increment(1);
        let url = format!("{}/{}", self.base_url, collection);
        let body = Document::new(fields);

        let response = self
            .send_with_auth_retry(|token| self.http.post(&url).bearer_auth(token).json(&body))
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
            status => Err(Self::error_from_response(status, &url, response).await),
        }
    }

    /// Query a collection ordered by a field, newest first, bounded by `limit`.
    ///
    /// `parent_path` is the document path owning the collection (empty for a
    /// root collection), e.g. `contentPlans/u1` with collection `items`.
    pub async fn query_recent(
        &self,
        parent_path: &str,
        collection_id: &str,
        order_by_field: &str,
        limit: u32,
    ) -> FirestoreResult<Vec<Document>> {
        counter!("firestore_requests_total", "op" => "query").increment(1);
        let url = if parent_path.is_empty() {
            format!("{}:runQuery", self.base_url)
        } else {
            format!("{}/{}:runQuery", self.base_url, parent_path)
        };

        let body = serde_json::json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection_id }],
                "orderBy": [{
                    "field": { "fieldPath": order_by_field },
                    "direction": "DESCENDING"
                }],
                "limit": limit
            }
        });

        let response = self
            .send_with_auth_retry(|token| self.http.post(&url).bearer_auth(token).json(&body))
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::error_from_response(status, &url, response).await);
        }

        // runQuery streams one result object per matched document; entries
        // without a `document` key (read time only) are skipped.
        let results: Vec<serde_json::Value> = response.json().await?;
        let mut documents = Vec::new();
        for entry in results {
            if let Some(doc) = entry.get("document") {
                documents.push(serde_json::from_value(doc.clone())?);
            }
        }
        Ok(documents)
    }

    async fn error_from_response(
        status: StatusCode,
        url: &str,
        response: reqwest::Response,
    ) -> FirestoreError {
        let body = response.text().await.unwrap_or_default();
        counter!("firestore_errors_total").increment(1);
        FirestoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}
