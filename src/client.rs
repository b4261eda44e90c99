use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::{header, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::{
    cache::ResponseCache,
    inflight::{boxed, PendingRequests, Slot},
    request::decode_body,
    retry::{rate_limit_delay, retry_after_ms},
    time::sleep,
    types::RefreshResponse,
    ApiRequest, ApiResponse, ClientEvent, ClientOptions, Fingerprint, LogNotifier,
    MemoryTokenStore, Notifier, QaffeeError, Result, TokenStore, Tokens,
};

#[derive(Clone)]
/// HTTP client for the Qaffee REST API.
///
/// Every call goes through the same pipeline: cached allowlisted GETs are
/// answered locally, identical in-flight calls share one network request,
/// 429 responses are retried after `Retry-After` plus jitter, and a 401 is
/// recovered once by refreshing the access token.
///
/// Cloning is cheap; clones share the cache, in-flight table and token store.
pub struct QaffeeClient {
    http: reqwest::Client,
    base_url: String,
    options: ClientOptions,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    pending: Arc<PendingRequests>,
    cache: Arc<Mutex<ResponseCache>>,
}

impl fmt::Debug for QaffeeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QaffeeClient")
            .field("base_url", &self.base_url)
            .field("tokens", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl QaffeeClient {
    /// Creates a client for `base_url` with an in-memory token store.
    pub fn new(base_url: impl Into<String>) -> Self {
        let options = ClientOptions::default();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            cache: Arc::new(Mutex::new(Self::cache_for(&options))),
            options,
            tokens: Arc::new(MemoryTokenStore::new()),
            notifier: Arc::new(LogNotifier),
            pending: Arc::new(PendingRequests::default()),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `QAFFEE_API_URL` — backend base URL (required)
    /// - `QAFFEE_TOKEN_FILE` — JSON token file (optional; in-memory otherwise)
    ///
    /// **Not available on `wasm32` targets** — environment variables do not
    /// exist in browser runtimes.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use qaffee_http::QaffeeClient;
    ///
    /// let api = QaffeeClient::from_env().expect("missing QAFFEE_API_URL");
    /// ```
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> std::result::Result<Self, String> {
        let url = std::env::var("QAFFEE_API_URL")
            .map_err(|_| "missing QAFFEE_API_URL environment variable".to_owned())?;
        if url.trim().is_empty() {
            return Err("QAFFEE_API_URL is set but empty".to_owned());
        }
        let client = Self::new(url.trim());
        match std::env::var("QAFFEE_TOKEN_FILE") {
            Ok(path) if !path.trim().is_empty() => {
                Ok(client.with_token_store(crate::FileTokenStore::new(path.trim())))
            }
            _ => Ok(client),
        }
    }

    /// Applies client options. Resets the response cache.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.cache = Arc::new(Mutex::new(Self::cache_for(&opts)));
        self.options = opts;
        self
    }

    /// Replaces the token store.
    pub fn with_token_store(mut self, store: impl TokenStore + 'static) -> Self {
        self.tokens = Arc::new(store);
        self
    }

    /// Replaces the receiver of session-expired and server-error events.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Uses a preconfigured `reqwest::Client` (proxies, default headers, ...).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Current tokens from the store.
    pub fn tokens(&self) -> Result<Tokens> {
        self.tokens.load()
    }

    /// Persists new tokens, e.g. after an out-of-band login.
    pub fn set_tokens(&self, tokens: &Tokens) -> Result<()> {
        self.tokens.save(tokens)
    }

    /// Returns `true` when an access token is stored.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.tokens.load()?.token.is_some())
    }

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        self.cache_lock().clear();
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path).json(to_json(body)?)).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::put(path).json(to_json(body)?)).await
    }

    pub async fn patch<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::patch(path).json(to_json(body)?)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Sends a request through the cache, dedup, retry and refresh pipeline.
    ///
    /// The cache is consulted before the in-flight table, so a fresh cached
    /// payload wins over joining an identical call that is still running.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let key = Fingerprint::of(&request);
        let cacheable = self.cache_lock().is_eligible(&request);

        if cacheable {
            let hit = self.cache_lock().get(&key);
            if let Some(body) = hit {
                #[cfg(feature = "tracing")]
                tracing::debug!(request = %key, "serving cached response");
                return Ok(ApiResponse { status: 200, body });
            }
        }

        let slot = self.pending.acquire(&key, || {
            let client = self.clone();
            let key = key.clone();
            boxed(async move {
                let outcome = client.dispatch(&request).await;
                if cacheable {
                    if let Ok(response) = &outcome {
                        client.cache_lock().insert(key.clone(), response.body.clone());
                    }
                }
                client.pending.release(&key);
                outcome
            })
        });

        if let Slot::Joined(_) = &slot {
            #[cfg(feature = "tracing")]
            tracing::debug!(request = %key, "joining in-flight request");
        }

        slot.into_outcome().await
    }

    /// Runs one logical request to completion: at most
    /// `max_rate_limit_attempts` sends while the server answers 429, and one
    /// replay after a successful token refresh.
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut rate_limit_attempts = 0usize;
        let mut refreshed = false;

        loop {
            let response = self.send_once(request).await?;
            let status = response.status();

            if status.is_success() {
                let body = response.text().await?;
                return decode_body(status.as_u16(), &body);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                rate_limit_attempts += 1;
                if rate_limit_attempts < self.options.max_rate_limit_attempts {
                    let base_ms =
                        retry_after_ms(response.headers(), self.options.default_retry_after_ms);
                    drop(response);
                    self.wait_before_retry(request, base_ms, rate_limit_attempts).await;
                    continue;
                }
            }

            let body = response.text().await?;
            let error = QaffeeError::Http {
                status: status.as_u16(),
                body,
            };

            match status {
                StatusCode::UNAUTHORIZED if !refreshed => {
                    refreshed = true;
                    self.recover_session(error).await?;
                }
                StatusCode::UNAUTHORIZED => {
                    self.expire_session();
                    return Err(error);
                }
                StatusCode::INTERNAL_SERVER_ERROR => {
                    self.notifier.notify(ClientEvent::ServerError);
                    return Err(error);
                }
                _ => return Err(error),
            }
        }
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url_for(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.tokens.load()?.token {
            builder = builder.header(header::AUTHORIZATION, normalize_bearer_authorization(&token));
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout_ms) = self.options.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(builder.send().await?)
    }

    /// Waits `Retry-After` plus jitter before re-sending a 429.
    async fn wait_before_retry(&self, request: &ApiRequest, base_ms: u64, attempt: usize) {
        let delay = rate_limit_delay(base_ms, self.options.retry_jitter_ms);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            attempt,
            "rate limited, retrying after {} ms",
            delay.as_millis()
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (request, attempt);

        sleep(delay).await;
    }

    /// Handles the first 401 of a logical request. `Ok` means the token was
    /// refreshed and the request should be replayed.
    async fn recover_session(&self, unauthorized: QaffeeError) -> Result<()> {
        let tokens = self.tokens.load()?;
        let Some(refresh_token) = tokens.refresh_token else {
            self.expire_session();
            return Err(unauthorized);
        };

        match self.refresh_access_token(&refresh_token).await {
            Ok(access_token) => {
                self.tokens.save(&Tokens {
                    token: Some(access_token),
                    refresh_token: Some(refresh_token),
                })?;
                #[cfg(feature = "tracing")]
                tracing::debug!("access token refreshed, replaying request");
                Ok(())
            }
            Err(err) => {
                self.expire_session();
                Err(QaffeeError::RefreshFailed(Box::new(err)))
            }
        }
    }

    /// Calls the refresh endpoint directly, outside the retry pipeline.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        let mut builder = self
            .http
            .post(self.url_for(&self.options.refresh_path))
            .json(&json!({ "refresh_token": refresh_token }));
        if let Some(timeout_ms) = self.options.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(QaffeeError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let refreshed: RefreshResponse = serde_json::from_str(&body).map_err(|err| {
            QaffeeError::Decode(format!("invalid refresh response JSON: {err}; body: {body}"))
        })?;
        Ok(refreshed.access_token)
    }

    /// Ends the session: clears tokens and cached responses, then tells the
    /// notifier to send the user to the login page.
    fn expire_session(&self) {
        if let Err(err) = self.tokens.clear() {
            #[cfg(feature = "tracing")]
            tracing::warn!("could not clear tokens: {err}");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
        }
        self.clear_cache();
        self.notifier.notify(ClientEvent::SessionExpired {
            login_path: self.options.login_path.clone(),
        });
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn cache_lock(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_for(options: &ClientOptions) -> ResponseCache {
        ResponseCache::new(
            Duration::from_millis(options.cache_ttl_ms),
            options.cacheable_endpoints.clone(),
        )
    }
}

fn to_json<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|err| QaffeeError::InvalidRequest(format!("body is not valid JSON: {err}")))
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
