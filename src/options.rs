/// Configures timeout, retry, caching and session behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds. `None` keeps the transport default.
    pub timeout_ms: Option<u64>,
    /// Maximum number of sends of a request that keeps answering 429. Once
    /// that many consecutive 429s came back, the last one is returned.
    pub max_rate_limit_attempts: usize,
    /// Wait used when a 429 carries no usable `Retry-After` header.
    pub default_retry_after_ms: u64,
    /// Upper bound (exclusive) of the random jitter added to each 429 wait.
    pub retry_jitter_ms: u64,
    /// How long a cached response stays valid, in milliseconds.
    pub cache_ttl_ms: u64,
    /// Path suffixes whose GET responses are cached.
    pub cacheable_endpoints: Vec<String>,
    /// Endpoint that exchanges a refresh token for a new access token.
    pub refresh_path: String,
    /// Login entry point reported when the session expires.
    pub login_path: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            max_rate_limit_attempts: 3,
            default_retry_after_ms: 2_000,
            retry_jitter_ms: 1_000,
            cache_ttl_ms: 5_000,
            cacheable_endpoints: vec![
                "/auth/me".to_owned(),
                "/admin/dashboard".to_owned(),
                "/admin/promotions".to_owned(),
            ],
            refresh_path: "/auth/refresh".to_owned(),
            login_path: "/login".to_owned(),
        }
    }
}
