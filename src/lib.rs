//! `qaffee-http` is an async HTTP client for the Qaffee ordering API.
//!
//! All calls go through [`QaffeeClient::send`], which adds:
//! - short-lived caching of allowlisted GETs (`/auth/me`, admin summaries)
//! - deduplication of identical in-flight requests
//! - bounded 429 retry honoring `Retry-After` plus jitter
//! - one transparent access-token refresh on 401
//!
//! Typed accessors wrap the backend endpoints:
//! [`QaffeeClient::auth`], [`QaffeeClient::menu`], [`QaffeeClient::orders`]
//! and [`QaffeeClient::promotions`].

mod auth;
mod cache;
mod client;
mod error;
mod fingerprint;
mod inflight;
mod menu;
mod notify;
mod options;
mod orders;
mod promotions;
mod request;
mod retry;
mod time;
mod tokens;
mod types;

pub use auth::Auth;
pub use client::QaffeeClient;
pub use error::QaffeeError;
pub use fingerprint::Fingerprint;
pub use menu::Menu;
pub use notify::{ClientEvent, LogNotifier, Notifier};
pub use options::ClientOptions;
pub use orders::{Orders, DEFAULT_WATCH_INTERVAL};
pub use promotions::Promotions;
pub use request::{ApiRequest, ApiResponse};
#[cfg(not(target_arch = "wasm32"))]
pub use tokens::FileTokenStore;
pub use tokens::{MemoryTokenStore, TokenStore, Tokens};
pub use types::{LoginResponse, OrderLine, OrderSnapshot, User};

pub use reqwest::Method;

pub type Result<T> = std::result::Result<T, QaffeeError>;
