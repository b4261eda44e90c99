use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

use crate::{QaffeeError, Result};

/// Access and refresh tokens persisted between sessions.
#[derive(Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Tokens {
    pub fn new(token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            token: Some(token.into()),
            refresh_token,
        }
    }
}

impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Tokens")
            .field("token", &redact(&self.token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

/// Persistent storage for the session tokens.
///
/// The client reads the store before every send, so a token written by
/// another component is picked up on the next request.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Tokens>;
    fn save(&self, tokens: &Tokens) -> Result<()>;

    fn clear(&self) -> Result<()> {
        self.save(&Tokens::default())
    }
}

/// In-process token store. Tokens are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Tokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Tokens> {
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, tokens: &Tokens) -> Result<()> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = tokens.clone();
        Ok(())
    }
}

/// Token store backed by a JSON file (`{"token": ..., "refresh_token": ...}`).
///
/// A missing file reads as an empty session.
///
/// **Not available on `wasm32` targets** — use [`MemoryTokenStore`] or a
/// custom store over browser storage.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileTokenStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileTokenStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Tokens> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Tokens::default())
            }
            Err(err) => {
                return Err(QaffeeError::Storage(format!(
                    "could not read {}: {err}",
                    self.path.display()
                )))
            }
        };
        if content.trim().is_empty() {
            return Ok(Tokens::default());
        }
        serde_json::from_str(&content).map_err(|err| {
            QaffeeError::Storage(format!(
                "{} could not be parsed: {err}",
                self.path.display()
            ))
        })
    }

    fn save(&self, tokens: &Tokens) -> Result<()> {
        let content = serde_json::to_string_pretty(tokens)
            .map_err(|err| QaffeeError::Storage(format!("could not encode tokens: {err}")))?;
        std::fs::write(&self.path, content).map_err(|err| {
            QaffeeError::Storage(format!("could not write {}: {err}", self.path.display()))
        })
    }
}
