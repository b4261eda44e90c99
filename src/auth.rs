//! Session endpoints: login, identity lookup and logout.

use serde_json::json;

use crate::{
    types::MeResponse, ApiRequest, LoginResponse, QaffeeClient, Result, Tokens, User,
};

/// Accessor for `/auth/*` endpoints. Obtained with [`QaffeeClient::auth`].
#[derive(Clone, Copy, Debug)]
pub struct Auth<'a> {
    client: &'a QaffeeClient,
}

impl QaffeeClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }
}

impl Auth<'_> {
    /// Signs in a customer and persists the returned tokens.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.sign_in("/auth/login", email, password).await
    }

    /// Signs in through the staff/admin entry point.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.sign_in("/auth/admin-login", email, password).await
    }

    /// Returns the signed-in user. Served from the short-lived cache when fresh.
    pub async fn me(&self) -> Result<User> {
        let response: MeResponse = self.client.get("/auth/me").await?.json()?;
        Ok(response.user)
    }

    /// Forgets the session locally: tokens and cached responses are dropped.
    pub fn logout(&self) -> Result<()> {
        self.client.clear_cache();
        self.client.set_tokens(&Tokens::default())
    }

    async fn sign_in(&self, path: &str, email: &str, password: &str) -> Result<LoginResponse> {
        let request = ApiRequest::post(path).json(json!({
            "email": email,
            "password": password,
        }));
        let login: LoginResponse = self.client.send(request).await?.json()?;

        // A cached identity from a previous session must not leak into this one.
        self.client.clear_cache();
        self.client.set_tokens(&Tokens {
            token: Some(login.token.clone()),
            refresh_token: login.refresh_token.clone(),
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(user_id = login.user.id, "signed in");

        Ok(login)
    }
}
