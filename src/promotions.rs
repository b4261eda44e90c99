use serde_json::{json, Value as JsonValue};

use crate::{QaffeeClient, Result};

/// Accessor for promotion endpoints and the admin summary views.
#[derive(Clone, Copy, Debug)]
pub struct Promotions<'a> {
    client: &'a QaffeeClient,
}

impl QaffeeClient {
    pub fn promotions(&self) -> Promotions<'_> {
        Promotions { client: self }
    }
}

impl Promotions<'_> {
    pub async fn active(&self) -> Result<JsonValue> {
        Ok(self.client.get("/promotions/active").await?.body)
    }

    /// Checks a promo code. Validation failures come back as
    /// [`QaffeeError::Http`](crate::QaffeeError::Http) with the server message in the body.
    pub async fn validate(&self, code: &str) -> Result<JsonValue> {
        Ok(self
            .client
            .post("/promotions/validate", &json!({ "code": code }))
            .await?
            .body)
    }

    pub async fn admin_list(&self) -> Result<JsonValue> {
        Ok(self.client.get("/admin/promotions").await?.body)
    }

    pub async fn admin_dashboard(&self) -> Result<JsonValue> {
        Ok(self.client.get("/admin/dashboard").await?.body)
    }
}
