use serde_json::Value as JsonValue;

use crate::{ApiRequest, QaffeeClient, Result};

/// Accessor for public menu endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Menu<'a> {
    client: &'a QaffeeClient,
}

impl QaffeeClient {
    pub fn menu(&self) -> Menu<'_> {
        Menu { client: self }
    }
}

impl Menu<'_> {
    pub async fn items(&self) -> Result<JsonValue> {
        Ok(self.client.get("/menu/items").await?.body)
    }

    pub async fn item(&self, id: i64) -> Result<JsonValue> {
        Ok(self.client.get(&format!("/menu/item/{id}")).await?.body)
    }

    pub async fn categories(&self) -> Result<JsonValue> {
        Ok(self.client.get("/menu/categories").await?.body)
    }

    /// Full-text item search.
    pub async fn search(&self, query: &str) -> Result<JsonValue> {
        let request = ApiRequest::get("/menu/items/search").query("q", query);
        Ok(self.client.send(request).await?.body)
    }
}
