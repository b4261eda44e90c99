use std::time::Duration;

use futures::Stream;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{time::sleep, OrderSnapshot, QaffeeClient, Result};

/// Interval the tracking page polls at.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(30);

/// Accessor for customer order endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Orders<'a> {
    client: &'a QaffeeClient,
}

impl QaffeeClient {
    pub fn orders(&self) -> Orders<'_> {
        Orders { client: self }
    }
}

#[derive(Clone, Copy)]
enum WatchState {
    First,
    Polling,
    Done,
}

impl Orders<'_> {
    /// Places an order. The body is passed through to the backend as is.
    pub async fn create<B: Serialize>(&self, order: &B) -> Result<JsonValue> {
        Ok(self.client.post("/orders", order).await?.body)
    }

    pub async fn user_orders(&self) -> Result<JsonValue> {
        Ok(self.client.get("/orders/user").await?.body)
    }

    pub async fn get(&self, id: i64) -> Result<OrderSnapshot> {
        self.client.get(&format!("/order/{id}")).await?.json()
    }

    pub async fn tracking(&self, id: i64) -> Result<JsonValue> {
        Ok(self.client.get(&format!("/orders/{id}/tracking")).await?.body)
    }

    pub async fn cancel(&self, id: i64) -> Result<JsonValue> {
        Ok(self
            .client
            .send(crate::ApiRequest::post(format!("/orders/{id}/cancel")))
            .await?
            .body)
    }

    /// Polls an order's status every `interval`.
    ///
    /// The first snapshot is fetched immediately. The stream ends after
    /// yielding a terminal status (see [`OrderSnapshot::is_terminal`]) or
    /// the first error.
    pub fn watch(
        &self,
        id: i64,
        interval: Duration,
    ) -> impl Stream<Item = Result<OrderSnapshot>> + 'static {
        let client = self.client.clone();
        futures::stream::unfold(WatchState::First, move |state| {
            let client = client.clone();
            async move {
                match state {
                    WatchState::Done => return None,
                    WatchState::Polling => sleep(interval).await,
                    WatchState::First => {}
                }

                let outcome = client.orders().get(id).await;
                let next = match &outcome {
                    Ok(snapshot) if !snapshot.is_terminal() => WatchState::Polling,
                    Ok(_) => WatchState::Done,
                    Err(_err) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(order_id = id, "order watch stopped: {_err}");
                        WatchState::Done
                    }
                };
                Some((outcome, next))
            }
        })
    }
}
