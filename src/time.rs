//! Timer and clock helpers that work on native and `wasm32` targets.
//!
//! `std::time::Instant` and `tokio::time` are unavailable in browser
//! runtimes, so WASM builds fall back to `Date.now()` and `setTimeout`.

use std::time::Duration;

/// Point in time used to age cache entries.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Stamp {
    #[cfg(not(target_arch = "wasm32"))]
    at: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    at_ms: f64,
}

impl Stamp {
    pub(crate) fn now() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self {
                at: std::time::Instant::now(),
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self {
                at_ms: js_sys::Date::now(),
            }
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.at.elapsed()
        }
        #[cfg(target_arch = "wasm32")]
        {
            let ms = (js_sys::Date::now() - self.at_ms).max(0.0);
            Duration::from_millis(ms as u64)
        }
    }
}

/// Suspends the current task without blocking the executor.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Suspends the current task without blocking the executor.
///
/// Resolves immediately when the host exposes no `setTimeout`.
#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep(duration: Duration) {
    use wasm_bindgen::{JsCast, JsValue};

    let ms = duration.as_millis().min(i32::MAX as u128) as i32;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let set_timeout = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("setTimeout"))
            .ok()
            .filter(|value| value.is_function());
        match set_timeout {
            Some(set_timeout) => {
                let set_timeout = set_timeout.unchecked_into::<js_sys::Function>();
                if set_timeout
                    .call2(&JsValue::NULL, &resolve, &JsValue::from(ms))
                    .is_err()
                {
                    let _ = resolve.call0(&JsValue::NULL);
                }
            }
            None => {
                let _ = resolve.call0(&JsValue::NULL);
            }
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}
