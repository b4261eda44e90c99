/// User-facing events raised by the client on terminal failures.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClientEvent {
    /// The session ended; the UI should show a notice and go to `login_path`.
    SessionExpired { login_path: String },
    /// The backend answered 500.
    ServerError,
}

impl ClientEvent {
    /// Message suitable for a toast or banner.
    pub fn message(&self) -> &'static str {
        match self {
            Self::SessionExpired { .. } => "Session expired. Please log in again.",
            Self::ServerError => "Something went wrong. Please try again later.",
        }
    }
}

/// Receives [`ClientEvent`]s. Rendering them is up to the implementor.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: ClientEvent);
}

/// Default notifier: logs events when the `tracing` feature is enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: ClientEvent) {
        #[cfg(feature = "tracing")]
        match &event {
            ClientEvent::SessionExpired { login_path } => {
                tracing::warn!(login_path = %login_path, "{}", event.message());
            }
            ClientEvent::ServerError => tracing::warn!("{}", event.message()),
        }

        #[cfg(not(feature = "tracing"))]
        let _ = event;
    }
}
