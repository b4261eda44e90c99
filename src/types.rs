use serde::{Deserialize, Serialize};

/// Signed-in user as returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_staff: bool,
}

/// Body of a successful `/auth/login` or `/auth/admin-login`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access_token: String,
}

/// One line item of an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default)]
    pub menu_item_name: Option<String>,
    #[serde(default)]
    pub quantity: u32,
}

/// Order state as seen by the tracking page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: i64,
    pub status: String,
    #[serde(default)]
    pub is_delivery: bool,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

impl OrderSnapshot {
    /// Statuses after which an order never changes again.
    pub const TERMINAL_STATUSES: [&'static str; 4] = [
        "completed",
        "cancelled_by_user",
        "cancelled_by_admin",
        "failed",
    ];

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL_STATUSES.contains(&self.status.as_str())
    }
}
