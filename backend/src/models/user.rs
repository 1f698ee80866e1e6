//! Models for the identity record owned by the external backend service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Profile returned by the backend's `/users/me` endpoint.
pub struct User {
    /// Backend-assigned identifier.
    pub id: i64,
    /// Primary email address used for sign-in.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role names granted to the user.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Active billing subscription, when the user has one.
    #[serde(default)]
    pub subscription: Option<SubscriptionRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Pointer to the subscription that governs the user's plan.
pub struct SubscriptionRef {
    /// Billing-side identifier.
    pub id: String,
    /// Plan name such as `free` or `pro`.
    pub plan: String,
    /// Billing status such as `active` or `past_due`.
    pub status: String,
}

/// Envelope returned by `GET /auth/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: Option<User>,
}
