//! Session-related types.

use serde::{Deserialize, Serialize};

use slipbook_core::{Email, ProfileId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account and profile ID.
    pub id: ProfileId,
    /// Login email address.
    pub email: Email,
    /// Whether the user may open the admin back-office.
    pub is_admin: bool,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
