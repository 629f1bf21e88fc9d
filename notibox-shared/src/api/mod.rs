use serde::{Deserialize, Serialize};

#[cfg(feature = "rest-client")]
pub mod rest;

/// Header carrying the derived per-user/device identity.
pub const HEADER_USER_HASH: &str = "User-Hash";
/// Header carrying the machine name.
pub const HEADER_DEVICE_ID: &str = "DeviceId";

/// One pending notification as delivered by the server.
///
/// Both fields default to empty so a sparse or partially filled element
/// deserializes instead of failing the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDto {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub id: String,
}

impl NotificationDto {
    pub fn has_destination(&self) -> bool {
        !self.uri.is_empty()
    }
}
