use sha2::{Digest, Sha256};

use crate::platform::Platform;

/// Identity material attached to every poll request.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    /// Stable per-user/device identifier, UUID-shaped.
    pub user_hash: String,
    /// Machine name, sent alongside the hash.
    pub device_id: String,
}

impl RequestIdentity {
    pub fn derive(platform: &dyn Platform) -> Self {
        Self {
            user_hash: derive_user_hash(platform),
            device_id: platform.machine_name(),
        }
    }
}

/// Best-effort stable identifier for the current user on this machine.
///
/// A directory GUID wins when the platform can produce one; otherwise the
/// machine/user/principal triple is hashed and shaped like a UUID. Both
/// branches are deterministic, so the value survives restarts.
pub fn derive_user_hash(platform: &dyn Platform) -> String {
    if let Some(guid) = platform.domain_user_guid() {
        return guid;
    }
    let seed = format!(
        "{}\\{} {}",
        platform.machine_name(),
        platform.user_name(),
        platform.os_user_id()
    );
    hashed_guid(&seed)
}

fn hashed_guid(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    uuid::Uuid::from_bytes(bytes).hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use crate::platform::ToastOutcome;

    struct FakePlatform {
        domain_guid: Option<String>,
    }

    #[async_trait::async_trait]
    impl Platform for FakePlatform {
        fn machine_name(&self) -> String {
            "testbox".to_string()
        }
        fn user_name(&self) -> String {
            "alice".to_string()
        }
        fn os_user_id(&self) -> String {
            "1000".to_string()
        }
        fn domain_user_guid(&self) -> Option<String> {
            self.domain_guid.clone()
        }
        async fn show_toast(&self, _count: usize) -> Result<ToastOutcome, AppError> {
            Ok(ToastOutcome::Dismissed)
        }
        async fn clear_toast(&self) {}
        async fn open_url(&self, _url: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[test]
    fn hash_is_stable_and_uuid_shaped() {
        let plat = FakePlatform { domain_guid: None };
        let a = derive_user_hash(&plat);
        let b = derive_user_hash(&plat);
        assert_eq!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn domain_guid_wins() {
        let guid = "36b5ce48-d61b-01c4-bda4-b4e68f27262c";
        let plat = FakePlatform {
            domain_guid: Some(guid.to_string()),
        };
        assert_eq!(derive_user_hash(&plat), guid);
    }

    #[test]
    fn different_users_hash_differently() {
        struct OtherUser;
        #[async_trait::async_trait]
        impl Platform for OtherUser {
            fn machine_name(&self) -> String {
                "testbox".to_string()
            }
            fn user_name(&self) -> String {
                "bob".to_string()
            }
            fn os_user_id(&self) -> String {
                "1001".to_string()
            }
            fn domain_user_guid(&self) -> Option<String> {
                None
            }
            async fn show_toast(&self, _count: usize) -> Result<ToastOutcome, AppError> {
                Ok(ToastOutcome::Dismissed)
            }
            async fn clear_toast(&self) {}
            async fn open_url(&self, _url: &str) -> Result<(), AppError> {
                Ok(())
            }
        }

        let alice = derive_user_hash(&FakePlatform { domain_guid: None });
        let bob = derive_user_hash(&OtherUser);
        assert_ne!(alice, bob);
    }
}
