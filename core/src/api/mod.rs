//! Floor mobile API client
//!
//! The trait is the seam between the check-in agent and the network:
//! production code talks to [`HttpFloorApi`], tests script a stub.

pub mod http;
pub mod types;

pub use http::HttpFloorApi;
pub use types::{LoginResponse, LoginUser, SignInResponse, UserInfo, UserInfoResponse};

use async_trait::async_trait;

use crate::error::Result;

/// Operations the Floor mobile API exposes to this agent
#[async_trait]
pub trait FloorApi: Send + Sync {
    /// Primary login protocol (iOS client, API 1.0)
    async fn login_ios(&self, account: &str, password_md5: &str) -> Result<LoginResponse>;

    /// Legacy login protocol (Android client, API 4.0), kept as fallback
    async fn login_android(&self, account: &str, password_md5: &str) -> Result<LoginResponse>;

    /// Profile lookup; doubles as a cheap session validity probe
    async fn user_info(&self, key: &str, user_id: &str) -> Result<UserInfoResponse>;

    /// Check in to one board
    async fn sign_in(&self, key: &str, user_id: &str, board_id: &str) -> Result<SignInResponse>;
}

/// The password transform the API expects: 32-char lowercase hex MD5,
/// no salt.
pub fn md5_hex(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_hex_known_digests() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn md5_hex_is_lowercase_and_fixed_width() {
        let digest = md5_hex("some password");
        assert_eq!(digest.len(), 32);
        assert_eq!(digest, digest.to_lowercase());
    }
}
