//! Wire types for the Floor mobile API
//!
//! The vendor reports success as `status == 1` on every endpoint and is
//! loose about the rest of the payload, so every field defaults instead
//! of failing the decode. `userID` in particular arrives as a JSON number
//! on some endpoints and as a string on others.

use serde::{Deserialize, Deserializer};

/// Response to either login protocol: `{status, _key, user, msg}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: i64,
    /// Opaque bearer token used by every subsequent request
    #[serde(rename = "_key", default)]
    pub key: String,
    #[serde(default)]
    pub user: LoginUser,
    #[serde(default)]
    pub msg: String,
}

impl LoginResponse {
    pub fn ok(&self) -> bool {
        self.status == 1
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginUser {
    #[serde(rename = "userID", default, deserialize_with = "id_string")]
    pub user_id: String,
}

/// Response to the profile lookup: `{status, user: {nick, level}, msg}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfoResponse {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub user: UserInfo,
    #[serde(default)]
    pub msg: String,
}

impl UserInfoResponse {
    pub fn ok(&self) -> bool {
        self.status == 1
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub level: i64,
}

/// Response to a board check-in: `{status, msg}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInResponse {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub msg: String,
}

impl SignInResponse {
    pub fn ok(&self) -> bool {
        self.status == 1
    }
}

/// Accept a string or a number, normalize to a string
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_with_numeric_user_id() {
        let body = r#"{"status": 1, "_key": "K", "user": {"userID": 12345}, "msg": ""}"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();
        assert!(response.ok());
        assert_eq!(response.key, "K");
        assert_eq!(response.user.user_id, "12345");
    }

    #[test]
    fn login_response_with_string_user_id() {
        let body = r#"{"status": 1, "_key": "K", "user": {"userID": "u-77"}}"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.user.user_id, "u-77");
    }

    #[test]
    fn missing_fields_default() {
        let response: LoginResponse = serde_json::from_str(r#"{"status": 0}"#).unwrap();
        assert!(!response.ok());
        assert!(response.key.is_empty());
        assert!(response.user.user_id.is_empty());
        assert!(response.msg.is_empty());
    }

    #[test]
    fn user_info_decodes() {
        let body = r#"{"status": 1, "user": {"nick": "tester", "level": 7}}"#;
        let response: UserInfoResponse = serde_json::from_str(body).unwrap();
        assert!(response.ok());
        assert_eq!(response.user.nick, "tester");
        assert_eq!(response.user.level, 7);
    }

    #[test]
    fn sign_in_rejection_keeps_message() {
        let body = r#"{"status": 0, "msg": "already checked in"}"#;
        let response: SignInResponse = serde_json::from_str(body).unwrap();
        assert!(!response.ok());
        assert_eq!(response.msg, "already checked in");
    }
}
