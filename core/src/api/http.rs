//! HTTP implementation of the Floor API
//!
//! One shared `reqwest::Client` carries the fixed mobile-client header set;
//! the randomized device identity comes in as an explicit [`DeviceProfile`].
//! Timeouts are per request: logins get a longer budget than the cheap
//! profile/check-in calls. HTTP-level failures (including timeouts) map to
//! `FloorsignError::Network`, which is the retryable class.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE,
    HOST, USER_AGENT,
};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::types::{LoginResponse, SignInResponse, UserInfoResponse};
use super::FloorApi;
use crate::config::{self, DeviceProfile};
use crate::error::{FloorsignError, Result};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Floor API client over HTTP
pub struct HttpFloorApi {
    client: Client,
    base_url: String,
    device: DeviceProfile,
}

impl HttpFloorApi {
    /// Build a client for the given origin and device identity
    pub fn new(base_url: impl Into<String>, device: DeviceProfile) -> Result<Self> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let host = base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
        headers.insert(ACCEPT_LANGUAGE, header_value(&device.accept_language)?);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(USER_AGENT, header_value(&config::user_agent())?);
        headers.insert(HOST, header_value(&host)?);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url,
            device,
        })
    }
}

#[async_trait]
impl FloorApi for HttpFloorApi {
    async fn login_ios(&self, account: &str, password_md5: &str) -> Result<LoginResponse> {
        let url = format!("{}/account/login/IOS/1.0", self.base_url);
        let form = IosLoginForm {
            access_token: "",
            app_version: config::IOS_APP_VERSION,
            code: "",
            device_code: &self.device.device_code,
            device_model: &self.device.device_model,
            email: "",
            market_id: config::IOS_MARKET_ID,
            openid: "",
            password: password_md5,
            phone: account,
            platform: config::IOS_PLATFORM,
        };

        debug!(account, "sending iOS login request");
        let response = self
            .client
            .post(&url)
            .timeout(LOGIN_TIMEOUT)
            .form(&form)
            .send()
            .await?;

        Ok(response.error_for_status()?.json().await?)
    }

    async fn login_android(&self, account: &str, password_md5: &str) -> Result<LoginResponse> {
        let url = format!("{}/account/login/ANDROID/4.0", self.base_url);
        // The legacy endpoint wants the device parameters in the query
        // string rather than the body.
        let query = [
            ("platform", "2"),
            ("gkey", "000000"),
            ("app_version", config::ANDROID_APP_VERSION),
            ("versioncode", config::ANDROID_VERSION_CODE),
            ("market_id", config::ANDROID_MARKET_ID),
            ("_key", ""),
            ("device_code", self.device.device_code.as_str()),
            ("phone_brand_type", "Huawei"),
        ];
        let form = AndroidLoginForm {
            account,
            password: password_md5,
            login_type: "2",
        };

        debug!(account, "sending Android login request");
        let response = self
            .client
            .post(&url)
            .timeout(LOGIN_TIMEOUT)
            .query(&query)
            .form(&form)
            .send()
            .await?;

        Ok(response.error_for_status()?.json().await?)
    }

    async fn user_info(&self, key: &str, user_id: &str) -> Result<UserInfoResponse> {
        let url = format!("{}/user/getUserInfoByUid/IOS/1.0", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[("_key", key), ("userID", user_id)])
            .send()
            .await?;

        Ok(response.error_for_status()?.json().await?)
    }

    async fn sign_in(&self, key: &str, user_id: &str, board_id: &str) -> Result<SignInResponse> {
        let url = format!("{}/signin/add/IOS/1.0", self.base_url);
        let form = SignInForm {
            cat_id: board_id,
            user_id,
        };
        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[("_key", key), ("userID", user_id)])
            .form(&form)
            .send()
            .await?;

        Ok(response.error_for_status()?.json().await?)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| FloorsignError::Config(format!("invalid header value: {}", e)))
}

// Form bodies, form-urlencoded by reqwest

#[derive(Serialize)]
struct IosLoginForm<'a> {
    access_token: &'a str,
    app_version: &'a str,
    code: &'a str,
    device_code: &'a str,
    device_model: &'a str,
    email: &'a str,
    market_id: &'a str,
    openid: &'a str,
    password: &'a str,
    phone: &'a str,
    platform: &'a str,
}

#[derive(Serialize)]
struct AndroidLoginForm<'a> {
    account: &'a str,
    password: &'a str,
    login_type: &'a str,
}

#[derive(Serialize)]
struct SignInForm<'a> {
    cat_id: &'a str,
    user_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_default_origin() {
        let api = HttpFloorApi::new(config::DEFAULT_BASE_URL, DeviceProfile::random());
        assert!(api.is_ok());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpFloorApi::new("https://floor.huluxia.com/", DeviceProfile::random()).unwrap();
        assert_eq!(api.base_url, "https://floor.huluxia.com");
    }
}
