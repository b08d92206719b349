//! Credentials for the EMQX admin API.
//!
//! EMQX authenticates admin requests with an application id/secret pair sent
//! as HTTP Basic authentication.

use std::env;
use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use crate::error::ConfigError;

pub const ENV_BASE_URL: &str = "EMQX_BASE_URL";
pub const ENV_APP_ID: &str = "EMQX_APP_ID";
pub const ENV_APP_SECRET: &str = "EMQX_APP_SECRET";

/// Base endpoint plus application id/secret. Immutable once built.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "CredentialsConfig")]
pub struct Credentials {
    base_url: String,
    app_id: String,
    app_secret: String,
}

/// Wire shape of `Credentials` in a config document.
#[derive(Deserialize)]
struct CredentialsConfig {
    base_url: String,
    app_id: String,
    app_secret: String,
}

impl From<CredentialsConfig> for Credentials {
    fn from(config: CredentialsConfig) -> Self {
        Self::new(&config.base_url, &config.app_id, &config.app_secret)
    }
}

impl Credentials {
    /// Trailing slashes on `base_url` are stripped so paths join cleanly.
    pub fn new(base_url: &str, app_id: &str, app_secret: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
        }
    }

    /// Read `EMQX_BASE_URL`, `EMQX_APP_ID` and `EMQX_APP_SECRET`, after
    /// loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let var = |name: &'static str| env::var(name).map_err(|_| ConfigError::Missing(name));
        Ok(Self::new(
            &var(ENV_BASE_URL)?,
            &var(ENV_APP_ID)?,
            &var(ENV_APP_SECRET)?,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// `Authorization` header value: `Basic base64(app_id:app_secret)`.
    pub fn auth_header(&self) -> String {
        let raw = format!("{}:{}", self.app_id, self.app_secret);
        format!("Basic {}", general_purpose::STANDARD.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn auth_header_encodes_id_and_secret() {
        let creds = Credentials::new("http://localhost:8081/api/v4", "u", "p");
        assert_eq!(creds.auth_header(), "Basic dTpw");
    }

    #[test]
    fn auth_header_keeps_colons_in_secret() {
        let creds = Credentials::new("http://localhost", "admin", "pub:lic");
        // base64("admin:pub:lic")
        assert_eq!(creds.auth_header(), "Basic YWRtaW46cHViOmxpYw==");
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let creds = Credentials::new("http://localhost:8081/api/v4//", "u", "p");
        assert_eq!(creds.base_url(), "http://localhost:8081/api/v4");
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials::new("http://localhost", "admin", "hunter2");
        let out = format!("{creds:?}");
        assert!(out.contains("admin"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn deserializes_from_config_document() {
        let creds: Credentials = serde_json::from_str(
            r#"{"base_url":"http://emqx:8081/api/v4","app_id":"admin","app_secret":"public"}"#,
        )
        .unwrap();
        assert_eq!(creds, Credentials::new("http://emqx:8081/api/v4", "admin", "public"));
    }

    #[test]
    fn deserialized_base_url_is_normalized() {
        let creds: Credentials = serde_json::from_str(
            r#"{"base_url":"http://emqx:8081/api/v4///","app_id":"admin","app_secret":"public"}"#,
        )
        .unwrap();
        assert_eq!(creds.base_url(), "http://emqx:8081/api/v4");
        assert_eq!(creds, Credentials::new("http://emqx:8081/api/v4", "admin", "public"));
    }

    #[test]
    #[serial]
    fn from_env_reads_all_three_variables() {
        temp_env::with_vars(
            [
                (ENV_BASE_URL, Some("http://emqx:8081/api/v4/")),
                (ENV_APP_ID, Some("admin")),
                (ENV_APP_SECRET, Some("public")),
            ],
            || {
                let creds = Credentials::from_env().unwrap();
                assert_eq!(creds.base_url(), "http://emqx:8081/api/v4");
                assert_eq!(creds.app_id(), "admin");
            },
        );
    }

    #[test]
    #[serial]
    fn from_env_reports_missing_variable() {
        temp_env::with_vars(
            [
                (ENV_BASE_URL, Some("http://emqx:8081/api/v4")),
                (ENV_APP_ID, Some("admin")),
                (ENV_APP_SECRET, None),
            ],
            || {
                let err = Credentials::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::Missing(ENV_APP_SECRET)));
            },
        );
    }
}
