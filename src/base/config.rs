//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::keywords;

use super::types::Res;

/// Production API host.
pub const API_BASE: &str = "https://api.sgroup.qq.com";

/// Sandbox API host.
pub const SANDBOX_API_BASE: &str = "https://sandbox.api.sgroup.qq.com";

/// Default access token endpoint.
fn default_token_url() -> String {
    "https://bots.qq.com/app/getAppAccessToken".to_string()
}

/// Default per-request HTTP timeout, in seconds.
fn default_request_timeout_secs() -> u64 {
    10
}

/// Default keyword table.
fn default_keywords() -> Vec<KeywordEntry> {
    keywords::DEFAULT_KEYWORDS
        .iter()
        .map(|(trigger, response)| KeywordEntry {
            trigger: trigger.to_string(),
            response: response.to_string(),
        })
        .collect()
}

/// Default reply when no keyword matches.
fn default_keyword_fallback() -> String {
    keywords::DEFAULT_FALLBACK.to_string()
}

/// One row of the keyword table.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct KeywordEntry {
    pub trigger: String,
    pub response: String,
}

/// Configuration for the relay-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Bot application id (`RELAY_BOT_APP_ID`).
    #[serde(default)]
    pub app_id: String,
    /// Bot client secret (`RELAY_BOT_CLIENT_SECRET`).
    #[serde(default)]
    pub client_secret: String,
    /// Talk to the sandbox host instead of production (`RELAY_BOT_SANDBOX`).
    #[serde(default)]
    pub sandbox: bool,
    /// Explicit API base url; wins over `sandbox` (`RELAY_BOT_API_BASE`).
    #[serde(default)]
    pub api_base: Option<String>,
    /// Access token endpoint (`RELAY_BOT_TOKEN_URL`).
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Per-request HTTP timeout in seconds (`RELAY_BOT_REQUEST_TIMEOUT_SECS`).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Ordered keyword table. The first trigger contained in a message wins.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<KeywordEntry>,
    /// Reply used when no keyword matches (`RELAY_BOT_KEYWORD_FALLBACK`).
    #[serde(default = "default_keyword_fallback")]
    pub keyword_fallback: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            client_secret: String::new(),
            sandbox: false,
            api_base: None,
            token_url: default_token_url(),
            request_timeout_secs: default_request_timeout_secs(),
            keywords: default_keywords(),
            keyword_fallback: default_keyword_fallback(),
        }
    }
}

impl ConfigInner {
    /// The API base url to send requests to.
    pub fn api_base(&self) -> &str {
        match &self.api_base {
            Some(base) => base.trim_end_matches('/'),
            None if self.sandbox => SANDBOX_API_BASE,
            None => API_BASE,
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("RELAY_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.request_timeout_secs < 1 || result.request_timeout_secs > 300 {
            return Err(anyhow::anyhow!("Request timeout must be between 1 and 300 seconds."));
        }

        // Validate the keyword table.
        crate::interaction::keyword::KeywordTable::from_config(&result)?;

        Ok(result)
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from(ConfigInner::default());

        assert_eq!(config.api_base(), API_BASE);
        assert_eq!(config.keywords.len(), keywords::DEFAULT_KEYWORDS.len());
        assert_eq!(config.keywords[0].trigger, "傻逼");
        assert_eq!(config.keyword_fallback, "你干嘛");
    }

    #[test]
    fn test_api_base_selection() {
        let sandbox = ConfigInner { sandbox: true, ..Default::default() };
        assert_eq!(sandbox.api_base(), SANDBOX_API_BASE);

        let explicit = ConfigInner {
            sandbox: true,
            api_base: Some("http://localhost:8080/".to_string()),
            ..Default::default()
        };
        assert_eq!(explicit.api_base(), "http://localhost:8080");
    }

    #[test]
    fn test_load_from_file_keeps_keyword_order() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
app_id = "1024"
client_secret = "secret"
keyword_fallback = "?"

[[keywords]]
trigger = "ab"
response = "first"

[[keywords]]
trigger = "a"
response = "second"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.app_id, "1024");
        assert_eq!(config.keywords[0].response, "first");
        assert_eq!(config.keywords[1].response, "second");
        assert_eq!(config.keyword_fallback, "?");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_load_rejects_bad_timeout() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "request_timeout_secs = 0").unwrap();

        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_load_rejects_duplicate_triggers() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[keywords]]
trigger = "x"
response = "1"

[[keywords]]
trigger = "x"
response = "2"
"#
        )
        .unwrap();

        assert!(Config::load(Some(file.path())).is_err());
    }
}
