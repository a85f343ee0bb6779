use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    /// Postgres URL; chat and rewards fall back to in-memory stores when absent
    pub database_url: Option<String>,
    /// Redis URL; the cache falls back to an in-process store when absent
    pub redis_url: Option<String>,
    pub cache_connect_timeout_ms: u64,
    pub jwt_secret: String,
    pub refresh_token_secret: String,
    pub jwt_expiration_secs: u64,
    pub refresh_token_expiration_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub mock: MockSettings,
    pub intranet: IntranetSettings,
    pub lms: LmsSettings,
    pub completion: CompletionSettings,
}

/// Mock mode switch and the knobs of the delay/failure simulator
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MockSettings {
    pub enabled: bool,
    pub delay_ms: u64,
    pub failure_rate: f64,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct IntranetSettings {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct LmsSettings {
    pub api_url: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CompletionSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let mock = MockSettings {
            enabled: var_or("MOCK_MODE", "false") == "true",
            delay_ms: var_or("MOCK_DELAY_MS", "500").parse().unwrap_or(500),
            failure_rate: var_or("MOCK_FAILURE_RATE", "0.0").parse().unwrap_or(0.0),
        };

        // Upstream credentials are only mandatory when the real adapters are wired in
        let mock_enabled = mock.enabled;
        let required = |name: &str| -> Result<String, env::VarError> {
            if mock_enabled {
                Ok(env::var(name).unwrap_or_default())
            } else {
                env::var(name)
            }
        };

        let jwt_expiration = parse_duration_secs(&var_or("JWT_EXPIRATION", "1h")).unwrap_or(3600);
        let refresh_expiration =
            parse_duration_secs(&var_or("REFRESH_TOKEN_EXPIRATION", "7d")).unwrap_or(7 * 86400);

        Ok(Config {
            server_host: var_or("SERVER_HOST", "0.0.0.0"),
            server_port: var_or("SERVER_PORT", "4000").parse().unwrap_or(4000),
            api_base_uri: var_or("API_BASE_URI", "/api/v1"),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            cache_connect_timeout_ms: var_or("CACHE_CONNECT_TIMEOUT_MS", "500")
                .parse()
                .unwrap_or(500),
            jwt_secret: signing_secret(env::var("JWT_SECRET"), mock_enabled, "dev-access-secret")?,
            refresh_token_secret: signing_secret(
                env::var("REFRESH_TOKEN_SECRET"),
                mock_enabled,
                "dev-refresh-secret",
            )?,
            jwt_expiration_secs: jwt_expiration,
            refresh_token_expiration_secs: refresh_expiration,
            rate_limit_window_secs: var_or("RATE_LIMIT_WINDOW", "60")
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .unwrap_or(60),
            rate_limit_requests: var_or("RATE_LIMIT_REQUESTS", "100").parse().unwrap_or(100),
            intranet: IntranetSettings {
                api_url: required("INTRANET_API_URL")?,
                api_key: required("INTRANET_API_KEY")?,
            },
            lms: LmsSettings {
                api_url: required("BLACKBOARD_API_URL")?,
                api_key: required("BLACKBOARD_API_KEY")?,
                api_secret: var_or("BLACKBOARD_API_SECRET", ""),
            },
            completion: CompletionSettings {
                api_url: var_or(
                    "OPENAI_API_URL",
                    "https://api.openai.com/v1/chat/completions",
                ),
                api_key: required("OPENAI_API_KEY")?,
                model: var_or("OPENAI_MODEL", "gpt-4"),
                max_tokens: var_or("OPENAI_MAX_TOKENS", "500").parse().unwrap_or(500),
            },
            mock,
        })
    }

    /// Settings suitable for tests and local demos: mock mode, no delay, in-memory stores
    pub fn for_mock() -> Self {
        Config {
            server_host: "127.0.0.1".into(),
            server_port: 4000,
            api_base_uri: "/api/v1".into(),
            database_url: None,
            redis_url: None,
            cache_connect_timeout_ms: 500,
            jwt_secret: "test-access-secret".into(),
            refresh_token_secret: "test-refresh-secret".into(),
            jwt_expiration_secs: 3600,
            refresh_token_expiration_secs: 7 * 86400,
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            mock: MockSettings {
                enabled: true,
                delay_ms: 0,
                failure_rate: 0.0,
            },
            intranet: IntranetSettings {
                api_url: String::new(),
                api_key: String::new(),
            },
            lms: LmsSettings {
                api_url: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
            },
            completion: CompletionSettings {
                api_url: String::new(),
                api_key: String::new(),
                model: "gpt-4".into(),
                max_tokens: 500,
            },
        }
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn refresh_token_expiration(&self) -> Duration {
        Duration::from_secs(self.refresh_token_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn cache_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_connect_timeout_ms)
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Token signing secrets: a blank or missing value is only replaced by the
/// development default in mock mode, otherwise it is a configuration error
fn signing_secret(
    value: Result<String, env::VarError>,
    mock_enabled: bool,
    dev_default: &str,
) -> Result<String, env::VarError> {
    match value {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        Ok(_) | Err(env::VarError::NotPresent) if mock_enabled => Ok(dev_default.to_string()),
        Ok(_) => Err(env::VarError::NotPresent),
        Err(e) => Err(e),
    }
}

/// Parses `90`, `30m`, `1h` or `7d` into seconds
pub fn parse_duration_secs(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (idx, c) if c.is_ascii_alphabetic() => (&raw[..idx], c),
        _ => (raw, 's'),
    };
    let value: u64 = digits.parse().ok()?;
    let factor = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        _ => return None,
    };
    value.checked_mul(factor)
}
