use std::env;
use std::time::Duration;
use tracing::warn;

const DEFAULT_CLINIC_API_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5055";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clinic_api_url: String,
    pub clinic_api_timeout_secs: u64,
    pub bind_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clinic_api_url: DEFAULT_CLINIC_API_URL.to_string(),
            clinic_api_timeout_secs: DEFAULT_TIMEOUT_SECS,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl AppConfig {
    pub fn new(clinic_api_url: impl Into<String>) -> Self {
        Self {
            clinic_api_url: clinic_api_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let config = Self {
            clinic_api_url: env::var("CLINIC_API_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_URL not set, using default");
                    DEFAULT_CLINIC_API_URL.to_string()
                }),
            clinic_api_timeout_secs: match env::var("CLINIC_API_TIMEOUT_SECS") {
                Ok(raw) => raw.parse().unwrap_or_else(|_| {
                    warn!("CLINIC_API_TIMEOUT_SECS is not a number ({}), using default", raw);
                    DEFAULT_TIMEOUT_SECS
                }),
                Err(_) => DEFAULT_TIMEOUT_SECS,
            },
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - clinic API URL is empty");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.clinic_api_url.trim().is_empty()
    }

    /// Per-call timeout for backend requests. Zero is clamped to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.clinic_api_timeout_secs.max(1))
    }
}
