use std::env;
use std::time::Duration;
use tracing::warn;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("AGENDA_BACKEND_URL")
                .unwrap_or_else(|_| {
                    warn!("AGENDA_BACKEND_URL not set, using empty value");
                    String::new()
                }),
            api_token: env::var("AGENDA_API_TOKEN")
                .ok()
                .filter(|token| !token.is_empty())
                .or_else(|| {
                    warn!("AGENDA_API_TOKEN not set, requests will be sent without Authorization");
                    None
                }),
            request_timeout_secs: match env::var("AGENDA_REQUEST_TIMEOUT_SECS") {
                Ok(raw) => raw.parse().unwrap_or_else(|_| {
                    warn!("AGENDA_REQUEST_TIMEOUT_SECS is not a number ({}), using default", raw);
                    DEFAULT_REQUEST_TIMEOUT_SECS
                }),
                Err(_) => {
                    warn!("AGENDA_REQUEST_TIMEOUT_SECS not set, using default");
                    DEFAULT_REQUEST_TIMEOUT_SECS
                }
            },
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty()
    }

    /// Upper bound applied to every single remote call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            api_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
