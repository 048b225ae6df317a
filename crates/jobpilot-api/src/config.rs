//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Allowed browser origins
    pub cors_origins: Vec<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Max request body size (multipart uploads included)
    pub max_body_size: usize,
    /// Session cookie lifetime in days
    pub session_ttl_days: i64,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout: Duration::from_secs(30),
            max_body_size: 12 * 1024 * 1024, // two 5MB images plus form overhead
            session_ttl_days: 7,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            session_ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.session_ttl_days),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "API_HOST",
            "API_PORT",
            "CORS_ORIGINS",
            "REQUEST_TIMEOUT",
            "MAX_BODY_SIZE",
            "SESSION_TTL_DAYS",
            "ENVIRONMENT",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_env() {
        clear_env();
        let config = ApiConfig::from_env();
        assert_eq!(config.port, 4000);
        assert_eq!(config.session_ttl_days, 7);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn cors_origins_split_on_commas() {
        clear_env();
        std::env::set_var("CORS_ORIGINS", "https://a.example, https://b.example");
        let config = ApiConfig::from_env();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        std::env::remove_var("CORS_ORIGINS");
    }

    #[test]
    #[serial]
    fn invalid_numbers_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("API_PORT", "not-a-port");
        std::env::set_var("REQUEST_TIMEOUT", "soon");
        let config = ApiConfig::from_env();
        assert_eq!(config.port, 4000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        clear_env();
    }

    #[test]
    #[serial]
    fn production_flag() {
        clear_env();
        std::env::set_var("ENVIRONMENT", "Production");
        let config = ApiConfig::from_env();
        assert!(config.is_production());
        std::env::remove_var("ENVIRONMENT");
    }
}
