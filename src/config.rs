//! Client configuration.
//!
//! Two independently-deployed backends exist in this system: the errand
//! service and the lost-and-found service. Each has its own base URL and
//! call sites select between them with [`Service`], never by hard-coding
//! an address.

/// Logical backend target for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Errand-running marketplace backend.
    Errand,
    /// Lost-and-found marketplace backend.
    LostFound,
}

/// Configuration for [`crate::client::ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the errand service, including the API prefix.
    pub errand_url: String,
    /// Base URL of the lost-and-found service, including the API prefix.
    pub lostfound_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            errand_url: "http://localhost:18083/api".to_string(),
            lostfound_url: "http://localhost:18080/api".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from environment variables, falling back to
    /// the defaults for anything unset.
    ///
    /// - `CAMPUS_ERRAND_URL`
    /// - `CAMPUS_LOSTFOUND_URL`
    /// - `CAMPUS_REQUEST_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            errand_url: std::env::var("CAMPUS_ERRAND_URL").unwrap_or(defaults.errand_url),
            lostfound_url: std::env::var("CAMPUS_LOSTFOUND_URL").unwrap_or(defaults.lostfound_url),
            timeout_ms: std::env::var("CAMPUS_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_ms),
        }
    }

    /// Resolve the base URL for a logical service target.
    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Errand => &self.errand_url,
            Service::LostFound => &self.lostfound_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_selection() {
        let config = ClientConfig::default();
        assert!(config.base_url(Service::Errand).contains("18083"));
        assert!(config.base_url(Service::LostFound).contains("18080"));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(ClientConfig::default().timeout_ms, 30_000);
    }
}
