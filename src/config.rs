//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Funnel configuration, injected into the wizard controller and the submitter.
#[derive(Debug, Clone)]
pub struct FunnelConfig {
    /// Primary lead API endpoint (expects `{"success": true}` on acceptance).
    pub api_url: String,
    /// Secondary webhook endpoint. Also receives disqualified partial leads.
    pub webhook_url: String,
    /// Public IP lookup endpoint returning `{"ip": "..."}`.
    pub ip_lookup_url: Option<String>,
    /// Absolute URL of the questionnaire page, reported as `submittedFrom`.
    pub site_url: String,
    /// Route for disqualified leads.
    pub disqualified_route: String,
    /// Route for qualified leads; contact fields are appended as query parameters.
    pub book_call_route: String,
    /// Entry route used by "start over".
    pub entry_route: String,
    /// Delay between a single-select click and the automatic advance.
    pub auto_advance_delay: Duration,
    /// Delay between a disqualifying click and the partial-lead dispatch.
    pub disqualify_delay: Duration,
    /// Debounce window for snapshot autosave.
    pub autosave_debounce: Duration,
    /// Upper bound on one sink delivery.
    pub sink_timeout: Duration,
    /// Upper bound on the public IP lookup.
    pub ip_lookup_timeout: Duration,
    /// `source` tag for complete submissions.
    pub source: String,
    /// `source` tag for disqualified partial submissions.
    pub disqualified_source: String,
    /// `variant_source` tag stamped on every payload.
    pub variant_source: String,
    /// Substituted when no email is known at submit time.
    pub placeholder_email: String,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api/submit-lead".to_string(),
            webhook_url: "http://localhost:5678/webhook/questions".to_string(),
            ip_lookup_url: Some("https://api.ipify.org?format=json".to_string()),
            site_url: "http://localhost:3000/applynow".to_string(),
            disqualified_route: "/weappreciateyou".to_string(),
            book_call_route: "/book-call".to_string(),
            entry_route: "/".to_string(),
            auto_advance_delay: Duration::from_millis(600),
            disqualify_delay: Duration::from_millis(100),
            autosave_debounce: Duration::from_millis(500),
            sink_timeout: Duration::from_secs(10),
            ip_lookup_timeout: Duration::from_secs(3),
            source: "renewable_energy_questionnaire".to_string(),
            disqualified_source: "renewable_energy_questionnaire_disqualified".to_string(),
            variant_source: "applynow_form".to_string(),
            placeholder_email: "user@example.com".to_string(),
        }
    }
}

impl FunnelConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let millis = |key: &str, fallback: Duration| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        let ip_lookup_url = match std::env::var("FUNNEL_IP_LOOKUP_URL") {
            Ok(url) if url.trim().is_empty() => None,
            Ok(url) => Some(url),
            Err(_) => defaults.ip_lookup_url.clone(),
        };

        Self {
            api_url: std::env::var("FUNNEL_API_URL").unwrap_or(defaults.api_url),
            webhook_url: std::env::var("FUNNEL_WEBHOOK_URL").unwrap_or(defaults.webhook_url),
            ip_lookup_url,
            site_url: std::env::var("FUNNEL_SITE_URL").unwrap_or(defaults.site_url),
            auto_advance_delay: millis("FUNNEL_AUTO_ADVANCE_MS", defaults.auto_advance_delay),
            disqualify_delay: millis("FUNNEL_DISQUALIFY_DELAY_MS", defaults.disqualify_delay),
            autosave_debounce: millis("FUNNEL_AUTOSAVE_MS", defaults.autosave_debounce),
            sink_timeout: millis("FUNNEL_SINK_TIMEOUT_MS", defaults.sink_timeout),
            ip_lookup_timeout: millis("FUNNEL_IP_LOOKUP_TIMEOUT_MS", defaults.ip_lookup_timeout),
            ..defaults
        }
    }

    /// Check that endpoints are absolute URLs and routes are site-relative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut urls = vec![
            ("api_url", &self.api_url),
            ("webhook_url", &self.webhook_url),
            ("site_url", &self.site_url),
        ];
        if let Some(ref ip) = self.ip_lookup_url {
            urls.push(("ip_lookup_url", ip));
        }
        for (key, value) in urls {
            reqwest::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        }

        for (key, route) in [
            ("disqualified_route", &self.disqualified_route),
            ("book_call_route", &self.book_call_route),
            ("entry_route", &self.entry_route),
        ] {
            if !route.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("route must start with '/': {route}"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FunnelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auto_advance_delay, Duration::from_millis(600));
        assert_eq!(config.autosave_debounce, Duration::from_millis(500));
        assert_eq!(config.sink_timeout, Duration::from_secs(10));
        assert_eq!(config.placeholder_email, "user@example.com");
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        let config = FunnelConfig {
            api_url: "/api/submit-lead".to_string(),
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "api_url"),
            other => panic!("expected invalid api_url, got {other:?}"),
        }
    }

    #[test]
    fn route_without_slash_is_rejected() {
        let config = FunnelConfig {
            book_call_route: "book-call".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
