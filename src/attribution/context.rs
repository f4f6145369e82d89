//! Inbound page context: URL query, referrer, cookies, user agent.

use reqwest::Url;

/// What the page knows about how the visitor arrived.
#[derive(Debug, Clone, Default)]
pub struct LandingContext {
    /// Full URL of the questionnaire page, if known.
    pub page_url: Option<String>,
    /// `document.referrer` equivalent.
    pub referrer: Option<String>,
    /// Decoded query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Raw `Cookie` header (`a=1; b=2`).
    pub cookies: Option<String>,
    pub user_agent: Option<String>,
}

impl LandingContext {
    /// Build a context from the page URL, taking its query parameters.
    /// An unparseable URL yields an empty query.
    pub fn from_page_url(url: &str) -> Self {
        let query = match Url::parse(url) {
            Ok(parsed) => parsed.query_pairs().into_owned().collect(),
            Err(e) => {
                tracing::warn!(url, "Failed to parse page URL, using empty params: {}", e);
                Vec::new()
            }
        };
        Self {
            page_url: Some(url.to_string()),
            query,
            ..Default::default()
        }
    }

    /// Replace the query with a raw `a=1&b=2` string.
    pub fn with_query_string(mut self, query: &str) -> Self {
        let query = query.trim_start_matches('?');
        self.query = Url::parse(&format!("http://localhost/?{query}"))
            .map(|u| u.query_pairs().into_owned().collect())
            .unwrap_or_default();
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = Some(cookies.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// First non-empty value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Value of a named cookie.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .as_deref()?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Path component of the referrer URL.
    pub fn referrer_path(&self) -> Option<String> {
        let referrer = self.referrer.as_deref().filter(|r| !r.is_empty())?;
        match Url::parse(referrer) {
            Ok(url) => Some(url.path().to_string()),
            Err(e) => {
                tracing::warn!(referrer, "Error parsing referrer: {}", e);
                None
            }
        }
    }
}
