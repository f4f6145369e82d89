//! Ad-tracking identifiers carried on every lead: UTM tags, click and
//! browser ids, user agent and public IP.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::questionnaire::AnswerSet;

use super::context::LandingContext;

/// Cookie holding the browser id.
pub const BROWSER_ID_COOKIE: &str = "_fbp";

/// UTM campaign tags from the landing URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
}

impl UtmParams {
    pub fn from_context(ctx: &LandingContext) -> Self {
        let param = |name: &str| ctx.query_param(name).map(str::to_string);
        Self {
            utm_source: param("utm_source"),
            utm_medium: param("utm_medium"),
            utm_campaign: param("utm_campaign"),
            utm_content: param("utm_content"),
            utm_term: param("utm_term"),
        }
    }
}

/// Click id in the `fb.1.<unix-millis>.<fbclid>` format.
pub fn click_id(fbclid: &str, at: DateTime<Utc>) -> String {
    format!("fb.1.{}.{}", at.timestamp_millis(), fbclid)
}

/// Browser id from the `_fbp` cookie.
pub fn browser_id(ctx: &LandingContext) -> Option<&str> {
    ctx.cookie(BROWSER_ID_COOKIE).filter(|v| !v.is_empty())
}

/// Fill the click id, browser id and user agent from the landing context.
/// Fields with no source are left untouched.
pub fn apply_tracking(answers: &mut AnswerSet, ctx: &LandingContext, now: DateTime<Utc>) {
    if let Some(fbclid) = ctx.query_param("fbclid") {
        answers.fbc = click_id(fbclid, now);
    }
    if let Some(fbp) = browser_id(ctx) {
        answers.fbp = fbp.to_string();
    }
    if let Some(ua) = ctx.user_agent.as_deref().filter(|ua| !ua.is_empty()) {
        answers.user_agent = ua.to_string();
    }
}

/// Looks up the visitor's public IP address.
#[async_trait]
pub trait IpLookup: Send + Sync {
    async fn public_ip(&self) -> anyhow::Result<String>;
}

/// `IpLookup` against an ipify-style endpoint returning `{"ip": "..."}`.
pub struct HttpIpLookup {
    client: reqwest::Client,
    url: String,
}

impl HttpIpLookup {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl IpLookup for HttpIpLookup {
    async fn public_ip(&self) -> anyhow::Result<String> {
        #[derive(Deserialize)]
        struct IpResponse {
            ip: String,
        }

        let resp = self.client.get(&self.url).send().await?.error_for_status()?;
        let body: IpResponse = resp.json().await?;
        debug!(ip = %body.ip, "Resolved public IP");
        Ok(body.ip)
    }
}

/// Run the lookup with a time limit, logging and swallowing any failure.
pub async fn lookup_ip(lookup: &dyn IpLookup, limit: Duration) -> Option<String> {
    match tokio::time::timeout(limit, lookup.public_ip()).await {
        Ok(Ok(ip)) if !ip.trim().is_empty() => Some(ip),
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            warn!("Error fetching IP: {}", e);
            None
        }
        Err(_) => {
            warn!(timeout_ms = limit.as_millis() as u64, "IP lookup timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedIp(Option<&'static str>);

    #[async_trait]
    impl IpLookup for FixedIp {
        async fn public_ip(&self) -> anyhow::Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("network unreachable"))
        }
    }

    #[test]
    fn utm_params_from_query() {
        let ctx = LandingContext::default()
            .with_query_string("utm_source=facebook&utm_campaign=solar_q3&utm_term=");
        let utm = UtmParams::from_context(&ctx);
        assert_eq!(utm.utm_source.as_deref(), Some("facebook"));
        assert_eq!(utm.utm_campaign.as_deref(), Some("solar_q3"));
        assert_eq!(utm.utm_medium, None);
        assert_eq!(utm.utm_term, None);
    }

    #[test]
    fn click_id_format() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(click_id("abc", at), "fb.1.1700000000123.abc");
    }

    #[test]
    fn apply_tracking_fills_known_fields_only() {
        let at = Utc.timestamp_millis_opt(1_000).unwrap();
        let ctx = LandingContext::default()
            .with_query_string("fbclid=XYZ")
            .with_cookies("_fbp=fb.1.5.6")
            .with_user_agent("Mozilla/5.0");
        let mut answers = AnswerSet {
            ip: "10.0.0.1".into(),
            ..Default::default()
        };
        apply_tracking(&mut answers, &ctx, at);
        assert_eq!(answers.fbc, "fb.1.1000.XYZ");
        assert_eq!(answers.fbp, "fb.1.5.6");
        assert_eq!(answers.user_agent, "Mozilla/5.0");
        assert_eq!(answers.ip, "10.0.0.1");

        let mut bare = AnswerSet::default();
        apply_tracking(&mut bare, &LandingContext::default(), at);
        assert_eq!(bare, AnswerSet::default());
    }

    #[tokio::test]
    async fn ip_lookup_failures_are_swallowed() {
        let limit = Duration::from_secs(5);
        assert_eq!(lookup_ip(&FixedIp(Some("1.2.3.4")), limit).await.as_deref(), Some("1.2.3.4"));
        assert_eq!(lookup_ip(&FixedIp(None), limit).await, None);
        assert_eq!(lookup_ip(&FixedIp(Some("  ")), limit).await, None);
    }

    struct Hung;

    #[async_trait]
    impl IpLookup for Hung {
        async fn public_ip(&self) -> anyhow::Result<String> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_ip_lookup_gives_up_after_limit() {
        let started = tokio::time::Instant::now();
        assert_eq!(lookup_ip(&Hung, Duration::from_secs(3)).await, None);
        assert!(started.elapsed() >= Duration::from_secs(3));
    }
}
