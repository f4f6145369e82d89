//! Landing-page variant resolution.
//!
//! Resolution order, first match wins:
//! 1. persisted local value
//! 2. referrer path
//! 3. `variant` / `v` query parameter
//! 4. `ab_variant` cookie
//! 5. session-storage mirror
//! 6. `unknown` at `/`
//!
//! Anything found by 2–5 is written back to local storage so attribution
//! stays stable for the rest of the session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::snapshot::read_landing;
use crate::store::{KeyValueStore, SnapshotStore};

use super::context::LandingContext;

/// Cookie set by the landing-page middleware.
pub const VARIANT_COOKIE: &str = "ab_variant";

/// Landing-page experiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    #[serde(rename = "variant_a")]
    VariantA,
    #[serde(rename = "variant_1")]
    Variant1,
    #[serde(rename = "root_redirect")]
    RootRedirect,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VariantA => "variant_a",
            Self::Variant1 => "variant_1",
            Self::RootRedirect => "root_redirect",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a stored tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "variant_a" => Some(Self::VariantA),
            "variant_1" => Some(Self::Variant1),
            "root_redirect" => Some(Self::RootRedirect),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Short code used by the query parameter and the cookie (`a`, `1`, `root`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Self::VariantA),
            "1" => Some(Self::Variant1),
            "root" => Some(Self::RootRedirect),
            _ => None,
        }
    }

    /// Short code reported as `ab_test_variant`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::VariantA => "a",
            Self::Variant1 => "1",
            Self::RootRedirect => "root",
            Self::Unknown => "unknown",
        }
    }

    /// Canonical landing path for the bucket.
    pub fn path(&self) -> &'static str {
        match self {
            Self::VariantA => "/a",
            Self::Variant1 => "/1",
            Self::RootRedirect | Self::Unknown => "/",
        }
    }

    /// Map a referrer path onto a bucket.
    pub fn from_referrer_path(path: &str) -> Option<Self> {
        match path {
            "/a" => Some(Self::VariantA),
            "/1" => Some(Self::Variant1),
            "/" | "/watch" => Some(Self::RootRedirect),
            _ => None,
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved variant plus the path it was attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingAttribution {
    pub variant: Variant,
    pub path: String,
}

impl LandingAttribution {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            path: variant.path().to_string(),
        }
    }
}

impl Default for LandingAttribution {
    fn default() -> Self {
        Self::for_variant(Variant::Unknown)
    }
}

/// Resolves and pins the landing attribution for a browser.
#[derive(Clone)]
pub struct VariantResolver {
    local: SnapshotStore,
    session: Option<Arc<dyn KeyValueStore>>,
}

impl VariantResolver {
    pub fn new(local: SnapshotStore, session: Option<Arc<dyn KeyValueStore>>) -> Self {
        Self { local, session }
    }

    /// Resolve the attribution. Never fails; unreadable sources count as absent.
    pub fn resolve(&self, ctx: &LandingContext) -> LandingAttribution {
        if let Some(stored) = self.local.load_landing() {
            debug!(variant = %stored.variant, path = %stored.path, "Found stored landing variant");
            return stored;
        }

        let derived = Self::from_referrer(ctx)
            .map(|l| (l, "referrer"))
            .or_else(|| Self::from_query(ctx).map(|l| (l, "query")))
            .or_else(|| Self::from_cookie(ctx).map(|l| (l, "cookie")))
            .or_else(|| self.from_session().map(|l| (l, "session")));

        match derived {
            Some((landing, source)) => {
                info!(
                    variant = %landing.variant,
                    path = %landing.path,
                    source,
                    "Detected landing variant"
                );
                self.local.save_landing(&landing);
                landing
            }
            None => {
                debug!("No landing variant detected, using default");
                LandingAttribution::default()
            }
        }
    }

    fn from_referrer(ctx: &LandingContext) -> Option<LandingAttribution> {
        let path = ctx.referrer_path()?;
        Variant::from_referrer_path(&path).map(LandingAttribution::for_variant)
    }

    fn from_query(ctx: &LandingContext) -> Option<LandingAttribution> {
        let code = ctx.query_param("variant").or_else(|| ctx.query_param("v"))?;
        Variant::from_code(code).map(LandingAttribution::for_variant)
    }

    fn from_cookie(ctx: &LandingContext) -> Option<LandingAttribution> {
        Variant::from_code(ctx.cookie(VARIANT_COOKIE)?).map(LandingAttribution::for_variant)
    }

    fn from_session(&self) -> Option<LandingAttribution> {
        read_landing(self.session.as_deref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::store::{MemoryStore, keys};

    fn resolver(
        local: &[(&str, &str)],
        session: Option<&[(&str, &str)]>,
    ) -> (VariantResolver, Arc<MemoryStore>) {
        let mem = Arc::new(MemoryStore::with_entries(local.iter().copied()));
        let session = session.map(|entries| {
            Arc::new(MemoryStore::with_entries(entries.iter().copied())) as Arc<dyn KeyValueStore>
        });
        (VariantResolver::new(SnapshotStore::new(mem.clone()), session), mem)
    }

    #[test]
    fn referrer_a_without_persisted_value() {
        let (resolver, mem) = resolver(&[], None);
        let ctx = LandingContext::default().with_referrer("https://example.com/a");
        let landing = resolver.resolve(&ctx);
        assert_eq!(landing.variant, Variant::VariantA);
        assert_eq!(landing.path, "/a");

        assert_eq!(mem.get(keys::LANDING_VARIANT).unwrap().as_deref(), Some("variant_a"));
        assert_eq!(mem.get(keys::LANDING_PATH).unwrap().as_deref(), Some("/a"));
    }

    #[test]
    fn watch_referrer_maps_to_root() {
        let (resolver, _) = resolver(&[], None);
        let ctx = LandingContext::default().with_referrer("https://example.com/watch");
        assert_eq!(
            resolver.resolve(&ctx),
            LandingAttribution {
                variant: Variant::RootRedirect,
                path: "/".into()
            }
        );
    }

    #[test]
    fn persisted_value_beats_every_other_source() {
        let (resolver, _) = resolver(
            &[(keys::LANDING_VARIANT, "variant_1"), (keys::LANDING_PATH, "/1")],
            Some(&[(keys::LANDING_VARIANT, "root_redirect"), (keys::LANDING_PATH, "/")]),
        );
        let ctx = LandingContext::default()
            .with_referrer("https://example.com/a")
            .with_query_string("v=root")
            .with_cookies("ab_variant=a");
        assert_eq!(resolver.resolve(&ctx).variant, Variant::Variant1);
    }

    #[test]
    fn referrer_beats_query_beats_cookie_beats_session() {
        let session: &[(&str, &str)] = &[(keys::LANDING_VARIANT, "variant_1"), (keys::LANDING_PATH, "/1")];

        let full = LandingContext::default()
            .with_referrer("https://example.com/a")
            .with_query_string("variant=root")
            .with_cookies("ab_variant=1");
        let (r, _) = resolver(&[], Some(session));
        assert_eq!(r.resolve(&full).variant, Variant::VariantA);

        let no_referrer = LandingContext::default()
            .with_referrer("https://example.com/pricing")
            .with_query_string("variant=root")
            .with_cookies("ab_variant=a");
        let (r, _) = resolver(&[], Some(session));
        assert_eq!(r.resolve(&no_referrer).variant, Variant::RootRedirect);

        let cookie_only = LandingContext::default().with_cookies("ab_variant=a");
        let (r, _) = resolver(&[], Some(session));
        assert_eq!(r.resolve(&cookie_only).variant, Variant::VariantA);

        let (r, mem) = resolver(&[], Some(session));
        assert_eq!(r.resolve(&LandingContext::default()).variant, Variant::Variant1);
        assert_eq!(mem.get(keys::LANDING_PATH).unwrap().as_deref(), Some("/1"));
    }

    #[test]
    fn short_v_parameter_and_unknown_codes() {
        let (r, _) = resolver(&[], None);
        let ctx = LandingContext::default().with_query_string("v=1");
        assert_eq!(r.resolve(&ctx).path, "/1");

        let (r, mem) = resolver(&[], None);
        let ctx = LandingContext::default().with_query_string("v=zzz");
        assert_eq!(r.resolve(&ctx), LandingAttribution::default());
        assert!(mem.is_empty(), "default resolution must not be persisted");
    }

    #[test]
    fn unreadable_local_store_falls_through() {
        struct Unreadable;
        impl KeyValueStore for Unreadable {
            fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
                Err(StorageError::Unavailable("blocked".into()))
            }
            fn set(&self, key: &str, _: &str) -> Result<(), StorageError> {
                Err(StorageError::WriteFailed {
                    key: key.into(),
                    reason: "blocked".into(),
                })
            }
            fn remove(&self, _: &str) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let resolver = VariantResolver::new(SnapshotStore::new(Arc::new(Unreadable)), None);
        let ctx = LandingContext::default().with_cookies("ab_variant=root");
        assert_eq!(resolver.resolve(&ctx).variant, Variant::RootRedirect);
    }

    #[test]
    fn tag_and_code_tables() {
        for variant in [Variant::VariantA, Variant::Variant1, Variant::RootRedirect, Variant::Unknown] {
            assert_eq!(Variant::parse(variant.as_str()), Some(variant));
            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, format!("\"{variant}\""));
        }
        assert_eq!(Variant::Unknown.code(), "unknown");
        assert_eq!(Variant::from_code("unknown"), None);
    }
}
