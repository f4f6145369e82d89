//! Where a lead came from: landing variant and ad-tracking identifiers.

pub mod context;
pub mod tracking;
pub mod variant;

pub use context::LandingContext;
pub use tracking::{
    HttpIpLookup, IpLookup, UtmParams, apply_tracking, browser_id, click_id, lookup_ip,
};
pub use variant::{LandingAttribution, Variant, VariantResolver};
