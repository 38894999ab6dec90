//! sitelens-http
//!
//! HTTP-backed implementations of `LensProvider`: DNS-over-HTTPS resolvers,
//! IP geolocation services, header dumps, page metadata APIs and direct
//! requests to the analyzed site.
#![warn(missing_docs)]

/// Reachability through the AllOrigins proxy.
pub mod allorigins;
/// Client construction and request helpers shared by all providers.
pub mod client;
/// Requests straight to the analyzed site.
pub mod direct;
/// DNS-over-HTTPS resolvers.
pub mod doh;
/// IP geolocation.
pub mod geo;
/// HackerTarget header dumps.
pub mod hackertarget;
/// Header classification shared by the header-producing providers.
pub mod headers;
/// Page metadata APIs.
pub mod seo;

use std::sync::Arc;

use reqwest::Client;
use sitelens_core::LensProvider;

pub use allorigins::AllOriginsProvider;
pub use client::default_client;
pub use direct::DirectProvider;
pub use doh::DohProvider;
pub use geo::{IpApiComProvider, IpapiCoProvider};
pub use hackertarget::HackerTargetProvider;
pub use seo::{ApiKeys, LinkPreviewProvider, OpenGraphProvider, PageSpeedProvider};

/// Every built-in provider, in default priority order, using demo API keys.
#[must_use]
pub fn default_providers(client: &Client) -> Vec<Arc<dyn LensProvider>> {
    providers_with_keys(client, &ApiKeys::default())
}

/// Every built-in provider, in default priority order.
///
/// Providers serving the same kind are ordered so that the cheapest and most
/// authoritative source is tried first: the site itself before proxies and
/// Cloudflare's resolver before Google's and Quad9's. Both geolocation
/// providers share the Cloudflare resolver for their address lookups.
#[must_use]
pub fn providers_with_keys(client: &Client, keys: &ApiKeys) -> Vec<Arc<dyn LensProvider>> {
    let resolver = Arc::new(DohProvider::cloudflare(client.clone()));
    vec![
        Arc::new(DirectProvider::new(client.clone())),
        Arc::new(AllOriginsProvider::new(client.clone())),
        Arc::new(DohProvider::cloudflare(client.clone())),
        Arc::new(DohProvider::google(client.clone())),
        Arc::new(DohProvider::quad9(client.clone())),
        Arc::new(IpapiCoProvider::new(client.clone(), Arc::clone(&resolver))),
        Arc::new(IpApiComProvider::new(client.clone(), resolver)),
        Arc::new(HackerTargetProvider::new(client.clone())),
        Arc::new(PageSpeedProvider::new(client.clone())),
        Arc::new(LinkPreviewProvider::new(client.clone(), keys.linkpreview.clone())),
        Arc::new(OpenGraphProvider::new(client.clone(), keys.opengraph.clone())),
    ]
}
