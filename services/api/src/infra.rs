use flatshare::config::{ContactConfig, ListingConfig};
use flatshare::listings::{InMemoryStore, MarketplaceService, MessagingChannel};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Marketplace = MarketplaceService<InMemoryStore>;

/// Marketplace backed by a fresh process-local store.
pub(crate) fn in_memory_marketplace(
    listing_config: ListingConfig,
    contact_config: ContactConfig,
) -> Arc<Marketplace> {
    let store = Arc::new(InMemoryStore::default());
    Arc::new(MarketplaceService::new(store, listing_config, contact_config))
}

pub(crate) fn parse_channel(raw: &str) -> Result<MessagingChannel, String> {
    raw.parse::<MessagingChannel>()
}
