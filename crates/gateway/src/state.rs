//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::provider::{ProviderClient, ProviderError};
use crate::snapshot::SnapshotStore;
use crate::wordpress::{WordPressClient, WordPressError};

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("WordPress client: {0}")]
    WordPress(#[from] WordPressError),
    #[error("provider client: {0}")]
    Provider(#[from] ProviderError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; owns the snapshot store and the upstream
/// clients so tests can construct isolated instances.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    snapshot: SnapshotStore,
    wordpress: WordPressClient,
    provider: Option<ProviderClient>,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// The provider client is built only when the provider is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if either upstream client fails to build.
    pub fn new(config: GatewayConfig) -> Result<Self, StateError> {
        let wordpress = WordPressClient::new(&config)?;
        let provider = config
            .provider
            .as_ref()
            .map(ProviderClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                snapshot: SnapshotStore::new(),
                wordpress,
                provider,
            }),
        })
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Get a reference to the snapshot store.
    #[must_use]
    pub fn snapshot(&self) -> &SnapshotStore {
        &self.inner.snapshot
    }

    /// Get a reference to the WordPress client.
    #[must_use]
    pub fn wordpress(&self) -> &WordPressClient {
        &self.inner.wordpress
    }

    /// Get a reference to the provider client, when configured.
    #[must_use]
    pub fn provider(&self) -> Option<&ProviderClient> {
        self.inner.provider.as_ref()
    }
}
