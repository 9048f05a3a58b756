//! Application state shared across handlers.

use std::sync::Arc;

use zedonk_core::ExportLayout;

use crate::config::ExporterConfig;
use crate::shopify::{ShopifyClient, ShopifyError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ExporterConfig,
    shopify: ShopifyClient,
}

impl AppState {
    /// Build state and the Shopify client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify client cannot be created.
    pub fn new(config: ExporterConfig) -> Result<Self, ShopifyError> {
        let shopify = ShopifyClient::new(&config.shopify)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, shopify }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ExporterConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn shopify(&self) -> &ShopifyClient {
        &self.inner.shopify
    }

    /// Column layout for every CSV this server produces.
    #[must_use]
    pub fn layout(&self) -> ExportLayout {
        self.inner.config.layout
    }
}
