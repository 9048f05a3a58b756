//! Order export command.
//!
//! # Usage
//!
//! ```bash
//! zedonk-cli export --ids 1001,1002 --output orders.csv
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE` - Store domain
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token
//! - `SHOPIFY_API_VERSION`, `SHOPIFY_API_BASE_URL` - Optional overrides

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use zedonk_core::{ExportError, ExportLayout, export_orders};
use zedonk_exporter::services::{BulkSummary, fetch_orders, split_ids};
use zedonk_exporter::{ApiMode, ConfigError, ExporterConfig, ShopifyClient, ShopifyError};

/// Errors that can occur during an export.
#[derive(Debug, Error)]
pub enum ExportCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The Shopify client could not be created.
    #[error("Shopify client error: {0}")]
    Shopify(#[from] ShopifyError),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] ExportError),

    /// Writing the output failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// `--ids` held no usable ids.
    #[error("No order ids given")]
    NoIds,

    /// Every requested order failed.
    #[error("No orders exported ({failed} of {requested} failed)")]
    NothingExported {
        /// Ids requested.
        requested: usize,
        /// Ids that failed.
        failed: usize,
    },
}

/// Parsed `export` arguments.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub ids: String,
    pub output: Option<PathBuf>,
    pub pricing: bool,
    pub api: Option<ApiMode>,
}

impl ExportOptions {
    const fn layout(&self) -> ExportLayout {
        if self.pricing {
            ExportLayout::WithPricing
        } else {
            ExportLayout::Basic
        }
    }
}

/// Run the export with configuration from the environment.
///
/// # Errors
///
/// Returns an error if configuration is invalid, no order could be
/// exported, or the output cannot be written.
pub async fn run(options: ExportOptions) -> Result<BulkSummary, ExportCommandError> {
    let mut config = ExporterConfig::from_env()?;
    for warning in config.shopify.token_warnings() {
        tracing::warn!("{warning}");
    }
    if let Some(api) = options.api {
        config.shopify.api_mode = api;
    }
    let client = ShopifyClient::new(&config.shopify)?;

    let (csv, summary) = export_csv(&client, &options.ids, options.layout()).await?;

    match &options.output {
        Some(path) => {
            std::fs::write(path, &csv)?;
            tracing::info!(path = %path.display(), "Wrote CSV");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(csv.as_bytes())?;
            stdout.flush()?;
        }
    }

    tracing::info!(
        requested = summary.requested,
        exported = summary.successful,
        skipped = summary.failed,
        "Export complete"
    );

    Ok(summary)
}

/// Fetch `raw_ids` and serialize whatever succeeded.
///
/// # Errors
///
/// Returns `NoIds` for an empty list and `NothingExported` when every id
/// failed.
pub async fn export_csv(
    client: &ShopifyClient,
    raw_ids: &str,
    layout: ExportLayout,
) -> Result<(String, BulkSummary), ExportCommandError> {
    let ids = split_ids(raw_ids);
    if ids.is_empty() {
        return Err(ExportCommandError::NoIds);
    }

    let export = fetch_orders(client, &ids).await;
    let summary = export.summary();
    if export.orders.is_empty() {
        return Err(ExportCommandError::NothingExported {
            requested: summary.requested,
            failed: summary.failed,
        });
    }

    Ok((export_orders(&export.orders, layout)?, summary))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zedonk_exporter::ShopifyConfig;

    async fn client_for(server: &MockServer) -> ShopifyClient {
        let config = ShopifyConfig::new(
            "zedonk-test.myshopify.com",
            SecretString::from("shpat_test_token"),
        )
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap()
        .with_api_mode(ApiMode::Rest);
        ShopifyClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_export_csv_skips_missing_orders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2024-01/orders/1001.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "order": {
                    "name": "#1001",
                    "tags": "customer:Atelier Nord, account:3001",
                    "line_items": [
                        {"title": "Scarf", "quantity": 2, "sku": "SC01ACRDOS"}
                    ]
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2024-01/orders/1002.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let (csv, summary) = export_csv(&client, "1001, 1002, nope", ExportLayout::Basic)
            .await
            .unwrap();

        assert_eq!(summary.requested, 3);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 2);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "#1001,Atelier Nord,3001,SC01AC,ACC,,,,2");
    }

    #[tokio::test]
    async fn test_export_csv_fails_when_nothing_exported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = export_csv(&client, "1001", ExportLayout::Basic)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportCommandError::NothingExported {
                requested: 1,
                failed: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_export_csv_requires_ids() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        let err = export_csv(&client, " , ", ExportLayout::Basic)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportCommandError::NoIds));
    }
}
