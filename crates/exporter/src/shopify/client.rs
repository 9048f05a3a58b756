//! HTTP client for the Shopify Admin API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use graphql_client::GraphQLQuery;
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use zedonk_core::{Order, OrderGid};

use super::graphql::{self, GetOrderForExport, LINE_ITEM_LIMIT};
use super::rest::{self, OrderEnvelope, ProductEnvelope};
use super::{GraphQLError, GraphQLErrorLocation, ShopifyError};
use crate::config::{ApiMode, ShopifyConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body kept in error messages and logs.
const BODY_SNIPPET_LEN: usize = 500;

const CALL_LIMIT_HEADER: &str = "X-Shopify-Shop-Api-Call-Limit";

/// Shopify Admin API client.
///
/// Cheap to clone; the connection pool and credentials are shared.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    api_root: Url,
    access_token: SecretString,
    api_mode: ApiMode,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<GraphQLErrors>,
}

/// Shopify sends a plain string for some top-level failures.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GraphQLErrors {
    List(Vec<GraphQLErrorResponse>),
    Message(String),
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl GraphQLErrors {
    fn into_errors(self) -> Vec<GraphQLError> {
        match self {
            Self::Message(message) => vec![GraphQLError::message(message)],
            Self::List(errors) => errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e
                        .path
                        .into_iter()
                        .map(|p| match p {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl ShopifyClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API root URL cannot be built or the HTTP
    /// client fails to initialize.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("zedonk-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_root = config
            .base_url
            .join(&format!("admin/api/{}/", config.api_version))?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                api_root,
                access_token: config.access_token.clone(),
                api_mode: config.api_mode,
            }),
        })
    }

    /// Which Admin API this client reads orders from.
    #[must_use]
    pub fn api_mode(&self) -> ApiMode {
        self.inner.api_mode
    }

    /// Fetch one order in the core model.
    ///
    /// Returns `Ok(None)` when Shopify has no such order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rate limited or rejected,
    /// or the payload cannot be parsed.
    #[instrument(skip(self), fields(order_id = %id, api = %self.inner.api_mode))]
    pub async fn fetch_order(&self, id: OrderGid) -> Result<Option<Order>, ShopifyError> {
        let order = match self.inner.api_mode {
            ApiMode::GraphQl => self.fetch_order_graphql(id).await?,
            ApiMode::Rest => self.fetch_order_rest(id).await?,
        };

        if let Some(order) = &order {
            debug!(
                name = %order.name,
                line_items = order.line_items.len(),
                "Fetched order"
            );
        }

        Ok(order)
    }

    async fn fetch_order_graphql(&self, id: OrderGid) -> Result<Option<Order>, ShopifyError> {
        let variables = graphql::Variables { id: id.to_gid() };
        let response = self.execute::<GetOrderForExport>(variables).await?;

        Ok(response.order.map(|order| {
            if order.line_items.edges.len() >= LINE_ITEM_LIMIT {
                warn!(
                    limit = LINE_ITEM_LIMIT,
                    "Order has at least as many line items as fetched, export may be truncated"
                );
            }
            graphql::convert_order(order)
        }))
    }

    async fn fetch_order_rest(&self, id: OrderGid) -> Result<Option<Order>, ShopifyError> {
        let Some(envelope) = self
            .get_json::<OrderEnvelope>(&format!("orders/{}.json", id.numeric()))
            .await?
        else {
            return Ok(None);
        };

        let mut products = HashMap::new();
        for product_id in envelope.order.product_ids() {
            match self
                .get_json::<ProductEnvelope>(&format!("products/{product_id}.json"))
                .await?
            {
                Some(p) => {
                    products.insert(product_id, p.product);
                }
                None => warn!(product_id, "Product not found, line fields will be sparse"),
            }
        }

        Ok(Some(rest::convert_order(envelope.order, &products)))
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let endpoint = self.inner.api_root.join("graphql.json")?;
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(endpoint)
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let text = check_status(response).await?.text().await?;
        let graphql_response: GraphQLResponse<Q::ResponseData> =
            serde_json::from_str(&text).inspect_err(|e| {
                warn!(error = %e, body = %snippet(&text), "Unparseable GraphQL response");
            })?;

        if let Some(errors) = graphql_response.errors {
            let errors = errors.into_errors();
            if !errors.is_empty() {
                return Err(ShopifyError::GraphQL(errors));
            }
        }

        graphql_response
            .data
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }

    /// GET a REST resource relative to the API root. `404` maps to `None`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ShopifyError> {
        let url = self.inner.api_root.join(path)?;

        let response = self
            .inner
            .client
            .get(url)
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "REST resource not found");
            return Ok(None);
        }

        let text = check_status(response).await?.text().await?;
        let value = serde_json::from_str(&text).inspect_err(|e| {
            warn!(error = %e, path, body = %snippet(&text), "Unparseable REST response");
        })?;
        Ok(Some(value))
    }
}

/// Map rate limiting, auth failures and other non-2xx statuses to errors.
async fn check_status(response: Response) -> Result<Response, ShopifyError> {
    if let Some(limit) = response
        .headers()
        .get(CALL_LIMIT_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        debug!(call_limit = limit, "Shopify API call budget");
    }

    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after)
            .unwrap_or(60);
        return Err(ShopifyError::RateLimited(retry_after));
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ShopifyError::Unauthorized(format!(
            "Shopify rejected the access token ({status})"
        )));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ShopifyError::Status {
            status: status.as_u16(),
            body: snippet(&body).to_string(),
        });
    }

    Ok(response)
}

/// Shopify sends fractional seconds (`2.0`); round up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_retry_after(raw: &str) -> Option<u64> {
    let secs: f64 = raw.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(secs.ceil() as u64)
    } else {
        None
    }
}

fn snippet(body: &str) -> &str {
    match body.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => body.get(..idx).unwrap_or(body),
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("2"), Some(2));
        assert_eq!(parse_retry_after("2.0"), Some(2));
        assert_eq!(parse_retry_after(" 1.5 "), Some(2));
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after("-1"), None);
    }

    #[test]
    fn test_snippet_is_char_safe() {
        let long = "가".repeat(BODY_SNIPPET_LEN + 10);
        assert_eq!(snippet(&long).chars().count(), BODY_SNIPPET_LEN);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_graphql_errors_list() {
        let response: GraphQLResponse<serde_json::Value> = serde_json::from_str(
            r#"{"data": null, "errors": [{"message": "Invalid id", "locations": [{"line": 2, "column": 3}], "path": ["order", 0]}]}"#,
        )
        .unwrap();
        let errors = response.errors.unwrap().into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid id");
        assert_eq!(errors[0].locations[0].line, 2);
        assert_eq!(errors[0].path, vec!["order", "0"]);
    }

    #[test]
    fn test_graphql_errors_string() {
        let response: GraphQLResponse<serde_json::Value> =
            serde_json::from_str(r#"{"errors": "[API] Invalid API key or access token"}"#)
                .unwrap();
        let errors = response.errors.unwrap().into_errors();
        assert_eq!(errors[0].message, "[API] Invalid API key or access token");
    }

    #[test]
    fn test_api_root() {
        let config = ShopifyConfig::new("example.myshopify.com", SecretString::from("shpat_x"))
            .unwrap()
            .with_base_url("http://127.0.0.1:9999")
            .unwrap();
        let client = ShopifyClient::new(&config).unwrap();
        assert_eq!(
            client.inner.api_root.as_str(),
            "http://127.0.0.1:9999/admin/api/2024-01/"
        );
    }
}
