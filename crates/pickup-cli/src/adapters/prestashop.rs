//! PrestaShopClient - PrestaShop Webservice からの注文取得
//!
//! # 実装
//! - Basic 認証（API キーをユーザー名、パスワードは空）
//! - `output_format=JSON`
//! - 1 注文 = order + customer + address + order_state + country (+ state) の取得
//!
//! JSON の解析と `Order` の組み立ては純粋関数に分けてある。

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use pickup_core::domain::{LABEL_LANGUAGE_ID, Order, OrderId};
use pickup_core::ports::{OrderSource, OrderSourceError};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::config::PrestaConfig;

const TIMEOUT: Duration = Duration::from_secs(30);

pub struct PrestaShopClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PrestaShopClient {
    pub fn new(config: &PrestaConfig) -> Result<Self, OrderSourceError> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| OrderSourceError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T, OrderSourceError> {
        let url = format!("{}/api/{}", self.base_url, resource);
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.api_key, Some(""))
            .query(&[("output_format", "JSON")])
            .query(query)
            .send()
            .await
            .map_err(|e| OrderSourceError::Connection(e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => return Err(OrderSourceError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(OrderSourceError::NotFound(resource.to_string())),
            status if !status.is_success() => {
                return Err(OrderSourceError::InvalidResponse(format!(
                    "HTTP {status} from {resource}"
                )));
            }
            _ => {}
        }

        let body = resp
            .text()
            .await
            .map_err(|e| OrderSourceError::Connection(e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| OrderSourceError::InvalidResponse(format!("{resource}: {e}")))
    }

    async fn name_of(&self, resource: &str) -> Result<String, OrderSourceError> {
        let named: Named = self.get(resource, &[]).await?;
        Ok(named.into_name())
    }
}

#[async_trait]
impl OrderSource for PrestaShopClient {
    async fn order_count(&self) -> Result<u64, OrderSourceError> {
        let listing: OrderListing = self
            .get(
                "orders",
                &[("display", "[id]"), ("sort", "[id_DESC]"), ("limit", "1")],
            )
            .await?;
        Ok(listing.highest_id())
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, OrderSourceError> {
        let RawOrderEnvelope { order } = self.get(&format!("orders/{id}"), &[]).await?;
        let RawCustomerEnvelope { customer } = self
            .get(&format!("customers/{}", order.id_customer), &[])
            .await
            .map_err(dangling)?;
        let RawAddressEnvelope { address } = self
            .get(&format!("addresses/{}", order.id_address_delivery), &[])
            .await
            .map_err(dangling)?;

        let state_name = self
            .name_of(&format!("order_states/{}", order.current_state))
            .await
            .map_err(dangling)?;
        let country = self
            .name_of(&format!("countries/{}", address.id_country))
            .await
            .map_err(dangling)?;
        let region = match address.id_state {
            0 => None,
            id_state => Some(
                self.name_of(&format!("states/{id_state}"))
                    .await
                    .map_err(dangling)?,
            ),
        };

        assemble(order, customer, address, state_name, country, region)
    }
}

/// Only a 404 on the order itself means the order is gone. A 404 on something
/// the order points at is a broken response.
fn dangling(err: OrderSourceError) -> OrderSourceError {
    match err {
        OrderSourceError::NotFound(resource) => {
            OrderSourceError::InvalidResponse(format!("dangling reference to {resource}"))
        }
        other => other,
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flexible {
    Number(serde_json::Number),
    Text(String),
}

impl Flexible {
    fn into_string(self) -> String {
        match self {
            Flexible::Number(n) => n.to_string(),
            Flexible::Text(s) => s,
        }
    }
}

/// PrestaShop sends ids as numbers or as numeric strings; empty means 0.
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Flexible::deserialize(deserializer)?.into_string();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(serde::de::Error::custom)
}

fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<Flexible>::deserialize(deserializer)?
        .map(Flexible::into_string)
        .unwrap_or_default())
}

/// A field that is either plain text or one value per shop language.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Localized {
    Plain(String),
    Translated(Vec<Translation>),
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(deserialize_with = "flexible_id")]
    id: u64,
    value: String,
}

impl Localized {
    fn into_text(self) -> String {
        match self {
            Localized::Plain(text) => text,
            Localized::Translated(values) => {
                let preferred = values
                    .iter()
                    .position(|t| t.id == u64::from(LABEL_LANGUAGE_ID));
                values
                    .into_iter()
                    .nth(preferred.unwrap_or(0))
                    .map(|t| t.value)
                    .unwrap_or_default()
            }
        }
    }
}

/// `order_states`, `countries` and `states` all carry a `name`.
#[derive(Debug, Deserialize)]
struct Named {
    #[serde(alias = "order_state", alias = "country", alias = "state")]
    inner: NamedInner,
}

#[derive(Debug, Deserialize)]
struct NamedInner {
    name: Localized,
}

impl Named {
    fn into_name(self) -> String {
        self.inner.name.into_text()
    }
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    #[serde(deserialize_with = "flexible_id")]
    id: u64,
}

/// An empty listing comes back as a bare `[]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrderListing {
    Orders { orders: Vec<IdOnly> },
    Empty(Vec<serde_json::Value>),
}

impl OrderListing {
    fn highest_id(&self) -> u64 {
        match self {
            OrderListing::Orders { orders } => orders.iter().map(|o| o.id).max().unwrap_or(0),
            OrderListing::Empty(_) => 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOrderEnvelope {
    order: RawOrder,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    #[serde(deserialize_with = "flexible_id")]
    id: u64,
    reference: String,
    #[serde(deserialize_with = "flexible_id")]
    id_customer: u64,
    #[serde(deserialize_with = "flexible_id")]
    id_address_delivery: u64,
    #[serde(deserialize_with = "flexible_id")]
    current_state: u64,
    #[serde(deserialize_with = "flexible_string")]
    total_paid: String,
}

#[derive(Debug, Deserialize)]
struct RawCustomerEnvelope {
    customer: RawCustomer,
}

#[derive(Debug, Deserialize)]
struct RawCustomer {
    email: String,
}

#[derive(Debug, Deserialize)]
struct RawAddressEnvelope {
    address: RawAddress,
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    firstname: String,
    lastname: String,
    #[serde(default, deserialize_with = "flexible_string")]
    company: String,
    address1: String,
    #[serde(default, deserialize_with = "flexible_string")]
    address2: String,
    city: String,
    #[serde(default, deserialize_with = "flexible_string")]
    postcode: String,
    #[serde(default, deserialize_with = "flexible_string")]
    phone: String,
    #[serde(default, deserialize_with = "flexible_string")]
    phone_mobile: String,
    #[serde(deserialize_with = "flexible_id")]
    id_country: u64,
    #[serde(default, deserialize_with = "flexible_id")]
    id_state: u64,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn assemble(
    order: RawOrder,
    customer: RawCustomer,
    address: RawAddress,
    order_state: String,
    country: String,
    region: Option<String>,
) -> Result<Order, OrderSourceError> {
    let total_paid = Decimal::from_str(order.total_paid.trim()).map_err(|e| {
        OrderSourceError::InvalidResponse(format!(
            "order {}: total_paid {:?}: {e}",
            order.id, order.total_paid
        ))
    })?;
    let street = match non_empty(address.address2) {
        Some(second) => format!("{} {}", address.address1.trim(), second),
        None => address.address1.trim().to_string(),
    };

    Ok(Order {
        id: OrderId::new(order.id),
        reference: order.reference,
        order_state,
        total_paid,
        first_name: address.firstname,
        last_name: address.lastname,
        company_name: non_empty(address.company),
        email: customer.email,
        address: street,
        city: address.city,
        post_code: address.postcode,
        state: region.and_then(non_empty),
        country,
        phone: non_empty(address.phone).or_else(|| non_empty(address.phone_mobile)),
    })
}
