//! MySqlWeightStore - 注文ごとの箱カテゴリ別重量を shop DB から集計
//!
//! pack 商品を構成品に展開し、箱カテゴリ（`BOX_CATEGORY_IDS`）ごとに
//! `重量 × 数量` を合計する。箱名はカテゴリ名の最初の `-` より前。

use std::time::Duration;

use async_trait::async_trait;
use pickup_core::domain::{BOX_CATEGORY_IDS, LABEL_LANGUAGE_ID, WeightRow};
use pickup_core::ports::{WeightStore, WeightStoreError};
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

use crate::config::DbConfig;

pub struct MySqlWeightStore {
    pool: MySqlPool,
    query: String,
}

impl MySqlWeightStore {
    /// Connects on first query, not here.
    pub fn connect_lazy(config: &DbConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.schema);
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_lazy_with(options);
        Self {
            pool,
            query: weight_query(&config.table_prefix, &BOX_CATEGORY_IDS, LABEL_LANGUAGE_ID),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl WeightStore for MySqlWeightStore {
    async fn weights_for(&self, reference: &str) -> Result<Vec<WeightRow>, WeightStoreError> {
        let rows: Vec<(String, String, Option<Decimal>)> = sqlx::query_as(&self.query)
            .bind(reference)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed => WeightStoreError::Connection(e.to_string()),
                other => WeightStoreError::Query(other.to_string()),
            })?;

        Ok(rows
            .into_iter()
            .map(|(reference, box_label, weight)| {
                WeightRow::new(reference, box_label, weight.unwrap_or(Decimal::ZERO))
            })
            .collect())
    }
}

/// Builds the per-order weight query. `prefix` must already be validated as
/// `[A-Za-z0-9_]*`; it is spliced into table names.
///
/// The box label is the category name up to the first `-`, with surrounding
/// whitespace trimmed: `"Box L - 3 Set"` yields `"Box L"`, not `"Box L "`.
pub fn weight_query(prefix: &str, categories: &[u32], language: u32) -> String {
    let categories = categories
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "SELECT MIN(sub.reference) AS reference, \
                TRIM(SUBSTRING_INDEX(cl.name, '-', 1)) AS box, \
                SUM(sub.total_weight) AS total_weight \
         FROM {p}category_lang cl \
         JOIN ( \
             SELECT MIN(o.reference) AS reference, \
                    MIN(cl2.id_category) AS id_category, \
                    MIN(pr.weight) * SUM(pk.quantity) AS total_weight \
             FROM {p}orders o \
             JOIN {p}order_detail od USING (id_order) \
             JOIN {p}pack pk ON od.product_id = pk.id_product_pack \
             JOIN {p}product_lang pl ON pk.id_product_item = pl.id_product \
             JOIN {p}product pr ON pk.id_product_item = pr.id_product \
             JOIN {p}category_product cp ON pk.id_product_item = cp.id_product \
             JOIN {p}category_lang cl2 ON cp.id_category = cl2.id_category \
             WHERE o.reference = ? \
               AND pl.id_lang = {language} \
               AND cl2.id_category IN ({categories}) \
               AND cl2.id_lang = {language} \
             GROUP BY pk.id_product_item \
         ) AS sub ON cl.id_category = sub.id_category \
         WHERE cl.id_category IN ({categories}) AND cl.id_lang = {language} \
         GROUP BY box \
         ORDER BY box",
        p = prefix,
    )
}
