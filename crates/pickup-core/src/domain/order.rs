//! Order snapshot - 注文サービスから取得した注文の不変スナップショット
//!
//! `Order` は pending キューの行スキーマでもあります。
//! フィールドの並びは `Order::FIELDS` と常に一致させること。

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of an order on the remote shop.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable snapshot of one order as returned by the order source.
///
/// Optional fields are the ones the shop allows to be blank on an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub reference: String,
    pub order_state: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_paid: Decimal,
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub email: String,
    pub address: String,
    pub city: String,
    pub post_code: String,
    pub state: Option<String>,
    pub country: String,
    pub phone: Option<String>,
}

impl Order {
    /// Column schema of the pending queue, in declaration order.
    pub const FIELDS: [&'static str; 14] = [
        "id",
        "reference",
        "order_state",
        "total_paid",
        "first_name",
        "last_name",
        "company_name",
        "email",
        "address",
        "city",
        "post_code",
        "state",
        "country",
        "phone",
    ];

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order-{} ({}, {})", self.id, self.reference, self.order_state)
    }
}
