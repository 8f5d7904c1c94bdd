//! Weight rows and the per-run grouped mapping.

use rust_decimal::Decimal;

use super::order::{Order, OrderId};

/// Category ids whose products ship in the standard boxes.
pub const BOX_CATEGORY_IDS: [u32; 3] = [14, 16, 17];

/// Shop language used for category and product labels.
pub const LABEL_LANGUAGE_ID: u32 = 1;

/// Aggregated shipment weight of one box category within one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightRow {
    /// Order reference the row is scoped to.
    pub reference: String,
    /// Leading token of the category label (text before the first `-`).
    pub box_label: String,
    /// Total weight in kilograms.
    pub total_weight: Decimal,
}

impl WeightRow {
    pub fn new(reference: impl Into<String>, box_label: impl Into<String>, total_weight: Decimal) -> Self {
        Self {
            reference: reference.into(),
            box_label: box_label.into(),
            total_weight,
        }
    }
}

/// Paid orders with their weight rows, in insertion order.
///
/// Rebuilt on every run and never persisted. An order id is held at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedOrders {
    entries: Vec<(Order, Vec<WeightRow>)>,
}

impl GroupedOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an order. Returns false if the order id was already present.
    pub fn insert(&mut self, order: Order, rows: Vec<WeightRow>) -> bool {
        if self.contains(order.id) {
            return false;
        }
        self.entries.push((order, rows));
        true
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.entries.iter().any(|(order, _)| order.id == id)
    }

    pub fn get(&self, id: OrderId) -> Option<&[WeightRow]> {
        self.entries
            .iter()
            .find(|(order, _)| order.id == id)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Order, &[WeightRow])> {
        self.entries.iter().map(|(order, rows)| (order, rows.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
