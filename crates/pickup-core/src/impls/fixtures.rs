//! Sample orders for tests and local runs.

use rust_decimal::Decimal;

use crate::domain::{Order, OrderId};

/// An order with plausible customer fields.
///
/// The reference is `REF` followed by the zero-padded id.
pub fn order(id: u64, order_state: &str, total_paid: i64) -> Order {
    Order {
        id: OrderId::new(id),
        reference: format!("REF{id:05}"),
        order_state: order_state.to_string(),
        total_paid: Decimal::from(total_paid),
        first_name: "Erika".to_string(),
        last_name: "Mustermann".to_string(),
        company_name: Some("Muster GmbH".to_string()),
        email: format!("customer{id}@example.com"),
        address: "Heidestraße 17".to_string(),
        city: "Köln".to_string(),
        post_code: "51147".to_string(),
        state: Some("NRW".to_string()),
        country: "Germany".to_string(),
        phone: Some("+49 221 000000".to_string()),
    }
}
