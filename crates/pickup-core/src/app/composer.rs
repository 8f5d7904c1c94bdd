//! NotificationComposer - 集荷依頼メール本文の生成
//!
//! 出力は入力と日付だけで決まる（同じ入力・同じ日付なら同じ文字列）。

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::domain::{GroupedOrders, Order, WeightRow};

const GREETING: &str = "Hallo Herr Pux / Herr Böhm,\n\n\
    Bitte um um günstige Optionen für folgende(n) Kunden:\n\n\t#Standard 3 Set(s):\n\n";
const NO_COMPANY: &str = "-------";
const NO_PHONE: &str = "No phone number entered";
const SEPARATOR_WIDTH: usize = 21;

pub struct NotificationComposer {
    signature: String,
}

impl NotificationComposer {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
        }
    }

    /// Renders the pickup request; empty text means there is nothing to send.
    pub fn compose(&self, grouped: &GroupedOrders, today: NaiveDate) -> String {
        if grouped.is_empty() {
            return String::new();
        }

        let mut text = String::from(GREETING);
        for (order, rows) in grouped.iter() {
            text.push_str(&order_block(order, rows));
        }
        text.push_str(&format!(
            "Buchen Sie bitte die Abholung für Freitag {} von 13:00-15:00. Danke Vielmals!\n\n\
             Mit freundlichen Grüßen,\n\n{}",
            next_friday(today).format("%d.%m"),
            self.signature
        ));
        text
    }
}

fn order_block(order: &Order, rows: &[WeightRow]) -> String {
    format!(
        "{email}\n{name}\n{company}\n{address}\n{city} {post_code} {state}\n{country}\n{phone}\n\n{rows}\n{separator}\n\n",
        email = order.email,
        name = order.full_name(),
        company = order.company_name.as_deref().unwrap_or(NO_COMPANY),
        address = order.address,
        city = order.city,
        post_code = order.post_code,
        state = order.state.as_deref().unwrap_or(""),
        country = order.country,
        phone = order.phone.as_deref().unwrap_or(NO_PHONE),
        rows = format_weight_rows(rows),
        separator = "-".repeat(SEPARATOR_WIDTH),
    )
}

/// One `"<reference> - <box> - <weight> kg."` line per row.
pub fn format_weight_rows(rows: &[WeightRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{} - {} - {:.3} kg.\n",
                row.reference,
                row.box_label,
                row.total_weight.round_dp(3)
            )
        })
        .collect()
}

/// The first Friday strictly after `today`.
pub fn next_friday(today: NaiveDate) -> NaiveDate {
    let from_monday = today.weekday().num_days_from_monday();
    let friday = Weekday::Fri.num_days_from_monday();
    let ahead = match (friday + 7 - from_monday) % 7 {
        0 => 7,
        days => days,
    };
    today + Days::new(u64::from(ahead))
}
