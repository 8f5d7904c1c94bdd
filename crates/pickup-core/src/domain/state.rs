//! State - 注文状態ラベルの分類
//!
//! 注文状態はショップ側の表示ラベル（文字列）で届くため、
//! 固定の語彙との完全一致で分類します。

/// Labels that mean the order is fully paid and ready for pickup.
pub const PAID_STATES: [&str; 4] = [
    "Payment accepted",
    "On backorder (paid)",
    "Paid with Bitcoin",
    "Remote payment accepted",
];

/// Labels after which an order is no longer tracked.
pub const DISCARD_STATES: [&str; 2] = ["Canceled", "Shipped"];

/// OrderClass は注文のライフサイクル上の位置
///
/// # 状態遷移
/// - New → Paid / Pending / Discarded（初回分類）
/// - Pending → Paid / Pending / Discarded（reconcile ごと）
/// - Paid, Discarded は終端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderClass {
    Paid,
    Pending,
    Discarded,
}

impl OrderClass {
    pub fn of(order_state: &str) -> Self {
        if PAID_STATES.contains(&order_state) {
            OrderClass::Paid
        } else if DISCARD_STATES.contains(&order_state) {
            OrderClass::Discarded
        } else {
            OrderClass::Pending
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderClass::Pending)
    }
}
