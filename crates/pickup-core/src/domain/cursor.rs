//! Cursor - 処理済みの最大注文 ID

use std::fmt;

use super::order::OrderId;

/// Last fully-processed order identifier.
///
/// The cursor only moves forward: `advance_to` ignores values that are not
/// strictly greater than the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Cursor(u64);

impl Cursor {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the advanced cursor, or `None` if `remote_count` is not ahead.
    pub fn advance_to(self, remote_count: u64) -> Option<Cursor> {
        (remote_count > self.0).then_some(Cursor(remote_count))
    }

    /// Identifiers in `(self, remote_count]`, ascending.
    pub fn unseen_ids(self, remote_count: u64) -> impl Iterator<Item = OrderId> {
        (self.0.saturating_add(1)..=remote_count).map(OrderId::new)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
