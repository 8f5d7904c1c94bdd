//! Domain model (orders, cursor, classification, weights, run report).

pub mod cursor;
pub mod errors;
pub mod order;
pub mod report;
pub mod state;
pub mod weight;

pub use self::cursor::Cursor;
pub use self::errors::{ErrorKind, PickupError};
pub use self::order::{Order, OrderId};
pub use self::report::{Incident, MailOutcome, RunReport, Stage};
pub use self::state::{DISCARD_STATES, OrderClass, PAID_STATES};
pub use self::weight::{BOX_CATEGORY_IDS, GroupedOrders, LABEL_LANGUAGE_ID, WeightRow};
