//! Ports - 外部システムへの抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 注文サービス・重量 DB・メール送信・時計をそれぞれ trait として切り出し、
//! パイプライン本体（app）からは実装の詳細が見えないようにします。
//!
//! 本番用の実装は `pickup-cli` に、テスト用の実装は `impls` にあります。

pub mod clock;
pub mod mail_transport;
pub mod order_source;
pub mod weight_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::mail_transport::{MailTransport, OutgoingMail, TransportError};
pub use self::order_source::{OrderSource, OrderSourceError};
pub use self::weight_store::{WeightStore, WeightStoreError};
