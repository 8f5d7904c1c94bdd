//! Clock port - 日付の抽象化
//!
//! 通知文の「次の金曜日」を決定的にするため、日付は必ずここから取る。

use chrono::{Local, NaiveDate};

/// Clock は今日の日付を提供
///
/// # テスト容易性
/// - trait により日付を差し替え可能
/// - テストでは FixedClock を使用
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_stable() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let clock = FixedClock::new(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.today(), clock.today());
    }

    #[test]
    fn system_clock_is_close_to_local_now() {
        let before = Local::now().date_naive();
        let today = SystemClock.today();
        let after = Local::now().date_naive();
        assert!(before <= today && today <= after);
    }
}
