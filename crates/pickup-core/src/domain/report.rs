//! Run report and incidents.

use std::fmt;

use super::cursor::Cursor;

/// Pipeline stage an incident was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Reconcile,
    Group,
    Mail,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Reconcile => "reconcile",
            Stage::Group => "group",
            Stage::Mail => "mail",
        };
        f.write_str(name)
    }
}

/// A failure the run recovered from by degrading its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    pub stage: Stage,
    pub detail: String,
}

impl Incident {
    pub fn new(stage: Stage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.detail)
    }
}

/// What happened to a message handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MailOutcome {
    /// Empty text, no transport call.
    #[default]
    NothingToSend,
    /// Dry run: composed but deliberately not sent.
    Skipped,
    Sent,
    Failed(String),
}

/// Summary of one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub cursor_before: Cursor,
    pub cursor_after: Cursor,
    /// Orders retrieved from the source, before the bulk filter.
    pub fetched: usize,
    /// Orders that passed the bulk filter.
    pub qualified: usize,
    pub new_paid: usize,
    pub new_pending: usize,
    pub discarded: usize,
    /// Pending orders promoted to paid by reconciliation.
    pub promoted: usize,
    pub still_pending: usize,
    pub reconcile_failures: usize,
    /// Composed notification text; empty when nothing was paid.
    pub message: String,
    pub mail: MailOutcome,
    pub alert: MailOutcome,
    pub incidents: Vec<Incident>,
}

impl RunReport {
    pub fn new(cursor: Cursor) -> Self {
        Self {
            cursor_before: cursor,
            cursor_after: cursor,
            ..Self::default()
        }
    }

    pub fn record(&mut self, incident: Incident) {
        self.incidents.push(incident);
    }

    pub fn is_degraded(&self) -> bool {
        !self.incidents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_display_names_stage() {
        let incident = Incident::new(Stage::Reconcile, "order 9: connection refused");
        assert_eq!(incident.to_string(), "[reconcile] order 9: connection refused");
    }

    #[test]
    fn new_report_starts_with_unmoved_cursor() {
        let report = RunReport::new(Cursor::new(10));
        assert_eq!(report.cursor_before, report.cursor_after);
        assert_eq!(report.mail, MailOutcome::NothingToSend);
        assert!(!report.is_degraded());
    }
}
