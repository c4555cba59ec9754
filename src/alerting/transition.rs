use chrono::{DateTime, Utc};

use crate::monitor::models::Status;
use crate::notifications::models::{Notification, Priority};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Decides which status changes deserve a push notification.
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    /// Prefix of every alert title, e.g. "Plex remote".
    pub service_name: String,
    /// Whether the first observation being `down` (previous `unknown`) alerts.
    pub alert_on_initial_down: bool,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            service_name: "Plex remote".to_string(),
            alert_on_initial_down: true,
        }
    }
}

/// Details of the probe that produced the current status.
#[derive(Debug, Clone, Copy)]
pub struct ProbeContext<'a> {
    pub target: &'a str,
    pub http_code: u16,
    pub at: DateTime<Utc>,
}

impl AlertPolicy {
    /// The alert to send for a `previous` → `current` move, if any.
    ///
    /// Going down alerts with high priority; recovering from down alerts with
    /// normal priority; `unknown` → `up` and unchanged statuses stay silent.
    pub fn transition_alert(
        &self,
        previous: Status,
        current: Status,
        probe: ProbeContext<'_>,
    ) -> Option<Notification> {
        if previous == current {
            return None;
        }
        let at = probe.at.format(TIMESTAMP_FORMAT);

        match (previous, current) {
            (Status::Unknown, Status::Down) if !self.alert_on_initial_down => None,
            (_, Status::Down) => Some(
                Notification::new(
                    format!("{} health: DOWN", self.service_name),
                    format!(
                        "{} failed (HTTP {}) at {at}",
                        probe.target, probe.http_code
                    ),
                )
                .with_priority(Priority::High),
            ),
            (Status::Down, Status::Up) => Some(Notification::new(
                format!("{} health: RECOVERED", self.service_name),
                format!("Service restored at {at}"),
            )),
            _ => None,
        }
    }
}
