use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use super::models::CheckOutcome;
use super::probe::ServiceProbe;
use crate::alerting::transition::{AlertPolicy, ProbeContext};
use crate::notifications::senders::{NotificationSender, SenderError};
use crate::status_store::{StatusStore, StoreError};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Status store error: {0}")]
    Store(#[from] StoreError),
    #[error("Notification error: {0}")]
    Notification(#[from] SenderError),
}

/// One probe → compare → notify → persist cycle over injected collaborators.
pub struct HealthCheckService<P, S, N> {
    prober: P,
    store: S,
    sender: N,
    policy: AlertPolicy,
}

impl<P, S, N> HealthCheckService<P, S, N>
where
    P: ServiceProbe + Send + Sync,
    S: StatusStore + Send + Sync,
    N: NotificationSender + Send + Sync,
{
    pub fn new(prober: P, store: S, sender: N, policy: AlertPolicy) -> Self {
        Self {
            prober,
            store,
            sender,
            policy,
        }
    }

    /// Runs a single check.
    ///
    /// The new status is persisted only when it differs from the stored one,
    /// and only after any alert for the change was delivered. A failed
    /// delivery therefore leaves the old status in place.
    pub async fn run(&self) -> Result<CheckOutcome, CheckError> {
        let probe = self.prober.probe().await;
        let previous = self.store.get_previous().await?;
        let outcome = CheckOutcome {
            previous,
            current: probe.status,
            http_code: probe.http_code,
        };

        if !outcome.changed() {
            info!(status = %outcome.current, "Status unchanged.");
            return Ok(outcome);
        }

        info!(previous = %outcome.previous, current = %outcome.current, http_code = outcome.http_code, "Status changed.");
        let context = ProbeContext {
            target: self.prober.target(),
            http_code: probe.http_code,
            at: Utc::now(),
        };
        if let Some(notification) =
            self.policy
                .transition_alert(outcome.previous, outcome.current, context)
        {
            if let Err(e) = self.sender.send(&notification).await {
                error!(error = %e, title = %notification.title, "Failed to send transition alert.");
                return Err(e.into());
            }
        }

        self.store.put_status(outcome.current).await?;
        Ok(outcome)
    }
}
