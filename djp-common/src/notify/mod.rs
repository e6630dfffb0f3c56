//! Outbound notifications
//!
//! Decides nothing about transport: messages go onto an mpsc queue and a
//! dispatcher task hands them to a [`Notifier`] implementation. Dispatch
//! is fire-and-forget; a failure is logged for that recipient and the
//! queue keeps draining. The trigger predicates that decide *when* a
//! message is due live in [`triggers`].

pub mod triggers;

use crate::db::models::{Assignment, AssignmentWithPerformer, Performer};
use crate::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Queue depth before enqueue starts dropping
pub const QUEUE_DEPTH: usize = 64;

/// Who a performer-facing notification goes to
#[derive(Debug, Clone)]
pub struct Recipient {
    pub dj_name: String,
    pub email: String,
}

impl From<&Performer> for Recipient {
    fn from(p: &Performer) -> Self {
        Recipient {
            dj_name: p.dj_name.clone(),
            email: p.email.clone(),
        }
    }
}

impl From<&AssignmentWithPerformer> for Recipient {
    fn from(a: &AssignmentWithPerformer) -> Self {
        Recipient {
            dj_name: a.dj_name.clone(),
            email: a.email.clone(),
        }
    }
}

/// A queued outbound notification
#[derive(Debug, Clone)]
pub enum NotificationMessage {
    Assigned {
        recipient: Recipient,
        assignment: Assignment,
    },
    Reminder {
        recipient: Recipient,
        assignment: Assignment,
        days_left: i64,
    },
    AdminAlert {
        admin_email: String,
        date: NaiveDate,
        available_count: i64,
    },
}

/// Delivery boundary
///
/// Implementations own the transport (mail, webhook, ...). Errors are
/// per-recipient: the dispatcher logs them and moves on.
pub trait Notifier: Send + Sync {
    fn notify_assignment(&self, recipient: &Recipient, assignment: &Assignment) -> Result<()>;

    fn notify_reminder(
        &self,
        recipient: &Recipient,
        assignment: &Assignment,
        days_left: i64,
    ) -> Result<()>;

    fn notify_admin_alert(
        &self,
        admin_email: &str,
        date: NaiveDate,
        available_count: i64,
    ) -> Result<()>;
}

/// Spawn the dispatcher task
///
/// Returns the queue sender and the task handle. Dropping every sender
/// drains the queue and ends the task, which is how the cron binary
/// flushes before exit.
pub fn spawn_dispatcher(
    notifier: Arc<dyn Notifier>,
) -> (mpsc::Sender<NotificationMessage>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<NotificationMessage>(QUEUE_DEPTH);

    let handle = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = deliver(notifier.as_ref(), &msg) {
                // One failed recipient must not stop the rest of the batch
                error!("Notification delivery failed: {}", e);
            }
        }
    });

    (tx, handle)
}

/// Enqueue a notification, dropping it with a warning if the queue is
/// full or the dispatcher is gone
///
/// A dropped notification never fails the state change it reports on.
pub fn enqueue(tx: &mpsc::Sender<NotificationMessage>, msg: NotificationMessage) {
    if let Err(e) = tx.try_send(msg) {
        warn!("Dropping notification: {}", e);
    }
}

fn deliver(notifier: &dyn Notifier, msg: &NotificationMessage) -> Result<()> {
    match msg {
        NotificationMessage::Assigned { recipient, assignment } => {
            notifier.notify_assignment(recipient, assignment)
        }
        NotificationMessage::Reminder {
            recipient,
            assignment,
            days_left,
        } => notifier.notify_reminder(recipient, assignment, *days_left),
        NotificationMessage::AdminAlert {
            admin_email,
            date,
            available_count,
        } => notifier.notify_admin_alert(admin_email, *date, *available_count),
    }
}

/// Development notifier: writes every notification to the log
///
/// Stands in for the real transport, which lives outside this crate.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_assignment(&self, recipient: &Recipient, assignment: &Assignment) -> Result<()> {
        info!(
            "[notify] {} <{}>: new {} set on {} (fee {})",
            recipient.dj_name, recipient.email, assignment.slot, assignment.date, assignment.fee
        );
        Ok(())
    }

    fn notify_reminder(
        &self,
        recipient: &Recipient,
        assignment: &Assignment,
        days_left: i64,
    ) -> Result<()> {
        info!(
            "[notify] {} <{}>: {} set on {} in {} day(s)",
            recipient.dj_name, recipient.email, assignment.slot, assignment.date, days_left
        );
        Ok(())
    }

    fn notify_admin_alert(
        &self,
        admin_email: &str,
        date: NaiveDate,
        available_count: i64,
    ) -> Result<()> {
        info!(
            "[notify] <{}>: {} is uncovered ({} willing performer(s))",
            admin_email, date, available_count
        );
        Ok(())
    }
}
