//! djp-cr - Daily notification run
//!
//! Invoked once a day by an external scheduler. Evaluates the reminder
//! and coverage-alert predicates against current state, queues what is
//! due, flushes the queue and exits. The predicates carry no sent-memory;
//! running this twice on the same day sends twice.

use anyhow::Result;
use clap::Parser;
use djp_common::config;
use djp_common::db::{init_database, settings};
use djp_common::notify::triggers;
use djp_common::notify::{enqueue, spawn_dispatcher, NotificationMessage, Recipient, TracingNotifier};
use djp_common::time;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "djp-cr", about = "Daily reminder and coverage-alert run")]
struct Args {
    /// Data root folder (overrides DJP_ROOT and the config file)
    #[arg(long)]
    root: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting daily notification run (djp-cr) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root.as_deref());
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let today = time::today();
    let lead_days = settings::reminder_days(&pool).await?;
    let window_days = settings::alert_window_days(&pool).await?;
    let admin_email = settings::admin_email(&pool).await?;

    info!("Today: {}; reminder leads {:?}; alert window {} days", today, lead_days, window_days);

    let reminders = triggers::due_reminders(&pool, today, &lead_days).await?;
    let alerts = triggers::due_admin_alerts(&pool, today, window_days).await?;

    // Delivery transport lives outside this binary; log-only here
    let (tx, dispatcher) = spawn_dispatcher(Arc::new(TracingNotifier));

    for due in &reminders {
        enqueue(
            &tx,
            NotificationMessage::Reminder {
                recipient: Recipient::from(&due.assignment),
                assignment: due.assignment.assignment.clone(),
                days_left: due.days_left,
            },
        );
    }

    for alert in &alerts {
        enqueue(
            &tx,
            NotificationMessage::AdminAlert {
                admin_email: admin_email.clone(),
                date: alert.date,
                available_count: alert.available_count,
            },
        );
    }

    // Dropping the sender lets the dispatcher drain and finish
    drop(tx);
    dispatcher.await?;

    info!(
        "Notification run complete: {} reminder(s), {} coverage alert(s)",
        reminders.len(),
        alerts.len()
    );

    Ok(())
}
