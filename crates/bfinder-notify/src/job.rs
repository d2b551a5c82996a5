//! The daily birthday email job.
//!
//! One run: compute today's view, render it once, and deliver it to every
//! user who opted in.  A delivery failure is logged and counted, never
//! fatal.  [`DailyEmailJob::run_scheduled`] wraps the run in a cron loop
//! that fires once per day at a configured Asia/Kolkata wall-clock time.

use std::str::FromStr;

use cron::Schedule;
use tracing::{info, warn};

use bfinder_auth::AuthStore;
use bfinder_query::clock::{Clock, SystemClock, kolkata_offset};
use bfinder_query::QueryEngine;

use crate::error::{NotifyError, Result};
use crate::render;
use crate::smtp::EmailSender;

/// Default daily send time, Asia/Kolkata wall clock.
pub const DEFAULT_SEND_TIME: &str = "07:00";

/// Environment variable overriding the daily send time (`HH:MM`).
pub const SEND_TIME_ENV: &str = "DAILY_EMAIL_TIME";

/// Environment variable holding the name signed under the message.
pub const SENDER_NAME_ENV: &str = "SENDER_NAME";

/// Outcome of one job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobReport {
    /// Birthday rows in today's view.
    pub birthdays: usize,
    /// Users with the daily email enabled.
    pub recipients: usize,
    /// Deliveries that succeeded.
    pub sent: usize,
}

/// Build the six-field cron expression for a daily `HH:MM` fire time.
///
/// # Errors
///
/// Returns [`NotifyError::Config`] if `time` is not a valid 24-hour `HH:MM`.
pub fn daily_cron_expression(time: &str) -> Result<String> {
    let bad = || NotifyError::Config {
        reason: format!("`{time}` is not a HH:MM time"),
    };

    let (hour, minute) = time.trim().split_once(':').ok_or_else(bad)?;
    let hour: u32 = hour.parse().map_err(|_| bad())?;
    let minute: u32 = minute.parse().map_err(|_| bad())?;
    if hour > 23 || minute > 59 {
        return Err(bad());
    }

    Ok(format!("0 {minute} {hour} * * *"))
}

/// The scheduled notifier: query engine + auth store + a sender.
pub struct DailyEmailJob<S: EmailSender> {
    engine: QueryEngine,
    auth: AuthStore,
    sender: S,
    sender_name: String,
}

impl<S: EmailSender> DailyEmailJob<S> {
    /// Create a job.  `sender_name` is signed under the templated message.
    pub fn new(engine: QueryEngine, auth: AuthStore, sender: S, sender_name: String) -> Self {
        Self {
            engine,
            auth,
            sender,
            sender_name,
        }
    }

    /// Run the job once against `clock`.
    ///
    /// With no birthdays today the run is a clean no-op.  Delivery failures
    /// are logged per recipient and reflected in the report counts only.
    ///
    /// # Errors
    ///
    /// Returns an error only if the view cannot be computed or the opted-in
    /// user list cannot be read.
    pub async fn run_once(&self, clock: &dyn Clock) -> Result<JobReport> {
        let rows = self.engine.today(clock)?;
        if rows.is_empty() {
            info!("no birthdays today, skipping daily email");
            return Ok(JobReport {
                birthdays: 0,
                recipients: 0,
                sent: 0,
            });
        }

        let recipients = self.auth.enabled_users()?;
        if recipients.is_empty() {
            info!(birthdays = rows.len(), "no users with daily email enabled");
            return Ok(JobReport {
                birthdays: rows.len(),
                recipients: 0,
                sent: 0,
            });
        }

        let html = render::render_email(&rows, &self.sender_name);

        let mut sent = 0;
        for recipient in &recipients {
            if self.sender.send(recipient, render::SUBJECT, &html).await {
                info!(to = %recipient, "daily email sent");
                sent += 1;
            } else {
                warn!(to = %recipient, "daily email failed");
            }
        }

        Ok(JobReport {
            birthdays: rows.len(),
            recipients: recipients.len(),
            sent,
        })
    }

    /// Run forever, firing once per day at `send_time` (Asia/Kolkata).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Config`] / [`NotifyError::Schedule`] if the
    /// fire time is invalid.  Individual run failures are logged and the
    /// loop continues.
    pub async fn run_scheduled(&self, send_time: &str) -> Result<()> {
        let expression = daily_cron_expression(send_time)?;
        let schedule = Schedule::from_str(&expression).map_err(|e| NotifyError::Schedule {
            reason: format!("bad cron expression `{expression}`: {e}"),
        })?;

        info!(%expression, "daily email schedule started");

        loop {
            let Some(next) = schedule.upcoming(kolkata_offset()).next() else {
                return Err(NotifyError::Schedule {
                    reason: "schedule yielded no upcoming fire time".into(),
                });
            };

            let now = chrono::Utc::now().with_timezone(&kolkata_offset());
            let wait = (next - now).to_std().unwrap_or_default();
            info!(fire_at = %next, "sleeping until next daily email");
            tokio::time::sleep(wait).await;

            match self.run_once(&SystemClock).await {
                Ok(report) => info!(
                    birthdays = report.birthdays,
                    recipients = report.recipients,
                    sent = report.sent,
                    "daily email run complete"
                ),
                Err(e) => warn!(error = %e, "daily email run failed"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
