//! Daily reminder batch.
//!
//! Once a day every user with reminders enabled and a registered push token
//! gets one notification. Delivery is best effort: a failed send is logged
//! and reported in the outcome, never retried.

use chrono::{DateTime, Days, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Hour of day (UTC) the batch runs.
pub const REMINDER_HOUR_UTC: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRecipient {
    pub user_id: String,
    #[serde(default)]
    pub reminders_enabled: bool,
    #[serde(default, rename = "fcmToken", alias = "pushToken")]
    pub push_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
}

impl ReminderPayload {
    pub fn daily() -> Self {
        Self {
            title: "Just Be".to_string(),
            body: "Time for your daily moment of calm.".to_string(),
            icon: "/pwa-192x192.png".to_string(),
        }
    }
}

/// Push delivery backend.
pub trait Notifier {
    fn send(&mut self, tokens: &[String], payload: &ReminderPayload) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    NoRecipients,
    Sent { count: usize },
    Failed { count: usize },
}

/// Tokens of users who opted in. Blank tokens are ignored.
pub fn collect_reminder_tokens(recipients: &[ReminderRecipient]) -> Vec<String> {
    recipients
        .iter()
        .filter(|recipient| recipient.reminders_enabled)
        .filter_map(|recipient| recipient.push_token.as_deref())
        .filter(|token| !token.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn dispatch_daily_reminder(
    recipients: &[ReminderRecipient],
    notifier: &mut dyn Notifier,
) -> ReminderOutcome {
    let tokens = collect_reminder_tokens(recipients);
    if tokens.is_empty() {
        tracing::info!("No users with reminders enabled");
        return ReminderOutcome::NoRecipients;
    }

    let count = tokens.len();
    match notifier.send(&tokens, &ReminderPayload::daily()) {
        Ok(()) => {
            tracing::info!(count, "Sent daily reminders");
            ReminderOutcome::Sent { count }
        }
        Err(err) => {
            tracing::error!(error = %err, count, "Failed to send daily reminders");
            ReminderOutcome::Failed { count }
        }
    }
}

/// Next batch time strictly after `now`.
pub fn next_reminder_at(now: DateTime<Utc>) -> DateTime<Utc> {
    let run_time = NaiveTime::from_hms_opt(REMINDER_HOUR_UTC, 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(run_time).and_utc();
    if today > now {
        return today;
    }
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}
