//! Follow-up reminders attached to a new deal.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone};

use crate::crm::envelope::parse_id;
use crate::crm::{CrmApi, CrmError, CrmParams, METHOD_ACTIVITY_ADD};
use crate::domain::{ActivityId, DealId, LeadSubmission};

use super::BestEffort;

/// CRM owner type code of a deal.
pub const OWNER_TYPE_DEAL: u64 = 2;
/// CRM activity type code of a task.
pub const ACTIVITY_TYPE_TASK: u64 = 4;

/// Subject shared by every reminder.
pub const FOLLOW_UP_SUBJECT: &str = "Follow-up по заявке из WebApp";
/// Body of the immediate reminder ("call back within one hour").
pub const FOLLOW_UP_TEXT: &str = "Перезвонить в течение 1 часа.";
/// Body of the planned-service reminder ("scheduled repeat, contact the client").
pub const SERVICE_REMINDER_TEXT: &str = "Плановый повтор огнезащиты. Связаться с клиентом.";

/// Local time of day of the planned-service reminder.
const REMINDER_HOUR: u32 = 10;
/// Offset of the reminder time zone (UTC+3).
const REMINDER_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Outcome of [`ActivityScheduler::schedule`].
#[derive(Debug)]
pub struct ActivityReport {
    /// Immediate call-back reminder; always attempted.
    pub follow_up: BestEffort<ActivityId>,
    /// Planned-service reminder; attempted only with a next service date.
    pub service_reminder: Option<BestEffort<ActivityId>>,
}

impl ActivityReport {
    /// Number of activities the CRM accepted.
    #[must_use]
    pub fn created(&self) -> usize {
        usize::from(self.follow_up.is_completed())
            + usize::from(
                self.service_reminder
                    .as_ref()
                    .is_some_and(BestEffort::is_completed),
            )
    }
}

/// Creates the reminders for a deal. Every failure is swallowed.
#[derive(Debug, Clone)]
pub struct ActivityScheduler {
    crm: Arc<dyn CrmApi>,
}

impl ActivityScheduler {
    /// Creates a scheduler.
    #[must_use]
    pub fn new(crm: Arc<dyn CrmApi>) -> Self {
        Self { crm }
    }

    /// Creates the follow-up reminder and, when `lead` names a next
    /// service date, the planned-service reminder.
    pub async fn schedule(&self, deal_id: DealId, lead: &LeadSubmission) -> ActivityReport {
        let follow_up = BestEffort::from_result(
            "follow_up_activity",
            self.add(deal_id, FOLLOW_UP_TEXT, None).await,
        );

        let service_reminder = match lead.next_service_date() {
            Some(date) => {
                let deadline = service_deadline(date);
                Some(BestEffort::from_result(
                    "service_reminder_activity",
                    self.add(deal_id, SERVICE_REMINDER_TEXT, Some(&deadline))
                        .await,
                ))
            }
            None => None,
        };

        let report = ActivityReport {
            follow_up,
            service_reminder,
        };
        tracing::debug!(%deal_id, created = report.created(), "activities scheduled");
        report
    }

    async fn add(
        &self,
        deal_id: DealId,
        description: &str,
        deadline: Option<&str>,
    ) -> Result<ActivityId, CrmError> {
        let mut params = CrmParams::new()
            .field("OWNER_ID", deal_id)
            .field("OWNER_TYPE_ID", OWNER_TYPE_DEAL)
            .field("TYPE_ID", ACTIVITY_TYPE_TASK)
            .field("SUBJECT", FOLLOW_UP_SUBJECT)
            .field("DESCRIPTION", description);
        if let Some(deadline) = deadline {
            params = params.field("DEADLINE", deadline);
        }
        let result = self.crm.call(METHOD_ACTIVITY_ADD, &params).await?;
        Ok(ActivityId::new(parse_id(&result)?))
    }
}

/// Deadline of the planned-service reminder: `date` at 10:00 UTC+3.
///
/// A `YYYY-MM-DD` date is rendered as RFC 3339. Anything else is passed
/// through with the same time suffix and left for the CRM to judge.
#[must_use]
pub fn service_deadline(date: &str) -> String {
    let date = date.trim();
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().and_then(|day| {
        let offset = FixedOffset::east_opt(REMINDER_UTC_OFFSET_SECS)?;
        let time = NaiveTime::from_hms_opt(REMINDER_HOUR, 0, 0)?;
        offset.from_local_datetime(&day.and_time(time)).single()
    });
    match parsed {
        Some(deadline) => deadline.to_rfc3339_opts(SecondsFormat::Secs, false),
        None => format!("{date}T10:00:00+03:00"),
    }
}
