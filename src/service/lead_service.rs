//! Lead service: runs the contact → deal → activities pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::GatewayConfig;
use crate::crm::{CrmApi, CrmError};
use crate::domain::{ContactId, DealId, DedupeKey, LeadSubmission};

use super::activity::{ActivityReport, ActivityScheduler};
use super::contact::{ContactReconciler, ContactResolution};
use super::deal::DealCreator;

/// Everything a successful submission produced.
#[derive(Debug)]
pub struct LeadOutcome {
    /// Informational dedupe key of the submission.
    pub key: DedupeKey,
    /// Contact reconciliation details.
    pub contact: ContactResolution,
    /// The deal created for the lead.
    pub deal_id: DealId,
    /// Reminder outcomes.
    pub activities: ActivityReport,
}

impl LeadOutcome {
    /// Contact the deal is linked to.
    #[must_use]
    pub const fn contact_id(&self) -> ContactId {
        self.contact.contact_id
    }
}

/// Orchestration layer for lead capture.
///
/// Stateless coordinator: each submission runs the same ordered steps,
/// each consuming the previous step's id. Contact creation and deal
/// creation are required and abort the pipeline on failure; the lookup,
/// the contact update, and the reminders are best-effort.
#[derive(Debug, Clone)]
pub struct LeadService {
    crm: Arc<dyn CrmApi>,
    contacts: ContactReconciler,
    deals: DealCreator,
    activities: ActivityScheduler,
}

impl LeadService {
    /// Creates a `LeadService` over `crm` with deal and contact defaults
    /// from `config`.
    #[must_use]
    pub fn new(crm: Arc<dyn CrmApi>, config: &GatewayConfig) -> Self {
        Self {
            contacts: ContactReconciler::new(Arc::clone(&crm), config.contact_source_id.clone()),
            deals: DealCreator::new(
                Arc::clone(&crm),
                config.stage_id.clone(),
                config.category_id.clone(),
            ),
            activities: ActivityScheduler::new(Arc::clone(&crm)),
            crm,
        }
    }

    /// Relays `lead` into the CRM.
    ///
    /// `received_at` selects the dedupe window.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::NotConfigured`] before any remote call when
    /// the CRM is not configured, and propagates failures of contact
    /// creation or deal creation. A contact created before a failed deal
    /// stays in the CRM.
    pub async fn submit(
        &self,
        lead: &LeadSubmission,
        received_at: DateTime<Utc>,
    ) -> Result<LeadOutcome, CrmError> {
        if !self.crm.is_configured() {
            return Err(CrmError::NotConfigured);
        }

        let key = DedupeKey::compute(&lead.phone, received_at);
        tracing::info!(%key, "processing lead");

        let contact = self.contacts.reconcile(lead).await?;
        let deal_id = self.deals.create(contact.contact_id, lead).await?;
        let activities = self.activities.schedule(deal_id, lead).await;

        tracing::info!(
            %key,
            %deal_id,
            contact_id = %contact.contact_id,
            activities = activities.created(),
            "lead captured"
        );

        Ok(LeadOutcome {
            key,
            contact,
            deal_id,
            activities,
        })
    }
}
