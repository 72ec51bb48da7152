//! Contact reconciliation: find the contact by phone or create one.

use std::sync::Arc;

use crate::crm::envelope::{first_contact_id, parse_id};
use crate::crm::{
    CrmApi, CrmError, CrmParams, METHOD_CONTACT_ADD, METHOD_CONTACT_UPDATE,
    METHOD_FIND_DUPLICATES,
};
use crate::domain::{ContactId, LeadSubmission};

use super::BestEffort;

const PHONE_VALUE_TYPE: &str = "MOBILE";
const TELEGRAM_FIELD: &str = "UF_CRM_TELEGRAM";

/// How the contact id of a lead was obtained.
#[derive(Debug)]
pub enum ContactOrigin {
    /// An existing contact matched the phone number.
    Existing {
        /// Telegram/phone refresh on the existing contact.
        enrichment: BestEffort<()>,
    },
    /// No match (or the lookup failed); a new contact was created.
    Created,
}

/// Outcome of [`ContactReconciler::reconcile`].
#[derive(Debug)]
pub struct ContactResolution {
    /// Contact the deal will be linked to.
    pub contact_id: ContactId,
    /// Duplicate lookup outcome.
    pub lookup: BestEffort<Option<ContactId>>,
    /// Whether the contact was reused or created.
    pub origin: ContactOrigin,
}

/// Finds-or-creates the CRM contact for a lead's phone number.
#[derive(Debug, Clone)]
pub struct ContactReconciler {
    crm: Arc<dyn CrmApi>,
    source_id: String,
}

impl ContactReconciler {
    /// Creates a reconciler tagging new contacts with `source_id`.
    #[must_use]
    pub fn new(crm: Arc<dyn CrmApi>, source_id: impl Into<String>) -> Self {
        Self {
            crm,
            source_id: source_id.into(),
        }
    }

    /// Returns the contact id for `lead`, reusing an existing contact
    /// with the same phone when the CRM reports one.
    ///
    /// The lookup and the enrichment of an existing contact are
    /// best-effort. Only the creation of a new contact can fail.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError`] if a new contact is needed and
    /// `crm.contact.add` fails.
    pub async fn reconcile(&self, lead: &LeadSubmission) -> Result<ContactResolution, CrmError> {
        let lookup = self.find_by_phone(&lead.phone).await;

        if let Some(&Some(contact_id)) = lookup.completed() {
            let enrichment = self.enrich(contact_id, lead).await;
            tracing::info!(%contact_id, enriched = enrichment.is_completed(), "reusing existing contact");
            return Ok(ContactResolution {
                contact_id,
                lookup,
                origin: ContactOrigin::Existing { enrichment },
            });
        }

        let contact_id = self.create(lead).await?;
        tracing::info!(%contact_id, "contact created");
        Ok(ContactResolution {
            contact_id,
            lookup,
            origin: ContactOrigin::Created,
        })
    }

    /// Asks the CRM duplicate finder for a contact with `phone`.
    pub async fn find_by_phone(&self, phone: &str) -> BestEffort<Option<ContactId>> {
        let params = CrmParams::new()
            .with("entity_type", "CONTACT")
            .with("type", "PHONE")
            .with_path("values", &["0"], phone);
        let result = async {
            let result = self.crm.call(METHOD_FIND_DUPLICATES, &params).await?;
            Ok::<_, CrmError>(first_contact_id(&result)?.map(ContactId::new))
        }
        .await;
        BestEffort::from_result("contact_lookup", result)
    }

    async fn enrich(&self, contact_id: ContactId, lead: &LeadSubmission) -> BestEffort<()> {
        let params = CrmParams::new()
            .with("id", contact_id)
            .field(TELEGRAM_FIELD, telegram(lead))
            .with_path("fields", &["PHONE", "0", "VALUE"], lead.phone.as_str())
            .with_path("fields", &["PHONE", "0", "VALUE_TYPE"], PHONE_VALUE_TYPE);
        let result = self
            .crm
            .call(METHOD_CONTACT_UPDATE, &params)
            .await
            .map(|_| ());
        BestEffort::from_result("contact_update", result)
    }

    async fn create(&self, lead: &LeadSubmission) -> Result<ContactId, CrmError> {
        let params = CrmParams::new()
            .field("NAME", lead.display_name())
            .with_path("fields", &["PHONE", "0", "VALUE"], lead.phone.as_str())
            .with_path("fields", &["PHONE", "0", "VALUE_TYPE"], PHONE_VALUE_TYPE)
            .field(TELEGRAM_FIELD, telegram(lead))
            .field("SOURCE_ID", self.source_id.as_str())
            .field("UTM_SOURCE", lead.utm_source.as_deref().unwrap_or_default())
            .field("UTM_CAMPAIGN", lead.utm_campaign.as_deref().unwrap_or_default());
        let result = self.crm.call(METHOD_CONTACT_ADD, &params).await?;
        Ok(ContactId::new(parse_id(&result)?))
    }
}

fn telegram(lead: &LeadSubmission) -> &str {
    lead.telegram_username.as_deref().unwrap_or_default()
}
