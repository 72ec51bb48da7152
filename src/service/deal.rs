//! Deal creation: maps a lead onto CRM deal fields.

use std::sync::Arc;

use crate::crm::envelope::parse_id;
use crate::crm::{CrmApi, CrmError, CrmParams, METHOD_DEAL_ADD};
use crate::domain::{ContactId, DealId, LeadSubmission};

/// Fixed prefix of every deal title ("fire protection").
pub const DEAL_TITLE_PREFIX: &str = "Огнезащита";

/// Creates one CRM deal per lead.
///
/// Stage and category come from deployment configuration, never from
/// the request.
#[derive(Debug, Clone)]
pub struct DealCreator {
    crm: Arc<dyn CrmApi>,
    stage_id: String,
    category_id: String,
}

impl DealCreator {
    /// Creates a deal creator placing deals in `category_id` at `stage_id`.
    #[must_use]
    pub fn new(
        crm: Arc<dyn CrmApi>,
        stage_id: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            crm,
            stage_id: stage_id.into(),
            category_id: category_id.into(),
        }
    }

    /// Creates the deal for `lead`, linked to `contact_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError`] if `crm.deal.add` fails or returns no id.
    /// A lead without a deal is not captured, so this is always fatal.
    pub async fn create(
        &self,
        contact_id: ContactId,
        lead: &LeadSubmission,
    ) -> Result<DealId, CrmError> {
        let params = self.deal_params(contact_id, lead);
        let result = self.crm.call(METHOD_DEAL_ADD, &params).await?;
        let deal_id = DealId::new(parse_id(&result)?);
        tracing::info!(%deal_id, %contact_id, "deal created");
        Ok(deal_id)
    }

    /// Builds the `fields[...]` parameters of `crm.deal.add`.
    #[must_use]
    pub fn deal_params(&self, contact_id: ContactId, lead: &LeadSubmission) -> CrmParams {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let number = |value: Option<f64>| value.unwrap_or(0.0);

        CrmParams::new()
            .field("TITLE", deal_title(lead))
            .field("CONTACT_ID", contact_id)
            .field("STAGE_ID", self.stage_id.as_str())
            .field("CATEGORY_ID", self.category_id.as_str())
            .field("OPPORTUNITY", number(lead.budget_est))
            .field("COMMENTS", text(&lead.comment))
            .field("UF_CRM_OBJECT_ADDRESS", lead.location())
            .field("UF_CRM_AREA_M2", number(lead.area_m2))
            .field("UF_CRM_HEIGHT_M", number(lead.height_m))
            .field("UF_CRM_WORK_TYPE", lead.work_type.as_str())
            .field("UF_CRM_COMPLEXITY", lead.complexity.as_str())
            .field("UF_CRM_LAST_SERVICE_DATE", text(&lead.last_service_date))
            .field("UF_CRM_NEXT_SERVICE_DATE", text(&lead.next_service_date))
            .field("UTM_SOURCE", text(&lead.utm_source))
            .field("UTM_CAMPAIGN", text(&lead.utm_campaign))
    }
}

/// Title: the fixed prefix plus the object location, trimmed.
#[must_use]
pub fn deal_title(lead: &LeadSubmission) -> String {
    format!("{DEAL_TITLE_PREFIX} {}", lead.location())
        .trim()
        .to_string()
}
