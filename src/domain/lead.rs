//! Lead submission as received from the intake form.

use serde::Deserialize;
use utoipa::ToSchema;

/// Placeholder display name used when the submitted name is blank.
pub const FALLBACK_CONTACT_NAME: &str = "Клиент";

/// A single lead captured by the web form.
///
/// Immutable once deserialized. Only `name` and `phone` are required;
/// every other field falls back to a neutral default when the CRM
/// payload is built.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeadSubmission {
    /// Contact display name.
    pub name: String,
    /// Contact phone number, used as the dedupe and lookup key.
    pub phone: String,
    /// Telegram `@username`, if the form was opened from Telegram.
    #[serde(default)]
    pub telegram_username: Option<String>,
    /// Numeric Telegram user id (kept as a string).
    #[serde(default)]
    pub telegram_id: Option<String>,
    /// City of the object.
    #[serde(default)]
    pub city: Option<String>,
    /// Street address of the object.
    #[serde(default)]
    pub object_address: Option<String>,
    /// Treated area in square metres.
    #[serde(default)]
    pub area_m2: Option<f64>,
    /// Ceiling height in metres.
    #[serde(default)]
    pub height_m: Option<f64>,
    /// Kind of work requested.
    #[serde(default = "default_work_type")]
    pub work_type: String,
    /// Complexity estimate chosen by the client.
    #[serde(default = "default_complexity")]
    pub complexity: String,
    /// Budget estimate computed by the form calculator.
    #[serde(default)]
    pub budget_est: Option<f64>,
    /// Date of the previous service (`YYYY-MM-DD`).
    #[serde(default)]
    pub last_service_date: Option<String>,
    /// Date of the next planned service (`YYYY-MM-DD`).
    #[serde(default)]
    pub next_service_date: Option<String>,
    /// Free-text comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// UTM source tag.
    #[serde(default = "default_utm_source")]
    pub utm_source: Option<String>,
    /// UTM campaign tag.
    #[serde(default)]
    pub utm_campaign: Option<String>,
}

fn default_work_type() -> String {
    "fire".to_string()
}

fn default_complexity() -> String {
    "mid".to_string()
}

fn default_utm_source() -> Option<String> {
    Some("telegram_webapp".to_string())
}

impl LeadSubmission {
    /// Display name for a new contact, or [`FALLBACK_CONTACT_NAME`] when blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            FALLBACK_CONTACT_NAME
        } else {
            name
        }
    }

    /// Object location: the address, else the city, else empty.
    #[must_use]
    pub fn location(&self) -> &str {
        non_empty(self.object_address.as_deref())
            .or_else(|| non_empty(self.city.as_deref()))
            .unwrap_or("")
    }

    /// Next service date if one was supplied and is not blank.
    #[must_use]
    pub fn next_service_date(&self) -> Option<&str> {
        self.next_service_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Checks the fields serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.phone.trim().is_empty() {
            return Err("phone must not be empty".to_string());
        }
        Ok(())
    }
}

/// Treats empty strings like absent values, the way the form sends them.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
