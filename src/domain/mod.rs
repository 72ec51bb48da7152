//! Domain layer: lead submissions, CRM identifiers, and the dedupe key.
//!
//! Nothing here performs I/O. The CRM owns every record these ids point
//! to; the gateway only carries them between pipeline steps.

pub mod crm_id;
pub mod dedupe;
pub mod lead;

pub use crm_id::{ActivityId, ContactId, DealId};
pub use dedupe::DedupeKey;
pub use lead::LeadSubmission;
