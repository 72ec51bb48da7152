//! CRM client layer: remote calls, parameter encoding, envelope decoding.
//!
//! The gateway depends on five remote methods, named by the constants
//! below. Everything above this module talks to the CRM through the
//! [`CrmApi`] trait.

pub mod client;
pub mod envelope;
pub mod error;
pub mod params;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{BitrixClient, CrmApi};
pub use error::CrmError;
pub use params::{CrmParams, CrmValue};

/// Duplicate lookup by communication channel (phone, e-mail).
pub const METHOD_FIND_DUPLICATES: &str = "crm.duplicate.findbycomm";
/// Contact update.
pub const METHOD_CONTACT_UPDATE: &str = "crm.contact.update";
/// Contact creation.
pub const METHOD_CONTACT_ADD: &str = "crm.contact.add";
/// Deal creation.
pub const METHOD_DEAL_ADD: &str = "crm.deal.add";
/// Activity creation.
pub const METHOD_ACTIVITY_ADD: &str = "crm.activity.add";
