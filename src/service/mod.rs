//! Service layer: the lead-to-CRM pipeline.
//!
//! [`LeadService`] runs [`ContactReconciler`], [`DealCreator`] and
//! [`ActivityScheduler`] in order for every submission. Each step
//! declares whether it is required (`Result`) or best-effort
//! ([`BestEffort`]).

pub mod activity;
pub mod contact;
pub mod deal;
pub mod lead_service;
pub mod outcome;

pub use activity::{ActivityReport, ActivityScheduler};
pub use contact::{ContactOrigin, ContactReconciler, ContactResolution};
pub use deal::DealCreator;
pub use lead_service::{LeadOutcome, LeadService};
pub use outcome::BestEffort;
