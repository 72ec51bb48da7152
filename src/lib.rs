//! # lead-gateway
//!
//! HTTP gateway that relays web-form lead submissions into a
//! Bitrix24-style CRM.
//!
//! Each `POST /lead` runs a short linear pipeline against the CRM's
//! webhook API: find-or-create the contact by phone, create a deal
//! linked to it, then schedule follow-up reminders. The CRM is the
//! system of record; the gateway keeps no state between requests.
//!
//! ## Architecture
//!
//! ```text
//! Web form (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── LeadService (service/)
//!     │     ├── ContactReconciler   lookup (best-effort) → update | create
//!     │     ├── DealCreator         create (required)
//!     │     └── ActivityScheduler   follow-up + planned reminder (best-effort)
//!     │
//!     └── CrmApi / BitrixClient (crm/)
//!           └── POST {webhook}/{method}.json
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod crm;
pub mod domain;
pub mod error;
pub mod service;
