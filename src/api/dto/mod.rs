//! Data Transfer Objects for REST responses.
//!
//! The request body of `POST /lead` is the domain
//! [`crate::domain::LeadSubmission`] itself.

pub mod lead_dto;

pub use lead_dto::*;
