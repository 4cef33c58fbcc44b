//! Student admission workflow: score validation, verdicts, and the session-backed registry.
//!
//! Each browser session owns a [`SessionState`] stored behind the [`SessionStore`] trait. The
//! [`AdmissionService`] loads that state, applies one operation, and saves it back only when the
//! operation succeeded, so a rejected form never leaves partial data behind.

pub mod access;
pub mod domain;
pub mod evaluation;
pub mod export;
pub mod registry;
pub mod router;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use access::{AccessPolicy, Role, SharedCodePolicy};
pub use domain::{
    ApplicantName, ApplicantRecord, ApplicantView, AttemptView, EmptyNameError, Scoring,
    SimulationAttempt, Subject, SubjectScores,
};
pub use evaluation::{Verdict, PASSING_AVERAGE};
pub use export::{applicants_to_csv, ExportError};
pub use registry::SessionState;
pub use router::{admission_router, session_from_headers, SESSION_COOKIE};
pub use service::{
    AdmissionService, AdmissionServiceError, RegistrationOutcome, SessionTicket,
    SimulationOutcome, StudentMenu,
};
pub use store::{InMemorySessionStore, SessionId, SessionStore, StoreError};
pub use validation::{FieldIssue, FormField, ScoreForm, ValidationError};
