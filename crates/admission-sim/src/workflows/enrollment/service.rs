use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::access::{AccessPolicy, Role};
use super::domain::{ApplicantName, ApplicantRecord, EmptyNameError, SimulationAttempt};
use super::evaluation::Verdict;
use super::export::{applicants_to_csv, ExportError};
use super::registry::SessionState;
use super::store::{SessionId, SessionStore, StoreError};
use super::validation::{ScoreForm, ValidationError};

/// Service composing the session store and the access policy behind the admission workflow.
pub struct AdmissionService<S, P> {
    store: Arc<S>,
    policy: Arc<P>,
}

/// Result of starting (or switching) a student identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionTicket {
    pub session_id: SessionId,
    pub identity: ApplicantName,
}

/// What the student menu shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentMenu {
    pub identity: ApplicantName,
    pub registered_names: Vec<ApplicantName>,
    pub applicant_names: Vec<ApplicantName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    /// The record on the applicant list, which is the earlier one for a repeat registration.
    pub record: ApplicantRecord,
    /// False when an applicant with this name was already on the list.
    pub newly_registered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub attempt: SimulationAttempt,
    pub history: Vec<SimulationAttempt>,
}

impl SimulationOutcome {
    pub fn verdict(&self) -> Verdict {
        self.attempt.verdict
    }
}

impl<S, P> AdmissionService<S, P>
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    pub fn new(store: Arc<S>, policy: Arc<P>) -> Self {
        Self { store, policy }
    }

    /// Sign a student in, creating a session when the caller has none.
    pub fn start_session(
        &self,
        session: Option<SessionId>,
        raw_name: &str,
    ) -> Result<SessionTicket, AdmissionServiceError> {
        let name = ApplicantName::parse(raw_name)?;
        let session_id = session.unwrap_or_else(SessionId::generate);

        let mut state = self.load(&session_id)?;
        state.sign_in(name.clone());
        self.store.save(session_id, state)?;

        info!(session = %session_id, student = %name, "student signed in");
        Ok(SessionTicket {
            session_id,
            identity: name,
        })
    }

    pub fn menu(&self, session: &SessionId) -> Result<StudentMenu, AdmissionServiceError> {
        let state = self.load(session)?;
        let identity = signed_in(&state)?.clone();
        Ok(StudentMenu {
            identity,
            registered_names: state.registered_names().to_vec(),
            applicant_names: state.applicant_names(),
        })
    }

    /// Validate a full score form and add the student to the applicant list once.
    pub fn register(
        &self,
        session: &SessionId,
        form: &ScoreForm,
    ) -> Result<RegistrationOutcome, AdmissionServiceError> {
        let mut state = self.load(session)?;
        let name = signed_in(&state)?.clone();

        let record = form
            .registration_record(name.clone())
            .inspect_err(|err| log_rejection(session, &name, err))?;

        if let Some(existing) = state.applicant(&name) {
            debug!(session = %session, student = %name, "applicant already registered");
            return Ok(RegistrationOutcome {
                record: existing.clone(),
                newly_registered: false,
            });
        }

        state.register(record.clone());
        self.store.save(*session, state)?;
        info!(session = %session, student = %name, "applicant registered");
        Ok(RegistrationOutcome {
            record,
            newly_registered: true,
        })
    }

    /// Score a what-if form and append the attempt to the student's history.
    pub fn simulate(
        &self,
        session: &SessionId,
        form: &ScoreForm,
    ) -> Result<SimulationOutcome, AdmissionServiceError> {
        let mut state = self.load(session)?;
        let name = signed_in(&state)?.clone();

        let attempt = form
            .simulation_record(name.clone())
            .and_then(|record| SimulationAttempt::evaluate(record, Utc::now()))
            .inspect_err(|err| log_rejection(session, &name, err))?;

        state.record_simulation_attempt(&name, attempt.clone());
        let history = state.history(&name).to_vec();
        self.store.save(*session, state)?;

        info!(
            session = %session,
            student = %name,
            average = attempt.average,
            verdict = attempt.verdict.label(),
            "simulation recorded"
        );
        Ok(SimulationOutcome { attempt, history })
    }

    pub fn history(
        &self,
        session: &SessionId,
    ) -> Result<Vec<SimulationAttempt>, AdmissionServiceError> {
        let state = self.load(session)?;
        let name = signed_in(&state)?;
        Ok(state.history(name).to_vec())
    }

    /// Drop everything stored for the session.
    pub fn sign_out(&self, session: &SessionId) -> Result<(), AdmissionServiceError> {
        self.store.remove(session)?;
        info!(session = %session, "session cleared");
        Ok(())
    }

    /// Exchange an access code for the teacher role on this session.
    pub fn teacher_sign_in(
        &self,
        session: Option<SessionId>,
        code: &str,
    ) -> Result<SessionId, AdmissionServiceError> {
        let Some(role) = self.policy.authorize(code) else {
            warn!("teacher access code rejected");
            return Err(AdmissionServiceError::Unauthorized);
        };

        let session_id = session.unwrap_or_else(SessionId::generate);
        let mut state = self.load(&session_id)?;
        state.grant(role);
        self.store.save(session_id, state)?;

        info!(session = %session_id, ?role, "role granted");
        Ok(session_id)
    }

    /// Teacher view of every registered applicant, in registration order.
    pub fn applicants(
        &self,
        session: &SessionId,
    ) -> Result<Vec<ApplicantRecord>, AdmissionServiceError> {
        let state = self.load(session)?;
        require_role(&state, Role::Teacher)?;
        Ok(state.list().to_vec())
    }

    pub fn export_applicants_csv(
        &self,
        session: &SessionId,
    ) -> Result<String, AdmissionServiceError> {
        let applicants = self.applicants(session)?;
        Ok(applicants_to_csv(&applicants)?)
    }

    fn load(&self, session: &SessionId) -> Result<SessionState, StoreError> {
        self.store
            .load(session)
            .map(Option::unwrap_or_default)
    }
}

fn signed_in(state: &SessionState) -> Result<&ApplicantName, AdmissionServiceError> {
    state.identity().ok_or(AdmissionServiceError::NotSignedIn)
}

fn require_role(state: &SessionState, role: Role) -> Result<(), AdmissionServiceError> {
    if state.has_role(role) {
        Ok(())
    } else {
        Err(AdmissionServiceError::Forbidden)
    }
}

fn log_rejection(session: &SessionId, name: &ApplicantName, err: &ValidationError) {
    warn!(
        session = %session,
        student = %name,
        field = err.field().map(|field| field.key()),
        "score form rejected"
    );
}

/// Error raised by the admission service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionServiceError {
    #[error(transparent)]
    EmptyName(#[from] EmptyNameError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no student is signed in for this session")]
    NotSignedIn,
    #[error("access code rejected")]
    Unauthorized,
    #[error("teacher access required")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
