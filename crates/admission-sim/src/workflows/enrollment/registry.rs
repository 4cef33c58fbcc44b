use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::access::Role;
use super::domain::{ApplicantName, ApplicantRecord, SimulationAttempt};

/// Everything one browser session knows about: who is signed in, the applicants registered
/// from it, and each student's simulation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    identity: Option<ApplicantName>,
    registered_names: Vec<ApplicantName>,
    applicants: Vec<ApplicantRecord>,
    histories: BTreeMap<ApplicantName, Vec<SimulationAttempt>>,
    roles: BTreeSet<Role>,
}

impl SessionState {
    /// Switch the session identity, remembering the name the first time it is seen.
    pub fn sign_in(&mut self, name: ApplicantName) {
        if !self.registered_names.contains(&name) {
            self.registered_names.push(name.clone());
        }
        self.identity = Some(name);
    }

    pub fn identity(&self) -> Option<&ApplicantName> {
        self.identity.as_ref()
    }

    pub fn registered_names(&self) -> &[ApplicantName] {
        &self.registered_names
    }

    /// Append the record unless an applicant with the same name already exists.
    pub fn register(&mut self, record: ApplicantRecord) -> bool {
        if self.is_registered(&record.name) {
            return false;
        }
        self.applicants.push(record);
        true
    }

    pub fn is_registered(&self, name: &ApplicantName) -> bool {
        self.applicant(name).is_some()
    }

    pub fn applicant(&self, name: &ApplicantName) -> Option<&ApplicantRecord> {
        self.applicants.iter().find(|existing| &existing.name == name)
    }

    pub fn record_simulation_attempt(&mut self, name: &ApplicantName, attempt: SimulationAttempt) {
        self.histories.entry(name.clone()).or_default().push(attempt);
    }

    pub fn list(&self) -> &[ApplicantRecord] {
        &self.applicants
    }

    pub fn applicant_names(&self) -> Vec<ApplicantName> {
        self.applicants
            .iter()
            .map(|record| record.name.clone())
            .collect()
    }

    pub fn history(&self, name: &ApplicantName) -> &[SimulationAttempt] {
        self.histories
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn grant(&mut self, role: Role) {
        self.roles.insert(role);
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
