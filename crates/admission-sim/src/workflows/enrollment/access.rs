use serde::{Deserialize, Serialize};

use crate::config::AdmissionConfig;

/// Capabilities a session can hold beyond being a signed-in student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Teacher,
}

/// Decides which role, if any, an access code unlocks.
pub trait AccessPolicy: Send + Sync {
    fn authorize(&self, code: &str) -> Option<Role>;
}

/// One static code shared by every teacher.
#[derive(Debug, Clone)]
pub struct SharedCodePolicy {
    teacher_code: String,
}

impl SharedCodePolicy {
    pub fn new(teacher_code: impl Into<String>) -> Self {
        Self {
            teacher_code: teacher_code.into(),
        }
    }
}

impl Default for SharedCodePolicy {
    fn default() -> Self {
        Self::from(&AdmissionConfig::default())
    }
}

impl From<&AdmissionConfig> for SharedCodePolicy {
    fn from(config: &AdmissionConfig) -> Self {
        Self::new(config.teacher_code.clone())
    }
}

impl AccessPolicy for SharedCodePolicy {
    fn authorize(&self, code: &str) -> Option<Role> {
        (code == self.teacher_code).then_some(Role::Teacher)
    }
}
