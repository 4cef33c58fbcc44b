use serde::{Deserialize, Serialize};

use super::domain::SubjectScores;

/// Averages strictly above this are accepted.
pub const PASSING_AVERAGE: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    pub const fn label(self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::Rejected => "rejected",
        }
    }
}

pub fn average(scores: &SubjectScores) -> f64 {
    scores.total() as f64 / 4.0
}

pub fn classify(average: f64) -> Verdict {
    if average > PASSING_AVERAGE {
        Verdict::Accepted
    } else {
        Verdict::Rejected
    }
}
