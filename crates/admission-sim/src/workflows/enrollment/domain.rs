use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evaluation::{self, Verdict};
use super::validation::ValidationError;

/// Trimmed, non-empty student name. Doubles as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicantName(String);

impl ApplicantName {
    pub fn parse(raw: &str) -> Result<Self, EmptyNameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyNameError);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ApplicantName {
    type Error = EmptyNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApplicantName> for String {
    fn from(value: ApplicantName) -> Self {
        value.0
    }
}

impl fmt::Display for ApplicantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("name must not be empty")]
pub struct EmptyNameError;

/// The four subjects every applicant is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Mathematics,
    Science,
    SocialStudies,
    Indonesian,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Mathematics,
        Subject::Science,
        Subject::SocialStudies,
        Subject::Indonesian,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Subject::Mathematics => "mathematics",
            Subject::Science => "science",
            Subject::SocialStudies => "social_studies",
            Subject::Indonesian => "indonesian",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScores {
    pub mathematics: u32,
    pub science: u32,
    pub social_studies: u32,
    pub indonesian: u32,
}

impl SubjectScores {
    pub const fn new(mathematics: u32, science: u32, social_studies: u32, indonesian: u32) -> Self {
        Self {
            mathematics,
            science,
            social_studies,
            indonesian,
        }
    }

    pub const fn get(&self, subject: Subject) -> u32 {
        match subject {
            Subject::Mathematics => self.mathematics,
            Subject::Science => self.science,
            Subject::SocialStudies => self.social_studies,
            Subject::Indonesian => self.indonesian,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subject, u32)> + '_ {
        Subject::ALL
            .into_iter()
            .map(move |subject| (subject, self.get(subject)))
    }

    pub fn total(&self) -> u64 {
        self.iter().map(|(_, score)| u64::from(score)).sum()
    }
}

/// Either every subject has a score or none does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "scores", rename_all = "snake_case")]
pub enum Scoring {
    Unscored,
    Scored(SubjectScores),
}

impl Scoring {
    pub fn scores(&self) -> Option<&SubjectScores> {
        match self {
            Scoring::Unscored => None,
            Scoring::Scored(scores) => Some(scores),
        }
    }
}

/// One student's submission. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub name: ApplicantName,
    pub scoring: Scoring,
    pub distance: Option<f64>,
}

impl ApplicantRecord {
    pub fn unscored(name: ApplicantName) -> Self {
        Self {
            name,
            scoring: Scoring::Unscored,
            distance: None,
        }
    }

    pub fn scored(name: ApplicantName, scores: SubjectScores, distance: Option<f64>) -> Self {
        Self {
            name,
            scoring: Scoring::Scored(scores),
            distance,
        }
    }

    pub fn average(&self) -> Result<f64, ValidationError> {
        self.scoring
            .scores()
            .map(evaluation::average)
            .ok_or(ValidationError::ScoresMissing)
    }

    pub fn verdict(&self) -> Result<Verdict, ValidationError> {
        self.average().map(evaluation::classify)
    }

    pub fn view(&self) -> ApplicantView {
        let scores = self.scoring.scores();
        ApplicantView {
            name: self.name.to_string(),
            mathematics: scores.map(|s| s.mathematics),
            science: scores.map(|s| s.science),
            social_studies: scores.map(|s| s.social_studies),
            indonesian: scores.map(|s| s.indonesian),
            distance: self.distance,
        }
    }
}

/// Flat rendering of a record used by the teacher listing and exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantView {
    pub name: String,
    pub mathematics: Option<u32>,
    pub science: Option<u32>,
    pub social_studies: Option<u32>,
    pub indonesian: Option<u32>,
    pub distance: Option<f64>,
}

/// A what-if run kept in the student's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationAttempt {
    pub record: ApplicantRecord,
    pub average: f64,
    pub verdict: Verdict,
    pub recorded_at: DateTime<Utc>,
}

impl SimulationAttempt {
    pub fn evaluate(
        record: ApplicantRecord,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let average = record.average()?;
        Ok(Self {
            record,
            average,
            verdict: evaluation::classify(average),
            recorded_at,
        })
    }

    pub fn view(&self) -> AttemptView {
        AttemptView {
            applicant: self.record.view(),
            average: self.average,
            verdict: self.verdict.label(),
            recorded_at: self.recorded_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptView {
    #[serde(flatten)]
    pub applicant: ApplicantView,
    pub average: f64,
    pub verdict: &'static str,
    pub recorded_at: DateTime<Utc>,
}
