use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{ApplicantName, ApplicantRecord, Subject, SubjectScores};

/// Raw score form as submitted by a student. Every field is kept textual until validated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScoreForm {
    #[serde(default, deserialize_with = "deserialize_raw_field")]
    pub mathematics: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_field")]
    pub science: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_field")]
    pub social_studies: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_field")]
    pub indonesian: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_field")]
    pub distance: Option<String>,
}

impl ScoreForm {
    pub fn new(
        mathematics: impl Into<String>,
        science: impl Into<String>,
        social_studies: impl Into<String>,
        indonesian: impl Into<String>,
    ) -> Self {
        Self {
            mathematics: Some(mathematics.into()),
            science: Some(science.into()),
            social_studies: Some(social_studies.into()),
            indonesian: Some(indonesian.into()),
            distance: None,
        }
    }

    pub fn with_distance(mut self, distance: impl Into<String>) -> Self {
        self.distance = Some(distance.into());
        self
    }

    fn raw_score(&self, subject: Subject) -> Option<&str> {
        let raw = match subject {
            Subject::Mathematics => &self.mathematics,
            Subject::Science => &self.science,
            Subject::SocialStudies => &self.social_studies,
            Subject::Indonesian => &self.indonesian,
        };
        raw.as_deref()
    }

    pub fn scores(&self) -> Result<SubjectScores, ValidationError> {
        let mut parsed = [0u32; 4];
        for (slot, subject) in parsed.iter_mut().zip(Subject::ALL) {
            *slot = parse_score(subject, self.raw_score(subject))?;
        }
        let [mathematics, science, social_studies, indonesian] = parsed;
        Ok(SubjectScores::new(
            mathematics,
            science,
            social_studies,
            indonesian,
        ))
    }

    pub fn distance(&self) -> Result<Option<f64>, ValidationError> {
        self.distance.as_deref().map(parse_distance).transpose()
    }

    /// Scores plus the optional travel distance.
    pub fn registration_record(
        &self,
        name: ApplicantName,
    ) -> Result<ApplicantRecord, ValidationError> {
        let scores = self.scores()?;
        let distance = self.distance()?;
        Ok(ApplicantRecord::scored(name, scores, distance))
    }

    /// Scores only; any submitted distance is ignored.
    pub fn simulation_record(
        &self,
        name: ApplicantName,
    ) -> Result<ApplicantRecord, ValidationError> {
        let scores = self.scores()?;
        Ok(ApplicantRecord::scored(name, scores, None))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Score(Subject),
    Distance,
}

impl FormField {
    pub const fn key(self) -> &'static str {
        match self {
            FormField::Score(subject) => subject.key(),
            FormField::Distance => "distance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    Missing,
    NotANumber,
    Negative,
}

/// Every field failure renders the same message; the offending field travels alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid input: make sure every value is a non-negative number")]
    InvalidField { field: FormField, issue: FieldIssue },
    #[error("scores have not been entered yet")]
    ScoresMissing,
}

impl ValidationError {
    pub fn field(&self) -> Option<FormField> {
        match self {
            ValidationError::InvalidField { field, .. } => Some(*field),
            ValidationError::ScoresMissing => None,
        }
    }
}

fn parse_score(subject: Subject, raw: Option<&str>) -> Result<u32, ValidationError> {
    let field = FormField::Score(subject);
    let raw = raw.ok_or(ValidationError::InvalidField {
        field,
        issue: FieldIssue::Missing,
    })?;

    let value: i64 = raw.trim().parse().map_err(|_| ValidationError::InvalidField {
        field,
        issue: FieldIssue::NotANumber,
    })?;
    if value < 0 {
        return Err(ValidationError::InvalidField {
            field,
            issue: FieldIssue::Negative,
        });
    }

    u32::try_from(value).map_err(|_| ValidationError::InvalidField {
        field,
        issue: FieldIssue::NotANumber,
    })
}

fn parse_distance(raw: &str) -> Result<f64, ValidationError> {
    let invalid = |issue| ValidationError::InvalidField {
        field: FormField::Distance,
        issue,
    };

    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(FieldIssue::NotANumber))?;
    if !value.is_finite() {
        return Err(invalid(FieldIssue::NotANumber));
    }
    if value < 0.0 {
        return Err(invalid(FieldIssue::Negative));
    }
    Ok(value)
}

/// Accepts JSON strings as-is and stringifies bare numbers, so `"80"` and `80` validate alike.
/// Any other JSON value is kept in its textual form and fails parsing like any other garbage.
fn deserialize_raw_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawField {
        Text(String),
        Integer(i64),
        Float(f64),
        Other(serde_json::Value),
    }

    let raw = Option::<RawField>::deserialize(deserializer)?;
    Ok(raw.map(|field| match field {
        RawField::Text(text) => text,
        RawField::Integer(value) => value.to_string(),
        // `Debug` keeps the fraction, so `80.0` does not pass as the integer `80`.
        RawField::Float(value) => format!("{value:?}"),
        RawField::Other(value) => value.to_string(),
    }))
}
