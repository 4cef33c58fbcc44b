use super::domain::ApplicantRecord;

const HEADER: [&str; 6] = [
    "name",
    "mathematics",
    "science",
    "social_studies",
    "indonesian",
    "distance",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write applicant csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush applicant csv: {0}")]
    Flush(String),
    #[error("applicant csv is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Render the applicant list as CSV, header first, in registration order.
pub fn applicants_to_csv(records: &[ApplicantRecord]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record.view())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
