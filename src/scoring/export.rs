use super::domain::Lead;

/// Failures raised while serializing leads to CSV.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("exported CSV was not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Serialize leads to CSV text with a header row matching the lead fields.
/// Unscored leads render `intent`, `score`, and `reasoning` as empty cells.
pub fn to_csv(leads: &[Lead]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "name",
        "role",
        "company",
        "industry",
        "location",
        "linkedin_bio",
        "intent",
        "score",
        "reasoning",
        "created_at",
    ])?;

    for lead in leads {
        let intent = lead.intent.map(|i| i.label().to_string()).unwrap_or_default();
        let score = lead.score.map(|s| s.to_string()).unwrap_or_default();
        writer.write_record([
            lead.id.0.as_str(),
            lead.name.as_str(),
            lead.role.as_str(),
            lead.company.as_str(),
            lead.industry.as_str(),
            lead.location.as_str(),
            lead.linkedin_bio.as_str(),
            intent.as_str(),
            score.as_str(),
            lead.reasoning.as_deref().unwrap_or_default(),
            lead.created_at.to_rfc3339().as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
