use std::io::Read;

use super::domain::NewLead;

pub(crate) const REQUIRED_HEADERS: [&str; 6] = [
    "name",
    "role",
    "company",
    "industry",
    "location",
    "linkedin_bio",
];

/// Accepted alias for the `linkedin_bio` column.
const LINKEDIN_BIO_ALIAS: &str = "linkedinBio";

/// Failures raised while turning an uploaded CSV into lead rows.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("CSV is empty or invalid")]
    Empty,
    #[error("CSV missing required headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse an uploaded CSV into normalized lead rows.
///
/// The header row must contain `name, role, company, industry, location,
/// linkedin_bio` (`linkedinBio` accepted for the last). Extra columns are
/// ignored, cell values are trimmed, and a file with no data rows is
/// rejected.
pub fn parse_leads<R: Read>(reader: R) -> Result<Vec<NewLead>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let indices = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default();
        rows.push(NewLead::new(
            field(indices[0]),
            field(indices[1]),
            field(indices[2]),
            field(indices[3]),
            field(indices[4]),
            field(indices[5]),
        ));
    }

    if rows.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(rows)
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<[usize; 6], IngestError> {
    let position = |name: &str| headers.iter().position(|header| header == name);

    let mut indices = [0usize; 6];
    let mut missing = Vec::new();
    for (slot, required) in indices.iter_mut().zip(REQUIRED_HEADERS) {
        let found = match position(required) {
            Some(idx) => Some(idx),
            None if required == "linkedin_bio" => position(LINKEDIN_BIO_ALIAS),
            None => None,
        };
        match found {
            Some(idx) => *slot = idx,
            None => missing.push(required.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(IngestError::MissingHeaders(missing))
    }
}
