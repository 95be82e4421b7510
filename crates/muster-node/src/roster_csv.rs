//! Registration export import and participant export.

use crate::error::{Error, Result};
use muster_core::{FormationEngine, ParticipantRow, RegistrantRecord};
use std::path::Path;

/// Header names of the email and handle fields in a registration export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterColumns {
    pub email: String,
    pub handle: String,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            email: "email".to_string(),
            handle: "tag".to_string(),
        }
    }
}

/// Read registrants from a registration export.
///
/// Columns other than the configured two are ignored. Rows with a blank
/// email or handle are skipped.
pub fn read_roster(path: impl AsRef<Path>, columns: &RosterColumns) -> Result<Vec<RegistrantRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let position = |column: &str| {
        headers.iter().position(|h| h.trim() == column).ok_or_else(|| {
            Error::Config(format!(
                "{} has no `{}` column",
                path.display(),
                column
            ))
        })
    };
    let email_at = position(&columns.email)?;
    let handle_at = position(&columns.handle)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let email = row.get(email_at).unwrap_or("").trim();
        let handle = row.get(handle_at).unwrap_or("").trim();
        if email.is_empty() || handle.is_empty() {
            tracing::warn!("[Participant Records] skipping incomplete row {} in {}", line + 2, path.display());
            continue;
        }
        records.push(RegistrantRecord::new(email, handle));
    }

    Ok(records)
}

/// Load a registration export into the engine's roster.
pub async fn import_roster(
    engine: &FormationEngine,
    path: impl AsRef<Path>,
    columns: &RosterColumns,
) -> Result<usize> {
    let records = read_roster(path, columns)?;
    Ok(engine.bulk_load(records).await?)
}

/// Write the participant export as CSV.
pub fn write_export(path: impl AsRef<Path>, rows: &[ParticipantRow]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}
