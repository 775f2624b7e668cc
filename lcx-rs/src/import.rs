//! Import of legacy survey exports
//!
//! The first deployment kept responses in a JSON document, either a bare
//! array or an object with a `responses` array, using Spanish enum codes and
//! string or numeric ids. Records are re-numbered on import; unreadable
//! records are skipped with a warning.
//!
//! The import is all-or-nothing: a store failure rolls back every record,
//! so the next start finds the store empty and retries.

use std::path::Path;

use anyhow::{Context, Result};
use lcx_common::{db, SurveyResponse};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Outcome of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Import `path` into the store, unless the store already holds responses
pub async fn import_if_empty(pool: &SqlitePool, path: &Path) -> Result<Option<ImportReport>> {
    let existing = db::count_responses(pool).await?;
    if existing > 0 {
        info!(
            "Store already holds {} responses; skipping import of {}",
            existing,
            path.display()
        );
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let report = import_document(pool, document).await?;
    info!(
        "Imported {} responses from {} ({} skipped)",
        report.imported,
        path.display(),
        report.skipped
    );
    Ok(Some(report))
}

/// Import every record of an already-parsed export
pub async fn import_document(pool: &SqlitePool, document: Value) -> Result<ImportReport> {
    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("responses") {
            Some(Value::Array(records)) => records,
            _ => anyhow::bail!("Export has no \"responses\" array"),
        },
        _ => anyhow::bail!("Export must be an array or an object"),
    };

    let mut report = ImportReport::default();
    let mut tx = pool.begin().await?;
    for (index, record) in records.into_iter().enumerate() {
        match legacy_record(record) {
            Ok(response) => {
                db::import_response(&mut *tx, &response)
                    .await
                    .with_context(|| format!("Failed to store record {} of export", index))?;
                report.imported += 1;
            }
            Err(e) => {
                warn!("Skipping record {} of export: {}", index, e);
                report.skipped += 1;
            }
        }
    }
    tx.commit().await?;

    Ok(report)
}

/// Decode one exported record, replacing whatever id it carried
fn legacy_record(record: Value) -> Result<SurveyResponse> {
    let Value::Object(mut fields) = record else {
        anyhow::bail!("not a JSON object");
    };
    // Placeholder; the store assigns the real id
    fields.insert("id".to_string(), Value::from(0));
    let response = serde_json::from_value(Value::Object(fields))?;
    Ok(response)
}
