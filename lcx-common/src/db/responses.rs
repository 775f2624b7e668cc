//! Response table queries
//!
//! Records are append-only: nothing in this module updates or deletes rows.

use sqlx::{sqlite::SqliteRow, Executor, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::models::{NewSurveyResponse, ResponseRecord, SurveyResponse};
use crate::{Error, Result};

/// Column values for one INSERT, borrowed from either record shape
struct InsertRow<'a> {
    name: &'a str,
    sector: &'a str,
    other_sector: Option<&'a str>,
    origin: &'a str,
    linkedin_url: &'a str,
    profile_description: &'a str,
    event_goal: &'a str,
    networking_interest: &'a str,
    other_networking_interest: Option<&'a str>,
    desired_connections: &'a str,
    offer_to_others: &'a str,
    key_skills: String,
    legacy_key_skill: Option<&'a str>,
}

async fn insert_row<'e, E>(executor: E, row: InsertRow<'_>) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO responses (
            name, sector, other_sector, origin, linkedin_url,
            profile_description, event_goal, networking_interest,
            other_networking_interest, desired_connections, offer_to_others,
            key_skills, legacy_key_skill
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(row.name)
    .bind(row.sector)
    .bind(row.other_sector)
    .bind(row.origin)
    .bind(row.linkedin_url)
    .bind(row.profile_description)
    .bind(row.event_goal)
    .bind(row.networking_interest)
    .bind(row.other_networking_interest)
    .bind(row.desired_connections)
    .bind(row.offer_to_others)
    .bind(row.key_skills)
    .bind(row.legacy_key_skill)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Store a validated submission and return it with its assigned id
pub async fn insert_response(
    pool: &SqlitePool,
    submission: NewSurveyResponse,
) -> Result<SurveyResponse> {
    let id = insert_row(
        pool,
        InsertRow {
            name: &submission.name,
            sector: submission.sector.code(),
            other_sector: submission.sector.other_label(),
            origin: &submission.origin,
            linkedin_url: &submission.linkedin_url,
            profile_description: &submission.profile_description,
            event_goal: &submission.event_goal,
            networking_interest: submission.networking_interest.code(),
            other_networking_interest: submission.networking_interest.other_label(),
            desired_connections: &submission.desired_connections,
            offer_to_others: &submission.offer_to_others,
            key_skills: serde_json::to_string(&submission.key_skills)?,
            legacy_key_skill: None,
        },
    )
    .await?;

    debug!("Stored response {} ({})", id, submission.name);
    Ok(SurveyResponse::from_submission(id, submission))
}

/// Store a record carried over from an older deployment
///
/// The record's own id is ignored; the store assigns a fresh one so that
/// ids keep ordering insertion. Takes a connection so a whole import can
/// run inside one transaction.
pub async fn import_response(conn: &mut SqliteConnection, response: &SurveyResponse) -> Result<i64> {
    insert_row(
        conn,
        InsertRow {
            name: &response.name,
            sector: response.sector.code(),
            other_sector: response.sector.other_label(),
            origin: &response.origin,
            linkedin_url: &response.linkedin_url,
            profile_description: &response.profile_description,
            event_goal: &response.event_goal,
            networking_interest: response.networking_interest.code(),
            other_networking_interest: response.networking_interest.other_label(),
            desired_connections: &response.desired_connections,
            offer_to_others: &response.offer_to_others,
            key_skills: serde_json::to_string(&response.key_skills)?,
            legacy_key_skill: response.legacy_key_skill.as_deref(),
        },
    )
    .await
}

/// All responses in insertion order
pub async fn list_responses(pool: &SqlitePool) -> Result<Vec<SurveyResponse>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, sector, other_sector, origin, linkedin_url,
               profile_description, event_goal, networking_interest,
               other_networking_interest, desired_connections, offer_to_others,
               key_skills, legacy_key_skill
        FROM responses
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_response).collect()
}

/// Number of stored responses
pub async fn count_responses(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM responses")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn row_to_response(row: &SqliteRow) -> Result<SurveyResponse> {
    let id: i64 = row.try_get("id")?;
    let key_skills: String = row.try_get("key_skills")?;
    let key_skills: Vec<String> = serde_json::from_str(&key_skills).map_err(|e| {
        Error::InvalidRecord(format!("response {}: malformed key_skills: {}", id, e))
    })?;

    let record = ResponseRecord {
        id: Some(id),
        name: row.try_get("name")?,
        sector: row.try_get("sector")?,
        other_sector: row.try_get("other_sector")?,
        origin: row.try_get("origin")?,
        linkedin_url: row.try_get("linkedin_url")?,
        profile_description: row.try_get("profile_description")?,
        event_goal: row.try_get("event_goal")?,
        networking_interest: row.try_get("networking_interest")?,
        other_networking_interest: row.try_get("other_networking_interest")?,
        desired_connections: row.try_get("desired_connections")?,
        offer_to_others: row.try_get("offer_to_others")?,
        key_skills,
        key_skill: row.try_get("legacy_key_skill")?,
    };

    SurveyResponse::try_from(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{NetworkingInterest, Sector};

    fn submission(name: &str) -> NewSurveyResponse {
        NewSurveyResponse {
            name: name.to_string(),
            sector: Sector::Other(Some("Aerospace".to_string())),
            origin: "ESA".to_string(),
            linkedin_url: "https://www.linkedin.com/in/someone".to_string(),
            profile_description: "Orbital mechanics".to_string(),
            event_goal: "Find co-founders".to_string(),
            networking_interest: NetworkingInterest::Other(None),
            desired_connections: "Investors".to_string(),
            offer_to_others: "Rocket science".to_string(),
            key_skills: ["Physics".into(), "C++".into(), "Leadership".into()],
        }
    }

    #[tokio::test]
    async fn test_insert_then_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("lcx.db")).await.unwrap();

        let first = insert_response(&pool, submission("Valentina")).await.unwrap();
        let second = insert_response(&pool, submission("Yuri")).await.unwrap();
        assert!(second.id > first.id);

        let listed = list_responses(&pool).await.unwrap();
        assert_eq!(listed, vec![first.clone(), second]);
        assert_eq!(listed[0], SurveyResponse::from_submission(first.id, submission("Valentina")));
        assert_eq!(count_responses(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_import_keeps_legacy_skill_and_assigns_new_id() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("lcx.db")).await.unwrap();

        let mut legacy = SurveyResponse::from_submission(999, submission("Old"));
        legacy.key_skills.clear();
        legacy.legacy_key_skill = Some("Python".to_string());

        let mut conn = pool.acquire().await.unwrap();
        let id = import_response(&mut conn, &legacy).await.unwrap();
        drop(conn);
        assert_eq!(id, 1);

        let listed = list_responses(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, 1);
        assert!(listed[0].key_skills.is_empty());
        assert_eq!(listed[0].legacy_key_skill.as_deref(), Some("Python"));
    }

    #[tokio::test]
    async fn test_corrupt_sector_surfaces_as_invalid_record() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("lcx.db")).await.unwrap();
        insert_response(&pool, submission("Ok")).await.unwrap();
        sqlx::query("UPDATE responses SET sector = 'mystery'")
            .execute(&pool)
            .await
            .unwrap();

        let err = list_responses(&pool).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }
}
