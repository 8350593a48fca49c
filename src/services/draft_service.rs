use anyhow::{Context, Result};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

use crate::models::{
    draft_model::{CreateDraftRequest, DraftRecord},
    now_timestamp,
};

#[derive(Clone, Debug)]
pub struct DraftService {
    db_pool: Pool<Sqlite>,
}

impl DraftService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        DraftService { db_pool }
    }

    pub async fn create_draft(&self, req: CreateDraftRequest) -> Result<DraftRecord> {
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO drafts (name, subject, content, variables, headers, row_data, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&req.name)
        .bind(&req.subject)
        .bind(&req.content)
        .bind(serde_json::to_string(&req.variables)?)
        .bind(serde_json::to_string(&req.headers)?)
        .bind(serde_json::to_string(&req.rows)?)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar draft")?;

        Ok(DraftRecord {
            id: result.last_insert_rowid(),
            name: req.name,
            subject: req.subject,
            content: req.content,
            variables: req.variables,
            headers: req.headers,
            rows: req.rows,
            created_at: now,
        })
    }

    pub async fn get_draft(&self, draft_id: i64) -> Result<Option<DraftRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, subject, content, variables, headers, row_data, created_at
            FROM drafts
            WHERE id = ?1
            "#,
        )
        .bind(draft_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al buscar draft")?;

        row.as_ref().map(draft_from_row).transpose()
    }

    /// Correlación heurística (no es una FK): el draft más reciente con el
    /// mismo nombre y subject que la campaña.
    pub async fn find_latest_by_name_and_subject(
        &self,
        name: &str,
        subject: &str,
    ) -> Result<Option<DraftRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, subject, content, variables, headers, row_data, created_at
            FROM drafts
            WHERE name = ?1 AND subject = ?2
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(subject)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al buscar draft por nombre/subject")?;

        row.as_ref().map(draft_from_row).transpose()
    }
}

fn draft_from_row(row: &SqliteRow) -> Result<DraftRecord> {
    let variables: String = row.try_get("variables")?;
    let headers: String = row.try_get("headers")?;
    let rows: String = row.try_get("row_data")?;

    Ok(DraftRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        subject: row.try_get("subject")?,
        content: row.try_get("content")?,
        variables: serde_json::from_str(&variables)?,
        headers: serde_json::from_str(&headers)?,
        rows: serde_json::from_str(&rows).context("rows del draft no es JSON válido")?,
        created_at: row.try_get("created_at")?,
    })
}
