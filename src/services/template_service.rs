use anyhow::{Context, Result};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use uuid::Uuid;

use crate::{
    models::{
        now_timestamp,
        template_model::{CreateTemplateRequest, TemplateRecord},
    },
    services::template_renderer::extract_variables,
};

#[derive(Clone, Debug)]
pub struct TemplateService {
    db_pool: Pool<Sqlite>,
}

impl TemplateService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        TemplateService { db_pool }
    }

    pub async fn create_template(&self, req: CreateTemplateRequest) -> Result<TemplateRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();

        // Sin variables explícitas => se deducen de los placeholders
        let variables = if req.variables.is_empty() {
            let mut vars = extract_variables(&req.subject);
            for v in extract_variables(&req.content) {
                if !vars.contains(&v) {
                    vars.push(v);
                }
            }
            vars
        } else {
            req.variables
        };
        let variables_json = serde_json::to_string(&variables)?;

        sqlx::query(
            r#"
            INSERT INTO templates (id, name, subject, content, variables, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.subject)
        .bind(&req.content)
        .bind(&variables_json)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar template")?;

        Ok(TemplateRecord {
            id,
            name: req.name,
            subject: req.subject,
            content: req.content,
            variables,
            created_at: now,
        })
    }

    /// Últimas 100 plantillas, más recientes primero
    pub async fn list_templates(&self) -> Result<Vec<TemplateRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, subject, content, variables, created_at
            FROM templates
            ORDER BY created_at DESC
            LIMIT 100
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar templates")?;

        rows.iter().map(template_from_row).collect()
    }

    /// `None` si no existe
    pub async fn get_template(&self, template_id: &str) -> Result<Option<TemplateRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, subject, content, variables, created_at
            FROM templates
            WHERE id = ?1
            "#,
        )
        .bind(template_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al buscar template")?;

        row.as_ref().map(template_from_row).transpose()
    }
}

fn template_from_row(row: &SqliteRow) -> Result<TemplateRecord> {
    let variables: String = row.try_get("variables")?;
    Ok(TemplateRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        subject: row.try_get("subject")?,
        content: row.try_get("content")?,
        variables: serde_json::from_str(&variables).context("variables no es JSON válido")?,
        created_at: row.try_get("created_at")?,
    })
}
