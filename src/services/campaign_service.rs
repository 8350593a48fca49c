use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use uuid::Uuid;

use crate::{
    error::CampaignError,
    models::{
        campaign_model::{CampaignRecord, CampaignStatus, CreateCampaignRequest},
        db_timestamp, now_timestamp,
    },
};

const CAMPAIGN_COLUMNS: &str =
    "id, name, subject, template_id, draft_id, status, scheduled_at, created_at";

#[derive(Clone, Debug)]
pub struct CampaignService {
    db_pool: Pool<Sqlite>,
}

impl CampaignService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CampaignService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Failed to run campaign migrations")?;
        Ok(())
    }

    /// Crea la campaña; por defecto en estado "draft"
    pub async fn create_campaign(&self, req: CreateCampaignRequest) -> Result<CampaignRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();
        let status = req.status.unwrap_or(CampaignStatus::Draft);
        let scheduled_at = req.scheduled_at.map(db_timestamp);

        self.ensure_references(req.template_id.as_deref(), req.draft_id)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, name, subject, template_id, draft_id,
                status, scheduled_at, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.subject)
        .bind(&req.template_id)
        .bind(req.draft_id)
        .bind(status.as_str())
        .bind(&scheduled_at)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar campaign")?;

        self.require_campaign(&id).await
    }

    /// Últimas 100 campañas, más recientes primero
    pub async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        let sql = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at DESC, rowid DESC LIMIT 100"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar campaigns")?;

        rows.iter().map(campaign_from_row).collect()
    }

    pub async fn get_campaign(&self, campaign_id: &str) -> Result<Option<CampaignRecord>> {
        let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(campaign_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al buscar campaign")?;

        row.as_ref().map(campaign_from_row).transpose()
    }

    /// Igual que `get_campaign` pero un id inexistente es `CampaignNotFound`
    pub async fn require_campaign(&self, campaign_id: &str) -> Result<CampaignRecord> {
        self.get_campaign(campaign_id)
            .await?
            .ok_or_else(|| CampaignError::CampaignNotFound(campaign_id.to_string()).into())
    }

    /// Escritura final de estado para una ejecución
    pub async fn set_campaign_status(
        &self,
        campaign_id: &str,
        status: CampaignStatus,
    ) -> Result<()> {
        let result = sqlx::query(r#"UPDATE campaigns SET status = ?1 WHERE id = ?2"#)
            .bind(status.as_str())
            .bind(campaign_id)
            .execute(&self.db_pool)
            .await
            .context("Failed to update campaign status")?;

        if result.rows_affected() == 0 {
            return Err(CampaignError::CampaignNotFound(campaign_id.to_string()).into());
        }
        Ok(())
    }

    /// Pasa la campaña a "scheduled". `draft_id` enlaza explícitamente el
    /// snapshot de destinatarios; si es `None` se conserva el enlace previo.
    /// Solo desde "draft", "scheduled" (reprogramar) o "failed" (reintento);
    /// una campaña en "sending" o ya enviada no vuelve a la cola.
    pub async fn schedule_campaign(
        &self,
        campaign_id: &str,
        scheduled_at: DateTime<Utc>,
        draft_id: Option<i64>,
    ) -> Result<CampaignRecord> {
        self.ensure_references(None, draft_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = ?1,
                scheduled_at = ?2,
                draft_id = COALESCE(?3, draft_id)
            WHERE id = ?4 AND status IN (?5, ?6, ?7)
            "#,
        )
        .bind(CampaignStatus::Scheduled.as_str())
        .bind(db_timestamp(scheduled_at))
        .bind(draft_id)
        .bind(campaign_id)
        .bind(CampaignStatus::Draft.as_str())
        .bind(CampaignStatus::Scheduled.as_str())
        .bind(CampaignStatus::Failed.as_str())
        .execute(&self.db_pool)
        .await
        .context("Fallo al programar campaign")?;

        if result.rows_affected() == 0 {
            let current = self.require_campaign(campaign_id).await?;
            return Err(CampaignError::InvalidStatusTransition {
                campaign_id: campaign_id.to_string(),
                from: current.status,
                to: CampaignStatus::Scheduled,
            }
            .into());
        }

        log::info!(
            "(schedule_campaign) Campaña {} programada para {}",
            campaign_id,
            scheduled_at
        );
        self.require_campaign(campaign_id).await
    }

    /// Vuelve a "draft" y limpia `scheduled_at`. Solo desde "scheduled".
    pub async fn cancel_scheduled_campaign(&self, campaign_id: &str) -> Result<CampaignRecord> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = ?1, scheduled_at = NULL
            WHERE id = ?2 AND status = ?3
            "#,
        )
        .bind(CampaignStatus::Draft.as_str())
        .bind(campaign_id)
        .bind(CampaignStatus::Scheduled.as_str())
        .execute(&self.db_pool)
        .await
        .context("Fallo al cancelar campaign")?;

        if result.rows_affected() == 0 {
            let current = self.require_campaign(campaign_id).await?;
            return Err(CampaignError::InvalidStatusTransition {
                campaign_id: campaign_id.to_string(),
                from: current.status,
                to: CampaignStatus::Draft,
            }
            .into());
        }

        self.require_campaign(campaign_id).await
    }

    /// Campañas "scheduled" con `scheduled_at <= now`, las más antiguas primero
    pub async fn list_due_campaigns(&self, now: DateTime<Utc>) -> Result<Vec<CampaignRecord>> {
        let sql = format!(
            r#"
            SELECT {CAMPAIGN_COLUMNS}
            FROM campaigns
            WHERE status = ?1
              AND scheduled_at IS NOT NULL
              AND scheduled_at <= ?2
            ORDER BY scheduled_at ASC, rowid ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(CampaignStatus::Scheduled.as_str())
            .bind(db_timestamp(now))
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar campaigns pendientes")?;

        rows.iter().map(campaign_from_row).collect()
    }

    /// Todas las campañas programadas (vencidas o no)
    pub async fn list_scheduled_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        let sql = format!(
            r#"
            SELECT {CAMPAIGN_COLUMNS}
            FROM campaigns
            WHERE status = ?1 AND scheduled_at IS NOT NULL
            ORDER BY scheduled_at ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(CampaignStatus::Scheduled.as_str())
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar campaigns programadas")?;

        rows.iter().map(campaign_from_row).collect()
    }

    /// Template y draft referenciados deben existir antes de escribir la campaña
    async fn ensure_references(
        &self,
        template_id: Option<&str>,
        draft_id: Option<i64>,
    ) -> Result<()> {
        if let Some(template_id) = template_id {
            let found = sqlx::query("SELECT 1 FROM templates WHERE id = ?1")
                .bind(template_id)
                .fetch_optional(&self.db_pool)
                .await
                .context("Fallo al buscar template")?;
            if found.is_none() {
                return Err(CampaignError::TemplateNotFound(template_id.to_string()).into());
            }
        }

        if let Some(draft_id) = draft_id {
            let found = sqlx::query("SELECT 1 FROM drafts WHERE id = ?1")
                .bind(draft_id)
                .fetch_optional(&self.db_pool)
                .await
                .context("Fallo al buscar draft")?;
            if found.is_none() {
                return Err(CampaignError::DraftNotFound(draft_id).into());
            }
        }
        Ok(())
    }
}

fn campaign_from_row(row: &SqliteRow) -> Result<CampaignRecord> {
    let status: String = row.try_get("status")?;
    let scheduled_at: Option<String> = row.try_get("scheduled_at")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(CampaignRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        subject: row.try_get("subject")?,
        template_id: row.try_get("template_id")?,
        draft_id: row.try_get("draft_id")?,
        status: status.parse()?,
        scheduled_at: scheduled_at.map(|s| s.parse()).transpose()?,
        created_at: created_at.parse()?,
    })
}
