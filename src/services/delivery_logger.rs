//! services/delivery_logger.rs
//! Registro append-only de intentos de envío (`email_logs`) y tracking de
//! aperturas/clicks sobre esos registros.

use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};

use crate::models::{
    email_log_model::{DeliveryRecord, NewDelivery, TrackingStats},
    now_timestamp,
};

#[derive(Clone, Debug)]
pub struct DeliveryLogger {
    db_pool: Pool<Sqlite>,
}

impl DeliveryLogger {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        DeliveryLogger { db_pool }
    }

    pub async fn log_delivery(&self, delivery: NewDelivery) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO email_logs (
                campaign_id, recipient_email, status,
                opened, clicked, bounced, pixel_id, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&delivery.campaign_id)
        .bind(&delivery.recipient_email)
        .bind(delivery.status.as_str())
        .bind(delivery.opened)
        .bind(delivery.clicked)
        .bind(delivery.bounced)
        .bind(&delivery.pixel_id)
        .bind(now_timestamp())
        .execute(&self.db_pool)
        .await
        .with_context(|| {
            format!(
                "Failed to log delivery for {} ({})",
                delivery.recipient_email, delivery.status
            )
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Registros de una campaña en orden de inserción
    pub async fn list_for_campaign(&self, campaign_id: &str) -> Result<Vec<DeliveryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, campaign_id, recipient_email, status,
                   opened, clicked, bounced, pixel_id, created_at
            FROM email_logs
            WHERE campaign_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar email_logs")?;

        let mut result = Vec::with_capacity(rows.len());
        for r in rows {
            result.push(DeliveryRecord {
                id: r.try_get("id")?,
                campaign_id: r.try_get("campaign_id")?,
                recipient_email: r.try_get("recipient_email")?,
                status: r.try_get("status")?,
                opened: r.try_get("opened")?,
                clicked: r.try_get("clicked")?,
                bounced: r.try_get("bounced")?,
                pixel_id: r.try_get("pixel_id")?,
                created_at: r.try_get("created_at")?,
            });
        }
        Ok(result)
    }

    /// Marca como abierto el registro del pixel. Devuelve si existía.
    pub async fn record_open(&self, pixel_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE email_logs
            SET opened = 1,
                opened_at = COALESCE(opened_at, ?1)
            WHERE pixel_id = ?2
            "#,
        )
        .bind(now_timestamp())
        .bind(pixel_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al registrar apertura")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn record_click(&self, campaign_id: &str, recipient: &str, url: &str) -> Result<()> {
        let now = now_timestamp();
        let mut tx = self.db_pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE email_logs
            SET clicked = 1, clicked_at = ?1
            WHERE campaign_id = ?2 AND recipient_email = ?3
            "#,
        )
        .bind(&now)
        .bind(campaign_id)
        .bind(recipient)
        .execute(&mut *tx)
        .await
        .context("Fallo al marcar click")?;

        sqlx::query(
            r#"
            INSERT INTO email_clicks (campaign_id, recipient_email, url, clicked_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(campaign_id)
        .bind(recipient)
        .bind(url)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Fallo al insertar email_click")?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn tracking_stats(&self, campaign_id: &str) -> Result<TrackingStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(CASE WHEN status = 'sent' THEN 1 END) AS total_sent,
                COUNT(CASE WHEN opened = 1 THEN 1 END) AS total_opened,
                COUNT(CASE WHEN clicked = 1 THEN 1 END) AS total_clicked,
                COUNT(CASE WHEN bounced = 1 THEN 1 END) AS total_bounced
            FROM email_logs
            WHERE campaign_id = ?1
            "#,
        )
        .bind(campaign_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al calcular tracking stats")?;

        Ok(TrackingStats {
            total_sent: row.try_get("total_sent")?,
            total_opened: row.try_get("total_opened")?,
            total_clicked: row.try_get("total_clicked")?,
            total_bounced: row.try_get("total_bounced")?,
        })
    }
}
