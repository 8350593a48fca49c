use anyhow::{Context, Result};
use chrono::{DateTime, Months, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::models::{
    db_timestamp,
    email_log_model::{AnalyticsOverview, MonthlyStat, TopCampaign},
};

#[derive(Clone, Debug)]
pub struct AnalyticsService {
    db_pool: Pool<Sqlite>,
}

impl AnalyticsService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        AnalyticsService { db_pool }
    }

    pub async fn overview(&self, now: DateTime<Utc>) -> Result<AnalyticsOverview> {
        let totals = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM email_logs) AS total_emails,
                (SELECT COUNT(*) FROM campaigns) AS total_campaigns,
                (SELECT COUNT(DISTINCT recipient_email) FROM email_logs) AS total_subscribers
            "#,
        )
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al contar totales")?;

        // Tasas solo sobre registros enviados
        let metrics = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_sent,
                COUNT(CASE WHEN opened = 1 THEN 1 END) AS opens,
                COUNT(CASE WHEN clicked = 1 THEN 1 END) AS clicks,
                COUNT(CASE WHEN bounced = 1 THEN 1 END) AS bounces
            FROM email_logs
            WHERE status = 'sent'
            "#,
        )
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al calcular métricas")?;

        let total_sent: i64 = metrics.try_get("total_sent")?;

        Ok(AnalyticsOverview {
            total_emails: totals.try_get("total_emails")?,
            total_campaigns: totals.try_get("total_campaigns")?,
            total_subscribers: totals.try_get("total_subscribers")?,
            open_rate: percent(metrics.try_get("opens")?, total_sent),
            click_rate: percent(metrics.try_get("clicks")?, total_sent),
            bounce_rate: percent(metrics.try_get("bounces")?, total_sent),
            monthly_stats: self.monthly_stats(now).await?,
            top_campaigns: self.top_campaigns().await?,
        })
    }

    /// Últimos 7 meses, el más reciente primero
    async fn monthly_stats(&self, now: DateTime<Utc>) -> Result<Vec<MonthlyStat>> {
        let since = now.checked_sub_months(Months::new(7)).unwrap_or(now);

        let rows = sqlx::query(
            r#"
            SELECT
                substr(created_at, 1, 7) AS month,
                COUNT(*) AS emails,
                COUNT(CASE WHEN opened = 1 THEN 1 END) AS opens,
                COUNT(CASE WHEN clicked = 1 THEN 1 END) AS clicks,
                COUNT(CASE WHEN bounced = 1 THEN 1 END) AS bounces
            FROM email_logs
            WHERE created_at >= ?1
            GROUP BY substr(created_at, 1, 7)
            ORDER BY month DESC
            "#,
        )
        .bind(db_timestamp(since))
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al calcular estadísticas mensuales")?;

        rows.iter()
            .map(|r| {
                Ok(MonthlyStat {
                    month: r.try_get("month")?,
                    emails: r.try_get("emails")?,
                    opens: r.try_get("opens")?,
                    clicks: r.try_get("clicks")?,
                    bounces: r.try_get("bounces")?,
                })
            })
            .collect()
    }

    /// Top 5 por tasa de apertura
    async fn top_campaigns(&self) -> Result<Vec<TopCampaign>> {
        let rows = sqlx::query(
            r#"
            SELECT
                c.id AS id,
                c.name AS name,
                COUNT(el.id) AS recipients,
                COUNT(CASE WHEN el.opened = 1 THEN 1 END) AS opens,
                COUNT(CASE WHEN el.clicked = 1 THEN 1 END) AS clicks
            FROM campaigns c
            JOIN email_logs el ON el.campaign_id = c.id
            WHERE el.status = 'sent'
            GROUP BY c.id, c.name
            HAVING COUNT(el.id) > 0
            ORDER BY CAST(COUNT(CASE WHEN el.opened = 1 THEN 1 END) AS REAL) / COUNT(el.id) DESC,
                     recipients DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al calcular top campaigns")?;

        let mut result = Vec::with_capacity(rows.len());
        for r in rows {
            let recipients: i64 = r.try_get("recipients")?;
            result.push(TopCampaign {
                id: r.try_get("id")?,
                name: r.try_get("name")?,
                open_rate: percent(r.try_get("opens")?, recipients),
                click_rate: percent(r.try_get("clicks")?, recipients),
                recipients,
            });
        }
        Ok(result)
    }
}

fn percent(part: i64, total: i64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
