use std::{collections::BTreeMap, fmt, str::FromStr};

use anyhow::{anyhow, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::email_model::EmailAttachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
    PartiallySent,
    Failed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Sending => "sending",
            CampaignStatus::Sent => "sent",
            CampaignStatus::PartiallySent => "partially_sent",
            CampaignStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "scheduled" => Ok(CampaignStatus::Scheduled),
            "sending" => Ok(CampaignStatus::Sending),
            "sent" => Ok(CampaignStatus::Sent),
            "partially_sent" => Ok(CampaignStatus::PartiallySent),
            "failed" => Ok(CampaignStatus::Failed),
            other => Err(anyhow!("Estado de campaña desconocido: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub template_id: Option<String>,
    /// Snapshot de destinatarios asociado al programar la campaña
    pub draft_id: Option<i64>,
    pub status: CampaignStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request para crear una campaña
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub subject: String,
    pub template_id: Option<String>,
    pub status: Option<CampaignStatus>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub draft_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleCampaignRequest {
    pub scheduled_at: DateTime<Utc>,
    pub draft_id: Option<i64>,
}

/// Un destinatario efímero: dirección + variables de personalización
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// De dónde sale el contenido del correo. Si `template_id` resuelve a una
/// plantilla, ésta gana sobre `subject`/`body` explícitos.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSource {
    pub template_id: Option<String>,
    pub subject: Option<String>,
    #[serde(alias = "content")]
    pub body: Option<String>,
}

impl ContentSource {
    pub fn explicit(subject: impl Into<String>, body: impl Into<String>) -> Self {
        ContentSource {
            template_id: None,
            subject: Some(subject.into()),
            body: Some(body.into()),
        }
    }

    pub fn template(template_id: impl Into<String>) -> Self {
        ContentSource {
            template_id: Some(template_id.into()),
            subject: None,
            body: None,
        }
    }
}

/// POST /api/v1/campaigns/{id}/send
#[derive(Debug, Clone, Deserialize)]
pub struct SendCampaignRequest {
    pub recipients: Vec<Recipient>,
    #[serde(flatten)]
    pub content: ContentSource,
    #[serde(default)]
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientError {
    pub email: String,
    pub error: String,
}

/// Resultado de una ejecución: se construye por invocación y no se persiste.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendResultSummary {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<RecipientError>,
}

impl SendResultSummary {
    pub fn new(total: usize) -> Self {
        SendResultSummary {
            total,
            ..Default::default()
        }
    }

    pub fn record_sent(&mut self) {
        self.sent += 1;
    }

    pub fn record_failure(&mut self, email: &str, error: String) {
        self.failed += 1;
        self.errors.push(RecipientError {
            email: email.to_string(),
            error,
        });
    }

    /// Estado final de la campaña según el resultado del envío
    pub fn final_status(&self) -> CampaignStatus {
        match (self.sent, self.failed) {
            (_, 0) => CampaignStatus::Sent,
            (0, _) => CampaignStatus::Failed,
            _ => CampaignStatus::PartiallySent,
        }
    }
}

/// Lo que ocurrió con cada campaña en un tick del scheduler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    Completed {
        campaign_id: String,
        status: CampaignStatus,
        summary: SendResultSummary,
    },
    Skipped {
        campaign_id: String,
    },
    Failed {
        campaign_id: String,
        error: String,
    },
}
