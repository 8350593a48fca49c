//! services/scheduler_service.rs
//! Poller de intervalo fijo: busca campañas "scheduled" vencidas y las envía
//! de a una, en orden de `scheduled_at`.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{
    models::{
        campaign_model::{CampaignRecord, CampaignStatus, ContentSource, TickOutcome},
        draft_model::DraftRecord,
    },
    services::{
        campaign_sender::CampaignSender, campaign_service::CampaignService,
        draft_service::DraftService,
    },
};

#[derive(Clone)]
pub struct SchedulerService {
    campaign_service: CampaignService,
    draft_service: DraftService,
    sender: CampaignSender,
    interval: Duration,
}

impl SchedulerService {
    pub fn new(
        campaign_service: CampaignService,
        draft_service: DraftService,
        sender: CampaignSender,
        interval: Duration,
    ) -> Self {
        Self {
            campaign_service,
            draft_service,
            sender,
            interval,
        }
    }

    /// Lanza el loop en background. No hay pausa/resume: vive lo que vive el proceso.
    pub fn start(self) -> JoinHandle<()> {
        log::info!(
            "(start) Scheduler de campañas iniciado (cada {:?})",
            self.interval
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // Un tick lento no dispara ticks acumulados en ráfaga
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.process_due_campaigns(Utc::now()).await {
                    log::error!("(start) Scheduler error: {:?}", e);
                }
            }
        })
    }

    /// Un tick: procesa secuencialmente cada campaña vencida a `now`.
    /// Cada campaña termina (estado escrito) antes de pasar a la siguiente.
    pub async fn process_due_campaigns(&self, now: DateTime<Utc>) -> Result<Vec<TickOutcome>> {
        let due = self.campaign_service.list_due_campaigns(now).await?;
        if !due.is_empty() {
            log::info!(
                "(process_due_campaigns) {} campañas listas para enviar",
                due.len()
            );
        }

        let mut outcomes = Vec::with_capacity(due.len());
        for campaign in due {
            outcomes.push(self.process_campaign(&campaign).await);
        }
        Ok(outcomes)
    }

    async fn process_campaign(&self, campaign: &CampaignRecord) -> TickOutcome {
        let draft = match self.resolve_draft(campaign).await {
            Ok(Some(draft)) => draft,
            Ok(None) => {
                // No es error: se reintenta en el próximo tick
                log::warn!(
                    "(process_campaign) No se encontró draft para campaña {}, se omite este tick",
                    campaign.id
                );
                return TickOutcome::Skipped {
                    campaign_id: campaign.id.clone(),
                };
            }
            Err(e) => return self.fail_campaign(campaign, e).await,
        };

        let recipients = draft.recipients();
        let content = ContentSource {
            template_id: campaign.template_id.clone(),
            subject: Some(draft.subject.clone()),
            body: Some(draft.content.clone()),
        };

        match self
            .sender
            .execute_campaign(&campaign.id, &recipients, &content, &[])
            .await
        {
            Ok(summary) => {
                log::info!(
                    "(process_campaign) Campaña programada procesada: {} ({})",
                    campaign.name,
                    campaign.id
                );
                TickOutcome::Completed {
                    campaign_id: campaign.id.clone(),
                    status: summary.final_status(),
                    summary,
                }
            }
            Err(e) => self.fail_campaign(campaign, e).await,
        }
    }

    /// Primero el enlace explícito `draft_id`; si no hay, la correlación por
    /// nombre + subject (best-effort, sin integridad referencial).
    async fn resolve_draft(&self, campaign: &CampaignRecord) -> Result<Option<DraftRecord>> {
        if let Some(draft_id) = campaign.draft_id {
            if let Some(draft) = self.draft_service.get_draft(draft_id).await? {
                return Ok(Some(draft));
            }
            log::warn!(
                "(resolve_draft) Draft {} enlazado a campaña {} no existe, se intenta por nombre/subject",
                draft_id,
                campaign.id
            );
        }

        self.draft_service
            .find_latest_by_name_and_subject(&campaign.name, &campaign.subject)
            .await
    }

    async fn fail_campaign(&self, campaign: &CampaignRecord, error: anyhow::Error) -> TickOutcome {
        log::error!(
            "(process_campaign) Falló campaña programada {}: {:#}",
            campaign.id,
            error
        );

        if let Err(e) = self
            .campaign_service
            .set_campaign_status(&campaign.id, CampaignStatus::Failed)
            .await
        {
            log::error!(
                "(process_campaign) No se pudo marcar campaña {} como failed: {:?}",
                campaign.id,
                e
            );
        }

        TickOutcome::Failed {
            campaign_id: campaign.id.clone(),
            error: format!("{error:#}"),
        }
    }
}
