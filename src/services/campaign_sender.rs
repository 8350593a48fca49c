//! services/campaign_sender.rs
//! Ejecución de una campaña: resolver contenido, recorrer destinatarios en
//! orden, renderizar, enviar, registrar cada intento y fijar el estado final.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::{
    error::CampaignError,
    models::{
        campaign_model::{CampaignStatus, ContentSource, Recipient, SendResultSummary},
        email_log_model::{DeliveryStatus, NewDelivery},
        email_model::{EmailAttachment, OutgoingEmail},
    },
    services::{
        campaign_service::CampaignService,
        delivery_logger::DeliveryLogger,
        mail_transport::MailTransport,
        template_renderer::{append_tracking_pixel, render},
        template_service::TemplateService,
    },
};

#[derive(Clone)]
pub struct CampaignSender {
    campaign_service: CampaignService,
    template_service: TemplateService,
    delivery_logger: DeliveryLogger,
    transport: Arc<dyn MailTransport>,
    /// Pausa fija entre envíos consecutivos
    pacing: Duration,
    tracking_base_url: Option<String>,
}

impl CampaignSender {
    pub fn new(
        campaign_service: CampaignService,
        template_service: TemplateService,
        delivery_logger: DeliveryLogger,
        transport: Arc<dyn MailTransport>,
        pacing: Duration,
    ) -> Self {
        Self {
            campaign_service,
            template_service,
            delivery_logger,
            transport,
            pacing,
            tracking_base_url: None,
        }
    }

    pub fn with_tracking(mut self, base_url: Option<String>) -> Self {
        self.tracking_base_url = base_url;
        self
    }

    /// Envía la campaña a todos los destinatarios, uno por uno y en orden.
    ///
    /// Un fallo de un destinatario nunca corta el lote: queda como registro
    /// `error` y en `errors` del resumen. Solo los fallos que impiden la
    /// ejecución completa (campaña inexistente, sin contenido, transporte no
    /// disponible, error de base de datos) salen como `Err`; en ese caso la
    /// campaña queda en `failed`.
    ///
    /// Si falla la escritura del registro de un destinatario, el lote se corta
    /// ahí: los mensajes ya entregados no se deshacen, los destinatarios
    /// restantes no se intentan y la campaña queda en `failed`.
    ///
    /// Si `content.template_id` resuelve a una plantilla, su subject/content
    /// reemplazan a los explícitos.
    pub async fn execute_campaign(
        &self,
        campaign_id: &str,
        recipients: &[Recipient],
        content: &ContentSource,
        attachments: &[EmailAttachment],
    ) -> Result<SendResultSummary> {
        log::info!(
            "(execute_campaign) Iniciando campaña id={} con {} destinatarios",
            campaign_id,
            recipients.len()
        );

        self.campaign_service.require_campaign(campaign_id).await?;

        match self
            .run_pipeline(campaign_id, recipients, content, attachments)
            .await
        {
            Ok(summary) => Ok(summary),
            Err(e) => {
                log::error!(
                    "(execute_campaign) Campaña id={} abortada: {:#}",
                    campaign_id,
                    e
                );
                self.mark_failed(campaign_id).await;
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        campaign_id: &str,
        recipients: &[Recipient],
        content: &ContentSource,
        attachments: &[EmailAttachment],
    ) -> Result<SendResultSummary> {
        let (subject, body) = self.resolve_content(campaign_id, content).await?;

        self.transport
            .ensure_ready()
            .await
            .map_err(|e| CampaignError::TransportUnavailable(format!("{e:#}")))?;

        // Sale de "scheduled" antes del primer envío: el scheduler ya no la ve
        self.campaign_service
            .set_campaign_status(campaign_id, CampaignStatus::Sending)
            .await?;

        let mut summary = SendResultSummary::new(recipients.len());

        for (idx, recipient) in recipients.iter().enumerate() {
            if idx > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            self.deliver_one(campaign_id, recipient, &subject, &body, attachments, &mut summary)
                .await?;
        }

        let final_status = summary.final_status();
        self.campaign_service
            .set_campaign_status(campaign_id, final_status)
            .await?;

        log::info!(
            "(execute_campaign) Campaña id={} finalizada: total={}, sent={}, failed={}, status={}",
            campaign_id,
            summary.total,
            summary.sent,
            summary.failed,
            final_status
        );
        Ok(summary)
    }

    async fn deliver_one(
        &self,
        campaign_id: &str,
        recipient: &Recipient,
        subject: &str,
        body: &str,
        attachments: &[EmailAttachment],
        summary: &mut SendResultSummary,
    ) -> Result<()> {
        let rendered = render(subject, body, &recipient.variables);

        let pixel_id = self
            .tracking_base_url
            .as_ref()
            .map(|_| format!("pixel_{}", Uuid::new_v4().simple()));
        let html = match (&self.tracking_base_url, &pixel_id) {
            (Some(base), Some(pixel)) => append_tracking_pixel(&rendered.body, base, pixel),
            _ => rendered.body,
        };

        let email = OutgoingEmail {
            to: recipient.email.clone(),
            subject: rendered.subject,
            html,
            attachments: attachments.to_vec(),
        };

        let status = match self.transport.send_mail(&email).await {
            Ok(()) => {
                summary.record_sent();
                DeliveryStatus::Sent
            }
            Err(e) => {
                log::error!(
                    "(deliver_one) Fallo enviando a {} (campaña {}): {:#}",
                    recipient.email,
                    campaign_id,
                    e
                );
                summary.record_failure(&recipient.email, format!("{e:#}"));
                DeliveryStatus::Error
            }
        };

        // El registro no lleva el motivo del fallo; solo el resumen en memoria
        let pixel_id = pixel_id.filter(|_| status == DeliveryStatus::Sent);
        self.delivery_logger
            .log_delivery(
                NewDelivery::new(Some(campaign_id), &recipient.email, status).with_pixel(pixel_id),
            )
            .await
            .context("(deliver_one) No se pudo registrar el envío")?;

        Ok(())
    }

    async fn resolve_content(
        &self,
        campaign_id: &str,
        content: &ContentSource,
    ) -> Result<(String, String)> {
        let mut subject = content.subject.clone().unwrap_or_default();
        let mut body = content.body.clone().unwrap_or_default();

        if let Some(template_id) = &content.template_id {
            match self.template_service.get_template(template_id).await? {
                Some(template) => {
                    subject = template.subject;
                    body = template.content;
                }
                None => log::warn!(
                    "(resolve_content) Template {} no encontrado para campaña {}, se usa contenido explícito",
                    template_id,
                    campaign_id
                ),
            }
        }

        if subject.trim().is_empty() && body.trim().is_empty() {
            return Err(CampaignError::EmptyContent(campaign_id.to_string()).into());
        }
        Ok((subject, body))
    }

    async fn mark_failed(&self, campaign_id: &str) {
        if let Err(e) = self
            .campaign_service
            .set_campaign_status(campaign_id, CampaignStatus::Failed)
            .await
        {
            log::error!(
                "(mark_failed) No se pudo marcar campaña id={} como failed: {:?}",
                campaign_id,
                e
            );
        }
    }
}
