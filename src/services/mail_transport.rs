//! services/mail_transport.rs
//! Transporte de salida. Se construye una sola vez en `main` y se inyecta
//! en el `CampaignSender` como `Arc<dyn MailTransport>`.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentDisposition, ContentType},
        Body, Mailbox, MultiPart, SinglePart,
    },
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{config::app_config::SmtpConfig, models::email_model::OutgoingEmail};

/// Tiempo máximo por mensaje; un destinatario colgado bloquea el resto del lote
/// como mucho este tiempo.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Verifica que el transporte pueda usarse antes de tocar cualquier destinatario.
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Envía un mensaje a un único destinatario.
    async fn send_mail(&self, email: &OutgoingEmail) -> Result<()>;
}

#[derive(Clone)]
pub struct SmtpMailTransport {
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailTransport {
    /// Sin config SMTP el transporte existe pero `ensure_ready` falla.
    pub fn new(config: Option<SmtpConfig>) -> Result<Self> {
        let Some(config) = config else {
            log::warn!("(SmtpMailTransport::new) Variables SMTP no definidas; los envíos fallarán");
            return Ok(Self {
                mailer: None,
                from: None,
            });
        };

        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("Invalid from address: {}", config.from))?;

        let builder = if config.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };

        let mailer = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .timeout(Some(SEND_TIMEOUT))
            .build();

        log::info!(
            "(SmtpMailTransport::new) SMTP host={}, port={}, from={}",
            config.host,
            config.port,
            from
        );

        Ok(Self {
            mailer: Some(mailer),
            from: Some(from),
        })
    }

    fn build_message(&self, from: &Mailbox, email: &OutgoingEmail) -> Result<Message> {
        let to: Mailbox = email
            .to
            .parse()
            .with_context(|| format!("Invalid recipient address: {}", email.to))?;

        // Construir cuerpo en HTML
        let html_part = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone());

        let mut multipart = MultiPart::mixed().singlepart(html_part);

        for attach in &email.attachments {
            let part = SinglePart::builder()
                .header(ContentType::parse(attach.content_type.as_str()).map_err(|e| {
                    anyhow!("Invalid content type {}: {}", attach.content_type, e)
                })?)
                .header(ContentDisposition::attachment(&attach.filename))
                .body(Body::new(attach.data.clone()));
            multipart = multipart.singlepart(part);
        }

        Message::builder()
            .from(from.clone())
            .to(to)
            .subject(&email.subject)
            .multipart(multipart)
            .context("Failed to build message")
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn ensure_ready(&self) -> Result<()> {
        let mailer = self
            .mailer
            .as_ref()
            .ok_or_else(|| anyhow!("SMTP environment variables are not set"))?;

        let reachable = tokio::time::timeout(SEND_TIMEOUT, mailer.test_connection())
            .await
            .context("SMTP connection test timed out")?
            .context("SMTP connection test failed")?;

        if !reachable {
            return Err(anyhow!("SMTP server rejected the connection test"));
        }
        Ok(())
    }

    async fn send_mail(&self, email: &OutgoingEmail) -> Result<()> {
        let (mailer, from) = match (&self.mailer, &self.from) {
            (Some(mailer), Some(from)) => (mailer, from),
            _ => return Err(anyhow!("SMTP environment variables are not set")),
        };

        let message = self.build_message(from, email)?;

        tokio::time::timeout(SEND_TIMEOUT, mailer.send(message))
            .await
            .context("SMTP send timed out")?
            .context("SMTP send failed")?;

        Ok(())
    }
}
