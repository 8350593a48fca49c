//! tests/support.rs
//! Helpers compartidos: base SQLite en memoria y transporte falso.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tokio::time::Instant;

use crate::{
    models::{
        campaign_model::{CampaignRecord, CreateCampaignRequest, Recipient},
        email_model::OutgoingEmail,
    },
    services::{
        campaign_sender::CampaignSender, campaign_service::CampaignService,
        delivery_logger::DeliveryLogger, draft_service::DraftService,
        mail_transport::MailTransport, template_service::TemplateService,
    },
};

/// Transporte que guarda lo enviado y puede fallar para direcciones elegidas
#[derive(Default)]
pub struct FakeTransport {
    fail_for: HashSet<String>,
    stall_for: HashMap<String, Duration>,
    unavailable: bool,
    attempts: Mutex<Vec<String>>,
    sent: Mutex<Vec<OutgoingEmail>>,
    /// (evento, instante): "start:<to>" / "end:<to>"
    events: Mutex<Vec<(String, Instant)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            fail_for: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    /// La llamada para `address` tarda `delay` antes de responder
    pub fn stalling_for(address: &str, delay: Duration) -> Self {
        Self {
            stall_for: HashMap::from([(address.to_string(), delay)]),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<(String, Instant)> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push((event, Instant::now()));
    }
}

#[async_trait]
impl MailTransport for FakeTransport {
    async fn ensure_ready(&self) -> Result<()> {
        if self.unavailable {
            return Err(anyhow!("SMTP environment variables are not set"));
        }
        Ok(())
    }

    async fn send_mail(&self, email: &OutgoingEmail) -> Result<()> {
        self.attempts.lock().unwrap().push(email.to.clone());
        self.record(format!("start:{}", email.to));

        if let Some(delay) = self.stall_for.get(&email.to) {
            tokio::time::sleep(*delay).await;
        }
        self.record(format!("end:{}", email.to));

        if self.fail_for.contains(&email.to) {
            return Err(anyhow!("550 mailbox unavailable: {}", email.to));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Pool con una sola conexión para que la base en memoria sea compartida
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");

    CampaignService::new(pool.clone())
        .run_migrations()
        .await
        .expect("Fallo en migraciones de test");

    pool
}

pub struct TestContext {
    pub pool: Pool<Sqlite>,
    pub campaigns: CampaignService,
    pub templates: TemplateService,
    pub drafts: DraftService,
    pub logger: DeliveryLogger,
    pub transport: Arc<FakeTransport>,
    pub sender: CampaignSender,
}

pub async fn test_context(transport: FakeTransport) -> TestContext {
    test_context_with_pacing(transport, Duration::ZERO).await
}

pub async fn test_context_with_pacing(transport: FakeTransport, pacing: Duration) -> TestContext {
    let pool = test_pool().await;
    let campaigns = CampaignService::new(pool.clone());
    let templates = TemplateService::new(pool.clone());
    let drafts = DraftService::new(pool.clone());
    let logger = DeliveryLogger::new(pool.clone());
    let transport = Arc::new(transport);

    let sender = CampaignSender::new(
        campaigns.clone(),
        templates.clone(),
        logger.clone(),
        transport.clone(),
        pacing,
    );

    TestContext {
        pool,
        campaigns,
        templates,
        drafts,
        logger,
        transport,
        sender,
    }
}

pub fn campaign_request(name: &str, subject: &str) -> CreateCampaignRequest {
    CreateCampaignRequest {
        name: name.to_string(),
        subject: subject.to_string(),
        template_id: None,
        status: None,
        scheduled_at: None,
        draft_id: None,
    }
}

pub async fn create_campaign(ctx: &TestContext, name: &str) -> CampaignRecord {
    ctx.campaigns
        .create_campaign(campaign_request(name, "Asunto"))
        .await
        .expect("No se pudo crear campaña")
}

pub fn recipient(email: &str, vars: &[(&str, &str)]) -> Recipient {
    Recipient {
        email: email.to_string(),
        variables: vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}
