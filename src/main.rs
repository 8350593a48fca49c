use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::config::app_config::{AppConfig, SmtpConfig};
use crate::logger::init_logger;
use crate::services::analytics_service::AnalyticsService;
use crate::services::campaign_sender::CampaignSender;
use crate::services::campaign_service::CampaignService;
use crate::services::delivery_logger::DeliveryLogger;
use crate::services::draft_service::DraftService;
use crate::services::mail_transport::{MailTransport, SmtpMailTransport};
use crate::services::scheduler_service::SchedulerService;
use crate::services::template_service::TemplateService;

mod app;
mod config;
mod error;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    // La carpeta "data" es el destino por defecto del archivo SQLite
    std::fs::create_dir_all("data").context("No se pudo crear directorio 'data'")?;

    log::info!("Conectando a SQLite en {}", database_url);

    let options = database_url
        .parse::<SqliteConnectOptions>()
        .with_context(|| format!("DATABASE_URL inválida: {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite.")
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env()?;
    let db_pool = setup_database(&config.database_url).await?;

    // CampaignService (corre las migraciones de todo el esquema)
    let campaign_service = CampaignService::new(db_pool.clone());
    campaign_service
        .run_migrations()
        .await
        .context("Fallo en migraciones")?;

    let template_service = TemplateService::new(db_pool.clone());
    let draft_service = DraftService::new(db_pool.clone());
    let delivery_logger = DeliveryLogger::new(db_pool.clone());
    let analytics_service = AnalyticsService::new(db_pool.clone());

    // Transporte SMTP: se construye una vez y se comparte
    let transport: Arc<dyn MailTransport> =
        Arc::new(SmtpMailTransport::new(SmtpConfig::from_env()?)?);

    let sender = CampaignSender::new(
        campaign_service.clone(),
        template_service.clone(),
        delivery_logger.clone(),
        transport,
        config.send_pacing(),
    )
    .with_tracking(config.tracking_base_url.clone());

    let _scheduler = SchedulerService::new(
        campaign_service.clone(),
        draft_service.clone(),
        sender.clone(),
        config.scheduler_interval(),
    )
    .start();

    // Levantar servidor
    log::info!("Levantando servidor en {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(campaign_service.clone()))
            .app_data(web::Data::new(template_service.clone()))
            .app_data(web::Data::new(draft_service.clone()))
            .app_data(web::Data::new(delivery_logger.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(sender.clone()))
            .configure(app::init_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
