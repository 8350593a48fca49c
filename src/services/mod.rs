//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod analytics_service;
pub mod campaign_sender;
pub mod campaign_service;
pub mod delivery_logger;
pub mod draft_service;
pub mod mail_transport;
pub mod scheduler_service;
pub mod template_renderer;
pub mod template_service;
