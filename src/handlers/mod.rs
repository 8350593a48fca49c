//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (campañas, templates, drafts, etc.).

use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

use crate::error::CampaignError;

pub mod analytics_handler;
pub mod campaign_handler;
pub mod draft_handler;
pub mod template_handler;
pub mod tracking_handler;

/// Traduce un error de servicio a respuesta HTTP
pub fn error_response(e: &anyhow::Error) -> HttpResponse {
    let (status, code) = match e.downcast_ref::<CampaignError>() {
        Some(CampaignError::CampaignNotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Some(CampaignError::TemplateNotFound(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_TEMPLATE")
        }
        Some(CampaignError::DraftNotFound(_)) => (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_DRAFT"),
        Some(CampaignError::TransportUnavailable(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "TRANSPORT_UNAVAILABLE")
        }
        Some(CampaignError::EmptyContent(_)) => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_CONTENT"),
        Some(CampaignError::InvalidStatusTransition { .. }) => {
            (StatusCode::CONFLICT, "INVALID_STATUS_TRANSITION")
        }
        None => {
            log::error!("Internal error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    HttpResponse::build(status).json(json!({
        "success": false,
        "error": code,
        "details": e.to_string()
    }))
}

pub fn invalid_body(details: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "success": false,
        "error": "INVALID_BODY",
        "details": details
    }))
}

pub fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "error": "NOT_FOUND"
    }))
}
