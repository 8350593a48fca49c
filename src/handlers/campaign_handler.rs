//! handlers/campaign_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    handlers::{error_response, invalid_body, not_found},
    models::campaign_model::{
        CreateCampaignRequest, ScheduleCampaignRequest, SendCampaignRequest,
    },
    services::{
        campaign_sender::CampaignSender, campaign_service::CampaignService,
        delivery_logger::DeliveryLogger,
    },
};

/// GET /api/v1/campaigns
pub async fn list_campaigns_endpoint(campaign_service: web::Data<CampaignService>) -> HttpResponse {
    match campaign_service.list_campaigns().await {
        Ok(items) => HttpResponse::Ok().json(json!({ "items": items })),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/campaigns/scheduled
pub async fn list_scheduled_campaigns_endpoint(
    campaign_service: web::Data<CampaignService>,
) -> HttpResponse {
    match campaign_service.list_scheduled_campaigns().await {
        Ok(items) => HttpResponse::Ok().json(json!({ "items": items })),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/campaigns
pub async fn create_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    body: web::Json<CreateCampaignRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    if req.name.trim().is_empty() || req.subject.trim().is_empty() {
        return invalid_body("name y subject son obligatorios");
    }

    match campaign_service.create_campaign(req).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/campaigns/{id}
pub async fn get_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> HttpResponse {
    match campaign_service.get_campaign(&path.into_inner()).await {
        Ok(Some(campaign)) => HttpResponse::Ok().json(campaign),
        Ok(None) => not_found(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/campaigns/{id}/send
/// Envío inmediato ("send now"). Devuelve el resumen o un error, nunca ambos.
pub async fn send_campaign_endpoint(
    sender: web::Data<CampaignSender>,
    path: web::Path<String>,
    body: web::Json<SendCampaignRequest>,
) -> HttpResponse {
    let campaign_id = path.into_inner();
    let req = body.into_inner();

    match sender
        .execute_campaign(&campaign_id, &req.recipients, &req.content, &req.attachments)
        .await
    {
        Ok(summary) => HttpResponse::Ok().json(json!({
            "success": true,
            "campaign_id": campaign_id,
            "status": summary.final_status(),
            "summary": summary
        })),
        Err(e) => {
            log::error!("Campaign send error: {:#}", e);
            error_response(&e)
        }
    }
}

/// POST /api/v1/campaigns/{id}/schedule
pub async fn schedule_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
    body: web::Json<ScheduleCampaignRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    match campaign_service
        .schedule_campaign(&path.into_inner(), req.scheduled_at, req.draft_id)
        .await
    {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/campaigns/{id}/cancel
pub async fn cancel_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> HttpResponse {
    match campaign_service
        .cancel_scheduled_campaign(&path.into_inner())
        .await
    {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/campaigns/{id}/logs
pub async fn campaign_logs_endpoint(
    delivery_logger: web::Data<DeliveryLogger>,
    path: web::Path<String>,
) -> HttpResponse {
    match delivery_logger.list_for_campaign(&path.into_inner()).await {
        Ok(items) => HttpResponse::Ok().json(json!({ "items": items })),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/campaigns/{id}/stats
pub async fn campaign_stats_endpoint(
    delivery_logger: web::Data<DeliveryLogger>,
    path: web::Path<String>,
) -> HttpResponse {
    match delivery_logger.tracking_stats(&path.into_inner()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => error_response(&e),
    }
}
