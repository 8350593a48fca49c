//! app.rs
use crate::handlers::{
    analytics_handler, campaign_handler, draft_handler, template_handler, tracking_handler,
};
use actix_web::{web, HttpResponse};
use serde_json::json;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_endpoint))
            .service(
                web::scope("/templates")
                    .route("", web::get().to(template_handler::list_templates_endpoint))
                    .route("", web::post().to(template_handler::create_template_endpoint))
                    .route("/{id}", web::get().to(template_handler::get_template_endpoint)),
            )
            .service(
                web::scope("/campaigns")
                    .route("", web::get().to(campaign_handler::list_campaigns_endpoint))
                    .route("", web::post().to(campaign_handler::create_campaign_endpoint))
                    // Rutas fijas antes de "/{id}"
                    .route("/drafts", web::post().to(draft_handler::create_draft_endpoint))
                    .route("/drafts/{id}", web::get().to(draft_handler::get_draft_endpoint))
                    .route(
                        "/scheduled",
                        web::get().to(campaign_handler::list_scheduled_campaigns_endpoint),
                    )
                    .route("/{id}", web::get().to(campaign_handler::get_campaign_endpoint))
                    .route(
                        "/{id}/send",
                        web::post().to(campaign_handler::send_campaign_endpoint),
                    )
                    .route(
                        "/{id}/schedule",
                        web::post().to(campaign_handler::schedule_campaign_endpoint),
                    )
                    .route(
                        "/{id}/cancel",
                        web::post().to(campaign_handler::cancel_campaign_endpoint),
                    )
                    .route(
                        "/{id}/logs",
                        web::get().to(campaign_handler::campaign_logs_endpoint),
                    )
                    .route(
                        "/{id}/stats",
                        web::get().to(campaign_handler::campaign_stats_endpoint),
                    ),
            )
            .route(
                "/analytics",
                web::get().to(analytics_handler::analytics_overview_endpoint),
            )
            .service(
                web::scope("/track")
                    .route(
                        "/pixel/{pixel_id}",
                        web::get().to(tracking_handler::track_pixel_endpoint),
                    )
                    .route("/click", web::post().to(tracking_handler::track_click_endpoint)),
            ),
    );
}

/// GET /api/v1/health
async fn health_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true, "service": "campaign_service" }))
}
