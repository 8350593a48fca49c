use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::{handlers::error_response, services::analytics_service::AnalyticsService};

/// GET /api/v1/analytics
pub async fn analytics_overview_endpoint(
    analytics_service: web::Data<AnalyticsService>,
) -> HttpResponse {
    match analytics_service.overview(Utc::now()).await {
        Ok(overview) => HttpResponse::Ok().json(overview),
        Err(e) => error_response(&e),
    }
}
