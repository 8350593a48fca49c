use actix_web::{web, HttpResponse};

use crate::{
    handlers::{error_response, invalid_body, not_found},
    models::draft_model::CreateDraftRequest,
    services::draft_service::DraftService,
};

/// POST /api/v1/campaigns/drafts
pub async fn create_draft_endpoint(
    draft_service: web::Data<DraftService>,
    body: web::Json<CreateDraftRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    if req.name.trim().is_empty() || req.subject.trim().is_empty() || req.content.trim().is_empty() {
        return invalid_body("name, subject y content son obligatorios");
    }

    match draft_service.create_draft(req).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/campaigns/drafts/{id}
pub async fn get_draft_endpoint(
    draft_service: web::Data<DraftService>,
    path: web::Path<i64>,
) -> HttpResponse {
    match draft_service.get_draft(path.into_inner()).await {
        Ok(Some(draft)) => HttpResponse::Ok().json(draft),
        Ok(None) => not_found(),
        Err(e) => error_response(&e),
    }
}
