use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    handlers::{error_response, invalid_body, not_found},
    models::template_model::CreateTemplateRequest,
    services::template_service::TemplateService,
};

/// GET /api/v1/templates
pub async fn list_templates_endpoint(template_service: web::Data<TemplateService>) -> HttpResponse {
    match template_service.list_templates().await {
        Ok(items) => HttpResponse::Ok().json(json!({ "items": items })),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/templates
pub async fn create_template_endpoint(
    template_service: web::Data<TemplateService>,
    body: web::Json<CreateTemplateRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    if req.name.trim().is_empty() || req.subject.trim().is_empty() || req.content.trim().is_empty() {
        return invalid_body("name, subject y content son obligatorios");
    }

    match template_service.create_template(req).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/templates/{id}
pub async fn get_template_endpoint(
    template_service: web::Data<TemplateService>,
    path: web::Path<String>,
) -> HttpResponse {
    match template_service.get_template(&path.into_inner()).await {
        Ok(Some(template)) => HttpResponse::Ok().json(template),
        Ok(None) => not_found(),
        Err(e) => error_response(&e),
    }
}
