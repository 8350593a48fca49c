//! handlers/tracking_handler.rs
//! Pixel de apertura y registro de clicks.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    handlers::error_response, models::email_log_model::TrackClickRequest,
    services::delivery_logger::DeliveryLogger,
};

/// GIF transparente de 1x1
const PIXEL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

/// GET /api/v1/track/pixel/{pixel_id}
/// Siempre devuelve el GIF, aunque el pixel no exista.
pub async fn track_pixel_endpoint(
    delivery_logger: web::Data<DeliveryLogger>,
    path: web::Path<String>,
) -> HttpResponse {
    let pixel_id = path.into_inner();
    match delivery_logger.record_open(&pixel_id).await {
        Ok(false) => log::warn!("(track_pixel) Pixel desconocido: {}", pixel_id),
        Ok(true) => {}
        Err(e) => log::error!("(track_pixel) Error registrando apertura: {:?}", e),
    }

    HttpResponse::Ok()
        .content_type("image/gif")
        .append_header(("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"))
        .append_header(("Pragma", "no-cache"))
        .body(PIXEL_GIF)
}

/// POST /api/v1/track/click
pub async fn track_click_endpoint(
    delivery_logger: web::Data<DeliveryLogger>,
    body: web::Json<TrackClickRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    match delivery_logger
        .record_click(&req.campaign_id, &req.recipient_email, &req.url)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(e) => error_response(&e),
    }
}
