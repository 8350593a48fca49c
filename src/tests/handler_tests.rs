//! Pruebas de endpoints HTTP con `actix_web::test`.

use actix_rt::test;
use actix_web::{http::StatusCode, test as web_test, web, App};
use serde_json::{json, Value};

use crate::app::init_app;
use crate::models::campaign_model::CampaignStatus;
use crate::services::analytics_service::AnalyticsService;
use crate::tests::support::{test_context, FakeTransport, TestContext};

macro_rules! test_app {
    ($ctx:expr) => {
        web_test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.campaigns.clone()))
                .app_data(web::Data::new($ctx.templates.clone()))
                .app_data(web::Data::new($ctx.drafts.clone()))
                .app_data(web::Data::new($ctx.logger.clone()))
                .app_data(web::Data::new(AnalyticsService::new($ctx.pool.clone())))
                .app_data(web::Data::new($ctx.sender.clone()))
                .configure(init_app),
        )
        .await
    };
}

async fn context(transport: FakeTransport) -> TestContext {
    test_context(transport).await
}

#[test]
async fn health_endpoint_is_ok() {
    let ctx = context(FakeTransport::new()).await;
    let app = test_app!(ctx);

    let req = web_test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = web_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], true);
}

#[test]
async fn create_campaign_and_send_now() {
    let ctx = context(FakeTransport::failing_for(&["b@x.com"])).await;
    let app = test_app!(ctx);

    let req = web_test::TestRequest::post()
        .uri("/api/v1/campaigns")
        .set_json(json!({ "name": "Lanzamiento", "subject": "Hola" }))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = web_test::read_body_json(resp).await;
    assert_eq!(created["status"], "draft");
    let id = created["id"].as_str().unwrap().to_string();

    let req = web_test::TestRequest::post()
        .uri(&format!("/api/v1/campaigns/{id}/send"))
        .set_json(json!({
            "recipients": [
                { "email": "a@x.com", "variables": { "n": "A" } },
                { "email": "b@x.com", "variables": { "n": "B" } }
            ],
            "subject": "Hola {{n}}",
            "body": "<p>{{n}}</p>"
        }))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = web_test::read_body_json(resp).await;
    assert_eq!(body["summary"]["total"], 2);
    assert_eq!(body["summary"]["sent"], 1);
    assert_eq!(body["summary"]["failed"], 1);
    assert_eq!(body["summary"]["errors"][0]["email"], "b@x.com");
    assert_eq!(body["status"], "partially_sent");

    let req = web_test::TestRequest::get()
        .uri(&format!("/api/v1/campaigns/{id}/logs"))
        .to_request();
    let logs: Value = web_test::call_and_read_body_json(&app, req).await;
    assert_eq!(logs["items"].as_array().unwrap().len(), 2);
}

#[test]
async fn send_now_with_unavailable_transport_is_503() {
    let ctx = context(FakeTransport::unavailable()).await;
    let app = test_app!(ctx);
    let campaign = crate::tests::support::create_campaign(&ctx, "Sin SMTP").await;

    let req = web_test::TestRequest::post()
        .uri(&format!("/api/v1/campaigns/{}/send", campaign.id))
        .set_json(json!({
            "recipients": [{ "email": "a@x.com" }],
            "subject": "S",
            "body": "B"
        }))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let req = web_test::TestRequest::get()
        .uri(&format!("/api/v1/campaigns/{}", campaign.id))
        .to_request();
    let stored: Value = web_test::call_and_read_body_json(&app, req).await;
    assert_eq!(stored["status"], "failed");
}

#[test]
async fn schedule_and_cancel_endpoints() {
    let ctx = context(FakeTransport::new()).await;
    let app = test_app!(ctx);
    let campaign = crate::tests::support::create_campaign(&ctx, "Programable").await;

    let req = web_test::TestRequest::post()
        .uri(&format!("/api/v1/campaigns/{}/schedule", campaign.id))
        .set_json(json!({ "scheduled_at": "2030-01-01T09:00:00Z" }))
        .to_request();
    let scheduled: Value = web_test::call_and_read_body_json(&app, req).await;
    assert_eq!(scheduled["status"], "scheduled");

    let req = web_test::TestRequest::get()
        .uri("/api/v1/campaigns/scheduled")
        .to_request();
    let listed: Value = web_test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    let req = web_test::TestRequest::post()
        .uri(&format!("/api/v1/campaigns/{}/cancel", campaign.id))
        .to_request();
    let cancelled: Value = web_test::call_and_read_body_json(&app, req).await;
    assert_eq!(cancelled["status"], "draft");
    assert!(cancelled["scheduled_at"].is_null());

    // Cancelar otra vez ya no es válido
    let req = web_test::TestRequest::post()
        .uri(&format!("/api/v1/campaigns/{}/cancel", campaign.id))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[test]
async fn templates_and_drafts_endpoints() {
    let ctx = context(FakeTransport::new()).await;
    let app = test_app!(ctx);

    let req = web_test::TestRequest::post()
        .uri("/api/v1/templates")
        .set_json(json!({
            "name": "Bienvenida",
            "subject": "Hola {{nombre}}",
            "content": "<p>{{nombre}}, tu código es {{codigo}}</p>"
        }))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let template: Value = web_test::read_body_json(resp).await;
    assert_eq!(template["variables"], json!(["nombre", "codigo"]));

    let req = web_test::TestRequest::get()
        .uri(&format!("/api/v1/templates/{}", template["id"].as_str().unwrap()))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = web_test::TestRequest::post()
        .uri("/api/v1/campaigns/drafts")
        .set_json(json!({
            "name": "Bienvenida",
            "subject": "Hola",
            "content": "<p>Hola</p>",
            "headers": ["email"],
            "rows": [{ "email": "a@x.com" }]
        }))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let draft: Value = web_test::read_body_json(resp).await;

    let req = web_test::TestRequest::get()
        .uri(&format!("/api/v1/campaigns/drafts/{}", draft["id"]))
        .to_request();
    let fetched: Value = web_test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["rows"][0]["email"], "a@x.com");

    let req = web_test::TestRequest::get()
        .uri("/api/v1/templates/no-existe")
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[test]
async fn invalid_campaign_body_is_400() {
    let ctx = context(FakeTransport::new()).await;
    let app = test_app!(ctx);

    let req = web_test::TestRequest::post()
        .uri("/api/v1/campaigns")
        .set_json(json!({ "name": "  ", "subject": "Hola" }))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[test]
async fn tracking_pixel_returns_gif() {
    let ctx = context(FakeTransport::new()).await;
    let app = test_app!(ctx);

    let req = web_test::TestRequest::get()
        .uri("/api/v1/track/pixel/pixel_desconocido")
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap().to_str().unwrap(),
        "image/gif"
    );
    let body = web_test::read_body(resp).await;
    assert!(body.starts_with(b"GIF89a"));
}

#[test]
async fn schedule_after_send_is_409() {
    let ctx = context(FakeTransport::new()).await;
    let app = test_app!(ctx);
    let campaign = crate::tests::support::create_campaign(&ctx, "Enviada").await;
    ctx.campaigns
        .set_campaign_status(&campaign.id, CampaignStatus::Sent)
        .await
        .unwrap();

    let req = web_test::TestRequest::post()
        .uri(&format!("/api/v1/campaigns/{}/schedule", campaign.id))
        .set_json(json!({ "scheduled_at": "2020-01-01T09:00:00Z" }))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = web_test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_STATUS_TRANSITION");
}

#[test]
async fn create_campaign_with_unknown_template_is_422() {
    let ctx = context(FakeTransport::new()).await;
    let app = test_app!(ctx);

    let req = web_test::TestRequest::post()
        .uri("/api/v1/campaigns")
        .set_json(json!({ "name": "X", "subject": "Y", "template_id": "no-existe" }))
        .to_request();
    let resp = web_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = web_test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNKNOWN_TEMPLATE");
}
