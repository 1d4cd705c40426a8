use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use crate::domain::order::{CustomerId, LineItemInput, OrderCommandHandler, OrderStatus};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: CustomerId,
    pub delivery_address: String,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

pub async fn create_order(
    orders: web::Data<OrderCommandHandler>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let view = orders
        .create_order(body.customer_id, body.delivery_address, body.items)
        .await?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn list_orders(orders: web::Data<OrderCommandHandler>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(orders.list_orders().await?))
}

pub async fn get_order(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(orders.get_order(id.into_inner()).await?))
}

pub async fn update_status(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let view = orders.update_status(id.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn cancel_order(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    orders.cancel_order(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    use crate::api::configure;
    use crate::domain::order::OrderCommandHandler;
    use crate::metrics::Metrics;
    use crate::store::InMemoryOrderStore;

    macro_rules! app {
        () => {{
            let metrics = Arc::new(Metrics::new().unwrap());
            let orders = actix_web::web::Data::new(OrderCommandHandler::new(
                Arc::new(InMemoryOrderStore::new()),
                metrics.clone(),
            ));
            test::init_service(
                App::new()
                    .app_data(orders)
                    .app_data(actix_web::web::Data::from(metrics))
                    .configure(configure),
            )
            .await
        }};
    }

    fn amount(value: &Value) -> Decimal {
        value.as_str().expect("amount serialized as string").parse().unwrap()
    }

    fn single_item_order() -> Value {
        json!({
            "customer_id": 1,
            "delivery_address": "Rua Teste, 123",
            "items": [{
                "product_id": 10,
                "product_description": "Produto Teste",
                "quantity": 1,
                "unit_price": "150.00"
            }]
        })
    }

    #[actix_web::test]
    async fn test_create_then_get() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(single_item_order())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: Value = test::read_body_json(resp).await;
        assert_eq!(amount(&created["total_amount"]), "150.00".parse::<Decimal>().unwrap());
        let id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri(&format!("/orders/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let fetched: Value = test::read_body_json(resp).await;
        assert_eq!(fetched["id"], id.as_str());
        assert_eq!(fetched["customer_id"], 1);
        assert_eq!(fetched["status"], "AWAITING_PAYMENT");
        assert_eq!(fetched["delivery_address"], "Rua Teste, 123");
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn test_create_sums_items() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "customer_id": 2,
                "delivery_address": "Rua das Flores, 123",
                "items": [
                    {"product_id": 1, "quantity": 2, "unit_price": 50.00},
                    {"product_id": 2, "quantity": 3, "unit_price": "35.00"}
                ]
            }))
            .to_request();

        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(amount(&created["total_amount"]), "170".parse::<Decimal>().unwrap());
    }

    #[actix_web::test]
    async fn test_create_without_items() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({"customer_id": 3, "delivery_address": "Addr"}))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert!(amount(&created["total_amount"]).is_zero());
    }

    #[actix_web::test]
    async fn test_invalid_item_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "customer_id": 1,
                "delivery_address": "Addr",
                "items": [{"product_id": 1, "quantity": 0, "unit_price": "1.00"}]
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
        assert!(body["message"].as_str().unwrap().contains("quantity"));

        let req = test::TestRequest::get().uri("/orders").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn test_price_beyond_decimal_precision_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "customer_id": 1,
                "delivery_address": "Addr",
                "items": [{"product_id": 1, "quantity": 1, "unit_price": "0.000000000000000000000000000019"}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "customer_id": 1,
                "delivery_address": "Addr",
                "items": [
                    {"product_id": 1, "quantity": 1, "unit_price": "10000000000000000000000000000"},
                    {"product_id": 2, "quantity": 1, "unit_price": "0.01"}
                ]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");

        let req = test::TestRequest::get().uri("/orders").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"customer_id\": ")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "bad_request");
    }

    #[actix_web::test]
    async fn test_unknown_order_is_not_found() {
        let app = app!();
        let id = uuid::Uuid::now_v7();

        let req = test::TestRequest::get().uri(&format!("/orders/{}", id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}/status", id))
            .set_json(json!({"status": "PAID"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri(&format!("/orders/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "not_found");
    }

    #[actix_web::test]
    async fn test_invalid_id_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::get().uri("/orders/42").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_status_update_and_cancel_flow() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(single_item_order())
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}/status", id))
            .set_json(json!({"status": "DELIVERED"}))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["status"], "DELIVERED");

        let req = test::TestRequest::delete().uri(&format!("/orders/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_transition");

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}/status", id))
            .set_json(json!({"status": "PAID"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().contains("DELIVERED"));
    }

    #[actix_web::test]
    async fn test_cancel_returns_no_content() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(single_item_order())
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete().uri(&format!("/orders/{}", id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri(&format!("/orders/{}", id)).to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched["status"], "CANCELED");
    }

    #[actix_web::test]
    async fn test_unknown_status_name_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(single_item_order())
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}/status", id))
            .set_json(json!({"status": "ENVIADO"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_health_and_metrics() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(single_item_order())
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let health: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["store"], "memory");

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("orders_created_total 1"));
    }
}
