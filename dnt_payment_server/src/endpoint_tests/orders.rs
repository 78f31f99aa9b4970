use actix_web::{
    http::StatusCode,
    web,
    web::ServiceConfig,
};
use dnt_payment_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    traits::{AuthorizedCharge, GatewayCustomer, GatewayError},
    CheckoutConfig,
    OrderFlowApi,
};
use serde_json::json;

use super::{
    helpers::{get_request, member, paid_order, pending_order, post_json, product, subscription, TEST_TOKEN},
    mocks::{MockBackend, MockGateway},
};
use crate::{
    auth::MemberAuthApi,
    config::CompanyInfo,
    routes::{CreateOrderRoute, OrderReceiptRoute, VerifyOrderRoute},
};

fn register(cfg: &mut ServiceConfig, flow_db: MockBackend, gateway: MockGateway, auth_db: MockBackend) {
    let api =
        OrderFlowApi::new(flow_db, gateway, CheckoutConfig::new("https://dnt.example.com"), EventProducers::default());
    cfg.app_data(web::Data::new(api))
        .app_data(web::Data::new(MemberAuthApi::new(auth_db)))
        .app_data(web::Data::new(CompanyInfo::default()))
        .service(CreateOrderRoute::<MockBackend, MockGateway>::new())
        .service(VerifyOrderRoute::<MockBackend, MockGateway>::new())
        .service(OrderReceiptRoute::<MockBackend, MockGateway>::new());
}

fn resolving_token(db: &mut MockBackend) {
    db.expect_fetch_member_by_access_token().returning(|_| Ok(Some(member())));
}

#[actix_web::test]
async fn requests_without_a_token_are_rejected() {
    fn configure(cfg: &mut ServiceConfig) {
        register(cfg, MockBackend::new(), MockGateway::new(), MockBackend::new());
    }
    let response = post_json("", "/orders", json!({"payment_token": "tokn_test_1"}), configure).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body_string().contains("error"), "Got: {}", response.body_string());
}

#[actix_web::test]
async fn an_unknown_token_is_rejected() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut auth_db = MockBackend::new();
        auth_db.expect_fetch_member_by_access_token().returning(|_| Ok(None));
        register(cfg, MockBackend::new(), MockGateway::new(), auth_db);
    }
    let response = post_json("token-nobody", "/orders", json!({"payment_token": "tokn_test_1"}), configure).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn checkout_redirects_to_the_gateway_authorization_page() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut flow_db = MockBackend::new();
        flow_db.expect_fetch_member().returning(|_| Ok(Some(member())));
        flow_db.expect_cart_product_for_member().returning(|_| Ok(Some(product())));
        flow_db.expect_insert_order().returning(|_| Ok(pending_order()));
        flow_db.expect_save_gateway_customer_id().returning(|_, _| Ok(()));
        flow_db.expect_attach_charge_id().returning(|_, _| {
            let mut order = pending_order();
            order.charge_id = Some("chrg_test_1".to_string());
            Ok(order)
        });
        let mut gateway = MockGateway::new();
        gateway.expect_prepare_customer().returning(|_, _, _| {
            Ok(GatewayCustomer { customer_id: "cust_test_1".to_string(), card_id: "card_test_1".to_string() })
        });
        gateway.expect_authorize_charge().returning(|_, _, _| {
            Ok(AuthorizedCharge {
                charge_id: "chrg_test_1".to_string(),
                authorize_url: "https://gateway.test/authorize/chrg_test_1".to_string(),
            })
        });
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, flow_db, gateway, auth_db);
    }
    let response = post_json(TEST_TOKEN, "/orders", json!({"payment_token": "tokn_test_1"}), configure).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("https://gateway.test/authorize/chrg_test_1"));
}

#[actix_web::test]
async fn checkout_with_an_empty_cart_redirects_back_to_the_shop() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut flow_db = MockBackend::new();
        flow_db.expect_fetch_member().returning(|_| Ok(Some(member())));
        flow_db.expect_cart_product_for_member().returning(|_| Ok(None));
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, flow_db, MockGateway::new(), auth_db);
    }
    let response = post_json(TEST_TOKEN, "/orders", json!({"payment_token": "tokn_test_1"}), configure).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/?alert=Your%20cart%20is%20empty."));
}

#[actix_web::test]
async fn a_declined_card_lands_on_the_payment_failed_page() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut flow_db = MockBackend::new();
        flow_db.expect_fetch_member().returning(|_| Ok(Some(member())));
        flow_db.expect_cart_product_for_member().returning(|_| Ok(Some(product())));
        flow_db.expect_insert_order().returning(|_| Ok(pending_order()));
        flow_db.expect_finalize_order().returning(|_, _| {
            let mut order = pending_order();
            order.status = OrderStatusType::Cancelled;
            Ok(order)
        });
        let mut gateway = MockGateway::new();
        gateway
            .expect_prepare_customer()
            .returning(|_, _, _| Err(GatewayError::Declined("insufficient funds".to_string())));
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, flow_db, gateway, auth_db);
    }
    let response = post_json(TEST_TOKEN, "/orders", json!({"payment_token": "tokn_test_1"}), configure).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.location().unwrap();
    assert!(location.starts_with("/checkout/payment-failed?alert="), "Got: {location}");
    assert!(location.contains("insufficient%20funds"), "Got: {location}");
}

#[actix_web::test]
async fn verifying_a_paid_order_replays_the_stored_outcome() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut flow_db = MockBackend::new();
        flow_db.expect_fetch_order().returning(|_| Ok(Some(paid_order())));
        // No gateway expectations: a terminal order must not trigger another capture.
        register(cfg, flow_db, MockGateway::new(), MockBackend::new());
    }
    let response = get_request("", "/orders/42/verify", configure).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/orders/42/complete"));
}

#[actix_web::test]
async fn a_receipt_belonging_to_another_member_is_not_found() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut flow_db = MockBackend::new();
        flow_db.expect_fetch_order().returning(|_| {
            let mut order = paid_order();
            order.member_id = 2;
            Ok(Some(order))
        });
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, flow_db, MockGateway::new(), auth_db);
    }
    let response = get_request(TEST_TOKEN, "/orders/42/receipt", configure).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn an_order_without_a_receipt_number_has_no_receipt() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut flow_db = MockBackend::new();
        flow_db.expect_fetch_order().returning(|_| Ok(Some(pending_order())));
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, flow_db, MockGateway::new(), auth_db);
    }
    let response = get_request(TEST_TOKEN, "/orders/42/receipt", configure).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn a_receipt_downloads_as_a_pdf_attachment() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut flow_db = MockBackend::new();
        flow_db.expect_fetch_order().returning(|_| Ok(Some(paid_order())));
        flow_db.expect_product_for_order().returning(|_| Ok(product()));
        flow_db.expect_subscription_for_order().returning(|_| Ok(Some(subscription())));
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, flow_db, MockGateway::new(), auth_db);
    }
    let response = get_request(TEST_TOKEN, "/orders/42/receipt", configure).await;
    assert_eq!(response.status, StatusCode::OK);
    let content_type = response.headers.get("content-type").and_then(|v| v.to_str().ok());
    assert_eq!(content_type, Some("application/pdf"));
    let disposition = response.headers.get("content-disposition").and_then(|v| v.to_str().ok()).unwrap();
    assert!(disposition.contains("receipt-DNT-20250829-00001.pdf"), "Got: {disposition}");
    assert!(response.body.starts_with(b"%PDF"), "The body is not a PDF document");
}
