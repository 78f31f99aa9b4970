use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::Utc;
use dnt_common::Baht;
use dnt_payment_engine::db_types::{Member, Order, OrderStatusType, Product, Subscription};

pub const TEST_TOKEN: &str = "token-somchai";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get("location").and_then(|v| v.to_str().ok())
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

async fn call(req: TestRequest, configure: fn(&mut ServiceConfig)) -> TestResponse {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let resp = test::call_service(&service, req.to_request()).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await.to_vec();
    TestResponse { status, headers, body }
}

pub async fn get_request(token: &str, path: &str, configure: fn(&mut ServiceConfig)) -> TestResponse {
    let mut req = TestRequest::get().uri(path);
    if !token.is_empty() {
        req = req.insert_header(("dnt-access-token", token));
    }
    call(req, configure).await
}

pub async fn post_json(
    token: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> TestResponse {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !token.is_empty() {
        req = req.insert_header(("dnt-access-token", token));
    }
    call(req, configure).await
}

//--------------------------------------     Fixtures      -----------------------------------------------------------

pub fn member() -> Member {
    Member { id: 1, email: "somchai@example.com".to_string(), gateway_customer_id: None, created_at: Utc::now() }
}

pub fn product() -> Product {
    Product { id: 7, title: "DNT Weekly".to_string(), price: Baht::from(35000), duration_days: 28, auto_renew: false }
}

pub fn pending_order() -> Order {
    Order {
        id: 42,
        member_id: 1,
        total: Baht::from(35000),
        sub_total: Baht::from(32710),
        charge_id: None,
        status: OrderStatusType::Pending,
        receipt_number: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        paid_at: None,
        receipt_sent_at: None,
    }
}

pub fn paid_order() -> Order {
    Order {
        charge_id: Some("chrg_test_1".to_string()),
        status: OrderStatusType::Paid,
        receipt_number: Some("DNT-20250829-00001".parse().unwrap()),
        paid_at: Some(Utc::now()),
        receipt_sent_at: Some(Utc::now()),
        ..pending_order()
    }
}

pub fn subscription() -> Subscription {
    Subscription {
        id: 1,
        member_id: 1,
        order_id: 42,
        start_date: chrono::NaiveDate::from_ymd_opt(2025, 8, 29).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 25).unwrap(),
        auto_renew: false,
        created_at: Utc::now(),
    }
}
