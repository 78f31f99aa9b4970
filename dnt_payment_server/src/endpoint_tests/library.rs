use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::NaiveDate;
use dnt_payment_engine::{db_types::Newspaper, LibraryApi};

use super::{
    helpers::{get_request, member, subscription, TEST_TOKEN},
    mocks::{MockBackend, MockLibrary},
};
use crate::{auth::MemberAuthApi, routes::LibraryRoute};

fn register(cfg: &mut ServiceConfig, library_db: MockLibrary, auth_db: MockBackend) {
    cfg.app_data(web::Data::new(LibraryApi::new(library_db)))
        .app_data(web::Data::new(MemberAuthApi::new(auth_db)))
        .service(LibraryRoute::<MockBackend, MockLibrary>::new());
}

fn resolving_token(db: &mut MockBackend) {
    db.expect_fetch_member_by_access_token().returning(|_| Ok(Some(member())));
}

fn issue(day: u32) -> Newspaper {
    Newspaper {
        id: day as i64,
        title: format!("Daily News Thailand 2025-09-{day:02}"),
        published_at: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
    }
}

#[actix_web::test]
async fn the_library_requires_a_subscription() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut library_db = MockLibrary::new();
        library_db.expect_subscriptions_for_member().returning(|_| Ok(vec![]));
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, library_db, auth_db);
    }
    let response = get_request(TEST_TOKEN, "/library", configure).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.body_string().contains("subscription"), "Got: {}", response.body_string());
}

#[actix_web::test]
async fn the_library_lists_entitled_issues_newest_first() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut library_db = MockLibrary::new();
        library_db.expect_subscriptions_for_member().returning(|_| Ok(vec![subscription()]));
        library_db.expect_newspapers_for_member().returning(|_, _, _| Ok(vec![issue(2), issue(1)]));
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, library_db, auth_db);
    }
    let response = get_request(TEST_TOKEN, "/library", configure).await;
    assert_eq!(response.status, StatusCode::OK);
    let papers: Vec<Newspaper> = serde_json::from_slice(&response.body).expect("Response was not a paper list");
    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].title, "Daily News Thailand 2025-09-02");
}

#[actix_web::test]
async fn month_and_year_query_parameters_reach_the_catalog() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut library_db = MockLibrary::new();
        library_db.expect_subscriptions_for_member().returning(|_| Ok(vec![subscription()]));
        library_db
            .expect_newspapers_for_member()
            .withf(|_, filter, pagination| {
                filter.month == Some(9) && filter.year == Some(2025) && pagination.offset == 8 && pagination.limit == 8
            })
            .returning(|_, _, _| Ok(vec![issue(1)]));
        let mut auth_db = MockBackend::new();
        resolving_token(&mut auth_db);
        register(cfg, library_db, auth_db);
    }
    let response = get_request(TEST_TOKEN, "/library?month=9&year=2025&page=2", configure).await;
    assert_eq!(response.status, StatusCode::OK);
    let papers: Vec<Newspaper> = serde_json::from_slice(&response.body).expect("Response was not a paper list");
    assert_eq!(papers.len(), 1);
}

#[actix_web::test]
async fn the_library_is_closed_to_unknown_tokens() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut auth_db = MockBackend::new();
        auth_db.expect_fetch_member_by_access_token().returning(|_| Ok(None));
        register(cfg, MockLibrary::new(), auth_db);
    }
    let response = get_request("token-nobody", "/library", configure).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
