use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use dnt_payment_engine::{
    events::{EventHandlers, EventHooks},
    CheckoutConfig,
    LibraryApi,
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    auth::MemberAuthApi,
    config::{CompanyInfo, ServerConfig},
    errors::ServerError,
    integrations::OmiseGateway,
    mailer::{LogMailer, ReceiptMailer},
    receipts::ReceiptPdf,
    routes::{health, CreateOrderRoute, LibraryRoute, OrderReceiptRoute, VerifyOrderRoute},
};

const EVENT_BUFFER_SIZE: usize = 100;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🗃️ Database is migrated and ready at {}", config.database_url);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The receipt-email pipeline: render the PDF, hand it to the mailer. Runs outside the checkout
/// flow; any failure here is logged and dropped, the order is already committed.
fn receipt_email_hooks(company: CompanyInfo) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_receipt_ready(move |event| {
        let company = company.clone();
        Box::pin(async move {
            let pdf = ReceiptPdf::new(
                &company,
                &event.member_email,
                &event.order,
                &event.product,
                Some(&event.subscription),
            )
            .render();
            let pdf = match pdf {
                Ok(pdf) => pdf,
                Err(e) => {
                    error!("📧️ Could not render receipt {} for order #{}: {e}", event.receipt_number, event.order.id);
                    return;
                },
            };
            if let Err(e) = LogMailer.send_receipt(&event.member_email, &event.receipt_number, &pdf).await {
                error!("📧️ Could not deliver receipt {} to {}: {e}", event.receipt_number, event.member_email);
            }
        })
    });
    hooks
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, receipt_email_hooks(config.company.clone()));
    let producers = handlers.producers();
    tokio::spawn(handlers.start_handlers());

    let gateway = OmiseGateway::new(config.omise.clone())?;
    let checkout_config = CheckoutConfig::new(&config.public_url);
    let company = config.company.clone();
    info!("🚀️ Checkout return URLs will point at {}", config.public_url);
    let srv = HttpServer::new(move || {
        let orders_api =
            OrderFlowApi::new(db.clone(), gateway.clone(), checkout_config.clone(), producers.clone());
        let library_api = LibraryApi::new(db.clone());
        let auth_api = MemberAuthApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("dnt::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(library_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(company.clone()))
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase, OmiseGateway>::new())
            .service(VerifyOrderRoute::<SqliteDatabase, OmiseGateway>::new())
            .service(OrderReceiptRoute::<SqliteDatabase, OmiseGateway>::new())
            .service(LibraryRoute::<SqliteDatabase, SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
