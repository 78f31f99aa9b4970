//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Since each worker thread processes its requests sequentially, handlers must never block the
//! current thread; anything long and non-cpu-bound (database access, gateway calls) is awaited.
use actix_web::{get, http::header, web, HttpResponse, Responder};
use dnt_payment_engine::{
    order_objects::VerifyOutcome,
    traits::{LibraryManagement, PaymentEngineError, PaymentGateway, PaymentGatewayDatabase},
    LibraryApi,
    OrderFlowApi,
};
use log::*;

use crate::{
    auth::{MemberAuthApi, MemberToken},
    config::CompanyInfo,
    data_objects::{CheckoutRequest, LibraryParams},
    errors::ServerError,
    receipts::ReceiptPdf,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther().insert_header((header::LOCATION, location)).finish()
}

fn alert_url(path: &str, message: &str) -> String {
    format!("{path}?alert={}", urlencoding::encode(message))
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------  Checkout  ----------------------------------------------------
route!(create_order => Post "/orders" impl PaymentGatewayDatabase, PaymentGateway);
/// Route handler for the checkout endpoint.
///
/// Starts a checkout for the product in the authenticated member's cart, using the one-time card
/// token in the body. On success the response is a 303 redirect to the gateway's authorization
/// page. An empty cart bounces the user back to the shop; a gateway rejection lands on the
/// payment-failed page with the reason as an alert.
pub async fn create_order<B, G>(
    token: MemberToken,
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
    auth: web::Data<MemberAuthApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let member = auth.resolve(&token).await?;
    debug!("💻️ POST checkout for member #{}", member.id);
    match api.checkout(member.id, &body.payment_token).await {
        Ok(authorize_url) => Ok(see_other(&authorize_url)),
        Err(PaymentEngineError::NoProductInCart) => Ok(see_other(&alert_url("/", "Your cart is empty."))),
        Err(PaymentEngineError::GatewayError(e)) => {
            info!("💻️ Checkout for member #{} was rejected by the gateway: {e}", member.id);
            Ok(see_other(&alert_url("/checkout/payment-failed", &e.to_string())))
        },
        Err(e) => Err(e.into()),
    }
}

//----------------------------------------------   Verify   ----------------------------------------------------
route!(verify_order => Get "/orders/{id}/verify" impl PaymentGatewayDatabase, PaymentGateway);
/// Route handler for the gateway return URL.
///
/// The user lands here after the 3-D Secure step. The charge is captured and the order driven to
/// its terminal state; the response is a redirect telling the user what happened. This endpoint
/// is deliberately unauthenticated: the gateway redirect carries no session, and replaying it
/// against a finished order is a no-op.
pub async fn verify_order<B, G>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let order_id = path.into_inner();
    debug!("💻️ GET verify for order #{order_id}");
    let response = match api.verify(order_id).await? {
        VerifyOutcome::Completed { order } => see_other(&format!("/orders/{}/complete", order.id)),
        VerifyOutcome::PaymentFailed { message } => see_other(&alert_url("/checkout/payment-failed", &message)),
        VerifyOutcome::SubscriptionFailed { order } => {
            warn!("💻️ Order #{} is paid but its subscription could not be provisioned", order.id);
            see_other(&alert_url(
                "/",
                "Your payment succeeded, but we could not activate your subscription. Please contact support.",
            ))
        },
    };
    Ok(response)
}

//----------------------------------------------   Receipt  ----------------------------------------------------
route!(order_receipt => Get "/orders/{id}/receipt" impl PaymentGatewayDatabase, PaymentGateway);
/// Route handler for receipt downloads.
///
/// The requester must own the order, and the order must carry a receipt number. Every rejection
/// is the same generic 404 so the endpoint leaks nothing about other members' orders.
pub async fn order_receipt<B, G>(
    token: MemberToken,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, G>>,
    auth: web::Data<MemberAuthApi<B>>,
    company: web::Data<CompanyInfo>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let member = auth.resolve(&token).await?;
    let order_id = path.into_inner();
    debug!("💻️ GET receipt for order #{order_id} by member #{}", member.id);
    let not_found = || ServerError::NoRecordFound(format!("Receipt for order #{order_id}"));
    let order = api
        .db()
        .fetch_order(order_id)
        .await?
        .filter(|o| o.member_id == member.id)
        .ok_or_else(not_found)?;
    let receipt_number = order.receipt_number.clone().ok_or_else(not_found)?;
    let product = api.db().product_for_order(order_id).await?;
    let subscription = api.db().subscription_for_order(order_id).await?;
    let pdf = ReceiptPdf::new(company.as_ref(), &member.email, &order, &product, subscription.as_ref())
        .render()
        .map_err(|e| ServerError::ReceiptRenderError(e.to_string()))?;
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"receipt-{receipt_number}.pdf\""),
        ))
        .body(pdf))
}

//----------------------------------------------   Library  ----------------------------------------------------
route!(library => Get "/library" impl PaymentGatewayDatabase, LibraryManagement);
/// Route handler for the member library.
///
/// Lists the newspapers the member's subscriptions entitle them to, newest first, optionally
/// narrowed to a month and/or year. Members without any subscription are turned away.
pub async fn library<B, L>(
    token: MemberToken,
    params: web::Query<LibraryParams>,
    api: web::Data<LibraryApi<L>>,
    auth: web::Data<MemberAuthApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    L: LibraryManagement,
{
    let member = auth.resolve(&token).await?;
    debug!("💻️ GET library for member #{}", member.id);
    let subscriptions = api.subscriptions_for_member(member.id).await?;
    if subscriptions.is_empty() {
        return Err(ServerError::InsufficientPermissions(
            "An active subscription is required to access the library.".to_string(),
        ));
    }
    let papers = api.catalog_for_member(member.id, params.filter(), params.pagination()).await?;
    Ok(HttpResponse::Ok().json(papers))
}
