use dnt_common::Baht;
use dnt_payment_engine::{
    db_types::{Member, NewOrder, NewSubscription, Newspaper, Order, OrderStatusType, Product, ReceiptNumber, Subscription},
    order_objects::{CatalogFilter, Pagination},
    traits::{
        AuthorizedCharge,
        CaptureResult,
        GatewayCustomer,
        GatewayError,
        LibraryApiError,
        LibraryManagement,
        PaymentEngineError,
        PaymentGateway,
        PaymentGatewayDatabase,
    },
};
use mockall::mock;

mock! {
    pub Backend {}
    impl PaymentGatewayDatabase for Backend {
        fn url(&self) -> &str;
        async fn fetch_member(&self, member_id: i64) -> Result<Option<Member>, PaymentEngineError>;
        async fn fetch_member_by_access_token(&self, token: &str) -> Result<Option<Member>, PaymentEngineError>;
        async fn save_gateway_customer_id(&self, member_id: i64, customer_id: &str) -> Result<(), PaymentEngineError>;
        async fn cart_product_for_member(&self, member_id: i64) -> Result<Option<Product>, PaymentEngineError>;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentEngineError>;
        async fn attach_charge_id(&self, order_id: i64, charge_id: &str) -> Result<Order, PaymentEngineError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, PaymentEngineError>;
        async fn product_for_order(&self, order_id: i64) -> Result<Product, PaymentEngineError>;
        async fn finalize_order(&self, order_id: i64, new_status: OrderStatusType) -> Result<Order, PaymentEngineError>;
        async fn create_subscription(&self, subscription: NewSubscription) -> Result<Subscription, PaymentEngineError>;
        async fn subscription_for_order(&self, order_id: i64) -> Result<Option<Subscription>, PaymentEngineError>;
        async fn allocate_receipt_number(&self, order_id: i64) -> Result<ReceiptNumber, PaymentEngineError>;
        async fn mark_receipt_sent(&self, order_id: i64) -> Result<(), PaymentEngineError>;
        async fn recover_cart(&self, member_id: i64, product_id: i64) -> Result<(), PaymentEngineError>;
        async fn clear_cart(&self, member_id: i64) -> Result<(), PaymentEngineError>;
    }
}

mock! {
    pub Library {}
    impl LibraryManagement for Library {
        async fn subscriptions_for_member(&self, member_id: i64) -> Result<Vec<Subscription>, LibraryApiError>;
        async fn newspapers_for_member(
            &self,
            member_id: i64,
            filter: CatalogFilter,
            pagination: Pagination,
        ) -> Result<Vec<Newspaper>, LibraryApiError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn prepare_customer<'a>(
            &self,
            existing_id: Option<&'a str>,
            email: &str,
            card_token: &str,
        ) -> Result<GatewayCustomer, GatewayError>;
        async fn authorize_charge(
            &self,
            amount: Baht,
            customer: &GatewayCustomer,
            return_url: &str,
        ) -> Result<AuthorizedCharge, GatewayError>;
        async fn capture_charge(&self, charge_id: &str) -> Result<CaptureResult, GatewayError>;
    }
}
