//! Classification of webhook topic strings.
//!
//! Shopify identifies every webhook with a topic header such as
//! `orders/create`. [`WebhookTopic::classify`] maps any topic string onto the
//! closed set of kinds this crate knows about. The mapping is total: topics
//! that Shopify adds later classify as [`WebhookTopic::Unclassified`] instead
//! of failing ingestion.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::WebhookTopic;
//!
//! assert_eq!(WebhookTopic::classify("orders/create"), WebhookTopic::OrdersCreate);
//! assert_eq!(WebhookTopic::classify("widgets/frobnicate"), WebhookTopic::Unclassified);
//!
//! let topic: WebhookTopic = "products/update".parse().unwrap();
//! assert_eq!(topic.to_string(), "products/update");
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Represents the kind of event a webhook notification describes.
///
/// Serializes to the wire topic string (e.g. `"orders/create"`), and to
/// `"unclassified"` for the fallback kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WebhookTopic {
    // Order topics
    /// Triggered when an order is created.
    #[serde(rename = "orders/create")]
    OrdersCreate,
    /// Triggered when an order is updated.
    #[serde(rename = "orders/updated")]
    OrdersUpdated,
    /// Triggered when an order is paid.
    #[serde(rename = "orders/paid")]
    OrdersPaid,
    /// Triggered when an order is cancelled.
    #[serde(rename = "orders/cancelled")]
    OrdersCancelled,
    /// Triggered when an order is fulfilled.
    #[serde(rename = "orders/fulfilled")]
    OrdersFulfilled,
    /// Triggered when an order is partially fulfilled.
    #[serde(rename = "orders/partially_fulfilled")]
    OrdersPartiallyFulfilled,
    /// Triggered when an order is deleted.
    #[serde(rename = "orders/delete")]
    OrdersDelete,

    // Product topics
    /// Triggered when a product is created.
    #[serde(rename = "products/create")]
    ProductsCreate,
    /// Triggered when a product is updated.
    #[serde(rename = "products/update")]
    ProductsUpdate,
    /// Triggered when a product is deleted.
    #[serde(rename = "products/delete")]
    ProductsDelete,

    // Customer topics
    /// Triggered when a customer is created.
    #[serde(rename = "customers/create")]
    CustomersCreate,
    /// Triggered when a customer is updated.
    #[serde(rename = "customers/update")]
    CustomersUpdate,
    /// Triggered when a customer is deleted.
    #[serde(rename = "customers/delete")]
    CustomersDelete,
    /// Triggered when a customer account is enabled.
    #[serde(rename = "customers/enable")]
    CustomersEnable,
    /// Triggered when a customer account is disabled.
    #[serde(rename = "customers/disable")]
    CustomersDisable,

    // Collection topics
    /// Triggered when a collection is created.
    #[serde(rename = "collections/create")]
    CollectionsCreate,
    /// Triggered when a collection is updated.
    #[serde(rename = "collections/update")]
    CollectionsUpdate,
    /// Triggered when a collection is deleted.
    #[serde(rename = "collections/delete")]
    CollectionsDelete,

    // Cart topics
    /// Triggered when a cart is created.
    #[serde(rename = "carts/create")]
    CartsCreate,
    /// Triggered when a cart is updated.
    #[serde(rename = "carts/update")]
    CartsUpdate,

    // Checkout topics
    /// Triggered when a checkout is created.
    #[serde(rename = "checkouts/create")]
    CheckoutsCreate,
    /// Triggered when a checkout is updated.
    #[serde(rename = "checkouts/update")]
    CheckoutsUpdate,
    /// Triggered when a checkout is deleted.
    #[serde(rename = "checkouts/delete")]
    CheckoutsDelete,

    // Refund topics
    /// Triggered when a refund is created.
    #[serde(rename = "refunds/create")]
    RefundsCreate,

    // App topics
    /// Triggered when the app is uninstalled.
    #[serde(rename = "app/uninstalled")]
    AppUninstalled,
    /// Triggered when an app subscription changes status.
    #[serde(rename = "app_subscriptions/update")]
    AppSubscriptionsUpdate,
    /// Triggered when usage charges approach the subscription's capped amount.
    #[serde(rename = "app_subscriptions/approaching_capped_amount")]
    AppSubscriptionsApproachingCappedAmount,

    // Shop topics
    /// Triggered when the shop is updated.
    #[serde(rename = "shop/update")]
    ShopUpdate,

    // Inventory topics
    /// Triggered when an inventory item is created.
    #[serde(rename = "inventory_items/create")]
    InventoryItemsCreate,
    /// Triggered when an inventory item is updated.
    #[serde(rename = "inventory_items/update")]
    InventoryItemsUpdate,
    /// Triggered when an inventory item is deleted.
    #[serde(rename = "inventory_items/delete")]
    InventoryItemsDelete,
    /// Triggered when an inventory level is connected to a location.
    #[serde(rename = "inventory_levels/connect")]
    InventoryLevelsConnect,
    /// Triggered when an inventory level is updated.
    #[serde(rename = "inventory_levels/update")]
    InventoryLevelsUpdate,
    /// Triggered when an inventory level is disconnected from a location.
    #[serde(rename = "inventory_levels/disconnect")]
    InventoryLevelsDisconnect,

    // Location topics
    /// Triggered when a location is created.
    #[serde(rename = "locations/create")]
    LocationsCreate,
    /// Triggered when a location is updated.
    #[serde(rename = "locations/update")]
    LocationsUpdate,
    /// Triggered when a location is deleted.
    #[serde(rename = "locations/delete")]
    LocationsDelete,

    // Fulfillment topics
    /// Triggered when a fulfillment is created.
    #[serde(rename = "fulfillments/create")]
    FulfillmentsCreate,
    /// Triggered when a fulfillment is updated.
    #[serde(rename = "fulfillments/update")]
    FulfillmentsUpdate,

    // Fulfillment service topics
    /// Triggered when a fulfillment service is created.
    #[serde(rename = "fulfillment_services/create")]
    FulfillmentServicesCreate,
    /// Triggered when a fulfillment service is updated.
    #[serde(rename = "fulfillment_services/update")]
    FulfillmentServicesUpdate,
    /// Triggered when a fulfillment service is deleted.
    #[serde(rename = "fulfillment_services/delete")]
    FulfillmentServicesDelete,

    // Theme topics
    /// Triggered when a theme is created.
    #[serde(rename = "themes/create")]
    ThemesCreate,
    /// Triggered when a theme is updated.
    #[serde(rename = "themes/update")]
    ThemesUpdate,
    /// Triggered when a theme is published.
    #[serde(rename = "themes/publish")]
    ThemesPublish,
    /// Triggered when a theme is deleted.
    #[serde(rename = "themes/delete")]
    ThemesDelete,

    // Draft order topics
    /// Triggered when a draft order is created.
    #[serde(rename = "draft_orders/create")]
    DraftOrdersCreate,
    /// Triggered when a draft order is updated.
    #[serde(rename = "draft_orders/update")]
    DraftOrdersUpdate,
    /// Triggered when a draft order is deleted.
    #[serde(rename = "draft_orders/delete")]
    DraftOrdersDelete,

    // Tender transaction topics
    /// Triggered when a tender transaction is created.
    #[serde(rename = "tender_transactions/create")]
    TenderTransactionsCreate,

    // Domain topics
    /// Triggered when a domain is created.
    #[serde(rename = "domains/create")]
    DomainsCreate,
    /// Triggered when a domain is updated.
    #[serde(rename = "domains/update")]
    DomainsUpdate,
    /// Triggered when a domain is deleted.
    #[serde(rename = "domains/delete")]
    DomainsDelete,

    // Dispute topics
    /// Triggered when a dispute is created.
    #[serde(rename = "disputes/create")]
    DisputesCreate,
    /// Triggered when a dispute is updated.
    #[serde(rename = "disputes/update")]
    DisputesUpdate,

    // Subscription billing attempt topics
    /// Triggered when a subscription billing attempt succeeds.
    #[serde(rename = "subscription_billing_attempts/success")]
    SubscriptionBillingAttemptsSuccess,
    /// Triggered when a subscription billing attempt fails.
    #[serde(rename = "subscription_billing_attempts/failure")]
    SubscriptionBillingAttemptsFailure,
    /// Triggered when a subscription billing attempt requires a challenge.
    #[serde(rename = "subscription_billing_attempts/challenged")]
    SubscriptionBillingAttemptsChallenged,

    // Locale topics
    /// Triggered when a shop locale is added.
    #[serde(rename = "locales/create")]
    LocalesCreate,
    /// Triggered when a shop locale is updated.
    #[serde(rename = "locales/update")]
    LocalesUpdate,

    // Market topics
    /// Triggered when a market is created.
    #[serde(rename = "markets/create")]
    MarketsCreate,
    /// Triggered when a market is updated.
    #[serde(rename = "markets/update")]
    MarketsUpdate,
    /// Triggered when a market is deleted.
    #[serde(rename = "markets/delete")]
    MarketsDelete,

    // Company topics
    /// Triggered when a company is created.
    #[serde(rename = "companies/create")]
    CompaniesCreate,
    /// Triggered when a company is updated.
    #[serde(rename = "companies/update")]
    CompaniesUpdate,
    /// Triggered when a company is deleted.
    #[serde(rename = "companies/delete")]
    CompaniesDelete,
    /// Triggered when a company contact is created.
    #[serde(rename = "company_contacts/create")]
    CompanyContactsCreate,
    /// Triggered when a company contact is updated.
    #[serde(rename = "company_contacts/update")]
    CompanyContactsUpdate,
    /// Triggered when a company contact is deleted.
    #[serde(rename = "company_contacts/delete")]
    CompanyContactsDelete,
    /// Triggered when a company location is created.
    #[serde(rename = "company_locations/create")]
    CompanyLocationsCreate,
    /// Triggered when a company location is updated.
    #[serde(rename = "company_locations/update")]
    CompanyLocationsUpdate,
    /// Triggered when a company location is deleted.
    #[serde(rename = "company_locations/delete")]
    CompanyLocationsDelete,

    // Selling plan group topics
    /// Triggered when a selling plan group is created.
    #[serde(rename = "selling_plan_groups/create")]
    SellingPlanGroupsCreate,
    /// Triggered when a selling plan group is updated.
    #[serde(rename = "selling_plan_groups/update")]
    SellingPlanGroupsUpdate,
    /// Triggered when a selling plan group is deleted.
    #[serde(rename = "selling_plan_groups/delete")]
    SellingPlanGroupsDelete,

    /// Any topic string not listed above, including an empty topic header.
    #[serde(rename = "unclassified")]
    Unclassified,
}

impl WebhookTopic {
    /// Every known topic, in declaration order. Does not include
    /// [`WebhookTopic::Unclassified`].
    pub const ALL: &'static [Self] = &[
        Self::OrdersCreate,
        Self::OrdersUpdated,
        Self::OrdersPaid,
        Self::OrdersCancelled,
        Self::OrdersFulfilled,
        Self::OrdersPartiallyFulfilled,
        Self::OrdersDelete,
        Self::ProductsCreate,
        Self::ProductsUpdate,
        Self::ProductsDelete,
        Self::CustomersCreate,
        Self::CustomersUpdate,
        Self::CustomersDelete,
        Self::CustomersEnable,
        Self::CustomersDisable,
        Self::CollectionsCreate,
        Self::CollectionsUpdate,
        Self::CollectionsDelete,
        Self::CartsCreate,
        Self::CartsUpdate,
        Self::CheckoutsCreate,
        Self::CheckoutsUpdate,
        Self::CheckoutsDelete,
        Self::RefundsCreate,
        Self::AppUninstalled,
        Self::AppSubscriptionsUpdate,
        Self::AppSubscriptionsApproachingCappedAmount,
        Self::ShopUpdate,
        Self::InventoryItemsCreate,
        Self::InventoryItemsUpdate,
        Self::InventoryItemsDelete,
        Self::InventoryLevelsConnect,
        Self::InventoryLevelsUpdate,
        Self::InventoryLevelsDisconnect,
        Self::LocationsCreate,
        Self::LocationsUpdate,
        Self::LocationsDelete,
        Self::FulfillmentsCreate,
        Self::FulfillmentsUpdate,
        Self::FulfillmentServicesCreate,
        Self::FulfillmentServicesUpdate,
        Self::FulfillmentServicesDelete,
        Self::ThemesCreate,
        Self::ThemesUpdate,
        Self::ThemesPublish,
        Self::ThemesDelete,
        Self::DraftOrdersCreate,
        Self::DraftOrdersUpdate,
        Self::DraftOrdersDelete,
        Self::TenderTransactionsCreate,
        Self::DomainsCreate,
        Self::DomainsUpdate,
        Self::DomainsDelete,
        Self::DisputesCreate,
        Self::DisputesUpdate,
        Self::SubscriptionBillingAttemptsSuccess,
        Self::SubscriptionBillingAttemptsFailure,
        Self::SubscriptionBillingAttemptsChallenged,
        Self::LocalesCreate,
        Self::LocalesUpdate,
        Self::MarketsCreate,
        Self::MarketsUpdate,
        Self::MarketsDelete,
        Self::CompaniesCreate,
        Self::CompaniesUpdate,
        Self::CompaniesDelete,
        Self::CompanyContactsCreate,
        Self::CompanyContactsUpdate,
        Self::CompanyContactsDelete,
        Self::CompanyLocationsCreate,
        Self::CompanyLocationsUpdate,
        Self::CompanyLocationsDelete,
        Self::SellingPlanGroupsCreate,
        Self::SellingPlanGroupsUpdate,
        Self::SellingPlanGroupsDelete,
    ];

    /// Maps a wire topic string to its kind.
    ///
    /// Matching is exact (topics are lowercase on the wire). Unknown input
    /// yields [`WebhookTopic::Unclassified`]; this function never fails.
    #[must_use]
    pub fn classify(topic: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|known| known.as_str() == topic)
            .unwrap_or(Self::Unclassified)
    }

    /// Returns the wire topic string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrdersCreate => "orders/create",
            Self::OrdersUpdated => "orders/updated",
            Self::OrdersPaid => "orders/paid",
            Self::OrdersCancelled => "orders/cancelled",
            Self::OrdersFulfilled => "orders/fulfilled",
            Self::OrdersPartiallyFulfilled => "orders/partially_fulfilled",
            Self::OrdersDelete => "orders/delete",
            Self::ProductsCreate => "products/create",
            Self::ProductsUpdate => "products/update",
            Self::ProductsDelete => "products/delete",
            Self::CustomersCreate => "customers/create",
            Self::CustomersUpdate => "customers/update",
            Self::CustomersDelete => "customers/delete",
            Self::CustomersEnable => "customers/enable",
            Self::CustomersDisable => "customers/disable",
            Self::CollectionsCreate => "collections/create",
            Self::CollectionsUpdate => "collections/update",
            Self::CollectionsDelete => "collections/delete",
            Self::CartsCreate => "carts/create",
            Self::CartsUpdate => "carts/update",
            Self::CheckoutsCreate => "checkouts/create",
            Self::CheckoutsUpdate => "checkouts/update",
            Self::CheckoutsDelete => "checkouts/delete",
            Self::RefundsCreate => "refunds/create",
            Self::AppUninstalled => "app/uninstalled",
            Self::AppSubscriptionsUpdate => "app_subscriptions/update",
            Self::AppSubscriptionsApproachingCappedAmount => "app_subscriptions/approaching_capped_amount",
            Self::ShopUpdate => "shop/update",
            Self::InventoryItemsCreate => "inventory_items/create",
            Self::InventoryItemsUpdate => "inventory_items/update",
            Self::InventoryItemsDelete => "inventory_items/delete",
            Self::InventoryLevelsConnect => "inventory_levels/connect",
            Self::InventoryLevelsUpdate => "inventory_levels/update",
            Self::InventoryLevelsDisconnect => "inventory_levels/disconnect",
            Self::LocationsCreate => "locations/create",
            Self::LocationsUpdate => "locations/update",
            Self::LocationsDelete => "locations/delete",
            Self::FulfillmentsCreate => "fulfillments/create",
            Self::FulfillmentsUpdate => "fulfillments/update",
            Self::FulfillmentServicesCreate => "fulfillment_services/create",
            Self::FulfillmentServicesUpdate => "fulfillment_services/update",
            Self::FulfillmentServicesDelete => "fulfillment_services/delete",
            Self::ThemesCreate => "themes/create",
            Self::ThemesUpdate => "themes/update",
            Self::ThemesPublish => "themes/publish",
            Self::ThemesDelete => "themes/delete",
            Self::DraftOrdersCreate => "draft_orders/create",
            Self::DraftOrdersUpdate => "draft_orders/update",
            Self::DraftOrdersDelete => "draft_orders/delete",
            Self::TenderTransactionsCreate => "tender_transactions/create",
            Self::DomainsCreate => "domains/create",
            Self::DomainsUpdate => "domains/update",
            Self::DomainsDelete => "domains/delete",
            Self::DisputesCreate => "disputes/create",
            Self::DisputesUpdate => "disputes/update",
            Self::SubscriptionBillingAttemptsSuccess => "subscription_billing_attempts/success",
            Self::SubscriptionBillingAttemptsFailure => "subscription_billing_attempts/failure",
            Self::SubscriptionBillingAttemptsChallenged => "subscription_billing_attempts/challenged",
            Self::LocalesCreate => "locales/create",
            Self::LocalesUpdate => "locales/update",
            Self::MarketsCreate => "markets/create",
            Self::MarketsUpdate => "markets/update",
            Self::MarketsDelete => "markets/delete",
            Self::CompaniesCreate => "companies/create",
            Self::CompaniesUpdate => "companies/update",
            Self::CompaniesDelete => "companies/delete",
            Self::CompanyContactsCreate => "company_contacts/create",
            Self::CompanyContactsUpdate => "company_contacts/update",
            Self::CompanyContactsDelete => "company_contacts/delete",
            Self::CompanyLocationsCreate => "company_locations/create",
            Self::CompanyLocationsUpdate => "company_locations/update",
            Self::CompanyLocationsDelete => "company_locations/delete",
            Self::SellingPlanGroupsCreate => "selling_plan_groups/create",
            Self::SellingPlanGroupsUpdate => "selling_plan_groups/update",
            Self::SellingPlanGroupsDelete => "selling_plan_groups/delete",
            Self::Unclassified => "unclassified",
        }
    }

    /// Returns `true` unless this is [`WebhookTopic::Unclassified`].
    #[must_use]
    pub const fn is_classified(self) -> bool {
        !matches!(self, Self::Unclassified)
    }

    /// Returns the resource part of the topic (`"orders"` for `orders/create`).
    ///
    /// Returns `None` for [`WebhookTopic::Unclassified`].
    #[must_use]
    pub fn resource(self) -> Option<&'static str> {
        if !self.is_classified() {
            return None;
        }
        self.as_str().split('/').next()
    }

    /// Returns `true` for `orders/*` topics.
    #[must_use]
    pub fn is_order_event(self) -> bool {
        self.resource() == Some("orders")
    }

    /// Returns `true` for `products/*` topics.
    #[must_use]
    pub fn is_product_event(self) -> bool {
        self.resource() == Some("products")
    }

    /// Returns `true` for `customers/*` topics.
    #[must_use]
    pub fn is_customer_event(self) -> bool {
        self.resource() == Some("customers")
    }

    /// Returns `true` for app lifecycle topics (`app/*` and `app_subscriptions/*`).
    #[must_use]
    pub fn is_app_event(self) -> bool {
        matches!(self.resource(), Some("app" | "app_subscriptions"))
    }

    /// Returns `true` for app subscription and subscription billing attempt topics.
    #[must_use]
    pub fn is_billing_event(self) -> bool {
        matches!(
            self.resource(),
            Some("app_subscriptions" | "subscription_billing_attempts")
        )
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookTopic {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::classify(s))
    }
}
