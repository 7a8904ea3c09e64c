//! Wire-level data model shared by the store, the session state machine and
//! the HTTP layer.

pub mod checkout;
pub mod fulfillment;
pub mod order;
pub mod payment;
pub mod product;
pub mod requests;
pub mod status;

pub use checkout::{
    Allocation, AppliedDiscount, Buyer, Capability, Checkout, Consent, Discounts, Item, LineItem,
    Link, PlatformConfig, RESPONSE_UCP_VERSION, Total, TotalType, UCP_VERSION, UcpMetadata,
};
pub use fulfillment::{
    Destination, FlatAddress, Fulfillment, FulfillmentGroup, FulfillmentMethod,
    FulfillmentOption, MethodType, NamedLocation, PostalAddress,
};
pub use order::{
    Expectation, FulfillmentEvent, LineItemQuantity, Order, OrderFulfillment, OrderLineItem,
    OrderLineItemStatus, Quantity,
};
pub use payment::{Payment, PaymentCredential, PaymentHandler, PaymentInstrument, PaymentRequest};
pub use product::Product;
pub use requests::{
    CheckoutCreateRequest, CheckoutUpdateRequest, CompleteCheckoutRequest,
    FulfillmentGroupRequest, FulfillmentMethodRequest, FulfillmentRequest, ItemRequest,
    LineItemRequest,
};
pub use status::CheckoutStatus;
