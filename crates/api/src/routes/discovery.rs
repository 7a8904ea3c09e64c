//! UCP discovery profile served at `/.well-known/ucp`.

use std::collections::BTreeMap;

use axum::Json;
use domain::{Capability, UCP_VERSION};
use serde::Serialize;
use serde_json::{Map, Value, json};

const SHOPPING_SERVICE: &str = "dev.ucp.shopping";
const REST_ENDPOINT: &str = "http://localhost:3000";

#[derive(Debug, Serialize)]
pub struct DiscoveryProfile {
    pub ucp: UcpProfile,
    pub payment: PaymentProfile,
}

#[derive(Debug, Serialize)]
pub struct UcpProfile {
    pub version: &'static str,
    pub services: BTreeMap<&'static str, ServiceProfile>,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Serialize)]
pub struct ServiceProfile {
    pub version: &'static str,
    pub spec: &'static str,
    pub rest: RestBinding,
}

#[derive(Debug, Serialize)]
pub struct RestBinding {
    pub schema: &'static str,
    pub endpoint: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PaymentProfile {
    pub handlers: Vec<HandlerProfile>,
}

#[derive(Debug, Serialize)]
pub struct HandlerProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub spec: &'static str,
    pub config_schema: &'static str,
    pub instrument_schemas: Vec<&'static str>,
    pub config: Value,
}

/// GET /.well-known/ucp
pub async fn profile() -> Json<DiscoveryProfile> {
    Json(merchant_profile())
}

/// The static merchant profile.
pub fn merchant_profile() -> DiscoveryProfile {
    let services = BTreeMap::from([(
        SHOPPING_SERVICE,
        ServiceProfile {
            version: UCP_VERSION,
            spec: "https://ucp.dev/specs/shopping",
            rest: RestBinding {
                schema: "https://ucp.dev/services/shopping/openapi.json",
                endpoint: REST_ENDPOINT,
            },
        },
    )]);

    let capabilities = [
        ("checkout", None),
        ("order", None),
        ("refund", Some("order")),
        ("return", Some("order")),
        ("dispute", Some("order")),
        ("discount", Some("checkout")),
        ("fulfillment", Some("checkout")),
        ("buyer_consent", Some("checkout")),
    ]
    .into_iter()
    .map(|(name, extends)| capability(name, extends))
    .collect();

    DiscoveryProfile {
        ucp: UcpProfile {
            version: UCP_VERSION,
            services,
            capabilities,
        },
        payment: PaymentProfile {
            handlers: vec![
                HandlerProfile {
                    id: "shop_pay",
                    name: "com.shopify.shop_pay",
                    version: UCP_VERSION,
                    spec: "https://shopify.dev/ucp/handlers/shop_pay",
                    config_schema: "https://shopify.dev/ucp/handlers/shop_pay/config.json",
                    instrument_schemas: vec![
                        "https://shopify.dev/ucp/handlers/shop_pay/instrument.json",
                    ],
                    config: json!({ "shop_id": "test-shop-id" }),
                },
                HandlerProfile {
                    id: "google_pay",
                    name: "google.pay",
                    version: "1.0",
                    spec: "https://example.com/spec",
                    config_schema: "https://example.com/schema",
                    instrument_schemas: vec![],
                    config: Value::Object(Map::new()),
                },
                HandlerProfile {
                    id: "mock_payment_handler",
                    name: "dev.ucp.mock_payment",
                    version: "1.0",
                    spec: "https://ucp.dev/specs/mock",
                    config_schema: "https://ucp.dev/schemas/mock.json",
                    instrument_schemas: vec![
                        "https://ucp.dev/schemas/shopping/types/card_payment_instrument.json",
                    ],
                    config: json!({ "supported_tokens": ["success_token", "fail_token"] }),
                },
            ],
        },
    }
}

fn capability(name: &str, extends: Option<&str>) -> Capability {
    Capability {
        name: format!("{SHOPPING_SERVICE}.{name}"),
        version: UCP_VERSION.to_string(),
        spec: Some(format!("https://ucp.dev/specs/shopping/{name}")),
        schema: Some(format!("https://ucp.dev/schemas/shopping/{name}.json")),
        extends: extends.map(|parent| format!("{SHOPPING_SERVICE}.{parent}")),
        config: None,
    }
}
