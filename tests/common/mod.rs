#![allow(dead_code)]

use std::time::Duration;

use robotics_storefront::{ApiClient, AppConfig, Services, Store};
use serde_json::{json, Value};
use wiremock::MockServer;

/// A wiremock backend plus a store wired to it.
pub struct TestBackend {
    pub server: MockServer,
    pub config: AppConfig,
}

impl TestBackend {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let config = AppConfig::new(format!("{}/api/", server.uri()), "test");
        Self { server, config }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::with_timeout(&self.config.api_base_url, Duration::from_secs(5))
            .expect("client builds")
    }

    pub fn services(&self) -> Services {
        Services::from_client(self.client())
    }

    pub fn store(&self) -> Store {
        Store::new(self.services(), &self.config)
    }
}

pub fn envelope(data: Value) -> Value {
    json!({ "data": data })
}

pub fn page(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({
        "data": {
            "data": items,
            "current_page": 1,
            "last_page": 1,
            "per_page": 10,
            "total": total
        }
    })
}

pub fn address_json() -> Value {
    json!({
        "full_name": "Grace Hopper",
        "address_line1": "1 Compiler Way",
        "city": "Arlington",
        "state": "VA",
        "postal_code": "22201",
        "country": "US"
    })
}

pub fn order_json(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "order_number": format!("ORD-{:05}", id),
        "user_id": 7,
        "customer_name": format!("Customer {}", id),
        "customer_email": format!("customer{}@example.com", id),
        "items": [{
            "product_id": 100 + id,
            "name": format!("Servo motor {}", id),
            "category_id": 2,
            "quantity": 2,
            "price": "22.50"
        }],
        "status": status,
        "payment_method": "paypal",
        "payment_status": "paid",
        "shipping_address": address_json(),
        "subtotal": "45.00",
        "tax": "3.60",
        "shipping": "9.99",
        "discount": "0",
        "total": "58.59",
        "created_at": format!("2024-02-{:02}T10:00:00Z", id % 28 + 1)
    })
}

pub fn cart_json(lines: &[(u64, &str, u32)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|(id, price, quantity)| {
            json!({
                "id": id,
                "product_id": id + 500,
                "name": format!("Sensor {}", id),
                "price": price,
                "quantity": quantity,
                "stock": 20
            })
        })
        .collect();
    json!({ "data": { "items": items } })
}
