use actix_web::{web, HttpResponse, Responder};
use envelope_common::store::Store;
use serde::Deserialize;
use serde_json::json;

use crate::env;

#[derive(Deserialize)]
pub struct HealthKeyQuery {
    pub key: Option<String>,
}

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

pub async fn health(
    store: web::Data<dyn Store>,
    query: web::Query<HealthKeyQuery>,
) -> impl Responder {
    if !is_health_key_correct(query.key.as_deref(), &env::CONF.health_endpoint_key) {
        return HttpResponse::Unauthorized().finish();
    }

    let store_health = store.health();
    let resp_body = json!({
        "db_thread_pool_state": {
            "connections": store_health.connections,
            "idle_connections": store_health.idle_connections
        }
    });

    HttpResponse::Ok().json(resp_body)
}

#[inline]
fn is_health_key_correct(key: Option<&str>, correct_key: &str) -> bool {
    let Some(key) = key else {
        return false;
    };

    let correct_key = correct_key.as_bytes();
    let key = key.as_bytes();

    if correct_key.len() != key.len() || key.is_empty() {
        return false;
    }

    // Bitwise comparison so the time taken doesn't depend on where the keys differ
    let keys_dont_match = correct_key
        .iter()
        .zip(key)
        .fold(0u8, |acc, (correct_byte, byte)| acc | (correct_byte ^ byte));

    keys_dont_match == 0
}
