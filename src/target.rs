//! Benchmark subjects: a fixed tax calculation over a small JSON order.
//!
//! Shared by the `tax-server` (plain HTTP) and `tax-stdio` (request/response
//! envelope over stdin/stdout) binaries.

use axum::{ http::StatusCode, routing::post, Json, Router };
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;

pub const TAX_RATE: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Receipt {
    pub order_id: String,
    pub total_final: f64,
    pub engine: String,
}

/// Request envelope read from stdin
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub method: String,
    pub body: String,
}

/// Response envelope written to stdout
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// `POST /api/bench` answering with a [`Receipt`], 400 on a malformed order
pub fn http_router(engine: &'static str) -> Router {
    Router::new().route(
        "/api/bench",
        post(move |body: String| async move { bench(&body, engine) })
    )
}

fn bench(body: &str, engine: &str) -> Result<Json<Receipt>, (StatusCode, String)> {
    let order: Order = serde_json
        ::from_str(body)
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    Ok(Json(apply_tax(order, engine)))
}

pub fn apply_tax(order: Order, engine: &str) -> Receipt {
    Receipt {
        total_final: order.value * (1.0 + TAX_RATE),
        order_id: order.id,
        engine: engine.to_string(),
    }
}

/// Decode an envelope, then its body, and answer with a receipt.
///
/// Malformed input never panics; it becomes a 400 envelope.
pub fn handle_envelope(input: &str, engine: &str) -> EnvelopeResponse {
    let envelope: Envelope = match serde_json::from_str(input) {
        Ok(envelope) => envelope,
        Err(_) => {
            return error_response(400, "Invalid Input Protocol");
        }
    };
    let order: Order = match serde_json::from_str(&envelope.body) {
        Ok(order) => order,
        Err(_) => {
            return error_response(400, "Invalid JSON Body");
        }
    };

    match serde_json::to_string(&apply_tax(order, engine)) {
        Ok(body) => json_response(200, body),
        Err(_) => error_response(500, "Encoding Failure"),
    }
}

fn json_response(status: u16, body: String) -> EnvelopeResponse {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    EnvelopeResponse { status, headers, body }
}

fn error_response(status: u16, message: &str) -> EnvelopeResponse {
    json_response(status, serde_json::json!({ "error": message }).to_string())
}
