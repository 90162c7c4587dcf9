//! Common API handler utilities.
//!
//! Shared response builders and request-body field extraction. Create
//! endpoints take a raw JSON body and pull required fields out by hand so a
//! missing field surfaces as a 400 with a field-specific message rather
//! than a deserialization rejection.

use axum::response::Json;
use serde_json::Value;

use crate::models::{common::ApiResponse, error::ErrorResponse};

/// Unified Result type for all API handlers.
pub type HandlerResult<T> = Result<Json<ApiResponse<T>>, ErrorResponse>;

/// Result type for utility functions that return parsed values.
pub type ExtractResult<T> = Result<T, ErrorResponse>;

/// Create a successful response with data.
pub fn ok<T: serde::Serialize>(data: T) -> HandlerResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Create a successful response with data and a summary message.
pub fn ok_with_message<T: serde::Serialize>(
    data: T,
    message: impl Into<String>,
) -> HandlerResult<T> {
    Ok(Json(ApiResponse::success_with_message(data, message)))
}

/// Create a successful response with only a message (e.g. deletes).
pub fn ok_message<T: serde::Serialize>(message: impl Into<String>) -> HandlerResult<T> {
    Ok(Json(ApiResponse::message_only(message)))
}

/// Extract a required string field from a JSON body, or fail with a 400
/// naming the field.
pub fn require_str<'a>(body: &'a Value, field: &str) -> ExtractResult<&'a str> {
    match body.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ErrorResponse::bad_request(format!("{} is required", field))),
    }
}

/// Extract an optional string field from a JSON body.
pub fn optional_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field).and_then(Value::as_str)
}

/// Extract an optional string list from a JSON body.
pub fn optional_str_list(body: &Value, field: &str) -> Vec<String> {
    body.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The user the request acts for. Authentication is out of scope; the
/// original falls back to a default identity the same way.
pub fn user_id_or_default(body: &Value) -> String {
    optional_str(body, "user_id").unwrap_or("default_user").to_string()
}
