//! Host-platform compatibility endpoints.
//!
//! These mimic the feature-flag, account-init and settings responses of the
//! platform AlphaMind embeds into, byte-for-byte shapes included, so the
//! host web client boots against this server. They deliberately skip the
//! `{success, data, message}` envelope.

use axum::Json;
use serde_json::{json, Value};

/// Feature flags.
///
/// GET /v1/features (also served at /api/v1/features)
pub async fn features_handler() -> Json<Value> {
    Json(json!({
        "enable_email_password_login": true,
        "enable_email_code_login": true,
        "enable_social_oauth_login": false,
        "sso_enforced_for_signin": false,
        "allow_register": true,
        "allow_create_workspace": true,
        "license_status": "active",
        "webapp_auth": {
            "enabled": false,
        },
    }))
}

/// Console feature flags.
///
/// GET /v1/console/features (also served at /api/v1/console/features)
pub async fn console_features_handler() -> Json<Value> {
    Json(json!({
        "enable_email_password_login": true,
        "enable_email_code_login": true,
        "enable_social_oauth_login": false,
        "sso_enforced_for_signin": false,
    }))
}

/// Account initialization probe.
///
/// GET /v1/console/account/init (also served at /api/v1/console/account/init)
pub async fn account_init_handler() -> Json<Value> {
    Json(json!({
        "is_initialized": true,
        "email": "admin@example.com",
        "name": "admin",
    }))
}

/// Console settings.
///
/// GET /v1/console/settings
pub async fn console_settings_handler() -> Json<Value> {
    Json(json!({
        "allow_register": true,
        "site_name": "AlphaMind",
        "license_status": "active",
    }))
}

/// Authentication settings.
///
/// GET /v1/auth/settings
pub async fn auth_settings_handler() -> Json<Value> {
    Json(json!({
        "email_enabled": true,
        "oauth_enabled": true,
        "providers": [
            {
                "name": "dummy",
                "display_name": "Dummy OAuth",
                "auth_url": "https://example.com/oauth",
                "icon": "",
            }
        ],
    }))
}
