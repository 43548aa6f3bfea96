//! Cross-origin policy: [`CorsConfig`] to a `tower_http` layer.
//!
//! Browsers refuse `*` on credentialed requests, and `tower_http` panics if
//! credentials are combined with a wildcard. When credentials are allowed,
//! a `"*"` entry therefore mirrors the request's origin, method, or headers.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::CorsConfig;

fn is_wildcard(list: &[String]) -> bool {
    list.iter().any(|entry| entry.trim() == "*")
}

/// Build the CORS layer for `config`.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.permissive {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request());
    }

    let credentials = config.allow_credentials;

    let origins = if is_wildcard(&config.allowed_origins) {
        if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        AllowOrigin::list(config.allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin.trim())
                .map_err(|_| warn!(origin = origin, "Ignoring invalid CORS origin"))
                .ok()
        }))
    };

    let methods = if is_wildcard(&config.allowed_methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        AllowMethods::list(config.allowed_methods.iter().filter_map(|method| {
            Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
                .map_err(|_| warn!(method = method, "Ignoring invalid CORS method"))
                .ok()
        }))
    };

    let headers = if is_wildcard(&config.allowed_headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        AllowHeaders::list(config.allowed_headers.iter().filter_map(|header| {
            HeaderName::from_bytes(header.trim().as_bytes())
                .map_err(|_| warn!(header = header, "Ignoring invalid CORS header"))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(credentials)
        .allow_methods(methods)
        .allow_headers(headers)
}
