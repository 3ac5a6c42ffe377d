//! Location lookup endpoint.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;

use crate::geo::{extract_client_ip, is_private_or_local};
use crate::models::{LocationInfo, LocationQuery, LocationResponse};
use crate::AppState;

/// GET /api/location - Resolve the caller's approximate location.
///
/// The caller's apparent address comes from the query override (testing) or
/// the proxy headers. Private, loopback and link-local addresses are never
/// forwarded upstream; the provider then infers from the outbound connection
/// instead. Failures still answer 200 with nulls and an `error` string so the
/// client can degrade gracefully, and the response is marked uncacheable
/// because it is per-user data.
pub async fn lookup_location(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let extracted = query
        .ip
        .as_deref()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| extract_client_ip(&headers));

    let lookup_target = extracted
        .as_deref()
        .filter(|ip| !is_private_or_local(ip));

    let body = match state.geo.lookup(lookup_target).await {
        Ok(mut info) => {
            if info.ip.is_none() {
                info.ip = extracted;
            }
            LocationResponse { info, error: None }
        }
        Err(err) => {
            tracing::warn!("Geolocation lookup failed: {}", err);
            LocationResponse {
                info: LocationInfo {
                    ip: extracted,
                    ..LocationInfo::default()
                },
                error: Some("Failed to fetch geolocation".to_string()),
            }
        }
    };

    (
        [(header::CACHE_CONTROL, "no-store, max-age=0")],
        Json(body),
    )
}
