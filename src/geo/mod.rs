//! IP geolocation.
//!
//! `client` talks to the upstream provider on behalf of the location endpoint;
//! `resolver` is the caching, de-duplicating lookup used by the form engine.
//! This module also owns the request-address plumbing: extracting the caller's
//! apparent address from proxy headers and classifying addresses that must not
//! be forwarded upstream.

mod client;
mod resolver;

pub use client::{GeoClient, GeoError};
pub use resolver::{HttpLocationFetch, LocationFetch, LocationResolver, LOCATION_CACHE_TTL};

use std::net::IpAddr;

use axum::http::HeaderMap;
use once_cell::sync::Lazy;
use regex::Regex;

static FORWARDED_FOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)for=([^;,]+)").expect("valid forwarded pattern"));

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Derive the caller's apparent address from proxy headers.
///
/// Precedence: `x-forwarded-for` (first hop), `x-real-ip`, `cf-connecting-ip`,
/// then the RFC 7239 `Forwarded` header.
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = header_str(headers, "x-forwarded-for") {
        // May contain multiple addresses: client, proxy1, proxy2
        if let Some(first) = xff.split(',').next().map(str::trim).filter(|s| !s.is_empty()) {
            return Some(first.to_string());
        }
    }

    if let Some(xri) = header_str(headers, "x-real-ip") {
        return Some(xri.to_string());
    }

    if let Some(cf) = header_str(headers, "cf-connecting-ip") {
        return Some(cf.to_string());
    }

    if let Some(forwarded) = header_str(headers, "forwarded") {
        if let Some(capture) = FORWARDED_FOR_RE
            .captures(forwarded)
            .and_then(|captures| captures.get(1))
        {
            let value = capture.as_str().replace('"', "");
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }

    None
}

/// Whether an address is private, loopback or link-local and therefore must
/// not be sent upstream as an explicit lookup target.
pub fn is_private_or_local(ip: &str) -> bool {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        Ok(IpAddr::V6(v6)) => {
            if v6.is_loopback() {
                return true;
            }
            let first = v6.segments()[0];
            // fe80::/10 link-local, fc00::/7 unique local
            (first & 0xffc0) == 0xfe80 || (first & 0xfe00) == 0xfc00
        }
        Err(_) => false,
    }
}
