//! Normalized geolocation records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A geolocation lookup result, normalized from the upstream provider.
///
/// Field names stay snake_case on the wire; this is the provider-facing shape
/// the web client already consumes. Unknown or missing upstream fields map to
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub ip: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub region_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub postal: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}

impl LocationInfo {
    /// Normalize a raw provider payload.
    ///
    /// The provider reports `timezone` either as a plain string or as an
    /// object with an `id` field; both collapse to the identifier.
    pub fn from_provider(data: &Value) -> Self {
        let text = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .map(|s| s.to_string())
        };
        let number = |key: &str| data.get(key).and_then(Value::as_f64);

        let timezone = match data.get("timezone") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Object(obj)) => obj
                .get("id")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
            _ => None,
        };

        Self {
            ip: text("ip"),
            city: text("city"),
            region: text("region"),
            region_code: text("region_code"),
            country: text("country"),
            country_code: text("country_code"),
            postal: text("postal"),
            latitude: number("latitude"),
            longitude: number("longitude"),
            timezone,
        }
    }
}

/// Response body of the location endpoint.
///
/// Always serialized with explicit nulls so the client sees a stable shape;
/// `error` appears only when the lookup failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    #[serde(flatten)]
    pub info: LocationInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
