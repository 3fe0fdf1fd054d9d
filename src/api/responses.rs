//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::timer::TimerSnapshot;

/// API response structure for event endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// The event caused a transition
    pub fn accepted(message: String, timer: TimerSnapshot) -> Self {
        Self::new("accepted".to_string(), message, timer)
    }

    /// The event had no transition in the current state
    pub fn ignored(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ignored".to_string(), message, timer)
    }
}

/// Body of the field update endpoints.
///
/// `value` is kept as raw JSON text so numbers beyond `f64` range still
/// parse (to infinity) instead of failing the whole body.
#[derive(Debug, Deserialize)]
pub struct FieldUpdate<'a> {
    #[serde(borrow, default)]
    pub value: Option<&'a RawValue>,
}

impl FieldUpdate<'_> {
    /// Numeric value of the update, `NaN` for anything that isn't a number
    pub fn raw(&self) -> f64 {
        let Some(value) = self.value else {
            return f64::NAN;
        };

        let text = value.get().trim();
        if let Ok(number) = text.parse::<f64>() {
            return number;
        }

        serde_json::from_str::<String>(text)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|number| number.is_finite())
            .unwrap_or(f64::NAN)
    }

    /// Parse a request body; an unreadable body counts as `NaN`
    pub fn parse(body: &[u8]) -> f64 {
        serde_json::from_slice::<FieldUpdate>(body)
            .map(|update| update.raw())
            .unwrap_or(f64::NAN)
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
