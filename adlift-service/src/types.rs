//! Request and response bodies for the submission API.
//!
//! Required fields are modelled as `Option` so that presence checks (and
//! the exact "Missing required field" wording) stay under our control
//! instead of serde's.

use adlift_common::{AdliftError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/v1/create_ad`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<PriceInput>,
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Extra marketplace attributes; JSON object order is preserved
    /// (serde_json `preserve_order`) so the feed stays deterministic.
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
}

/// Body of `POST /api/v1/create_bulk_ads`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBulkAdsRequest {
    pub category: Option<String>,
    pub ads: Option<Vec<BulkAdItem>>,
}

/// One ad inside a bulk submission.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkAdItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<PriceInput>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
}

/// A price as it may appear in a request body: a JSON integer, a whole
/// JSON number, or numeric text. Canonicalised to `u64` before it reaches
/// the document model.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Int(u64),
    Float(f64),
    Text(String),
}

impl PriceInput {
    /// Coerce to a non-negative integer, rejecting fractional, negative,
    /// and non-numeric values.
    pub fn canonicalize(&self) -> Result<u64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Float(f) => coerce_whole(*f),
            Self::Text(s) => {
                let trimmed = s.trim();
                if let Ok(v) = trimmed.parse::<u64>() {
                    return Ok(v);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| AdliftError::InvalidPrice(s.clone()))
                    .and_then(coerce_whole)
            }
        }
    }
}

fn coerce_whole(f: f64) -> Result<u64> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Ok(f as u64)
    } else {
        Err(AdliftError::InvalidPrice(f.to_string()))
    }
}

/// Convert a request `params` object into ordered extra fields, rendering
/// non-string scalars as their display text.
pub fn params_to_fields(params: serde_json::Map<String, Value>) -> Vec<(String, String)> {
    params
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}

/// Successful submission response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub status: String,
    pub message: String,
    /// Path of the written feed file.
    pub file: String,
}

/// Error payload for both client and server failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `GET /api/v1/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// ISO-8601 server time.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_accepts_integer_whole_float_and_numeric_text() {
        assert_eq!(PriceInput::Int(1000).canonicalize().unwrap(), 1000);
        assert_eq!(PriceInput::Float(1000.0).canonicalize().unwrap(), 1000);
        assert_eq!(
            PriceInput::Text("1000".into()).canonicalize().unwrap(),
            1000
        );
        assert_eq!(
            PriceInput::Text(" 1000.0 ".into()).canonicalize().unwrap(),
            1000
        );
    }

    #[test]
    fn price_rejects_negative_fractional_and_garbage() {
        assert!(PriceInput::Float(-1.0).canonicalize().is_err());
        assert!(PriceInput::Float(10.5).canonicalize().is_err());
        assert!(PriceInput::Text("-5".into()).canonicalize().is_err());
        assert!(PriceInput::Text("cheap".into()).canonicalize().is_err());
    }

    #[test]
    fn absent_fields_deserialize_to_none() {
        let req: CreateAdRequest = serde_json::from_value(json!({"title": "T"})).unwrap();
        assert_eq!(req.title.as_deref(), Some("T"));
        assert!(req.description.is_none());
        assert!(req.price.is_none());
        assert!(req.category.is_none());
        assert!(req.images.is_empty());
        assert!(req.params.is_empty());
    }

    #[test]
    fn params_keep_json_object_order_and_stringify_scalars() {
        let req: CreateAdRequest = serde_json::from_value(json!({
            "params": {"Condition": "New", "Brand": "Apple", "Year": 2024}
        }))
        .unwrap();
        let fields = params_to_fields(req.params);
        assert_eq!(
            fields,
            vec![
                ("Condition".to_string(), "New".to_string()),
                ("Brand".to_string(), "Apple".to_string()),
                ("Year".to_string(), "2024".to_string()),
            ]
        );
    }
}
