//! Canonical prediction result.
//!
//! The ML service has shipped several response shapes over time. All known
//! field names are folded into [`PredictionResult`] here so nothing past the
//! client boundary branches on them.

use serde::Serialize;
use serde_json::Value;

use super::value_as_f64;

/// Hazard flag field names, in lookup order.
pub const HAZARD_ALIASES: [&str; 5] = [
    "preditoPerigoso",
    "prediction",
    "ehPerigoso",
    "isDangerous",
    "hazardous",
];

/// Probability field names, in lookup order. All are fractions except
/// [`RISK_SCORE_ALIAS`].
pub const PROBABILITY_ALIASES: [&str; 4] = [
    "probabilidadePerigoso",
    "probability",
    "confidence",
    "scoreRisco",
];

/// Risk score on a 0-100 scale.
pub const RISK_SCORE_ALIAS: &str = "scoreRisco";

pub const DEFAULT_HAZARDOUS_PROBABILITY: f64 = 0.85;
pub const DEFAULT_SAFE_PROBABILITY: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub hazardous: bool,
    /// Fraction in `[0, 1]`.
    pub probability: f64,
    /// False when no probability alias was present and the default was used.
    pub probability_reported: bool,
}

impl PredictionResult {
    pub fn from_value(value: &Value) -> Self {
        let hazardous = HAZARD_ALIASES
            .iter()
            .find_map(|key| value.get(*key).and_then(value_as_flag))
            .unwrap_or(false);

        let reported = PROBABILITY_ALIASES
            .iter()
            .find_map(|key| {
                value
                    .get(*key)
                    .and_then(value_as_f64)
                    .map(|p| normalize_fraction(key, p))
            });

        let probability = reported.unwrap_or(if hazardous {
            DEFAULT_HAZARDOUS_PROBABILITY
        } else {
            DEFAULT_SAFE_PROBABILITY
        });

        Self {
            hazardous,
            probability,
            probability_reported: reported.is_some(),
        }
    }

    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

fn normalize_fraction(key: &str, p: f64) -> f64 {
    let p = if key == RISK_SCORE_ALIAS { p / 100.0 } else { p };
    p.clamp(0.0, 1.0)
}

/// bool, 0/1 number, or "true"/"false"/"1"/"0" string.
pub(crate) fn value_as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|x| x >= 1.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
