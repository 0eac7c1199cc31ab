//! Wire model for the NEO and ML services.
//!
//! Field names follow the NEO service's JSON (Portuguese camelCase). English
//! aliases are accepted so hand-written snapshots stay readable.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod prediction;

pub use prediction::PredictionResult;

/// km/s → km/h.
pub const KMS_TO_KMH: f64 = 3600.0;

/// Placeholder miss-distance proxy: `max diameter (m) * 100000`.
/// The NEO service does not expose a real miss distance yet.
pub const MOCK_DISTANCE_FACTOR: f64 = 100_000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeoRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default)]
    pub neo_id: Option<String>,
    #[serde(rename = "nome", alias = "name", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "magnitudeAbsoluta", alias = "absoluteMagnitude", default, deserialize_with = "lenient_f64")]
    pub absolute_magnitude: Option<f64>,
    #[serde(rename = "diametroMinM", alias = "minDiameterM", default, deserialize_with = "lenient_f64")]
    pub min_diameter_m: Option<f64>,
    #[serde(rename = "diametroMaxM", alias = "maxDiameterM", default, deserialize_with = "lenient_f64")]
    pub max_diameter_m: Option<f64>,
    #[serde(rename = "velocidadeKmS", alias = "velocityKmS", default, deserialize_with = "lenient_f64")]
    pub velocity_km_s: Option<f64>,
    #[serde(rename = "ehPotencialmentePerigoso", alias = "isPotentiallyHazardous", default, deserialize_with = "lenient_bool")]
    pub hazardous: bool,
    #[serde(rename = "dataPrimeiraAproximacao", alias = "firstApproachDate", default)]
    pub first_approach_date: Option<String>,
    #[serde(rename = "planetaAlvo", alias = "targetPlanet", default)]
    pub target_planet: Option<String>,
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

impl NeoRecord {
    pub fn min_diameter(&self) -> f64 {
        finite_or_zero(self.min_diameter_m)
    }

    /// Max diameter in meters, 0 when absent.
    pub fn diameter(&self) -> f64 {
        finite_or_zero(self.max_diameter_m)
    }

    pub fn velocity_kms(&self) -> f64 {
        finite_or_zero(self.velocity_km_s)
    }

    pub fn velocity_kmh(&self) -> f64 {
        self.velocity_kms() * KMS_TO_KMH
    }

    /// Approximation only, see [`MOCK_DISTANCE_FACTOR`].
    pub fn mock_distance_km(&self) -> f64 {
        self.diameter() * MOCK_DISTANCE_FACTOR
    }

    /// `YYYY-MM` prefix of the first approach date.
    pub fn approach_month(&self) -> Option<&str> {
        self.first_approach_date.as_deref().and_then(|d| d.get(0..7))
    }

    pub fn approach_date(&self) -> Option<NaiveDate> {
        let raw = self.first_approach_date.as_deref()?.get(0..10)?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

fn finite_or_zero(v: Option<f64>) -> f64 {
    match v {
        Some(x) if x.is_finite() => x,
        _ => 0.0,
    }
}

/// Result of `/ml/train` and `/ml/train/all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResult {
    #[serde(default, deserialize_with = "lenient_f64_zero")]
    pub accuracy: f64,
    #[serde(default, deserialize_with = "lenient_f64_zero")]
    pub precision: f64,
    #[serde(default, deserialize_with = "lenient_f64_zero")]
    pub recall: f64,
    #[serde(default, deserialize_with = "lenient_f64_zero")]
    pub f1_score: f64,
    #[serde(default)]
    pub train_size: u64,
    #[serde(default)]
    pub test_size: u64,
    #[serde(default)]
    pub model_path: Option<String>,
}

/// Request body of `/ml/predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionFeatures {
    #[serde(rename = "diametroMinM")]
    pub min_diameter_m: f64,
    #[serde(rename = "diametroMaxM")]
    pub max_diameter_m: f64,
    #[serde(rename = "velocidadeKmS")]
    pub velocity_km_s: f64,
    #[serde(rename = "magnitudeAbsoluta", skip_serializing_if = "Option::is_none")]
    pub absolute_magnitude: Option<f64>,
}

impl PredictionFeatures {
    /// Rejects non-positive or non-finite inputs before any request is made.
    pub fn validate(&self) -> anyhow::Result<()> {
        let fields = [
            ("min diameter", self.min_diameter_m),
            ("max diameter", self.max_diameter_m),
            ("velocity", self.velocity_km_s),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{} must be a positive number", name);
            }
        }
        if let Some(mag) = self.absolute_magnitude {
            if !mag.is_finite() {
                anyhow::bail!("absolute magnitude must be a number");
            }
        }
        Ok(())
    }
}

/// Number, numeric string or null. Anything else becomes `None`.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

fn lenient_f64_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.unwrap_or(0.0))
}

/// Integer or integer string; null and anything else become 0.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let id = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(id.unwrap_or(0))
}

/// Null becomes the empty string, rendered as the no-data sentinel.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(prediction::value_as_flag).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_service_payload() {
        let raw = r#"{
            "id": 7,
            "neoId": "3542519",
            "nome": "(2010 PK9)",
            "magnitudeAbsoluta": 21.3,
            "diametroMinM": 120.5,
            "diametroMaxM": 269.4,
            "velocidadeKmS": "14.25",
            "ehPotencialmentePerigoso": true,
            "dataPrimeiraAproximacao": "2024-03-17T00:00:00Z",
            "planetaAlvo": "Earth",
            "self": "http://localhost:8080/api/neos/7"
        }"#;
        let neo: NeoRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(neo.id, 7);
        assert_eq!(neo.name, "(2010 PK9)");
        assert!(neo.hazardous);
        assert!((neo.velocity_kms() - 14.25).abs() < 1e-9);
        assert!((neo.velocity_kmh() - 51_300.0).abs() < 1e-6);
        assert_eq!(neo.approach_month(), Some("2024-03"));
        assert_eq!(neo.approach_date(), NaiveDate::from_ymd_opt(2024, 3, 17));
    }

    #[test]
    fn test_missing_numbers_read_as_zero() {
        let neo: NeoRecord =
            serde_json::from_str(r#"{"id": 1, "nome": "x", "diametroMaxM": null, "velocidadeKmS": "n/a"}"#)
                .unwrap();
        assert_eq!(neo.diameter(), 0.0);
        assert_eq!(neo.velocity_kmh(), 0.0);
        assert_eq!(neo.mock_distance_km(), 0.0);
        assert!(!neo.hazardous);
        assert_eq!(neo.approach_month(), None);
    }

    #[test]
    fn test_english_aliases() {
        let neo: NeoRecord = serde_json::from_str(
            r#"{"id": 2, "name": "Apophis", "maxDiameterM": 370, "isPotentiallyHazardous": true, "firstApproachDate": "2029-04-13"}"#,
        )
        .unwrap();
        assert_eq!(neo.name, "Apophis");
        assert_eq!(neo.diameter(), 370.0);
        assert!(neo.hazardous);
        assert_eq!(neo.approach_month(), Some("2029-04"));
    }

    #[test]
    fn test_short_date_has_no_month() {
        let neo = NeoRecord {
            first_approach_date: Some("2024".to_string()),
            ..Default::default()
        };
        assert_eq!(neo.approach_month(), None);
        assert_eq!(neo.approach_date(), None);
    }

    #[test]
    fn test_training_result_decodes() {
        let raw = r#"{"accuracy":0.947,"precision":0.945,"recall":0.94,"f1Score":0.9425,"trainSize":800,"testSize":200,"modelPath":"models/rf-1.model"}"#;
        let res: TrainingResult = serde_json::from_str(raw).unwrap();
        assert_eq!(res.train_size, 800);
        assert_eq!(res.model_path.as_deref(), Some("models/rf-1.model"));
        assert!((res.f1_score - 0.9425).abs() < 1e-9);
    }

    #[test]
    fn test_features_validation() {
        let ok = PredictionFeatures {
            min_diameter_m: 100.0,
            max_diameter_m: 250.0,
            velocity_km_s: 12.0,
            absolute_magnitude: None,
        };
        assert!(ok.validate().is_ok());
        let bad = PredictionFeatures { velocity_km_s: 0.0, ..ok };
        assert!(bad.validate().is_err());
        let json = serde_json::to_value(ok).unwrap();
        assert_eq!(json["diametroMaxM"], 250.0);
        assert!(json.get("magnitudeAbsoluta").is_none());
    }
}
