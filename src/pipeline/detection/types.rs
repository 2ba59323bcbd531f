use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Closed pollution taxonomy. Serialized with the display names clients
/// already rely on (`pollution_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollutionCategory {
    #[serde(rename = "Vehicular Emission")]
    VehicularEmission,
    #[serde(rename = "Air Pollution (Smoke)")]
    AirPollutionSmoke,
    #[serde(rename = "Air Pollution (Fire)")]
    AirPollutionFire,
    #[serde(rename = "Industrial Emission")]
    IndustrialEmission,
    #[serde(rename = "Solid Waste/Garbage")]
    SolidWaste,
    #[serde(rename = "Unknown/General Pollution")]
    Unknown,
    #[serde(rename = "No obvious pollution detected")]
    NoPollutionDetected,
    #[serde(rename = "Error During Detection")]
    Error,
}

impl PollutionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VehicularEmission => "Vehicular Emission",
            Self::AirPollutionSmoke => "Air Pollution (Smoke)",
            Self::AirPollutionFire => "Air Pollution (Fire)",
            Self::IndustrialEmission => "Industrial Emission",
            Self::SolidWaste => "Solid Waste/Garbage",
            Self::Unknown => "Unknown/General Pollution",
            Self::NoPollutionDetected => "No obvious pollution detected",
            Self::Error => "Error During Detection",
        }
    }
}

impl std::fmt::Display for PollutionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an evidence entry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvidenceSource {
    ObjectDetector,
    SceneClassifier,
    OfflineSimulator,
    System,
    /// Error evidence carries the failure message in place of a source.
    Failure(String),
}

impl EvidenceSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ObjectDetector => "Object Detector",
            Self::SceneClassifier => "Scene Classifier",
            Self::OfflineSimulator => "Offline Simulator",
            Self::System => "System",
            Self::Failure(message) => message,
        }
    }
}

impl Serialize for EvidenceSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Pixel box `[xmin, ymin, xmax, ymax]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox(pub [i64; 4]);

impl BoundingBox {
    /// Accepts DETR's `{xmin, ymin, xmax, ymax}` object or a 4-element array.
    pub fn from_value(value: &Value) -> Option<Self> {
        let coord = |v: &Value| v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64));
        match value {
            Value::Object(map) => {
                let get = |key: &str| map.get(key).and_then(coord);
                Some(Self([get("xmin")?, get("ymin")?, get("xmax")?, get("ymax")?]))
            }
            Value::Array(items) if items.len() == 4 => Some(Self([
                coord(&items[0])?,
                coord(&items[1])?,
                coord(&items[2])?,
                coord(&items[3])?,
            ])),
            _ => None,
        }
    }
}

/// One detection or classification record backing a decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    pub label: String,
    pub score: f64,
    #[serde(rename = "pollution_type", skip_serializing_if = "Option::is_none")]
    pub category: Option<PollutionCategory>,
    #[serde(rename = "box", skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    pub source: EvidenceSource,
}

/// Final verdict for one image. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutionDecision {
    #[serde(rename = "pollution_type")]
    pub category: PollutionCategory,
    /// In `[0, 0.9999]`, rounded to 4 decimals.
    #[serde(rename = "confidence_level")]
    pub confidence: f64,
    #[serde(rename = "details")]
    pub evidence: Vec<Evidence>,
}

impl PollutionDecision {
    /// Error-category result for an internal failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            category: PollutionCategory::Error,
            confidence: 0.0,
            evidence: vec![Evidence {
                label: "Error".to_string(),
                score: 0.0,
                category: None,
                bbox: None,
                source: EvidenceSource::Failure(message.into()),
            }],
        }
    }
}

/// HTTP-facing analysis result: decision plus legal draft.
#[derive(Debug, Clone, Serialize)]
pub struct PollutionReport {
    pub pollution_type: PollutionCategory,
    pub confidence_level: f64,
    pub legal_draft: String,
    pub details: Vec<Evidence>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_serializes_to_display_name() {
        let value = serde_json::to_value(PollutionCategory::SolidWaste).unwrap();
        assert_eq!(value, "Solid Waste/Garbage");
        assert_eq!(
            PollutionCategory::NoPollutionDetected.to_string(),
            "No obvious pollution detected"
        );
    }

    #[test]
    fn category_roundtrips_from_wire_name() {
        let parsed: PollutionCategory = serde_json::from_value(json!("Air Pollution (Fire)")).unwrap();
        assert_eq!(parsed, PollutionCategory::AirPollutionFire);
    }

    #[test]
    fn bbox_from_detr_object() {
        let value = json!({"xmin": 10, "ymin": 20, "xmax": 110, "ymax": 220});
        assert_eq!(BoundingBox::from_value(&value), Some(BoundingBox([10, 20, 110, 220])));
    }

    #[test]
    fn bbox_from_array_and_rejects_partial() {
        assert_eq!(
            BoundingBox::from_value(&json!([1, 2.6, 3, 4])),
            Some(BoundingBox([1, 3, 3, 4]))
        );
        assert_eq!(BoundingBox::from_value(&json!([1, 2, 3])), None);
        assert_eq!(BoundingBox::from_value(&json!({"xmin": 1})), None);
        assert_eq!(BoundingBox::from_value(&json!(null)), None);
    }

    #[test]
    fn decision_serializes_with_wire_field_names() {
        let decision = PollutionDecision {
            category: PollutionCategory::VehicularEmission,
            confidence: 0.91,
            evidence: vec![Evidence {
                label: "car".into(),
                score: 0.91,
                category: Some(PollutionCategory::VehicularEmission),
                bbox: Some(BoundingBox([0, 0, 5, 5])),
                source: EvidenceSource::ObjectDetector,
            }],
        };
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(value["pollution_type"], "Vehicular Emission");
        assert_eq!(value["confidence_level"], 0.91);
        assert_eq!(value["details"][0]["source"], "Object Detector");
        assert_eq!(value["details"][0]["box"], json!([0, 0, 5, 5]));
        assert_eq!(value["details"][0]["pollution_type"], "Vehicular Emission");
    }

    #[test]
    fn failure_decision_carries_message_as_source() {
        let decision = PollutionDecision::failure("Image decode failed: bad header");
        assert_eq!(decision.category, PollutionCategory::Error);
        assert_eq!(decision.confidence, 0.0);
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(value["details"][0]["label"], "Error");
        assert_eq!(value["details"][0]["source"], "Image decode failed: bad header");
        assert!(value["details"][0].get("box").is_none());
    }
}
