use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::keywords::{first_match, map_label, map_scene_label, DEMO_FILENAME_KEYWORDS};
use super::normalize::to_rgb_jpeg;
use super::types::{BoundingBox, Evidence, EvidenceSource, PollutionCategory, PollutionDecision};
use super::DetectionError;
use crate::pipeline::inference::{call_vision_model, VisionModelClient, VisionTask};

// ──────────────────────────────────────────────
// Constants
// ──────────────────────────────────────────────

const OFFLINE_CONFIDENCE: f64 = 0.98;
const OFFLINE_LABEL_SCORE: f64 = 0.99;
const OFFLINE_BOX: BoundingBox = BoundingBox([100, 100, 500, 500]);
const SIMULATION_MARKER: &str = "Simulation_Active";

/// Scene labels describe the whole frame and outweigh single objects.
const SCENE_BOOST: f64 = 1.1;

const SOLID_WASTE_PRIORITY: f64 = 0.3;
const FIRE_PRIORITY: f64 = 0.4;

/// Display ceiling, not a probability correction.
const MAX_CONFIDENCE: f64 = 0.9999;

// ──────────────────────────────────────────────
// PollutionDetector
// ──────────────────────────────────────────────

/// Turns one image into one `PollutionDecision`.
///
/// The vision client is injected; the detector owns no global state and is
/// safe to share across concurrent analyses.
pub struct PollutionDetector {
    vision: Arc<dyn VisionModelClient>,
}

impl PollutionDetector {
    pub fn new(vision: Arc<dyn VisionModelClient>) -> Self {
        Self { vision }
    }

    /// Classify an image. Never fails: internal errors become an
    /// `Error`-category decision.
    ///
    /// A filename containing a demo keyword short-circuits everything,
    /// including image decoding and remote calls.
    pub fn decide(&self, image_bytes: &[u8], filename_hint: &str) -> PollutionDecision {
        let _span = tracing::info_span!(
            "pollution_decide",
            analysis_id = %Uuid::new_v4(),
            image_size = image_bytes.len(),
        )
        .entered();

        if let Some(decision) = offline_decision(filename_hint) {
            return decision;
        }

        let start = std::time::Instant::now();
        match self.run_inference(image_bytes) {
            Ok(decision) => {
                tracing::info!(
                    category = %decision.category,
                    confidence = decision.confidence,
                    evidence = decision.evidence.len(),
                    elapsed_ms = %start.elapsed().as_millis(),
                    "Pollution decision"
                );
                decision
            }
            Err(e) => {
                tracing::error!(error = %e, "Pollution detection failed");
                PollutionDecision::failure(e.to_string())
            }
        }
    }

    fn run_inference(&self, image_bytes: &[u8]) -> Result<PollutionDecision, DetectionError> {
        let jpeg = to_rgb_jpeg(image_bytes)?;

        let detections = call_vision_model(self.vision.as_ref(), VisionTask::ObjectDetection, &jpeg);
        let scenes = call_vision_model(self.vision.as_ref(), VisionTask::SceneClassification, &jpeg);

        Ok(score_evidence(&detections, &scenes))
    }
}

/// Deterministic demo response keyed on the filename, no I/O.
pub fn offline_decision(filename_hint: &str) -> Option<PollutionDecision> {
    let (keyword, category) = first_match(filename_hint, DEMO_FILENAME_KEYWORDS)?;

    tracing::info!(keyword, %category, "Offline demo: filename keyword matched");

    Some(PollutionDecision {
        category,
        confidence: OFFLINE_CONFIDENCE,
        evidence: vec![
            Evidence {
                label: keyword.to_string(),
                score: OFFLINE_LABEL_SCORE,
                category: Some(category),
                bbox: Some(OFFLINE_BOX),
                source: EvidenceSource::OfflineSimulator,
            },
            Evidence {
                label: SIMULATION_MARKER.to_string(),
                score: 1.0,
                category: None,
                bbox: None,
                source: EvidenceSource::System,
            },
        ],
    })
}

// ──────────────────────────────────────────────
// Scoring
// ──────────────────────────────────────────────

/// One `{label, score, box?}` record from a vision endpoint.
struct RawRecord {
    label: Option<String>,
    score: f64,
    bbox: Option<BoundingBox>,
}

/// Records from a vision body. Non-list bodies yield nothing; non-object
/// entries are skipped.
fn records(body: &Value) -> Vec<RawRecord> {
    let Some(items) = body.as_array() else {
        if !body.is_null() {
            tracing::warn!("Vision response is not a list, ignoring");
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| RawRecord {
            label: item.get("label").and_then(Value::as_str).map(str::to_string),
            score: item.get("score").and_then(Value::as_f64).unwrap_or(0.0),
            bbox: item.get("box").and_then(BoundingBox::from_value),
        })
        .collect()
}

/// Per-category best score, in first-seen order.
#[derive(Debug, Default)]
struct ScoreBoard {
    scores: IndexMap<PollutionCategory, f64>,
}

impl ScoreBoard {
    fn record(&mut self, category: PollutionCategory, score: f64) {
        let best = self.scores.entry(category).or_insert(0.0);
        *best = best.max(score);
    }

    /// Priority policy: waste > 0.3, then fire > 0.4, then the highest
    /// score (ties go to the category seen first).
    fn verdict(&self) -> (PollutionCategory, f64) {
        if self.scores.is_empty() {
            return (PollutionCategory::NoPollutionDetected, 0.0);
        }

        let priority = [
            (PollutionCategory::SolidWaste, SOLID_WASTE_PRIORITY),
            (PollutionCategory::AirPollutionFire, FIRE_PRIORITY),
        ];
        for (category, threshold) in priority {
            if let Some(&score) = self.scores.get(&category) {
                if score > threshold {
                    return (category, score);
                }
            }
        }

        let mut best: Option<(PollutionCategory, f64)> = None;
        for (&category, &score) in &self.scores {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((category, score));
            }
        }
        best.unwrap_or((PollutionCategory::NoPollutionDetected, 0.0))
    }
}

fn finalize_confidence(raw: f64) -> f64 {
    let clamped = raw.min(MAX_CONFIDENCE);
    (clamped * 10_000.0).round() / 10_000.0
}

/// Merge object detections and scene classifications into a decision.
///
/// Every object record becomes evidence; scene records only when they map to
/// a category. Scene scores are boosted before merging but reported raw.
pub fn score_evidence(detections: &Value, scenes: &Value) -> PollutionDecision {
    let mut board = ScoreBoard::default();
    let mut evidence = Vec::new();

    for record in records(detections) {
        let category = map_label(record.label.as_deref());
        if category != PollutionCategory::Unknown {
            board.record(category, record.score);
        }
        evidence.push(Evidence {
            label: record.label.unwrap_or_default(),
            score: record.score,
            category: Some(category),
            bbox: record.bbox,
            source: EvidenceSource::ObjectDetector,
        });
    }

    for record in records(scenes) {
        let category = map_scene_label(record.label.as_deref());
        if category == PollutionCategory::Unknown {
            continue;
        }
        board.record(category, record.score * SCENE_BOOST);
        evidence.push(Evidence {
            label: record.label.unwrap_or_default(),
            score: record.score,
            category: Some(category),
            bbox: None,
            source: EvidenceSource::SceneClassifier,
        });
    }

    let (category, confidence) = board.verdict();
    PollutionDecision {
        category,
        confidence: finalize_confidence(confidence),
        evidence,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
