//! Ordered keyword tables mapping model labels to pollution categories.
//!
//! Matching is case-insensitive substring, first entry wins. Table order
//! decides labels that contain several keywords ("Dump Truck" hits "truck"
//! before any waste keyword) and must not be reshuffled.

use super::types::PollutionCategory::{self, *};

pub type KeywordTable = [(&'static str, PollutionCategory)];

/// Object detector (COCO) labels.
pub const OBJECT_LABELS: &KeywordTable = &[
    ("vehicle", VehicularEmission),
    ("car", VehicularEmission),
    ("truck", VehicularEmission),
    ("bus", VehicularEmission),
    ("motorcycle", VehicularEmission),
    ("train", VehicularEmission),
    ("airplane", VehicularEmission),
    ("boat", VehicularEmission),
    ("smoke", AirPollutionSmoke),
    ("fire", AirPollutionFire),
    ("factory", IndustrialEmission),
    ("chimney", IndustrialEmission),
    ("steel_mill", IndustrialEmission),
    ("paper_mill", IndustrialEmission),
    ("trash", SolidWaste),
    ("waste", SolidWaste),
    ("garbage", SolidWaste),
    ("rubbish", SolidWaste),
    ("plastic", SolidWaste),
    ("bag", SolidWaste),
    ("bottle", SolidWaste),
    ("cup", SolidWaste),
    ("fork", SolidWaste),
    ("knife", SolidWaste),
    ("spoon", SolidWaste),
    ("bowl", SolidWaste),
    ("banana", SolidWaste),
    ("apple", SolidWaste),
    ("orange", SolidWaste),
    ("sandwich", SolidWaste),
    ("pizza", SolidWaste),
    ("donut", SolidWaste),
    ("cake", SolidWaste),
    ("can", SolidWaste),
];

/// Scene classifier (ImageNet) labels. Only used for classifier output.
pub const SCENE_LABELS: &KeywordTable = &[
    ("waste_container", SolidWaste),
    ("garbage_truck", SolidWaste),
    ("ashcan", SolidWaste),
    ("trash_can", SolidWaste),
    ("dumpster", SolidWaste),
    ("landfill", SolidWaste),
    ("junkyard", SolidWaste),
    ("refuse", SolidWaste),
    ("plastic_bag", SolidWaste),
    ("carton", SolidWaste),
    ("crate", SolidWaste),
    ("litter", SolidWaste),
    ("factory", IndustrialEmission),
    ("chimney", IndustrialEmission),
    ("steel_mill", IndustrialEmission),
    ("paper_mill", IndustrialEmission),
    ("traffic_light", VehicularEmission),
    ("parking_meter", VehicularEmission),
];

/// Checked when no scene keyword matched.
pub const SCENE_FALLBACK_LABELS: &KeywordTable = &[
    ("waste", SolidWaste),
    ("trash", SolidWaste),
    ("garbage", SolidWaste),
    ("smoke", AirPollutionSmoke),
];

/// Filename keywords that trigger the offline demo response.
pub const DEMO_FILENAME_KEYWORDS: &KeywordTable = &[
    ("waste", SolidWaste),
    ("trash", SolidWaste),
    ("garbage", SolidWaste),
    ("rubbish", SolidWaste),
    ("dump", SolidWaste),
    ("plastic", SolidWaste),
    ("bottle", SolidWaste),
    ("car", VehicularEmission),
    ("vehicle", VehicularEmission),
    ("traffic", VehicularEmission),
    ("truck", VehicularEmission),
    ("bus", VehicularEmission),
    ("smoke", AirPollutionSmoke),
    ("fire", AirPollutionFire),
    ("factory", IndustrialEmission),
    ("industry", IndustrialEmission),
    ("chimney", IndustrialEmission),
];

/// First table entry whose keyword occurs in `text` (case-insensitive).
pub fn first_match(text: &str, table: &KeywordTable) -> Option<(&'static str, PollutionCategory)> {
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();
    table
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .copied()
}

/// Map an object-detector label. Empty, missing, or unmatched → `Unknown`.
pub fn map_label(label: Option<&str>) -> PollutionCategory {
    label
        .and_then(|l| first_match(l, OBJECT_LABELS))
        .map_or(Unknown, |(_, category)| category)
}

/// Map a scene-classifier label, falling back to waste/smoke keywords.
pub fn map_scene_label(label: Option<&str>) -> PollutionCategory {
    label
        .and_then(|l| first_match(l, SCENE_LABELS).or_else(|| first_match(l, SCENE_FALLBACK_LABELS)))
        .map_or(Unknown, |(_, category)| category)
}
