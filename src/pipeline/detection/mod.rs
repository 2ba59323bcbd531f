//! Pollution detection from a single citizen photo.
//!
//! ```text
//! filename hint ──► offline shortcut ──────────────────────────┐
//! image bytes ──► normalize (RGB JPEG) ──► object detection ──┤
//!                                      └─► scene classifier ──┴─► score board ──► PollutionDecision
//! ```

pub mod types;
pub mod keywords;
pub mod normalize;
pub mod engine;
pub mod drafter;

pub use types::*;
pub use keywords::{map_label, map_scene_label};
pub use engine::PollutionDetector;
pub use drafter::{draft_for_decision, generate_legal_draft};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    #[error("Image too large: {width}x{height} pixels")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("Image encode failed: {0}")]
    ImageEncode(String),
}
