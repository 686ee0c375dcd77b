pub mod analysis;
pub mod app;
pub mod error;
pub mod filter;
pub mod inference;
pub mod loading;
pub mod mapping;
pub mod selection;
pub mod settings;
pub mod utils;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analysis::AnalysisOutcome;
use crate::inference::YoloDetector;
use crate::mapping::PixelRect;
use crate::selection::SelectionState;
use crate::settings::FilterSettings;

pub use crate::error::{InspectorError, Result};

/// One labelled box reported by the detector, in the pixel space of the image it ran on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_label: String,
    pub confidence: f32,
    pub bounding_box: PixelRect,
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

pub enum ImageInput {
    File(PathBuf),
    Pixels(RgbImage),
}

pub struct InspectorApp {
    pub detector: Option<YoloDetector>,
    pub image: Option<RgbImage>,
    pub texture: Option<egui::TextureHandle>,
    pub img_size: egui::Vec2,
    pub selection: SelectionState,
    pub results: Vec<AnalysisOutcome>,
    /// Winning box of the last run, in source-image pixels.
    pub highlight: Option<Detection>,
    pub status: String,
    pub settings: FilterSettings,
    pub show_settings_window: bool,
}
