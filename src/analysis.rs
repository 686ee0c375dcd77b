use egui::Pos2;
use image::{imageops, RgbImage};
use std::fmt;

use crate::error::Result;
use crate::filter::select_dominant;
use crate::inference::Detector;
use crate::mapping::ImageMapping;
use crate::settings::FilterSettings;
use crate::Detection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    WholeImage,
    SelectedRegion,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Dominant {
        mode: AnalysisMode,
        /// Box in source-image pixels, also for region runs.
        detection: Detection,
    },
    NothingFound(AnalysisMode),
    EmptySelection,
}

impl AnalysisOutcome {
    pub fn detection(&self) -> Option<&Detection> {
        match self {
            AnalysisOutcome::Dominant { detection, .. } => Some(detection),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisOutcome::Dominant {
                mode: AnalysisMode::WholeImage,
                detection,
            } => write!(
                f,
                "Prediction: {} (confidence: {:.2})",
                detection.class_label, detection.confidence
            ),
            AnalysisOutcome::Dominant {
                mode: AnalysisMode::SelectedRegion,
                detection,
            } => write!(
                f,
                "Selected region: {} ({:.0}%)",
                detection.class_label,
                detection.confidence * 100.0
            ),
            AnalysisOutcome::NothingFound(AnalysisMode::WholeImage) => write!(f, "No object found."),
            AnalysisOutcome::NothingFound(AnalysisMode::SelectedRegion) => {
                write!(f, "Selected region: no object")
            }
            AnalysisOutcome::EmptySelection => write!(f, "Selection is empty!"),
        }
    }
}

pub fn analyze_whole_image(
    detector: &mut dyn Detector,
    image: &RgbImage,
    settings: &FilterSettings,
) -> Result<AnalysisOutcome> {
    let detections = detector.detect(image)?;
    let outcome = match select_dominant(image, &detections, &settings.whole_image) {
        Some(d) => AnalysisOutcome::Dominant {
            mode: AnalysisMode::WholeImage,
            detection: d.clone(),
        },
        None => AnalysisOutcome::NothingFound(AnalysisMode::WholeImage),
    };
    log::info!("whole image: {} raw detections -> {}", detections.len(), outcome);
    Ok(outcome)
}

/// Runs the detector on the crop under the drag rectangle `a`-`b` (display space).
///
/// A rectangle that maps to zero source pixels never reaches the detector.
pub fn analyze_region(
    detector: &mut dyn Detector,
    image: &RgbImage,
    mapping: &ImageMapping,
    a: Pos2,
    b: Pos2,
    settings: &FilterSettings,
) -> Result<AnalysisOutcome> {
    let Some(rect) = mapping.map_rect(a, b) else {
        log::debug!("selection collapsed to zero area");
        return Ok(AnalysisOutcome::EmptySelection);
    };
    let rect = rect.clamped_to(image.width(), image.height());
    if rect.is_empty() {
        return Ok(AnalysisOutcome::EmptySelection);
    }

    let crop = imageops::crop_imm(image, rect.x1, rect.y1, rect.width(), rect.height()).to_image();
    let detections = detector.detect(&crop)?;
    let outcome = match select_dominant(&crop, &detections, &settings.selected_region) {
        Some(d) => AnalysisOutcome::Dominant {
            mode: AnalysisMode::SelectedRegion,
            detection: Detection {
                bounding_box: d.bounding_box.offset(rect.x1, rect.y1),
                ..d.clone()
            },
        },
        None => AnalysisOutcome::NothingFound(AnalysisMode::SelectedRegion),
    };
    log::info!(
        "region {:?}: {} raw detections -> {}",
        rect,
        detections.len(),
        outcome
    );
    Ok(outcome)
}
