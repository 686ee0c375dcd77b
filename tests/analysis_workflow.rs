use egui::{pos2, vec2};
use image::{Rgb, RgbImage};

use utensil_inspector::analysis::{analyze_region, analyze_whole_image, AnalysisMode, AnalysisOutcome};
use utensil_inspector::inference::Detector;
use utensil_inspector::mapping::{ImageMapping, PixelRect};
use utensil_inspector::settings::FilterSettings;
use utensil_inspector::{Detection, Result};

/// Replays canned detections and records the size of every image it was shown.
struct ScriptedDetector {
    detections: Vec<Detection>,
    seen: Vec<(u32, u32)>,
}

impl ScriptedDetector {
    fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            seen: Vec::new(),
        }
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>> {
        self.seen.push(image.dimensions());
        Ok(self.detections.clone())
    }
}

fn det(label: &str, confidence: f32, rect: PixelRect) -> Detection {
    Detection {
        class_label: label.to_string(),
        confidence,
        bounding_box: rect,
    }
}

/// 100×100 black image whose top-left 10×10 block is white.
fn photo() -> RgbImage {
    let mut img = RgbImage::new(100, 100);
    for y in 0..10 {
        for x in 0..10 {
            img.put_pixel(x, y, Rgb([230, 230, 230]));
        }
    }
    img
}

#[test]
fn whole_image_picks_the_most_confident() {
    let img = photo();
    let block = PixelRect::new(0, 0, 10, 10);
    let mut detector = ScriptedDetector::new(vec![det("fork", 0.9, block), det("spoon", 0.6, block)]);
    let outcome = analyze_whole_image(&mut detector, &img, &FilterSettings::default()).unwrap();
    assert_eq!(outcome.detection().unwrap().class_label, "fork");
    assert_eq!(detector.seen, vec![(100, 100)]);
}

#[test]
fn whole_image_reports_nothing_below_threshold() {
    let img = photo();
    let block = PixelRect::new(0, 0, 10, 10);
    let mut detector = ScriptedDetector::new(vec![det("fork", 0.3, block), det("knife", 0.35, block)]);
    let outcome = analyze_whole_image(&mut detector, &img, &FilterSettings::default()).unwrap();
    assert_eq!(outcome, AnalysisOutcome::NothingFound(AnalysisMode::WholeImage));
    assert_eq!(outcome.to_string(), "No object found.");
}

#[test]
fn sparse_box_is_kept_only_in_region_mode() {
    let img = photo();
    // 100×10 strip overlapping three rows of the white block: 30 of 1000 pixels lit.
    let detections = vec![det("spoon", 0.8, PixelRect::new(0, 7, 100, 17))];
    let settings = FilterSettings::default();

    let mut detector = ScriptedDetector::new(detections.clone());
    let whole = analyze_whole_image(&mut detector, &img, &settings).unwrap();
    assert_eq!(whole, AnalysisOutcome::NothingFound(AnalysisMode::WholeImage));

    let mapping = ImageMapping::new(vec2(100.0, 100.0), 100, 100).unwrap();
    let mut detector = ScriptedDetector::new(detections);
    let region = analyze_region(&mut detector, &img, &mapping, pos2(0.0, 0.0), pos2(100.0, 100.0), &settings)
        .unwrap();
    assert_eq!(region.detection().unwrap().class_label, "spoon");
    assert_eq!(region.to_string(), "Selected region: spoon (80%)");
}

#[test]
fn empty_selection_never_reaches_the_detector() {
    let img = photo();
    let mapping = ImageMapping::new(vec2(50.0, 50.0), 100, 100).unwrap();
    let mut detector = ScriptedDetector::new(vec![det("fork", 0.99, PixelRect::new(0, 0, 5, 5))]);
    let settings = FilterSettings::default();

    let flat = analyze_region(&mut detector, &img, &mapping, pos2(10.0, 10.0), pos2(30.0, 10.0), &settings)
        .unwrap();
    let outside = analyze_region(&mut detector, &img, &mapping, pos2(60.0, 5.0), pos2(80.0, 40.0), &settings)
        .unwrap();

    assert_eq!(flat, AnalysisOutcome::EmptySelection);
    assert_eq!(outside, AnalysisOutcome::EmptySelection);
    assert_eq!(flat.to_string(), "Selection is empty!");
    assert!(detector.seen.is_empty());
}

#[test]
fn region_runs_on_the_scaled_crop_and_reports_source_coordinates() {
    let img = photo();
    // Displayed at half size; the drag is given bottom-right to top-left.
    let mapping = ImageMapping::new(vec2(50.0, 50.0), 100, 100).unwrap();
    let mut detector = ScriptedDetector::new(vec![
        det("knife", 0.45, PixelRect::new(0, 0, 4, 4)),
        det("fork", 0.7, PixelRect::new(2, 3, 8, 9)),
    ]);
    let outcome = analyze_region(
        &mut detector,
        &img,
        &mapping,
        pos2(30.0, 25.0),
        pos2(10.0, 5.0),
        &FilterSettings::default(),
    )
    .unwrap();

    assert_eq!(detector.seen, vec![(40, 40)]);
    let d = outcome.detection().unwrap();
    assert_eq!(d.class_label, "fork");
    assert_eq!(d.bounding_box, PixelRect::new(22, 13, 28, 19));
}

#[test]
fn region_below_its_threshold_reports_no_object() {
    let img = photo();
    let mapping = ImageMapping::new(vec2(100.0, 100.0), 100, 100).unwrap();
    let mut detector = ScriptedDetector::new(vec![det("fork", 0.49, PixelRect::new(0, 0, 5, 5))]);
    let outcome = analyze_region(
        &mut detector,
        &img,
        &mapping,
        pos2(0.0, 0.0),
        pos2(20.0, 20.0),
        &FilterSettings::default(),
    )
    .unwrap();
    assert_eq!(outcome.to_string(), "Selected region: no object");
    assert_eq!(detector.seen.len(), 1);
}
