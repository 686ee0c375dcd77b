use egui;
use image::RgbImage;

use crate::Candidate;

fn iou(a: &Candidate, b: &Candidate) -> f32 {
    let w = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let h = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = w * h;
    let union = (a.x2 - a.x1) * (a.y2 - a.y1) + (b.x2 - b.x1) * (b.y2 - b.y1) - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

/// Greedy non-maximum suppression. Returns indices of kept candidates, best first.
pub fn perform_nms_indices(candidates: &[Candidate], iou_threshold: f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&i, &j| candidates[j].confidence.total_cmp(&candidates[i].confidence));

    let mut kept: Vec<usize> = Vec::new();
    for i in order {
        if kept
            .iter()
            .all(|&k| iou(&candidates[k], &candidates[i]) <= iou_threshold)
        {
            kept.push(i);
        }
    }
    kept
}

/// Fully saturated colour with a hue derived from the label hash.
pub fn get_color(label: &str) -> egui::Color32 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut h = DefaultHasher::new();
    label.hash(&mut h);
    let hue = (h.finish() % 360) as f32 / 360.0;
    egui::ecolor::Hsva::new(hue, 1.0, 1.0, 1.0).into()
}

pub fn load_egui_image(img: &RgbImage) -> egui::ColorImage {
    let size = [img.width() as _, img.height() as _];
    egui::ColorImage::from_rgb(size, img.as_raw())
}

/// Largest rect with the image's aspect ratio that fits in `area`, centred.
pub fn fit_rect(area: egui::Rect, img_size: egui::Vec2) -> egui::Rect {
    if img_size.x <= 0.0 || img_size.y <= 0.0 {
        return egui::Rect::from_center_size(area.center(), egui::Vec2::ZERO);
    }
    let zoom = (area.width() / img_size.x).min(area.height() / img_size.y);
    egui::Rect::from_center_size(area.center(), img_size * zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Candidate {
        Candidate {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id: 0,
        }
    }

    #[test]
    fn nms_drops_overlapping_weaker_boxes() {
        let cands = vec![
            cand(0.0, 0.0, 10.0, 10.0, 0.6),
            cand(1.0, 1.0, 11.0, 11.0, 0.9),
            cand(50.0, 50.0, 60.0, 60.0, 0.3),
        ];
        assert_eq!(perform_nms_indices(&cands, 0.45), vec![1, 2]);
    }

    #[test]
    fn nms_keeps_light_overlap() {
        let cands = vec![cand(0.0, 0.0, 10.0, 10.0, 0.6), cand(8.0, 0.0, 18.0, 10.0, 0.5)];
        assert_eq!(perform_nms_indices(&cands, 0.45), vec![0, 1]);
    }

    #[test]
    fn nms_prefers_higher_confidence_over_input_order() {
        let cands = vec![
            cand(0.0, 0.0, 10.0, 10.0, 0.2),
            cand(0.0, 0.0, 10.0, 10.0, 0.8),
            cand(0.5, 0.5, 10.5, 10.5, 0.5),
        ];
        assert_eq!(perform_nms_indices(&cands, 0.45), vec![1]);
    }

    #[test]
    fn colors_are_stable_per_label() {
        assert_eq!(get_color("fork"), get_color("fork"));
        assert_eq!(get_color("fork").a(), 255);
    }

    #[test]
    fn fit_rect_letterboxes() {
        let area = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(200.0, 100.0));
        let r = fit_rect(area, egui::vec2(400.0, 400.0));
        assert_eq!(r.size(), egui::vec2(100.0, 100.0));
        assert_eq!(r.min, egui::pos2(50.0, 0.0));
    }
}
