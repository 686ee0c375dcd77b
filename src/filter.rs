use image::{imageops, GenericImageView, Rgb, RgbImage};

use crate::mapping::PixelRect;
use crate::settings::FilterPolicy;
use crate::Detection;

/// 8-bit luma above which a pixel counts as foreground.
pub const FOREGROUND_INTENSITY: u8 = 20;

/// BT.601 luma, rounded to nearest.
pub fn luma(p: &Rgb<u8>) -> u8 {
    let [r, g, b] = p.0.map(u32::from);
    ((299 * r + 587 * g + 114 * b + 500) / 1000) as u8
}

/// Percentage of pixels inside `rect` brighter than [`FOREGROUND_INTENSITY`].
/// Returns `None` when the clamped crop has no pixels.
pub fn foreground_ratio(image: &RgbImage, rect: PixelRect) -> Option<f32> {
    let rect = rect.clamped_to(image.width(), image.height());
    if rect.is_empty() {
        return None;
    }
    let crop = imageops::crop_imm(image, rect.x1, rect.y1, rect.width(), rect.height());
    let lit = crop
        .pixels()
        .filter(|(_, _, p)| luma(p) > FOREGROUND_INTENSITY)
        .count();
    Some(lit as f32 * 100.0 / rect.area() as f32)
}

fn passes(image: &RgbImage, det: &Detection, policy: &FilterPolicy) -> bool {
    if det.confidence < policy.confidence_threshold {
        return false;
    }
    let Some(min_ratio) = policy.area_ratio_threshold else {
        return true;
    };
    match foreground_ratio(image, det.bounding_box) {
        Some(ratio) if ratio >= min_ratio => true,
        Some(ratio) => {
            log::debug!(
                "dropping {} ({:.2}): foreground {:.1}% < {:.1}%",
                det.class_label,
                det.confidence,
                ratio,
                min_ratio
            );
            false
        }
        None => false,
    }
}

/// Picks the most confident detection that survives `policy`.
///
/// `image` is the buffer the detections' boxes refer to; it is only read when the
/// policy carries an area check. Ties go to the earliest detection.
pub fn select_dominant<'a>(
    image: &RgbImage,
    detections: &'a [Detection],
    policy: &FilterPolicy,
) -> Option<&'a Detection> {
    detections
        .iter()
        .filter(|d| passes(image, d, policy))
        .fold(None, |best: Option<&Detection>, d| match best {
            Some(b) if b.confidence >= d.confidence => Some(b),
            _ => Some(d),
        })
}
