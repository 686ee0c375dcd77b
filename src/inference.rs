use image::{imageops::FilterType, RgbImage};
use ort::session::Session;
use ort::value::{Tensor, ValueType};

use crate::error::{InspectorError, Result};
use crate::mapping::PixelRect;
use crate::utils;
use crate::{Candidate, Detection};

pub const MIN_CANDIDATE_CONFIDENCE: f32 = 0.25;
pub const NMS_IOU_THRESHOLD: f32 = 0.45;
const MASK_COEFFS_NUM: usize = 32;
const DEFAULT_INPUT_SIZE: (u32, u32) = (640, 640);

/// The model boundary: an RGB buffer in, labelled boxes in that buffer's pixel space out.
pub trait Detector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>>;
}

pub struct YoloDetector {
    session: Session,
    input_size: (u32, u32),
    class_names: Vec<String>,
}

impl YoloDetector {
    pub fn new(session: Session, class_names: Vec<String>) -> Self {
        let input_size = input_size_of(&session);
        Self {
            session,
            input_size,
            class_names,
        }
    }

    pub fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }
}

impl Detector for YoloDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>> {
        let (tw, th) = self.input_size;
        let flat_data = to_planar_input(image, self.input_size);
        let input_tensor = Tensor::from_array((vec![1usize, 3, th as usize, tw as usize], flat_data))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let has_masks = outputs.len() > 1;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let candidates = decode_candidates(shape, data, has_masks)?;

        let kept = utils::perform_nms_indices(&candidates, NMS_IOU_THRESHOLD);
        let detections: Vec<Detection> = kept
            .iter()
            .map(|&i| {
                let c = &candidates[i];
                Detection {
                    class_label: class_label(&self.class_names, c.class_id),
                    confidence: c.confidence,
                    bounding_box: scale_to_source(c, self.input_size, image.dimensions()),
                }
            })
            .collect();

        log::debug!(
            "{} candidates, {} after suppression",
            candidates.len(),
            detections.len()
        );
        Ok(detections)
    }
}

fn input_size_of(session: &Session) -> (u32, u32) {
    session
        .inputs
        .first()
        .and_then(|input| match &input.input_type {
            ValueType::Tensor { shape, .. } if shape.len() == 4 && shape[2] > 0 && shape[3] > 0 => {
                Some((shape[3] as u32, shape[2] as u32))
            }
            _ => None,
        })
        .unwrap_or(DEFAULT_INPUT_SIZE)
}

fn class_label(names: &[String], class_id: usize) -> String {
    names
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("Class {}", class_id))
}

pub fn to_planar_input(image: &RgbImage, (tw, th): (u32, u32)) -> Vec<f32> {
    let resized = image::imageops::resize(image, tw, th, FilterType::Triangle);
    let area = (tw * th) as usize;
    let mut flat_data = vec![0.0f32; 3 * area];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let idx = y as usize * tw as usize + x as usize;
        flat_data[idx] = pixel[0] as f32 / 255.0;
        flat_data[area + idx] = pixel[1] as f32 / 255.0;
        flat_data[2 * area + idx] = pixel[2] as f32 / 255.0;
    }
    flat_data
}

/// Parses a `[1, 4 + classes (+ mask coeffs), anchors]` head into centre-to-corner candidates.
pub fn decode_candidates(shape: &[i64], data: &[f32], has_masks: bool) -> Result<Vec<Candidate>> {
    if shape.len() != 3 {
        return Err(InspectorError::UnexpectedOutput(format!(
            "expected a rank-3 output, got {:?}",
            shape
        )));
    }
    let num_rows = shape[1].max(0) as usize;
    let num_anchors = shape[2].max(0) as usize;
    if data.len() < num_rows * num_anchors {
        return Err(InspectorError::UnexpectedOutput(format!(
            "shape {:?} needs {} values, got {}",
            shape,
            num_rows * num_anchors,
            data.len()
        )));
    }

    let reserved = if has_masks { 4 + MASK_COEFFS_NUM } else { 4 };
    let num_classes = num_rows.saturating_sub(reserved);

    let mut candidates = Vec::new();
    for i in 0..num_anchors {
        let mut max_conf = 0.0f32;
        let mut class_id = 0;
        for c in 0..num_classes {
            let conf = data[(4 + c) * num_anchors + i];
            if conf > max_conf {
                max_conf = conf;
                class_id = c;
            }
        }
        if max_conf > MIN_CANDIDATE_CONFIDENCE {
            let cx = data[i];
            let cy = data[num_anchors + i];
            let w = data[2 * num_anchors + i];
            let h = data[3 * num_anchors + i];
            candidates.push(Candidate {
                x1: cx - w / 2.0,
                y1: cy - h / 2.0,
                x2: cx + w / 2.0,
                y2: cy + h / 2.0,
                confidence: max_conf,
                class_id,
            });
        }
    }
    Ok(candidates)
}

pub fn scale_to_source(c: &Candidate, (tw, th): (u32, u32), (img_w, img_h): (u32, u32)) -> PixelRect {
    let sx = img_w as f32 / tw as f32;
    let sy = img_h as f32 / th as f32;
    PixelRect::from_corners_clamped(
        (c.x1 * sx) as i64,
        (c.y1 * sy) as i64,
        (c.x2 * sx) as i64,
        (c.y2 * sy) as i64,
        img_w,
        img_h,
    )
}
