use image::RgbImage;
use ort::session::Session;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::inference::YoloDetector;

/// Looked up in the working directory at startup, first hit wins.
pub const DEFAULT_MODELS: [&str; 4] = [
    "best.onnx",
    "best_utensil.onnx",
    "yolo11n.onnx",
    "yolov8n.onnx",
];

pub fn load_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)?.into_rgb8();
    log::info!("loaded {:?} ({}x{})", path, img.width(), img.height());
    Ok(img)
}

/// Writes `image` unchanged. The format follows the extension; paths without a
/// supported one get `.png`. Returns the path actually written.
pub fn save_image(path: &Path, image: &RgbImage) -> Result<PathBuf> {
    let path = with_image_extension(path);
    image.save(&path)?;
    log::info!("saved {:?}", path);
    Ok(path)
}

fn with_image_extension(path: &Path) -> PathBuf {
    let known = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg"));
    if known {
        path.to_path_buf()
    } else {
        let mut os = path.as_os_str().to_owned();
        os.push(".png");
        PathBuf::from(os)
    }
}

/// Parses the `names` metadata entry Ultralytics writes into exported models,
/// a Python dict literal such as `{0: 'fork', 1: 'knife'}`.
pub fn parse_class_names(raw: &str) -> Vec<String> {
    let fixed = raw
        .replace('\'', "\"")
        .replace('{', "{\"")
        .replace(": ", "\": ")
        .replace(", ", ", \"");
    let Ok(map) = serde_json::from_str::<HashMap<String, String>>(&fixed) else {
        log::warn!("unreadable class names metadata: {}", raw);
        return Vec::new();
    };
    let mut keys: Vec<u32> = map.keys().filter_map(|k| k.parse().ok()).collect();
    keys.sort();
    keys.iter()
        .filter_map(|k| map.get(&k.to_string()).cloned())
        .collect()
}

pub fn load_detector(path: &Path) -> Result<YoloDetector> {
    let session = Session::builder()?.commit_from_file(path)?;
    let names = match session.metadata()?.custom("names")? {
        Some(raw) => parse_class_names(&raw),
        None => Vec::new(),
    };
    let detector = YoloDetector::new(session, names);
    log::info!(
        "model {:?}: input {:?}, {} classes",
        path,
        detector.input_size(),
        detector.class_names().len()
    );
    Ok(detector)
}

/// Tries [`DEFAULT_MODELS`] in order and returns the first that loads.
pub fn autoload_detector() -> Option<(String, YoloDetector)> {
    for name in DEFAULT_MODELS {
        let path = PathBuf::from(name);
        if !path.exists() {
            continue;
        }
        match load_detector(&path) {
            Ok(d) => return Some((name.to_string(), d)),
            Err(e) => log::warn!("could not load {}: {}", name, e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("utensil_inspector_{}_{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_ultralytics_names() {
        let names = parse_class_names("{0: 'fork', 2: 'spoon', 1: 'knife'}");
        assert_eq!(names, vec!["fork", "knife", "spoon"]);
    }

    #[test]
    fn bad_names_metadata_is_empty() {
        assert!(parse_class_names("not a dict").is_empty());
    }

    #[test]
    fn adds_png_extension_when_missing() {
        assert_eq!(with_image_extension(Path::new("out")), PathBuf::from("out.png"));
        assert_eq!(with_image_extension(Path::new("out.JPG")), PathBuf::from("out.JPG"));
        assert_eq!(with_image_extension(Path::new("a.b")), PathBuf::from("a.b.png"));
    }

    #[test]
    fn png_save_is_lossless() {
        let dir = scratch_dir("png");
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(1, 1, Rgb([10, 200, 30]));
        let written = save_image(&dir.join("copy"), &img).unwrap();
        assert_eq!(written.extension().unwrap(), "png");
        assert_eq!(load_image(&written).unwrap(), img);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn jpeg_save_keeps_dimensions() {
        let dir = scratch_dir("jpg");
        let img = RgbImage::from_pixel(16, 8, Rgb([120, 120, 120]));
        let written = save_image(&dir.join("copy.jpg"), &img).unwrap();
        assert_eq!(load_image(&written).unwrap().dimensions(), (16, 8));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_image(Path::new("/definitely/not/here.png")).is_err());
    }
}
