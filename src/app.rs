use egui::{Color32, Pos2, Stroke};
use std::path::PathBuf;

use crate::analysis::{self, AnalysisOutcome};
use crate::mapping::ImageMapping;
use crate::selection::{PointerFrame, SelectionState};
use crate::settings::FilterSettings;
use crate::{loading, utils, ImageInput, InspectorApp};

fn full_uv() -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
}

impl InspectorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (detector, status) = match loading::autoload_detector() {
            Some((name, d)) => (Some(d), format!("Model: {}", name)),
            None => (None, "Load a model (.onnx) to start".to_string()),
        };

        Self {
            detector,
            image: None,
            texture: None,
            img_size: egui::Vec2::ZERO,
            selection: SelectionState::default(),
            results: Vec::new(),
            highlight: None,
            status,
            settings: FilterSettings::default(),
            show_settings_window: false,
        }
    }

    pub fn load_model(&mut self, path: PathBuf) {
        match loading::load_detector(&path) {
            Ok(d) => {
                self.detector = Some(d);
                self.status = format!(
                    "Model: {}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                );
            }
            Err(e) => {
                log::error!("failed to load model {:?}: {}", path, e);
                self.status = format!("Error: {}", e);
            }
        }
    }

    /// Replaces the current image wholesale and resets everything derived from it.
    pub fn open_image(&mut self, input: ImageInput, ctx: &egui::Context) {
        let img = match input {
            ImageInput::File(path) => match loading::load_image(&path) {
                Ok(img) => img,
                Err(e) => {
                    log::error!("failed to open {:?}: {}", path, e);
                    self.status = format!("Error: {}", e);
                    return;
                }
            },
            ImageInput::Pixels(img) => img,
        };

        self.texture = Some(ctx.load_texture(
            "img",
            utils::load_egui_image(&img),
            egui::TextureOptions::LINEAR,
        ));
        self.img_size = egui::vec2(img.width() as f32, img.height() as f32);
        self.status = format!("Image: {}x{}", img.width(), img.height());
        self.image = Some(img);
        self.selection.clear();
        self.highlight = None;
        self.results.clear();
    }

    pub fn analyze(&mut self) {
        let Some(image) = self.image.as_ref() else {
            return;
        };
        let Some(detector) = self.detector.as_mut() else {
            self.status = "Load a model first".to_string();
            return;
        };

        match analysis::analyze_whole_image(detector, image, &self.settings) {
            Ok(outcome) => {
                self.highlight = outcome.detection().cloned();
                self.results.clear();
                self.results.push(outcome);
            }
            Err(e) => {
                log::error!("analysis failed: {}", e);
                self.status = format!("Error: {}", e);
            }
        }
    }

    fn on_region_selected(&mut self, a: Pos2, b: Pos2, displayed: egui::Vec2) {
        let Some(image) = self.image.as_ref() else {
            return;
        };
        let Some(detector) = self.detector.as_mut() else {
            self.status = "Load a model first".to_string();
            return;
        };
        let Some(mapping) = ImageMapping::new(displayed, image.width(), image.height()) else {
            self.results.push(AnalysisOutcome::EmptySelection);
            return;
        };

        match analysis::analyze_region(detector, image, &mapping, a, b, &self.settings) {
            Ok(outcome) => {
                if let Some(d) = outcome.detection() {
                    self.highlight = Some(d.clone());
                }
                self.results.push(outcome);
            }
            Err(e) => {
                log::error!("region analysis failed: {}", e);
                self.status = format!("Error: {}", e);
            }
        }
    }

    pub fn save_image(&mut self) {
        let Some(image) = self.image.as_ref() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .add_filter("JPEG Image", &["jpg", "jpeg"])
            .save_file()
        else {
            return;
        };
        match loading::save_image(&path, image) {
            Ok(written) => self.status = format!("Saved: {}", written.display()),
            Err(e) => {
                log::error!("failed to save {:?}: {}", path, e);
                self.status = format!("Error: {}", e);
            }
        }
    }

    fn pick_image(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .pick_file()
        {
            self.open_image(ImageInput::File(path), ctx);
        }
    }

    fn pick_model(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("ONNX model", &["onnx"])
            .pick_file()
        {
            self.load_model(path);
        }
    }

    pub fn handle_clipboard(&mut self, ctx: &egui::Context) {
        let Ok(mut cb) = arboard::Clipboard::new() else {
            return;
        };
        if let Ok(img_data) = cb.get_image() {
            let bytes = img_data.bytes.into_owned();
            if let Some(rgba) =
                image::RgbaImage::from_raw(img_data.width as u32, img_data.height as u32, bytes)
            {
                let rgb = image::DynamicImage::ImageRgba8(rgba).into_rgb8();
                self.open_image(ImageInput::Pixels(rgb), ctx);
            }
        } else if let Ok(text) = cb.get_text() {
            let path = PathBuf::from(text.trim_matches('"').trim());
            if path.exists() {
                self.open_image(ImageInput::File(path), ctx);
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let Some(path) = ctx.input(|i| i.raw.dropped_files.first().and_then(|d| d.path.clone()))
        else {
            return;
        };
        let is_model = path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case("onnx"));
        if is_model {
            self.load_model(path);
        } else {
            self.open_image(ImageInput::File(path), ctx);
        }
    }

    fn show_input_image(&self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        painter.rect_filled(response.rect, 0.0, Color32::BLACK);
        match &self.texture {
            Some(tex) => {
                let image_rect = utils::fit_rect(response.rect, self.img_size);
                painter.image(tex.id(), image_rect, full_uv(), Color32::WHITE);
            }
            None => {
                painter.text(
                    response.rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Load or drop an image",
                    egui::FontId::proportional(16.0),
                    Color32::GRAY,
                );
            }
        }
    }

    /// Right-hand view: same image, plus drag-to-select and the winning box.
    fn show_result_image(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        painter.rect_filled(response.rect, 0.0, Color32::BLACK);
        let Some(tex_id) = self.texture.as_ref().map(|t| t.id()) else {
            return;
        };
        let image_rect = utils::fit_rect(response.rect, self.img_size);
        painter.image(tex_id, image_rect, full_uv(), Color32::WHITE);

        let hovered = response.hovered();
        let frame = ui.input(|i| PointerFrame {
            pressed: i.pointer.primary_pressed() && hovered,
            released: i.pointer.primary_released(),
            down: i.pointer.primary_down(),
            pos: i.pointer.interact_pos().map(|p| (p - image_rect.min).to_pos2()),
        });
        if let Some((a, b)) = self.selection.on_pointer(frame) {
            self.on_region_selected(a, b, image_rect.size());
        }

        let painter = painter.with_clip_rect(response.rect);
        if let Some(d) = &self.highlight {
            let zoom = image_rect.width() / self.img_size.x;
            let b = &d.bounding_box;
            let r = egui::Rect::from_min_max(
                image_rect.min + egui::vec2(b.x1 as f32, b.y1 as f32) * zoom,
                image_rect.min + egui::vec2(b.x2 as f32, b.y2 as f32) * zoom,
            );
            let col = utils::get_color(&d.class_label);
            painter.rect_stroke(r, 0.0, Stroke::new(2.0, col));

            let t = format!("{} {:.0}%", d.class_label, d.confidence * 100.0);
            let g = painter.layout_no_wrap(t, egui::FontId::proportional(13.0), Color32::WHITE);
            let mut lp = r.min;
            if lp.y - g.size().y - 6.0 < image_rect.min.y {
                lp.y += 2.0;
            } else {
                lp.y -= g.size().y + 4.0;
            }
            let lr = egui::Rect::from_min_size(lp, g.size() + egui::vec2(8.0, 4.0));
            painter.rect_filled(lr, egui::Rounding::same(4.0), col);
            painter.galley(lr.min + egui::vec2(4.0, 2.0), g, Color32::WHITE);
        }

        if let Some(sel) = self.selection.visible_rect() {
            painter.rect_stroke(
                sel.translate(image_rect.min.to_vec2()),
                0.0,
                Stroke::new(2.0, Color32::RED),
            );
        }
    }
}

impl eframe::App for InspectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !ctx.input(|i| i.raw.dropped_files.is_empty()) {
            self.handle_dropped_files(ctx);
        }

        if ctx.input_mut(|i| {
            i.consume_shortcut(&egui::KeyboardShortcut::new(
                egui::Modifiers::COMMAND,
                egui::Key::V,
            ))
        }) {
            self.handle_clipboard(ctx);
        }

        egui::SidePanel::right("side")
            .width_range(160.0..=350.0)
            .show(ctx, |ui| {
                ui.heading("Results");
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for outcome in &self.results {
                        ui.horizontal(|ui| {
                            if let Some(d) = outcome.detection() {
                                let (r, _) = ui.allocate_exact_size(
                                    egui::vec2(10.0, 10.0),
                                    egui::Sense::hover(),
                                );
                                ui.painter()
                                    .circle_filled(r.center(), 4.0, utils::get_color(&d.class_label));
                            }
                            ui.label(outcome.to_string());
                        });
                    }
                });
            });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("⚙").clicked() {
                    self.show_settings_window = !self.show_settings_window;
                }
                if ui.button("Load Model").clicked() {
                    self.pick_model();
                }
                if ui.button("Load Image").clicked() {
                    self.pick_image(ctx);
                }
                if ui.button("Analyze").clicked() {
                    self.analyze();
                }
                if ui.button("Save").clicked() {
                    self.save_image();
                }
                ui.label(" ".to_owned() + &self.status);
            });
        });

        if self.show_settings_window {
            egui::Window::new("Filter Settings")
                .open(&mut self.show_settings_window)
                .show(ctx, |ui| {
                    ui.label("Whole image:");
                    ui.horizontal(|ui| {
                        ui.label("Confidence:");
                        ui.add(egui::Slider::new(
                            &mut self.settings.whole_image.confidence_threshold,
                            0.0..=1.0,
                        ));
                    });
                    ui.horizontal(|ui| {
                        let mut enabled = self.settings.whole_image.area_ratio_threshold.is_some();
                        let mut ratio = self.settings.whole_image.area_ratio_threshold.unwrap_or(5.0);
                        ui.checkbox(&mut enabled, "Min foreground %:");
                        ui.add_enabled(enabled, egui::Slider::new(&mut ratio, 0.0..=100.0));
                        self.settings.whole_image.area_ratio_threshold = enabled.then_some(ratio);
                    });

                    ui.separator();
                    ui.label("Selected region:");
                    ui.horizontal(|ui| {
                        ui.label("Confidence:");
                        ui.add(egui::Slider::new(
                            &mut self.settings.selected_region.confidence_threshold,
                            0.0..=1.0,
                        ));
                    });

                    if ui.button("Reset to Defaults").clicked() {
                        self.settings = FilterSettings::default();
                    }
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                self.show_input_image(&mut cols[0]);
                self.show_result_image(&mut cols[1]);
            });
        });
    }
}
