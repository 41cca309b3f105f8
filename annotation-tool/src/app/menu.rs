use egui::{Event, Key};
use log::debug;
use mask_pixels::Tool;

use super::AnnotationApp;

const ICON_CLEAR: &str = "\u{1F5D1}";
const ICON_ROTATE: &str = "\u{21BB}";

impl AnnotationApp {
    pub(super) fn menu_ui(&mut self, ui: &mut egui::Ui) {
        self.wheel_input(ui);

        let config = self.editor.canvas().config().clone();
        let tools = self.editor.canvas().tools();
        let mut brush_color = tools.color(Tool::Brush).0;
        let mut brush_diameter = tools.diameter(Tool::Brush);
        let mut eraser_diameter = tools.diameter(Tool::Eraser);

        egui::Grid::new("tool_settings")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("Brush color");
                if ui.color_edit_button_srgb(&mut brush_color).changed() {
                    self.editor
                        .canvas_mut()
                        .set_brush_color(image::Rgb(brush_color));
                }
                ui.end_row();

                ui.label("Brush diameter");
                let range = config.brush_diameter.min..=config.brush_diameter.max;
                if ui
                    .add(egui::DragValue::new(&mut brush_diameter).range(range))
                    .on_hover_text("Ctrl + mouse wheel")
                    .changed()
                {
                    self.editor.canvas_mut().set_brush_diameter(brush_diameter);
                }
                ui.end_row();

                ui.label("Eraser diameter");
                let range = config.eraser_diameter.min..=config.eraser_diameter.max;
                if ui
                    .add(egui::DragValue::new(&mut eraser_diameter).range(range))
                    .on_hover_text("Alt + mouse wheel")
                    .changed()
                {
                    self.editor
                        .canvas_mut()
                        .set_eraser_diameter(eraser_diameter);
                }
                ui.end_row();
            });
        ui.label("Hold Alt while painting to erase");
        ui.separator();

        let rotate_enabled = self.ui_state.rotate_enabled;
        if ui
            .add_enabled(
                self.ui_state.clear_enabled,
                egui::Button::new(format!("{ICON_CLEAR} Clear mask")),
            )
            .clicked()
        {
            let result = self.editor.clear_mask();
            self.handle(result);
        }
        if ui
            .add_enabled(
                rotate_enabled,
                egui::Button::new(format!("{ICON_ROTATE} Rotate image and mask")),
            )
            .clicked()
        {
            let result = self.editor.rotate_image_and_mask();
            self.handle(result);
        }
        if ui
            .add_enabled(
                rotate_enabled,
                egui::Button::new(format!("{ICON_ROTATE} Rotate image")),
            )
            .on_hover_text("ArrowUp")
            .clicked()
            || (rotate_enabled
                && !ui.ctx().wants_keyboard_input()
                && ui.input(|i| i.key_pressed(Key::ArrowUp)))
        {
            let result = self.editor.rotate_image_only();
            self.handle(result);
        }
        if ui
            .add_enabled(
                rotate_enabled,
                egui::Button::new(format!("{ICON_ROTATE} Rotate mask")),
            )
            .clicked()
        {
            let result = self.editor.rotate_mask_only();
            self.handle(result);
        }
    }

    /// Ctrl + wheel resizes the brush, Alt + wheel the eraser.
    fn wheel_input(&mut self, ui: &egui::Ui) {
        let steps: Vec<_> = ui.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    Event::MouseWheel {
                        delta, modifiers, ..
                    } if modifiers.ctrl || modifiers.alt => Some((modifiers.ctrl, delta.y)),
                    _ => None,
                })
                .collect()
        });

        for (brush, delta) in steps {
            let config = self.editor.canvas().config();
            let tools = self.editor.canvas().tools();
            if brush {
                let current = tools.diameter(Tool::Brush);
                if let Some(next) = config.brush_diameter.step(current, delta) {
                    debug!("Brush diameter {next}");
                    self.editor.canvas_mut().set_brush_diameter(next);
                }
            } else {
                let current = tools.diameter(Tool::Eraser);
                if let Some(next) = config.eraser_diameter.step(current, delta) {
                    debug!("Eraser diameter {next}");
                    self.editor.canvas_mut().set_eraser_diameter(next);
                }
            }
        }
    }
}
