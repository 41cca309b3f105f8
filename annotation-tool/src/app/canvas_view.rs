use egui::{Color32, CursorIcon, Pos2, Rect, Sense, TextureOptions, pos2, vec2};
use mask_pixels::{Point, Size, Tool};

use super::{AnnotationApp, to_color_image, to_color32};

const UV: Rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));

impl AnnotationApp {
    pub(super) fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.editor.canvas_mut().resize(Size::new(
            rect.width().max(0.0) as u32,
            rect.height().max(0.0) as u32,
        ));
        let to_point = |pos: Pos2| {
            let local = pos - rect.min;
            Point::new(local.x.floor() as i32, local.y.floor() as i32)
        };

        let (pointer, pressed, released, alt) = ui.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.modifiers.alt,
            )
        });
        let tool = Tool::from_modifier(alt);
        let stroking = self.editor.canvas().stroke().is_some();

        if let Some(pos) = pointer {
            if pressed && response.hovered() && self.editor.canvas().mask_path().is_some() {
                self.editor.begin_stroke(to_point(pos), tool);
            } else if stroking {
                self.editor.continue_stroke(to_point(pos), tool);
            }
        }

        self.paint_canvas(ui, rect);

        if released && (self.editor.canvas().stroke().is_some() || response.hovered()) {
            let result = self.editor.end_stroke();
            self.handle(result);
            ui.ctx().request_repaint();
        }

        match pointer {
            Some(pos) if response.hovered() || self.editor.canvas().stroke().is_some() => {
                self.cursor_system.show(self.editor.canvas().cursor());
                ui.ctx().set_cursor_icon(CursorIcon::None);
                if let Some((texture, hotspot)) = &*self.cursor.borrow() {
                    let size = texture.size_vec2();
                    ui.painter_at(rect).image(
                        texture.id(),
                        Rect::from_min_size(pos - *hotspot, size),
                        UV,
                        Color32::WHITE,
                    );
                }
            }
            _ => {}
        }
    }

    fn paint_canvas(&mut self, ui: &egui::Ui, rect: Rect) {
        let frame = self.editor.redraw();
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, to_color32(frame.backdrop));

        let Some(composite) = frame.composite else {
            self.canvas_texture = None;
            return;
        };
        let stale = self
            .canvas_texture
            .as_ref()
            .is_none_or(|(revision, _)| *revision != frame.revision);
        if stale {
            let texture =
                ui.ctx()
                    .load_texture("canvas", to_color_image(composite), TextureOptions::NEAREST);
            self.canvas_texture = Some((frame.revision, texture));
        }

        if let Some((_, texture)) = &self.canvas_texture {
            let image_rect = frame.image_rect;
            let min = rect.min + vec2(image_rect.min.x as f32, image_rect.min.y as f32);
            let size = vec2(image_rect.size.width as f32, image_rect.size.height as f32);
            painter.image(
                texture.id(),
                Rect::from_min_size(min, size),
                UV,
                Color32::WHITE,
            );
        }
    }
}
