use egui::Key;
use log::info;

use super::AnnotationApp;

const ICON_FOLDER: &str = "\u{1F4C2}";
const ICON_PREV: &str = "\u{23F4}";
const ICON_NEXT: &str = "\u{23F5}";

impl AnnotationApp {
    pub(super) fn selector_ui(&mut self, ui: &mut egui::Ui) {
        if ui
            .button(format!("{ICON_FOLDER} Select directory"))
            .clicked()
        {
            if let Some(dir) = rfd::FileDialog::new()
                .set_title("Select a directory to annotate")
                .pick_folder()
            {
                info!("Selected {}", dir.display());
                self.select_directory(dir);
            }
        }

        let keys_free = !ui.ctx().wants_keyboard_input();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.ui_state.prev_enabled, egui::Button::new(ICON_PREV))
                .on_hover_text("Previous (ArrowLeft)")
                .clicked()
                || (keys_free
                    && self.ui_state.prev_enabled
                    && ui.input(|i| i.key_pressed(Key::ArrowLeft)))
            {
                let result = self.editor.prev();
                self.handle(result);
            }
            if ui
                .add_enabled(self.ui_state.next_enabled, egui::Button::new(ICON_NEXT))
                .on_hover_text("Next (ArrowRight)")
                .clicked()
                || (keys_free
                    && self.ui_state.next_enabled
                    && ui.input(|i| i.key_pressed(Key::ArrowRight)))
            {
                let result = self.editor.next();
                self.handle(result);
            }
        });
    }

    pub(super) fn status_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(&self.ui_state.status);
            if self.ui_state.page.is_some() {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.page_input)
                        .desired_width(40.0)
                        .char_limit(9),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                    self.jump();
                }
            }
            if let Some(error) = &self.error {
                ui.colored_label(ui.visuals().error_fg_color, error);
            }
        });
    }

    fn jump(&mut self) {
        match self.page_input.trim().parse::<i64>() {
            Ok(page) => {
                let result = self.editor.jump_to(page);
                self.handle(result);
            }
            Err(_) => {
                info!("Ignoring page {:?}", self.page_input);
                self.handle(Ok(()));
            }
        }
    }
}
