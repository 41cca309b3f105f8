use std::{cell::RefCell, path::PathBuf, rc::Rc};

use egui::{Color32, ColorImage, TextureHandle, TextureOptions};
use log::{error, warn};
use mask_pixels::{CursorGlyph, CursorSystem, Editor, SelectOutcome, UiState};

mod canvas_view;
mod image_selector;
mod menu;
mod native;

pub use native::run_native;

const TITLE: &str = "Mask annotation tool";

type PublishedCursor = Rc<RefCell<Option<(TextureHandle, egui::Vec2)>>>;

pub(crate) struct AnnotationApp {
    editor: Editor,
    ui_state: UiState,
    /// Value of the page field, committed with Enter.
    page_input: String,
    notice: Option<String>,
    error: Option<String>,
    canvas_texture: Option<(u64, TextureHandle)>,
    cursor_system: CursorSystem,
    cursor: PublishedCursor,
    title: String,
}

impl AnnotationApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        editor: Editor,
        image_dir: Option<PathBuf>,
    ) -> Self {
        let cursor = PublishedCursor::default();
        let cursor_system = {
            let ctx = cc.egui_ctx.clone();
            let cursor = cursor.clone();
            CursorSystem::from(move |glyph: Option<&CursorGlyph>| {
                *cursor.borrow_mut() = glyph.map(|glyph| {
                    let (x, y) = glyph.hotspot;
                    let texture = ctx.load_texture(
                        "cursor",
                        to_color_image(&glyph.image),
                        TextureOptions::NEAREST,
                    );
                    (texture, egui::vec2(x as f32, y as f32))
                });
            })
        };

        let mut app = Self {
            ui_state: editor.ui_state(),
            editor,
            page_input: String::new(),
            notice: None,
            error: None,
            canvas_texture: None,
            cursor_system,
            cursor,
            title: TITLE.into(),
        };
        if let Some(dir) = image_dir {
            app.select_directory(dir);
        }
        app
    }

    pub(super) fn select_directory(&mut self, dir: PathBuf) {
        let result = self.editor.select_directory(&dir);
        if let Some(SelectOutcome::NoImages) = self.handle(result) {
            self.notice = Some(format!(
                "No images (jpg, jpeg, png, bmp) found in {}",
                dir.display()
            ));
        }
    }

    /// Records recoverable errors for the status line. Fatal errors end the process.
    pub(super) fn handle<T>(&mut self, result: mask_pixels::Result<T>) -> Option<T> {
        self.ui_state = self.editor.ui_state();
        self.page_input = self
            .ui_state
            .page
            .map(|page| page.to_string())
            .unwrap_or_default();

        match result {
            Ok(value) => {
                self.error = None;
                Some(value)
            }
            Err(e) if e.is_fatal() => {
                error!("{e}");
                rfd::MessageDialog::new()
                    .set_level(rfd::MessageLevel::Warning)
                    .set_title("Warning")
                    .set_description(e.to_string())
                    .set_buttons(rfd::MessageButtons::Ok)
                    .show();
                std::process::exit(1);
            }
            Err(e) => {
                error!("{e}");
                self.error = Some(e.to_string());
                None
            }
        }
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        if self.title != self.ui_state.title {
            self.title.clone_from(&self.ui_state.title);
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.title.clone()));
        }
    }

    fn notice_ui(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };
        let mut close = false;
        egui::Window::new("No images")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(notice);
                close = ui.button("Ok").clicked();
            });
        if close {
            self.notice = None;
        }
    }
}

impl eframe::App for AnnotationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::right("controls")
            .resizable(false)
            .show(ctx, |ui| {
                self.selector_ui(ui);
                ui.separator();
                self.menu_ui(ui);
            });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.status_ui(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.canvas_ui(ui);
            });

        self.notice_ui(ctx);
        self.update_title(ctx);
        self.cursor_system.end_frame();
    }

    fn on_exit(&mut self) {
        if let Err(e) = self.editor.end_stroke() {
            warn!("Could not save the mask on exit: {e}");
        }
    }
}

fn to_color_image(image: &image::RgbaImage) -> ColorImage {
    let (width, height) = image.dimensions();
    ColorImage::from_rgba_unmultiplied([width as usize, height as usize], image.as_raw())
}

fn to_color32(image::Rgb([r, g, b]): image::Rgb<u8>) -> Color32 {
    Color32::from_rgb(r, g, b)
}
