use std::{io, path::PathBuf};

use eframe::egui;
use log::info;
use mask_pixels::{Editor, FileStorage};

use super::AnnotationApp;
use crate::config::Config;

pub fn run_native() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = match std::fs::File::open("config.json") {
        Ok(f) => serde_json::from_reader(f).map_err(|e| eframe::Error::AppCreation(Box::new(e)))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(e) => Err(eframe::Error::AppCreation(Box::new(e)))?,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(config.window_size),
        ..Default::default()
    };

    let image_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.image_dir.clone());

    info!("Run with config: {config:?}");
    eframe::run_native(
        super::TITLE,
        options,
        Box::new(move |cc| {
            let storage = FileStorage::from(&config.editor);
            let editor = Editor::new(Box::new(storage), config.editor);
            Ok(Box::new(AnnotationApp::new(cc, editor, image_dir)))
        }),
    )
}
