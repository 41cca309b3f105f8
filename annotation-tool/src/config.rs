use std::path::PathBuf;

use mask_pixels::EditorConfig;

#[derive(serde::Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// Directory opened on start-up. The first command line argument wins.
    pub image_dir: Option<PathBuf>,
    pub window_size: [f32; 2],
    pub editor: EditorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_dir: None,
            window_size: [1000.0, 650.0],
            editor: EditorConfig::default(),
        }
    }
}
