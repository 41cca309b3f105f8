mod brush;
mod canvas;
mod composite;
mod config;
mod editor;
mod error;
mod geometry;
mod mask;
mod navigation;
mod storage;

pub use brush::*;
pub use canvas::*;
pub use composite::*;
pub use config::*;
pub use editor::*;
pub use error::*;
pub use geometry::*;
pub use mask::*;
pub use navigation::*;
pub use storage::*;
