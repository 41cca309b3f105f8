use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::ImageEntry;

const TITLE: &str = "Mask annotation tool";

/// Position inside the image set of the selected directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Navigation {
    #[default]
    Empty,
    Browsing {
        dir: PathBuf,
        entries: Vec<ImageEntry>,
        index: usize,
    },
}

/// Everything the controls need to know about the navigation position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub rotate_enabled: bool,
    pub clear_enabled: bool,
    pub status: String,
    /// 1-based page of the current image.
    pub page: Option<usize>,
    pub title: String,
}

impl Navigation {
    /// Starts browsing `entries` at the first image. An empty list keeps the
    /// current state and returns false.
    pub fn select(&mut self, dir: PathBuf, entries: Vec<ImageEntry>) -> bool {
        if entries.is_empty() {
            info!("No images found in {}", dir.display());
            return false;
        }
        info!("Browsing {} images in {}", entries.len(), dir.display());
        *self = Self::Browsing {
            dir,
            entries,
            index: 0,
        };
        true
    }

    pub fn next(&mut self) -> bool {
        match self {
            Self::Browsing { entries, index, .. } if *index + 1 < entries.len() => {
                *index += 1;
                true
            }
            _ => {
                warn!("Ignoring next(), already at the last image");
                false
            }
        }
    }

    pub fn prev(&mut self) -> bool {
        match self {
            Self::Browsing { index, .. } if *index > 0 => {
                *index -= 1;
                true
            }
            _ => {
                warn!("Ignoring prev(), already at the first image");
                false
            }
        }
    }

    /// Moves to the 1-based `page`. Pages outside `1..=len` are ignored.
    pub fn jump_to(&mut self, page: i64) -> bool {
        let Self::Browsing { entries, index, .. } = self else {
            return false;
        };
        match usize::try_from(page) {
            Ok(page) if (1..=entries.len()).contains(&page) => {
                *index = page - 1;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&ImageEntry> {
        match self {
            Self::Empty => None,
            Self::Browsing { entries, index, .. } => entries.get(*index),
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Browsing { index, .. } => Some(*index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Browsing { entries, .. } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dir(&self) -> Option<&Path> {
        match self {
            Self::Empty => None,
            Self::Browsing { dir, .. } => Some(dir),
        }
    }

    pub fn ui_state(&self) -> UiState {
        match self {
            Self::Empty => UiState {
                prev_enabled: false,
                next_enabled: false,
                rotate_enabled: false,
                clear_enabled: false,
                status: "Please select a directory to annotate".into(),
                page: None,
                title: TITLE.into(),
            },
            Self::Browsing {
                dir,
                entries,
                index,
            } => {
                let count = entries.len();
                let current = entries[*index].path.display();
                UiState {
                    prev_enabled: *index > 0,
                    next_enabled: *index + 1 < count,
                    rotate_enabled: count > 0,
                    clear_enabled: count > 0,
                    status: format!("Current image: {current} ({}/{count}) jump to", index + 1),
                    page: Some(index + 1),
                    title: format!("{TITLE}: {}", dir.display()),
                }
            }
        }
    }
}
