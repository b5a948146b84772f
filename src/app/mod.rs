//! Terminal host for the viewer and editor surfaces.
//!
//! This module follows The Elm Architecture (TEA):
//! - [`Model`]: terminal state wrapped around the [`Coordinator`]
//! - [`Message`]: all user actions
//! - [`update`]: state transitions
//! - [`App::run`]: main event loop with rendering

mod event_loop;
mod input;
mod model;
mod update;

pub use input::FORMAT_SHORTCUTS;
pub use model::{Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::coordinator::Coordinator;
use crate::highlight::HighlightBackground;

/// Owns the coordinator until the terminal takes over in [`App::run`].
pub struct App {
    coordinator: Coordinator,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
    background: HighlightBackground,
}

impl App {
    pub const fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            config_global_path: None,
            config_local_path: None,
            background: HighlightBackground::Dark,
        }
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Terminal background the preview colors should suit.
    #[must_use]
    pub const fn with_background(mut self, background: HighlightBackground) -> Self {
        self.background = background;
        self
    }

    fn into_model(self, size: (u16, u16)) -> Model {
        let mut model = Model::new(self.coordinator, size);
        model.config_global_path = self.config_global_path;
        model.config_local_path = self.config_local_path;
        model.background = self.background;
        model
    }
}

#[cfg(test)]
mod tests;
